//! Tracing hooks for query compilation and execution.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! The macros expand to nothing when the feature is disabled.

/// Emit a debug-level event with the rendered SQL and argument count.
///
/// ```ignore
/// relq_trace_compile!(&sql, arguments.len());
/// ```
#[macro_export]
macro_rules! relq_trace_compile {
    ($sql:expr, $arg_count:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(sql = %$sql, arguments = $arg_count, "relq.compile");
    };
}

/// Emit a debug-level event when alias resolution renames a source.
#[macro_export]
macro_rules! relq_trace_alias {
    ($from:expr, $to:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(from = %$from, to = %$to, "relq.alias");
    };
}

/// Emit a debug-level event right before a driver executes a statement.
#[macro_export]
macro_rules! relq_trace_query {
    ($sql:expr, $arg_count:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(sql = %$sql, arguments = $arg_count, "relq.query");
    };
}
