use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelqError {
    /// A column mapping names a column the table or row does not have
    #[error("{}", missing_column_message(.table.as_deref(), .column, .candidates))]
    MissingColumn {
        table: Option<String>,
        column: String,
        candidates: Vec<String>,
    },

    /// Schema lookup on a table that does not exist
    #[error("No such table: {0}")]
    NoSuchTable(String),

    /// INNER join reachable only through a LEFT join
    #[error("Invalid required relation `{relation}` after a non-required relation")]
    RequiredAfterOptional { relation: String },

    /// Two sources were explicitly given the same alias
    #[error("Duplicate alias: \"{0}\" is used by more than one source")]
    DuplicateAlias(String),

    /// Alias resolution could not make source names unique
    #[error("Ambiguous source name: \"{0}\"")]
    AmbiguousSource(String),

    /// Column reference to a source outside the compiled query
    #[error("Column \"{column}\" references a source that is not part of this query")]
    DetachedSource { column: String },

    /// Placeholder with no matching argument
    #[error("No argument bound for placeholder {0}")]
    MissingArgument(String),

    /// Named argument bound more than once
    #[error("Argument :{0} is bound more than once")]
    ArgumentReused(String),

    /// Statement columns disagree with the computed selection layout
    #[error("Column count mismatch: selection expands to {expected} columns, statement has {actual}")]
    ColumnCountMismatch { expected: usize, actual: usize },

    /// Error mapping data
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Rusqlite specific errors
    #[cfg(feature = "rusqlite")]
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

fn missing_column_message(table: Option<&str>, column: &str, candidates: &[String]) -> String {
    let mut message = match table {
        Some(table) => format!("No such column \"{column}\" in table \"{table}\"."),
        None => format!("Mapping references missing column \"{column}\"."),
    };
    if !candidates.is_empty() {
        message.push_str(" Valid column names are: ");
        message.push_str(&candidates.join(", "));
        message.push('.');
    }
    message
}

/// Result type for query compilation and row projection
pub type Result<T> = std::result::Result<T, RelqError>;
