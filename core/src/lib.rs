//! Relational query compiler.
//!
//! Builds SELECT statements over tables related by reusable
//! [`Relation`](relation::Relation) descriptors, compiles them to SQL with
//! collision-free source names, and splits each flat result row back into the
//! root row and one nested row per included relation.

pub mod error;
pub mod expr;
pub mod projection;
pub mod query;
pub mod relation;
pub mod schema;
pub mod source;
pub mod sql;
pub mod value;

mod tracing;

// Re-export key types and traits
pub use error::{RelqError, Result};
pub use expr::Expression;
pub use projection::{ProjectionPlan, Row, RowAdapter, RowBinding, RowView};
pub use query::{CompiledQuery, OrderingTerm, SelectQuery, Selectable};
pub use relation::{Join, JoinKind, Relation};
pub use schema::{Schema, StaticSchema};
pub use source::{Source, SourceId, SourceRef};
pub use sql::{SQL, SQLChunk, Token};
pub use value::{Arguments, FromValue, Value};

/// Everything needed to build and compile queries
pub mod prelude {
    pub use crate::expr::{
        and, col, count, count_distinct, exists, func, literal, literal_with, not, or, value,
    };
    pub use crate::{
        Arguments, CompiledQuery, Expression, JoinKind, OrderingTerm, Relation, RelqError, Row,
        RowView, Schema, SelectQuery, Selectable, SourceRef, StaticSchema, Value,
    };
}
