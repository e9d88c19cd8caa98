//! Table metadata needed at compile time: column lists for star expansion
//! and for validating column mappings.

use compact_str::CompactString;
use hashbrown::HashMap;

use crate::error::{RelqError, Result};

pub trait Schema {
    /// Column names of `table`, in declaration order
    fn columns(&self, table: &str) -> Result<Vec<CompactString>>;

    fn column_count(&self, table: &str) -> Result<usize> {
        Ok(self.columns(table)?.len())
    }

    /// Column lookup, ignoring ASCII case as SQLite does
    fn column_exists(&self, table: &str, column: &str) -> Result<bool> {
        Ok(self
            .columns(table)?
            .iter()
            .any(|name| name.eq_ignore_ascii_case(column)))
    }
}

impl<S: Schema + ?Sized> Schema for &S {
    fn columns(&self, table: &str) -> Result<Vec<CompactString>> {
        (**self).columns(table)
    }
}

/// In-memory schema, declared up front.
///
/// ```ignore
/// let schema = StaticSchema::new()
///     .table("owner", ["id", "name"])
///     .table("owned", ["id", "ownerId", "name"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticSchema {
    tables: HashMap<CompactString, Vec<CompactString>>,
}

impl StaticSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a table, replacing any previous declaration
    pub fn table<I, C>(mut self, name: impl Into<CompactString>, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CompactString>,
    {
        let name: CompactString = name.into();
        self.tables.insert(
            name.to_ascii_lowercase().into(),
            columns.into_iter().map(Into::into).collect(),
        );
        self
    }
}

impl Schema for StaticSchema {
    fn columns(&self, table: &str) -> Result<Vec<CompactString>> {
        self.tables
            .get(table.to_ascii_lowercase().as_str())
            .cloned()
            .ok_or_else(|| RelqError::NoSuchTable(table.to_string()))
    }
}

#[cfg(feature = "rusqlite")]
impl Schema for ::rusqlite::Connection {
    fn columns(&self, table: &str) -> Result<Vec<CompactString>> {
        let sql = format!("PRAGMA table_info(\"{}\")", table.replace('"', "\"\""));
        let mut stmt = self.prepare(&sql)?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .map(|name| name.map(CompactString::from))
            .collect::<::rusqlite::Result<Vec<_>>>()?;
        if columns.is_empty() {
            return Err(RelqError::NoSuchTable(table.to_string()));
        }
        Ok(columns)
    }
}
