use std::sync::Arc;

use ::rusqlite::{Connection, Statement};
use compact_str::CompactString;
use relq_core::{
    Arguments, CompiledQuery, ProjectionPlan, RelqError, Result, Row, SelectQuery, Value,
};

/// A rusqlite connection that runs compiled queries and projects their rows.
///
/// The connection doubles as the [`Schema`](relq_core::Schema) used to expand
/// stars and validate relation mappings.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    pub const fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Connection::open_in_memory()?))
    }

    /// Gets a reference to the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn mut_conn(&mut self) -> &mut Connection {
        &mut self.conn
    }

    pub fn into_inner(self) -> Connection {
        self.conn
    }

    /// Runs semicolon-separated statements without arguments
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Compiles `query` and builds the projection plan of its statement
    pub fn prepare(&self, query: &SelectQuery) -> Result<(CompiledQuery, ProjectionPlan)> {
        let compiled = query.compile(&self.conn)?;
        let stmt = self.conn.prepare(&compiled.sql)?;
        let plan = query.projection(&self.conn, column_names(&stmt))?;
        Ok((compiled, plan))
    }

    pub fn fetch_all(&self, query: &SelectQuery) -> Result<Vec<Row>> {
        self.fetch(query, None)
    }

    pub fn fetch_one(&self, query: &SelectQuery) -> Result<Option<Row>> {
        Ok(self.fetch(query, Some(1))?.pop())
    }

    /// Number of rows `query` returns, through its derived count query
    pub fn fetch_count(&self, query: &SelectQuery) -> Result<i64> {
        let compiled = query.count_query().compile(&self.conn)?;
        let mut stmt = self.conn.prepare(&compiled.sql)?;
        bind(&mut stmt, &compiled.arguments)?;
        relq_core::relq_trace_query!(compiled.sql, compiled.arguments.len());

        let mut rows = stmt.raw_query();
        match rows.next()? {
            Some(row) => Ok(row.get(0)?),
            None => Ok(0),
        }
    }

    fn fetch(&self, query: &SelectQuery, max: Option<usize>) -> Result<Vec<Row>> {
        let compiled = query.compile(&self.conn)?;
        let mut stmt = self.conn.prepare(&compiled.sql)?;
        let plan = Arc::new(query.projection(&self.conn, column_names(&stmt))?);
        bind(&mut stmt, &compiled.arguments)?;
        relq_core::relq_trace_query!(compiled.sql, compiled.arguments.len());

        let width = plan.statement_columns().len();
        let mut rows = stmt.raw_query();
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            let values = (0..width)
                .map(|index| row.get::<_, Value>(index))
                .collect::<::rusqlite::Result<Vec<_>>>()?;
            results.push(Row::new(values, Arc::clone(&plan)));
            if max.is_some_and(|max| results.len() >= max) {
                break;
            }
        }
        Ok(results)
    }
}

fn column_names(stmt: &Statement<'_>) -> Vec<CompactString> {
    stmt.column_names()
        .into_iter()
        .map(CompactString::from)
        .collect()
}

/// Binds every placeholder of `stmt`.
///
/// Anonymous `?` placeholders take positional arguments in order, `?NNN`
/// takes positional argument NNN, and `:name`, `@name`, `$name` take the
/// named argument `name`.
fn bind(stmt: &mut Statement<'_>, arguments: &Arguments) -> Result<()> {
    let mut positional = arguments.values().iter();
    for index in 1..=stmt.parameter_count() {
        let value = match stmt.parameter_name(index) {
            None => positional.next(),
            Some(name) => match name.split_at(1) {
                ("?", number) => number
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| arguments.values().get(n.wrapping_sub(1))),
                (_, key) => arguments.get_named(key),
            },
        };
        let Some(value) = value else {
            let placeholder = stmt
                .parameter_name(index)
                .map_or_else(|| format!("?{index}"), ToString::to_string);
            return Err(RelqError::MissingArgument(placeholder));
        };
        stmt.raw_bind_parameter(index, value)?;
    }
    if positional.next().is_some() {
        return Err(RelqError::Mapping(format!(
            "{} positional arguments for {} placeholders",
            arguments.values().len(),
            stmt.parameter_count()
        )));
    }
    Ok(())
}
