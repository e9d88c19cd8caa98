use super::{SelectQuery, Selectable};
use crate::expr::{count, count_distinct};
use crate::source::Source;

impl SelectQuery {
    /// A query returning the number of rows of this one.
    ///
    /// Simple shapes over a single table count in place:
    ///
    /// - `SELECT * FROM t` becomes `SELECT COUNT(*) FROM t`
    /// - `SELECT DISTINCT a FROM t` becomes `SELECT COUNT(DISTINCT a) FROM t`
    /// - `SELECT a, b FROM t` becomes `SELECT COUNT(*) FROM t`
    ///
    /// Every other shape is wrapped: `SELECT COUNT(*) FROM (SELECT ...)`.
    /// Ordering never affects the count and is dropped.
    pub fn count_query(&self) -> SelectQuery {
        let mut unordered = self.clone();
        unordered.orderings.clear();
        unordered.reversed = false;

        if !unordered.group_by.is_empty() || unordered.limit.is_some() {
            return trivial_count(unordered);
        }
        let table_id = match &unordered.source {
            Some(Source::Table(table)) => table.id(),
            _ => return trivial_count(unordered),
        };

        match unordered.selection.as_slice() {
            [Selectable::Star(id)] if *id == table_id && !unordered.distinct => {
                count_all(unordered, table_id)
            }
            [Selectable::Star(_)] | [] => trivial_count(unordered),
            [single] => {
                let Some(expr) = single.expression().cloned() else {
                    return trivial_count(unordered);
                };
                if unordered.distinct {
                    unordered.distinct = false;
                    unordered.selection = vec![count_distinct(expr).into()];
                    unordered
                } else {
                    count_all(unordered, table_id)
                }
            }
            _ if unordered.distinct => trivial_count(unordered),
            _ => count_all(unordered, table_id),
        }
    }
}

fn count_all(mut query: SelectQuery, table: crate::source::SourceId) -> SelectQuery {
    query.distinct = false;
    query.selection = vec![count(Selectable::Star(table)).into()];
    query
}

/// `SELECT COUNT(*) FROM (query)`
fn trivial_count(query: SelectQuery) -> SelectQuery {
    let source = Source::subquery(query, None);
    let id = source.id();
    SelectQuery {
        selection: vec![count(Selectable::Star(id)).into()],
        source: Some(source),
        ..SelectQuery::default()
    }
}
