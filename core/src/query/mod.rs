//! SELECT statements.
//!
//! [`SelectQuery`] is a value: every builder method consumes the query and
//! returns the modified copy. Relations attached with `include` / `join` are
//! forked on attachment, so one descriptor can be reused across queries.
//!
//! ```ignore
//! let books = SelectQuery::table("book")
//!     .include([Relation::foreign_key("author", "author", [("authorId", "id")])])
//!     .order([col("title").asc()]);
//! let compiled = books.compile(&schema)?;
//! ```

mod compile;
mod count;

pub use compile::*;

use compact_str::CompactString;

use crate::error::{RelqError, Result};
use crate::expr::{Expression, and, col, exists, literal_with};
use crate::relation::{Join, JoinKind, Relation};
use crate::schema::Schema;
use crate::source::{RenderContext, Source, SourceId, SourceRef, render_star};
use crate::sql::{SQL, Token};
use crate::value::Arguments;

/// One entry of a SELECT list
#[derive(Debug, Clone)]
pub enum Selectable {
    /// All columns of a source: `"source".*`, or `*`
    Star(SourceId),
    Expression(Expression),
    /// `expr AS "alias"`
    Aliased {
        expr: Expression,
        alias: CompactString,
    },
}

impl Selectable {
    pub(crate) fn render<'a>(&'a self, ctx: &RenderContext<'_>) -> Result<SQL<'a>> {
        match self {
            Selectable::Star(id) => render_star(*id, ctx),
            Selectable::Expression(expr) => expr.render(ctx),
            Selectable::Aliased { expr, alias } => Ok(expr.render(ctx)?.alias(alias.as_str())),
        }
    }

    /// The selected expression, unless this is a star
    pub fn expression(&self) -> Option<&Expression> {
        match self {
            Selectable::Star(_) => None,
            Selectable::Expression(expr) | Selectable::Aliased { expr, .. } => Some(expr),
        }
    }
}

impl From<Expression> for Selectable {
    fn from(expr: Expression) -> Self {
        Selectable::Expression(expr)
    }
}

impl From<SourceRef> for Selectable {
    fn from(source: SourceRef) -> Self {
        source.star()
    }
}

/// ORDER BY term. A bare expression sorts ascending.
#[derive(Debug, Clone)]
pub enum OrderingTerm {
    Expression(Expression),
    Asc(Expression),
    Desc(Expression),
}

impl OrderingTerm {
    /// Opposite direction; a bare term becomes DESC
    pub fn reversed(self) -> OrderingTerm {
        match self {
            OrderingTerm::Expression(expr) | OrderingTerm::Asc(expr) => OrderingTerm::Desc(expr),
            OrderingTerm::Desc(expr) => OrderingTerm::Asc(expr),
        }
    }

    fn render<'a>(&'a self, reversed: bool, ctx: &RenderContext<'_>) -> Result<SQL<'a>> {
        let (expr, direction) = match (self, reversed) {
            (OrderingTerm::Expression(expr), false) => (expr, None),
            (OrderingTerm::Asc(expr), false) | (OrderingTerm::Desc(expr), true) => {
                (expr, Some(Token::ASC))
            }
            (OrderingTerm::Desc(expr), false)
            | (OrderingTerm::Asc(expr), true)
            | (OrderingTerm::Expression(expr), true) => (expr, Some(Token::DESC)),
        };
        let sql = expr.render(ctx)?;
        Ok(match direction {
            Some(direction) => sql.push(direction),
            None => sql,
        })
    }
}

impl From<Expression> for OrderingTerm {
    fn from(expr: Expression) -> Self {
        OrderingTerm::Expression(expr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub limit: u64,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    selection: Vec<Selectable>,
    distinct: bool,
    source: Option<Source>,
    filter: Option<Expression>,
    group_by: Vec<Expression>,
    having: Option<Expression>,
    orderings: Vec<OrderingTerm>,
    reversed: bool,
    limit: Option<Limit>,
}

impl SelectQuery {
    /// Query without a FROM clause; give it a selection with [`SelectQuery::select`].
    pub fn new() -> Self {
        Self::default()
    }

    /// `SELECT * FROM "name"`
    pub fn table(name: impl Into<CompactString>) -> Self {
        Self::from_source(Source::table(name))
    }

    /// Selects all columns of the root of `source`
    pub fn from_source(source: Source) -> Self {
        Self {
            selection: vec![Selectable::Star(source.root().id())],
            source: Some(source),
            ..Self::default()
        }
    }

    /// `SELECT * FROM (query) AS "alias"`
    pub fn from_subquery(query: SelectQuery, alias: Option<&str>) -> Self {
        Self::from_source(Source::subquery(query, alias))
    }

    /// Gives the root source an explicit alias, kept verbatim in SQL
    pub fn aliased(mut self, alias: impl Into<CompactString>) -> Self {
        if let Some(source) = &mut self.source {
            source.set_alias(crate::source::Alias {
                name: alias.into(),
                explicit: true,
            });
        }
        self
    }

    /// Replaces the selection
    pub fn select<I, S>(mut self, selection: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Selectable>,
    {
        self.selection = selection.into_iter().map(Into::into).collect();
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Adds a WHERE condition, ANDed with the existing ones
    pub fn filter(mut self, condition: impl Into<Expression>) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => and([existing, condition.into()]),
            None => condition.into(),
        });
        self
    }

    /// Adds a raw SQL WHERE condition with its arguments
    pub fn filter_sql(self, sql: impl Into<String>, arguments: Arguments) -> Self {
        self.filter(literal_with(sql, arguments))
    }

    pub fn group_by<I, E>(mut self, expressions: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        self.group_by = expressions.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a HAVING condition, ANDed with the existing ones
    pub fn having(mut self, condition: impl Into<Expression>) -> Self {
        self.having = Some(match self.having.take() {
            Some(existing) => and([existing, condition.into()]),
            None => condition.into(),
        });
        self
    }

    /// Replaces the ordering, and cancels a previous [`SelectQuery::reversed`]
    pub fn order<I, O>(mut self, orderings: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<OrderingTerm>,
    {
        self.orderings = orderings.into_iter().map(Into::into).collect();
        self.reversed = false;
        self
    }

    /// Reverses the ordering. Without explicit ordering, a table source is
    /// ordered by descending `_rowid_`.
    pub fn reversed(mut self) -> Self {
        self.reversed = !self.reversed;
        self
    }

    pub fn limit(mut self, limit: u64, offset: Option<u64>) -> Self {
        self.limit = Some(Limit { limit, offset });
        self
    }

    /// Attaches relations whose columns are selected, with LEFT JOIN
    pub fn include(self, relations: impl IntoIterator<Item = Relation>) -> Self {
        self.attach(JoinKind::Left, true, relations)
    }

    /// Attaches relations whose columns are selected, with INNER JOIN
    pub fn include_required(self, relations: impl IntoIterator<Item = Relation>) -> Self {
        self.attach(JoinKind::Inner, true, relations)
    }

    /// Attaches relations that only filter rows, with LEFT JOIN
    pub fn join(self, relations: impl IntoIterator<Item = Relation>) -> Self {
        self.attach(JoinKind::Left, false, relations)
    }

    /// Attaches relations that only filter rows, with INNER JOIN
    pub fn join_required(self, relations: impl IntoIterator<Item = Relation>) -> Self {
        self.attach(JoinKind::Inner, false, relations)
    }

    /// Attaches forked copies of `relations`. No-op without a source.
    pub fn attach(
        mut self,
        kind: JoinKind,
        included: bool,
        relations: impl IntoIterator<Item = Relation>,
    ) -> Self {
        if let Some(source) = self.source.take() {
            let joins = relations.into_iter().map(|relation| Join {
                included,
                kind,
                relation: relation.fork(),
            });
            self.source = Some(source.push_joins(joins));
        }
        self
    }

    //--------------------------------------------------------------------------
    // Accessors
    //--------------------------------------------------------------------------

    #[inline]
    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }

    #[inline]
    pub fn selection(&self) -> &[Selectable] {
        &self.selection
    }

    #[inline]
    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// The root source, for building qualified columns
    pub fn root(&self) -> Option<SourceRef> {
        self.source.as_ref().map(|source| source.root().as_ref())
    }

    /// Column of the root source, or an unqualified column without a source
    pub fn column(&self, name: impl Into<CompactString>) -> Expression {
        match self.root() {
            Some(root) => root.column(name),
            None => col(name),
        }
    }

    /// Target of an attached relation, looked up by logical name depth-first
    pub fn relation(&self, name: &str) -> Option<SourceRef> {
        let Some(Source::JoinTree(tree)) = &self.source else {
            return None;
        };
        tree.joins()
            .iter()
            .find_map(|join| join.relation.find_relation(name))
            .map(Relation::target)
    }

    /// `expr IN (this query)`
    pub fn contains(&self, expr: impl Into<Expression>) -> Expression {
        expr.into().in_query(self.clone())
    }

    /// `EXISTS (this query)`
    pub fn exists(&self) -> Expression {
        exists(self.clone())
    }

    //--------------------------------------------------------------------------
    // Selection layout
    //--------------------------------------------------------------------------

    /// Selections contributed by attached relations, depth-first
    pub(crate) fn relation_selection(&self) -> Vec<Selectable> {
        let mut out = Vec::new();
        if let Some(Source::JoinTree(tree)) = &self.source {
            for join in tree.joins() {
                join.relation.selection(join.included, &mut out);
            }
        }
        out
    }

    /// Every emitted selectable: own selection, then relation selections
    pub fn emitted_selection(&self) -> Vec<Selectable> {
        let mut selection = self.selection.clone();
        selection.extend(self.relation_selection());
        selection
    }

    /// Columns produced by one selectable
    pub(crate) fn selectable_width(&self, selectable: &Selectable, schema: &dyn Schema) -> Result<usize> {
        match selectable {
            Selectable::Star(id) => self
                .source
                .as_ref()
                .and_then(|source| source.find(*id))
                .ok_or_else(|| RelqError::DetachedSource {
                    column: "*".to_string(),
                })?
                .number_of_columns(schema),
            Selectable::Expression(_) | Selectable::Aliased { .. } => Ok(1),
        }
    }

    /// Number of columns in the result set
    pub fn number_of_columns(&self, schema: &dyn Schema) -> Result<usize> {
        self.emitted_selection()
            .iter()
            .try_fold(0, |count, selectable| {
                Ok(count + self.selectable_width(selectable, schema)?)
            })
    }
}
