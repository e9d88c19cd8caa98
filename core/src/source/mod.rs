//! FROM-clause sources: tables, subqueries and join trees.
//!
//! Every source carries a [`SourceId`] that identifies one occurrence in a
//! query. Cloning keeps the id (same occurrence); [`Source::fork`] allocates
//! fresh ids so the copy can be attached somewhere else without sharing names.

mod names;

pub(crate) use names::*;

use compact_str::CompactString;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;
use crate::expr::Expression;
use crate::query::{SelectQuery, Selectable};
use crate::relation::Join;
use crate::schema::Schema;
use crate::sql::{SQL, SQLChunk, Token};

static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one source occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
    pub(crate) fn next() -> Self {
        Self(NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Lightweight handle used to build column references and star selections
/// against a source, for instance inside join predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceRef {
    id: SourceId,
}

impl SourceRef {
    #[inline]
    pub const fn id(&self) -> SourceId {
        self.id
    }

    /// Column qualified by this source's final name: `"source"."column"`
    pub fn column(&self, name: impl Into<CompactString>) -> Expression {
        Expression::Column {
            source: Some(self.id),
            name: name.into(),
        }
    }

    /// All columns of this source: `"source".*`
    #[inline]
    pub fn star(&self) -> Selectable {
        Selectable::Star(self.id)
    }
}

impl From<SourceId> for SourceRef {
    fn from(id: SourceId) -> Self {
        Self { id }
    }
}

/// An alias given to a table or subquery.
///
/// Derived aliases come from a relation name that differs from its table and
/// may be renumbered on collision. Explicit aliases are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub name: CompactString,
    pub explicit: bool,
}

#[derive(Debug, Clone)]
pub struct TableSource {
    id: SourceId,
    table: CompactString,
    alias: Option<Alias>,
}

impl TableSource {
    #[inline]
    pub fn id(&self) -> SourceId {
        self.id
    }

    #[inline]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[inline]
    pub fn alias(&self) -> Option<&Alias> {
        self.alias.as_ref()
    }
}

#[derive(Debug, Clone)]
pub struct SubquerySource {
    id: SourceId,
    query: Box<SelectQuery>,
    alias: Option<Alias>,
}

impl SubquerySource {
    #[inline]
    pub fn query(&self) -> &SelectQuery {
        &self.query
    }
}

/// A left source followed by joined relations, in emission order.
#[derive(Debug, Clone)]
pub struct JoinTree {
    id: SourceId,
    left: Box<Source>,
    joins: Vec<Join>,
}

impl JoinTree {
    #[inline]
    pub fn left(&self) -> &Source {
        &self.left
    }

    #[inline]
    pub fn joins(&self) -> &[Join] {
        &self.joins
    }
}

#[derive(Debug, Clone)]
pub enum Source {
    Table(TableSource),
    Subquery(SubquerySource),
    JoinTree(JoinTree),
}

impl Source {
    pub fn table(name: impl Into<CompactString>) -> Self {
        Source::Table(TableSource {
            id: SourceId::next(),
            table: name.into(),
            alias: None,
        })
    }

    pub fn subquery(query: SelectQuery, alias: Option<&str>) -> Self {
        Source::Subquery(SubquerySource {
            id: SourceId::next(),
            query: Box::new(query),
            alias: alias.map(|name| Alias {
                name: name.into(),
                explicit: true,
            }),
        })
    }

    #[inline]
    pub fn id(&self) -> SourceId {
        match self {
            Source::Table(table) => table.id,
            Source::Subquery(subquery) => subquery.id,
            Source::JoinTree(tree) => tree.id,
        }
    }

    #[inline]
    pub fn as_ref(&self) -> SourceRef {
        SourceRef { id: self.id() }
    }

    /// Display name before alias resolution
    pub fn name(&self) -> Option<&str> {
        match self {
            Source::Table(table) => Some(
                table
                    .alias
                    .as_ref()
                    .map_or(table.table.as_str(), |alias| alias.name.as_str()),
            ),
            Source::Subquery(subquery) => subquery.alias.as_ref().map(|alias| alias.name.as_str()),
            Source::JoinTree(tree) => tree.left.name(),
        }
    }

    pub(crate) fn alias(&self) -> Option<&Alias> {
        match self {
            Source::Table(table) => table.alias.as_ref(),
            Source::Subquery(subquery) => subquery.alias.as_ref(),
            Source::JoinTree(tree) => tree.left.alias(),
        }
    }

    /// Overrides the display name. Join trees alias their left source.
    pub fn set_alias(&mut self, alias: Alias) {
        match self {
            Source::Table(table) => table.alias = Some(alias),
            Source::Subquery(subquery) => subquery.alias = Some(alias),
            Source::JoinTree(tree) => tree.left.set_alias(alias),
        }
    }

    /// Independent copy with fresh ids throughout
    pub fn fork(&self) -> Source {
        match self {
            Source::Table(table) => Source::Table(TableSource {
                id: SourceId::next(),
                table: table.table.clone(),
                alias: table.alias.clone(),
            }),
            Source::Subquery(subquery) => Source::Subquery(SubquerySource {
                id: SourceId::next(),
                query: subquery.query.clone(),
                alias: subquery.alias.clone(),
            }),
            Source::JoinTree(tree) => Source::JoinTree(JoinTree {
                id: SourceId::next(),
                left: Box::new(tree.left.fork()),
                joins: tree.joins.iter().map(Join::fork).collect(),
            }),
        }
    }

    /// The leaf source at the root of a join tree, or self
    pub fn root(&self) -> &Source {
        match self {
            Source::JoinTree(tree) => tree.left.root(),
            _ => self,
        }
    }

    /// Appends joins, turning a leaf source into a join tree
    pub(crate) fn push_joins(self, joins: impl IntoIterator<Item = Join>) -> Source {
        match self {
            Source::JoinTree(mut tree) => {
                tree.joins.extend(joins);
                Source::JoinTree(tree)
            }
            leaf => Source::JoinTree(JoinTree {
                id: SourceId::next(),
                left: Box::new(leaf),
                joins: joins.into_iter().collect(),
            }),
        }
    }

    /// All named leaf occurrences, depth-first, left to right.
    ///
    /// Subquery sources list themselves, then their inner sources.
    pub fn referenced_sources<'s>(&'s self, out: &mut Vec<&'s Source>) {
        match self {
            Source::Table(_) => out.push(self),
            Source::Subquery(subquery) => {
                out.push(self);
                if let Some(inner) = subquery.query.source() {
                    inner.referenced_sources(out);
                }
            }
            Source::JoinTree(tree) => {
                tree.left.referenced_sources(out);
                for join in &tree.joins {
                    join.relation.referenced_sources(out);
                }
            }
        }
    }

    /// Finds an occurrence by id in this FROM tree (not inside subqueries)
    pub fn find(&self, id: SourceId) -> Option<&Source> {
        if self.id() == id {
            return Some(self);
        }
        match self {
            Source::JoinTree(tree) => tree.left.find(id).or_else(|| {
                tree.joins
                    .iter()
                    .find_map(|join| join.relation.find_source(id))
            }),
            _ => None,
        }
    }

    /// Number of columns `*` expands to for this source
    pub fn number_of_columns(&self, schema: &dyn Schema) -> Result<usize> {
        match self {
            Source::Table(table) => schema.column_count(&table.table),
            Source::Subquery(subquery) => subquery.query.number_of_columns(schema),
            Source::JoinTree(tree) => {
                let mut count = tree.left.number_of_columns(schema)?;
                for join in &tree.joins {
                    count += join.relation.total_columns(schema)?;
                }
                Ok(count)
            }
        }
    }

    pub(crate) fn render<'a>(&'a self, ctx: &RenderContext<'_>) -> Result<SQL<'a>> {
        match self {
            Source::Table(table) => {
                let mut sql = SQL::ident(table.table.as_str());
                if let Some(name) = ctx.name_of(table.id)
                    && name != table.table
                {
                    sql.push_mut(SQLChunk::ident(name.to_string()));
                }
                Ok(sql)
            }
            Source::Subquery(subquery) => {
                let mut sql = subquery.query.render_with(ctx)?.parens();
                if let Some(name) = ctx.name_of(subquery.id) {
                    sql = sql.alias(name.to_string());
                }
                Ok(sql)
            }
            Source::JoinTree(tree) => {
                let mut sql = tree.left.render(ctx)?;
                for join in &tree.joins {
                    sql.append_mut(join.relation.render_join(
                        ctx,
                        &tree.left,
                        join.kind,
                        false,
                    )?);
                }
                Ok(sql)
            }
        }
    }
}

/// `"name".*` or `*` for unnamed sources
pub(crate) fn render_star<'a>(id: SourceId, ctx: &RenderContext<'_>) -> Result<SQL<'a>> {
    match ctx.lookup(id, "*")? {
        Some(name) => Ok(SQL::ident(name.to_string())
            .push(Token::DOT)
            .push(Token::STAR)),
        None => Ok(SQL::token(Token::STAR)),
    }
}
