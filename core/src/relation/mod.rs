//! Reusable relation descriptors.
//!
//! A [`Relation`] says how a target table (or subquery) joins to whatever
//! source it is attached to. Descriptors compose: a relation can carry
//! further relations, each either *included* (its columns are selected and
//! exposed as a named row variant) or *joined* (it only constrains rows).
//!
//! ```ignore
//! let leader = Relation::foreign_key("leader", "persons", [("leaderId", "id")]);
//! let ruled_country = Relation::foreign_key("ruledCountry", "countries", [("id", "leaderId")]);
//! let query = SelectQuery::table("persons").include([ruled_country.include([leader])]);
//! ```

mod join;

pub use join::*;

use compact_str::CompactString;
use smallvec::SmallVec;
use std::sync::Arc;

use crate::error::{RelqError, Result};
use crate::expr::Expression;
use crate::projection::RowAdapter;
use crate::query::{SelectQuery, Selectable};
use crate::schema::Schema;
use crate::source::{Alias, RenderContext, Source, SourceId, SourceRef};
use crate::sql::{SQL, Token};

/// Builds a join condition from the left source and the relation's target
pub type PredicateFn = dyn Fn(SourceRef, SourceRef) -> Expression + Send + Sync;

/// Builds the selected columns of an included relation from its target
pub type SelectionFn = dyn Fn(SourceRef) -> Vec<Selectable> + Send + Sync;

#[derive(Clone)]
pub struct Relation {
    name: CompactString,
    target: Source,
    /// `(left column, right column)` pairs, rendered `"right"."rc" = "left"."lc"`
    mapping: SmallVec<[(CompactString, CompactString); 1]>,
    predicates: SmallVec<[Arc<PredicateFn>; 1]>,
    selection: Option<Arc<SelectionFn>>,
    joins: Vec<Join>,
}

impl Relation {
    fn with_target(name: CompactString, target: Source) -> Self {
        Self {
            name,
            target,
            mapping: SmallVec::new(),
            predicates: SmallVec::new(),
            selection: None,
            joins: Vec::new(),
        }
    }

    fn table_target(name: &CompactString, table: CompactString) -> Source {
        let mut target = Source::table(table.clone());
        if *name != table {
            target.set_alias(Alias {
                name: name.clone(),
                explicit: false,
            });
        }
        target
    }

    /// Relation to `table`, joined on `predicate(left, right)`.
    ///
    /// When `name` differs from the table name it doubles as the SQL alias.
    pub fn new<F>(name: impl Into<CompactString>, table: impl Into<CompactString>, predicate: F) -> Self
    where
        F: Fn(SourceRef, SourceRef) -> Expression + Send + Sync + 'static,
    {
        let name = name.into();
        let target = Self::table_target(&name, table.into());
        let mut relation = Self::with_target(name, target);
        relation.predicates.push(Arc::new(predicate));
        relation
    }

    /// Relation to `table` through column equalities, given as
    /// `(left column, right column)` pairs.
    pub fn foreign_key<I, L, R>(
        name: impl Into<CompactString>,
        table: impl Into<CompactString>,
        mapping: I,
    ) -> Self
    where
        I: IntoIterator<Item = (L, R)>,
        L: Into<CompactString>,
        R: Into<CompactString>,
    {
        let name = name.into();
        let target = Self::table_target(&name, table.into());
        let mut relation = Self::with_target(name, target);
        relation.mapping = mapping
            .into_iter()
            .map(|(left, right)| (left.into(), right.into()))
            .collect();
        relation
    }

    /// Relation to a subquery, aliased with the relation name.
    pub fn subquery<F>(name: impl Into<CompactString>, query: SelectQuery, predicate: F) -> Self
    where
        F: Fn(SourceRef, SourceRef) -> Expression + Send + Sync + 'static,
    {
        let name = name.into();
        let mut target = Source::subquery(query, None);
        target.set_alias(Alias {
            name: name.clone(),
            explicit: false,
        });
        let mut relation = Self::with_target(name, target);
        relation.predicates.push(Arc::new(predicate));
        relation
    }

    /// Logical name, used for row variants
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn target(&self) -> SourceRef {
        self.target.as_ref()
    }

    #[inline]
    pub fn target_source(&self) -> &Source {
        &self.target
    }

    #[inline]
    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    /// Independent copy, with fresh source ids down the whole chain
    pub fn fork(&self) -> Relation {
        Relation {
            name: self.name.clone(),
            target: self.target.fork(),
            mapping: self.mapping.clone(),
            predicates: self.predicates.clone(),
            selection: self.selection.clone(),
            joins: self.joins.iter().map(Join::fork).collect(),
        }
    }

    /// Forked copy whose SQL name is `alias`. The logical name is unchanged.
    pub fn aliased(&self, alias: impl Into<CompactString>) -> Relation {
        let mut relation = self.fork();
        relation.target.set_alias(Alias {
            name: alias.into(),
            explicit: true,
        });
        relation
    }

    /// Adds a condition, ANDed with the existing join condition.
    pub fn filter<F>(mut self, predicate: F) -> Relation
    where
        F: Fn(SourceRef, SourceRef) -> Expression + Send + Sync + 'static,
    {
        self.predicates.push(Arc::new(predicate));
        self
    }

    /// Replaces the default `"target".*` selection of an included relation.
    pub fn select<F>(mut self, selection: F) -> Relation
    where
        F: Fn(SourceRef) -> Vec<Selectable> + Send + Sync + 'static,
    {
        self.selection = Some(Arc::new(selection));
        self
    }

    /// Attaches relations whose columns are selected, with LEFT JOIN
    pub fn include(self, relations: impl IntoIterator<Item = Relation>) -> Relation {
        self.attach(JoinKind::Left, true, relations)
    }

    /// Attaches relations whose columns are selected, with INNER JOIN
    pub fn include_required(self, relations: impl IntoIterator<Item = Relation>) -> Relation {
        self.attach(JoinKind::Inner, true, relations)
    }

    /// Attaches relations that only filter rows, with LEFT JOIN
    pub fn join(self, relations: impl IntoIterator<Item = Relation>) -> Relation {
        self.attach(JoinKind::Left, false, relations)
    }

    /// Attaches relations that only filter rows, with INNER JOIN
    pub fn join_required(self, relations: impl IntoIterator<Item = Relation>) -> Relation {
        self.attach(JoinKind::Inner, false, relations)
    }

    /// Attaches forked copies of `relations` with the given join kind
    pub fn attach(
        mut self,
        kind: JoinKind,
        included: bool,
        relations: impl IntoIterator<Item = Relation>,
    ) -> Relation {
        self.joins.extend(relations.into_iter().map(|relation| Join {
            included,
            kind,
            relation: relation.fork(),
        }));
        self
    }

    //--------------------------------------------------------------------------
    // Traversal
    //--------------------------------------------------------------------------

    pub(crate) fn referenced_sources<'s>(&'s self, out: &mut Vec<&'s Source>) {
        self.target.referenced_sources(out);
        for join in &self.joins {
            join.relation.referenced_sources(out);
        }
    }

    pub(crate) fn find_source(&self, id: SourceId) -> Option<&Source> {
        self.target.find(id).or_else(|| {
            self.joins
                .iter()
                .find_map(|join| join.relation.find_source(id))
        })
    }

    /// Depth-first lookup by logical name
    pub(crate) fn find_relation(&self, name: &str) -> Option<&Relation> {
        if self.name == name {
            return Some(self);
        }
        self.joins
            .iter()
            .find_map(|join| join.relation.find_relation(name))
    }

    /// Columns of the target and of every nested relation
    pub(crate) fn total_columns(&self, schema: &dyn Schema) -> Result<usize> {
        let mut count = self.target.number_of_columns(schema)?;
        for join in &self.joins {
            count += join.relation.total_columns(schema)?;
        }
        Ok(count)
    }

    fn own_selection(&self) -> Vec<Selectable> {
        match &self.selection {
            Some(selection) => selection(self.target.as_ref()),
            None => vec![self.target.as_ref().star()],
        }
    }

    /// Selected columns, depth-first. Nested included relations contribute
    /// even when this relation is only joined.
    pub(crate) fn selection(&self, included: bool, out: &mut Vec<Selectable>) {
        if included {
            out.extend(self.own_selection());
        }
        for join in &self.joins {
            join.relation.selection(join.included, out);
        }
    }

    /// Row adapter for this relation, consuming selection slots in the same
    /// order as [`Relation::selection`].
    ///
    /// An included relation exposes the columns of its own slots. A joined
    /// relation exposes no columns, and only exists when it has variants.
    pub(crate) fn adapter(
        &self,
        included: bool,
        slot: &mut usize,
        offsets: &[usize],
    ) -> Option<RowAdapter> {
        let base = if included {
            let width = self.own_selection().len();
            let start = offsets.get(*slot).copied().unwrap_or_default();
            let end = offsets.get(*slot + width).copied().unwrap_or(start);
            *slot += width;
            Some(RowAdapter::range(start..end))
        } else {
            None
        };

        let mut variants = Vec::new();
        for join in &self.joins {
            if let Some(adapter) = join.relation.adapter(join.included, slot, offsets) {
                variants.push((join.relation.name.clone(), adapter));
            }
        }

        let adapter = match base {
            Some(adapter) => adapter,
            None if variants.is_empty() => return None,
            None => RowAdapter::empty(),
        };
        Some(
            variants
                .into_iter()
                .fold(adapter, |adapter, (name, variant)| adapter.with_variant(name, variant)),
        )
    }

    //--------------------------------------------------------------------------
    // Rendering
    //--------------------------------------------------------------------------

    fn check_mapping(&self, left: &Source, schema: &dyn Schema) -> Result<()> {
        check_columns(left, self.mapping.iter().map(|(column, _)| column), schema)?;
        check_columns(&self.target, self.mapping.iter().map(|(_, column)| column), schema)
    }

    /// Join condition terms: mapping equalities, then predicate conjuncts
    fn condition<'a>(&'a self, left: SourceRef, ctx: &RenderContext<'_>) -> Result<Vec<SQL<'a>>> {
        let right = self.target.as_ref();
        let mut terms = Vec::with_capacity(self.mapping.len() + self.predicates.len());
        for (left_column, right_column) in &self.mapping {
            let right_sql = column_sql(right, right_column, ctx)?;
            let left_sql = column_sql(left, left_column, ctx)?;
            terms.push(right_sql.push(Token::EQ).append(left_sql));
        }
        for predicate in &self.predicates {
            for term in predicate(left, right).into_conjuncts() {
                terms.push(term.render(ctx)?.into_owned());
            }
        }
        Ok(terms)
    }

    /// `KIND target [ON condition]`, then nested joins against the target.
    ///
    /// Once a LEFT join has been crossed, an INNER or CROSS join further
    /// down the chain would silently drop rows, so it is rejected.
    pub(crate) fn render_join<'a>(
        &'a self,
        ctx: &RenderContext<'_>,
        left: &Source,
        kind: JoinKind,
        inner_join_forbidden: bool,
    ) -> Result<SQL<'a>> {
        if inner_join_forbidden && kind != JoinKind::Left {
            return Err(RelqError::RequiredAfterOptional {
                relation: self.name.to_string(),
            });
        }
        self.check_mapping(left, ctx.schema)?;

        let mut sql = kind.keyword().append(self.target.render(ctx)?);
        if kind != JoinKind::Cross {
            let terms = self.condition(left.root().as_ref(), ctx)?;
            if !terms.is_empty() {
                sql = sql.push(Token::ON).append(SQL::join(terms, Token::AND));
            }
        }

        let forbidden = inner_join_forbidden || kind == JoinKind::Left;
        for join in &self.joins {
            sql.append_mut(join.relation.render_join(ctx, &self.target, join.kind, forbidden)?);
        }
        Ok(sql)
    }
}

/// Mapping columns must exist when the source is a plain table
fn check_columns<'m>(
    source: &Source,
    mut columns: impl Iterator<Item = &'m CompactString>,
    schema: &dyn Schema,
) -> Result<()> {
    let Source::Table(table) = source.root() else {
        return Ok(());
    };
    let known = schema.columns(table.table())?;
    match columns.find(|column| !known.iter().any(|c| c.eq_ignore_ascii_case(column))) {
        Some(column) => Err(RelqError::MissingColumn {
            table: Some(table.table().to_string()),
            column: column.to_string(),
            candidates: known.iter().map(ToString::to_string).collect(),
        }),
        None => Ok(()),
    }
}

fn column_sql<'a>(source: SourceRef, column: &'a str, ctx: &RenderContext<'_>) -> Result<SQL<'a>> {
    let sql = SQL::ident(column);
    Ok(match ctx.lookup(source.id(), column)? {
        Some(name) => SQL::ident(name.to_string()).push(Token::DOT).append(sql),
        None => sql,
    })
}

impl core::fmt::Debug for Relation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Relation")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("mapping", &self.mapping)
            .field("predicates", &self.predicates.len())
            .field("custom_selection", &self.selection.is_some())
            .field("joins", &self.joins)
            .finish()
    }
}
