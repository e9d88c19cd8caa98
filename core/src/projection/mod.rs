//! Row projection: splitting one flat result row into the root row and a
//! tree of named variants, one per included relation.
//!
//! A [`RowAdapter`] describes which physical columns a row exposes. Binding it
//! to a statement's column names yields a [`RowBinding`]; the bound layout is
//! computed once per statement and shared by every row through
//! [`ProjectionPlan`].

mod row;

pub use row::*;

use compact_str::CompactString;
use core::ops::Range;

use crate::error::{RelqError, Result};
use crate::query::SelectQuery;
use crate::schema::Schema;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Layout {
    All,
    Suffix(usize),
    Range(Range<usize>),
    /// `(consumed statement column, produced name)`
    Mapping(Vec<(CompactString, CompactString)>),
    Empty,
}

/// Column layout of a row, with nested variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowAdapter {
    layout: Layout,
    variants: Vec<(CompactString, RowAdapter)>,
}

impl RowAdapter {
    fn with_layout(layout: Layout) -> Self {
        Self {
            layout,
            variants: Vec::new(),
        }
    }

    /// Every statement column
    pub fn all() -> Self {
        Self::with_layout(Layout::All)
    }

    /// Statement columns from index `from` to the end
    pub fn suffix(from: usize) -> Self {
        Self::with_layout(Layout::Suffix(from))
    }

    /// Statement columns in `range`
    pub fn range(range: Range<usize>) -> Self {
        Self::with_layout(Layout::Range(range))
    }

    /// Statement columns picked by name, exposed under new names.
    ///
    /// Each pair is `(statement column, exposed name)`; lookup is
    /// case-insensitive and takes the leftmost match.
    pub fn mapping<I, C, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, P)>,
        C: Into<CompactString>,
        P: Into<CompactString>,
    {
        Self::with_layout(Layout::Mapping(
            pairs
                .into_iter()
                .map(|(consumed, produced)| (consumed.into(), produced.into()))
                .collect(),
        ))
    }

    /// No columns. Useful as a parent of variants.
    pub fn empty() -> Self {
        Self::with_layout(Layout::Empty)
    }

    /// Adds a named variant, replacing one with the same name
    pub fn with_variant(mut self, name: impl Into<CompactString>, adapter: RowAdapter) -> Self {
        let name = name.into();
        match self.variants.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => *existing = adapter,
            None => self.variants.push((name, adapter)),
        }
        self
    }

    pub fn variants(&self) -> impl Iterator<Item = (&str, &RowAdapter)> {
        self.variants
            .iter()
            .map(|(name, adapter)| (name.as_str(), adapter))
    }

    /// Resolves the layout against a statement's columns
    pub fn bind(&self, column_names: &[CompactString]) -> Result<RowBinding> {
        let out_of_bounds = |end: usize| RelqError::ColumnCountMismatch {
            expected: end,
            actual: column_names.len(),
        };
        let indexed = |range: Range<usize>| -> Vec<(usize, CompactString)> {
            range.map(|i| (i, column_names[i].clone())).collect()
        };

        let columns = match &self.layout {
            Layout::All => indexed(0..column_names.len()),
            Layout::Suffix(from) if *from > column_names.len() => {
                return Err(out_of_bounds(*from));
            }
            Layout::Suffix(from) => indexed(*from..column_names.len()),
            Layout::Range(range) if range.start > range.end || range.end > column_names.len() => {
                return Err(out_of_bounds(range.end));
            }
            Layout::Range(range) => indexed(range.clone()),
            Layout::Mapping(pairs) => pairs
                .iter()
                .map(|(consumed, produced)| {
                    column_names
                        .iter()
                        .position(|name| name.eq_ignore_ascii_case(consumed))
                        .map(|index| (index, produced.clone()))
                        .ok_or_else(|| RelqError::MissingColumn {
                            table: None,
                            column: consumed.to_string(),
                            candidates: column_names.iter().map(ToString::to_string).collect(),
                        })
                })
                .collect::<Result<Vec<_>>>()?,
            Layout::Empty => Vec::new(),
        };

        let variants = self
            .variants
            .iter()
            .map(|(name, adapter)| Ok((name.clone(), adapter.bind(column_names)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(RowBinding { columns, variants })
    }
}

/// A [`RowAdapter`] resolved against a statement's columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowBinding {
    /// `(statement column index, exposed name)`
    columns: Vec<(usize, CompactString)>,
    variants: Vec<(CompactString, RowBinding)>,
}

impl RowBinding {
    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(_, name)| name.as_str())
    }

    /// Statement column index of the exposed column `index`
    #[inline]
    pub fn statement_index(&self, index: usize) -> Option<usize> {
        self.columns.get(index).map(|(i, _)| *i)
    }

    /// Statement column index of the first column named `name`, ignoring case
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|(_, column)| column.eq_ignore_ascii_case(name))
            .map(|(i, _)| *i)
    }

    pub fn variant(&self, name: &str) -> Option<&RowBinding> {
        self.variants
            .iter()
            .find(|(variant, _)| variant == name)
            .map(|(_, binding)| binding)
    }

    pub fn variant_names(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|(name, _)| name.as_str())
    }
}

/// Row layout of one prepared statement, shared by all of its rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionPlan {
    column_names: Vec<CompactString>,
    binding: RowBinding,
}

impl ProjectionPlan {
    pub fn new(adapter: &RowAdapter, column_names: Vec<CompactString>) -> Result<Self> {
        let binding = adapter.bind(&column_names)?;
        Ok(Self {
            column_names,
            binding,
        })
    }

    /// Columns of the statement, in order
    #[inline]
    pub fn statement_columns(&self) -> &[CompactString] {
        &self.column_names
    }

    #[inline]
    pub fn binding(&self) -> &RowBinding {
        &self.binding
    }
}

impl SelectQuery {
    /// Row adapter matching the compiled selection.
    ///
    /// The root row exposes every column. Each included relation exposes the
    /// slice of columns its selection produced. A relation that is only
    /// joined exposes nothing, but still carries the variants of the
    /// relations included below it.
    pub fn row_adapter(&self, schema: &dyn Schema) -> Result<RowAdapter> {
        let emitted = self.emitted_selection();
        let mut offsets = Vec::with_capacity(emitted.len() + 1);
        let mut offset = 0;
        offsets.push(offset);
        for selectable in &emitted {
            offset += self.selectable_width(selectable, schema)?;
            offsets.push(offset);
        }

        let mut adapter = RowAdapter::all();
        let Some(crate::source::Source::JoinTree(tree)) = self.source() else {
            return Ok(adapter);
        };
        let mut slot = self.selection().len();
        for join in tree.joins() {
            if let Some(variant) = join.relation.adapter(join.included, &mut slot, &offsets) {
                adapter = adapter.with_variant(join.relation.name(), variant);
            }
        }
        Ok(adapter)
    }

    /// Projection plan for a statement compiled from this query.
    ///
    /// `column_names` are the statement's result columns; their count must
    /// match the selection expanded against `schema`.
    pub fn projection(
        &self,
        schema: &dyn Schema,
        column_names: Vec<CompactString>,
    ) -> Result<ProjectionPlan> {
        let expected = self.number_of_columns(schema)?;
        if expected != column_names.len() {
            return Err(RelqError::ColumnCountMismatch {
                expected,
                actual: column_names.len(),
            });
        }
        ProjectionPlan::new(&self.row_adapter(schema)?, column_names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(names: &[&str]) -> Vec<CompactString> {
        names.iter().map(|name| CompactString::from(*name)).collect()
    }

    #[test]
    fn layouts() {
        let columns = names(&["id", "name", "id", "ownerId"]);

        let binding = RowAdapter::suffix(2).bind(&columns).unwrap();
        assert_eq!(binding.column_names().collect::<Vec<_>>(), ["id", "ownerId"]);
        assert_eq!(binding.statement_index(0), Some(2));

        let binding = RowAdapter::range(1..3).bind(&columns).unwrap();
        assert_eq!(binding.column_names().collect::<Vec<_>>(), ["name", "id"]);

        let binding = RowAdapter::mapping([("OWNERID", "owner"), ("id", "key")])
            .bind(&columns)
            .unwrap();
        assert_eq!(binding.column_names().collect::<Vec<_>>(), ["owner", "key"]);
        assert_eq!(binding.index_of("key"), Some(0));

        assert!(RowAdapter::empty().bind(&columns).unwrap().is_empty());
    }

    #[test]
    fn mapping_reports_missing_columns() {
        let err = RowAdapter::mapping([("missing", "x")])
            .bind(&names(&["id", "name"]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Mapping references missing column \"missing\". Valid column names are: id, name."
        );
    }

    #[test]
    fn out_of_range_layouts_are_errors() {
        let columns = names(&["id"]);
        assert!(matches!(
            RowAdapter::range(0..3).bind(&columns),
            Err(RelqError::ColumnCountMismatch { expected: 3, actual: 1 })
        ));
        assert!(RowAdapter::suffix(2).bind(&columns).is_err());
    }

    #[test]
    fn variants_bind_against_statement_columns() {
        let adapter = RowAdapter::range(0..1)
            .with_variant("a", RowAdapter::empty().with_variant("b", RowAdapter::suffix(1)));
        let binding = adapter.bind(&names(&["x", "y"])).unwrap();
        let a = binding.variant("a").unwrap();
        assert!(a.is_empty());
        let b = a.variant("b").unwrap();
        assert_eq!(b.column_names().collect::<Vec<_>>(), ["y"]);
        assert!(binding.variant("b").is_none());
    }
}
