use std::sync::Arc;

use super::{ProjectionPlan, RowBinding};
use crate::error::{RelqError, Result};
use crate::value::{FromValue, Value};

/// One fetched row: the statement's values and the statement's plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<Value>,
    plan: Arc<ProjectionPlan>,
}

impl Row {
    pub fn new(values: Vec<Value>, plan: Arc<ProjectionPlan>) -> Self {
        Self { values, plan }
    }

    /// Every statement value, in column order
    #[inline]
    pub fn raw_values(&self) -> &[Value] {
        &self.values
    }

    #[inline]
    pub fn plan(&self) -> &Arc<ProjectionPlan> {
        &self.plan
    }

    /// The root row
    #[inline]
    pub fn view(&self) -> RowView<'_> {
        RowView {
            values: &self.values,
            binding: self.plan.binding(),
        }
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.view().value(name)
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.view().get(index)
    }

    pub fn get_as<T: FromValue>(&self, name: &str) -> Result<T> {
        self.view().get_as(name)
    }

    pub fn variant(&self, name: &str) -> Option<RowView<'_>> {
        self.view().variant(name)
    }

    pub fn len(&self) -> usize {
        self.view().len()
    }

    pub fn is_empty(&self) -> bool {
        self.view().is_empty()
    }
}

/// A row or variant, borrowed from a [`Row`].
#[derive(Debug, Clone, Copy)]
pub struct RowView<'r> {
    values: &'r [Value],
    binding: &'r RowBinding,
}

impl<'r> RowView<'r> {
    /// Value of the first column named `name`, ignoring case
    pub fn value(&self, name: &str) -> Option<&'r Value> {
        self.binding
            .index_of(name)
            .and_then(|index| self.values.get(index))
    }

    /// Value at a column index of this view
    pub fn get(&self, index: usize) -> Option<&'r Value> {
        self.binding
            .statement_index(index)
            .and_then(|index| self.values.get(index))
    }

    /// Converted value of the first column named `name`
    pub fn get_as<T: FromValue>(&self, name: &str) -> Result<T> {
        let Some(value) = self.value(name) else {
            return Err(RelqError::MissingColumn {
                table: None,
                column: name.to_string(),
                candidates: self.column_names().map(ToString::to_string).collect(),
            });
        };
        value.convert()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &'r str> + use<'r> {
        self.binding.column_names()
    }

    /// Values of this view, in column order
    pub fn values(&self) -> impl Iterator<Item = &'r Value> + use<'r> {
        let (values, binding) = (self.values, self.binding);
        (0..binding.len()).filter_map(move |index| {
            binding
                .statement_index(index)
                .and_then(|index| values.get(index))
        })
    }

    /// Nested row of an included relation
    pub fn variant(&self, name: &str) -> Option<RowView<'r>> {
        self.binding.variant(name).map(|binding| RowView {
            values: self.values,
            binding,
        })
    }

    pub fn variant_names(&self) -> impl Iterator<Item = &'r str> + use<'r> {
        self.binding.variant_names()
    }

    /// True when the view has no columns
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.binding.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.binding.len()
    }

    /// True when every column is NULL, as for a LEFT JOIN without a match
    pub fn is_all_null(&self) -> bool {
        self.values().all(Value::is_null)
    }
}
