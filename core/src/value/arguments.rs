use compact_str::CompactString;
use smallvec::SmallVec;

use super::Value;
use crate::error::{RelqError, Result};

/// Statement arguments: positional values in placeholder order, plus named values
/// for `:name` placeholders written in literal SQL.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Arguments {
    values: SmallVec<[Value; 8]>,
    named: Vec<(CompactString, Value)>,
}

impl Arguments {
    pub const fn new() -> Self {
        Self {
            values: SmallVec::new_const(),
            named: Vec::new(),
        }
    }

    /// Positional arguments, bound to `?` placeholders in order.
    pub fn positional<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            named: Vec::new(),
        }
    }

    /// Named arguments, bound to `:name`, `@name` or `$name` placeholders.
    ///
    /// A later pair with the same name replaces the earlier one.
    pub fn named<I, K, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<CompactString>,
        T: Into<Value>,
    {
        let mut arguments = Self::new();
        for (name, value) in pairs {
            arguments.set_named(name, value);
        }
        arguments
    }

    #[inline]
    pub fn push(&mut self, value: impl Into<Value>) {
        self.values.push(value.into());
    }

    pub fn set_named(&mut self, name: impl Into<CompactString>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.named.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.named.push((name, value)),
        }
    }

    /// Appends `other` after the current arguments.
    ///
    /// Named arguments merge; binding one name to two different values fails.
    pub fn append(&mut self, other: &Arguments) -> Result<()> {
        self.values.extend(other.values.iter().cloned());
        for (name, value) in &other.named {
            match self.get_named(name) {
                Some(existing) if existing != value => {
                    return Err(RelqError::ArgumentReused(name.to_string()));
                }
                Some(_) => {}
                None => self.named.push((name.clone(), value.clone())),
            }
        }
        Ok(())
    }

    /// Positional values in placeholder order
    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn named_values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.named.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn get_named(&self, name: &str) -> Option<&Value> {
        self.named
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len() + self.named.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.named.is_empty()
    }
}

impl<T: Into<Value>> FromIterator<T> for Arguments {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::positional(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_keeps_order_and_merges_names() {
        let mut args = Arguments::positional([1, 2]);
        let mut other = Arguments::positional(["a"]);
        other.set_named("name", "Arthur");
        args.append(&other).unwrap();
        args.append(&Arguments::named([("name", "Arthur")])).unwrap();

        assert_eq!(
            args.values(),
            &[Value::Integer(1), Value::Integer(2), Value::Text("a".into())]
        );
        assert_eq!(args.get_named("name"), Some(&Value::Text("Arthur".into())));
        assert_eq!(args.len(), 4);
    }

    #[test]
    fn conflicting_named_argument_is_rejected() {
        let mut args = Arguments::named([("id", 1)]);
        let err = args.append(&Arguments::named([("id", 2)])).unwrap_err();
        assert!(matches!(err, RelqError::ArgumentReused(name) if name == "id"));
    }
}
