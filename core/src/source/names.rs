use compact_str::{CompactString, format_compact};
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use super::{Source, SourceId};
use crate::error::{RelqError, Result};
use crate::schema::Schema;

/// Final SQL names of every source occurrence in one query scope.
#[derive(Debug, Clone, Default)]
pub(crate) struct SourceNames {
    names: HashMap<SourceId, Option<CompactString>>,
}

impl SourceNames {
    /// Resolves name collisions across the whole FROM tree.
    ///
    /// Occurrences sharing a name (ASCII case-insensitive, as SQLite compares
    /// identifiers) are numbered in traversal order: `a0`, `a1`, ... Suffixes
    /// already in use are skipped. Explicit aliases keep their name; two
    /// explicit aliases in one group are an error.
    ///
    /// Names visible from `enclosing` scopes count as taken, so a subquery
    /// over the same table as its outer statement gets a numbered name and
    /// correlated columns keep pointing at the outer occurrence.
    pub(crate) fn resolve(
        source: Option<&Source>,
        enclosing: Option<&RenderContext<'_>>,
    ) -> Result<Self> {
        let mut resolved = SourceNames::default();
        let Some(source) = source else {
            return Ok(resolved);
        };

        let mut referenced = Vec::new();
        source.referenced_sources(&mut referenced);

        let mut seen = HashSet::new();
        let mut groups: HashMap<CompactString, SmallVec<[&Source; 4]>> = HashMap::new();
        let mut group_order = Vec::new();
        for source in referenced {
            if !seen.insert(source.id()) {
                continue;
            }
            let name = source.name().map(CompactString::from);
            if let Some(name) = &name {
                let key = name.to_ascii_lowercase();
                let group = groups.entry(key.clone()).or_insert_with(|| {
                    group_order.push(key);
                    SmallVec::new()
                });
                group.push(source);
            }
            resolved.names.insert(source.id(), name);
        }

        let outer: HashSet<CompactString> = enclosing
            .map(|ctx| ctx.visible_names().map(|name| CompactString::from(name.to_ascii_lowercase())).collect())
            .unwrap_or_default();

        // Names that stay as written: explicit aliases and unshared names
        let mut taken = outer.clone();
        let mut renamed_groups = Vec::new();
        for key in &group_order {
            let members = &groups[key];
            let explicit: SmallVec<[&Source; 2]> = members
                .iter()
                .copied()
                .filter(|source| is_explicit(source))
                .collect();
            if explicit.len() > 1 {
                let name = explicit[0].name().unwrap_or_default();
                return Err(RelqError::DuplicateAlias(name.to_string()));
            }
            let renamed: SmallVec<[&Source; 4]> = members
                .iter()
                .copied()
                .filter(|source| !is_explicit(source))
                .collect();
            if (members.len() < 2 && !outer.contains(key)) || renamed.is_empty() {
                taken.insert(key.clone());
                continue;
            }
            if !explicit.is_empty() {
                taken.insert(key.clone());
            }
            renamed_groups.push(renamed);
        }

        for renamed in renamed_groups {
            let mut index = 0usize;
            for source in renamed {
                let name = source.name().unwrap_or_default();
                let numbered = loop {
                    let candidate = format_compact!("{name}{index}");
                    index += 1;
                    if taken.insert(candidate.to_ascii_lowercase()) {
                        break candidate;
                    }
                };
                crate::relq_trace_alias!(name, numbered);
                resolved.names.insert(source.id(), Some(numbered));
            }
        }

        let mut unique = HashSet::new();
        for name in resolved.names.values().flatten() {
            if !unique.insert(name.to_ascii_lowercase()) {
                return Err(RelqError::AmbiguousSource(name.to_string()));
            }
        }

        Ok(resolved)
    }

    /// `None` when the id is unknown, `Some(None)` for an unnamed source
    #[inline]
    pub(crate) fn get(&self, id: SourceId) -> Option<Option<&str>> {
        self.names.get(&id).map(|name| name.as_deref())
    }
}

fn is_explicit(source: &Source) -> bool {
    source.alias().is_some_and(|alias| alias.explicit)
}

/// Rendering scope: the resolved names of the statement being rendered, the
/// enclosing statement's scope for correlated subqueries, and the schema used
/// to validate column mappings.
pub(crate) struct RenderContext<'c> {
    pub(crate) schema: &'c dyn Schema,
    names: SourceNames,
    parent: Option<&'c RenderContext<'c>>,
}

impl<'c> RenderContext<'c> {
    pub(crate) fn new(
        schema: &'c dyn Schema,
        names: SourceNames,
        parent: Option<&'c RenderContext<'c>>,
    ) -> Self {
        Self {
            schema,
            names,
            parent,
        }
    }

    /// Final name of a source, searching enclosing scopes.
    ///
    /// `column` only labels the error for a source outside every scope.
    pub(crate) fn lookup(&self, id: SourceId, column: &str) -> Result<Option<&str>> {
        let mut scope = Some(self);
        while let Some(ctx) = scope {
            if let Some(name) = ctx.names.get(id) {
                return Ok(name);
            }
            scope = ctx.parent;
        }
        Err(RelqError::DetachedSource {
            column: column.to_string(),
        })
    }

    /// Names of every source in this scope and the scopes around it
    pub(crate) fn visible_names(&self) -> impl Iterator<Item = &str> {
        core::iter::successors(Some(self), |ctx| ctx.parent)
            .flat_map(|ctx| ctx.names.names.values().flatten().map(CompactString::as_str))
    }

    #[inline]
    pub(crate) fn name_of(&self, id: SourceId) -> Option<&str> {
        self.lookup(id, "").ok().flatten()
    }
}
