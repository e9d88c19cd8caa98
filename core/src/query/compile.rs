use core::fmt::Display;

use super::{OrderingTerm, SelectQuery, Selectable};
use crate::error::Result;
use crate::expr::render_list;
use crate::schema::Schema;
use crate::source::{RenderContext, Source, SourceNames};
use crate::sql::{SQL, Token};
use crate::value::Arguments;

/// Rendered statement: SQL text and its arguments in placeholder order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompiledQuery {
    pub sql: String,
    pub arguments: Arguments,
}

impl Display for CompiledQuery {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.sql)
    }
}

impl SelectQuery {
    /// Renders the statement, resolving alias collisions across the whole
    /// source graph first.
    pub fn compile(&self, schema: &dyn Schema) -> Result<CompiledQuery> {
        let (sql, arguments) = self.render_scoped(schema, None)?.build()?;
        crate::relq_trace_compile!(sql, arguments.len());
        Ok(CompiledQuery { sql, arguments })
    }

    /// Renders as a statement with its own naming scope. `parent` is the
    /// enclosing statement, whose sources stay visible for correlated columns.
    pub(crate) fn render_scoped<'a>(
        &'a self,
        schema: &dyn Schema,
        parent: Option<&RenderContext<'_>>,
    ) -> Result<SQL<'a>> {
        let names = SourceNames::resolve(self.source.as_ref(), parent)?;
        let ctx = RenderContext::new(schema, names, parent);
        self.render_with(&ctx)
    }

    /// Renders within an existing scope (FROM subqueries)
    pub(crate) fn render_with<'a>(&'a self, ctx: &RenderContext<'_>) -> Result<SQL<'a>> {
        let mut sql = SQL::token(Token::SELECT);
        if self.distinct {
            sql.push_mut(Token::DISTINCT);
        }
        sql.append_mut(self.render_selection(ctx)?);

        if let Some(source) = &self.source {
            sql = sql.push(Token::FROM).append(source.render(ctx)?);
        }
        if let Some(filter) = &self.filter {
            sql = sql.push(Token::WHERE).append(filter.render(ctx)?);
        }
        if !self.group_by.is_empty() {
            sql = sql
                .push(Token::GROUP)
                .push(Token::BY)
                .append(render_list(&self.group_by, ctx)?);
        }
        if let Some(having) = &self.having {
            sql = sql.push(Token::HAVING).append(having.render(ctx)?);
        }
        if let Some(ordering) = self.render_ordering(ctx)? {
            sql = sql.push(Token::ORDER).push(Token::BY).append(ordering);
        }
        if let Some(limit) = &self.limit {
            sql = sql.push(Token::LIMIT).append(SQL::number(limit.limit));
            if let Some(offset) = limit.offset {
                sql = sql.push(Token::OFFSET).append(SQL::number(offset));
            }
        }
        Ok(sql)
    }

    fn render_selection<'a>(&'a self, ctx: &RenderContext<'_>) -> Result<SQL<'a>> {
        let extra = self.relation_selection();

        // Plain `*` only for the whole source, which has no joined columns
        if extra.is_empty()
            && let ([Selectable::Star(id)], Some(source)) = (self.selection.as_slice(), &self.source)
            && *id == source.id()
        {
            return Ok(SQL::token(Token::STAR));
        }

        let mut rendered = Vec::with_capacity(self.selection.len() + extra.len());
        for selectable in &self.selection {
            rendered.push(selectable.render(ctx)?);
        }
        for selectable in &extra {
            rendered.push(selectable.render(ctx)?.into_owned());
        }
        Ok(SQL::join(rendered, Token::COMMA))
    }

    fn render_ordering<'a>(&'a self, ctx: &RenderContext<'_>) -> Result<Option<SQL<'a>>> {
        if self.orderings.is_empty() {
            if !self.reversed {
                return Ok(None);
            }
            // Assumes no user column shadows _rowid_
            let Some(Source::Table(table)) = self.source.as_ref().map(Source::root) else {
                return Ok(None);
            };
            let rowid = SQL::raw("_rowid_");
            let rowid = match ctx.name_of(table.id()) {
                Some(name) => SQL::ident(name.to_string()).push(Token::DOT).append(rowid),
                None => rowid,
            };
            return Ok(Some(rowid.push(Token::DESC)));
        }

        let terms = self
            .orderings
            .iter()
            .map(|term: &OrderingTerm| term.render(self.reversed, ctx))
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(SQL::join(terms, Token::COMMA)))
    }
}
