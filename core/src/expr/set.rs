//! Set membership: IN, EXISTS, BETWEEN.

use super::{Expression, render_list};
use crate::error::Result;
use crate::query::SelectQuery;
use crate::source::RenderContext;
use crate::sql::{SQL, Token};

impl Expression {
    /// `(self IN (a, b, ...))`. An empty list renders as `0`.
    pub fn in_list<I, E>(self, list: I) -> Expression
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        Expression::In {
            expr: Box::new(self),
            list: list.into_iter().map(Into::into).collect(),
        }
    }

    /// `(self NOT IN (a, b, ...))`. An empty list renders as `1`.
    pub fn not_in_list<I, E>(self, list: I) -> Expression
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        !self.in_list(list)
    }

    /// `(self IN (SELECT ...))`
    pub fn in_query(self, query: SelectQuery) -> Expression {
        Expression::InSubquery {
            expr: Box::new(self),
            query: Box::new(query),
        }
    }

    /// `(self BETWEEN low AND high)`
    pub fn between(self, low: impl Into<Expression>, high: impl Into<Expression>) -> Expression {
        Expression::Between {
            expr: Box::new(self),
            low: Box::new(low.into()),
            high: Box::new(high.into()),
        }
    }
}

/// `(EXISTS (SELECT ...))`
pub fn exists(query: SelectQuery) -> Expression {
    Expression::Exists(Box::new(query))
}

pub(super) fn render_in<'a>(
    expr: &'a Expression,
    list: &'a [Expression],
    negated: bool,
    ctx: &RenderContext<'_>,
) -> Result<SQL<'a>> {
    if list.is_empty() {
        return Ok(SQL::raw(if negated { "1" } else { "0" }));
    }
    let mut sql = expr.render(ctx)?;
    if negated {
        sql.push_mut(Token::NOT);
    }
    Ok(sql
        .push(Token::IN)
        .append(render_list(list, ctx)?.parens())
        .parens())
}

pub(super) fn render_in_subquery<'a>(
    expr: &'a Expression,
    query: &'a SelectQuery,
    negated: bool,
    ctx: &RenderContext<'_>,
) -> Result<SQL<'a>> {
    let mut sql = expr.render(ctx)?;
    if negated {
        sql.push_mut(Token::NOT);
    }
    Ok(sql
        .push(Token::IN)
        .append(query.render_scoped(ctx.schema, Some(ctx))?.parens())
        .parens())
}

pub(super) fn render_exists<'a>(
    query: &'a SelectQuery,
    negated: bool,
    ctx: &RenderContext<'_>,
) -> Result<SQL<'a>> {
    let mut sql = if negated {
        SQL::token(Token::NOT)
    } else {
        SQL::empty()
    };
    sql.push_mut(Token::EXISTS);
    Ok(sql
        .append(query.render_scoped(ctx.schema, Some(ctx))?.parens())
        .parens())
}
