//! Comparison operators.
//!
//! Comparing with a NULL literal is rewritten to `IS NULL` / `IS NOT NULL`,
//! whichever side the NULL is on.

use super::Expression;
use crate::error::Result;
use crate::source::RenderContext;
use crate::sql::{SQL, SQLChunk, Token};

impl Expression {
    /// `(self = rhs)`, or `(self IS NULL)` against NULL
    pub fn eq(self, rhs: impl Into<Expression>) -> Expression {
        Expression::Equal(Box::new(self), Box::new(rhs.into()))
    }

    /// `(self <> rhs)`, or `(self IS NOT NULL)` against NULL
    pub fn ne(self, rhs: impl Into<Expression>) -> Expression {
        Expression::NotEqual(Box::new(self), Box::new(rhs.into()))
    }

    pub fn is(self, rhs: impl Into<Expression>) -> Expression {
        Expression::Is(Box::new(self), Box::new(rhs.into()))
    }

    pub fn is_not(self, rhs: impl Into<Expression>) -> Expression {
        Expression::IsNot(Box::new(self), Box::new(rhs.into()))
    }

    pub fn lt(self, rhs: impl Into<Expression>) -> Expression {
        Expression::infix("<", self, rhs)
    }

    pub fn le(self, rhs: impl Into<Expression>) -> Expression {
        Expression::infix("<=", self, rhs)
    }

    pub fn gt(self, rhs: impl Into<Expression>) -> Expression {
        Expression::infix(">", self, rhs)
    }

    pub fn ge(self, rhs: impl Into<Expression>) -> Expression {
        Expression::infix(">=", self, rhs)
    }
}

/// Orders the operands so that a NULL literal, if any, ends up on the right
fn null_last<'e>(lhs: &'e Expression, rhs: &'e Expression) -> (&'e Expression, &'e Expression) {
    if lhs.is_null_value() && !rhs.is_null_value() {
        (rhs, lhs)
    } else {
        (lhs, rhs)
    }
}

fn render_is_null<'a>(
    expr: &'a Expression,
    negated: bool,
    ctx: &RenderContext<'_>,
) -> Result<SQL<'a>> {
    let mut sql = expr.render(ctx)?.push(Token::IS);
    if negated {
        sql.push_mut(Token::NOT);
    }
    Ok(sql.push(Token::NULL).parens())
}

pub(super) fn render_equal<'a>(
    lhs: &'a Expression,
    rhs: &'a Expression,
    negated: bool,
    ctx: &RenderContext<'_>,
) -> Result<SQL<'a>> {
    let (lhs, rhs) = null_last(lhs, rhs);
    if rhs.is_null_value() {
        return render_is_null(lhs, negated, ctx);
    }
    let op = if negated { Token::NE } else { Token::EQ };
    Ok(lhs
        .render(ctx)?
        .push(SQLChunk::Token(op))
        .append(rhs.render(ctx)?)
        .parens())
}

pub(super) fn render_is<'a>(
    lhs: &'a Expression,
    rhs: &'a Expression,
    negated: bool,
    ctx: &RenderContext<'_>,
) -> Result<SQL<'a>> {
    let (lhs, rhs) = null_last(lhs, rhs);
    if rhs.is_null_value() {
        return render_is_null(lhs, negated, ctx);
    }
    let mut sql = lhs.render(ctx)?.push(Token::IS);
    if negated {
        sql.push_mut(Token::NOT);
    }
    Ok(sql.append(rhs.render(ctx)?).parens())
}
