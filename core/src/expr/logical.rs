//! Logical operators (AND, OR, NOT).
//!
//! ```ignore
//! // Function style
//! and([condition1, condition2])
//! not(condition)
//!
//! // Operator style (via std::ops traits)
//! condition1 & condition2   // BitAnd
//! condition1 | condition2   // BitOr
//! !condition                // Not
//! ```
//!
//! Conjunctions and disjunctions flatten, so `(a & b) & c` and `a & (b & c)`
//! build the same `(a AND b AND c)`.

use core::ops::{BitAnd, BitOr, Not};

use super::{Expression, set};
use crate::error::Result;
use crate::source::RenderContext;
use crate::sql::{SQL, Token};

/// Logical AND of all conditions. An empty conjunction renders as `1`.
pub fn and<I, E>(conditions: I) -> Expression
where
    I: IntoIterator<Item = E>,
    E: Into<Expression>,
{
    let mut terms = Vec::new();
    for condition in conditions {
        match condition.into() {
            Expression::And(inner) => terms.extend(inner),
            other => terms.push(other),
        }
    }
    match terms.len() {
        1 => terms.pop().unwrap_or(Expression::And(Vec::new())),
        _ => Expression::And(terms),
    }
}

/// Logical OR of all conditions. An empty disjunction renders as `0`.
pub fn or<I, E>(conditions: I) -> Expression
where
    I: IntoIterator<Item = E>,
    E: Into<Expression>,
{
    let mut terms = Vec::new();
    for condition in conditions {
        match condition.into() {
            Expression::Or(inner) => terms.extend(inner),
            other => terms.push(other),
        }
    }
    match terms.len() {
        1 => terms.pop().unwrap_or(Expression::Or(Vec::new())),
        _ => Expression::Or(terms),
    }
}

/// Logical NOT.
pub fn not(expr: impl Into<Expression>) -> Expression {
    Expression::Not(Box::new(expr.into()))
}

impl Expression {
    pub fn and(self, rhs: impl Into<Expression>) -> Expression {
        and([self, rhs.into()])
    }

    pub fn or(self, rhs: impl Into<Expression>) -> Expression {
        or([self, rhs.into()])
    }

    /// Conjunction terms: the members of an AND, or the expression itself
    pub(crate) fn into_conjuncts(self) -> Vec<Expression> {
        match self {
            Expression::And(terms) => terms,
            other => vec![other],
        }
    }
}

impl BitAnd for Expression {
    type Output = Expression;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl BitOr for Expression {
    type Output = Expression;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl Not for Expression {
    type Output = Expression;

    fn not(self) -> Self::Output {
        not(self)
    }
}

pub(super) fn render_connective<'a>(
    terms: &'a [Expression],
    connective: Token,
    ctx: &RenderContext<'_>,
) -> Result<SQL<'a>> {
    match terms {
        [] => Ok(SQL::raw(if connective == Token::AND { "1" } else { "0" })),
        [single] => single.render(ctx),
        _ => {
            let rendered = terms
                .iter()
                .map(|term| term.render(ctx))
                .collect::<Result<Vec<_>>>()?;
            Ok(SQL::join(rendered, connective).parens())
        }
    }
}

/// NOT pushes into the operand where SQL has a direct negated form.
pub(super) fn render_not<'a>(expr: &'a Expression, ctx: &RenderContext<'_>) -> Result<SQL<'a>> {
    match expr {
        Expression::Not(inner) => inner.render(ctx),
        Expression::In { expr, list } => set::render_in(expr, list, true, ctx),
        Expression::InSubquery { expr, query } => set::render_in_subquery(expr, query, true, ctx),
        Expression::Exists(query) => set::render_exists(query, true, ctx),
        Expression::Equal(lhs, rhs) => super::cmp::render_equal(lhs, rhs, true, ctx),
        Expression::NotEqual(lhs, rhs) => super::cmp::render_equal(lhs, rhs, false, ctx),
        Expression::Is(lhs, rhs) => super::cmp::render_is(lhs, rhs, true, ctx),
        Expression::IsNot(lhs, rhs) => super::cmp::render_is(lhs, rhs, false, ctx),
        other => Ok(SQL::token(Token::NOT).append(other.render(ctx)?).parens()),
    }
}
