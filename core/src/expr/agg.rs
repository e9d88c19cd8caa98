//! Function calls and aggregates.

use compact_str::CompactString;

use super::Expression;
use crate::error::Result;
use crate::query::Selectable;
use crate::source::RenderContext;
use crate::sql::{SQL, Token};

/// Function call: `NAME(arg, ...)`
pub fn func<I, E>(name: impl Into<CompactString>, args: I) -> Expression
where
    I: IntoIterator<Item = E>,
    E: Into<Expression>,
{
    Expression::Function {
        name: name.into(),
        args: args.into_iter().map(Into::into).collect(),
    }
}

/// `COUNT(*)` for a star, `COUNT(expr)` otherwise
pub fn count(counted: impl Into<Selectable>) -> Expression {
    Expression::Count(Box::new(counted.into()))
}

/// `COUNT(DISTINCT expr)`
pub fn count_distinct(expr: impl Into<Expression>) -> Expression {
    Expression::CountDistinct(Box::new(expr.into()))
}

pub fn abs(expr: impl Into<Expression>) -> Expression {
    func("ABS", [expr])
}

pub fn avg(expr: impl Into<Expression>) -> Expression {
    func("AVG", [expr])
}

pub fn length(expr: impl Into<Expression>) -> Expression {
    func("LENGTH", [expr])
}

pub fn lower(expr: impl Into<Expression>) -> Expression {
    func("LOWER", [expr])
}

pub fn upper(expr: impl Into<Expression>) -> Expression {
    func("UPPER", [expr])
}

pub fn max(expr: impl Into<Expression>) -> Expression {
    func("MAX", [expr])
}

pub fn min(expr: impl Into<Expression>) -> Expression {
    func("MIN", [expr])
}

pub fn sum(expr: impl Into<Expression>) -> Expression {
    func("SUM", [expr])
}

pub(super) fn render_count<'a>(
    counted: &'a Selectable,
    ctx: &RenderContext<'_>,
) -> Result<SQL<'a>> {
    let inner = match counted {
        // COUNT("t".*) is not valid SQL; every star counts rows
        Selectable::Star(id) => {
            ctx.lookup(*id, "*")?;
            SQL::token(Token::STAR)
        }
        Selectable::Expression(expr) | Selectable::Aliased { expr, .. } => expr.render(ctx)?,
    };
    Ok(SQL::func("COUNT", inner))
}
