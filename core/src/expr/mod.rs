//! SQL scalar expressions.
//!
//! [`Expression`] is a closed tree. Constructors live next to the operator
//! family they build:
//!
//! ```ignore
//! let adult = persons.column("age").ge(18) & persons.column("name").is_not(Value::Null);
//! let named = col("email").collate("NOCASE").in_list(["a@x.io", "b@x.io"]);
//! ```

mod agg;
mod cmp;
mod logical;
mod set;

pub use agg::*;
pub use logical::*;
pub use set::*;

use compact_str::CompactString;

use crate::error::Result;
use crate::query::{OrderingTerm, SelectQuery, Selectable};
use crate::source::RenderContext;
use crate::sql::{SQL, SQLChunk, Token};
use crate::value::{Arguments, Value};

#[derive(Debug, Clone)]
pub enum Expression {
    /// Caller-written SQL, optionally with its own arguments
    Literal {
        sql: String,
        arguments: Option<Arguments>,
    },
    /// Bound value; NULL is written inline
    Value(Value),
    /// Column, optionally qualified by a source occurrence
    Column {
        source: Option<crate::source::SourceId>,
        name: CompactString,
    },
    Collate {
        expr: Box<Expression>,
        collation: CompactString,
    },
    Not(Box<Expression>),
    Equal(Box<Expression>, Box<Expression>),
    NotEqual(Box<Expression>, Box<Expression>),
    Is(Box<Expression>, Box<Expression>),
    IsNot(Box<Expression>, Box<Expression>),
    Prefix {
        op: CompactString,
        expr: Box<Expression>,
    },
    Infix {
        op: CompactString,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    /// Conjunction, flattened on construction
    And(Vec<Expression>),
    /// Disjunction, flattened on construction
    Or(Vec<Expression>),
    In {
        expr: Box<Expression>,
        list: Vec<Expression>,
    },
    InSubquery {
        expr: Box<Expression>,
        query: Box<SelectQuery>,
    },
    Exists(Box<SelectQuery>),
    Between {
        expr: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
    },
    Function {
        name: CompactString,
        args: Vec<Expression>,
    },
    Count(Box<Selectable>),
    CountDistinct(Box<Expression>),
}

/// Unqualified column reference: `"name"`
pub fn col(name: impl Into<CompactString>) -> Expression {
    Expression::Column {
        source: None,
        name: name.into(),
    }
}

/// Bound value: `?`, or `NULL`
pub fn value(value: impl Into<Value>) -> Expression {
    Expression::Value(value.into())
}

/// Raw SQL text, written as is
pub fn literal(sql: impl Into<String>) -> Expression {
    Expression::Literal {
        sql: sql.into(),
        arguments: None,
    }
}

/// Raw SQL text with its own arguments. `?` placeholders consume the
/// positional values in order; `:name` placeholders use the named ones.
pub fn literal_with(sql: impl Into<String>, arguments: Arguments) -> Expression {
    Expression::Literal {
        sql: sql.into(),
        arguments: Some(arguments),
    }
}

impl Expression {
    /// `expr COLLATE name`
    pub fn collate(self, collation: impl Into<CompactString>) -> Expression {
        Expression::Collate {
            expr: Box::new(self),
            collation: collation.into(),
        }
    }

    /// Unary operator written flush against its operand, e.g. `-x`
    pub fn prefix(op: impl Into<CompactString>, expr: impl Into<Expression>) -> Expression {
        Expression::Prefix {
            op: op.into(),
            expr: Box::new(expr.into()),
        }
    }

    /// Binary operator: `(lhs OP rhs)`
    pub fn infix(
        op: impl Into<CompactString>,
        lhs: impl Into<Expression>,
        rhs: impl Into<Expression>,
    ) -> Expression {
        Expression::Infix {
            op: op.into(),
            lhs: Box::new(lhs.into()),
            rhs: Box::new(rhs.into()),
        }
    }

    #[inline]
    pub fn is_null_value(&self) -> bool {
        matches!(self, Expression::Value(Value::Null))
    }

    pub fn neg(self) -> Expression {
        Expression::prefix("-", self)
    }

    pub fn add(self, rhs: impl Into<Expression>) -> Expression {
        Expression::infix("+", self, rhs)
    }

    pub fn sub(self, rhs: impl Into<Expression>) -> Expression {
        Expression::infix("-", self, rhs)
    }

    pub fn mul(self, rhs: impl Into<Expression>) -> Expression {
        Expression::infix("*", self, rhs)
    }

    pub fn div(self, rhs: impl Into<Expression>) -> Expression {
        Expression::infix("/", self, rhs)
    }

    pub fn concat(self, rhs: impl Into<Expression>) -> Expression {
        Expression::infix("||", self, rhs)
    }

    pub fn like(self, pattern: impl Into<Expression>) -> Expression {
        Expression::infix("LIKE", self, pattern)
    }

    pub fn glob(self, pattern: impl Into<Expression>) -> Expression {
        Expression::infix("GLOB", self, pattern)
    }

    /// Result column with an alias: `expr AS "alias"`
    pub fn aliased(self, alias: impl Into<CompactString>) -> Selectable {
        Selectable::Aliased {
            expr: self,
            alias: alias.into(),
        }
    }

    pub fn asc(self) -> OrderingTerm {
        OrderingTerm::Asc(self)
    }

    pub fn desc(self) -> OrderingTerm {
        OrderingTerm::Desc(self)
    }

    /// Renders into SQL chunks; bound values travel inside the chunks.
    pub(crate) fn render<'a>(&'a self, ctx: &RenderContext<'_>) -> Result<SQL<'a>> {
        Ok(match self {
            Expression::Literal { sql, arguments } => {
                SQL::literal(sql.as_str(), arguments.as_ref())
            }
            Expression::Value(value) => SQL::param(value),
            Expression::Column { source, name } => {
                let column = SQL::ident(name.as_str());
                match source {
                    None => column,
                    Some(id) => match ctx.lookup(*id, name)? {
                        Some(source_name) => SQL::ident(source_name.to_string())
                            .push(Token::DOT)
                            .append(column),
                        None => column,
                    },
                }
            }
            Expression::Collate { expr, collation } => expr.render(ctx)?.insert_before_close(
                SQL::token(Token::COLLATE).push(SQLChunk::raw(collation.as_str())),
            ),
            Expression::Not(expr) => logical::render_not(expr, ctx)?,
            Expression::Equal(lhs, rhs) => cmp::render_equal(lhs, rhs, false, ctx)?,
            Expression::NotEqual(lhs, rhs) => cmp::render_equal(lhs, rhs, true, ctx)?,
            Expression::Is(lhs, rhs) => cmp::render_is(lhs, rhs, false, ctx)?,
            Expression::IsNot(lhs, rhs) => cmp::render_is(lhs, rhs, true, ctx)?,
            Expression::Prefix { op, expr } => {
                SQL::from(SQLChunk::Prefix(op.as_str().into())).append(expr.render(ctx)?)
            }
            Expression::Infix { op, lhs, rhs } => lhs
                .render(ctx)?
                .push(SQLChunk::raw(op.as_str()))
                .append(rhs.render(ctx)?)
                .parens(),
            Expression::And(terms) => logical::render_connective(terms, Token::AND, ctx)?,
            Expression::Or(terms) => logical::render_connective(terms, Token::OR, ctx)?,
            Expression::In { expr, list } => set::render_in(expr, list, false, ctx)?,
            Expression::InSubquery { expr, query } => {
                set::render_in_subquery(expr, query, false, ctx)?
            }
            Expression::Exists(query) => set::render_exists(query, false, ctx)?,
            Expression::Between { expr, low, high } => expr
                .render(ctx)?
                .push(Token::BETWEEN)
                .append(low.render(ctx)?)
                .push(Token::AND)
                .append(high.render(ctx)?)
                .parens(),
            Expression::Function { name, args } => {
                SQL::func(name.as_str(), render_list(args, ctx)?)
            }
            Expression::Count(counted) => agg::render_count(counted, ctx)?,
            Expression::CountDistinct(expr) => SQL::func(
                "COUNT",
                SQL::token(Token::DISTINCT).append(expr.render(ctx)?),
            ),
        })
    }
}

/// Comma-separated rendering of an expression list
pub(crate) fn render_list<'a>(list: &'a [Expression], ctx: &RenderContext<'_>) -> Result<SQL<'a>> {
    let rendered = list
        .iter()
        .map(|expr| expr.render(ctx))
        .collect::<Result<Vec<_>>>()?;
    Ok(SQL::join(rendered, Token::COMMA))
}

//------------------------------------------------------------------------------
// From<T> implementations
//------------------------------------------------------------------------------

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Expression::Value(value)
    }
}

macro_rules! impl_from_for_expression {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Expression {
                #[inline]
                fn from(value: $ty) -> Self {
                    Expression::Value(Value::from(value))
                }
            }
        )*
    };
}

impl_from_for_expression!(
    i8, i16, i32, i64, u8, u16, u32, bool, f32, f64, &str, String, Vec<u8>
);

impl<T: Into<Value>> From<Option<T>> for Expression {
    fn from(value: Option<T>) -> Self {
        Expression::Value(value.map_or(Value::Null, Into::into))
    }
}
