mod chunk;
mod tokens;

pub use chunk::*;
pub use tokens::*;

use core::fmt::{Display, Write};
use smallvec::SmallVec;
use std::borrow::Cow;

use crate::error::Result;
use crate::value::{Arguments, Value};

/// SQL fragment builder with flat chunk storage.
///
/// Uses `SmallVec<[SQLChunk; 8]>` for inline storage of typical SQL fragments
/// without heap allocation.
#[derive(Debug, Clone, Default)]
pub struct SQL<'a> {
    pub chunks: SmallVec<[SQLChunk<'a>; 8]>,
}

impl<'a> SQL<'a> {
    // ==================== constructors ====================

    /// Creates an empty SQL fragment
    #[inline]
    pub const fn empty() -> Self {
        Self {
            chunks: SmallVec::new_const(),
        }
    }

    /// Creates SQL with a single token
    #[inline]
    pub fn token(t: Token) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Token(t)],
        }
    }

    /// Creates SQL with a quoted identifier
    #[inline]
    pub fn ident(name: impl Into<Cow<'a, str>>) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Ident(name.into())],
        }
    }

    /// Creates SQL with raw text (unquoted)
    #[inline]
    pub fn raw(text: impl Into<Cow<'a, str>>) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Raw(text.into())],
        }
    }

    /// Creates SQL with a single unsigned integer literal.
    #[inline]
    pub fn number(value: u64) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Number(value)],
        }
    }

    /// Creates SQL with a single parameter value.
    ///
    /// NULL is written inline rather than bound.
    #[inline]
    pub fn param(value: impl Into<Cow<'a, Value>>) -> Self {
        let value = value.into();
        if value.is_null() {
            return Self::token(Token::NULL);
        }
        Self {
            chunks: smallvec::smallvec![SQLChunk::Param(value)],
        }
    }

    /// Creates SQL from caller-written text carrying its own arguments
    #[inline]
    pub fn literal(sql: impl Into<Cow<'a, str>>, arguments: Option<&'a Arguments>) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Literal {
                sql: sql.into(),
                arguments: arguments.map(Cow::Borrowed),
            }],
        }
    }

    /// Creates SQL for a function call: NAME(args)
    pub fn func(name: impl Into<Cow<'a, str>>, args: SQL<'a>) -> Self {
        SQL {
            chunks: smallvec::smallvec![SQLChunk::Func(name.into())],
        }
        .push(Token::LPAREN)
        .append(args)
        .push(Token::RPAREN)
    }

    // ==================== builder methods ====================

    /// Append another SQL fragment (flat extend)
    #[inline]
    pub fn append(mut self, other: impl Into<SQL<'a>>) -> Self {
        self.append_mut(other);
        self
    }

    #[inline]
    pub fn append_mut(&mut self, other: impl Into<SQL<'a>>) {
        let other = other.into();
        if self.chunks.is_empty() {
            self.chunks = other.chunks;
            return;
        }
        self.chunks.extend(other.chunks);
    }

    /// Push a single chunk
    #[inline]
    pub fn push(mut self, chunk: impl Into<SQLChunk<'a>>) -> Self {
        self.chunks.push(chunk.into());
        self
    }

    #[inline]
    pub fn push_mut(&mut self, chunk: impl Into<SQLChunk<'a>>) {
        self.chunks.push(chunk.into());
    }

    // ==================== combinators ====================

    /// Joins multiple SQL fragments with a separator
    pub fn join<I>(sqls: I, separator: Token) -> SQL<'a>
    where
        I: IntoIterator<Item = SQL<'a>>,
    {
        let mut iter = sqls.into_iter();
        let Some(mut result) = iter.next() else {
            return SQL::empty();
        };
        for item in iter {
            result.chunks.push(SQLChunk::Token(separator));
            result.chunks.extend(item.chunks);
        }
        result
    }

    /// Wrap in parentheses: (self)
    #[inline]
    pub fn parens(self) -> Self {
        SQL::token(Token::LPAREN).append(self).push(Token::RPAREN)
    }

    /// Creates an aliased version: self AS "name"
    pub fn alias(self, name: impl Into<Cow<'a, str>>) -> SQL<'a> {
        self.push(Token::AS).push(SQLChunk::Ident(name.into()))
    }

    /// Inserts chunks before a trailing `)` so that the group is re-opened,
    /// or appends them when the fragment is not parenthesized.
    pub fn insert_before_close(mut self, tail: SQL<'a>) -> Self {
        if matches!(self.chunks.last(), Some(SQLChunk::Token(Token::RPAREN))) {
            let close = self.chunks.pop();
            self.chunks.extend(tail.chunks);
            self.chunks.extend(close);
            self
        } else {
            self.append(tail)
        }
    }

    /// Detaches the fragment from the expressions it was rendered from
    pub fn into_owned<'b>(self) -> SQL<'b> {
        SQL {
            chunks: self.chunks.into_iter().map(SQLChunk::into_owned).collect(),
        }
    }

    // ==================== rendering ====================

    /// Returns the SQL text with `?` placeholders.
    pub fn sql(&self) -> String {
        let mut buf = String::with_capacity(self.chunks.len().saturating_mul(8).max(64));
        self.write_to(&mut buf);
        buf
    }

    /// Generates the SQL string and collects arguments in a single pass.
    ///
    /// Positional arguments follow placeholder order. Arguments carried by
    /// literal chunks are merged in place; a named argument bound to two
    /// different values is an error.
    pub fn build(&self) -> Result<(String, Arguments)> {
        let mut buf = String::with_capacity(self.chunks.len().saturating_mul(8).max(64));
        let mut arguments = Arguments::new();

        for (i, chunk) in self.chunks.iter().enumerate() {
            match chunk {
                SQLChunk::Param(value) => arguments.push(value.as_ref().clone()),
                SQLChunk::Literal {
                    arguments: Some(literal_arguments),
                    ..
                } => arguments.append(literal_arguments)?,
                _ => {}
            }
            chunk.write(&mut buf);
            if self.needs_space(i) {
                buf.push(' ');
            }
        }

        Ok((buf, arguments))
    }

    /// Write SQL to a buffer with `?` placeholders.
    pub fn write_to(&self, buf: &mut impl Write) {
        for (i, chunk) in self.chunks.iter().enumerate() {
            chunk.write(buf);
            if self.needs_space(i) {
                let _ = buf.write_char(' ');
            }
        }
    }

    fn needs_space(&self, index: usize) -> bool {
        let Some(next) = self.chunks.get(index + 1) else {
            return false;
        };
        chunk_needs_space(&self.chunks[index], next)
    }

    /// Returns an iterator over positional parameter values
    pub fn params(&self) -> impl Iterator<Item = &Value> {
        self.chunks.iter().filter_map(|chunk| match chunk {
            SQLChunk::Param(value) => Some(value.as_ref()),
            _ => None,
        })
    }
}

// ==================== trait implementations ====================

impl<'a> From<Token> for SQL<'a> {
    fn from(value: Token) -> Self {
        SQL::token(value)
    }
}

impl<'a> From<SQLChunk<'a>> for SQL<'a> {
    fn from(value: SQLChunk<'a>) -> Self {
        SQL {
            chunks: smallvec::smallvec![value],
        }
    }
}

impl<'a> Display for SQL<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.write_to(f);
        Ok(())
    }
}

impl<'a, T> FromIterator<T> for SQL<'a>
where
    T: Into<SQLChunk<'a>>,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        SQL {
            chunks: iter.into_iter().map(Into::into).collect(),
        }
    }
}
