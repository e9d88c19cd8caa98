use std::borrow::Cow;
use std::fmt::Write;

use super::Token;
use crate::value::{Arguments, Value};

/// A SQL chunk represents a part of an SQL statement.
///
/// - `Token` - SQL keywords and punctuation (SELECT, FROM, =, etc.)
/// - `Ident` - Quoted identifiers ("table_name", "column_name")
/// - `Raw` - Unquoted raw SQL text (operators, collations, constants)
/// - `Number` - Unsigned integer literal (LIMIT / OFFSET)
/// - `Func` - Function name, written flush against its argument list
/// - `Prefix` - Unary operator, written flush against its operand
/// - `Param` - Positional `?` placeholder with its value
/// - `Literal` - Caller-written SQL with its own arguments
#[derive(Debug, Clone)]
pub enum SQLChunk<'a> {
    Token(Token),
    Ident(Cow<'a, str>),
    Raw(Cow<'a, str>),
    Number(u64),
    Func(Cow<'a, str>),
    Prefix(Cow<'a, str>),
    Param(Cow<'a, Value>),
    Literal {
        sql: Cow<'a, str>,
        arguments: Option<Cow<'a, Arguments>>,
    },
}

impl<'a> SQLChunk<'a> {
    /// Creates a quoted identifier
    #[inline]
    pub fn ident(name: impl Into<Cow<'a, str>>) -> Self {
        Self::Ident(name.into())
    }

    /// Creates raw SQL text
    #[inline]
    pub fn raw(text: impl Into<Cow<'a, str>>) -> Self {
        Self::Raw(text.into())
    }

    /// Detaches the chunk from any borrowed expression tree
    pub fn into_owned<'b>(self) -> SQLChunk<'b> {
        fn own<'b>(text: Cow<'_, str>) -> Cow<'b, str> {
            Cow::Owned(text.into_owned())
        }
        match self {
            SQLChunk::Token(token) => SQLChunk::Token(token),
            SQLChunk::Ident(name) => SQLChunk::Ident(own(name)),
            SQLChunk::Raw(text) => SQLChunk::Raw(own(text)),
            SQLChunk::Number(n) => SQLChunk::Number(n),
            SQLChunk::Func(name) => SQLChunk::Func(own(name)),
            SQLChunk::Prefix(op) => SQLChunk::Prefix(own(op)),
            SQLChunk::Param(value) => SQLChunk::Param(Cow::Owned(value.into_owned())),
            SQLChunk::Literal { sql, arguments } => SQLChunk::Literal {
                sql: own(sql),
                arguments: arguments.map(|arguments| Cow::Owned(arguments.into_owned())),
            },
        }
    }

    /// Write chunk content to buffer. Placeholders are written by the caller.
    pub(crate) fn write(&self, buf: &mut impl Write) {
        match self {
            SQLChunk::Token(token) => {
                let _ = buf.write_str(token.as_str());
            }
            SQLChunk::Ident(name) => {
                let _ = buf.write_char('"');
                // Embedded quotes are doubled
                for ch in name.chars() {
                    if ch == '"' {
                        let _ = buf.write_char('"');
                    }
                    let _ = buf.write_char(ch);
                }
                let _ = buf.write_char('"');
            }
            SQLChunk::Raw(text) | SQLChunk::Func(text) | SQLChunk::Prefix(text) => {
                let _ = buf.write_str(text);
            }
            SQLChunk::Number(n) => {
                let _ = write!(buf, "{n}");
            }
            SQLChunk::Param(_) => {
                let _ = buf.write_char('?');
            }
            SQLChunk::Literal { sql, .. } => {
                let _ = buf.write_str(sql);
            }
        }
    }

    /// Whether the rendered text begins with `-`
    fn starts_with_minus(&self) -> bool {
        match self {
            SQLChunk::Raw(text) | SQLChunk::Prefix(text) | SQLChunk::Literal { sql: text, .. } => {
                text.starts_with('-')
            }
            _ => false,
        }
    }

    /// Check if this chunk is "word-like" (needs space separation from other word-like chunks)
    #[inline]
    pub(crate) const fn is_word_like(&self) -> bool {
        match self {
            SQLChunk::Token(t) => !matches!(
                t,
                Token::LPAREN | Token::RPAREN | Token::COMMA | Token::DOT | Token::EQ | Token::NE
            ),
            SQLChunk::Ident(_)
            | SQLChunk::Raw(_)
            | SQLChunk::Number(_)
            | SQLChunk::Func(_)
            | SQLChunk::Prefix(_)
            | SQLChunk::Param(_)
            | SQLChunk::Literal { .. } => true,
        }
    }
}

impl From<Token> for SQLChunk<'_> {
    fn from(value: Token) -> Self {
        Self::Token(value)
    }
}

/// Canonical spacing logic for SQL chunk rendering.
pub(crate) fn chunk_needs_space(current: &SQLChunk<'_>, next: &SQLChunk<'_>) -> bool {
    // No space if current raw text ends with space
    if let SQLChunk::Raw(text) | SQLChunk::Literal { sql: text, .. } = current
        && text.ends_with(' ')
    {
        return false;
    }

    // No space if next raw text starts with space
    if let SQLChunk::Raw(text) | SQLChunk::Literal { sql: text, .. } = next
        && text.starts_with(' ')
    {
        return false;
    }

    match (current, next) {
        // No space before closing/separator punctuation
        (_, SQLChunk::Token(Token::RPAREN | Token::COMMA | Token::DOT)) => false,
        // No space after opening punctuation
        (SQLChunk::Token(Token::LPAREN | Token::DOT), _) => false,
        // Unary operators hug their operand, except `- -x` which would open a comment
        (SQLChunk::Prefix(op), next) => op.ends_with('-') && next.starts_with_minus(),
        (SQLChunk::Func(_), SQLChunk::Token(Token::LPAREN)) => false,
        // Space after comma
        (SQLChunk::Token(Token::COMMA), _) => true,
        // Space after closing paren if next is word-like (e.g., ") FROM")
        (SQLChunk::Token(Token::RPAREN), next) => next.is_word_like(),
        // Space before opening paren if preceded by word-like (e.g., "IN (")
        (current, SQLChunk::Token(Token::LPAREN)) => current.is_word_like(),
        // Space around comparison operators
        (SQLChunk::Token(t), _) if t.is_operator() => true,
        (_, SQLChunk::Token(t)) if t.is_operator() => true,
        // Space between all word-like chunks
        _ => current.is_word_like() && next.is_word_like(),
    }
}
