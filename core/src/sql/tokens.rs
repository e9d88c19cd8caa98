/// SQL keywords and punctuation emitted by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    // Statement structure
    SELECT,
    DISTINCT,
    FROM,
    WHERE,
    GROUP,
    BY,
    HAVING,
    ORDER,
    LIMIT,
    OFFSET,
    AS,

    // Joins
    JOIN,
    LEFT,
    CROSS,
    ON,

    // Logical and predicate keywords
    AND,
    OR,
    NOT,
    IN,
    EXISTS,
    BETWEEN,
    IS,
    NULL,
    COLLATE,

    // Ordering
    ASC,
    DESC,

    // Punctuation
    STAR,
    LPAREN,
    RPAREN,
    COMMA,
    DOT,

    // Comparison operators
    EQ,
    NE,
}

impl Token {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Token::SELECT => "SELECT",
            Token::DISTINCT => "DISTINCT",
            Token::FROM => "FROM",
            Token::WHERE => "WHERE",
            Token::GROUP => "GROUP",
            Token::BY => "BY",
            Token::HAVING => "HAVING",
            Token::ORDER => "ORDER",
            Token::LIMIT => "LIMIT",
            Token::OFFSET => "OFFSET",
            Token::AS => "AS",
            Token::JOIN => "JOIN",
            Token::LEFT => "LEFT",
            Token::CROSS => "CROSS",
            Token::ON => "ON",
            Token::AND => "AND",
            Token::OR => "OR",
            Token::NOT => "NOT",
            Token::IN => "IN",
            Token::EXISTS => "EXISTS",
            Token::BETWEEN => "BETWEEN",
            Token::IS => "IS",
            Token::NULL => "NULL",
            Token::COLLATE => "COLLATE",
            Token::ASC => "ASC",
            Token::DESC => "DESC",
            Token::STAR => "*",
            Token::LPAREN => "(",
            Token::RPAREN => ")",
            Token::COMMA => ",",
            Token::DOT => ".",
            Token::EQ => "=",
            Token::NE => "<>",
        }
    }

    /// Symbolic operators, always surrounded by spaces
    #[inline]
    pub const fn is_operator(&self) -> bool {
        matches!(self, Token::EQ | Token::NE)
    }
}

impl core::fmt::Display for Token {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
