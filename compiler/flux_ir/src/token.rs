//! Source tokens carried by syntax nodes for error reporting.
//!
//! The evaluator never branches on a token: operator semantics come from
//! [`BinaryOp`](crate::BinaryOp) and [`UnaryOp`](crate::UnaryOp). A token only
//! tells an error message which line and lexeme to point at.

use std::fmt;

/// Coarse token category, kept for diagnostics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Operator,
    Integer,
    Float,
    String,
    Punctuation,
}

impl TokenKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Operator => "OPERATOR",
            TokenKind::Integer => "INTEGER",
            TokenKind::Float => "FLOAT",
            TokenKind::String => "STRING",
            TokenKind::Punctuation => "PUNCTUATION",
        }
    }
}

/// A token: kind, source text, and 1-based line number.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: u32) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            line,
        }
    }

    /// Identifier token.
    pub fn ident(lexeme: impl Into<String>, line: u32) -> Self {
        Self::new(TokenKind::Identifier, lexeme, line)
    }

    /// Keyword token (`match`, `for`, `return`, ...).
    pub fn keyword(lexeme: impl Into<String>, line: u32) -> Self {
        Self::new(TokenKind::Keyword, lexeme, line)
    }

    /// Operator token.
    pub fn operator(lexeme: impl Into<String>, line: u32) -> Self {
        Self::new(TokenKind::Operator, lexeme, line)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' (line {})", self.kind.as_str(), self.lexeme, self.line)
    }
}
