use crate::syntax::Position;
use compact_str::CompactString;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed token categories every token source produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum TokenKind {
    Word,
    Keyword,
    String,
    Integer,
    Float,
    Symbol,
    /// End-of-input marker; exactly one terminates a token stream.
    Eof,
}

impl TokenKind {
    /// Whether a token of this kind is accepted where `expected` is required.
    ///
    /// Categories must be equal, except that an `Integer` is accepted where a
    /// `Float` is expected.
    #[must_use]
    pub const fn casts_to(self, expected: Self) -> bool {
        matches!(
            (self, expected),
            (Self::Word, Self::Word)
                | (Self::Keyword, Self::Keyword)
                | (Self::String, Self::String)
                | (Self::Integer, Self::Integer | Self::Float)
                | (Self::Float, Self::Float)
                | (Self::Symbol, Self::Symbol)
                | (Self::Eof, Self::Eof)
        )
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Word => "Word",
            Self::Keyword => "Keyword",
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::Symbol => "Symbol",
            Self::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified token with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Token text; for strings, the unescaped content without quotes
    pub value: CompactString,
    pub position: Position,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, value: impl Into<CompactString>, position: Position) -> Self {
        Self {
            kind,
            value: value.into(),
            position,
        }
    }

    /// The end-of-input marker at `position`.
    #[must_use]
    pub fn eof(position: Position) -> Self {
        Self::new(TokenKind::Eof, "", position)
    }

    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_eof() {
            return f.write_str("<EOF>");
        }
        write!(f, "{} \"", self.kind)?;
        for c in self.value.chars() {
            match c {
                '\\' => f.write_str("\\\\")?,
                '"' => f.write_str("\\\"")?,
                '\n' => f.write_str("\\n")?,
                c => write!(f, "{c}")?,
            }
        }
        f.write_str("\"")
    }
}
