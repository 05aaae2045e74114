//! # Lexer Module
//!
//! Tokens, the [`TokenSource`] contract consumed by the parser, and a default
//! [`Tokenizer`].
//!
//! ## Token categories
//!
//! Every source produces [`TokenKind::Word`], [`TokenKind::Keyword`],
//! [`TokenKind::String`], [`TokenKind::Integer`], [`TokenKind::Float`] and
//! single-character [`TokenKind::Symbol`] tokens, followed by exactly one
//! [`TokenKind::Eof`]. Multi-character operators are assembled by the grammar
//! (see [`crate::grammar::PatternBuilder::operator`]).
//!
//! ## Error Handling
//!
//! Malformed input (an unterminated string) is reported as a
//! [`LexerError`](crate::error::LexerError) and aborts the parse.

pub mod stream;
pub mod token;
pub mod tokenizer;

pub use stream::*;
pub use token::*;
pub use tokenizer::{KeywordSet, Tokenizer};
