//! # Skein
//!
//! An ambiguity-tolerant combinator parsing engine.
//!
//! ## Overview
//!
//! Grammars are built from combinators (sequence, choice, optional,
//! repetition, token matches and positional predicates). The parser explores
//! every viable derivation in lockstep, one token at a time, and returns the
//! captures of all derivations that reach the end of input:
//!
//! - **Grammar definition**: [`PatternBuilder`] with forward and recursive
//!   references
//! - **Positional predicates**: adjacency, same-line and next-line
//!   constraints between tokens
//! - **Typed results**: [`Capture`] values with source spans, extensible with
//!   caller-defined nodes
//! - **Grouped diagnostics**: failures of every dead derivation merged into
//!   `Expected one of {..}, got ..` messages
//!
//! ## Quick Start
//!
//! ```rust
//! use skein::grammar::{Capture, PatternBuilder, list_of};
//! use skein::lexer::TokenKind;
//! use skein::parser::{ParserConfig, parse_source_single};
//! use skein::syntax::Source;
//! use std::sync::Arc;
//!
//! let b = PatternBuilder::new();
//! // call := Word "(" [Integer ("," Integer)*] ")"
//! b.define(
//!     "call",
//!     b.sequence(
//!         list_of(),
//!         [
//!             b.token(TokenKind::Word),
//!             b.symbol("("),
//!             b.optional(b.delim(b.token(TokenKind::Integer), b.symbol(","))),
//!             b.symbol(")"),
//!         ],
//!     ),
//! );
//! b.set_main("call");
//! let grammar = b.build().expect("valid grammar");
//!
//! let source = Arc::new(Source::new("example", "max(1, 2, 3)"));
//! let call = parse_source_single(&grammar, source, ParserConfig::default()).unwrap();
//!
//! let parts = call.as_list().unwrap();
//! let arguments = parts.get(2).and_then(Capture::as_list).unwrap();
//! assert_eq!(arguments.len(), 3);
//! ```
//!
//! ## Features
//!
//! - `diagnostics`: `miette` integration for errors
//! - `serialize`: `serde` derives for token and position types

pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod syntax;

pub use error::{GrammarError, LexerError, ParseError, ParseException, ParseMetrics};
pub use grammar::{Capture, Grammar, ListCapture, ObjectCapture, Pattern, PatternBuilder};
pub use lexer::{Token, TokenKind, TokenSource, Tokenizer};
pub use parser::{Parser, ParserConfig, parse, parse_single, parse_source, parse_source_single};
pub use syntax::{Position, Source};
