//! # Error Types
//!
//! Error types and diagnostics for grammar construction, lexing and parsing.
//!
//! ## Overview
//!
//! Errors come in two tiers:
//!
//! - **Fatal errors**: a [`LexerError`] aborts the parse immediately, as do
//!   the resource guards ([`ParseError::ThreadLimit`],
//!   [`ParseError::ExpansionLimit`]).
//! - **Syntax errors**: individual derivations die silently; only when every
//!   derivation has died are their failures grouped into
//!   [`ParseException`]s and surfaced as [`ParseError::Syntax`].
//!
//! Grammar construction defects are reported separately as [`GrammarError`].
//!
//! ## Diagnostics Support
//!
//! When the `diagnostics` feature is enabled, errors integrate with `miette`
//! for rich error reporting with source code snippets.

pub mod diagnostics;
pub mod failure;

pub use diagnostics::ParseException;
pub use failure::{FailureKind, ParserFailure};

use crate::grammar::Capture;
use crate::syntax::Position;
use compact_str::CompactString;
use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Errors returned by the parse entry points.
#[derive(Debug, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ParseError {
    #[error("{}", ParseException::combine_messages(.exceptions))]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::syntax)))]
    Syntax {
        #[cfg_attr(feature = "diagnostics", related)]
        exceptions: Vec<ParseException>,
    },

    #[error(transparent)]
    #[cfg_attr(feature = "diagnostics", diagnostic(transparent))]
    Lexer(#[from] LexerError),

    #[error("more than {limit} live derivations at {position}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::thread_limit)))]
    ThreadLimit { limit: usize, position: Position },

    #[error("more than {limit} expansion steps at {position}; is the grammar left-recursive?")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::expansion_limit)))]
    ExpansionLimit { limit: usize, position: Position },

    #[error("Ambiguous parse: {} derivations succeeded", .results.len())]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::ambiguous)))]
    Ambiguity { results: Vec<Capture> },

    #[error("No pattern named '{0}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::unknown_pattern)))]
    UnknownPattern(CompactString),

    #[error("Grammar has no main pattern")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::no_entry)))]
    NoEntryPattern,
}

impl ParseError {
    /// Exceptions carried by a syntax error; empty for every other kind.
    #[must_use]
    pub fn exceptions(&self) -> &[ParseException] {
        match self {
            Self::Syntax { exceptions } => exceptions,
            _ => &[],
        }
    }

    /// Where the parse stopped, when known.
    #[must_use]
    pub fn position(&self) -> Option<&Position> {
        match self {
            Self::Syntax { exceptions } => exceptions.first().map(ParseException::position),
            Self::Lexer(error) => Some(error.position()),
            Self::ThreadLimit { position, .. } | Self::ExpansionLimit { position, .. } => {
                Some(position)
            }
            Self::Ambiguity { .. } | Self::UnknownPattern(_) | Self::NoEntryPattern => None,
        }
    }
}

/// Defects found while building a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GrammarError {
    #[error("Reference to undefined pattern '{name}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::undefined)))]
    UndefinedRule { name: CompactString },

    #[error("Pattern '{name}' is defined more than once")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::redefinition)))]
    Redefinition { name: CompactString },

    #[error("Sequence{} has no parts", .name.as_ref().map(|n| format!(" '{n}'")).unwrap_or_default())]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::empty_sequence)))]
    EmptySequence { name: Option<CompactString> },

    #[error("Choice has no alternatives")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::empty_choice)))]
    EmptyChoice,

    #[error("Main pattern '{name}' is not defined")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::unknown_main)))]
    UnknownMain { name: CompactString },
}

/// Lexer error with location information
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct LexerError {
    position: Position,
    #[source]
    kind: LexerErrorKind,
}

/// Types of lexer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexerErrorKind {
    #[error("Unexpected character: '{char}'")]
    UnexpectedChar { char: char },

    #[error("Unterminated string literal")]
    UnterminatedString,
}

impl LexerError {
    #[must_use]
    pub const fn new(position: Position, kind: LexerErrorKind) -> Self {
        Self { position, kind }
    }

    #[must_use]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    #[must_use]
    pub const fn kind(&self) -> &LexerErrorKind {
        &self.kind
    }
}

#[cfg(feature = "diagnostics")]
impl Diagnostic for LexerError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let code = match self.kind {
            LexerErrorKind::UnexpectedChar { .. } => "lexer::unexpected_char",
            LexerErrorKind::UnterminatedString => "lexer::unterminated_string",
        };
        Some(Box::new(code))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(self.position.source().as_ref())
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(miette::LabeledSpan::new_with_span(
            None,
            self.position.range(),
        ))))
    }
}

/// Counters recorded by a [`Parser`](crate::parser::Parser) run.
#[derive(Debug, Default, Clone)]
pub struct ParseMetrics {
    pub tokens_consumed: usize,
    /// Largest live thread set observed after any token
    pub peak_threads: usize,
    pub branches: usize,
    pub sequences_allocated: usize,
    pub parse_time: std::time::Duration,
}
