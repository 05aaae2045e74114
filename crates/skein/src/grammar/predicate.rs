//! Positional predicates
//!
//! A predicate is a side-constraint checked between two consecutive tokens:
//! it sees the token about to be consumed and the position of the token
//! consumed before it. Predicates attached to a pattern are collected when
//! the pattern is entered and all tested before the next token is matched.
//!
//! # Example
//!
//! ```rust
//! use skein::error::FailureKind;
//! use skein::grammar::{MatchPredicate, PredicateState};
//!
//! /// Rejects tokens longer than eight characters.
//! #[derive(Debug)]
//! struct Short;
//!
//! impl MatchPredicate for Short {
//!     fn test(&self, state: &PredicateState<'_>) -> bool {
//!         state.next.value.len() <= 8
//!     }
//!
//!     fn failure(&self, state: &PredicateState<'_>) -> FailureKind {
//!         FailureKind::Predicate(format!("{} is too long", state.next))
//!     }
//! }
//! ```

use crate::error::FailureKind;
use crate::grammar::TokenSpec;
use crate::lexer::Token;
use crate::syntax::Position;
use std::fmt;
use std::sync::Arc;

/// What a predicate gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct PredicateState<'a> {
    /// The token about to be consumed
    pub next: &'a Token,
    /// Position of the last consumed token
    pub last_position: &'a Position,
}

/// Trait for positional predicates evaluated during parsing.
///
/// Implementations must be `Send + Sync` so grammars can be shared between
/// threads.
pub trait MatchPredicate: fmt::Debug + Send + Sync {
    fn test(&self, state: &PredicateState<'_>) -> bool;

    /// Describes a failed [`test`](Self::test).
    fn failure(&self, state: &PredicateState<'_>) -> FailureKind {
        let _ = state;
        FailureKind::Predicate("failed predicate".into())
    }
}

/// Shared predicate handle.
pub type Predicate = Arc<dyn MatchPredicate>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    NoSpace,
    SameLine,
    NextLine,
}

impl MatchPredicate for Layout {
    fn test(&self, state: &PredicateState<'_>) -> bool {
        let next = &state.next.position;
        match self {
            Self::NoSpace => next.is_adjacent_to(state.last_position),
            Self::SameLine => next.start().line == state.last_position.end().line,
            Self::NextLine => {
                state.next.is_eof() || next.start().line > state.last_position.end().line
            }
        }
    }

    fn failure(&self, state: &PredicateState<'_>) -> FailureKind {
        let message = match self {
            Self::NoSpace => "Unexpected space before",
            Self::SameLine => "Unexpected newline before",
            Self::NextLine => "Expected newline before",
        };
        FailureKind::Predicate(format!("{message} {}", state.next))
    }
}

/// The next token must start exactly where the previous one ended.
#[must_use]
pub fn no_space() -> Predicate {
    Arc::new(Layout::NoSpace)
}

/// The next token must start on the line the previous one ended on.
#[must_use]
pub fn same_line() -> Predicate {
    Arc::new(Layout::SameLine)
}

/// The next token must start on a later line, or be the end of input.
#[must_use]
pub fn next_line() -> Predicate {
    Arc::new(Layout::NextLine)
}

#[derive(Debug)]
struct Lookahead(TokenSpec);

impl MatchPredicate for Lookahead {
    fn test(&self, state: &PredicateState<'_>) -> bool {
        self.0.matches(state.next)
    }

    fn failure(&self, _state: &PredicateState<'_>) -> FailureKind {
        FailureKind::Expected(self.0.to_string().into())
    }
}

/// One-token lookahead: the next token must match `spec`. Nothing is
/// consumed.
#[must_use]
pub fn matches(spec: TokenSpec) -> Predicate {
    Arc::new(Lookahead(spec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenKind;
    use crate::syntax::{Source, TextRange, TextSize};

    fn span(source: &Arc<Source>, start: u32, end: u32) -> Position {
        Position::new(
            Arc::clone(source),
            TextRange::new(TextSize::from(start), TextSize::from(end)),
        )
    }

    fn check(predicate: &Predicate, text: &str, last: (u32, u32), next: (u32, u32)) -> Result<(), FailureKind> {
        let source = Arc::new(Source::new("t", text));
        let last = span(&source, last.0, last.1);
        let value = &text[next.0 as usize..next.1 as usize];
        let next = Token::new(TokenKind::Symbol, value, span(&source, next.0, next.1));
        let state = PredicateState {
            next: &next,
            last_position: &last,
        };
        if predicate.test(&state) {
            Ok(())
        } else {
            Err(predicate.failure(&state))
        }
    }

    #[test]
    fn test_no_space() {
        assert!(check(&no_space(), "==", (0, 1), (1, 2)).is_ok());
        assert_eq!(
            check(&no_space(), "= =", (0, 1), (2, 3)),
            Err(FailureKind::Predicate("Unexpected space before Symbol \"=\"".into()))
        );
    }

    #[test]
    fn test_line_predicates() {
        assert!(check(&same_line(), "a b", (0, 1), (2, 3)).is_ok());
        assert_eq!(
            check(&same_line(), "a\nb", (0, 1), (2, 3)),
            Err(FailureKind::Predicate("Unexpected newline before Symbol \"b\"".into()))
        );
        assert!(check(&next_line(), "a\nb", (0, 1), (2, 3)).is_ok());
        assert!(check(&next_line(), "a b", (0, 1), (2, 3)).is_err());
    }

    #[test]
    fn test_next_line_accepts_eof() {
        let source = Arc::new(Source::new("t", "a"));
        let last = span(&source, 0, 1);
        let eof = Token::eof(last.after(1));
        let state = PredicateState {
            next: &eof,
            last_position: &last,
        };
        assert!(next_line().test(&state));
    }

    #[test]
    fn test_lookahead_reports_expectation() {
        let predicate = matches(TokenSpec::new(TokenKind::Symbol, Some("(")));
        assert!(check(&predicate, "f(", (0, 1), (1, 2)).is_ok());
        assert_eq!(
            check(&predicate, "f)", (0, 1), (1, 2)),
            Err(FailureKind::Expected("Symbol \"(\"".into()))
        );
    }
}
