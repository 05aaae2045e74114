//! Immutable grammar nodes.
//!
//! A [`Pattern`] is a cheap-to-clone handle. Patterns are built once through
//! the [`PatternBuilder`](crate::grammar::PatternBuilder) and never mutated;
//! cycles go through named references ([`PatternKind::Ref`]) resolved against
//! the [`Grammar`](crate::grammar::Grammar) when a parse instantiates them.

use crate::grammar::{CaptureFn, Predicate};
use crate::lexer::{Token, TokenKind};
use compact_str::CompactString;
use lasso::Spur;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Token category plus optional exact value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenSpec {
    pub kind: TokenKind,
    pub value: Option<CompactString>,
}

impl TokenSpec {
    #[must_use]
    pub fn new(kind: TokenKind, value: Option<&str>) -> Self {
        Self {
            kind,
            value: value.map(CompactString::from),
        }
    }

    /// Whether `token` satisfies this spec under the cast relation
    /// ([`TokenKind::casts_to`]).
    #[must_use]
    pub fn matches(&self, token: &Token) -> bool {
        token.kind.casts_to(self.kind)
            && self.value.as_ref().is_none_or(|value| *value == token.value)
    }
}

impl fmt::Display for TokenSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} \"{value}\"", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// An ordered group of patterns whose captures are combined by `build`.
pub struct SequencePattern {
    /// Named sequences appear in failure breadcrumbs.
    pub name: Option<CompactString>,
    pub parts: Vec<Pattern>,
    pub build: CaptureFn,
}

impl fmt::Debug for SequencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequencePattern")
            .field("name", &self.name)
            .field("parts", &self.parts)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub enum PatternKind {
    Token(TokenSpec),
    /// Matches without consuming input.
    Nothing,
    Sequence(Arc<SequencePattern>),
    /// Ordered alternatives; every viable one is explored.
    Branch(Arc<[Pattern]>),
    /// Named pattern, looked up when instantiated.
    Ref(Spur),
    Optional {
        inner: Pattern,
        /// Builds the capture for the absent case from the empty marker;
        /// without it the marker itself is the capture.
        absent: Option<CaptureFn>,
    },
    /// Zero or more items, or one or more items between separators.
    List {
        item: Pattern,
        separator: Option<Pattern>,
    },
}

impl fmt::Debug for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(spec) => write!(f, "Token({spec})"),
            Self::Nothing => f.write_str("Nothing"),
            Self::Sequence(sequence) => sequence.fmt(f),
            Self::Branch(options) => f.debug_tuple("Branch").field(options).finish(),
            Self::Ref(name) => f.debug_tuple("Ref").field(name).finish(),
            Self::Optional { inner, .. } => f.debug_tuple("Optional").field(inner).finish(),
            Self::List { item, separator } => f
                .debug_struct("List")
                .field("item", item)
                .field("separator", separator)
                .finish(),
        }
    }
}

#[derive(Debug)]
struct PatternNode {
    kind: PatternKind,
    predicates: SmallVec<[Predicate; 1]>,
}

/// Shared handle to an immutable grammar node.
#[derive(Clone)]
pub struct Pattern(Arc<PatternNode>);

impl Pattern {
    #[must_use]
    pub fn new(kind: PatternKind) -> Self {
        Self(Arc::new(PatternNode {
            kind,
            predicates: SmallVec::new(),
        }))
    }

    #[must_use]
    pub fn kind(&self) -> &PatternKind {
        &self.0.kind
    }

    /// Predicates checked before the next token once this pattern is entered.
    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.0.predicates
    }

    /// A copy of this pattern that also carries `predicate`.
    #[must_use]
    pub fn with_predicate(&self, predicate: Predicate) -> Self {
        let mut predicates = self.0.predicates.clone();
        predicates.push(predicate);
        Self(Arc::new(PatternNode {
            kind: self.0.kind.clone(),
            predicates,
        }))
    }

    /// A copy of this pattern with its kind replaced, keeping predicates.
    pub(crate) fn with_kind(&self, kind: PatternKind) -> Self {
        Self(Arc::new(PatternNode {
            kind,
            predicates: self.0.predicates.clone(),
        }))
    }

    /// Name of a named sequence.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match &self.0.kind {
            PatternKind::Sequence(sequence) => sequence.name.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.predicates.is_empty() {
            self.0.kind.fmt(f)
        } else {
            f.debug_struct("Pattern")
                .field("kind", &self.0.kind)
                .field("predicates", &self.0.predicates)
                .finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{no_space, nth};
    use crate::syntax::{Position, Source};

    fn token(kind: TokenKind, value: &str) -> Token {
        Token::new(kind, value, Position::start_of(Arc::new(Source::new("t", value))))
    }

    #[test]
    fn test_token_spec_matching() {
        let semicolon = TokenSpec::new(TokenKind::Symbol, Some(";"));
        assert!(semicolon.matches(&token(TokenKind::Symbol, ";")));
        assert!(!semicolon.matches(&token(TokenKind::Symbol, ",")));

        let float = TokenSpec::new(TokenKind::Float, None);
        assert!(float.matches(&token(TokenKind::Integer, "3")));
        assert!(!TokenSpec::new(TokenKind::Integer, None).matches(&token(TokenKind::Float, "3.0")));
    }

    #[test]
    fn test_token_spec_display() {
        assert_eq!(TokenSpec::new(TokenKind::Keyword, Some("if")).to_string(), "Keyword \"if\"");
        assert_eq!(TokenSpec::new(TokenKind::Word, None).to_string(), "Word");
        assert_eq!(TokenSpec::new(TokenKind::Eof, None).to_string(), "EOF");
    }

    #[test]
    fn test_with_predicate_copies() {
        let plain = Pattern::new(PatternKind::Token(TokenSpec::new(TokenKind::Symbol, Some("="))));
        let glued = plain.with_predicate(no_space());
        assert!(plain.predicates().is_empty());
        assert_eq!(glued.predicates().len(), 1);
        assert!(!plain.ptr_eq(&glued));
    }

    #[test]
    fn test_sequence_name() {
        let sequence = Pattern::new(PatternKind::Sequence(Arc::new(SequencePattern {
            name: Some("stmt".into()),
            parts: vec![Pattern::new(PatternKind::Nothing)],
            build: nth(0),
        })));
        assert_eq!(sequence.name(), Some("stmt"));
        assert_eq!(Pattern::new(PatternKind::Nothing).name(), None);
    }
}
