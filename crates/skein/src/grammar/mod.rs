//! # Grammar Module
//!
//! Grammars are built from combinators with a [`PatternBuilder`]:
//!
//! - **Tokens**: [`token`](PatternBuilder::token), [`keyword`](PatternBuilder::keyword),
//!   [`symbol`](PatternBuilder::symbol), [`operator`](PatternBuilder::operator),
//!   [`eof`](PatternBuilder::eof)
//! - **Structure**: [`sequence`](PatternBuilder::sequence),
//!   [`one_of`](PatternBuilder::one_of), [`optional`](PatternBuilder::optional),
//!   [`list`](PatternBuilder::list), [`delim`](PatternBuilder::delim)
//! - **Naming**: [`define`](PatternBuilder::define) and
//!   [`reference`](PatternBuilder::reference) for recursive and forward
//!   references
//! - **Side-constraints**: [`predicate`](PatternBuilder::predicate) and
//!   [`Pattern::with_predicate`] with [`no_space`], [`same_line`],
//!   [`next_line`] or [`matches`]
//!
//! Each sequence turns the [`Capture`]s of its parts into one capture with a
//! [`CaptureFn`]. [`PatternBuilder::build`] validates the registry and
//! produces an immutable [`Grammar`].

pub mod builder;
pub mod capture;
pub mod pattern;
pub mod predicate;

pub use builder::{Grammar, PatternBuilder};
pub use capture::{Capture, CaptureFn, ListCapture, ObjectCapture, list_of, nth};
pub(crate) use capture::{cons, empty_list};
pub use pattern::{Pattern, PatternKind, SequencePattern, TokenSpec};
pub use predicate::{
    MatchPredicate, Predicate, PredicateState, matches, next_line, no_space, same_line,
};
