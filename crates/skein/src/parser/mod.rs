//! # Parser Module
//!
//! The [`Parser`] engine, its matcher model and the convenience entry points
//! in [`driver`].
//!
//! ## Ambiguity
//!
//! Every alternative of a choice is explored. When several derivations
//! succeed, all their captures are returned; [`parse_single`] treats that as
//! an error ([`ParseError::Ambiguity`](crate::error::ParseError::Ambiguity)).
//!
//! ## Resource guards
//!
//! [`ParserConfig`] bounds the number of live threads and the work spent
//! expanding matchers for a single token.

pub mod config;
pub mod driver;
pub mod engine;
pub mod matcher;
pub mod sequence;

pub use config::ParserConfig;
pub use driver::{parse, parse_single, parse_source, parse_source_single};
pub use engine::Parser;
pub use matcher::{Generator, ListMatcher, Matcher, MatcherCache, MatcherKind, SequenceMatcher};
pub use sequence::{SeqId, SequenceArena};
