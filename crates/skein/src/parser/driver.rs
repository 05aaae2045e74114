//! Convenience entry points wiring a grammar, a token source and a
//! [`Parser`] together.

use crate::error::ParseError;
use crate::grammar::{Capture, Grammar, Pattern};
use crate::lexer::{TokenSource, Tokenizer};
use crate::parser::{Parser, ParserConfig};
use crate::syntax::Source;
use std::sync::Arc;

fn entry<'g>(grammar: &'g Grammar, pattern_name: Option<&str>) -> Result<&'g Pattern, ParseError> {
    match pattern_name {
        Some(name) => grammar
            .lookup(name)
            .ok_or_else(|| ParseError::UnknownPattern(name.into())),
        None => grammar.main().ok_or(ParseError::NoEntryPattern),
    }
}

/// Parse `tokens` with the pattern named `pattern_name`, or with the main
/// pattern when `None`, returning every successful derivation.
///
/// # Errors
///
/// [`ParseError::Syntax`] with the grouped exceptions when no derivation
/// succeeds, and any fatal error from the tokens or the parser.
#[tracing::instrument(level = "debug", skip(grammar, tokens, config))]
pub fn parse(
    grammar: &Grammar,
    pattern_name: Option<&str>,
    tokens: &mut impl TokenSource,
    config: ParserConfig,
) -> Result<Vec<Capture>, ParseError> {
    let pattern = entry(grammar, pattern_name)?;
    let mut parser = Parser::with_config(grammar, config);
    parser.setup(pattern, tokens.start_position());
    parser.parse(tokens)?;

    if parser.has_error() {
        return Err(ParseError::Syntax {
            exceptions: parser.take_exceptions(),
        });
    }
    let metrics = parser.metrics();
    tracing::debug!(
        results = parser.results().len(),
        tokens = metrics.tokens_consumed,
        peak_threads = metrics.peak_threads,
        "parsed"
    );
    Ok(parser.take_results())
}

/// Like [`parse`], but requires exactly one derivation.
///
/// # Errors
///
/// As [`parse`], plus [`ParseError::Ambiguity`] carrying every result when
/// more than one derivation succeeds.
pub fn parse_single(
    grammar: &Grammar,
    pattern_name: Option<&str>,
    tokens: &mut impl TokenSource,
    config: ParserConfig,
) -> Result<Capture, ParseError> {
    single(parse(grammar, pattern_name, tokens, config)?)
}

/// Tokenize `source` with the default [`Tokenizer`] and the grammar's
/// keywords, then parse it with the main pattern.
///
/// # Errors
///
/// As [`parse`].
pub fn parse_source(
    grammar: &Grammar,
    source: Arc<Source>,
    config: ParserConfig,
) -> Result<Vec<Capture>, ParseError> {
    let mut tokens = Tokenizer::new(source, grammar.keywords());
    parse(grammar, None, &mut tokens, config)
}

/// Like [`parse_source`], but requires exactly one derivation.
///
/// # Errors
///
/// As [`parse_single`].
pub fn parse_source_single(
    grammar: &Grammar,
    source: Arc<Source>,
    config: ParserConfig,
) -> Result<Capture, ParseError> {
    single(parse_source(grammar, source, config)?)
}

fn single(mut results: Vec<Capture>) -> Result<Capture, ParseError> {
    match results.len() {
        0 => Err(ParseError::Syntax { exceptions: Vec::new() }),
        1 => Ok(results.remove(0)),
        _ => Err(ParseError::Ambiguity { results }),
    }
}
