//! The parsing engine.
//!
//! A [`Parser`] keeps a set of live *threads*, each one candidate derivation
//! of the input consumed so far. Every token goes through three phases:
//!
//! 1. **Resolve**: each thread's matcher is expanded until it is a token
//!    matcher. Sequences are entered, empty matches captured, generators
//!    resolved, and branches split the thread into one sibling per
//!    alternative, in alternative order.
//! 2. **Predicates**: the predicates collected during resolution are tested
//!    against the token; a failing predicate kills its thread.
//! 3. **Match**: the token is tested against each thread's token matcher.
//!    Matching threads capture the token and complete any finished
//!    sequences; the others die. A thread whose predicate failed also
//!    reports whether its token would have matched.
//!
//! A thread whose outermost sequence is complete is *accepted*: it survives
//! only if the next token is the end of input. When no thread survives a
//! token, the failures of the dead threads become the parse's exceptions and
//! no more input is consumed.
//!
//! A finished sequence is handed to the enclosing sequence that continues
//! after it without being built. Its capture is built once a thread holding
//! it consumes the next token, so threads that die right away never build
//! anything. The sequence arena is compacted whenever it has doubled since
//! the last compaction.

use crate::error::failure;
use crate::error::{FailureKind, ParseError, ParseException, ParseMetrics, ParserFailure};
use crate::grammar::{Capture, Grammar, Pattern, Predicate, PredicateState, TokenSpec, nth};
use crate::lexer::{Token, TokenSource};
use crate::parser::{Matcher, MatcherCache, MatcherKind, ParserConfig, SeqId, SequenceArena, SequenceMatcher};
use crate::syntax::Position;
use smallvec::SmallVec;
use std::sync::Arc;
use std::time::Instant;

type Pending = SmallVec<[Predicate; 2]>;

/// Deferred captures a thread created since it last consumed a token.
type Fresh = SmallVec<[SeqId; 2]>;

/// Arena size below which compaction is not worth a pass.
const MIN_COMPACT: usize = 4096;

#[derive(Debug, Clone)]
enum Step {
    Next { matcher: Matcher, sequence: SeqId },
    /// `sequence` is finished and so is everything enclosing it
    Done(SeqId),
}

#[derive(Debug, Clone)]
struct Thread {
    step: Step,
    predicates: Pending,
    fresh: Fresh,
}

/// A thread after the resolve phase.
#[derive(Debug)]
enum Ready {
    Token {
        spec: Arc<TokenSpec>,
        sequence: SeqId,
        predicates: Pending,
        fresh: Fresh,
    },
    Accepted {
        sequence: SeqId,
        predicates: Pending,
    },
}

impl Ready {
    fn predicates(&self) -> &[Predicate] {
        match self {
            Self::Token { predicates, .. } | Self::Accepted { predicates, .. } => predicates,
        }
    }

    const fn sequence(&self) -> SeqId {
        match self {
            Self::Token { sequence, .. } | Self::Accepted { sequence, .. } => *sequence,
        }
    }
}

/// A dead thread's failure; the breadcrumb is only walked if every thread
/// died.
#[derive(Debug)]
struct Failed {
    sequence: SeqId,
    kind: FailureKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Running,
    /// Stopped early: every thread died or a resource guard tripped
    Halted,
    Finished,
}

/// Ambiguity-tolerant parser over a [`Grammar`].
///
/// # Example
///
/// ```rust
/// use skein::grammar::{PatternBuilder, list_of};
/// use skein::lexer::{TokenKind, Tokenizer};
/// use skein::parser::Parser;
/// use skein::syntax::{Position, Source};
/// use std::sync::Arc;
///
/// let b = PatternBuilder::new();
/// b.define(
///     "main",
///     b.sequence(list_of(), [b.token(TokenKind::Word), b.token(TokenKind::Word), b.symbol(";")]),
/// );
/// let grammar = b.build().unwrap();
///
/// let source = Arc::new(Source::new("decl", "int x;"));
/// let mut tokens = Tokenizer::new(Arc::clone(&source), grammar.keywords());
///
/// let mut parser = Parser::new(&grammar);
/// parser.setup(grammar.main().unwrap(), Position::start_of(source));
/// parser.parse(&mut tokens).unwrap();
///
/// assert!(!parser.has_error());
/// assert_eq!(parser.results().len(), 1);
/// ```
#[derive(Debug)]
pub struct Parser<'g> {
    matchers: MatcherCache<'g>,
    config: ParserConfig,
    arena: SequenceArena,
    threads: Vec<Thread>,
    results: Vec<Capture>,
    exceptions: Vec<ParseException>,
    last_position: Option<Position>,
    state: State,
    metrics: ParseMetrics,
    compact_at: usize,
}

impl<'g> Parser<'g> {
    #[must_use]
    pub fn new(grammar: &'g Grammar) -> Self {
        Self::with_config(grammar, ParserConfig::default())
    }

    #[must_use]
    pub fn with_config(grammar: &'g Grammar, config: ParserConfig) -> Self {
        Self {
            matchers: MatcherCache::new(grammar),
            config,
            arena: SequenceArena::new(),
            threads: Vec::new(),
            results: Vec::new(),
            exceptions: Vec::new(),
            last_position: None,
            state: State::Idle,
            metrics: ParseMetrics::default(),
            compact_at: MIN_COMPACT,
        }
    }

    #[must_use]
    pub const fn grammar(&self) -> &'g Grammar {
        self.matchers.grammar()
    }

    #[must_use]
    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Prepare to parse `pattern` from `start`, discarding any previous
    /// state.
    pub fn setup(&mut self, pattern: &Pattern, start: Position) {
        self.arena.clear();
        self.results.clear();
        self.exceptions.clear();
        self.metrics = ParseMetrics::default();
        self.compact_at = MIN_COMPACT;

        let root = Arc::new(SequenceMatcher {
            name: None,
            parts: vec![Matcher::instantiate(pattern)].into(),
            build: nth(0),
        });
        let matcher = root.parts[0].clone();
        let sequence = self.arena.enter(None, root);

        self.threads = vec![Thread {
            step: Step::Next { matcher, sequence },
            predicates: Pending::new(),
            fresh: Fresh::new(),
        }];
        self.last_position = Some(start);
        self.state = State::Running;
    }

    /// Consume `tokens` until the end of input or until every thread has
    /// died.
    ///
    /// Syntax errors are not returned here; check [`has_error`](Self::has_error).
    ///
    /// # Errors
    ///
    /// Lexer errors and tripped resource guards.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn parse(&mut self, tokens: &mut impl TokenSource) -> Result<(), ParseError> {
        while self.state == State::Running {
            let token = self.guard(tokens.next_token().map_err(ParseError::from))?;
            if token.is_eof() {
                return self.finish();
            }
            self.feed_token(token)?;
        }
        Ok(())
    }

    /// Advance every thread over `token`.
    ///
    /// An end-of-input token finishes the parse. Tokens fed after the parse
    /// stopped are ignored.
    ///
    /// # Errors
    ///
    /// [`ParseError::ThreadLimit`] and [`ParseError::ExpansionLimit`].
    pub fn feed_token(&mut self, token: Token) -> Result<(), ParseError> {
        if self.state != State::Running {
            return Ok(());
        }
        if token.is_eof() {
            return self.finish_at(&token);
        }

        let started = Instant::now();
        let outcome = self.consume(&token);
        self.metrics.parse_time += started.elapsed();
        self.metrics.tokens_consumed += 1;

        let (survivors, failures) = self.guard(outcome)?;
        self.last_position = Some(token.position.clone());

        if survivors.is_empty() {
            tracing::debug!(%token, failures = failures.len(), "all threads died");
            self.exceptions = failure::exceptions_from(&self.materialize(failures), &token);
            self.state = State::Halted;
        }
        self.threads = survivors;
        if self.arena.len() >= self.compact_at {
            self.compact();
        }
        self.metrics.sequences_allocated = self.arena.allocated();
        Ok(())
    }

    /// Drop arena nodes that no live thread can reach.
    fn compact(&mut self) {
        let mut roots: Vec<&mut SeqId> = Vec::with_capacity(self.threads.len());
        for thread in &mut self.threads {
            match &mut thread.step {
                Step::Next { sequence, .. } | Step::Done(sequence) => roots.push(sequence),
            }
            roots.extend(thread.fresh.iter_mut());
        }
        self.arena.compact(&mut roots);
        self.compact_at = (self.arena.len() * 2).max(MIN_COMPACT);
    }

    fn materialize(&self, failures: Vec<Failed>) -> Vec<ParserFailure> {
        failures
            .into_iter()
            .map(|failed| ParserFailure {
                breadcrumb: self.arena.breadcrumb(failed.sequence),
                kind: failed.kind,
            })
            .collect()
    }

    /// Feed the end of input, one column after the last consumed token, and
    /// complete every thread that can finish without more input.
    ///
    /// # Errors
    ///
    /// [`ParseError::ThreadLimit`] and [`ParseError::ExpansionLimit`].
    pub fn finish(&mut self) -> Result<(), ParseError> {
        if self.state != State::Running {
            return Ok(());
        }
        let eof = Token::eof(self.last_end().after(1));
        self.finish_at(&eof)
    }

    fn finish_at(&mut self, eof: &Token) -> Result<(), ParseError> {
        let started = Instant::now();
        let outcome = self.consume(eof).and_then(|(survivors, mut failures)| {
            self.threads = survivors;
            self.force_complete(eof, &mut failures)?;
            Ok(failures)
        });
        self.metrics.parse_time += started.elapsed();
        let failures = self.guard(outcome)?;

        self.threads.clear();
        self.metrics.sequences_allocated = self.arena.allocated();
        if self.results.is_empty() {
            tracing::debug!(failures = failures.len(), "no derivation reached the end of input");
            self.exceptions = failure::exceptions_from(&self.materialize(failures), eof);
            self.state = State::Halted;
        } else {
            tracing::debug!(results = self.results.len(), "parse finished");
            self.state = State::Finished;
        }
        Ok(())
    }

    /// Halt on a fatal error.
    fn guard<T>(&mut self, outcome: Result<T, ParseError>) -> Result<T, ParseError> {
        outcome.inspect_err(|error| {
            tracing::debug!(%error, "parse aborted");
            self.threads.clear();
            self.state = State::Halted;
        })
    }

    /// Whether the parse failed: no results and at least one exception.
    #[must_use]
    pub fn has_error(&self) -> bool {
        !self.exceptions.is_empty() && self.threads.is_empty() && self.results.is_empty()
    }

    /// Whether the parser still accepts tokens.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    /// Completed derivations; more than one means the input is ambiguous.
    #[must_use]
    pub fn results(&self) -> &[Capture] {
        &self.results
    }

    pub fn take_results(&mut self) -> Vec<Capture> {
        std::mem::take(&mut self.results)
    }

    #[must_use]
    pub fn exceptions(&self) -> &[ParseException] {
        &self.exceptions
    }

    pub fn take_exceptions(&mut self) -> Vec<ParseException> {
        std::mem::take(&mut self.exceptions)
    }

    /// Number of live threads.
    #[must_use]
    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    #[must_use]
    pub const fn metrics(&self) -> &ParseMetrics {
        &self.metrics
    }

    fn last_end(&self) -> Position {
        match &self.last_position {
            Some(position) => position.end_point(),
            None => Position::start_of(Arc::new(crate::syntax::Source::new("", ""))),
        }
    }

    /// Resolve, test predicates and match `token` for every live thread.
    fn consume(&mut self, token: &Token) -> Result<(Vec<Thread>, Vec<Failed>), ParseError> {
        let ready = self.resolve_all(token)?;
        let last = self.last_end();
        let mut survivors = Vec::with_capacity(ready.len());
        let mut failures = Vec::new();

        for thread in ready {
            let rejected = self.check_predicates(&thread, token, &last);
            let passed = rejected.is_none();
            failures.extend(rejected);
            match thread {
                Ready::Accepted { sequence, .. } if token.is_eof() => {
                    if passed {
                        let capture = self.finish_chain(sequence);
                        self.results.push(capture);
                    }
                }
                Ready::Accepted { sequence, .. } => failures.push(Failed {
                    sequence,
                    kind: FailureKind::Expected("EOF".into()),
                }),
                Ready::Token { spec, sequence, mut predicates, mut fresh } if spec.matches(token) => {
                    if passed {
                        for id in fresh.drain(..) {
                            self.arena.force(id);
                        }
                        let step = self.advance(sequence, Capture::Token(token.clone()), &mut fresh);
                        predicates.clear();
                        survivors.push(Thread { step, predicates, fresh });
                    }
                }
                Ready::Token { spec, sequence, .. } => failures.push(Failed {
                    sequence,
                    kind: FailureKind::Expected(spec.to_string().into()),
                }),
            }
        }

        tracing::trace!(%token, survivors = survivors.len(), failures = failures.len(), "token consumed");
        Ok((survivors, failures))
    }

    /// Complete threads that consumed the end of input through any trailing
    /// empty matches. Threads that still need input fail.
    fn force_complete(&mut self, eof: &Token, failures: &mut Vec<Failed>) -> Result<(), ParseError> {
        if self.threads.is_empty() {
            return Ok(());
        }
        let ready = self.resolve_all(eof)?;
        let last = self.last_end();
        for thread in ready {
            let rejected = self.check_predicates(&thread, eof, &last);
            let passed = rejected.is_none();
            failures.extend(rejected);
            match thread {
                Ready::Accepted { sequence, .. } => {
                    if passed {
                        let capture = self.finish_chain(sequence);
                        self.results.push(capture);
                    }
                }
                Ready::Token { spec, sequence, .. } => failures.push(Failed {
                    sequence,
                    kind: FailureKind::Expected(spec.to_string().into()),
                }),
            }
        }
        Ok(())
    }

    fn check_predicates(&self, thread: &Ready, token: &Token, last: &Position) -> Option<Failed> {
        let state = PredicateState {
            next: token,
            last_position: last,
        };
        let failed = thread.predicates().iter().find(|p| !p.test(&state))?;
        Some(Failed {
            sequence: thread.sequence(),
            kind: failed.failure(&state),
        })
    }

    /// Expand every live thread until it waits on a token or is accepted.
    fn resolve_all(&mut self, token: &Token) -> Result<Vec<Ready>, ParseError> {
        let mut work: Vec<Thread> = std::mem::take(&mut self.threads);
        work.reverse();
        let mut ready = Vec::with_capacity(work.len());
        let mut expansions = 0usize;

        while let Some(Thread { step, mut predicates, mut fresh }) = work.pop() {
            expansions += 1;
            if expansions > self.config.max_expansions {
                return Err(ParseError::ExpansionLimit {
                    limit: self.config.max_expansions,
                    position: token.position.clone(),
                });
            }

            let (matcher, sequence) = match step {
                Step::Done(sequence) => {
                    ready.push(Ready::Accepted { sequence, predicates });
                    continue;
                }
                Step::Next { matcher, sequence } => (matcher, sequence),
            };
            predicates.extend(matcher.predicates.iter().cloned());

            match matcher.kind {
                MatcherKind::Token(spec) => {
                    ready.push(Ready::Token { spec, sequence, predicates, fresh });
                    if ready.len() > self.config.max_threads {
                        return Err(ParseError::ThreadLimit {
                            limit: self.config.max_threads,
                            position: token.position.clone(),
                        });
                    }
                }
                MatcherKind::Nothing => {
                    let step = self.advance(sequence, Capture::Empty(self.last_end()), &mut fresh);
                    work.push(Thread { step, predicates, fresh });
                }
                MatcherKind::Sequence(inner) => {
                    let child = self.arena.enter(Some(sequence), inner);
                    let step = self.next_step(child, &mut fresh);
                    work.push(Thread { step, predicates, fresh });
                }
                MatcherKind::Branch(options) => {
                    self.metrics.branches += 1;
                    for option in options.iter().rev() {
                        work.push(Thread {
                            step: Step::Next {
                                matcher: option.clone(),
                                sequence,
                            },
                            predicates: predicates.clone(),
                            fresh: fresh.clone(),
                        });
                    }
                }
                MatcherKind::Generator(generator) => {
                    let matcher = self.matchers.resolve(&generator)?;
                    work.push(Thread {
                        step: Step::Next { matcher, sequence },
                        predicates,
                        fresh,
                    });
                }
            }
        }

        self.metrics.peak_threads = self.metrics.peak_threads.max(ready.len());
        tracing::trace!(%token, threads = ready.len(), expansions, "threads resolved");
        Ok(ready)
    }

    fn advance(&mut self, sequence: SeqId, capture: Capture, fresh: &mut Fresh) -> Step {
        let next = self.arena.add_capture(sequence, capture);
        self.next_step(next, fresh)
    }

    /// The next part of `sequence`. A finished sequence moves on to the
    /// enclosing sequence that still has parts left, or is done when there
    /// is none.
    fn next_step(&mut self, sequence: SeqId, fresh: &mut Fresh) -> Step {
        if let Some(matcher) = self.arena.next_matcher(sequence) {
            return Step::Next {
                matcher: matcher.clone(),
                sequence,
            };
        }
        let Some(resume) = self.arena.resume(sequence) else {
            return Step::Done(sequence);
        };
        let resumed = self.arena.add_finished(resume, sequence);
        fresh.push(resumed);
        match self.arena.next_matcher(resumed) {
            Some(matcher) => Step::Next {
                matcher: matcher.clone(),
                sequence: resumed,
            },
            None => Step::Done(resumed),
        }
    }

    /// Build the captures of a done thread's open sequences, returning the
    /// root's.
    fn finish_chain(&self, sequence: SeqId) -> Capture {
        self.arena.build_chain(sequence, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{PatternBuilder, list_of};
    use crate::lexer::{TokenKind, Tokenizer};
    use crate::syntax::Source;

    fn run<'g>(grammar: &'g Grammar, text: &str) -> Parser<'g> {
        run_with(grammar, text, ParserConfig::default())
    }

    fn run_with<'g>(grammar: &'g Grammar, text: &str, config: ParserConfig) -> Parser<'g> {
        let source = Arc::new(Source::new("test", text));
        let mut tokens = Tokenizer::new(Arc::clone(&source), grammar.keywords());
        let mut parser = Parser::with_config(grammar, config);
        parser.setup(grammar.main().unwrap(), Position::start_of(source));
        let _ = parser.parse(&mut tokens);
        parser
    }

    fn declaration() -> Grammar {
        let b = PatternBuilder::new();
        b.define(
            "main",
            b.sequence(
                list_of(),
                [b.token(TokenKind::Word), b.token(TokenKind::Word), b.symbol(";")],
            ),
        );
        b.build().unwrap()
    }

    #[test]
    fn test_accepts_declaration() {
        let grammar = declaration();
        let parser = run(&grammar, "int x ;");
        assert!(!parser.has_error());
        assert_eq!(parser.results().len(), 1);
        assert_eq!(parser.metrics().tokens_consumed, 3);
    }

    #[test]
    fn test_missing_token_reports_expectation() {
        let grammar = declaration();
        let parser = run(&grammar, "int x");
        assert!(parser.has_error());
        assert_eq!(messages(&parser), ["Expected Symbol \";\", got <EOF>"]);
    }

    #[test]
    fn test_stops_after_extinction() {
        let grammar = declaration();
        let source = Arc::new(Source::new("test", "1 x ;"));
        let tokens = Tokenizer::new(Arc::clone(&source), grammar.keywords()).tokenize().unwrap();

        let mut parser = Parser::new(&grammar);
        parser.setup(grammar.main().unwrap(), Position::start_of(source));
        for token in tokens {
            parser.feed_token(token).unwrap();
        }
        assert!(parser.has_error());
        assert!(!parser.is_running());
        assert_eq!(parser.metrics().tokens_consumed, 1);
    }

    #[test]
    fn test_trailing_input_is_rejected() {
        let grammar = declaration();
        let parser = run(&grammar, "int x ; y");
        assert!(parser.has_error());
        assert_eq!(parser.exceptions()[0].message(), "Expected EOF, got Word \"y\"");
    }

    #[test]
    fn test_empty_capture_for_absent_optional() {
        let b = PatternBuilder::new();
        b.define(
            "main",
            b.sequence(list_of(), [b.token(TokenKind::Word), b.optional(b.symbol(";"))]),
        );
        let grammar = b.build().unwrap();

        let parser = run(&grammar, "x");
        assert!(!parser.has_error());
        let list = parser.results()[0].as_list().unwrap();
        assert!(list.get(1).is_some_and(Capture::is_empty_marker));
        assert_eq!(list.get(1).unwrap().position().range().start().into(), 1);
    }

    fn messages(parser: &Parser<'_>) -> Vec<String> {
        parser.exceptions().iter().map(|e| e.message().to_owned()).collect()
    }

    #[test]
    fn test_end_of_input_joins_other_expectations() {
        let b = PatternBuilder::new();
        b.define("main", b.list(b.token(TokenKind::Word)));
        let grammar = b.build().unwrap();
        let parser = run(&grammar, "x y 1");
        assert_eq!(messages(&parser), ["Expected one of {Word, EOF}, got Integer \"1\""]);

        let b = PatternBuilder::new();
        b.define(
            "main",
            b.sequence(list_of(), [b.token(TokenKind::Word), b.optional(b.symbol(";"))]),
        );
        let grammar = b.build().unwrap();
        let parser = run(&grammar, "x y");
        assert_eq!(messages(&parser), ["Expected one of {Symbol \";\", EOF}, got Word \"y\""]);
    }

    #[test]
    fn test_failed_predicate_still_reports_mismatch() {
        let b = PatternBuilder::new();
        b.define(
            "main",
            b.sequence(
                list_of(),
                [
                    b.token(TokenKind::Word),
                    b.token(TokenKind::Word).with_predicate(crate::grammar::same_line()),
                ],
            ),
        );
        let grammar = b.build().unwrap();
        let parser = run(&grammar, "a\n1");
        assert_eq!(
            messages(&parser),
            ["Expected Word, got Integer \"1\"", "Unexpected newline before Integer \"1\""]
        );
    }

    #[test]
    fn test_long_input_compacts_arena() {
        let b = PatternBuilder::new();
        b.define("main", b.list(b.token(TokenKind::Word)));
        let grammar = b.build().unwrap();

        let text = vec!["w"; 20_000].join(" ");
        let mut parser = run(&grammar, &text);
        assert!(!parser.has_error());
        assert!(parser.arena.len() < parser.metrics().sequences_allocated);
        let results = parser.take_results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].as_list().map(crate::grammar::ListCapture::len), Some(20_000));
    }

    #[test]
    fn test_branches_explore_in_order() {
        let b = PatternBuilder::new();
        let word = b.token(TokenKind::Word);
        b.define("main", b.one_of([word.clone(), word]));
        let grammar = b.build().unwrap();

        let parser = run(&grammar, "x");
        assert_eq!(parser.results().len(), 2);
        assert!(parser.metrics().branches >= 1);
        assert_eq!(parser.metrics().peak_threads, 2);
    }

    #[test]
    fn test_expansion_limit() {
        let b = PatternBuilder::new();
        b.define(
            "main",
            b.one_of([
                b.sequence(list_of(), [b.reference("main"), b.symbol("+")]),
                b.token(TokenKind::Integer),
            ]),
        );
        let grammar = b.build().unwrap();

        let source = Arc::new(Source::new("test", "1 + 1"));
        let mut tokens = Tokenizer::new(Arc::clone(&source), grammar.keywords());
        let mut parser = Parser::with_config(&grammar, ParserConfig::default().with_max_expansions(500));
        parser.setup(grammar.main().unwrap(), Position::start_of(source));
        let error = parser.parse(&mut tokens).unwrap_err();
        assert!(matches!(error, ParseError::ExpansionLimit { limit: 500, .. }));
        assert!(!parser.is_running());
    }

    #[test]
    fn test_thread_limit() {
        let b = PatternBuilder::new();
        let word = b.token(TokenKind::Word);
        b.define("main", b.one_of([word.clone(), word.clone(), word.clone(), word]));
        let grammar = b.build().unwrap();

        let source = Arc::new(Source::new("test", "x"));
        let mut tokens = Tokenizer::new(Arc::clone(&source), grammar.keywords());
        let mut parser = Parser::with_config(&grammar, ParserConfig::default().with_max_threads(3));
        parser.setup(grammar.main().unwrap(), Position::start_of(source));
        let error = parser.parse(&mut tokens).unwrap_err();
        assert!(matches!(error, ParseError::ThreadLimit { limit: 3, .. }));
    }

    #[test]
    fn test_feed_before_setup_is_ignored() {
        let grammar = declaration();
        let mut parser = Parser::new(&grammar);
        let source = Arc::new(Source::new("test", "x"));
        parser
            .feed_token(Token::new(TokenKind::Word, "x", Position::start_of(source)))
            .unwrap();
        assert!(parser.finish().is_ok());
        assert!(!parser.has_error());
        assert!(parser.results().is_empty());
    }
}
