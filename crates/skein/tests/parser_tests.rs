//! End-to-end tests for the parsing engine

use skein::grammar::{
    Capture, Grammar, ObjectCapture, PatternBuilder, TokenSpec, list_of, matches, next_line, nth,
    same_line,
};
use skein::lexer::{TokenKind, Tokenizer};
use skein::parser::{Parser, ParserConfig, parse_source, parse_source_single};
use skein::syntax::{Position, Source, TextRange, TextSize};
use skein::ParseError;
use std::any::Any;
use std::sync::Arc;

/// Route engine logs to the test output; set `RUST_LOG` to see them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn source(text: &str) -> Arc<Source> {
    Arc::new(Source::new("test", text))
}

fn parse(grammar: &Grammar, text: &str) -> Result<Vec<Capture>, ParseError> {
    parse_source(grammar, source(text), ParserConfig::default())
}

fn messages(error: &ParseError) -> Vec<&str> {
    error.exceptions().iter().map(|e| e.message()).collect()
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
fn test_declaration_spans_all_tokens() {
    let grammar = declaration();
    let results = parse(&grammar, "int x ;").unwrap();
    assert_eq!(results.len(), 1);

    let capture = &results[0];
    assert_eq!(
        capture.position().range(),
        TextRange::new(TextSize::from(0), TextSize::from(7))
    );
    let parts = capture.as_list().unwrap();
    let values: Vec<_> = parts
        .iter()
        .filter_map(Capture::as_token)
        .map(|t| t.value.as_str())
        .collect();
    assert_eq!(values, ["int", "x", ";"]);
}

#[test]
fn test_declaration_missing_semicolon() {
    let grammar = declaration();
    let error = parse(&grammar, "int x").unwrap_err();
    assert_eq!(messages(&error), ["Expected Symbol \";\", got <EOF>"]);
    assert_eq!(
        error.exceptions()[0].to_string(),
        "test: Expected Symbol \";\", got <EOF>\nint x\n     ^"
    );
}

#[test]
fn test_trailing_input_expects_eof() {
    let grammar = declaration();
    let error = parse(&grammar, "int x ; y").unwrap_err();
    assert_eq!(messages(&error), ["Expected EOF, got Word \"y\""]);
}

#[test]
fn test_ambiguous_choice_yields_every_result() {
    let b = PatternBuilder::new();
    let x = b.token_value(TokenKind::Word, "x");
    b.define("main", b.one_of([x.clone(), x]));
    let grammar = b.build().unwrap();

    let results = parse(&grammar, "x").unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0], results[1]);

    let error = parse_source_single(&grammar, source("x"), ParserConfig::default()).unwrap_err();
    let ParseError::Ambiguity { results } = error else {
        panic!("expected an ambiguity error");
    };
    assert_eq!(results.len(), 2);
}

#[test]
fn test_list_sizes_and_order() {
    let b = PatternBuilder::new();
    b.define("main", b.list(b.token(TokenKind::Word)));
    let grammar = b.build().unwrap();

    let empty = parse_source_single(&grammar, source(""), ParserConfig::default()).unwrap();
    let list = empty.as_list().unwrap();
    assert!(list.is_empty());
    assert_eq!(list.position().range(), TextRange::empty(TextSize::zero()));

    let three = parse_source_single(&grammar, source("a b c"), ParserConfig::default()).unwrap();
    let values: Vec<_> = three
        .as_list()
        .unwrap()
        .iter()
        .filter_map(Capture::as_token)
        .map(|t| t.value.to_string())
        .collect();
    assert_eq!(values, ["a", "b", "c"]);
}

#[test]
fn test_empty_list_is_anchored_where_matching_began() {
    let b = PatternBuilder::new();
    b.define(
        "main",
        b.sequence(list_of(), [b.symbol("["), b.list(b.token(TokenKind::Integer)), b.symbol("]")]),
    );
    let grammar = b.build().unwrap();

    let capture = parse_source_single(&grammar, source("[ ]"), ParserConfig::default()).unwrap();
    let items = capture.as_list().unwrap().get(1).and_then(Capture::as_list).unwrap();
    assert!(items.is_empty());
    assert_eq!(items.position().range().start(), TextSize::from(1));
}

#[test]
fn test_list_ending_early_names_eof_alongside_item() {
    let b = PatternBuilder::new();
    b.define("main", b.list(b.token(TokenKind::Word)));
    let grammar = b.build().unwrap();

    let error = parse(&grammar, "x y 1").unwrap_err();
    assert_eq!(messages(&error), ["Expected one of {Word, EOF}, got Integer \"1\""]);
}

#[test]
fn test_long_list_parses_with_default_limits() {
    init_tracing();
    let b = PatternBuilder::new();
    b.define("main", b.list(b.token(TokenKind::Word)));
    let grammar = b.build().unwrap();

    let text = vec!["item"; 10_000].join(" ");
    let source = source(&text);
    let mut tokens = Tokenizer::new(Arc::clone(&source), grammar.keywords());
    let mut parser = Parser::new(&grammar);
    parser.setup(grammar.main().unwrap(), Position::start_of(Arc::clone(&source)));
    parser.parse(&mut tokens).unwrap();

    assert!(!parser.has_error());
    assert_eq!(parser.metrics().tokens_consumed, 10_000);
    assert!(parser.metrics().sequences_allocated < 10 * 10_000);
    let list = parser.results()[0].as_list().unwrap();
    assert_eq!(list.len(), 10_000);
    assert_eq!(list.position().range().end(), TextSize::of_usize(text.len()));
}

#[test]
fn test_long_argument_list_parses_with_default_limits() {
    init_tracing();
    let b = PatternBuilder::new();
    b.define(
        "main",
        b.sequence(
            nth(1),
            [
                b.symbol("("),
                b.optional(b.delim(b.token(TokenKind::Integer), b.symbol(","))),
                b.symbol(")"),
            ],
        ),
    );
    let grammar = b.build().unwrap();

    let items: Vec<String> = (0..5_000).map(|i| i.to_string()).collect();
    let text = format!("({})", items.join(", "));
    let arguments = parse_source_single(&grammar, source(&text), ParserConfig::default()).unwrap();
    let arguments = arguments.as_list().unwrap();
    assert_eq!(arguments.len(), 5_000);
    assert_eq!(
        arguments.get(4_999).and_then(Capture::as_token).map(|t| t.value.as_str()),
        Some("4999")
    );
}

#[test]
fn test_delimited_list() {
    let b = PatternBuilder::new();
    b.define(
        "main",
        b.optional(b.delim(b.token(TokenKind::Integer), b.symbol(","))),
    );
    let grammar = b.build().unwrap();

    let none = parse_source_single(&grammar, source(""), ParserConfig::default()).unwrap();
    assert!(none.is_empty_marker());

    let one = parse_source_single(&grammar, source("7"), ParserConfig::default()).unwrap();
    assert_eq!(one.as_list().map(|l| l.len()), Some(1));

    let three = parse_source_single(&grammar, source("1, 2, 3"), ParserConfig::default()).unwrap();
    let items = three.as_list().unwrap();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|c| c.as_token().is_some_and(|t| t.kind == TokenKind::Integer)));

    let error = parse(&grammar, "1, 2,").unwrap_err();
    assert_eq!(messages(&error), ["Expected Integer, got <EOF>"]);
}

#[test]
fn test_operator_requires_adjacency() {
    let b = PatternBuilder::new();
    b.define(
        "main",
        b.sequence(nth(1), [b.token(TokenKind::Word), b.operator("=="), b.token(TokenKind::Word)]),
    );
    let grammar = b.build().unwrap();

    let op = parse_source_single(&grammar, source("a == b"), ParserConfig::default()).unwrap();
    let token = op.as_token().unwrap();
    assert_eq!(token.kind, TokenKind::Symbol);
    assert_eq!(token.value, "==");
    assert_eq!(
        token.position.range(),
        TextRange::new(TextSize::from(2), TextSize::from(4))
    );

    let error = parse(&grammar, "a = = b").unwrap_err();
    assert_eq!(messages(&error), ["Unexpected space before Symbol \"=\""]);
}

#[test]
fn test_same_line_predicate() {
    let b = PatternBuilder::new();
    b.define(
        "main",
        b.sequence(
            list_of(),
            [b.token(TokenKind::Word), b.token(TokenKind::Word).with_predicate(same_line())],
        ),
    );
    let grammar = b.build().unwrap();

    assert!(parse(&grammar, "a b").is_ok());
    let error = parse(&grammar, "a\nb").unwrap_err();
    assert_eq!(messages(&error), ["Unexpected newline before Word \"b\""]);
}

#[test]
fn test_next_line_predicate() {
    let b = PatternBuilder::new();
    b.define(
        "stmt",
        b.sequence(nth(0), [b.token(TokenKind::Word), b.predicate(next_line())]),
    );
    b.define("main", b.list(b.reference("stmt")));
    let grammar = b.build().unwrap();

    let results = parse(&grammar, "a\nb\nc").unwrap();
    assert_eq!(results[0].as_list().map(|l| l.len()), Some(3));

    let error = parse(&grammar, "a b").unwrap_err();
    assert_eq!(
        messages(&error),
        [
            "Expected newline before Word \"b\" (in parse as main.stmt)",
            "Expected EOF, got Word \"b\" (in parse as main)",
            "Expected newline before Word \"b\" (in parse as main)",
        ]
    );
}

#[test]
fn test_failed_predicate_reports_mismatch_too() {
    let b = PatternBuilder::new();
    b.define(
        "main",
        b.sequence(
            list_of(),
            [b.token(TokenKind::Word), b.token(TokenKind::Word).with_predicate(same_line())],
        ),
    );
    let grammar = b.build().unwrap();

    let error = parse(&grammar, "a\n1").unwrap_err();
    assert_eq!(
        messages(&error),
        ["Expected Word, got Integer \"1\"", "Unexpected newline before Integer \"1\""]
    );
}

#[test]
fn test_lookahead_predicate() {
    let b = PatternBuilder::new();
    let paren = TokenSpec::new(TokenKind::Symbol, Some("("));
    b.define(
        "main",
        b.sequence(
            list_of(),
            [
                b.token(TokenKind::Word),
                b.predicate(matches(paren)),
                b.symbol("("),
                b.symbol(")"),
            ],
        ),
    );
    let grammar = b.build().unwrap();

    assert!(parse(&grammar, "f()").is_ok());
    let error = parse(&grammar, "f)").unwrap_err();
    assert_eq!(messages(&error), ["Expected Symbol \"(\", got Symbol \")\""]);
}

#[test]
fn test_integer_accepted_as_float() {
    let b = PatternBuilder::new();
    b.define("main", b.token(TokenKind::Float));
    let grammar = b.build().unwrap();

    assert!(parse(&grammar, "3").is_ok());
    assert!(parse(&grammar, "3.5").is_ok());
}

#[test]
fn test_keywords_are_not_words() {
    let b = PatternBuilder::new();
    b.define(
        "main",
        b.sequence(list_of(), [b.keyword("let"), b.token(TokenKind::Word)]),
    );
    let grammar = b.build().unwrap();

    assert!(parse(&grammar, "let x").is_ok());
    let error = parse(&grammar, "let let").unwrap_err();
    assert_eq!(messages(&error), ["Expected Word, got Keyword \"let\""]);
}

#[test]
fn test_recursive_grammar() {
    let b = PatternBuilder::new();
    b.define(
        "expr",
        b.one_of([
            b.token(TokenKind::Integer),
            b.sequence(nth(1), [b.symbol("("), b.reference("expr"), b.symbol(")")]),
        ]),
    );
    b.set_main("expr");
    let grammar = b.build().unwrap();

    let capture = parse_source_single(&grammar, source("((42))"), ParserConfig::default()).unwrap();
    assert_eq!(capture.as_token().map(|t| t.value.as_str()), Some("42"));
}

#[test]
fn test_optional_or_builds_absent_capture() {
    let b = PatternBuilder::new();
    let absent: skein::grammar::CaptureFn = Arc::new(|parts: &[Capture]| {
        Capture::Token(skein::Token::new(
            TokenKind::Integer,
            "0",
            parts[0].position().clone(),
        ))
    });
    b.define(
        "main",
        b.sequence(nth(1), [b.token(TokenKind::Word), b.optional_or(b.token(TokenKind::Integer), absent)]),
    );
    let grammar = b.build().unwrap();

    let capture = parse_source_single(&grammar, source("x"), ParserConfig::default()).unwrap();
    assert_eq!(capture.as_token().map(|t| t.value.as_str()), Some("0"));
}

#[derive(Debug, PartialEq)]
struct Assignment {
    position: Position,
    name: String,
    value: String,
}

impl ObjectCapture for Assignment {
    fn position(&self) -> &Position {
        &self.position
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn structurally_eq(&self, other: &dyn ObjectCapture) -> bool {
        other.as_any().downcast_ref::<Self>() == Some(self)
    }
}

fn assignment_grammar() -> Grammar {
    let b = PatternBuilder::new();
    let build: skein::grammar::CaptureFn = Arc::new(|parts: &[Capture]| {
        let text = |i: usize| {
            parts[i]
                .as_token()
                .map(|t| t.value.to_string())
                .unwrap_or_default()
        };
        Capture::object(Assignment {
            position: parts[0].position().to(parts[2].position()),
            name: text(0),
            value: text(2),
        })
    });
    b.define(
        "assign",
        b.sequence(build, [b.token(TokenKind::Word), b.symbol("="), b.token(TokenKind::Integer)]),
    );
    b.define("main", b.list(b.reference("assign")));
    b.build().unwrap()
}

#[test]
fn test_object_captures() {
    let grammar = assignment_grammar();
    let capture = parse_source_single(&grammar, source("a = 1 b = 2"), ParserConfig::default()).unwrap();
    let list = capture.as_list().unwrap();
    assert_eq!(list.len(), 2);

    let second = list.get(1).and_then(Capture::downcast_ref::<Assignment>).unwrap();
    assert_eq!(second.name, "b");
    assert_eq!(second.value, "2");
}

#[test]
fn test_replay_is_deterministic() {
    let grammar = assignment_grammar();
    let text = "a = 1 b = 2 c = 3";
    let first = parse(&grammar, text).unwrap();
    let second = parse(&grammar, text).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_manual_feeding_matches_pull_parsing() {
    let grammar = declaration();
    let src = source("int x ;");
    let tokens = Tokenizer::new(Arc::clone(&src), grammar.keywords()).tokenize().unwrap();

    let mut parser = Parser::new(&grammar);
    parser.setup(grammar.main().unwrap(), Position::start_of(Arc::clone(&src)));
    for token in tokens.into_iter().filter(|t| !t.is_eof()) {
        parser.feed_token(token).unwrap();
    }
    parser.finish().unwrap();

    assert!(!parser.has_error());
    assert_eq!(parser.results(), parse(&grammar, "int x ;").unwrap().as_slice());
    assert_eq!(parser.metrics().tokens_consumed, 3);
    assert!(parser.metrics().sequences_allocated > 0);
}

#[test]
fn test_left_recursion_hits_expansion_limit() {
    let b = PatternBuilder::new();
    b.define(
        "main",
        b.one_of([
            b.sequence(list_of(), [b.reference("main"), b.symbol("+"), b.token(TokenKind::Integer)]),
            b.token(TokenKind::Integer),
        ]),
    );
    let grammar = b.build().unwrap();

    let config = ParserConfig::default().with_max_expansions(10_000);
    let error = parse_source(&grammar, source("1 + 2"), config).unwrap_err();
    assert!(matches!(error, ParseError::ExpansionLimit { limit: 10_000, .. }));
}

#[test]
fn test_nullable_repetition_hits_expansion_limit() {
    let b = PatternBuilder::new();
    b.define("main", b.list(b.optional(b.token(TokenKind::Word))));
    let grammar = b.build().unwrap();

    let config = ParserConfig::default().with_max_expansions(10_000);
    let error = parse_source(&grammar, source("a"), config).unwrap_err();
    assert!(matches!(error, ParseError::ExpansionLimit { .. }));
}

#[test]
fn test_thread_limit() {
    let b = PatternBuilder::new();
    // Every word can be read in two ways, doubling the threads per token.
    let word = b.token(TokenKind::Word);
    b.define("main", b.list(b.one_of([word.clone(), word])));
    let grammar = b.build().unwrap();

    let config = ParserConfig::default().with_max_threads(64);
    let error = parse_source(&grammar, source("a b c d e f g h"), config).unwrap_err();
    let ParseError::ThreadLimit { limit, position } = error else {
        panic!("expected a thread limit error");
    };
    assert_eq!(limit, 64);
    assert!(position.start().column > 0);
}
