#![no_main]
use libfuzzer_sys::fuzz_target;
use skein::grammar::{Grammar, PatternBuilder, list_of, nth};
use skein::lexer::TokenKind;
use skein::parser::{ParserConfig, parse_source};
use skein::syntax::Source;
use std::sync::{Arc, OnceLock};

fn grammar() -> &'static Grammar {
    static GRAMMAR: OnceLock<Grammar> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        let b = PatternBuilder::new();
        b.define(
            "value",
            b.one_of([
                b.token(TokenKind::Integer),
                b.token(TokenKind::Float),
                b.token(TokenKind::String),
                b.reference("call"),
            ]),
        );
        b.define(
            "call",
            b.sequence(
                list_of(),
                [
                    b.token(TokenKind::Word),
                    b.symbol("("),
                    b.optional(b.delim(b.reference("value"), b.symbol(","))),
                    b.symbol(")"),
                ],
            ),
        );
        b.define(
            "stmt",
            b.one_of([
                b.sequence(nth(0), [b.reference("call"), b.symbol(";")]),
                b.sequence(list_of(), [b.keyword("let"), b.token(TokenKind::Word), b.operator(":="), b.reference("value")]),
            ]),
        );
        b.define("main", b.list(b.reference("stmt")));
        b.build().expect("fuzz grammar is valid")
    })
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let config = ParserConfig::default().with_max_threads(256).with_max_expansions(100_000);
    let source = Arc::new(Source::new("fuzz", text));

    if let Err(error) = parse_source(grammar(), source, config) {
        // Rendering must not panic for any reported position.
        let _ = error.to_string();
        for exception in error.exceptions() {
            let _ = exception.to_string();
        }
    }
});
