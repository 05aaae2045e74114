//! Default tokenizer built on `logos`.
//!
//! Whitespace and `//` line comments are skipped. Words found in the keyword
//! set become [`TokenKind::Keyword`]; every other non-word, non-digit
//! character is emitted as a single-character [`TokenKind::Symbol`].

use crate::error::{LexerError, LexerErrorKind};
use crate::lexer::{Token, TokenKind, TokenSource};
use crate::syntax::{Position, Source, TextRange, TextSize};
use ahash::RandomState;
use compact_str::CompactString;
use hashbrown::HashSet;
use logos::Logos;
use std::sync::Arc;

/// Keyword set consulted when classifying words.
pub type KeywordSet = HashSet<CompactString, RandomState>;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
enum RawToken {
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Word,

    #[regex(r"[0-9]+")]
    Integer,

    #[regex(r"[0-9]+\.[0-9]+")]
    Float,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,

    #[regex(r#""([^"\\\n]|\\.)*"#)]
    UnterminatedString,

    #[regex(r#"[^ \t\r\n\fA-Za-z0-9_"]"#)]
    Symbol,
}

/// Pull-driven tokenizer over a [`Source`].
#[derive(Debug)]
pub struct Tokenizer<'k> {
    source: Arc<Source>,
    keywords: &'k KeywordSet,
    offset: usize,
    last: Position,
}

impl<'k> Tokenizer<'k> {
    #[must_use]
    pub fn new(source: Arc<Source>, keywords: &'k KeywordSet) -> Self {
        let last = Position::start_of(Arc::clone(&source));
        Self {
            source,
            keywords,
            offset: 0,
            last,
        }
    }

    /// Tokenize the whole source, end marker included.
    ///
    /// # Errors
    ///
    /// Returns the first lexical error.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.is_eof();
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn position(&self, start: usize, end: usize) -> Position {
        Position::new(
            Arc::clone(&self.source),
            TextRange::new(TextSize::of_usize(start), TextSize::of_usize(end)),
        )
    }
}

impl TokenSource for Tokenizer<'_> {
    fn start_position(&self) -> Position {
        Position::start_of(Arc::clone(&self.source))
    }

    fn next_token(&mut self) -> Result<Token, LexerError> {
        let text = self.source.text();
        let rest = text.get(self.offset..).unwrap_or("");
        let mut lexer = RawToken::lexer(rest);

        let Some(raw) = lexer.next() else {
            self.offset = text.len();
            return Ok(Token::eof(self.last.after(1)));
        };

        let span = lexer.span();
        let (start, end) = (self.offset + span.start, self.offset + span.end);
        let slice = lexer.slice();
        self.offset = end;
        let position = self.position(start, end);

        let (kind, value) = match raw {
            Ok(RawToken::Word) if self.keywords.contains(slice) => (TokenKind::Keyword, slice.into()),
            Ok(RawToken::Word) => (TokenKind::Word, slice.into()),
            Ok(RawToken::Integer) => (TokenKind::Integer, slice.into()),
            Ok(RawToken::Float) => (TokenKind::Float, slice.into()),
            Ok(RawToken::String) => (TokenKind::String, unescape(&slice[1..slice.len() - 1])),
            Ok(RawToken::Symbol) => (TokenKind::Symbol, slice.into()),
            Ok(RawToken::UnterminatedString) => {
                return Err(LexerError::new(position, LexerErrorKind::UnterminatedString));
            }
            Err(()) => {
                let c = slice.chars().next().unwrap_or('\0');
                return Err(LexerError::new(position, LexerErrorKind::UnexpectedChar { char: c }));
            }
        };

        tracing::trace!(%kind, value = %value, %position, "token");
        self.last = position.clone();
        Ok(Token::new(kind, value, position))
    }
}

fn unescape(body: &str) -> CompactString {
    let mut value = CompactString::default();
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some('0') => value.push('\0'),
            Some(other) => value.push(other),
            None => value.push('\\'),
        }
    }
    value
}
