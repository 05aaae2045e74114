use crate::error::LexerError;
use crate::lexer::Token;
use crate::syntax::Position;
use std::collections::VecDeque;

/// Producer of tokens for the parser.
///
/// A source yields tokens in order and then exactly one [`TokenKind::Eof`]
/// token; calls after the end marker keep returning it.
///
/// [`TokenKind::Eof`]: crate::lexer::TokenKind::Eof
pub trait TokenSource {
    /// Zero-width position where the input begins.
    fn start_position(&self) -> Position;

    /// The next token.
    ///
    /// # Errors
    ///
    /// Returns a [`LexerError`] for malformed input; the parse is aborted.
    fn next_token(&mut self) -> Result<Token, LexerError>;
}

/// A token source over pre-built tokens.
#[derive(Debug, Clone)]
pub struct TokenBuffer {
    tokens: VecDeque<Token>,
    start: Position,
    last: Position,
}

impl TokenBuffer {
    /// Buffer `tokens`; any `Eof` tokens among them are dropped and a single
    /// end marker is produced after the last real token.
    #[must_use]
    pub fn new(start: Position, tokens: impl IntoIterator<Item = Token>) -> Self {
        let tokens: VecDeque<Token> = tokens.into_iter().filter(|t| !t.is_eof()).collect();
        let last = tokens
            .back()
            .map_or_else(|| start.clone(), |t| t.position.clone());
        Self {
            tokens,
            start,
            last,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenSource for TokenBuffer {
    fn start_position(&self) -> Position {
        self.start.clone()
    }

    fn next_token(&mut self) -> Result<Token, LexerError> {
        Ok(self
            .tokens
            .pop_front()
            .unwrap_or_else(|| Token::eof(self.last.after(1))))
    }
}
