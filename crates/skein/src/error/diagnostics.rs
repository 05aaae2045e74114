//! # Diagnostic Utilities
//!
//! User-facing syntax error reports.

use crate::syntax::Position;
use thiserror::Error;

/// A syntax error at one token, ready for display.
///
/// Renders as `<source-name>: <message>` followed by the offending line and
/// a caret line marking the token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {}\n{}", .position.source().name(), .message, .position.line_and_caret())]
pub struct ParseException {
    position: Position,
    message: String,
}

impl ParseException {
    #[must_use]
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Merge exceptions raised at the same token into one whose message
    /// lists each message on its own line.
    ///
    /// Returns `None` for an empty slice.
    #[must_use]
    pub fn combine(exceptions: &[Self]) -> Option<Self> {
        let first = exceptions.first()?;
        if exceptions.len() == 1 {
            return Some(first.clone());
        }
        Some(Self::new(first.position.clone(), Self::combine_messages(exceptions)))
    }

    pub(crate) fn combine_messages(exceptions: &[Self]) -> String {
        exceptions
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(feature = "diagnostics")]
impl miette::Diagnostic for ParseException {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new("parser::syntax"))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(self.position.source().as_ref())
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(miette::LabeledSpan::new_with_span(
            Some(self.message.clone()),
            self.position.range(),
        ))))
    }
}
