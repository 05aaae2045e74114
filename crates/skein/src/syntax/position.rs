use crate::syntax::{LineCol, Source, TextRange, TextSize};
use std::fmt;
use std::sync::Arc;

/// A span of source text with both byte and line/column coordinates.
///
/// Positions are cheap to clone: the source is shared.
#[derive(Clone)]
pub struct Position {
    source: Arc<Source>,
    range: TextRange,
    start: LineCol,
    end: LineCol,
}

impl Position {
    /// Span `range` of `source`, deriving line/column coordinates.
    #[must_use]
    pub fn new(source: Arc<Source>, range: TextRange) -> Self {
        let start = source.line_col(range.start());
        let end = source.line_col(range.end());
        Self {
            source,
            range,
            start,
            end,
        }
    }

    /// Zero-width position at the very beginning of `source`.
    #[must_use]
    pub fn start_of(source: Arc<Source>) -> Self {
        Self::new(source, TextRange::empty(TextSize::zero()))
    }

    #[must_use]
    pub fn source(&self) -> &Arc<Source> {
        &self.source
    }

    #[must_use]
    pub const fn range(&self) -> TextRange {
        self.range
    }

    #[must_use]
    pub const fn start(&self) -> LineCol {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> LineCol {
        self.end
    }

    /// Span from the start of `self` to the end of `other`.
    #[must_use]
    pub fn to(&self, other: &Self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            range: self.range.cover(other.range),
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Zero-width position where `self` ends.
    #[must_use]
    pub fn end_point(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            range: TextRange::empty(self.range.end()),
            start: self.end,
            end: self.end,
        }
    }

    /// A `width`-column position starting where `self` ends.
    ///
    /// Used for the synthetic end-of-input token, which may lie past the
    /// last byte of the source.
    #[must_use]
    pub fn after(&self, width: u32) -> Self {
        Self {
            source: Arc::clone(&self.source),
            range: TextRange::at(self.range.end(), TextSize::from(width)),
            start: self.end,
            end: self.end.shifted(width),
        }
    }

    /// Whether `self` starts exactly where `previous` ends.
    #[must_use]
    pub fn is_adjacent_to(&self, previous: &Self) -> bool {
        self.start == previous.end
    }

    /// The line containing the start of this position, with a caret line
    /// underneath marking the span.
    #[must_use]
    pub fn line_and_caret(&self) -> String {
        let line = self.source.line(self.start.line);
        let column = (self.start.column as usize).min(line.len());
        let prefix = line.get(..column).unwrap_or(line);

        let mut caret: String = prefix
            .chars()
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();

        let width = if self.end.line == self.start.line {
            let end = (self.end.column as usize).clamp(column, line.len());
            line.get(column..end).map_or(0, |s| s.chars().count())
        } else {
            line.len().saturating_sub(column)
        };
        caret.push_str(&"^".repeat(width.max(1)));

        format!("{line}\n{caret}")
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.range == other.range
            && self.start == other.start
            && self.end == other.end
            && (Arc::ptr_eq(&self.source, &other.source)
                || (self.source.name() == other.source.name()
                    && self.source.text() == other.source.text()))
    }
}

impl Eq for Position {}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}",
            self.source.name(),
            self.start,
            self.end
        )
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source.name(), self.start)
    }
}
