//! Line and column position utilities
//!
//! Converts byte offsets into line/column pairs for predicates and for the
//! caret rendering of diagnostics.

use crate::syntax::TextSize;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// A line and column position in source text
///
/// Both fields are zero-based; `Display` renders them one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct LineCol {
    /// Zero-based line number
    pub line: u32,
    /// Zero-based column number (in UTF-8 bytes)
    pub column: u32,
}

impl LineCol {
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The same line, `n` columns further right.
    #[must_use]
    pub const fn shifted(self, n: u32) -> Self {
        Self::new(self.line, self.column.saturating_add(n))
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Line start table for converting byte offsets to line/column positions
///
/// Lookups are a binary search over the cached line starts.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offsets of line starts (including the start of the first line at 0)
    line_starts: Vec<TextSize>,
    /// Total length of the text in bytes
    text_len: TextSize,
}

impl LineIndex {
    /// Build the index by scanning `text` once.
    ///
    /// ```rust
    /// use skein::syntax::{LineIndex, TextSize};
    ///
    /// let index = LineIndex::new("line 1\nline 2\nline 3");
    /// assert_eq!(index.line_col(TextSize::from(10)).line, 1);
    /// ```
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::zero()];

        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    line_starts.push(TextSize::of_usize(i + 1));
                    i += 1;
                }
                b'\r' => {
                    if i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
                        line_starts.push(TextSize::of_usize(i + 2));
                        i += 2;
                    } else {
                        line_starts.push(TextSize::of_usize(i + 1));
                        i += 1;
                    }
                }
                _ => i += 1,
            }
        }

        Self {
            line_starts,
            text_len: TextSize::of_usize(text.len()),
        }
    }

    /// Convert a byte offset to a line/column position.
    ///
    /// Offsets past the end of the text are clamped to the end.
    #[must_use]
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.text_len);

        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };

        let line_start = self.line_starts[line];
        let column = offset.into().saturating_sub(line_start.into());

        LineCol {
            line: u32::try_from(line).unwrap_or(u32::MAX),
            column,
        }
    }

    #[must_use]
    pub fn line_count(&self) -> u32 {
        u32::try_from(self.line_starts.len()).unwrap_or(u32::MAX)
    }

    /// Byte offset of the start of `line`, or `None` when out of bounds.
    #[must_use]
    pub fn line_start(&self, line: u32) -> Option<TextSize> {
        self.line_starts.get(line as usize).copied()
    }

    /// Byte offsets `(start, end)` of `line` without its line terminator.
    #[must_use]
    pub fn line_bounds(&self, line: u32, text: &str) -> Option<(usize, usize)> {
        let start = usize::from(self.line_start(line)?);
        let mut end = self
            .line_start(line + 1)
            .map_or(text.len(), usize::from)
            .min(text.len());
        let bytes = text.as_bytes();
        while end > start && matches!(bytes[end - 1], b'\n' | b'\r') {
            end -= 1;
        }
        Some((start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_unix_line_endings() {
        let text = "line 1\nline 2\nline 3";
        let index = LineIndex::new(text);

        assert_eq!(index.line_col(TextSize::from(0)), LineCol::new(0, 0));
        assert_eq!(index.line_col(TextSize::from(6)), LineCol::new(0, 6));
        assert_eq!(index.line_col(TextSize::from(7)), LineCol::new(1, 0));
        assert_eq!(index.line_col(TextSize::from(14)), LineCol::new(2, 0));
    }

    #[test]
    fn test_line_col_windows_line_endings() {
        let text = "line 1\r\nline 2\r\nline 3";
        let index = LineIndex::new(text);

        assert_eq!(index.line_col(TextSize::from(8)), LineCol::new(1, 0));
        assert_eq!(index.line_col(TextSize::from(14)), LineCol::new(1, 6));
    }

    #[test]
    fn test_line_col_clamps_past_end() {
        let index = LineIndex::new("abc");
        assert_eq!(index.line_col(TextSize::from(99)), LineCol::new(0, 3));
    }

    #[test]
    fn test_line_bounds_strip_terminators() {
        let text = "first\r\nsecond\nthird";
        let index = LineIndex::new(text);

        let (start, end) = index.line_bounds(0, text).unwrap();
        assert_eq!(&text[start..end], "first");
        let (start, end) = index.line_bounds(1, text).unwrap();
        assert_eq!(&text[start..end], "second");
        let (start, end) = index.line_bounds(2, text).unwrap();
        assert_eq!(&text[start..end], "third");
        assert!(index.line_bounds(3, text).is_none());
    }

    #[test]
    fn test_line_col_display_is_one_based() {
        assert_eq!(LineCol::new(0, 4).to_string(), "1:5");
    }
}
