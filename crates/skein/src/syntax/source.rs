use crate::syntax::{LineCol, LineIndex, TextSize};
use compact_str::CompactString;
use std::fmt;
use std::path::Path;

/// A named piece of source text.
///
/// Positions hold an `Arc<Source>` so diagnostics can show the offending
/// line long after tokenization.
pub struct Source {
    name: CompactString,
    text: String,
    index: LineIndex,
}

impl Source {
    /// An in-memory source.
    #[must_use]
    pub fn new(name: impl Into<CompactString>, text: impl Into<String>) -> Self {
        let text = text.into();
        let index = LineIndex::new(&text);
        Self {
            name: name.into(),
            text,
            index,
        }
    }

    /// Read a source from disk, named after the file name.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map_or_else(|| path.to_string_lossy(), |name| name.to_string_lossy());
        Ok(Self::new(name.as_ref(), text))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        self.index.line_col(offset)
    }

    /// Text of a zero-based line without its terminator; empty when out of range.
    #[must_use]
    pub fn line(&self, line: u32) -> &str {
        self.index
            .line_bounds(line, &self.text)
            .map_or("", |(start, end)| &self.text[start..end])
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<source {}>", self.name)
    }
}

#[cfg(feature = "diagnostics")]
impl miette::SourceCode for Source {
    fn read_span<'a>(
        &'a self,
        span: &miette::SourceSpan,
        context_lines_before: usize,
        context_lines_after: usize,
    ) -> Result<Box<dyn miette::SpanContents<'a> + 'a>, miette::MietteError> {
        let contents = self
            .text
            .read_span(span, context_lines_before, context_lines_after)?;
        Ok(Box::new(miette::MietteSpanContents::new_named(
            self.name.to_string(),
            contents.data(),
            *contents.span(),
            contents.line(),
            contents.column(),
            contents.line_count(),
        )))
    }
}
