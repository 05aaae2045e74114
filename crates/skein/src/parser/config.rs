/// Tuning knobs and resource guards for the [`Parser`](crate::parser::Parser).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum number of live threads after any token
    pub max_threads: usize,
    /// Maximum number of resolve steps spent on a single token; guards
    /// against left-recursive patterns and repetitions of empty matches
    pub max_expansions: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_threads: 4096,
            max_expansions: 1_000_000,
        }
    }
}

impl ParserConfig {
    #[must_use]
    pub const fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = max_threads;
        self
    }

    #[must_use]
    pub const fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }
}
