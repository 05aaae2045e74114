//! Per-derivation failures and their grouping into [`ParseException`]s.
//!
//! Failures are recorded for every thread that dies on a token. They only
//! become visible when no thread survives the token, at which point they are
//! grouped by breadcrumb (the trail of named patterns enclosing the failure,
//! innermost first) and rendered as one exception per group.

use crate::error::ParseException;
use crate::lexer::Token;
use ahash::RandomState;
use compact_str::CompactString;
use hashbrown::HashMap;
use std::sync::Arc;

/// Innermost-first trail of named patterns.
pub type Breadcrumb = Arc<[CompactString]>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A token matcher rejected the token; holds its description, e.g.
    /// `Keyword "if"` or `Word`.
    Expected(CompactString),
    /// A predicate rejected the token; holds the full message.
    Predicate(String),
}

/// Why one thread died.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParserFailure {
    pub breadcrumb: Breadcrumb,
    pub kind: FailureKind,
}

impl ParserFailure {
    #[must_use]
    pub fn expected(breadcrumb: Breadcrumb, description: impl Into<CompactString>) -> Self {
        Self {
            breadcrumb,
            kind: FailureKind::Expected(description.into()),
        }
    }

    #[must_use]
    pub fn predicate(breadcrumb: Breadcrumb, message: impl Into<String>) -> Self {
        Self {
            breadcrumb,
            kind: FailureKind::Predicate(message.into()),
        }
    }
}

/// Number of trailing (outermost) breadcrumb elements shared by every trail.
///
/// Elements are only counted while every trail keeps at least one element,
/// so no group loses its innermost name. An empty input, or any empty trail,
/// yields zero.
#[must_use]
pub fn common_suffix_len(breadcrumbs: &[&[CompactString]]) -> usize {
    let Some(shortest) = breadcrumbs.iter().map(|b| b.len()).min() else {
        return 0;
    };
    let first = breadcrumbs[0];
    let mut stripped = 0;
    while stripped + 1 < shortest {
        let candidate = &first[first.len() - 1 - stripped];
        if breadcrumbs
            .iter()
            .all(|b| &b[b.len() - 1 - stripped] == candidate)
        {
            stripped += 1;
        } else {
            break;
        }
    }
    stripped
}

/// Render a breadcrumb outermost first, joined with `.`.
#[must_use]
pub fn render_breadcrumb(breadcrumb: &[CompactString]) -> String {
    breadcrumb
        .iter()
        .rev()
        .map(CompactString::as_str)
        .collect::<Vec<_>>()
        .join(".")
}

#[derive(Default)]
struct Group<'a> {
    expected: Vec<&'a str>,
    predicates: Vec<&'a str>,
}

/// Group the failures recorded at `token` into exceptions.
///
/// Groups, and the descriptions within a group, keep first-seen order;
/// duplicate descriptions are dropped. When more than one group exists each
/// message is annotated with ` (in parse as outer.inner)`.
#[must_use]
pub fn exceptions_from(failures: &[ParserFailure], token: &Token) -> Vec<ParseException> {
    let trails: Vec<&[CompactString]> = failures.iter().map(|f| &*f.breadcrumb).collect();
    let strip = common_suffix_len(&trails);

    let mut index: HashMap<&[CompactString], usize, RandomState> = HashMap::default();
    let mut groups: Vec<(&[CompactString], Group<'_>)> = Vec::new();

    for failure in failures {
        let trail = &failure.breadcrumb[..failure.breadcrumb.len() - strip];
        let slot = *index.entry(trail).or_insert_with(|| {
            groups.push((trail, Group::default()));
            groups.len() - 1
        });
        let group = &mut groups[slot].1;
        match &failure.kind {
            FailureKind::Expected(description) => {
                if !group.expected.contains(&description.as_str()) {
                    group.expected.push(description);
                }
            }
            FailureKind::Predicate(message) => {
                if !group.predicates.contains(&message.as_str()) {
                    group.predicates.push(message);
                }
            }
        }
    }

    let annotate = groups.len() > 1;
    let mut exceptions = Vec::new();
    for (trail, group) in &groups {
        let suffix = if annotate && !trail.is_empty() {
            format!(" (in parse as {})", render_breadcrumb(trail))
        } else {
            String::new()
        };

        match group.expected.as_slice() {
            [] => {}
            [only] => exceptions.push(ParseException::new(
                token.position.clone(),
                format!("Expected {only}, got {token}{suffix}"),
            )),
            many => exceptions.push(ParseException::new(
                token.position.clone(),
                format!("Expected one of {{{}}}, got {token}{suffix}", many.join(", ")),
            )),
        }
        for message in &group.predicates {
            exceptions.push(ParseException::new(
                token.position.clone(),
                format!("{message}{suffix}"),
            ));
        }
    }
    exceptions
}
