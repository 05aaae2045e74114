//! Execution nodes instantiated from patterns.
//!
//! A [`Matcher`] mirrors the [`Pattern`] it came from, except that optional
//! and list patterns are lowered to branches and sequences, and every named
//! reference becomes a [`Generator`] that is resolved only when a thread
//! reaches it. Lowering therefore terminates even for recursive grammars.

use crate::error::ParseError;
use crate::grammar::{
    CaptureFn, Grammar, Pattern, PatternKind, Predicate, TokenSpec, cons, empty_list,
};
use ahash::RandomState;
use compact_str::CompactString;
use hashbrown::HashMap;
use lasso::Spur;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// A sequence under execution: its parts and how to combine their captures.
pub struct SequenceMatcher {
    pub name: Option<CompactString>,
    pub parts: Arc<[Matcher]>,
    pub build: CaptureFn,
}

impl fmt::Debug for SequenceMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceMatcher")
            .field("name", &self.name)
            .field("parts", &self.parts.len())
            .finish_non_exhaustive()
    }
}

/// Repetition state shared by the lowered forms of a list.
#[derive(Debug)]
pub struct ListMatcher {
    item: Matcher,
    separator: Option<Matcher>,
}

/// Deferred matcher, produced on first visit.
#[derive(Debug, Clone)]
pub enum Generator {
    /// A named pattern of the grammar
    Rule(Spur),
    /// Zero or more items, or the first item of a delimited list
    List(Arc<ListMatcher>),
    /// The separator-item pairs following the first item of a delimited list
    DelimTail(Arc<ListMatcher>),
}

#[derive(Debug, Clone)]
pub enum MatcherKind {
    Token(Arc<TokenSpec>),
    Nothing,
    Sequence(Arc<SequenceMatcher>),
    Branch(Arc<[Matcher]>),
    Generator(Generator),
}

#[derive(Debug, Clone)]
pub struct Matcher {
    pub kind: MatcherKind,
    pub predicates: SmallVec<[Predicate; 1]>,
}

impl Matcher {
    #[must_use]
    pub fn new(kind: MatcherKind) -> Self {
        Self {
            kind,
            predicates: SmallVec::new(),
        }
    }

    fn sequence(parts: Vec<Self>, build: CaptureFn) -> Self {
        Self::new(MatcherKind::Sequence(Arc::new(SequenceMatcher {
            name: None,
            parts: parts.into(),
            build,
        })))
    }

    fn branch(options: Vec<Self>) -> Self {
        Self::new(MatcherKind::Branch(options.into()))
    }

    /// Lower `pattern` into a matcher.
    #[must_use]
    pub fn instantiate(pattern: &Pattern) -> Self {
        let kind = match pattern.kind() {
            PatternKind::Token(spec) => MatcherKind::Token(Arc::new(spec.clone())),
            PatternKind::Nothing => MatcherKind::Nothing,
            PatternKind::Sequence(sequence) => MatcherKind::Sequence(Arc::new(SequenceMatcher {
                name: sequence.name.clone(),
                parts: sequence.parts.iter().map(Self::instantiate).collect(),
                build: Arc::clone(&sequence.build),
            })),
            PatternKind::Branch(options) => {
                MatcherKind::Branch(options.iter().map(Self::instantiate).collect())
            }
            PatternKind::Ref(key) => MatcherKind::Generator(Generator::Rule(*key)),
            PatternKind::Optional { inner, absent } => {
                let absent = match absent {
                    Some(build) => Self::sequence(
                        vec![Self::new(MatcherKind::Nothing)],
                        Arc::clone(build),
                    ),
                    None => Self::new(MatcherKind::Nothing),
                };
                MatcherKind::Branch(vec![Self::instantiate(inner), absent].into())
            }
            PatternKind::List { item, separator } => {
                MatcherKind::Generator(Generator::List(Arc::new(ListMatcher {
                    item: Self::instantiate(item),
                    separator: separator.as_ref().map(Self::instantiate),
                })))
            }
        };
        Self {
            kind,
            predicates: pattern.predicates().iter().cloned().collect(),
        }
    }
}

/// Lowered `item tail | <empty list>`, the right-recursive list encoding.
fn lower_list(list: &Arc<ListMatcher>) -> Matcher {
    let tail = Matcher::new(MatcherKind::Generator(Generator::List(Arc::clone(list))));
    Matcher::branch(vec![
        Matcher::sequence(vec![list.item.clone(), tail], cons(0, 1)),
        empty(),
    ])
}

/// Lowered `item (separator item)*`.
fn lower_delim(list: &Arc<ListMatcher>) -> Matcher {
    let tail = Matcher::new(MatcherKind::Generator(Generator::DelimTail(Arc::clone(list))));
    Matcher::sequence(vec![list.item.clone(), tail], cons(0, 1))
}

/// Lowered `separator item tail | <empty list>`.
fn lower_delim_tail(list: &Arc<ListMatcher>, separator: &Matcher) -> Matcher {
    let tail = Matcher::new(MatcherKind::Generator(Generator::DelimTail(Arc::clone(list))));
    Matcher::branch(vec![
        Matcher::sequence(vec![separator.clone(), list.item.clone(), tail], cons(1, 2)),
        empty(),
    ])
}

fn empty() -> Matcher {
    Matcher::sequence(vec![Matcher::new(MatcherKind::Nothing)], empty_list())
}

/// Resolves generators against a grammar, instantiating each named pattern
/// once per parse.
#[derive(Debug)]
pub struct MatcherCache<'g> {
    grammar: &'g Grammar,
    rules: HashMap<Spur, Matcher, RandomState>,
}

impl<'g> MatcherCache<'g> {
    #[must_use]
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            rules: HashMap::default(),
        }
    }

    #[must_use]
    pub const fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// The matcher `generator` stands for.
    ///
    /// # Errors
    ///
    /// [`ParseError::UnknownPattern`] when a rule is missing from the grammar.
    pub fn resolve(&mut self, generator: &Generator) -> Result<Matcher, ParseError> {
        match generator {
            Generator::Rule(key) => {
                if let Some(matcher) = self.rules.get(key) {
                    return Ok(matcher.clone());
                }
                let pattern = self.grammar.rule(*key).ok_or_else(|| {
                    ParseError::UnknownPattern(self.grammar.name_of(*key).into())
                })?;
                let matcher = Matcher::instantiate(pattern);
                self.rules.insert(*key, matcher.clone());
                Ok(matcher)
            }
            Generator::List(list) if list.separator.is_none() => Ok(lower_list(list)),
            Generator::List(list) => Ok(lower_delim(list)),
            Generator::DelimTail(list) => Ok(match &list.separator {
                Some(separator) => lower_delim_tail(list, separator),
                None => empty(),
            }),
        }
    }
}
