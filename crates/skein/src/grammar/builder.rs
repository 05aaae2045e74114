use crate::error::GrammarError;
use crate::grammar::{
    Capture, CaptureFn, Pattern, PatternKind, Predicate, SequencePattern, TokenSpec, no_space, nth,
};
use crate::lexer::{KeywordSet, Token, TokenKind};
use ahash::RandomState;
use compact_str::CompactString;
use hashbrown::HashMap;
use lasso::{Rodeo, RodeoReader, Spur};
use std::cell::RefCell;
use std::sync::Arc;

/// A finished, validated set of named patterns.
///
/// Every reference inside the grammar names a defined pattern. A grammar is
/// read-only and can be shared between threads.
///
/// # Example
///
/// ```rust
/// use skein::grammar::{PatternBuilder, list_of};
/// use skein::lexer::TokenKind;
///
/// let b = PatternBuilder::new();
/// let word = b.token(TokenKind::Word);
/// b.named_sequence("decl", list_of(), [word.clone(), word, b.symbol(";")]);
/// b.set_main("decl");
///
/// let grammar = b.build().expect("valid grammar");
/// assert!(grammar.main().is_some());
/// ```
#[derive(Debug)]
pub struct Grammar {
    rules: HashMap<Spur, Pattern, RandomState>,
    interner: RodeoReader,
    keywords: KeywordSet,
    main: Option<Spur>,
}

impl Grammar {
    /// Pattern registered under an interned name.
    #[must_use]
    pub fn rule(&self, key: Spur) -> Option<&Pattern> {
        self.rules.get(&key)
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Pattern> {
        self.interner.get(name).and_then(|key| self.rule(key))
    }

    #[must_use]
    pub fn name_of(&self, key: Spur) -> &str {
        self.interner.resolve(&key)
    }

    /// The entry pattern: the one named by
    /// [`PatternBuilder::set_main`], or else the one defined as `main`.
    #[must_use]
    pub fn main(&self) -> Option<&Pattern> {
        self.main.and_then(|key| self.rule(key))
    }

    /// Words the tokenizer must classify as keywords.
    #[must_use]
    pub const fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.rules.keys().map(|key| self.interner.resolve(key))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[derive(Default)]
struct Registry {
    interner: Rodeo,
    rules: HashMap<Spur, Pattern, RandomState>,
    referenced: Vec<Spur>,
    keywords: KeywordSet,
    main: Option<Spur>,
    defects: Vec<GrammarError>,
}

/// Builder for patterns and the registry of named patterns.
///
/// Methods take `&self`, so patterns can be built by nesting calls. Defects
/// such as an undefined reference are recorded and reported by
/// [`build`](Self::build) rather than panicking.
///
/// # Example
///
/// ```rust
/// use skein::grammar::{PatternBuilder, nth};
/// use skein::lexer::TokenKind;
///
/// let b = PatternBuilder::new();
/// // expr := Integer | "(" expr ")"
/// b.define(
///     "expr",
///     b.one_of([
///         b.token(TokenKind::Integer),
///         b.sequence(nth(1), [b.symbol("("), b.reference("expr"), b.symbol(")")]),
///     ]),
/// );
/// b.set_main("expr");
/// assert!(b.build().is_ok());
/// ```
#[derive(Default)]
pub struct PatternBuilder {
    registry: RefCell<Registry>,
}

impl PatternBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Any token of category `kind`.
    #[must_use]
    pub fn token(&self, kind: TokenKind) -> Pattern {
        Pattern::new(PatternKind::Token(TokenSpec::new(kind, None)))
    }

    /// A token of category `kind` with exactly `value`.
    #[must_use]
    pub fn token_value(&self, kind: TokenKind, value: &str) -> Pattern {
        Pattern::new(PatternKind::Token(TokenSpec::new(kind, Some(value))))
    }

    /// The keyword `word`, which is also added to the keyword set.
    pub fn keyword(&self, word: &str) -> Pattern {
        self.registry.borrow_mut().keywords.insert(word.into());
        self.token_value(TokenKind::Keyword, word)
    }

    #[must_use]
    pub fn symbol(&self, value: &str) -> Pattern {
        self.token_value(TokenKind::Symbol, value)
    }

    /// A multi-character operator, matched as adjacent single-character
    /// symbols and captured as one `Symbol` token holding the full text.
    pub fn operator(&self, text: &str) -> Pattern {
        let mut chars = text.char_indices().map(|(i, c)| &text[i..i + c.len_utf8()]);
        let Some(first) = chars.next() else {
            self.defect(GrammarError::EmptySequence { name: None });
            return self.nothing();
        };
        let rest: Vec<&str> = chars.collect();
        if rest.is_empty() {
            return self.symbol(first);
        }

        let mut parts = vec![self.symbol(first)];
        parts.extend(rest.into_iter().map(|c| self.symbol(c).with_predicate(no_space())));

        let text = CompactString::from(text);
        let build: CaptureFn = Arc::new(move |captures: &[Capture]| {
            let (Some(first), Some(last)) = (captures.first(), captures.last()) else {
                return nth(0)(captures);
            };
            Capture::Token(Token::new(
                TokenKind::Symbol,
                text.clone(),
                first.position().to(last.position()),
            ))
        });
        self.sequence(build, parts)
    }

    /// Matches without consuming input.
    #[must_use]
    pub fn nothing(&self) -> Pattern {
        Pattern::new(PatternKind::Nothing)
    }

    /// `inner` or nothing; the absent case captures an empty marker.
    #[must_use]
    pub fn optional(&self, inner: Pattern) -> Pattern {
        Pattern::new(PatternKind::Optional { inner, absent: None })
    }

    /// `inner` or nothing; the absent case is captured by `absent`, which
    /// receives the empty marker as its only part.
    #[must_use]
    pub fn optional_or(&self, inner: Pattern, absent: CaptureFn) -> Pattern {
        Pattern::new(PatternKind::Optional {
            inner,
            absent: Some(absent),
        })
    }

    /// Zero or more `item`s, captured as a list.
    #[must_use]
    pub fn list(&self, item: Pattern) -> Pattern {
        Pattern::new(PatternKind::List {
            item,
            separator: None,
        })
    }

    /// One or more `item`s separated by `separator`; separators are not
    /// captured. Wrap in [`optional`](Self::optional) to accept none.
    #[must_use]
    pub fn delim(&self, item: Pattern, separator: Pattern) -> Pattern {
        Pattern::new(PatternKind::List {
            item,
            separator: Some(separator),
        })
    }

    /// An anonymous sequence.
    pub fn sequence(&self, build: CaptureFn, parts: impl IntoIterator<Item = Pattern>) -> Pattern {
        self.make_sequence(None, build, parts.into_iter().collect())
    }

    /// A sequence named `name`, defined under that name.
    pub fn named_sequence(
        &self,
        name: &str,
        build: CaptureFn,
        parts: impl IntoIterator<Item = Pattern>,
    ) -> Pattern {
        let sequence = self.make_sequence(Some(name.into()), build, parts.into_iter().collect());
        self.define_inline(name, sequence)
    }

    fn make_sequence(
        &self,
        name: Option<CompactString>,
        build: CaptureFn,
        parts: Vec<Pattern>,
    ) -> Pattern {
        if parts.is_empty() {
            self.defect(GrammarError::EmptySequence { name });
            return self.nothing();
        }
        Pattern::new(PatternKind::Sequence(Arc::new(SequencePattern {
            name,
            parts,
            build,
        })))
    }

    /// Ordered alternatives.
    pub fn one_of(&self, options: impl IntoIterator<Item = Pattern>) -> Pattern {
        let options: Arc<[Pattern]> = options.into_iter().collect();
        if options.is_empty() {
            self.defect(GrammarError::EmptyChoice);
            return self.nothing();
        }
        Pattern::new(PatternKind::Branch(options))
    }

    /// Reference to the pattern defined as `name`, possibly later.
    pub fn reference(&self, name: &str) -> Pattern {
        let mut registry = self.registry.borrow_mut();
        let key = registry.interner.get_or_intern(name);
        registry.referenced.push(key);
        Pattern::new(PatternKind::Ref(key))
    }

    /// Matches nothing, subject to `predicate`.
    #[must_use]
    pub fn predicate(&self, predicate: Predicate) -> Pattern {
        self.nothing().with_predicate(predicate)
    }

    /// The end of input.
    #[must_use]
    pub fn eof(&self) -> Pattern {
        self.token(TokenKind::Eof)
    }

    /// Register `pattern` as `name` so that it shows up in failure
    /// breadcrumbs.
    ///
    /// An anonymous sequence takes the name; any other pattern is wrapped in
    /// a named one-part sequence that captures its only part.
    pub fn define(&self, name: &str, pattern: Pattern) -> Pattern {
        let named = match pattern.kind() {
            PatternKind::Sequence(sequence) if sequence.name.is_some() => None,
            PatternKind::Sequence(sequence) => {
                Some(pattern.with_kind(PatternKind::Sequence(Arc::new(SequencePattern {
                    name: Some(name.into()),
                    parts: sequence.parts.clone(),
                    build: Arc::clone(&sequence.build),
                }))))
            }
            _ => Some(Pattern::new(PatternKind::Sequence(Arc::new(SequencePattern {
                name: Some(name.into()),
                parts: vec![pattern.clone()],
                build: nth(0),
            })))),
        };
        self.define_inline(name, named.unwrap_or(pattern))
    }

    /// Register `pattern` as `name` unchanged.
    pub fn define_inline(&self, name: &str, pattern: Pattern) -> Pattern {
        let mut registry = self.registry.borrow_mut();
        let key = registry.interner.get_or_intern(name);
        if registry.rules.contains_key(&key) {
            registry
                .defects
                .push(GrammarError::Redefinition { name: name.into() });
        } else {
            registry.rules.insert(key, pattern.clone());
        }
        pattern
    }

    /// Use the pattern named `name` as the entry point.
    pub fn set_main(&self, name: &str) {
        let mut registry = self.registry.borrow_mut();
        let key = registry.interner.get_or_intern(name);
        registry.main = Some(key);
    }

    /// The entry pattern, if it is defined yet.
    #[must_use]
    pub fn get_main(&self) -> Option<Pattern> {
        let registry = self.registry.borrow();
        let key = registry.main.or_else(|| registry.interner.get("main"))?;
        registry.rules.get(&key).cloned()
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Pattern> {
        let registry = self.registry.borrow();
        let key = registry.interner.get(name)?;
        registry.rules.get(&key).cloned()
    }

    #[must_use]
    pub fn keywords(&self) -> KeywordSet {
        self.registry.borrow().keywords.clone()
    }

    fn defect(&self, error: GrammarError) {
        self.registry.borrow_mut().defects.push(error);
    }

    /// Validate and freeze the registry.
    ///
    /// # Errors
    ///
    /// Returns the first recorded defect, or [`GrammarError::UndefinedRule`]
    /// / [`GrammarError::UnknownMain`] for dangling names.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        let Registry {
            interner,
            rules,
            referenced,
            keywords,
            main,
            defects,
        } = self.registry.into_inner();

        if let Some(defect) = defects.into_iter().next() {
            return Err(defect);
        }
        if let Some(missing) = referenced.iter().find(|key| !rules.contains_key(*key)) {
            return Err(GrammarError::UndefinedRule {
                name: interner.resolve(missing).into(),
            });
        }
        let main = match main {
            Some(key) if !rules.contains_key(&key) => {
                return Err(GrammarError::UnknownMain {
                    name: interner.resolve(&key).into(),
                });
            }
            Some(key) => Some(key),
            None => interner.get("main").filter(|key| rules.contains_key(key)),
        };

        tracing::debug!(rules = rules.len(), keywords = keywords.len(), "grammar built");
        Ok(Grammar {
            rules,
            interner: interner.into_reader(),
            keywords,
            main,
        })
    }
}
