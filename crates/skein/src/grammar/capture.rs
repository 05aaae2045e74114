//! Result values produced by a parse.
//!
//! Every capture carries the span of source it was built from. Sequence
//! patterns turn the captures of their parts into a single capture with a
//! [`CaptureFn`]; callers plug their own node types in through
//! [`ObjectCapture`].
//!
//! # Example
//!
//! ```rust
//! use skein::grammar::{Capture, ObjectCapture};
//! use skein::syntax::Position;
//! use std::any::Any;
//!
//! #[derive(Debug, PartialEq)]
//! struct Name {
//!     position: Position,
//!     text: String,
//! }
//!
//! impl ObjectCapture for Name {
//!     fn position(&self) -> &Position {
//!         &self.position
//!     }
//!
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//!
//!     fn structurally_eq(&self, other: &dyn ObjectCapture) -> bool {
//!         other.as_any().downcast_ref::<Self>() == Some(self)
//!     }
//! }
//!
//! fn name_text(capture: &Capture) -> Option<&str> {
//!     capture.downcast_ref::<Name>().map(|n| n.text.as_str())
//! }
//! ```

use crate::lexer::Token;
use crate::syntax::Position;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Builds one capture from the captures of a sequence's parts.
///
/// The slice always has one entry per part, in order.
pub type CaptureFn = Arc<dyn Fn(&[Capture]) -> Capture + Send + Sync>;

/// Caller-defined capture node.
pub trait ObjectCapture: Any + fmt::Debug + Send + Sync {
    /// Span covered by this node.
    fn position(&self) -> &Position;

    fn as_any(&self) -> &dyn Any;

    /// Structural equality with another node, usually via
    /// [`as_any`](Self::as_any) downcasting.
    fn structurally_eq(&self, other: &dyn ObjectCapture) -> bool;
}

/// A typed result value with a source span.
#[derive(Debug, Clone)]
pub enum Capture {
    Token(Token),
    /// Marks an elided optional part; zero-width.
    Empty(Position),
    List(ListCapture),
    Object(Arc<dyn ObjectCapture>),
}

impl Capture {
    #[must_use]
    pub fn object(node: impl ObjectCapture) -> Self {
        Self::Object(Arc::new(node))
    }

    #[must_use]
    pub fn position(&self) -> &Position {
        match self {
            Self::Token(token) => &token.position,
            Self::Empty(position) => position,
            Self::List(list) => list.position(),
            Self::Object(node) => node.position(),
        }
    }

    #[must_use]
    pub const fn as_token(&self) -> Option<&Token> {
        match self {
            Self::Token(token) => Some(token),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_list(&self) -> Option<&ListCapture> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_empty_marker(&self) -> bool {
        matches!(self, Self::Empty(_))
    }

    #[must_use]
    pub fn downcast_ref<T: ObjectCapture>(&self) -> Option<&T> {
        match self {
            Self::Object(node) => node.as_any().downcast_ref(),
            _ => None,
        }
    }
}

impl PartialEq for Capture {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Token(a), Self::Token(b)) => a == b,
            (Self::Empty(a), Self::Empty(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.structurally_eq(b.as_ref()),
            _ => false,
        }
    }
}

impl fmt::Display for Capture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(token) => write!(f, "<token-capture {token}>"),
            Self::Empty(_) => f.write_str("<empty-capture>"),
            Self::List(list) => write!(f, "{list}"),
            Self::Object(node) => write!(f, "{node:?}"),
        }
    }
}

impl From<Token> for Capture {
    fn from(token: Token) -> Self {
        Self::Token(token)
    }
}

impl From<ListCapture> for Capture {
    fn from(list: ListCapture) -> Self {
        Self::List(list)
    }
}

/// An ordered sequence of captures.
///
/// Prepending to a list shares the existing list instead of copying it, so a
/// list built one item at a time from the back stays linear in its length.
/// The items are flattened into one slice the first time they are read.
#[derive(Clone)]
pub struct ListCapture {
    position: Position,
    chunk: Arc<Chunk>,
}

/// Items of a list: `items` followed by everything in `rest`.
struct Chunk {
    items: Arc<[Capture]>,
    rest: Option<Arc<Chunk>>,
    len: usize,
    flat: OnceLock<Arc<[Capture]>>,
}

impl Chunk {
    fn new(items: Arc<[Capture]>, rest: Option<Arc<Self>>) -> Self {
        let len = items.len() + rest.as_ref().map_or(0, |r| r.len);
        Self {
            items,
            rest,
            len,
            flat: OnceLock::new(),
        }
    }

    fn as_slice(&self) -> &[Capture] {
        if self.rest.is_none() {
            return &self.items;
        }
        self.flat.get_or_init(|| {
            let mut all = Vec::with_capacity(self.len);
            all.extend(self.items.iter().cloned());
            let mut cursor = self.rest.as_deref();
            while let Some(chunk) = cursor {
                if let Some(flat) = chunk.flat.get() {
                    all.extend(flat.iter().cloned());
                    break;
                }
                all.extend(chunk.items.iter().cloned());
                cursor = chunk.rest.as_deref();
            }
            all.into()
        })
    }
}

// Unlink long chains one chunk at a time instead of recursing.
impl Drop for Chunk {
    fn drop(&mut self) {
        let mut next = self.rest.take();
        while let Some(chunk) = next {
            next = match Arc::try_unwrap(chunk) {
                Ok(mut owned) => owned.rest.take(),
                Err(_) => None,
            };
        }
    }
}

impl ListCapture {
    /// List over `items`, spanning first to last.
    ///
    /// Returns `None` when `items` is empty; use [`ListCapture::empty`] for
    /// an empty list, which needs an explicit anchor.
    #[must_use]
    pub fn from_items(items: impl Into<Arc<[Capture]>>) -> Option<Self> {
        let items = items.into();
        let position = match (items.first(), items.last()) {
            (Some(first), Some(last)) => first.position().to(last.position()),
            _ => return None,
        };
        Some(Self {
            position,
            chunk: Arc::new(Chunk::new(items, None)),
        })
    }

    /// Empty list anchored at the zero-width point where `at` starts.
    #[must_use]
    pub fn empty(at: &Position) -> Self {
        let position = Position::new(
            Arc::clone(at.source()),
            crate::syntax::TextRange::empty(at.range().start()),
        );
        Self {
            position,
            chunk: Arc::new(Chunk::new(Arc::from([]), None)),
        }
    }

    /// `head` followed by the items of `tail`.
    #[must_use]
    pub fn prepend(head: Capture, tail: &Self) -> Self {
        let position = if tail.is_empty() {
            head.position().clone()
        } else {
            head.position().to(tail.position())
        };
        let rest = (!tail.is_empty()).then(|| Arc::clone(&tail.chunk));
        Self {
            position,
            chunk: Arc::new(Chunk::new(Arc::from([head]), rest)),
        }
    }

    #[must_use]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chunk.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunk.len == 0
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Capture> {
        self.as_slice().get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Capture> {
        self.as_slice().iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Capture] {
        self.chunk.as_slice()
    }
}

impl PartialEq for ListCapture {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position && self.as_slice() == other.as_slice()
    }
}

impl fmt::Debug for ListCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListCapture")
            .field("position", &self.position)
            .field("items", &self.as_slice())
            .finish()
    }
}

impl<'a> IntoIterator for &'a ListCapture {
    type Item = &'a Capture;
    type IntoIter = std::slice::Iter<'a, Capture>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for ListCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<list-capture")?;
        for (i, item) in self.iter().enumerate() {
            f.write_str(if i == 0 { " " } else { ", " })?;
            write!(f, "{item}")?;
        }
        f.write_str(">")
    }
}

/// Capture function returning the part at `index`.
///
/// Falls back to an empty marker at the first part when `index` is out of
/// range.
#[must_use]
pub fn nth(index: usize) -> CaptureFn {
    Arc::new(move |captures: &[Capture]| match captures.get(index) {
        Some(capture) => capture.clone(),
        None => {
            tracing::debug!(index, parts = captures.len(), "capture index out of range");
            fallback(captures)
        }
    })
}

/// Capture function collecting every part into a list.
#[must_use]
pub fn list_of() -> CaptureFn {
    Arc::new(|captures: &[Capture]| {
        ListCapture::from_items(captures.to_vec())
            .map_or_else(|| fallback(captures), Capture::List)
    })
}

/// Capture function prepending part `head` to the items of list part `tail`.
pub(crate) fn cons(head: usize, tail: usize) -> CaptureFn {
    Arc::new(move |captures: &[Capture]| match (captures.get(head), captures.get(tail)) {
        (Some(first), Some(Capture::List(rest))) => {
            Capture::List(ListCapture::prepend(first.clone(), rest))
        }
        (Some(first), _) => ListCapture::from_items([first.clone()])
            .map_or_else(|| fallback(captures), Capture::List),
        _ => fallback(captures),
    })
}

/// Capture function producing an empty list anchored at the first part.
pub(crate) fn empty_list() -> CaptureFn {
    Arc::new(|captures: &[Capture]| match captures.first() {
        Some(first) => Capture::List(ListCapture::empty(first.position())),
        None => fallback(captures),
    })
}

fn fallback(captures: &[Capture]) -> Capture {
    captures
        .first()
        .map_or_else(detached_marker, |c| Capture::Empty(c.position().end_point()))
}

// The engine never calls a capture function with no parts.
fn detached_marker() -> Capture {
    Capture::Empty(Position::start_of(Arc::new(crate::syntax::Source::new("", ""))))
}
