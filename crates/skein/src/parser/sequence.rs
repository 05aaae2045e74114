//! Persistent progress records through sequence matchers.
//!
//! Nodes live in an append-only arena and are never modified after they are
//! created. Adding a capture to a sequence allocates a new node that points
//! back at the node it extends, so sibling threads created by a branch share
//! every ancestor node and branching only copies a [`SeqId`].
//!
//! A finished sequence is not built right away. It is recorded as a
//! deferred slot in the nearest enclosing sequence that still has parts left,
//! and built the first time that slot is read or forced. Threads that die
//! before then never pay for it.
//!
//! Nodes only point at nodes created before them. [`SequenceArena::compact`]
//! relies on this to drop the nodes no live thread can reach.

use crate::error::failure::Breadcrumb;
use crate::grammar::Capture;
use crate::parser::{Matcher, SequenceMatcher};
use compact_str::CompactString;
use std::sync::{Arc, OnceLock};

/// Handle to a node in a [`SequenceArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeqId(usize);

#[derive(Debug)]
enum Slot {
    Built(Capture),
    /// The capture of the finished sequence `inner` and of every sequence
    /// it finishes on the way up to the node this slot extends
    Finished {
        inner: SeqId,
        built: OnceLock<Capture>,
    },
}

#[derive(Debug)]
struct SeqNode {
    /// Enclosing sequence, as it was when this one was entered
    parent: Option<SeqId>,
    matcher: Arc<SequenceMatcher>,
    /// Newest capture; `None` for a freshly entered sequence
    capture: Option<Slot>,
    previous: Option<SeqId>,
    /// Number of parts captured so far
    len: usize,
    /// Nearest enclosing sequence with parts left once this one finishes
    resume: Option<SeqId>,
}

#[derive(Debug, Default)]
pub struct SequenceArena {
    nodes: Vec<SeqNode>,
    allocated: usize,
}

impl SequenceArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&self, id: SeqId) -> &SeqNode {
        &self.nodes[id.0]
    }

    fn push(&mut self, node: SeqNode) -> SeqId {
        self.allocated += 1;
        self.nodes.push(node);
        SeqId(self.nodes.len() - 1)
    }

    /// Start matching `matcher` inside `parent`.
    pub fn enter(&mut self, parent: Option<SeqId>, matcher: Arc<SequenceMatcher>) -> SeqId {
        let resume = parent.and_then(|p| {
            let node = self.node(p);
            if node.len + 1 < node.matcher.parts.len() {
                Some(p)
            } else {
                node.resume
            }
        });
        self.push(SeqNode {
            parent,
            matcher,
            capture: None,
            previous: None,
            len: 0,
            resume,
        })
    }

    /// The sequence `id` extended by `capture`.
    pub fn add_capture(&mut self, id: SeqId, capture: Capture) -> SeqId {
        self.extend(id, Slot::Built(capture))
    }

    /// The sequence `id` extended by the deferred capture of `inner`, a
    /// finished sequence whose [`resume`](Self::resume) is `id`.
    pub fn add_finished(&mut self, id: SeqId, inner: SeqId) -> SeqId {
        self.extend(
            id,
            Slot::Finished {
                inner,
                built: OnceLock::new(),
            },
        )
    }

    fn extend(&mut self, id: SeqId, slot: Slot) -> SeqId {
        let node = self.node(id);
        let next = SeqNode {
            parent: node.parent,
            matcher: Arc::clone(&node.matcher),
            capture: Some(slot),
            previous: Some(id),
            len: node.len + 1,
            resume: node.resume,
        };
        self.push(next)
    }

    /// Build the deferred capture held by `id`, if any.
    pub fn force(&self, id: SeqId) {
        let node = self.node(id);
        if let Some(Slot::Finished { inner, built }) = &node.capture {
            built.get_or_init(|| self.build_chain(*inner, node.previous));
        }
    }

    /// The part to match next, or `None` once every part is captured.
    #[must_use]
    pub fn next_matcher(&self, id: SeqId) -> Option<&Matcher> {
        let node = self.node(id);
        node.matcher.parts.get(node.len)
    }

    #[must_use]
    pub fn is_finished(&self, id: SeqId) -> bool {
        self.next_matcher(id).is_none()
    }

    /// The enclosing sequence that continues once `id` finishes, or `None`
    /// when finishing `id` completes the root.
    #[must_use]
    pub fn resume(&self, id: SeqId) -> Option<SeqId> {
        self.node(id).resume
    }

    #[must_use]
    pub fn parent(&self, id: SeqId) -> Option<SeqId> {
        self.node(id).parent
    }

    /// Captures so far, in part order.
    #[must_use]
    pub fn captures(&self, id: SeqId) -> Vec<Capture> {
        let mut captures = Vec::with_capacity(self.node(id).len);
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node(current);
            match &node.capture {
                Some(Slot::Built(capture)) => captures.push(capture.clone()),
                Some(Slot::Finished { inner, built }) => captures.push(
                    built
                        .get_or_init(|| self.build_chain(*inner, node.previous))
                        .clone(),
                ),
                None => {}
            }
            cursor = node.previous;
        }
        captures.reverse();
        captures
    }

    /// Build the finished sequence `id` and each enclosing sequence it
    /// finishes, stopping below `stop`. With no `stop` this builds the root.
    #[must_use]
    pub fn build_chain(&self, mut id: SeqId, stop: Option<SeqId>) -> Capture {
        let mut carried: Option<Capture> = None;
        loop {
            let node = self.node(id);
            let mut captures = self.captures(id);
            captures.extend(carried.take());
            let capture = (node.matcher.build)(&captures);
            match node.parent {
                Some(parent) if Some(parent) != stop => {
                    carried = Some(capture);
                    id = parent;
                }
                _ => return capture,
            }
        }
    }

    /// Build the capture of a finished sequence, returning it with the
    /// enclosing sequence it belongs to.
    #[must_use]
    pub fn complete(&self, id: SeqId) -> (Option<SeqId>, Capture) {
        let node = self.node(id);
        let captures = self.captures(id);
        (node.parent, (node.matcher.build)(&captures))
    }

    /// Names of the named sequences enclosing `id`, innermost first.
    #[must_use]
    pub fn breadcrumb(&self, id: SeqId) -> Breadcrumb {
        let mut names: Vec<CompactString> = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node(current);
            if let Some(name) = &node.matcher.name {
                names.push(name.clone());
            }
            cursor = node.parent;
        }
        names.into()
    }

    /// Drop every node not reachable from `roots`, rewriting `roots` to the
    /// surviving nodes' new handles.
    pub fn compact(&mut self, roots: &mut [&mut SeqId]) {
        let mut live = vec![false; self.nodes.len()];
        let mut stack: Vec<usize> = roots.iter().map(|id| id.0).collect();
        while let Some(index) = stack.pop() {
            if std::mem::replace(&mut live[index], true) {
                continue;
            }
            let node = &self.nodes[index];
            stack.extend(node.parent.map(|p| p.0));
            stack.extend(node.previous.map(|p| p.0));
            stack.extend(node.resume.map(|p| p.0));
            // A built slot never reads `inner` again.
            if let Some(Slot::Finished { inner, built }) = &node.capture
                && built.get().is_none()
            {
                stack.push(inner.0);
            }
        }

        let mut moved = vec![0usize; self.nodes.len()];
        let nodes = std::mem::take(&mut self.nodes);
        let before = nodes.len();
        for (index, mut node) in nodes.into_iter().enumerate() {
            if !live[index] {
                continue;
            }
            node.parent = node.parent.map(|p| SeqId(moved[p.0]));
            node.previous = node.previous.map(|p| SeqId(moved[p.0]));
            node.resume = node.resume.map(|p| SeqId(moved[p.0]));
            if let Some(Slot::Finished { inner, .. }) = &mut node.capture {
                *inner = SeqId(moved[inner.0]);
            }
            moved[index] = self.nodes.len();
            self.nodes.push(node);
        }
        for id in roots.iter_mut() {
            **id = SeqId(moved[id.0]);
        }
        tracing::trace!(before, after = self.nodes.len(), "sequence arena compacted");
    }

    /// Nodes currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes created since the last [`clear`](Self::clear), including
    /// compacted ones.
    #[must_use]
    pub const fn allocated(&self) -> usize {
        self.allocated
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.allocated = 0;
    }
}
