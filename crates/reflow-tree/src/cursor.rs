#![forbid(unsafe_code)]

//! Insertion points and delimited regions.

use crate::tree::{NodeId, Tree};

/// An insertion point: a parent plus an optional "insert before" marker.
///
/// Immutable per use; a fresh cursor is constructed whenever a region
/// must be recreated after teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    parent: NodeId,
    before: Option<NodeId>,
}

impl Cursor {
    /// Cursor appending to the end of `parent`.
    #[must_use]
    pub fn append_to(parent: NodeId) -> Self {
        Self {
            parent,
            before: None,
        }
    }

    /// Cursor inserting before `marker` under `parent`.
    #[must_use]
    pub fn before(parent: NodeId, marker: Option<NodeId>) -> Self {
        Self {
            parent,
            before: marker,
        }
    }

    #[must_use]
    pub fn parent(&self) -> NodeId {
        self.parent
    }

    #[must_use]
    pub fn marker(&self) -> Option<NodeId> {
        self.before
    }

    /// Attach a detached node at this insertion point.
    pub fn insert(&self, tree: &mut Tree, node: NodeId) {
        tree.insert_before(self.parent, node, self.before);
    }
}

/// A contiguous, currently-live region of siblings owned by one render
/// unit.
///
/// # Invariants
///
/// 1. `first` and `last` are children of `parent` and `first` does not
///    come after `last`.
/// 2. [`clear`](Bounds::clear) removes exactly the delimited region and
///    nothing outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    parent: NodeId,
    first: NodeId,
    last: NodeId,
}

impl Bounds {
    #[must_use]
    pub fn new(parent: NodeId, first: NodeId, last: NodeId) -> Self {
        Self {
            parent,
            first,
            last,
        }
    }

    /// Bounds delimiting a single node.
    #[must_use]
    pub fn single(parent: NodeId, node: NodeId) -> Self {
        Self::new(parent, node, node)
    }

    #[must_use]
    pub fn parent(&self) -> NodeId {
        self.parent
    }

    #[must_use]
    pub fn first(&self) -> NodeId {
        self.first
    }

    #[must_use]
    pub fn last(&self) -> NodeId {
        self.last
    }

    /// Remove exactly the delimited region from the tree and return the
    /// cursor at which replacement content must be inserted to land in
    /// the same logical position.
    #[must_use]
    pub fn clear(&self, tree: &mut Tree) -> Cursor {
        let next = tree.remove_range(self.parent, self.first, self.last);
        Cursor::before(self.parent, next)
    }
}
