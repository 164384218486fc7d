#![forbid(unsafe_code)]

//! The reconciliation primitive: materialize an insertion, then patch it
//! in place where possible.

use reflow_tree::{Bounds, Cursor, NodeId, Tree};

use crate::insertion::Insertion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpsertKind {
    /// A single text node (also covers `Insertion::Empty`, stored as the
    /// empty string).
    Text(NodeId),
    /// A single raw-markup node.
    Trusted(NodeId),
    /// An adopted foreign node.
    Node(NodeId),
}

/// The result of one render/update operation: the bounds it produced and
/// the in-place update strategy for the content inside them.
///
/// `Upsert` owns its [`Bounds`], so the pair can only ever be replaced
/// wholesale — a stale bounds next to a fresh upsert is unrepresentable.
#[derive(Debug)]
pub struct Upsert {
    bounds: Bounds,
    kind: UpsertKind,
}

impl Upsert {
    /// Materialize `value` at `cursor` and return the upsert delimiting
    /// exactly the created content.
    pub fn insert(tree: &mut Tree, cursor: Cursor, value: Insertion) -> Self {
        let (node, kind) = match value {
            Insertion::Empty => {
                let node = tree.create_text("");
                (node, UpsertKind::Text(node))
            }
            Insertion::Text(text) => {
                let node = tree.create_text(text);
                (node, UpsertKind::Text(node))
            }
            Insertion::TrustedMarkup(markup) => {
                let node = tree.create_raw(markup);
                (node, UpsertKind::Trusted(node))
            }
            Insertion::Node(node) => (node, UpsertKind::Node(node)),
        };
        cursor.insert(tree, node);
        Self {
            bounds: Bounds::single(cursor.parent(), node),
            kind,
        }
    }

    /// The region this upsert currently owns.
    #[must_use]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Attempt to mutate the existing content in place.
    ///
    /// Returns `false` when the pairing is not patchable — the caller
    /// must then clear the bounds and insert afresh. That branch is the
    /// defined fallback, not an error.
    pub fn update(&mut self, tree: &mut Tree, value: Insertion) -> bool {
        match (self.kind, value) {
            (UpsertKind::Text(node), Insertion::Empty) => {
                tree.set_text(node, "");
                true
            }
            (UpsertKind::Text(node), Insertion::Text(text)) => {
                tree.set_text(node, text);
                true
            }
            // Raw markup is stored as a single textual node, so
            // trusted-to-trusted is always the textual fast path.
            (UpsertKind::Trusted(node), Insertion::TrustedMarkup(markup)) => {
                tree.set_raw(node, markup);
                true
            }
            // Identity reuse: the same adopted node needs no work.
            (UpsertKind::Node(current), Insertion::Node(next)) if current == next => true,
            _ => false,
        }
    }
}
