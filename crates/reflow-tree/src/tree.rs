#![forbid(unsafe_code)]

//! Arena tree and node handles.

use smallvec::SmallVec;

use crate::escape::escape_text;

/// Opaque handle for stable node identity within one [`Tree`].
///
/// Ids are never reused; a removed node's id stays allocated but dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element with a name and ordered children.
    Element { name: String },
    /// A text node; its payload is escaped on serialization.
    Text(String),
    /// A raw-markup node; its payload is serialized verbatim.
    Raw(String),
    /// An invisible marker used as a stable range anchor. Serializes to
    /// nothing.
    Marker,
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
    live: bool,
}

/// The output tree the VM renders into.
///
/// All operations are synchronous and take effect immediately. The tree
/// keeps a monotone mutation counter so callers can assert "nothing was
/// touched" across a revalidation tick.
///
/// # Panics
///
/// Every method that takes a [`NodeId`] panics if the id is dead or used
/// against the wrong node kind. Feeding a stale handle to the tree is a
/// programmer error, not a recoverable condition.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
    mutations: u64,
}

impl Tree {
    /// Create an empty tree with a synthetic root element.
    #[must_use]
    pub fn new() -> Self {
        let root = Node {
            kind: NodeKind::Element {
                name: "#root".to_string(),
            },
            parent: None,
            children: SmallVec::new(),
            live: true,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            mutations: 0,
        }
    }

    /// The synthetic root. Never removable.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Structural/text mutations applied so far.
    #[must_use]
    pub fn mutations(&self) -> u64 {
        self.mutations
    }

    // ─── Node creation (detached) ────────────────────────────────────────

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(text.into()))
    }

    /// Create a detached raw-markup node.
    pub fn create_raw(&mut self, markup: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Raw(markup.into()))
    }

    /// Create a detached element node.
    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Element { name: name.into() })
    }

    /// Create a detached marker node.
    pub fn create_marker(&mut self) -> NodeId {
        self.alloc(NodeKind::Marker)
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).expect("node arena overflow"));
        self.nodes.push(Node {
            kind,
            parent: None,
            children: SmallVec::new(),
            live: true,
        });
        id
    }

    // ─── Structure ───────────────────────────────────────────────────────

    /// Attach `node` as a child of `parent`, before `before` (append when
    /// `before` is `None`).
    pub fn insert_before(&mut self, parent: NodeId, node: NodeId, before: Option<NodeId>) {
        assert!(
            self.node(node).parent.is_none(),
            "insert_before: node is already attached"
        );
        assert!(
            matches!(self.node(parent).kind, NodeKind::Element { .. }),
            "insert_before: parent is not an element"
        );
        let at = match before {
            Some(marker) => self.child_index(parent, marker),
            None => self.node(parent).children.len(),
        };
        self.nodes[parent.index()].children.insert(at, node);
        self.nodes[node.index()].parent = Some(parent);
        self.mutations += 1;
        #[cfg(feature = "tracing")]
        tracing::trace!(?parent, ?node, "insert");
    }

    /// Remove the contiguous child range `[first, last]` of `parent`,
    /// killing each removed subtree, and return the sibling that followed
    /// `last` (the reinsertion marker), if any.
    pub fn remove_range(&mut self, parent: NodeId, first: NodeId, last: NodeId) -> Option<NodeId> {
        let start = self.child_index(parent, first);
        let end = self.child_index(parent, last);
        assert!(
            start <= end,
            "remove_range: first and last are out of order"
        );
        let removed: Vec<NodeId> = self.nodes[parent.index()]
            .children
            .drain(start..=end)
            .collect();
        for id in removed {
            self.kill(id);
        }
        self.mutations += 1;
        #[cfg(feature = "tracing")]
        tracing::trace!(?parent, "remove range");
        self.nodes[parent.index()].children.get(start).copied()
    }

    fn kill(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.index()];
        node.live = false;
        node.parent = None;
        let children = std::mem::take(&mut node.children);
        for child in children {
            self.kill(child);
        }
    }

    // ─── Content ─────────────────────────────────────────────────────────

    /// Replace the payload of a text node.
    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        match &mut self.node_mut(node).kind {
            NodeKind::Text(payload) => *payload = text.into(),
            other => panic!("set_text on non-text node {other:?}"),
        }
        self.mutations += 1;
    }

    /// Replace the payload of a raw-markup node.
    pub fn set_raw(&mut self, node: NodeId, markup: impl Into<String>) {
        match &mut self.node_mut(node).kind {
            NodeKind::Raw(payload) => *payload = markup.into(),
            other => panic!("set_raw on non-raw node {other:?}"),
        }
        self.mutations += 1;
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Whether `id` refers to content that is still in the tree (or still
    /// detached and adoptable). False once removed.
    #[must_use]
    pub fn is_live(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.index())
            .is_some_and(|node| node.live)
    }

    /// Kind of a live node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// Ordered children of a live element.
    #[must_use]
    pub fn children(&self, parent: NodeId) -> &[NodeId] {
        &self.node(parent).children
    }

    /// The sibling immediately after `node` under `parent`, if any.
    #[must_use]
    pub fn next_sibling(&self, parent: NodeId, node: NodeId) -> Option<NodeId> {
        let at = self.child_index(parent, node);
        self.node(parent).children.get(at + 1).copied()
    }

    fn child_index(&self, parent: NodeId, child: NodeId) -> usize {
        self.node(parent)
            .children
            .iter()
            .position(|&c| c == child)
            .unwrap_or_else(|| panic!("node {child:?} is not a child of {parent:?}"))
    }

    fn node(&self, id: NodeId) -> &Node {
        let node = self
            .nodes
            .get(id.index())
            .unwrap_or_else(|| panic!("unknown node {id:?}"));
        assert!(node.live, "use of dead node {id:?}");
        node
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        let node = self
            .nodes
            .get_mut(id.index())
            .unwrap_or_else(|| panic!("unknown node {id:?}"));
        assert!(node.live, "use of dead node {id:?}");
        node
    }

    // ─── Serialization ───────────────────────────────────────────────────

    /// Serialize the whole tree. Text nodes are escaped, raw nodes pass
    /// through verbatim; the synthetic root emits no tags of its own.
    #[must_use]
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for &child in self.node(self.root).children.iter() {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.node(id).kind {
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Raw(markup) => out.push_str(markup),
            NodeKind::Marker => {}
            NodeKind::Element { name } => {
                out.push('<');
                out.push_str(name);
                out.push('>');
                for &child in self.node(id).children.iter() {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_serialize() {
        let mut tree = Tree::new();
        let root = tree.root();
        let hello = tree.create_text("hello ");
        let b = tree.create_element("b");
        let world = tree.create_text("world");
        tree.insert_before(root, hello, None);
        tree.insert_before(root, b, None);
        tree.insert_before(b, world, None);
        assert_eq!(tree.to_markup(), "hello <b>world</b>");
    }

    #[test]
    fn text_is_escaped_raw_is_not() {
        let mut tree = Tree::new();
        let root = tree.root();
        let text = tree.create_text("<b>x</b>");
        let raw = tree.create_raw("<b>x</b>");
        tree.insert_before(root, text, None);
        tree.insert_before(root, raw, None);
        assert_eq!(tree.to_markup(), "&lt;b&gt;x&lt;/b&gt;<b>x</b>");
    }

    #[test]
    fn insert_before_marker() {
        let mut tree = Tree::new();
        let root = tree.root();
        let b = tree.create_text("b");
        tree.insert_before(root, b, None);
        let a = tree.create_text("a");
        tree.insert_before(root, a, Some(b));
        assert_eq!(tree.to_markup(), "ab");
    }

    #[test]
    fn remove_range_returns_following_sibling() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.create_text("a");
        let b = tree.create_text("b");
        let c = tree.create_text("c");
        let d = tree.create_text("d");
        for node in [a, b, c, d] {
            tree.insert_before(root, node, None);
        }

        let next = tree.remove_range(root, b, c);
        assert_eq!(next, Some(d));
        assert_eq!(tree.to_markup(), "ad");
        assert!(!tree.is_live(b));
        assert!(!tree.is_live(c));
        assert!(tree.is_live(a));
    }

    #[test]
    fn remove_range_at_tail_returns_none() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.create_text("a");
        tree.insert_before(root, a, None);
        assert_eq!(tree.remove_range(root, a, a), None);
        assert_eq!(tree.to_markup(), "");
    }

    #[test]
    fn removal_kills_subtree() {
        let mut tree = Tree::new();
        let root = tree.root();
        let div = tree.create_element("div");
        let inner = tree.create_text("x");
        tree.insert_before(root, div, None);
        tree.insert_before(div, inner, None);

        tree.remove_range(root, div, div);
        assert!(!tree.is_live(div));
        assert!(!tree.is_live(inner));
    }

    #[test]
    fn set_text_updates_in_place() {
        let mut tree = Tree::new();
        let root = tree.root();
        let t = tree.create_text("5");
        tree.insert_before(root, t, None);
        tree.set_text(t, "");
        assert_eq!(tree.to_markup(), "");
        // The node itself is still there.
        assert!(tree.is_live(t));
        assert_eq!(tree.children(root), &[t]);
    }

    #[test]
    fn mutation_counter_tracks_writes() {
        let mut tree = Tree::new();
        let root = tree.root();
        let base = tree.mutations();
        let t = tree.create_text("x");
        // Detached creation is not an observable mutation.
        assert_eq!(tree.mutations(), base);
        tree.insert_before(root, t, None);
        tree.set_text(t, "y");
        tree.remove_range(root, t, t);
        assert_eq!(tree.mutations(), base + 3);
    }

    #[test]
    fn markers_serialize_to_nothing() {
        let mut tree = Tree::new();
        let root = tree.root();
        let open = tree.create_marker();
        let text = tree.create_text("x");
        let close = tree.create_marker();
        for node in [open, text, close] {
            tree.insert_before(root, node, None);
        }
        assert_eq!(tree.to_markup(), "x");
        assert_eq!(tree.next_sibling(root, text), Some(close));
    }

    #[test]
    #[should_panic(expected = "use of dead node")]
    fn dead_node_access_panics() {
        let mut tree = Tree::new();
        let root = tree.root();
        let t = tree.create_text("x");
        tree.insert_before(root, t, None);
        tree.remove_range(root, t, t);
        let _ = tree.kind(t);
    }

    #[test]
    #[should_panic(expected = "already attached")]
    fn double_attach_panics() {
        let mut tree = Tree::new();
        let root = tree.root();
        let t = tree.create_text("x");
        tree.insert_before(root, t, None);
        tree.insert_before(root, t, None);
    }
}
