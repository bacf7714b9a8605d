//! Trie vertices and the labeled transitions between them.

use std::mem;

/// A labeled transition from a parent node to exactly one child.
///
/// The label is never empty. Concatenating the labels from the root down to a
/// node reproduces the literal pattern bytes, placeholder markup included.
/// Labels are split at byte granularity, so a single label need not be valid
/// UTF-8 on its own.
#[derive(Debug)]
pub struct Edge<T> {
    pub(crate) label: Vec<u8>,
    pub(crate) node: Node<T>,
}

impl<T> Edge<T> {
    pub(crate) fn new(label: impl Into<Vec<u8>>, node: Node<T>) -> Self {
        Self { label: label.into(), node }
    }

    /// The literal bytes carried by this transition.
    pub fn label(&self) -> &[u8] {
        &self.label
    }

    /// The node this edge leads to.
    pub fn node(&self) -> &Node<T> {
        &self.node
    }
}

/// One position in the compressed trie.
#[derive(Debug)]
pub struct Node<T> {
    pub(crate) handler: Option<T>,
    pub(crate) edges: Vec<Edge<T>>,
    pub(crate) priority: u32,
    pub(crate) depth: usize,
}

impl<T> Node<T> {
    pub(crate) fn new(depth: usize) -> Self {
        Self { handler: None, edges: Vec::new(), priority: 0, depth }
    }

    pub(crate) fn leaf(depth: usize, handler: T) -> Self {
        Self { handler: Some(handler), ..Self::new(depth) }
    }

    pub fn is_leaf(&self) -> bool {
        self.edges.is_empty()
    }

    /// The handler registered for the pattern ending exactly here, if any.
    pub fn handler(&self) -> Option<&T> {
        self.handler.as_ref()
    }

    /// Outgoing edges, in insertion order.
    pub fn edges(&self) -> &[Edge<T>] {
        &self.edges
    }

    /// How many insertions have passed through this node.
    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// Distance from the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Moves this node's handler and edges into a new node one level deeper.
    ///
    /// The returned node keeps the priority, and every node in its subtree has
    /// its depth incremented by one. `self` is left empty at its old depth so
    /// it can become the intermediate node of an edge split. Nothing is copied:
    /// the edge list changes owner.
    pub(crate) fn push_down(&mut self) -> Node<T> {
        let mut moved = Node {
            handler: self.handler.take(),
            edges: mem::take(&mut self.edges),
            priority: self.priority,
            depth: self.depth,
        };
        moved.deepen();
        moved
    }

    fn deepen(&mut self) {
        self.depth += 1;
        for edge in &mut self.edges {
            edge.node.deepen();
        }
    }
}
