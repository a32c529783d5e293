//! Pre-order, post-order and level-order traversals.
//!
//! All iterators borrow the [Tree] immutably, so the tree cannot be mutated
//! while one of them is alive; the borrow checker rejects such code. Each
//! iterator walks away from the root, starting at the node it was created
//! for, and can be rewound with `restart`.
//!
//! Traversals use explicit stacks/queues, so arbitrarily deep trees do not
//! grow the call stack.

use super::edge::EdgeId;
use super::node::NodeId;
use super::tree::Tree;
use std::collections::VecDeque;

/// One step of a traversal: a node, the edge leading into it (`None` for the
/// root) and its distance in edges from the start node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalItem {
    pub node_id: NodeId,
    pub edge_id: Option<EdgeId>,
    pub depth: usize,
}

impl TraversalItem {
    fn start(tree: &Tree, node_id: NodeId) -> Self {
        Self { node_id, edge_id: tree.parent_edge(node_id), depth: 0 }
    }

    fn children(&self, tree: &Tree) -> Vec<Self> {
        let depth = self.depth + 1;
        tree.children_with_edges(self.node_id)
            .into_iter()
            .map(|(node_id, edge_id)| Self {
                node_id,
                edge_id: Some(edge_id),
                depth,
            })
            .collect()
    }
}

// =============================================================================
// Pre-order
// =============================================================================

/// Yields every node before any of its descendants.
#[derive(Debug, Clone)]
pub struct Preorder<'a> {
    tree: &'a Tree,
    start: Option<NodeId>,
    stack: Vec<TraversalItem>,
}

impl<'a> Preorder<'a> {
    pub(crate) fn new(tree: &'a Tree, start: Option<NodeId>) -> Self {
        let mut preorder = Self { tree, start, stack: Vec::new() };
        preorder.restart();
        preorder
    }

    pub fn restart(&mut self) {
        self.stack.clear();
        if let Some(node_id) = self.start {
            self.stack.push(TraversalItem::start(self.tree, node_id));
        }
    }
}

impl Iterator for Preorder<'_> {
    type Item = TraversalItem;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.stack.pop()?;
        self.stack.extend(item.children(self.tree).into_iter().rev());
        Some(item)
    }
}

// =============================================================================
// Post-order
// =============================================================================

/// Yields every node after all of its descendants, children left to right.
#[derive(Debug, Clone)]
pub struct Postorder<'a> {
    tree: &'a Tree,
    start: Option<NodeId>,
    // The flag marks items whose children are already on the stack.
    stack: Vec<(TraversalItem, bool)>,
}

impl<'a> Postorder<'a> {
    pub(crate) fn new(tree: &'a Tree, start: Option<NodeId>) -> Self {
        let mut postorder = Self { tree, start, stack: Vec::new() };
        postorder.restart();
        postorder
    }

    pub fn restart(&mut self) {
        self.stack.clear();
        if let Some(node_id) = self.start {
            self.stack.push((TraversalItem::start(self.tree, node_id), false));
        }
    }
}

impl Iterator for Postorder<'_> {
    type Item = TraversalItem;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (item, expanded) = self.stack.pop()?;
            if expanded {
                return Some(item);
            }
            self.stack.push((item, true));
            self.stack.extend(
                item.children(self.tree)
                    .into_iter()
                    .rev()
                    .map(|child| (child, false)),
            );
        }
    }
}

// =============================================================================
// Level-order
// =============================================================================

/// Yields nodes in non-decreasing distance from the start node.
#[derive(Debug, Clone)]
pub struct Levelorder<'a> {
    tree: &'a Tree,
    start: Option<NodeId>,
    queue: VecDeque<TraversalItem>,
}

impl<'a> Levelorder<'a> {
    pub(crate) fn new(tree: &'a Tree, start: Option<NodeId>) -> Self {
        let mut levelorder = Self { tree, start, queue: VecDeque::new() };
        levelorder.restart();
        levelorder
    }

    pub fn restart(&mut self) {
        self.queue.clear();
        if let Some(node_id) = self.start {
            self.queue.push_back(TraversalItem::start(self.tree, node_id));
        }
    }
}

impl Iterator for Levelorder<'_> {
    type Item = TraversalItem;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.queue.pop_front()?;
        self.queue.extend(item.children(self.tree));
        Some(item)
    }
}
