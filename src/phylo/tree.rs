use super::TreeFloat;
use super::data::{EdgeData, NodeData};
use super::edge::{Edge, EdgeId};
use super::link::{Link, LinkId};
use super::node::{Node, NodeId};
use super::traversal::{Levelorder, Postorder, Preorder};
use slotmap::SlotMap;
use std::fmt::Display;
use thiserror::Error;

/// Rooted, multifurcating tree stored in three index-stable arenas.
///
/// Nodes, edges and links are never removed individually; [Tree::clear]
/// drops all three arenas at once. Element indices therefore follow
/// insertion order and stay dense.
#[derive(Debug, Default, Clone)]
pub struct Tree {
    nodes: SlotMap<NodeId, Node>,
    edges: SlotMap<EdgeId, Edge>,
    links: SlotMap<LinkId, Link>,
    root_node_id: Option<NodeId>,
}

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Node with NodeId: {0} does not exist.")]
    NodeDoesNotExist(NodeId),
    #[error("Edge with EdgeId: {0} does not exist.")]
    EdgeDoesNotExist(EdgeId),
    #[error("Tree already has a root node: {0}.")]
    RootAlreadySet(NodeId),
    #[error("Tree has no root node.")]
    MissingRoot,
    #[error("Tree validation failed: {0}.")]
    InvalidTree(String),
    #[error("Structural mismatch: {0}.")]
    StructuralMismatch(String),
    #[error("Cannot operate on an empty set of trees.")]
    EmptyTreeSet,
}

impl Tree {
    // =========================================================================
    // Construction & Validation
    // =========================================================================

    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all nodes, edges and links.
    ///
    /// The arenas are replaced rather than emptied: a cleared `SlotMap` hands
    /// out freed slots last-in first-out, which would break index-ordered
    /// iteration for the next tree built here.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_root(&mut self, data: NodeData) -> Result<NodeId, TreeError> {
        if let Some(root_node_id) = self.root_node_id {
            return Err(TreeError::RootAlreadySet(root_node_id));
        }
        let node_id = self.nodes.insert(Node::new(self.nodes.len(), data));
        self.root_node_id = Some(node_id);
        Ok(node_id)
    }

    /// Adds a new child below `parent_node_id`, connected by a new edge.
    ///
    /// The child is appended after all existing children of the parent.
    pub fn add_child(
        &mut self,
        parent_node_id: NodeId,
        node_data: NodeData,
        edge_data: EdgeData,
    ) -> Result<(NodeId, EdgeId), TreeError> {
        if !self.nodes.contains_key(parent_node_id) {
            return Err(TreeError::NodeDoesNotExist(parent_node_id));
        }

        let child_node_id =
            self.nodes.insert(Node::new(self.nodes.len(), node_data));

        let parent_link_id = self.links.insert(Link::new(
            self.links.len(),
            parent_node_id,
            EdgeId::default(),
            LinkId::default(),
            LinkId::default(),
        ));
        let child_link_id = self.links.insert(Link::new(
            self.links.len(),
            child_node_id,
            EdgeId::default(),
            LinkId::default(),
            parent_link_id,
        ));

        let edge_id = self.edges.insert(Edge::new(
            self.edges.len(),
            parent_link_id,
            child_link_id,
            edge_data,
        ));

        let child_link = &mut self.links[child_link_id];
        child_link.set_edge_id(edge_id);
        child_link.set_next(child_link_id);
        self.nodes[child_node_id].set_primary_link(child_link_id);

        let parent_link = &mut self.links[parent_link_id];
        parent_link.set_edge_id(edge_id);
        parent_link.set_outer(child_link_id);

        match self.nodes[parent_node_id].primary_link() {
            None => {
                self.links[parent_link_id].set_next(parent_link_id);
                self.nodes[parent_node_id].set_primary_link(parent_link_id);
            }
            Some(primary_link_id) => {
                let last_link_id = self.last_link_in_cycle(primary_link_id);
                self.links[last_link_id].set_next(parent_link_id);
                self.links[parent_link_id].set_next(primary_link_id);
            }
        }

        Ok((child_node_id, edge_id))
    }

    fn last_link_in_cycle(&self, start_link_id: LinkId) -> LinkId {
        let mut link_id = start_link_id;
        while self.links[link_id].next() != start_link_id {
            link_id = self.links[link_id].next();
        }
        link_id
    }

    pub fn set_node_data(
        &mut self,
        node_id: NodeId,
        data: NodeData,
    ) -> Result<(), TreeError> {
        self.nodes
            .get_mut(node_id)
            .ok_or(TreeError::NodeDoesNotExist(node_id))?
            .set_data(data);
        Ok(())
    }

    pub fn set_edge_data(
        &mut self,
        edge_id: EdgeId,
        data: EdgeData,
    ) -> Result<(), TreeError> {
        self.edges
            .get_mut(edge_id)
            .ok_or(TreeError::EdgeDoesNotExist(edge_id))?
            .set_data(data);
        Ok(())
    }

    /// Checks every structural invariant of the link model.
    ///
    /// Outer links must form an involution over the same edge, sibling
    /// cycles must have the length of the node degree, every non-root node
    /// must hang below exactly one edge and all nodes must be reachable from
    /// the root without revisiting any node.
    pub fn validate(&self) -> Result<(), TreeError> {
        if self.nodes.is_empty() {
            if self.edges.is_empty() && self.links.is_empty() {
                return Ok(());
            }
            return Err(invalid("tree without nodes has edges or links"));
        }

        let Some(root_node_id) = self.root_node_id else {
            return Err(TreeError::MissingRoot);
        };
        if !self.nodes.contains_key(root_node_id) {
            return Err(TreeError::NodeDoesNotExist(root_node_id));
        }

        if self.edges.len() + 1 != self.nodes.len() {
            return Err(invalid(format!(
                "edge count ({}) + 1 should equal node count ({})",
                self.edges.len(),
                self.nodes.len()
            )));
        }
        if self.links.len() != 2 * self.edges.len() {
            return Err(invalid(format!(
                "link count ({}) should equal twice the edge count ({})",
                self.links.len(),
                self.edges.len()
            )));
        }

        self.validate_links()?;
        self.validate_edges()?;
        self.validate_nodes(root_node_id)?;

        let visited = self.preorder().take(self.nodes.len() + 1).count();
        if visited != self.nodes.len() {
            return Err(invalid(format!(
                "{visited} nodes reachable from the root, expected {}",
                self.nodes.len()
            )));
        }

        Ok(())
    }

    fn validate_links(&self) -> Result<(), TreeError> {
        for (link_id, link) in &self.links {
            if !self.nodes.contains_key(link.node_id()) {
                return Err(invalid(format!("link {link_id} has no node")));
            }
            if !self.edges.contains_key(link.edge_id()) {
                return Err(invalid(format!("link {link_id} has no edge")));
            }
            let Some(next) = self.links.get(link.next()) else {
                return Err(invalid(format!("link {link_id} has no next")));
            };
            if next.node_id() != link.node_id() {
                return Err(invalid(format!(
                    "next of link {link_id} belongs to another node"
                )));
            }
            let Some(outer) = self.links.get(link.outer()) else {
                return Err(invalid(format!("link {link_id} has no outer")));
            };
            if outer.outer() != link_id {
                return Err(invalid(format!(
                    "outer of outer of link {link_id} is not the link itself"
                )));
            }
            if outer.edge_id() != link.edge_id() || link.outer() == link_id {
                return Err(invalid(format!(
                    "link {link_id} and its outer do not span one edge"
                )));
            }
        }
        Ok(())
    }

    fn validate_edges(&self) -> Result<(), TreeError> {
        for (edge_id, edge) in &self.edges {
            let primary = self.links.get(edge.primary_link());
            let secondary = self.links.get(edge.secondary_link());
            match (primary, secondary) {
                (Some(primary), Some(secondary))
                    if primary.edge_id() == edge_id
                        && secondary.edge_id() == edge_id
                        && primary.outer() == edge.secondary_link() => {}
                _ => {
                    return Err(invalid(format!(
                        "links of edge {edge_id} do not point back to it"
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_nodes(&self, root_node_id: NodeId) -> Result<(), TreeError> {
        let mut link_counts = vec![0usize; self.nodes.len()];
        for link in self.links.values() {
            link_counts[self.nodes[link.node_id()].index()] += 1;
        }

        for (node_id, node) in &self.nodes {
            let expected_degree = link_counts[node.index()];
            let Some(primary_link_id) = node.primary_link() else {
                if expected_degree == 0 && node_id == root_node_id {
                    continue;
                }
                return Err(invalid(format!("node {node_id} has no links")));
            };
            if self.links[primary_link_id].node_id() != node_id {
                return Err(invalid(format!(
                    "primary link of node {node_id} belongs to another node"
                )));
            }

            let cycle_length = self
                .node_links(node_id)
                .take(self.links.len() + 1)
                .count();
            if cycle_length != expected_degree {
                return Err(invalid(format!(
                    "sibling cycle of node {node_id} has length {cycle_length}, expected degree {expected_degree}"
                )));
            }

            let edge = &self.edges[self.links[primary_link_id].edge_id()];
            let points_to_parent = edge.secondary_link() == primary_link_id;
            if node_id == root_node_id && points_to_parent {
                return Err(invalid("root node has an incoming edge"));
            }
            if node_id != root_node_id && !points_to_parent {
                return Err(invalid(format!(
                    "primary link of node {node_id} does not point towards the root"
                )));
            }
        }
        Ok(())
    }

    // =========================================================================
    // Tree Properties
    // =========================================================================

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.keys().filter(|&node_id| self.is_leaf(node_id)).count()
    }

    pub fn inner_count(&self) -> usize {
        self.node_count() - self.leaf_count()
    }

    /// Highest number of children of any node.
    pub fn max_rank(&self) -> usize {
        self.nodes
            .keys()
            .map(|node_id| self.child_count(node_id))
            .max()
            .unwrap_or(0)
    }

    /// True if every node has either zero or two children.
    pub fn is_bifurcating(&self) -> bool {
        self.nodes.keys().all(|node_id| {
            let child_count = self.child_count(node_id);
            child_count == 0 || child_count == 2
        })
    }

    /// Sum of all branch lengths.
    pub fn length(&self) -> TreeFloat {
        self.edges.values().map(|edge| edge.branch_length()).sum()
    }

    // =========================================================================
    // Element Access
    // =========================================================================

    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(node_id)
    }

    pub fn edge(&self, edge_id: EdgeId) -> Option<&Edge> {
        self.edges.get(edge_id)
    }

    pub fn edge_mut(&mut self, edge_id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(edge_id)
    }

    pub fn link(&self, link_id: LinkId) -> Option<&Link> {
        self.links.get(link_id)
    }

    /// Nodes in index order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    /// Edges in index order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter()
    }

    pub fn edges_mut(&mut self) -> impl Iterator<Item = (EdgeId, &mut Edge)> {
        self.edges.iter_mut()
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().collect()
    }

    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.edges.keys().collect()
    }

    pub fn name(&self, node_id: NodeId) -> Option<&str> {
        self.nodes.get(node_id).map(|node| node.name())
    }

    pub fn branch_length(&self, edge_id: EdgeId) -> Option<TreeFloat> {
        self.edges.get(edge_id).map(|edge| edge.branch_length())
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn root_node(&self) -> Option<NodeId> {
        self.root_node_id
    }

    pub fn root_link(&self) -> Option<LinkId> {
        self.nodes.get(self.root_node_id?)?.primary_link()
    }

    pub fn is_root(&self, node_id: NodeId) -> bool {
        self.root_node_id == Some(node_id)
    }

    pub fn is_leaf(&self, node_id: NodeId) -> bool {
        self.child_count(node_id) == 0
    }

    pub fn link_next(&self, link_id: LinkId) -> Option<LinkId> {
        self.links.get(link_id).map(|link| link.next())
    }

    pub fn link_outer(&self, link_id: LinkId) -> Option<LinkId> {
        self.links.get(link_id).map(|link| link.outer())
    }

    /// All links around a node, starting at its primary link.
    pub fn node_links(&self, node_id: NodeId) -> NodeLinks<'_> {
        let start = self.nodes.get(node_id).and_then(|node| node.primary_link());
        NodeLinks { tree: self, start, current: start }
    }

    pub fn degree(&self, node_id: NodeId) -> usize {
        self.node_links(node_id).count()
    }

    /// Edge connecting a node to its parent; `None` for the root.
    pub fn parent_edge(&self, node_id: NodeId) -> Option<EdgeId> {
        if self.is_root(node_id) {
            return None;
        }
        let link_id = self.nodes.get(node_id)?.primary_link()?;
        Some(self.links[link_id].edge_id())
    }

    pub fn parent_node(&self, node_id: NodeId) -> Option<NodeId> {
        let edge_id = self.parent_edge(node_id)?;
        self.edge_parent_node(edge_id)
    }

    /// Links of a node that lead away from the root, in child order.
    pub fn child_links(&self, node_id: NodeId) -> Vec<LinkId> {
        let mut links = self.node_links(node_id);
        if !self.is_root(node_id) {
            _ = links.next();
        }
        links.collect()
    }

    pub fn children(&self, node_id: NodeId) -> Vec<NodeId> {
        self.child_links(node_id)
            .into_iter()
            .map(|link_id| self.links[self.links[link_id].outer()].node_id())
            .collect()
    }

    /// Children of a node together with the edges leading to them.
    pub fn children_with_edges(
        &self,
        node_id: NodeId,
    ) -> Vec<(NodeId, EdgeId)> {
        self.child_links(node_id)
            .into_iter()
            .map(|link_id| {
                let link = &self.links[link_id];
                (self.links[link.outer()].node_id(), link.edge_id())
            })
            .collect()
    }

    pub fn child_count(&self, node_id: NodeId) -> usize {
        let degree = self.degree(node_id);
        if self.is_root(node_id) { degree } else { degree.saturating_sub(1) }
    }

    pub fn edge_parent_node(&self, edge_id: EdgeId) -> Option<NodeId> {
        let edge = self.edges.get(edge_id)?;
        Some(self.links[edge.primary_link()].node_id())
    }

    pub fn edge_child_node(&self, edge_id: EdgeId) -> Option<NodeId> {
        let edge = self.edges.get(edge_id)?;
        Some(self.links[edge.secondary_link()].node_id())
    }

    // =========================================================================
    // Tree Traversal
    // =========================================================================

    pub fn preorder(&self) -> Preorder<'_> {
        Preorder::new(self, self.root_node_id)
    }

    pub fn preorder_from(&self, node_id: NodeId) -> Preorder<'_> {
        Preorder::new(
            self,
            Some(node_id).filter(|&id| self.nodes.contains_key(id)),
        )
    }

    pub fn postorder(&self) -> Postorder<'_> {
        Postorder::new(self, self.root_node_id)
    }

    pub fn postorder_from(&self, node_id: NodeId) -> Postorder<'_> {
        Postorder::new(
            self,
            Some(node_id).filter(|&id| self.nodes.contains_key(id)),
        )
    }

    pub fn levelorder(&self) -> Levelorder<'_> {
        Levelorder::new(self, self.root_node_id)
    }

    pub fn levelorder_from(&self, node_id: NodeId) -> Levelorder<'_> {
        Levelorder::new(
            self,
            Some(node_id).filter(|&id| self.nodes.contains_key(id)),
        )
    }

    // =========================================================================
    // Display
    // =========================================================================

    fn print_tree(&self) -> String {
        let mut result: String = String::new();
        result.push_str(&format!(
            "Inner Nodes: {}\nLeaves: {}\nAll Nodes: {}\nEdges: {}\n\n",
            self.inner_count(),
            self.leaf_count(),
            self.node_count(),
            self.edge_count(),
        ));

        for item in self.preorder() {
            let name = match self.nodes[item.node_id].name() {
                "" => "None",
                name => name,
            };
            let branch_length = item
                .edge_id
                .map(|edge_id| self.edges[edge_id].branch_length())
                .unwrap_or(TreeFloat::NAN);
            result.push_str(&format!(
                "{}- {} | {} | {:<5.3}\n",
                " ".repeat(item.depth * 4),
                item.node_id,
                name,
                branch_length,
            ));
        }

        result
    }
}

impl Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.print_tree())
    }
}

/// Iterator over the sibling cycle of one node.
#[derive(Debug, Clone)]
pub struct NodeLinks<'a> {
    tree: &'a Tree,
    start: Option<LinkId>,
    current: Option<LinkId>,
}

impl Iterator for NodeLinks<'_> {
    type Item = LinkId;

    fn next(&mut self) -> Option<Self::Item> {
        let link_id = self.current?;
        let next = self.tree.links.get(link_id).map(|link| link.next());
        self.current = next.filter(|&next| Some(next) != self.start);
        Some(link_id)
    }
}

fn invalid(message: impl Into<String>) -> TreeError {
    TreeError::InvalidTree(message.into())
}
