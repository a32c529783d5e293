use super::edge::EdgeId;
use super::node::NodeId;
use slotmap::new_key_type;
use std::fmt::Display;

new_key_type! { pub struct LinkId; }

/// Connector between a [Node](super::node::Node) and one of its incident
/// [Edge](super::edge::Edge)s.
///
/// Every edge owns two links, one at each endpoint. The links around a node
/// form a cycle through `next`, so a node of degree `k` has exactly `k`
/// links. `outer` points to the link at the other end of the same edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    index: usize,
    node_id: NodeId,
    edge_id: EdgeId,
    next: LinkId,
    outer: LinkId,
}

impl Link {
    pub(crate) fn new(
        index: usize,
        node_id: NodeId,
        edge_id: EdgeId,
        next: LinkId,
        outer: LinkId,
    ) -> Self {
        Self { index, node_id, edge_id, next, outer }
    }

    pub fn index(&self) -> usize { self.index }
    pub fn node_id(&self) -> NodeId { self.node_id }
    pub fn edge_id(&self) -> EdgeId { self.edge_id }
    pub fn next(&self) -> LinkId { self.next }
    pub fn outer(&self) -> LinkId { self.outer }

    pub(crate) fn set_edge_id(&mut self, edge_id: EdgeId) {
        self.edge_id = edge_id
    }
    pub(crate) fn set_next(&mut self, next: LinkId) { self.next = next }
    pub(crate) fn set_outer(&mut self, outer: LinkId) { self.outer = outer }
}

impl Display for LinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let disp = format!("{self:?}");
        write!(f, "{}", &disp[7..disp.len() - 1])
    }
}
