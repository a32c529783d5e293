use super::data::NodeData;
use super::link::LinkId;
use slotmap::new_key_type;
use std::fmt::Display;

new_key_type! { pub struct NodeId; }

/// A taxon or an internal branching point.
///
/// The primary link of a non-root node is the link on the edge towards the
/// root. The primary link of the root is the link towards its first child;
/// an isolated root (single-node tree) has no links at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    index: usize,
    primary_link: Option<LinkId>,
    data: NodeData,
}

impl Node {
    pub(crate) fn new(index: usize, data: NodeData) -> Self {
        Self { index, primary_link: None, data }
    }

    pub fn index(&self) -> usize { self.index }
    pub fn primary_link(&self) -> Option<LinkId> { self.primary_link }
    pub fn data(&self) -> &NodeData { &self.data }
    pub fn data_mut(&mut self) -> &mut NodeData { &mut self.data }
    pub fn name(&self) -> &str { self.data.name() }

    pub fn set_data(&mut self, data: NodeData) { self.data = data }

    pub(crate) fn set_primary_link(&mut self, link_id: LinkId) {
        self.primary_link = Some(link_id);
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let disp = format!("{self:?}");
        write!(f, "{}", &disp[7..disp.len() - 1])
    }
}

impl From<NodeId> for String {
    fn from(node_id: NodeId) -> Self { format!("{node_id}") }
}
