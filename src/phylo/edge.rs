use super::TreeFloat;
use super::data::EdgeData;
use super::link::LinkId;
use slotmap::new_key_type;
use std::fmt::Display;

new_key_type! { pub struct EdgeId; }

/// A branch between a parent node and a child node.
///
/// The primary link sits at the parent end, the secondary link at the child
/// end.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    index: usize,
    primary_link: LinkId,
    secondary_link: LinkId,
    data: EdgeData,
}

impl Edge {
    pub(crate) fn new(
        index: usize,
        primary_link: LinkId,
        secondary_link: LinkId,
        data: EdgeData,
    ) -> Self {
        Self { index, primary_link, secondary_link, data }
    }

    pub fn index(&self) -> usize { self.index }
    pub fn primary_link(&self) -> LinkId { self.primary_link }
    pub fn secondary_link(&self) -> LinkId { self.secondary_link }
    pub fn data(&self) -> &EdgeData { &self.data }
    pub fn data_mut(&mut self) -> &mut EdgeData { &mut self.data }
    pub fn branch_length(&self) -> TreeFloat { self.data.branch_length() }

    pub fn set_data(&mut self, data: EdgeData) { self.data = data }
}

impl Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let disp = format!("{self:?}");
        write!(f, "{}", &disp[7..disp.len() - 1])
    }
}
