pub(crate) mod data;
pub(crate) mod edge;
pub(crate) mod functions;
pub(crate) mod link;
pub(crate) mod node;
pub(crate) mod placement;
pub(crate) mod traversal;
pub(crate) mod tree;

pub(crate) use crate::TreeFloat;
