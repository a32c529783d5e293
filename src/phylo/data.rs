use super::TreeFloat;
use crate::TreeInt;
use std::fmt::Display;
use thiserror::Error;

// =============================================================================
// Type definitions
// =============================================================================

/// The payload variants known to this crate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    #[default]
    Default,
    Placement,
}

/// Errors raised while converting between broker elements and payloads.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayloadError {
    #[error(
        "Missing edge-number tag: edge at node '{node}' does not contain a tag value like '{{42}}'."
    )]
    MissingEdgeNumTag { node: String },
    #[error(
        "Ambiguous edge-number tag: edge at node '{node}' contains {count} tag values, expecting exactly one."
    )]
    AmbiguousEdgeNumTag { node: String, count: usize },
    #[error("Malformed edge-number tag '{{{value}}}' at node '{node}'.")]
    InvalidEdgeNum { node: String, value: String },
    #[error("Negative edge number {edge_num} at node '{node}'.")]
    NegativeEdgeNum { node: String, edge_num: TreeInt },
    #[error("Edge number {edge_num} is used by more than one edge.")]
    DuplicateEdgeNum { edge_num: TreeInt },
    #[error("Edge with index {edge_index} has no edge number.")]
    UnsetEdgeNum { edge_index: usize },
    #[error("Payload kind mismatch: expected {expected} data, found {found}.")]
    KindMismatch { expected: PayloadKind, found: PayloadKind },
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DefaultNodeData {
    pub name: String,
}

/// Node payload of placement trees. Adds nothing to the default payload.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlacementNodeData {
    pub default: DefaultNodeData,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DefaultEdgeData {
    pub branch_length: TreeFloat,
}

/// Edge payload of placement trees.
///
/// `edge_num` is `None` only between creation by the data factory and the
/// conversion step that fills it in.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlacementEdgeData {
    pub default: DefaultEdgeData,
    pub edge_num: Option<TreeInt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Default(DefaultNodeData),
    Placement(PlacementNodeData),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EdgeData {
    Default(DefaultEdgeData),
    Placement(PlacementEdgeData),
}

// =============================================================================
// PayloadKind implementations
// =============================================================================

impl PayloadKind {
    pub fn new_node_data(&self) -> NodeData {
        match self {
            PayloadKind::Default => NodeData::Default(DefaultNodeData::default()),
            PayloadKind::Placement => {
                NodeData::Placement(PlacementNodeData::default())
            }
        }
    }

    pub fn new_edge_data(&self) -> EdgeData {
        match self {
            PayloadKind::Default => EdgeData::Default(DefaultEdgeData::default()),
            PayloadKind::Placement => {
                EdgeData::Placement(PlacementEdgeData::default())
            }
        }
    }
}

impl Display for PayloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PayloadKind::Default => "default",
                PayloadKind::Placement => "placement",
            }
        )
    }
}

// =============================================================================
// NodeData implementations
// =============================================================================

impl Default for NodeData {
    fn default() -> Self { NodeData::Default(DefaultNodeData::default()) }
}

impl NodeData {
    pub fn kind(&self) -> PayloadKind {
        match self {
            NodeData::Default(_) => PayloadKind::Default,
            NodeData::Placement(_) => PayloadKind::Placement,
        }
    }

    /// The name-carrying part shared by every variant.
    pub fn default_data(&self) -> &DefaultNodeData {
        match self {
            NodeData::Default(data) => data,
            NodeData::Placement(data) => &data.default,
        }
    }

    pub fn default_data_mut(&mut self) -> &mut DefaultNodeData {
        match self {
            NodeData::Default(data) => data,
            NodeData::Placement(data) => &mut data.default,
        }
    }

    pub fn name(&self) -> &str { &self.default_data().name }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.default_data_mut().name = name.into();
    }

    pub fn placement(&self) -> Result<&PlacementNodeData, PayloadError> {
        match self {
            NodeData::Placement(data) => Ok(data),
            other => Err(PayloadError::KindMismatch {
                expected: PayloadKind::Placement,
                found: other.kind(),
            }),
        }
    }
}

impl From<&str> for NodeData {
    fn from(name: &str) -> Self {
        NodeData::Default(DefaultNodeData { name: name.to_string() })
    }
}

// =============================================================================
// EdgeData implementations
// =============================================================================

impl Default for EdgeData {
    fn default() -> Self { EdgeData::Default(DefaultEdgeData::default()) }
}

impl EdgeData {
    pub fn kind(&self) -> PayloadKind {
        match self {
            EdgeData::Default(_) => PayloadKind::Default,
            EdgeData::Placement(_) => PayloadKind::Placement,
        }
    }

    /// The branch-length-carrying part shared by every variant.
    pub fn default_data(&self) -> &DefaultEdgeData {
        match self {
            EdgeData::Default(data) => data,
            EdgeData::Placement(data) => &data.default,
        }
    }

    pub fn default_data_mut(&mut self) -> &mut DefaultEdgeData {
        match self {
            EdgeData::Default(data) => data,
            EdgeData::Placement(data) => &mut data.default,
        }
    }

    pub fn branch_length(&self) -> TreeFloat {
        self.default_data().branch_length
    }

    pub fn set_branch_length(&mut self, branch_length: TreeFloat) {
        self.default_data_mut().branch_length = branch_length;
    }

    pub fn placement(&self) -> Result<&PlacementEdgeData, PayloadError> {
        match self {
            EdgeData::Placement(data) => Ok(data),
            other => Err(PayloadError::KindMismatch {
                expected: PayloadKind::Placement,
                found: other.kind(),
            }),
        }
    }

    pub fn placement_mut(
        &mut self,
    ) -> Result<&mut PlacementEdgeData, PayloadError> {
        match self {
            EdgeData::Placement(data) => Ok(data),
            other => Err(PayloadError::KindMismatch {
                expected: PayloadKind::Placement,
                found: other.kind(),
            }),
        }
    }

    /// Edge number of a placement edge.
    ///
    /// Fails for non-placement payloads and for placement payloads whose
    /// number was never set.
    pub fn edge_num(&self, edge_index: usize) -> Result<TreeInt, PayloadError> {
        self.placement()?
            .edge_num
            .ok_or(PayloadError::UnsetEdgeNum { edge_index })
    }
}

impl From<TreeFloat> for EdgeData {
    fn from(branch_length: TreeFloat) -> Self {
        EdgeData::Default(DefaultEdgeData { branch_length })
    }
}
