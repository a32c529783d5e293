//! Conversion steps between broker elements and the payloads of this crate.
//!
//! The default steps carry names and branch lengths. The placement steps
//! add edge numbers, stored in NEWICK tags like `{42}`, as used by the jplace
//! format for evolutionary placement.

use super::broker::NewickBrokerElement;
use super::reader::NewickReader;
use super::writer::NewickWriter;
use crate::TreeInt;
use crate::phylo::data::{EdgeData, NodeData, PayloadError};
use crate::phylo::edge::Edge;
use crate::phylo::node::Node;
use crate::phylo::placement::has_correct_edge_nums;
use crate::phylo::tree::Tree;
use rustc_hash::FxHashSet;
use tracing::warn;

pub const DEFAULT_STEP: &str = "default";
pub const PLACEMENT_STEP: &str = "placement";

// =============================================================================
// Reader steps
// =============================================================================

pub fn default_node_step(
    element: &NewickBrokerElement,
    data: &mut NodeData,
) -> Result<(), PayloadError> {
    data.set_name(element.name.as_str());
    Ok(())
}

/// Sets the branch length; elements without one get `0`.
pub fn default_edge_step(
    element: &NewickBrokerElement,
    data: &mut EdgeData,
) -> Result<(), PayloadError> {
    data.set_branch_length(element.branch_length.unwrap_or(0e0));
    Ok(())
}

pub fn placement_edge_step(
    element: &NewickBrokerElement,
    data: &mut EdgeData,
) -> Result<(), PayloadError> {
    data.placement_mut()?.edge_num = Some(edge_num_from_tags(element)?);
    Ok(())
}

/// The root has no edge to store an edge number on. Its tags are still
/// checked, so that malformed or doubled tags do not pass unnoticed.
pub fn placement_root_step(
    element: &NewickBrokerElement,
    data: &mut NodeData,
) -> Result<(), PayloadError> {
    _ = data.placement()?;
    if element.is_root() && !element.tags.is_empty() {
        _ = edge_num_from_tags(element)?;
    }
    Ok(())
}

/// Rejects edge numbers used more than once and warns if they do not
/// increase in post-order.
pub fn placement_finish_step(tree: &Tree) -> Result<(), PayloadError> {
    let mut seen: FxHashSet<TreeInt> = FxHashSet::default();
    for (_, edge) in tree.edges() {
        let edge_num = edge.data().edge_num(edge.index())?;
        if !seen.insert(edge_num) {
            return Err(PayloadError::DuplicateEdgeNum { edge_num });
        }
    }

    if !has_correct_edge_nums(tree) {
        warn!(
            edge_count = tree.edge_count(),
            "edge numbers do not increase in post-order; the tree does not follow the jplace standard"
        );
    }
    Ok(())
}

/// Reads the edge number from the single tag of an element.
pub fn edge_num_from_tags(
    element: &NewickBrokerElement,
) -> Result<TreeInt, PayloadError> {
    let node = element.name.clone();
    match element.tags.as_slice() {
        [] => Err(PayloadError::MissingEdgeNumTag { node }),
        [tag] => {
            let edge_num = tag.trim().parse::<TreeInt>().map_err(|_| {
                PayloadError::InvalidEdgeNum { node: node.clone(), value: tag.clone() }
            })?;
            if edge_num < 0 {
                return Err(PayloadError::NegativeEdgeNum { node, edge_num });
            }
            Ok(edge_num)
        }
        tags => Err(PayloadError::AmbiguousEdgeNumTag { node, count: tags.len() }),
    }
}

pub(crate) fn add_default_reader_steps(reader: &mut NewickReader) {
    _ = reader
        .add_node_step(DEFAULT_STEP, default_node_step)
        .add_edge_step(DEFAULT_STEP, default_edge_step);
}

pub(crate) fn add_placement_reader_steps(reader: &mut NewickReader) {
    _ = reader
        .add_node_step(PLACEMENT_STEP, placement_root_step)
        .add_edge_step(PLACEMENT_STEP, placement_edge_step)
        .add_finish_step(PLACEMENT_STEP, placement_finish_step);
}

// =============================================================================
// Writer steps
// =============================================================================

pub fn default_node_writer_step(
    node: &Node,
    element: &mut NewickBrokerElement,
) -> Result<(), PayloadError> {
    element.name = node.name().to_string();
    Ok(())
}

pub fn default_edge_writer_step(
    edge: &Edge,
    element: &mut NewickBrokerElement,
) -> Result<(), PayloadError> {
    element.branch_length = Some(edge.branch_length());
    Ok(())
}

pub fn placement_edge_writer_step(
    edge: &Edge,
    element: &mut NewickBrokerElement,
) -> Result<(), PayloadError> {
    element.tags.push(edge.data().edge_num(edge.index())?.to_string());
    Ok(())
}

pub(crate) fn add_default_writer_steps(writer: &mut NewickWriter) {
    _ = writer
        .add_node_step(DEFAULT_STEP, default_node_writer_step)
        .add_edge_step(DEFAULT_STEP, default_edge_writer_step);
}

pub(crate) fn add_placement_writer_steps(writer: &mut NewickWriter) {
    _ = writer.add_edge_step(PLACEMENT_STEP, placement_edge_writer_step);
}
