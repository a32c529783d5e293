use super::data::PayloadError;
use super::edge::EdgeId;
use super::tree::Tree;
use crate::TreeInt;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Checks whether edge numbers strictly increase along a post-order walk
/// from the root, as the jplace standard demands.
///
/// Returns `false` if any edge lacks a placement edge number. A violation is
/// not an error: the tree stays usable, callers decide how strict to be.
pub fn has_correct_edge_nums(tree: &Tree) -> bool {
    let mut previous: Option<TreeInt> = None;

    for edge_id in tree.postorder().filter_map(|item| item.edge_id) {
        let Some(edge) = tree.edge(edge_id) else {
            return false;
        };
        let edge_num = match edge.data().edge_num(edge.index()) {
            Ok(edge_num) => edge_num,
            Err(err) => {
                debug!(edge_index = edge.index(), %err, "edge without edge number");
                return false;
            }
        };

        if let Some(previous) = previous
            && edge_num <= previous
        {
            debug!(
                previous,
                edge_num,
                edge_index = edge.index(),
                "edge numbers do not increase in post-order"
            );
            return false;
        }
        previous = Some(edge_num);
    }

    true
}

/// Maps every edge number to the edge that carries it.
pub fn edge_num_to_edge_map(
    tree: &Tree,
) -> Result<FxHashMap<TreeInt, EdgeId>, PayloadError> {
    let mut result: FxHashMap<TreeInt, EdgeId> = FxHashMap::default();
    for (edge_id, edge) in tree.edges() {
        let edge_num = edge.data().edge_num(edge.index())?;
        if result.insert(edge_num, edge_id).is_some() {
            return Err(PayloadError::DuplicateEdgeNum { edge_num });
        }
    }
    Ok(result)
}
