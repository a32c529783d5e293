use super::TreeFloat;
use super::node::NodeId;
use super::tree::{Tree, TreeError};
use rayon::prelude::*;

// =============================================================================
// Node Names
// =============================================================================

/// Names of all nodes in index order.
///
/// Unnamed nodes are always skipped; with `leaves_only` set, inner nodes are
/// skipped as well.
pub fn node_names(tree: &Tree, leaves_only: bool) -> Vec<String> {
    tree.nodes()
        .filter(|(node_id, _)| !leaves_only || tree.is_leaf(*node_id))
        .map(|(_, node)| node.name())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Finds the first node (in index order) with the given name.
///
/// With `replace_underscores` set, underscores in `name` are treated as
/// spaces, so `"A_B"` finds a node named `"A B"`.
pub fn find_node(
    tree: &Tree,
    name: &str,
    replace_underscores: bool,
) -> Option<NodeId> {
    let clean_name = if replace_underscores {
        name.replace('_', " ")
    } else {
        name.to_string()
    };

    tree.nodes()
        .find(|(_, node)| node.name() == clean_name)
        .map(|(node_id, _)| node_id)
}

// =============================================================================
// Branch Lengths
// =============================================================================

/// Branch lengths of all edges, indexed by edge index.
pub fn branch_lengths(tree: &Tree) -> Vec<TreeFloat> {
    tree.edges().map(|(_, edge)| edge.branch_length()).collect()
}

pub fn set_all_branch_lengths(tree: &mut Tree, branch_length: TreeFloat) {
    for (_, edge) in tree.edges_mut() {
        edge.data_mut().set_branch_length(branch_length);
    }
}

// =============================================================================
// Tree Sets
// =============================================================================

/// True if both trees have the same shape: the same child counts in the
/// same post-order sequence. Names and payloads are ignored.
pub fn identical_topology(left: &Tree, right: &Tree) -> bool {
    left.node_count() == right.node_count()
        && left.edge_count() == right.edge_count()
        && left
            .postorder()
            .map(|item| left.child_count(item.node_id))
            .eq(right.postorder().map(|item| right.child_count(item.node_id)))
}

/// Returns a copy of the first tree whose branch lengths are the mean of the
/// branch lengths of all trees.
///
/// Edges are matched by post-order position, not by edge index, because
/// trees of identical shape may have been built in different orders.
pub fn average_branch_length_tree(trees: &[Tree]) -> Result<Tree, TreeError> {
    let Some(first) = trees.first() else {
        return Err(TreeError::EmptyTreeSet);
    };

    for (tree_index, tree) in trees.iter().enumerate().skip(1) {
        if !identical_topology(first, tree) {
            return Err(TreeError::StructuralMismatch(format!(
                "tree {tree_index} differs in topology from tree 0"
            )));
        }
    }

    // Use parallel processing for larger tree sets
    let per_tree: Vec<Vec<TreeFloat>> = if trees.len() > 100 {
        trees.par_iter().map(postorder_branch_lengths).collect()
    } else {
        trees.iter().map(postorder_branch_lengths).collect()
    };

    let mut sums = vec![0e0; per_tree[0].len()];
    for lengths in &per_tree {
        for (sum, length) in sums.iter_mut().zip(lengths) {
            *sum += length;
        }
    }

    let mut result = first.clone();
    let edge_ids: Vec<_> =
        first.postorder().filter_map(|item| item.edge_id).collect();
    for (edge_id, sum) in edge_ids.into_iter().zip(sums) {
        if let Some(edge) = result.edge_mut(edge_id) {
            edge.data_mut().set_branch_length(sum / trees.len() as TreeFloat);
        }
    }

    Ok(result)
}

fn postorder_branch_lengths(tree: &Tree) -> Vec<TreeFloat> {
    tree.postorder()
        .filter_map(|item| item.edge_id)
        .filter_map(|edge_id| tree.branch_length(edge_id))
        .collect()
}
