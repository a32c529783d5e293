use cladistic::{Tree, find_node, parse_newick};

const TREE: &str = "((A:1,B:2)C:3,(D:4,E:5)F:6)G;";

fn parse_one(newick_str: &str) -> Tree {
    parse_newick(newick_str).unwrap().remove(0)
}

fn names(tree: &Tree, items: impl Iterator<Item = cladistic::TraversalItem>) -> Vec<String> {
    items
        .map(|item| tree.name(item.node_id).unwrap_or_default().to_string())
        .collect()
}

#[test]
fn test_traversal_orders() {
    let tree = parse_one(TREE);
    let test_cases = vec![
        ("Pre-order", names(&tree, tree.preorder()), vec!["G", "C", "A", "B", "F", "D", "E"]),
        ("Post-order", names(&tree, tree.postorder()), vec!["A", "B", "C", "D", "E", "F", "G"]),
        ("Level-order", names(&tree, tree.levelorder()), vec!["G", "C", "F", "A", "B", "D", "E"]),
    ];

    for (name, actual, expected) in test_cases {
        println!("Testing: {}", name);
        assert_eq!(actual, expected, "{}", name);
    }
}

#[test]
fn test_traversal_from_inner_node() {
    let tree = parse_one(TREE);
    let c = find_node(&tree, "C", false).unwrap();

    assert_eq!(names(&tree, tree.preorder_from(c)), vec!["C", "A", "B"]);
    assert_eq!(names(&tree, tree.postorder_from(c)), vec!["A", "B", "C"]);
    assert_eq!(names(&tree, tree.levelorder_from(c)), vec!["C", "A", "B"]);

    let first = tree.preorder_from(c).next().unwrap();
    assert_eq!(first.depth, 0);
    assert_eq!(first.edge_id, tree.parent_edge(c));
    assert!(first.edge_id.is_some());
}

#[test]
fn test_items_carry_incoming_edges() {
    let tree = parse_one(TREE);
    for item in tree.postorder() {
        match item.edge_id {
            None => assert!(tree.is_root(item.node_id)),
            Some(edge_id) => {
                assert_eq!(tree.edge_child_node(edge_id), Some(item.node_id));
                assert_eq!(tree.parent_edge(item.node_id), Some(edge_id));
            }
        }
    }

    let lengths: Vec<f64> = tree
        .postorder()
        .filter_map(|item| item.edge_id)
        .filter_map(|edge_id| tree.branch_length(edge_id))
        .collect();
    assert_eq!(lengths, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}

#[test]
fn test_levelorder_depth_does_not_decrease() {
    let tree = parse_one("(((A,B),C,(D,(E,F))),G,((H)));");
    let depths: Vec<usize> = tree.levelorder().map(|item| item.depth).collect();
    assert_eq!(depths.len(), tree.node_count());
    assert!(depths.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(depths.first(), Some(&0));
}

#[test]
fn test_every_node_visited_once() {
    let tree = parse_one("(((A,B),C,(D,(E,F))),G,((H)));");
    for (name, count) in [
        ("Pre-order", tree.preorder().count()),
        ("Post-order", tree.postorder().count()),
        ("Level-order", tree.levelorder().count()),
    ] {
        println!("Testing: {}", name);
        assert_eq!(count, tree.node_count(), "{}", name);
    }
}

#[test]
fn test_restart() {
    let tree = parse_one(TREE);
    let mut preorder = tree.preorder();
    let first_pass: Vec<_> = preorder.by_ref().collect();
    assert!(preorder.next().is_none());
    preorder.restart();
    let second_pass: Vec<_> = preorder.collect();
    assert_eq!(first_pass, second_pass);

    let mut postorder = tree.postorder();
    _ = postorder.next();
    _ = postorder.next();
    postorder.restart();
    assert_eq!(postorder.count(), tree.node_count());

    let mut levelorder = tree.levelorder();
    _ = levelorder.next();
    levelorder.restart();
    assert_eq!(levelorder.count(), tree.node_count());
}

#[test]
fn test_empty_tree_traversals() {
    let tree = Tree::new();
    assert_eq!(tree.preorder().count(), 0);
    assert_eq!(tree.postorder().count(), 0);
    assert_eq!(tree.levelorder().count(), 0);
}
