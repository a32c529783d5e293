use approx::assert_relative_eq;
use cladistic::{
    Tree, TreeError, average_branch_length_tree, branch_lengths, find_node,
    identical_topology, node_names, parse_newick, set_all_branch_lengths,
};

fn parse_one(newick_str: &str) -> Tree {
    parse_newick(newick_str).unwrap().remove(0)
}

#[test]
fn test_node_names() {
    let test_cases = vec![
        ("All nodes", "((A,B)C,D)E;", false, vec!["E", "C", "A", "B", "D"]),
        ("Leaves only", "((A,B)C,D)E;", true, vec!["A", "B", "D"]),
        ("Empty names skipped", "((A,)C,);", false, vec!["C", "A"]),
        ("Unnamed leaves skipped", "((A,)C,);", true, vec!["A"]),
        ("No names", "(,,);", false, vec![]),
    ];

    for (name, newick_str, leaves_only, expected) in test_cases {
        println!("Testing: {}", name);
        let tree = parse_one(newick_str);
        assert_eq!(node_names(&tree, leaves_only), expected, "{}", name);
    }
}

#[test]
fn test_find_node() {
    let tree = parse_one("(('A B',C_D)E,F);");
    let test_cases = vec![
        ("Plain name", "C_D", false, Some("C_D")),
        ("Normalized name", "A_B", true, Some("A B")),
        ("Not normalized", "A_B", false, None),
        ("Normalization hides underscores", "C_D", true, None),
        ("Inner node", "E", false, Some("E")),
        ("Missing", "X", true, None),
    ];

    for (name, query, normalize, expected) in test_cases {
        println!("Testing: {}", name);
        let found = find_node(&tree, query, normalize)
            .map(|node_id| tree.name(node_id).unwrap().to_string());
        assert_eq!(found.as_deref(), expected, "{}", name);
    }
}

#[test]
fn test_branch_lengths_by_edge_index() {
    let mut tree = parse_one("((A:0.1,B:0.2)C:0.3,D:0.4)E;");
    assert_eq!(branch_lengths(&tree), vec![0.3, 0.1, 0.2, 0.4]);
    for (edge_id, edge) in tree.edges() {
        assert_eq!(branch_lengths(&tree)[edge.index()], tree.branch_length(edge_id).unwrap());
    }

    set_all_branch_lengths(&mut tree, 2.5);
    assert_eq!(branch_lengths(&tree), vec![2.5; 4]);
    assert_relative_eq!(tree.length(), 10.0);
}

#[test]
fn test_average_branch_length_tree() {
    let trees = vec![
        parse_one("((A:1,B:2)C:3,D:4)E;"),
        parse_one("((A:3,B:2)C:1,D:0)E;"),
    ];
    let average = average_branch_length_tree(&trees).unwrap();

    let length_to = |name: &str| {
        let node_id = find_node(&average, name, false).unwrap();
        average.branch_length(average.parent_edge(node_id).unwrap()).unwrap()
    };
    assert_relative_eq!(length_to("A"), 2.0);
    assert_relative_eq!(length_to("B"), 2.0);
    assert_relative_eq!(length_to("C"), 2.0);
    assert_relative_eq!(length_to("D"), 2.0);
    assert_eq!(node_names(&average, false), node_names(&trees[0], false));
    assert!(average.validate().is_ok());
}

#[test]
fn test_average_aligns_by_postorder_position() {
    // Same shape, different names: edges still line up by position.
    let trees = vec![parse_one("(A:1,(B:1,C:1):1);"), parse_one("(X:3,(Y:5,Z:7):9);")];
    let average = average_branch_length_tree(&trees).unwrap();
    let lengths: Vec<f64> = average
        .postorder()
        .filter_map(|item| item.edge_id)
        .filter_map(|edge_id| average.branch_length(edge_id))
        .collect();
    assert_eq!(lengths, vec![2.0, 3.0, 4.0, 5.0]);
    assert!(find_node(&average, "A", false).is_some());
}

#[test]
fn test_average_of_many_trees() {
    let trees: Vec<Tree> = (0..150)
        .map(|i| parse_one(&format!("((A:{i},B:1),C:2);")))
        .collect();
    let average = average_branch_length_tree(&trees).unwrap();
    let a = find_node(&average, "A", false).unwrap();
    assert_relative_eq!(
        average.branch_length(average.parent_edge(a).unwrap()).unwrap(),
        74.5,
        epsilon = 1e-9
    );
}

#[test]
fn test_average_errors() {
    let test_cases = vec![
        ("Different leaf counts", vec!["(A:1,B:1);", "(A:1,B:1,C:1);"]),
        ("Different shapes", vec!["((A,B),(C,D));", "(((A,B),C),D);"]),
        ("Second of three differs", vec!["(A,B);", "((A,B),C);", "(A,B);"]),
    ];

    for (name, inputs) in test_cases {
        println!("Testing: {}", name);
        let trees: Vec<Tree> = inputs.into_iter().map(parse_one).collect();
        assert!(
            matches!(
                average_branch_length_tree(&trees),
                Err(TreeError::StructuralMismatch(_))
            ),
            "{}",
            name
        );
    }

    assert!(matches!(
        average_branch_length_tree(&[]),
        Err(TreeError::EmptyTreeSet)
    ));
}

#[test]
fn test_identical_topology() {
    let test_cases = vec![
        ("Same tree", "((A,B),C);", "((A,B),C);", true),
        ("Names ignored", "((A,B),C);", "((X,Y),Z);", true),
        ("Mirrored shape", "((A,B),C);", "(C,(A,B));", false),
        ("Different size", "(A,B);", "(A,B,C);", false),
    ];

    for (name, left, right, expected) in test_cases {
        println!("Testing: {}", name);
        assert_eq!(
            identical_topology(&parse_one(left), &parse_one(right)),
            expected,
            "{}",
            name
        );
    }
}
