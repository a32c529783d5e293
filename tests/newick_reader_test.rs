use approx::assert_relative_eq;
use cladistic::{
    DefaultNames, NewickReader, NewickReaderOptions, NewickWriter, ParseError,
    PayloadError, Position, Tree, TreeParseError, branch_lengths, find_node,
    node_names, parse_newick,
};
use std::mem::discriminant;

fn names_in_preorder(tree: &Tree) -> Vec<String> {
    tree.preorder()
        .map(|item| tree.name(item.node_id).unwrap_or_default().to_string())
        .collect()
}

#[test]
fn test_names_and_quoting() {
    let test_cases = vec![
        ("Unquoted", "((A,B)C,D)E;", vec!["E", "C", "A", "B", "D"]),
        ("Quoted with spaces", "('A B','C D')'E F';", vec!["E F", "A B", "C D"]),
        ("Double quotes", "(\"A B\",C);", vec!["", "A B", "C"]),
        ("Escaped quote", r"('it\'s',B);", vec!["", "it's", "B"]),
        ("Escaped tab", r"('a\tb',B);", vec!["", "a\tb", "B"]),
        ("Underscores kept", "(A_B,C);", vec!["", "A_B", "C"]),
        ("Unnamed nodes", "(,,);", vec!["", "", "", ""]),
        ("Whitespace", " ( A ,\n\tB ) C ;", vec!["C", "A", "B"]),
        ("Numeric names", "(1,2)3;", vec!["3", "1", "2"]),
    ];

    for (name, newick_str, expected) in test_cases {
        println!("Testing: {}", name);
        let trees = parse_newick(newick_str)
            .unwrap_or_else(|err| panic!("Failed to parse {}: {}", name, err));
        assert_eq!(names_in_preorder(&trees[0]), expected, "{}", name);
    }
}

#[test]
fn test_replace_name_underscores() {
    let reader = NewickReader::new().with_options(
        NewickReaderOptions::default().with_replace_name_underscores(true),
    );
    let tree = reader.read_str("(A_B,'C_D')E_F;").unwrap();
    assert_eq!(names_in_preorder(&tree), vec!["E F", "A B", "C_D"]);
}

#[test]
fn test_default_names() {
    let reader = NewickReader::new().with_options(
        NewickReaderOptions::default()
            .with_default_names(Some(DefaultNames::default())),
    );
    let tree = reader.read_str("((,B),);").unwrap();
    assert_eq!(
        names_in_preorder(&tree),
        vec!["Root Node", "Internal Node", "Leaf Node", "B", "Leaf Node"]
    );
    assert_eq!(node_names(&tree, true), vec!["Leaf Node", "B", "Leaf Node"]);
}

#[test]
fn test_branch_lengths() {
    let test_cases = vec![
        ("All lengths", "(A:1.0,B:2.0,C:3.0);", vec![1.0, 2.0, 3.0]),
        ("Missing lengths", "(A:1.0,B,C:2.0);", vec![1.0, 0.0, 2.0]),
        ("Scientific", "(A:1e-3,B:2.5E2);", vec![0.001, 250.0]),
        ("Negative", "(A:-0.5,B:0.5);", vec![-0.5, 0.5]),
        ("Internal", "((A:0.1,B:0.2):0.3,C:0.4);", vec![0.3, 0.1, 0.2, 0.4]),
        ("Root length ignored", "(A:1,B:2):5;", vec![1.0, 2.0]),
    ];

    for (name, newick_str, expected) in test_cases {
        println!("Testing: {}", name);
        let trees = parse_newick(newick_str).unwrap();
        let lengths = branch_lengths(&trees[0]);
        assert_eq!(lengths.len(), expected.len(), "{}", name);
        for (actual, expected) in lengths.iter().zip(expected) {
            assert_relative_eq!(*actual, expected, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_comments_and_tags_in_broker() {
    let reader = NewickReader::new();
    let broker = reader.read_broker("(A[x]:1{7},B)[&R];").unwrap();

    assert_eq!(broker.len(), 3);
    let a = broker.get(0).unwrap();
    assert_eq!(a.name, "A");
    assert_eq!(a.branch_length, Some(1.0));
    assert_eq!(a.comments, vec!["x".to_string()]);
    assert_eq!(a.tags, vec!["7".to_string()]);
    assert!(a.is_leaf());

    let root = broker.root().unwrap();
    assert!(root.is_root());
    assert_eq!(root.rank, 2);
    assert_eq!(root.comments, vec!["&R".to_string()]);

    let tree = reader.read_str("(A[x]:1{7},B)[&R];").unwrap();
    assert_eq!(tree.node_count(), 3);
    assert!(find_node(&tree, "A", false).is_some());
}

#[test]
fn test_multiple_trees() {
    let trees = parse_newick("(A,B);\n(C,D,E);\n[between]\n((F,G),H);\n").unwrap();
    let leaf_counts: Vec<usize> = trees.iter().map(Tree::leaf_count).collect();
    assert_eq!(leaf_counts, vec![2, 3, 3]);
}

#[test]
fn test_parse_errors() {
    let at = Position::default();
    let test_cases = vec![
        ("Missing semicolon", "(A,B)", ParseError::MissingSemicolon { at }),
        ("Unclosed parenthesis", "((A,B);", ParseError::UnbalancedParentheses { at }),
        ("Extra closing parenthesis", "(A,B));", ParseError::UnbalancedParentheses { at }),
        ("Unterminated string", "('A,B);", ParseError::UnterminatedString { at }),
        ("Unterminated comment", "(A[note,B);", ParseError::UnterminatedComment { at }),
        ("Unterminated tag", "(A{1,B);", ParseError::UnterminatedTag { at }),
        (
            "Bad branch length",
            "(A:abc,B);",
            ParseError::InvalidBranchLength { value: String::new(), at },
        ),
        (
            "Stray bracket",
            "(A,]B);",
            ParseError::UnexpectedChar { character: ']', at },
        ),
        (
            "Two names",
            "(A 'B',C);",
            ParseError::UnexpectedToken { token: String::new(), at },
        ),
        ("Empty input", "", ParseError::EmptyInput),
        ("Whitespace only", "  \n ", ParseError::EmptyInput),
        ("Unfinished second tree", "(A,B);C", ParseError::MissingSemicolon { at }),
    ];

    for (name, newick_str, expected) in test_cases {
        println!("Testing: {}", name);
        match parse_newick(newick_str) {
            Err(TreeParseError::Parse(err)) => assert_eq!(
                discriminant(&err),
                discriminant(&expected),
                "{}: unexpected error {:?}",
                name,
                err
            ),
            other => panic!("{}: expected a parse error, got {:?}", name, other),
        }
    }
}

#[test]
fn test_error_location_in_message() {
    let err = parse_newick("(A,\n  B:x);").unwrap_err();
    let message = err.to_string();
    println!("{}", message);
    assert!(message.contains("'x'"));
    assert!(message.contains("line 2, column 5"));
}

#[test]
fn test_read_str_rejects_trailing_input() {
    let reader = NewickReader::new();
    assert!(reader.read_str("(A,B);   \n").is_ok());
    assert!(matches!(
        reader.read_str("(A,B);(C,D);"),
        Err(TreeParseError::Parse(ParseError::UnexpectedToken { .. }))
    ));
}

#[test]
fn test_clear_and_reparse_is_idempotent() {
    let text = "((A:1,B:2)C:3,(D:4,E:5)F:6)G;";
    let reader = NewickReader::new();
    let writer = NewickWriter::new();
    let fresh = reader.read_str(text).unwrap();

    let mut reused = reader.read_str("(X,(Y,Z),W);").unwrap();
    reader.read_into(text, &mut reused).unwrap();
    reader.read_into(text, &mut reused).unwrap();

    assert!(reused.validate().is_ok());
    assert_eq!(reused.node_count(), fresh.node_count());
    assert_eq!(reused.edge_count(), fresh.edge_count());
    assert_eq!(reused.link_count(), fresh.link_count());
    assert_eq!(node_names(&reused, false), node_names(&fresh, false));
    assert_eq!(branch_lengths(&reused), branch_lengths(&fresh));
    let edge_indices: Vec<usize> = reused.edges().map(|(_, edge)| edge.index()).collect();
    assert_eq!(edge_indices, (0..reused.edge_count()).collect::<Vec<_>>());
    let node_indices: Vec<usize> = reused.nodes().map(|(_, node)| node.index()).collect();
    assert_eq!(node_indices, (0..reused.node_count()).collect::<Vec<_>>());
    assert_eq!(writer.write_str(&reused).unwrap(), writer.write_str(&fresh).unwrap());
}

#[test]
fn test_failed_read_leaves_tree_empty() {
    let reader = NewickReader::placement();
    let mut tree = NewickReader::new().read_str("(A,B);").unwrap();
    assert!(reader.read_into("(A:1{0},B:1);", &mut tree).is_err());
    assert!(tree.is_empty());
    assert_eq!(tree.edge_count(), 0);
}

#[test]
fn test_custom_steps_run_in_registration_order() {
    let mut reader = NewickReader::new();
    reader
        .add_node_step("shout", |_, data| {
            let name = format!("{}!", data.name());
            data.set_name(name);
            Ok(())
        })
        .add_edge_step("double", |_, data| {
            let branch_length = data.branch_length() * 2.0;
            data.set_branch_length(branch_length);
            Ok(())
        });
    assert_eq!(reader.node_step_names(), vec!["default", "shout"]);
    assert_eq!(reader.edge_step_names(), vec!["default", "double"]);

    let tree = reader.read_str("(A:1,B:2)C;").unwrap();
    assert_eq!(names_in_preorder(&tree), vec!["C!", "A!", "B!"]);
    assert_eq!(branch_lengths(&tree), vec![2.0, 4.0]);
}

#[test]
fn test_failing_step_reports_element_position() {
    let mut reader = NewickReader::new();
    reader.add_node_step("no-b", |element, _| {
        if element.name == "B" {
            Err(PayloadError::MissingEdgeNumTag { node: element.name.clone() })
        } else {
            Ok(())
        }
    });

    match reader.read_str("(A,\n B);") {
        Err(TreeParseError::Payload { at, error }) => {
            assert_eq!((at.line, at.column), (2, 2));
            assert_eq!(
                error,
                PayloadError::MissingEdgeNumTag { node: "B".to_string() }
            );
        }
        other => panic!("expected a payload error, got {:?}", other),
    }
}

#[test]
fn test_finish_step_sees_complete_tree() {
    let mut reader = NewickReader::new();
    reader.add_finish_step("two-leaves", |tree| {
        if tree.leaf_count() == 2 {
            Ok(())
        } else {
            Err(PayloadError::UnsetEdgeNum { edge_index: tree.leaf_count() })
        }
    });
    assert_eq!(reader.finish_step_names(), vec!["two-leaves"]);

    assert!(reader.read_str("((A,B),C);").is_err());
    assert!(matches!(
        reader.read_str("((A,B),C);"),
        Err(TreeParseError::Finish(PayloadError::UnsetEdgeNum { edge_index: 3 }))
    ));
    assert!(reader.read_str("(A,B);").is_ok());
}

#[test]
fn test_bare_reader_creates_empty_payloads() {
    let reader = NewickReader::with_payload(cladistic::PayloadKind::Default);
    let tree = reader.read_str("(A:1,B:2)C;").unwrap();
    assert_eq!(tree.node_count(), 3);
    assert!(node_names(&tree, false).is_empty());
    assert_eq!(branch_lengths(&tree), vec![0.0, 0.0]);
}
