use arboretum_core::{Error, HierarchyTree, Toggle, field};
use serde_json::{Value, json};

fn names(tree: &HierarchyTree, ids: &[arboretum_core::NodeId]) -> Vec<String> {
    ids.iter().map(|id| tree.node(*id).name().to_string()).collect()
}

#[test]
fn two_leaf_dataset_sums_and_stays_open_after_initial_collapse() {
    let mut tree = HierarchyTree::from_record(
        &json!({"name": "root", "children": [
            {"name": "a", "size": 10},
            {"name": "b", "size": 5}
        ]}),
        &field("size"),
    )
    .unwrap();

    assert_eq!(tree.node(tree.root()).value(), 15.0);
    tree.initialize_collapsed();
    assert_eq!(names(&tree, tree.node(tree.root()).children()), vec!["a", "b"]);
    assert!(tree.node(tree.root()).hidden_children().is_empty());
}

#[test]
fn collapse_then_expand_restores_children_in_order() {
    let mut tree = HierarchyTree::from_record(
        &json!({"name": "root", "children": [
            {"name": "X", "children": [
                {"name": "p", "size": 3},
                {"name": "q", "size": 7}
            ]}
        ]}),
        &field("size"),
    )
    .unwrap();
    let x = tree.find_path(&["root", "X"]).unwrap();
    assert_eq!(tree.node(x).value(), 10.0);

    assert_eq!(tree.toggle(x), Toggle::Collapsed);
    assert_eq!(names(&tree, tree.node(x).hidden_children()), vec!["p", "q"]);
    assert_eq!(tree.node(x).value(), 10.0);

    assert_eq!(tree.toggle(x), Toggle::Expanded);
    assert_eq!(names(&tree, tree.node(x).children()), vec!["p", "q"]);
    assert_eq!(tree.node(x).value(), 10.0);
}

#[test]
fn initialize_collapsed_is_idempotent() {
    let record = json!({"name": "r", "children": [
        {"name": "a", "children": [
            {"name": "a1", "children": [{"name": "deep", "v": 1}]}
        ]},
        {"name": "b", "children": [{"name": "b1", "v": 2}]}
    ]});
    let mut once = HierarchyTree::from_record(&record, &field("v")).unwrap();
    once.initialize_collapsed();
    let mut twice = once.clone();
    twice.initialize_collapsed();

    for id in once.ids() {
        assert_eq!(once.node(id).children(), twice.node(id).children());
        assert_eq!(
            once.node(id).hidden_children(),
            twice.node(id).hidden_children()
        );
    }
}

#[test]
fn missing_and_non_numeric_values_count_as_zero() {
    let tree = HierarchyTree::from_record(
        &json!({"name": "r", "children": [
            {"name": "a"},
            {"name": "b", "v": "12"},
            {"name": "c", "v": null},
            {"name": "d", "v": 4.5}
        ]}),
        &field("v"),
    )
    .unwrap();
    assert_eq!(tree.node(tree.root()).value(), 4.5);
    assert!(tree.ids().all(|id| tree.node(id).value().is_finite()));
}

#[test]
fn closures_work_as_value_accessors() {
    let accessor = |r: &Value| r.get("weight").and_then(Value::as_f64).map(|w| w * 2.0);
    let tree = HierarchyTree::from_record(
        &json!({"name": "r", "children": [{"name": "a", "weight": 2}, {"name": "b", "weight": 3}]}),
        &accessor,
    )
    .unwrap();
    assert_eq!(tree.node(tree.root()).value(), 10.0);
}

#[test]
fn branch_values_in_the_record_are_ignored() {
    let tree = HierarchyTree::from_record(
        &json!({"name": "r", "v": 100, "children": [{"name": "a", "v": 1}]}),
        &field("v"),
    )
    .unwrap();
    assert_eq!(tree.node(tree.root()).value(), 1.0);
}

#[test]
fn malformed_records_report_their_path() {
    let err = HierarchyTree::from_record(
        &json!({"name": "r", "children": [{"name": "a"}, {"size": 1}]}),
        &field("size"),
    )
    .unwrap_err();
    match err {
        Error::InvalidRecord { path, .. } => assert_eq!(path, "$.children[1]"),
        other => panic!("unexpected error: {other}"),
    }

    let err = HierarchyTree::from_record(
        &json!({"name": "r", "children": {"name": "a"}}),
        &field("size"),
    )
    .unwrap_err();
    assert!(err.to_string().contains("children"));

    let err = HierarchyTree::from_json_str("[1, 2]", &field("size")).unwrap_err();
    assert!(matches!(err, Error::InvalidRecord { .. }));

    let err = HierarchyTree::from_json_str("{", &field("size")).unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn one_node_tree_operations_are_no_ops() {
    let mut tree = HierarchyTree::from_record(&json!({"name": "solo", "v": 3}), &field("v")).unwrap();
    let root = tree.root();
    assert_eq!(tree.toggle(root), Toggle::Leaf);
    tree.initialize_collapsed();
    tree.collapse_subtree(root);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.node(root).value(), 3.0);
    assert_eq!(tree.node(root).height(), 0);
    assert_eq!(tree.value_extent(), None);
}

#[test]
fn all_descendants_include_hidden_nodes() {
    let mut tree = HierarchyTree::from_record(
        &json!({"name": "r", "children": [
            {"name": "a", "children": [{"name": "a1", "v": 1}, {"name": "a2", "v": 1}]},
            {"name": "b", "v": 1}
        ]}),
        &field("v"),
    )
    .unwrap();
    let a = tree.find_path(&["r", "a"]).unwrap();
    tree.collapse(a);
    assert_eq!(
        names(&tree, &tree.visible_descendants(tree.root())),
        vec!["r", "a", "b"]
    );
    assert_eq!(
        names(&tree, &tree.all_descendants(tree.root())),
        vec!["r", "a", "a1", "a2", "b"]
    );
    // hidden nodes still resolve by path
    assert!(tree.find_path(&["r", "a", "a2"]).is_some());
    assert_eq!(tree.visible_links(tree.root()).len(), 2);
}
