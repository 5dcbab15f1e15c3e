//! Content tree behaviour across tree, ordering and visibility.

use kbase_tree::prelude::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn names<'a>(entries: &[ChildEntry<'a>]) -> Vec<&'a str> {
    entries.iter().map(|e| e.name).collect()
}

fn build(topics: &[&str]) -> (ContentTree, OrderingConfig) {
    let mut tree = ContentTree::new();
    let mut ordering = OrderingConfig::new();
    let root = tree.root();
    for topic in topics {
        tree.add_child(root, topic, None, &mut ordering).unwrap();
    }
    (tree, ordering)
}

#[test]
fn ordering_projection_appends_unlisted_children() {
    let (tree, mut ordering) = build(&["A", "B", "C"]);
    ordering.set_order(TopicPath::root(), vec!["C".into(), "A".into()]);

    let listed = tree
        .list_children(tree.root(), &ordering, &VisibilityConfig::new())
        .unwrap();
    assert_eq!(names(&listed), vec!["C", "A", "B"]);
}

#[test]
fn hidden_root_topic_still_resolves() {
    let (tree, ordering) = build(&["X", "Y"]);
    let mut visibility = VisibilityConfig::new();
    visibility.set("X", true);
    visibility.set("Y", false);

    let listed = tree
        .list_children(tree.root(), &ordering, &visibility)
        .unwrap();
    assert_eq!(names(&listed), vec!["X"]);
    assert!(tree.resolve(&TopicPath::single("Y")).is_ok());
}

#[test]
fn visibility_does_not_filter_nested_levels() {
    let (mut tree, mut ordering) = build(&["Top"]);
    let top = tree.resolve(&TopicPath::single("Top")).unwrap();
    tree.add_child(top, "Y", None, &mut ordering).unwrap();

    let mut visibility = VisibilityConfig::new();
    visibility.set("Y", false);

    let listed = tree.list_children(top, &ordering, &visibility).unwrap();
    assert_eq!(names(&listed), vec!["Y"]);
}

#[test]
fn add_child_appends_to_parent_ordering() {
    let (mut tree, mut ordering) = build(&["A"]);
    let a = tree.resolve(&TopicPath::single("A")).unwrap();
    tree.add_child(a, "one", Some("📙"), &mut ordering).unwrap();
    tree.add_child(a, "two", None, &mut ordering).unwrap();

    assert_eq!(ordering.order_for(&TopicPath::root()), &["A"]);
    assert_eq!(ordering.order_for(&TopicPath::single("A")), &["one", "two"]);

    let one = tree.resolve(&TopicPath::from(["A", "one"])).unwrap();
    let node = tree.node(one).unwrap();
    assert_eq!(node.content(), "");
    assert_eq!(node.icon(), Some("📙"));
}

#[test]
fn rename_preserves_node_and_ordering_slot() {
    let (mut tree, mut ordering) = build(&["X", "A", "Y"]);
    let a = tree.resolve(&TopicPath::single("A")).unwrap();
    tree.set_content(a, "body").unwrap();
    tree.add_child(a, "child", None, &mut ordering).unwrap();

    let root = tree.root();
    tree.rename_child(root, "A", "B", &mut ordering).unwrap();

    assert!(matches!(
        tree.resolve(&TopicPath::single("A")),
        Err(TreeError::PathNotFound(_))
    ));
    let b = tree.resolve(&TopicPath::single("B")).unwrap();
    assert_eq!(b, a);
    assert_eq!(tree.node(b).unwrap().content(), "body");
    assert!(tree.resolve(&TopicPath::from(["B", "child"])).is_ok());
    assert_eq!(ordering.order_for(&TopicPath::root()), &["X", "B", "Y"]);
    assert_eq!(ordering.order_for(&TopicPath::single("B")), &["child"]);
}

#[test]
fn remove_cascades_through_side_tables() {
    let (mut tree, mut ordering) = build(&["Topic", "Topic2"]);
    let mut visibility = VisibilityConfig::new();
    visibility.set("Topic", false);
    let topic = tree.resolve(&TopicPath::single("Topic")).unwrap();
    tree.add_child(topic, "Sub", None, &mut ordering).unwrap();

    let root = tree.root();
    let mut refs = (&mut ordering, &mut visibility);
    let removed = tree.remove_child(root, "Topic", &mut refs).unwrap();

    assert_eq!(removed.len(), 2);
    assert!(tree.resolve(&TopicPath::from(["Topic", "Sub"])).is_err());
    assert!(tree.resolve(&TopicPath::single("Topic2")).is_ok());
    assert_eq!(ordering.order_for(&TopicPath::root()), &["Topic2"]);
    assert!(ordering.order_for(&TopicPath::single("Topic")).is_empty());
    assert!(visibility.iter().next().is_none());
}

#[test]
fn reconcile_fills_missing_entries() {
    let doc = serde_json::json!({
        "A": { "subtopics": { "a1": {}, "a2": {} } },
        "B": {}
    });
    let tree = ContentTree::from_json(&doc).unwrap();
    let mut ordering = OrderingConfig::new();
    ordering.set_order(TopicPath::single("A"), vec!["a2".into()]);
    ordering.set_order(TopicPath::single("Gone"), vec!["x".into()]);
    ordering.reconcile(&tree);

    assert_eq!(ordering.order_for(&TopicPath::root()), &["A", "B"]);
    assert_eq!(ordering.order_for(&TopicPath::single("A")), &["a2", "a1"]);
    assert!(ordering.order_for(&TopicPath::single("B")).is_empty());
    assert!(ordering.order_for(&TopicPath::single("Gone")).is_empty());

    let mut visibility = VisibilityConfig::new();
    visibility.set("B", false);
    visibility.set("Gone", false);
    visibility.reconcile(&tree);
    assert!(visibility.is_visible("A"));
    assert!(!visibility.is_visible("B"));
    assert_eq!(visibility.iter().count(), 2);
}

#[test]
fn search_finds_content_match() {
    let (mut tree, mut ordering) = build(&["Accounts", "Billing"]);
    let billing = tree.resolve(&TopicPath::single("Billing")).unwrap();
    tree.set_content(billing, "Pay by UPI").unwrap();
    tree.add_child(billing, "Cards", None, &mut ordering).unwrap();

    let hits: Vec<_> = tree.search("upi").collect();
    assert_eq!(hits, vec![TopicPath::single("Billing")]);
}

proptest! {
    #[test]
    fn prop_listing_is_a_permutation_of_children(
        count in 1..12usize,
        order in proptest::collection::vec(0..16usize, 0..16)
    ) {
        let topics: Vec<String> = (0..count).map(|i| format!("t{i}")).collect();
        let refs: Vec<&str> = topics.iter().map(String::as_str).collect();
        let (tree, mut ordering) = build(&refs);
        ordering.set_order(
            TopicPath::root(),
            order.iter().map(|i| format!("t{i}")).collect(),
        );

        let listed = tree
            .list_children(tree.root(), &ordering, &VisibilityConfig::new())
            .unwrap();
        let mut seen: Vec<&str> = names(&listed);
        seen.sort_unstable();
        let mut expected = refs.clone();
        expected.sort_unstable();
        prop_assert_eq!(seen, expected);

        // Listed children come first, in first-occurrence order of the list
        let mut firsts: Vec<String> = Vec::new();
        for i in &order {
            let name = format!("t{i}");
            if *i < count && !firsts.contains(&name) {
                firsts.push(name);
            }
        }
        let head: Vec<&str> = names(&listed[..firsts.len()]);
        prop_assert_eq!(head, firsts.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn prop_resolve_matches_path_of(depth in 1..6usize) {
        let mut tree = ContentTree::new();
        let mut parent = tree.root();
        let mut ids = Vec::new();
        for level in 0..depth {
            parent = tree.add_child(parent, &format!("n{level}"), None, &mut ()).unwrap();
            ids.push(parent);
        }
        for id in ids {
            let path = tree.path_of(id).unwrap();
            prop_assert_eq!(tree.resolve(&path).unwrap(), id);
        }
    }
}
