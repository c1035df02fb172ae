use super::*;

#[test]
fn new_document_is_a_lone_root() {
    let tree = Tree::document();
    let root = tree.root();
    assert_eq!(tree.len(), 1);
    assert!(tree.is_empty());
    assert_eq!(tree.content(root), Some(DOCUMENT_ROOT));
    assert_eq!(tree[root].parent(), None);
    assert_eq!(tree[root].descendants(), 0);
}

#[test]
fn add_child_updates_every_ancestor() {
    let mut tree = Tree::document();
    let root = tree.root();
    let outer = tree.push_child(root, "translate([1,0,0])").unwrap();
    let inner = tree.push_child(outer, "rotate(45)").unwrap();
    tree.push_child(inner, "cube(1)").unwrap();

    assert_eq!(tree[root].descendants(), 3);
    assert_eq!(tree[outer].descendants(), 2);
    assert_eq!(tree[inner].descendants(), 1);
    assert!(tree.verify_descendants().is_ok());
}

#[test]
fn add_child_inserts_at_index() {
    let mut tree = Tree::document();
    let root = tree.root();
    tree.push_child(root, "a=1").unwrap();
    tree.push_child(root, "c=3").unwrap();
    tree.add_child(root, 1, "b=2").unwrap();
    tree.add_child(root, 0, "// header").unwrap();

    let contents: Vec<_> = tree.outline().into_iter().map(|(_, text)| text).collect();
    assert_eq!(contents, ["// header", "a=1", "b=2", "c=3"]);
}

#[test]
fn add_child_rejects_index_past_end() {
    let mut tree = Tree::document();
    let root = tree.root();
    tree.push_child(root, "a=1").unwrap();

    let err = tree.add_child(root, 2, "b=2").unwrap_err();
    assert_eq!(err, EditError::IndexOutOfBounds { index: 2, len: 1 });
    assert_eq!(tree.len(), 2);
}

#[test]
fn set_content_replaces_text() {
    let mut tree = Tree::document();
    let root = tree.root();
    let id = tree.push_child(root, "cube(1)").unwrap();
    tree.set_content(id, "sphere(2)").unwrap();
    assert_eq!(tree.content(id), Some("sphere(2)"));
}

#[test]
fn fix_descendants_repairs_bulk_built_tree() {
    let mut tree = Tree::document();
    let root = tree.root();
    let union = tree.attach_unsized(root, "union()");
    tree.attach_unsized(union, "cube(1)");
    let diff = tree.attach_unsized(union, "difference()");
    tree.attach_unsized(diff, "sphere(3)");
    tree.attach_unsized(diff, "cylinder(1)");
    assert!(tree.verify_descendants().is_err());

    assert_eq!(tree.fix_descendants(), 5);
    assert_eq!(tree[union].descendants(), 4);
    assert_eq!(tree[diff].descendants(), 2);
    assert!(tree.verify_descendants().is_ok());
}

#[test]
fn verify_descendants_reports_first_bad_node() {
    let mut tree = Tree::document();
    let root = tree.root();
    let id = tree.push_child(root, "union()").unwrap();
    tree.push_child(id, "cube(1)").unwrap();
    tree[id].descendants = 5;

    let err = tree.verify_descendants().unwrap_err();
    assert_eq!(
        err,
        EditError::InvariantViolated {
            node: root,
            cached: 2,
            expected: 6,
        }
    );
}

#[test]
fn stale_handles_are_rejected_after_removal() {
    let mut tree = Tree::document();
    let root = tree.root();
    let doomed = tree.push_child(root, "cube(1)").unwrap();
    tree.split(doomed).unwrap();
    let reused = tree.push_child(root, "sphere(1)").unwrap();

    assert!(!tree.contains(doomed));
    assert!(tree.contains(reused));
    assert_eq!(
        tree.set_content(doomed, "x").unwrap_err(),
        EditError::StaleNode(doomed)
    );
    assert_eq!(tree.content(reused), Some("sphere(1)"));
}

#[test]
fn classify_node_kinds() {
    assert_eq!(NodeKind::classify("// note"), NodeKind::Comment);
    assert_eq!(NodeKind::classify("/* block */"), NodeKind::Comment);
    assert!(NodeKind::classify("module m(h = 2)").takes_body());
    assert!(!NodeKind::classify("h = 2").takes_body());
    assert!(!NodeKind::classify("// note").takes_body());
    assert_eq!(NodeKind::classify("a = [1, 2]"), NodeKind::Assignment);
    assert_eq!(NodeKind::classify("function f(x) = x * 2"), NodeKind::Assignment);
    assert_eq!(NodeKind::classify("cube(size=3)"), NodeKind::Statement);
    assert_eq!(NodeKind::classify("translate([a=1])"), NodeKind::Statement);
}

#[test]
fn summary_marks_nodes_with_children() {
    let mut tree = Tree::document();
    let root = tree.root();
    let block = tree.push_child(root, "union()").unwrap();
    let leaf = tree.push_child(block, "cube(1)").unwrap();
    assert_eq!(tree.summary(block), "union() {...}");
    assert_eq!(tree.summary(leaf), "cube(1)");
}

#[test]
fn clone_is_independent() {
    let mut tree = Tree::document();
    let root = tree.root();
    let id = tree.push_child(root, "cube(1)").unwrap();

    let mut copy = tree.clone();
    copy.set_content(id, "sphere(1)").unwrap();
    copy.push_child(id, "child()").unwrap();

    assert_eq!(tree.content(id), Some("cube(1)"));
    assert_eq!(tree.len(), 2);
    assert_eq!(copy.len(), 3);
}

#[test]
fn equality_ignores_handles_and_root_text() {
    let mut left = Tree::document();
    let root = left.root();
    let scratch = left.push_child(root, "scratch").unwrap();
    left.split(scratch).unwrap();
    let block = left.push_child(root, "union()").unwrap();
    left.push_child(block, "cube(1)").unwrap();

    let mut right = Tree::detached();
    let root = right.root();
    let block = right.push_child(root, "union()").unwrap();
    right.push_child(block, "cube(1)").unwrap();

    assert_eq!(left, right);

    right.push_child(block, "sphere(1)").unwrap();
    assert_ne!(left, right);
}

#[test]
fn display_shows_counts_and_indentation() {
    let mut tree = Tree::document();
    let root = tree.root();
    let block = tree.push_child(root, "union()").unwrap();
    tree.push_child(block, "cube(1)").unwrap();

    assert_eq!(
        tree.to_string(),
        "(2) Document Root\n  (1) union()\n    (0) cube(1)\n"
    );
}
