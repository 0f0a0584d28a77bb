use walker::{OrderedTree, Separation, layout};

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-9, "{actual:?} vs {expected:?}");
    }
}

/// Builds a tree from `(parent, ...)` pairs in index order; index 0 is the root.
fn tree_from_parents(parents: &[usize]) -> OrderedTree {
    let mut tree = OrderedTree::new();
    for (i, &p) in parents.iter().enumerate() {
        let idx = tree.push_child(p).unwrap();
        assert_eq!(idx, i + 1);
    }
    tree
}

#[test]
fn layout_single_node_sits_at_origin() {
    let out = layout(&OrderedTree::new(), Separation::default());
    assert_close(&out.x, &[0.0]);
    assert_eq!(out.depth, vec![0]);
}

#[test]
fn layout_centers_parent_over_two_children() {
    let out = layout(&tree_from_parents(&[0, 0]), Separation::default());
    assert_close(&out.x, &[0.0, -0.5, 0.5]);
    assert_eq!(out.depth, vec![0, 1, 1]);
}

#[test]
fn layout_spaces_three_siblings_evenly() {
    let out = layout(&tree_from_parents(&[0, 0, 0]), Separation::default());
    assert_close(&out.x, &[0.0, -1.0, 0.0, 1.0]);
}

#[test]
fn layout_separates_cousins_by_the_wider_gap() {
    // 0 -> {1 -> 3, 2 -> 4}
    let out = layout(&tree_from_parents(&[0, 0, 1, 2]), Separation::default());
    assert_close(&out.x, &[0.0, -1.0, 1.0, -1.0, 1.0]);
    assert_eq!(out.depth, vec![0, 1, 1, 2, 2]);
}

#[test]
fn layout_keeps_child_order_left_to_right() {
    // 0 -> {1 -> {3, 4}, 2}
    let out = layout(&tree_from_parents(&[0, 0, 1, 1]), Separation::default());
    assert_close(&out.x, &[0.0, -0.5, 0.5, -1.0, 0.0]);
}

#[test]
fn layout_uses_custom_separation() {
    let sep = Separation {
        siblings: 2.0,
        cousins: 3.0,
    };
    let out = layout(&tree_from_parents(&[0, 0]), sep);
    assert_close(&out.x, &[0.0, -1.0, 1.0]);
}

#[test]
fn layout_chain_stays_vertical() {
    let out = layout(&tree_from_parents(&[0, 1, 2, 3]), Separation::default());
    assert_close(&out.x, &[0.0; 5]);
    assert_eq!(out.depth, vec![0, 1, 2, 3, 4]);
}

#[test]
fn layout_never_overlaps_neighbours_on_a_level() {
    // An irregular tree that forces threads and subtree shifts.
    let parents = [0, 0, 0, 1, 1, 1, 3, 3, 2, 9, 9, 9, 12, 12, 4, 15];
    let tree = tree_from_parents(&parents);
    let sep = Separation::default();
    let out = layout(&tree, sep);

    let max_depth = out.depth.iter().copied().max().unwrap();
    for level in 0..=max_depth {
        let mut row: Vec<(usize, f64)> = (0..tree.node_count())
            .filter(|&i| out.depth[i] == level)
            .map(|i| (i, out.x[i]))
            .collect();
        row.sort_by(|a, b| a.1.total_cmp(&b.1));
        for pair in row.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let min = if tree.parent(a.0) == tree.parent(b.0) {
                sep.siblings
            } else {
                sep.cousins
            };
            assert!(
                b.1 - a.1 >= min - 1e-9,
                "level {level}: {a:?} and {b:?} closer than {min}"
            );
        }
    }

    for parent in 0..tree.node_count() {
        let kids = tree.children(parent);
        if let (Some(&first), Some(&last)) = (kids.first(), kids.last()) {
            let mid = (out.x[first] + out.x[last]) / 2.0;
            assert!((out.x[parent] - mid).abs() < 1e-9, "node {parent} not centered");
        }
    }
}

#[test]
fn layout_is_deterministic() {
    let tree = tree_from_parents(&[0, 0, 1, 1, 2, 2, 2, 5]);
    assert_eq!(
        layout(&tree, Separation::default()),
        layout(&tree, Separation::default())
    );
}
