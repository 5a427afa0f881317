// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for selection normalization and range selection.
//!
//! 1. A normalized selection never holds an ancestor together with its descendant.
//! 2. Normalization only drops keys inside a kept key, and keeps the rest once, in order.
//! 3. No sequence of clicks selects a block together with its ancestor.
//! 4. Range selection across two different containers leaves the selection unchanged.

use std::rc::Rc;

use proptest::prelude::*;
use understory_block_tree::{BlockOptions, Container, FnSource, Snapshot};
use understory_selection::{SelectionMode, normalize, update_selection};

#[derive(Debug)]
struct Node {
    id: u32,
    kids: Vec<Rc<Node>>,
}

/// Three root blocks with three children each: 1 → [11, 12, 13], 2 → [21, ..], 3 → [31, ..].
fn tree() -> Snapshot<u32, Node> {
    let roots = (1..=3)
        .map(|i| {
            Rc::new(Node {
                id: i,
                kids: (1..=3)
                    .map(|j| {
                        Rc::new(Node {
                            id: i * 10 + j,
                            kids: Vec::new(),
                        })
                    })
                    .collect(),
            })
        })
        .collect();
    let source = FnSource::new(
        |n: &Node| n.id,
        |n: &Node| {
            if n.kids.is_empty() {
                Vec::new()
            } else {
                vec![Container::new(n.id * 100).with_blocks(n.kids.clone())]
            }
        },
        |_: &Node| BlockOptions::default(),
    );
    Snapshot::create(&Container::new(0).with_blocks(roots), &source)
}

fn keys() -> impl Strategy<Value = Vec<u32>> {
    // j == 0 picks the root block itself, otherwise one of its children.
    let key = (1_u32..=3, 0_u32..=3).prop_map(|(i, j)| if j == 0 { i } else { i * 10 + j });
    proptest::collection::vec(key, 0..10)
}

proptest! {
    #[test]
    fn normalized_selection_has_no_nested_pairs(selected in keys()) {
        let tree = tree();
        let normalized = normalize(&tree, &selected);
        for a in &normalized {
            for b in &normalized {
                if a != b {
                    prop_assert!(!tree.contains_block(a, b), "{} contains {}", a, b);
                }
            }
        }
    }

    #[test]
    fn normalization_only_drops_covered_keys(selected in keys()) {
        let tree = tree();
        let normalized = normalize(&tree, &selected);
        // Output is a duplicate-free subset of the input, in input order.
        let positions: Vec<usize> = normalized
            .iter()
            .map(|key| selected.iter().position(|k| k == key))
            .collect::<Option<_>>()
            .expect("every normalized key comes from the input");
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]), "{:?}", normalized);
        // A key is dropped only when a kept key contains it.
        for key in &selected {
            if !normalized.contains(key) {
                prop_assert!(
                    normalized.iter().any(|kept| tree.contains_block(kept, key)),
                    "{} dropped without a selected ancestor",
                    key
                );
            }
        }
    }

    #[test]
    fn clicks_never_select_nested_pairs(clicks in keys(), toggles in any::<u16>()) {
        let tree = tree();
        let mut selected: Vec<u32> = Vec::new();
        for (i, key) in clicks.iter().enumerate() {
            let mode = if toggles & (1 << i) != 0 { SelectionMode::Toggle } else { SelectionMode::Set };
            selected = update_selection(&tree, &selected, None, key, mode).immediate;
            for a in &selected {
                for b in &selected {
                    prop_assert!(a == b || !tree.contains_block(a, b), "{:?}", selected);
                }
            }
        }
    }

    #[test]
    fn cross_parent_range_is_rejected(i in 1_u32..=3, j in 1_u32..=3, a in 1_u32..=3, b in 1_u32..=3) {
        prop_assume!(i != j);
        let tree = tree();
        let anchor = i * 10 + a;
        let clicked = j * 10 + b;
        let prev = vec![anchor];
        let update = update_selection(&tree, &prev, None, &clicked, SelectionMode::Range);
        prop_assert_eq!(update.immediate, prev);
    }
}
