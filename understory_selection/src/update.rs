// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pure selection updates and normalization.

use alloc::vec;
use alloc::vec::Vec;

use understory_block_tree::{BlockKey, ItemId, Place, Snapshot};

use crate::mode::SelectionMode;

/// What is selected: blocks, or a caret-style insertion slot.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection<K> {
    /// Selected block keys, in selection order.
    Blocks(Vec<K>),
    /// A caret between blocks.
    Place(Place<K>),
}

impl<K> Default for Selection<K> {
    fn default() -> Self {
        Self::Blocks(Vec::new())
    }
}

impl<K: PartialEq> Selection<K> {
    /// Selected block keys; empty for a place selection.
    pub fn blocks(&self) -> &[K] {
        match self {
            Self::Blocks(keys) => keys,
            Self::Place(_) => &[],
        }
    }

    /// The selected place, if any.
    pub fn place(&self) -> Option<&Place<K>> {
        match self {
            Self::Place(place) => Some(place),
            Self::Blocks(_) => None,
        }
    }

    /// Returns `true` if `key` is a selected block.
    pub fn contains(&self, key: &K) -> bool {
        self.blocks().contains(key)
    }

    /// Returns `true` when no block and no place is selected.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Blocks(keys) if keys.is_empty())
    }
}

/// Result of [`update_selection`].
///
/// `immediate` applies at press time. `deferred`, when present, replaces it on the
/// matching release, unless a drag started in between.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionUpdate<K> {
    /// Mode that produced this update.
    pub mode: SelectionMode,
    /// Selection to apply on press.
    pub immediate: Vec<K>,
    /// Selection to apply on release.
    pub deferred: Option<Vec<K>>,
}

/// Compute the selection after a click on `key`.
///
/// - [`SelectionMode::Set`]: `[key]`. When `key` is already selected the change is
///   deferred to the release, so pressing inside a multi-selection to drag it does
///   not collapse it.
/// - [`SelectionMode::Toggle`]: `key` is added or removed.
/// - [`SelectionMode::Range`]: the sibling run from `anchor` (or the first selected
///   key) to `key`, ordered from the anchor. Keys with different parents leave `prev`
///   unchanged.
/// - [`SelectionMode::Deselect`]: nothing.
///
/// Both results are [normalized](normalize): a block inside another selected
/// block is never selected alongside it.
pub fn update_selection<K: BlockKey, T>(
    tree: &Snapshot<K, T>,
    prev: &[K],
    anchor: Option<&K>,
    key: &K,
    mode: SelectionMode,
) -> SelectionUpdate<K> {
    let immediate = |keys: Vec<K>| SelectionUpdate {
        mode,
        immediate: normalize(tree, &keys),
        deferred: None,
    };
    match mode {
        SelectionMode::Set if prev.contains(key) => SelectionUpdate {
            mode,
            immediate: normalize(tree, prev),
            deferred: Some(vec![key.clone()]),
        },
        SelectionMode::Set => immediate(vec![key.clone()]),
        SelectionMode::Toggle => {
            let mut keys = prev.to_vec();
            match keys.iter().position(|k| k == key) {
                Some(index) => {
                    keys.remove(index);
                }
                None => keys.push(key.clone()),
            }
            immediate(keys)
        }
        SelectionMode::Range => {
            let Some(anchor) = anchor.or(prev.first()) else {
                return immediate(vec![key.clone()]);
            };
            immediate(range(tree, anchor, key).unwrap_or_else(|| prev.to_vec()))
        }
        SelectionMode::Deselect => immediate(Vec::new()),
    }
}

/// Sibling blocks from `anchor` to `key` inclusive, or `None` across parents.
fn range<K: BlockKey, T>(tree: &Snapshot<K, T>, anchor: &K, key: &K) -> Option<Vec<K>> {
    let parent = tree.parent_container(anchor)?;
    if tree.parent_container(key) != Some(parent) {
        return None;
    }
    let siblings: Vec<&K> = tree
        .child_ids(&ItemId::Container(parent.clone()))
        .iter()
        .filter_map(ItemId::block_key)
        .collect();
    let i = siblings.iter().position(|k| *k == anchor)?;
    let j = siblings.iter().position(|k| *k == key)?;
    let mut keys: Vec<K> = siblings[i.min(j)..=i.max(j)]
        .iter()
        .map(|k| (*k).clone())
        .collect();
    if i > j {
        keys.reverse();
    }
    Some(keys)
}

/// Drop every key whose block lies inside another selected block.
///
/// Moving or removing an ancestor already carries its descendants along. Order is
/// kept and duplicates collapse to their first occurrence.
pub fn normalize<K: BlockKey, T>(tree: &Snapshot<K, T>, keys: &[K]) -> Vec<K> {
    let mut out: Vec<K> = Vec::with_capacity(keys.len());
    for (i, key) in keys.iter().enumerate() {
        if keys[..i].contains(key) {
            continue;
        }
        let covered = keys
            .iter()
            .any(|other| other != key && tree.contains_block(other, key));
        if !covered {
            out.push(key.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use understory_block_tree::{BlockOptions, Container, FnSource, TreeBuilder};

    #[derive(Debug)]
    struct Node {
        key: &'static str,
        kids: Vec<Rc<Node>>,
    }

    fn node(key: &'static str, kids: Vec<Rc<Node>>) -> Rc<Node> {
        Rc::new(Node { key, kids })
    }

    /// root: [a, b (group: [b1, b2, b3]), c, d]
    fn tree() -> Snapshot<&'static str, Node> {
        let b = node(
            "b",
            vec![node("b1", vec![]), node("b2", vec![]), node("b3", vec![])],
        );
        let root = Container::new("root").with_blocks(vec![
            node("a", vec![]),
            b,
            node("c", vec![]),
            node("d", vec![]),
        ]);
        let source = FnSource::new(
            |n: &Node| n.key,
            |n: &Node| {
                if n.kids.is_empty() {
                    Vec::new()
                } else {
                    vec![Container::new("group").with_blocks(n.kids.clone())]
                }
            },
            |_: &Node| BlockOptions::default(),
        );
        TreeBuilder::new().build(&root, &source)
    }

    #[test]
    fn set_replaces() {
        let t = tree();
        let update = update_selection(&t, &["a", "c"], None, &"d", SelectionMode::Set);
        assert_eq!(update.immediate, vec!["d"]);
        assert_eq!(update.deferred, None);
    }

    #[test]
    fn set_inside_selection_defers() {
        let t = tree();
        let update = update_selection(&t, &["a", "c"], None, &"c", SelectionMode::Set);
        assert_eq!(update.immediate, vec!["a", "c"]);
        assert_eq!(update.deferred, Some(vec!["c"]));
    }

    #[test]
    fn toggle_is_xor() {
        let t = tree();
        let added = update_selection(&t, &["a"], None, &"c", SelectionMode::Toggle);
        assert_eq!(added.immediate, vec!["a", "c"]);
        let removed = update_selection(&t, &added.immediate, None, &"a", SelectionMode::Toggle);
        assert_eq!(removed.immediate, vec!["c"]);
    }

    #[test]
    fn range_runs_between_siblings() {
        let t = tree();
        let update = update_selection(&t, &["a"], None, &"c", SelectionMode::Range);
        assert_eq!(update.immediate, vec!["a", "b", "c"]);
        // Backwards from an explicit anchor.
        let update = update_selection(&t, &["d"], Some(&"d"), &"b", SelectionMode::Range);
        assert_eq!(update.immediate, vec!["d", "c", "b"]);
    }

    #[test]
    fn range_inside_nested_container() {
        let t = tree();
        let update = update_selection(&t, &["b3"], None, &"b1", SelectionMode::Range);
        assert_eq!(update.immediate, vec!["b3", "b2", "b1"]);
    }

    #[test]
    fn range_across_parents_is_rejected() {
        let t = tree();
        let update = update_selection(&t, &["a", "c"], None, &"b2", SelectionMode::Range);
        assert_eq!(update.immediate, vec!["a", "c"]);
    }

    #[test]
    fn range_without_anchor_selects_key() {
        let t = tree();
        let update = update_selection(&t, &[], None, &"c", SelectionMode::Range);
        assert_eq!(update.immediate, vec!["c"]);
    }

    #[test]
    fn deselect_clears() {
        let t = tree();
        let update = update_selection(&t, &["a"], None, &"a", SelectionMode::Deselect);
        assert!(update.immediate.is_empty());
    }

    #[test]
    fn toggling_a_descendant_keeps_the_ancestor_alone() {
        let t = tree();
        let update = update_selection(&t, &["b"], Some(&"b"), &"b2", SelectionMode::Toggle);
        assert_eq!(update.immediate, vec!["b"]);
        // Adding the ancestor later absorbs descendants picked before it.
        let update = update_selection(&t, &["b2", "a"], Some(&"a"), &"b", SelectionMode::Toggle);
        assert_eq!(update.immediate, vec!["a", "b"]);
    }

    #[test]
    fn normalize_keeps_ancestors_only() {
        let t = tree();
        assert_eq!(normalize(&t, &["b", "b2"]), vec!["b"]);
        assert_eq!(normalize(&t, &["b2", "b"]), vec!["b"]);
        assert_eq!(normalize(&t, &["b2", "a", "b3"]), vec!["b2", "a", "b3"]);
        assert_eq!(normalize(&t, &["a", "a"]), vec!["a"]);
    }

    #[test]
    fn selection_accessors() {
        let blocks = Selection::Blocks(vec!["a"]);
        assert!(blocks.contains(&"a"));
        assert_eq!(blocks.place(), None);
        let place = Selection::Place(Place::append("root"));
        assert!(place.blocks().is_empty());
        assert!(!place.is_empty());
        assert!(Selection::<&str>::default().is_empty());
    }
}
