// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable tree snapshots and the structural edits that derive new ones.

use alloc::rc::Rc;
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};

use crate::types::{BlockItem, BlockKey, GapItem, Item, ItemId, Place};

/// An immutable snapshot of the block tree.
///
/// Items live in an id-indexed table; structure is a separate
/// parent → ordered children map plus a child → parent index. Snapshots are cheap
/// to clone: the tables are shared, and edits such as [`Snapshot::remove_items`]
/// or [`Snapshot::insert_dropzone`] return a new snapshot that only copies the
/// tables they change.
///
/// The root is always a container. Every container's last child is its
/// placeholder; a block's children are its containers.
pub struct Snapshot<K, T> {
    root_key: K,
    root: ItemId<K>,
    root_item: Rc<Item<K, T>>,
    items: Rc<HashMap<ItemId<K>, Rc<Item<K, T>>>>,
    children: Rc<HashMap<ItemId<K>, Vec<ItemId<K>>>>,
    parents: Rc<HashMap<ItemId<K>, ItemId<K>>>,
    generation: u64,
}

impl<K: Clone, T> Clone for Snapshot<K, T> {
    fn clone(&self) -> Self {
        Self {
            root_key: self.root_key.clone(),
            root: self.root.clone(),
            root_item: Rc::clone(&self.root_item),
            items: Rc::clone(&self.items),
            children: Rc::clone(&self.children),
            parents: Rc::clone(&self.parents),
            generation: self.generation,
        }
    }
}

impl<K: core::fmt::Debug, T> core::fmt::Debug for Snapshot<K, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Snapshot")
            .field("root", &self.root)
            .field("items", &self.items.len())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl<K: BlockKey, T> Snapshot<K, T> {
    pub(crate) fn from_parts(
        root_key: K,
        root_item: Rc<Item<K, T>>,
        items: HashMap<ItemId<K>, Rc<Item<K, T>>>,
        children: HashMap<ItemId<K>, Vec<ItemId<K>>>,
        generation: u64,
    ) -> Self {
        let mut parents = HashMap::with_capacity(items.len());
        for (parent, kids) in &children {
            for kid in kids {
                parents.insert(kid.clone(), parent.clone());
            }
        }
        let root = ItemId::Container(root_key.clone());
        Self {
            root_key,
            root,
            root_item,
            items: Rc::new(items),
            children: Rc::new(children),
            parents: Rc::new(parents),
            generation,
        }
    }

    /// Id of the root container.
    pub fn root_id(&self) -> &ItemId<K> {
        &self.root
    }

    /// Key of the root container.
    pub fn root_key(&self) -> &K {
        &self.root_key
    }

    /// The root container item.
    pub fn root(&self) -> &Item<K, T> {
        &self.root_item
    }

    /// Build counter of the [`TreeBuilder`](crate::TreeBuilder) that produced this
    /// snapshot. Snapshots derived through edits keep their source's generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of items in the item table, including detached ones.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the item table is empty. Built snapshots always hold a root.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by id.
    pub fn item(&self, id: &ItemId<K>) -> Option<&Item<K, T>> {
        self.items.get(id).map(|item| &**item)
    }

    /// Look up the shared wrapper of an item.
    ///
    /// Wrappers are reused across rebuilds while the host payload is unchanged, so
    /// `Rc::ptr_eq` on two wrappers answers "did this item change".
    pub fn item_rc(&self, id: &ItemId<K>) -> Option<&Rc<Item<K, T>>> {
        self.items.get(id)
    }

    /// Returns `true` if `id` is reachable from the root.
    pub fn contains(&self, id: &ItemId<K>) -> bool {
        let mut current = id;
        loop {
            if *current == self.root {
                return true;
            }
            match self.parents.get(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Look up a block by its host key.
    pub fn find_block(&self, key: &K) -> Option<&BlockItem<K, T>> {
        self.item(&ItemId::Block(key.clone()))
            .and_then(Item::as_block)
    }

    /// Ordered child ids of `id`, or an empty slice for leaves and unknown ids.
    pub fn child_ids(&self, id: &ItemId<K>) -> &[ItemId<K>] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ordered children of `id`.
    pub fn children<'a>(
        &'a self,
        id: &ItemId<K>,
    ) -> impl Iterator<Item = &'a Item<K, T>> + use<'a, K, T> {
        self.child_ids(id)
            .iter()
            .filter_map(move |child| self.items.get(child).map(|item| &**item))
    }

    /// Parent of `id`, or `None` for the root and for detached ids.
    pub fn parent_of(&self, id: &ItemId<K>) -> Option<&ItemId<K>> {
        self.parents.get(id)
    }

    /// Key of the container holding the block `key`.
    pub fn parent_container(&self, key: &K) -> Option<&K> {
        match self.parent_of(&ItemId::Block(key.clone())) {
            Some(ItemId::Container(parent)) => Some(parent),
            _ => None,
        }
    }

    /// Returns `true` if `descendant` is `ancestor` or lies anywhere below it.
    pub fn contains_descendant(&self, ancestor: &ItemId<K>, descendant: &ItemId<K>) -> bool {
        if ancestor == descendant {
            return true;
        }
        let mut stack: Vec<&ItemId<K>> = self.child_ids(ancestor).iter().collect();
        while let Some(id) = stack.pop() {
            if id == descendant {
                return true;
            }
            stack.extend(self.child_ids(id));
        }
        false
    }

    /// Block flavor of [`Snapshot::contains_descendant`].
    pub fn contains_block(&self, ancestor: &K, descendant: &K) -> bool {
        self.contains_descendant(
            &ItemId::Block(ancestor.clone()),
            &ItemId::Block(descendant.clone()),
        )
    }

    /// Document-order traversal from the root, yielding each id with its depth.
    pub fn depth_first(&self) -> DepthFirst<'_, K, T> {
        DepthFirst {
            snapshot: self,
            stack: alloc::vec![(&self.root, 0)],
        }
    }

    /// Blocks reachable from the root, in document order.
    pub fn blocks(&self) -> impl Iterator<Item = &BlockItem<K, T>> + '_ {
        self.depth_first()
            .filter_map(move |(id, _)| self.item(id).and_then(Item::as_block))
    }

    /// The slot directly after the block `key`: before its next sibling block, or
    /// appended to its container when it is the last block.
    pub fn place_after(&self, key: &K) -> Option<Place<K>> {
        let id = ItemId::Block(key.clone());
        let parent = self.parent_container(key)?.clone();
        let siblings = self.child_ids(&ItemId::Container(parent.clone()));
        let index = siblings.iter().position(|s| *s == id)?;
        let before = siblings[index + 1..]
            .iter()
            .find_map(|s| s.block_key().cloned());
        Some(Place { parent, before })
    }

    /// Remove `ids` from their parents' child lists.
    ///
    /// Removal is shallow: the removed items' own subtrees are not reparented, they
    /// simply become unreachable. Moving a block therefore always moves its whole
    /// subtree.
    pub fn remove_items<I>(&self, ids: I) -> Self
    where
        I: IntoIterator<Item = ItemId<K>>,
    {
        let removed: HashSet<ItemId<K>> = ids.into_iter().collect();
        if removed.is_empty() {
            return self.clone();
        }
        let children = self
            .children
            .iter()
            .map(|(id, kids)| {
                let kept = kids
                    .iter()
                    .filter(|kid| !removed.contains(*kid))
                    .cloned()
                    .collect();
                (id.clone(), kept)
            })
            .collect();
        let mut parents = (*self.parents).clone();
        parents.retain(|id, _| !removed.contains(id));
        Self {
            root_key: self.root_key.clone(),
            root: self.root.clone(),
            root_item: Rc::clone(&self.root_item),
            items: Rc::clone(&self.items),
            children: Rc::new(children),
            parents: Rc::new(parents),
            generation: self.generation,
        }
    }

    /// Block flavor of [`Snapshot::remove_items`].
    pub fn remove_blocks<'a, I>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        self.remove_items(keys.into_iter().cloned().map(ItemId::Block))
    }

    /// Splice a [`GapItem`] of `height` into the slot addressed by `place`.
    ///
    /// Any existing gap is moved rather than duplicated. An unknown parent leaves
    /// the snapshot unchanged; an unknown `before` key appends.
    pub fn insert_dropzone(&self, place: &Place<K>, height: f64) -> Self {
        let parent = ItemId::Container(place.parent.clone());
        if !self.children.contains_key(&parent) {
            return self.clone();
        }
        let base = if self.parents.contains_key(&ItemId::Gap) {
            self.remove_items([ItemId::Gap])
        } else {
            self.clone()
        };

        let mut children = (*base.children).clone();
        let Some(siblings) = children.get_mut(&parent) else {
            return self.clone();
        };
        let anchor = match &place.before {
            Some(key) => ItemId::Block(key.clone()),
            None => ItemId::Placeholder(place.parent.clone()),
        };
        let index = siblings
            .iter()
            .position(|id| *id == anchor)
            .or_else(|| siblings.iter().position(ItemId::is_placeholder))
            .unwrap_or(siblings.len());
        let before = siblings.get(index).cloned().unwrap_or(anchor);
        siblings.insert(index, ItemId::Gap);

        let mut items = (*base.items).clone();
        items.insert(ItemId::Gap, Rc::new(Item::Gap(GapItem { before, height })));
        let mut parents = (*base.parents).clone();
        parents.insert(ItemId::Gap, parent);

        Self {
            root_key: self.root_key.clone(),
            root: self.root.clone(),
            root_item: Rc::clone(&self.root_item),
            items: Rc::new(items),
            children: Rc::new(children),
            parents: Rc::new(parents),
            generation: self.generation,
        }
    }

    /// A snapshot whose root's children are exactly `ids`, in the given order.
    ///
    /// The extracted items keep their own subtrees and are detached from their
    /// previous parents, so every id still has a single parent. Unknown ids are
    /// skipped. Used to render an isolated drag preview.
    pub fn extract_subset<I>(&self, ids: I) -> Self
    where
        I: IntoIterator<Item = ItemId<K>>,
    {
        let mut seen = HashSet::new();
        let picked: Vec<ItemId<K>> = ids
            .into_iter()
            .filter(|id| *id != self.root && self.items.contains_key(id))
            .filter(|id| seen.insert(id.clone()))
            .collect();
        let detached = self.remove_items(picked.iter().cloned());

        let mut children = (*detached.children).clone();
        children.insert(self.root.clone(), picked.clone());
        let mut parents = (*detached.parents).clone();
        // The root's previous children are no longer reachable through it.
        for old in self.child_ids(&self.root) {
            parents.remove(old);
        }
        for id in picked {
            parents.insert(id, self.root.clone());
        }

        Self {
            root_key: self.root_key.clone(),
            root: self.root.clone(),
            root_item: Rc::clone(&self.root_item),
            items: Rc::clone(&self.items),
            children: Rc::new(children),
            parents: Rc::new(parents),
            generation: self.generation,
        }
    }

    /// Block flavor of [`Snapshot::extract_subset`].
    pub fn extract_blocks<'a, I>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        self.extract_subset(keys.into_iter().cloned().map(ItemId::Block))
    }
}

/// Iterator returned by [`Snapshot::depth_first`].
#[derive(Debug)]
pub struct DepthFirst<'a, K, T> {
    snapshot: &'a Snapshot<K, T>,
    stack: Vec<(&'a ItemId<K>, usize)>,
}

impl<'a, K: BlockKey, T> Iterator for DepthFirst<'a, K, T> {
    type Item = (&'a ItemId<K>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        // Reverse so children pop in document order.
        for child in self.snapshot.child_ids(id).iter().rev() {
            self.stack.push((child, depth + 1));
        }
        Some((id, depth))
    }
}
