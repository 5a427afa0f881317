// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Building snapshots from host data.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::mem;

use hashbrown::HashMap;

use crate::snapshot::Snapshot;
use crate::types::{
    BlockItem, BlockKey, BlockOptions, ContainerItem, Item, ItemId, PlaceholderItem,
};

/// A host container: an ordered list of block payloads.
#[derive(Debug)]
pub struct Container<K, T> {
    /// Host key of the container.
    pub key: K,
    /// Spacing, tag and accepted tags.
    pub options: BlockOptions,
    /// Block payloads, in order.
    pub blocks: Vec<Rc<T>>,
}

impl<K: Clone, T> Clone for Container<K, T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            options: self.options.clone(),
            blocks: self.blocks.clone(),
        }
    }
}

impl<K, T> Container<K, T> {
    /// An empty container with default options.
    pub fn new(key: K) -> Self {
        Self {
            key,
            options: BlockOptions::default(),
            blocks: Vec::new(),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: BlockOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the blocks.
    pub fn with_blocks(mut self, blocks: Vec<Rc<T>>) -> Self {
        self.blocks = blocks;
        self
    }
}

/// Accessors used to walk host data.
///
/// Implementations must be pure: the same payload yields the same key, options
/// and containers for the lifetime of a build.
pub trait TreeSource<K, T> {
    /// Stable key of `block`.
    fn key(&self, block: &T) -> K;
    /// Options of `block`.
    fn options(&self, block: &T) -> BlockOptions;
    /// Containers nested inside `block`.
    fn containers(&self, block: &T) -> Vec<Container<K, T>>;
}

/// A [`TreeSource`] made of closures.
#[derive(Clone, Debug)]
pub struct FnSource<KeyFn, ChildrenFn, OptionsFn> {
    key: KeyFn,
    children: ChildrenFn,
    options: OptionsFn,
}

impl<KeyFn, ChildrenFn, OptionsFn> FnSource<KeyFn, ChildrenFn, OptionsFn> {
    /// Wrap the three accessors.
    pub fn new(key: KeyFn, children: ChildrenFn, options: OptionsFn) -> Self {
        Self {
            key,
            children,
            options,
        }
    }
}

impl<K, T, KeyFn, ChildrenFn, OptionsFn> TreeSource<K, T> for FnSource<KeyFn, ChildrenFn, OptionsFn>
where
    KeyFn: Fn(&T) -> K,
    ChildrenFn: Fn(&T) -> Vec<Container<K, T>>,
    OptionsFn: Fn(&T) -> BlockOptions,
{
    fn key(&self, block: &T) -> K {
        (self.key)(block)
    }

    fn options(&self, block: &T) -> BlockOptions {
        (self.options)(block)
    }

    fn containers(&self, block: &T) -> Vec<Container<K, T>> {
        (self.children)(block)
    }
}

/// Builds [`Snapshot`]s and caches item wrappers between builds.
///
/// A block's wrapper is reused when its payload is the same allocation
/// (`Rc::ptr_eq`) and its key and options are unchanged; containers are reused
/// when key and options match. Entries not visited by a build are dropped.
#[derive(Debug)]
pub struct TreeBuilder<K, T> {
    blocks: HashMap<*const T, Rc<Item<K, T>>>,
    containers: HashMap<K, Rc<Item<K, T>>>,
    generation: u64,
}

impl<K: BlockKey, T> Default for TreeBuilder<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: BlockKey, T> TreeBuilder<K, T> {
    /// A builder with an empty cache.
    pub fn new() -> Self {
        Self {
            blocks: HashMap::new(),
            containers: HashMap::new(),
            generation: 0,
        }
    }

    /// Number of builds performed so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drop all cached wrappers.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.containers.clear();
    }

    /// Walk the host data below `root` and produce a snapshot.
    ///
    /// Every container gets a trailing placeholder. A key seen twice is a host
    /// error: it trips a debug assertion and the repeated subtree is skipped.
    pub fn build<S>(&mut self, root: &Container<K, T>, source: &S) -> Snapshot<K, T>
    where
        S: TreeSource<K, T> + ?Sized,
    {
        self.generation += 1;
        let mut pass = BuildPass {
            source,
            old_blocks: mem::take(&mut self.blocks),
            old_containers: mem::take(&mut self.containers),
            blocks: HashMap::new(),
            containers: HashMap::new(),
            items: HashMap::new(),
            children: HashMap::new(),
        };
        pass.container(root);
        let root_item = pass.containers.get(&root.key).cloned().unwrap_or_else(|| {
            Rc::new(Item::Container(ContainerItem {
                key: root.key.clone(),
                options: root.options.clone(),
            }))
        });
        let BuildPass {
            blocks,
            containers,
            items,
            children,
            ..
        } = pass;
        self.blocks = blocks;
        self.containers = containers;
        Snapshot::from_parts(root.key.clone(), root_item, items, children, self.generation)
    }
}

impl<K: BlockKey, T> Snapshot<K, T> {
    /// Build a snapshot without keeping a cache around.
    pub fn create<S>(root: &Container<K, T>, source: &S) -> Self
    where
        S: TreeSource<K, T> + ?Sized,
    {
        TreeBuilder::new().build(root, source)
    }
}

struct BuildPass<'s, K, T, S: ?Sized> {
    source: &'s S,
    old_blocks: HashMap<*const T, Rc<Item<K, T>>>,
    old_containers: HashMap<K, Rc<Item<K, T>>>,
    blocks: HashMap<*const T, Rc<Item<K, T>>>,
    containers: HashMap<K, Rc<Item<K, T>>>,
    items: HashMap<ItemId<K>, Rc<Item<K, T>>>,
    children: HashMap<ItemId<K>, Vec<ItemId<K>>>,
}

impl<K: BlockKey, T, S: TreeSource<K, T> + ?Sized> BuildPass<'_, K, T, S> {
    fn container(&mut self, container: &Container<K, T>) -> Option<ItemId<K>> {
        let id = ItemId::Container(container.key.clone());
        if self.items.contains_key(&id) {
            debug_assert!(false, "duplicate container key {:?}", container.key);
            return None;
        }
        let item = match self.old_containers.remove(&container.key) {
            Some(cached)
                if cached
                    .as_container()
                    .is_some_and(|c| c.options == container.options) =>
            {
                cached
            }
            _ => Rc::new(Item::Container(ContainerItem {
                key: container.key.clone(),
                options: container.options.clone(),
            })),
        };
        self.containers
            .insert(container.key.clone(), Rc::clone(&item));
        self.items.insert(id.clone(), item);

        let mut kids = Vec::with_capacity(container.blocks.len() + 1);
        for block in &container.blocks {
            if let Some(kid) = self.block(block) {
                kids.push(kid);
            }
        }
        let placeholder = ItemId::Placeholder(container.key.clone());
        self.items.insert(
            placeholder.clone(),
            Rc::new(Item::Placeholder(PlaceholderItem {
                parent: container.key.clone(),
            })),
        );
        kids.push(placeholder);
        self.children.insert(id.clone(), kids);
        Some(id)
    }

    fn block(&mut self, payload: &Rc<T>) -> Option<ItemId<K>> {
        let key = self.source.key(payload);
        let id = ItemId::Block(key.clone());
        if self.items.contains_key(&id) {
            debug_assert!(false, "duplicate block key {key:?}");
            return None;
        }
        let options = self.source.options(payload);
        let ptr = Rc::as_ptr(payload);
        let item = match self.old_blocks.remove(&ptr) {
            Some(cached)
                if cached
                    .as_block()
                    .is_some_and(|b| b.key == key && b.options == options) =>
            {
                cached
            }
            _ => Rc::new(Item::Block(BlockItem {
                key,
                options,
                block: Rc::clone(payload),
            })),
        };
        self.blocks.insert(ptr, Rc::clone(&item));
        // Registered before descending so a cycle ends at the duplicate check.
        self.items.insert(id.clone(), item);

        let kids: Vec<_> = self
            .source
            .containers(payload)
            .iter()
            .filter_map(|c| self.container(c))
            .collect();
        self.children.insert(id.clone(), kids);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[derive(Debug)]
    struct Note {
        id: u32,
        tag: Option<&'static str>,
    }

    fn source() -> impl TreeSource<u32, Note> {
        FnSource::new(
            |n: &Note| n.id,
            |_: &Note| Vec::<Container<u32, Note>>::new(),
            |n: &Note| BlockOptions {
                tag: n.tag.map(Into::into),
                ..BlockOptions::default()
            },
        )
    }

    fn note(id: u32) -> Rc<Note> {
        Rc::new(Note { id, tag: None })
    }

    #[test]
    fn unchanged_payloads_reuse_wrappers() {
        let (a, b) = (note(1), note(2));
        let mut builder = TreeBuilder::new();
        let root = Container::new(0).with_blocks(vec![a.clone(), b.clone()]);
        let first = builder.build(&root, &source());

        let b2 = note(2);
        let root = Container::new(0).with_blocks(vec![b2.clone(), a.clone()]);
        let second = builder.build(&root, &source());

        let wrapper = |s: &Snapshot<u32, Note>, k| s.item_rc(&ItemId::Block(k)).cloned();
        assert!(Rc::ptr_eq(
            &wrapper(&first, 1).unwrap(),
            &wrapper(&second, 1).unwrap()
        ));
        // Same key, new allocation: a fresh wrapper.
        assert!(!Rc::ptr_eq(
            &wrapper(&first, 2).unwrap(),
            &wrapper(&second, 2).unwrap()
        ));
        assert!(Rc::ptr_eq(&second.find_block(&2).unwrap().block, &b2));
    }

    #[test]
    fn changed_options_invalidate_wrappers() {
        let a = note(1);
        let mut builder = TreeBuilder::new();
        let root = Container::new(0).with_blocks(vec![a.clone()]);
        let first = builder.build(&root, &source());
        let root = Container::new(0)
            .with_options(BlockOptions::new().with_spacing(4.0))
            .with_blocks(vec![a.clone()]);
        let second = builder.build(&root, &source());
        assert!(!Rc::ptr_eq(
            first.item_rc(&ItemId::Container(0)).unwrap(),
            second.item_rc(&ItemId::Container(0)).unwrap()
        ));
        // The block wrapper itself survives.
        assert!(Rc::ptr_eq(
            first.item_rc(&ItemId::Block(1)).unwrap(),
            second.item_rc(&ItemId::Block(1)).unwrap()
        ));
    }

    #[test]
    fn generation_counts_builds() {
        let mut builder = TreeBuilder::<u32, Note>::new();
        let root = Container::new(0);
        assert_eq!(builder.build(&root, &source()).generation(), 1);
        assert_eq!(builder.build(&root, &source()).generation(), 2);
        assert_eq!(builder.generation(), 2);
    }

    #[test]
    fn empty_root_still_has_placeholder() {
        let tree = Snapshot::create(&Container::<u32, Note>::new(0), &source());
        assert_eq!(tree.child_ids(tree.root_id()), &[ItemId::Placeholder(0)]);
        assert_eq!(tree.blocks().count(), 0);
    }

    #[test]
    fn options_come_from_the_source() {
        let tagged = Rc::new(Note {
            id: 5,
            tag: Some("item"),
        });
        let tree = Snapshot::create(&Container::new(0).with_blocks(vec![tagged]), &source());
        assert_eq!(
            tree.find_block(&5).and_then(|b| b.options.tag.as_ref()).map(|t| t.as_str()),
            Some("item")
        );
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "duplicate block key")]
    fn duplicate_keys_trip_in_debug() {
        let root = Container::new(0).with_blocks(vec![note(1), note(1)]);
        let _ = Snapshot::create(&root, &source());
    }
}
