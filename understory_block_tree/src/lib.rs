// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_block_tree --heading-base-level=0

//! Understory Block Tree: immutable snapshots of nestable block lists.
//!
//! A block list is a tree of *containers* (ordered slots) holding *blocks*, where a block may
//! in turn carry its own containers. This crate turns host data into an immutable
//! [`Snapshot`] of that tree and derives new snapshots through structural edits.
//!
//! - Builds snapshots from host data through pure accessors ([`TreeSource`]).
//! - Adds a synthetic placeholder as the last child of every container, so empty
//!   containers still have a drop zone.
//! - Derives edited snapshots: [`Snapshot::remove_items`], [`Snapshot::insert_dropzone`] and
//!   [`Snapshot::extract_subset`]. The source snapshot is never changed.
//!
//! ## Ids and identity
//!
//! Every item has an [`ItemId`] derived from its host key, so ids are stable across
//! rebuilds. [`TreeBuilder`] additionally caches item wrappers keyed by payload identity:
//! as long as the host hands back the same `Rc` allocation with the same options, the
//! rebuilt snapshot shares the wrapper, and `Rc::ptr_eq` tells a consumer nothing changed.
//!
//! ## Host edits
//!
//! The engine never mutates host data. Edits are requested through [`ReorderEvent`],
//! [`RemoveEvent`], [`InsertEvent`] and the clipboard events; the host applies them and
//! rebuilds.
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//! use understory_block_tree::{BlockOptions, Container, FnSource, ItemId, Place, TreeBuilder};
//!
//! struct Card {
//!     id: u32,
//! }
//!
//! let source = FnSource::new(
//!     |c: &Card| c.id,
//!     |_: &Card| Vec::<Container<u32, Card>>::new(),
//!     |_: &Card| BlockOptions::default(),
//! );
//! let root = Container::new(0).with_blocks(vec![
//!     Rc::new(Card { id: 1 }),
//!     Rc::new(Card { id: 2 }),
//! ]);
//!
//! let mut builder = TreeBuilder::new();
//! let tree = builder.build(&root, &source);
//! assert_eq!(
//!     tree.child_ids(tree.root_id()),
//!     &[ItemId::Block(1), ItemId::Block(2), ItemId::Placeholder(0)]
//! );
//!
//! // Preview a drop before block 1.
//! let preview = tree.insert_dropzone(&Place::before(0, 1), 40.0);
//! assert_eq!(preview.child_ids(preview.root_id())[0], ItemId::Gap);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod builder;
mod events;
mod snapshot;
mod types;

pub use builder::{Container, FnSource, TreeBuilder, TreeSource};
pub use events::{
    ClipboardHandle, CopyEvent, CutEvent, InsertEvent, PasteEvent, RemoveEvent, ReorderEvent,
};
pub use snapshot::{DepthFirst, Snapshot};
pub use types::{
    BlockItem, BlockKey, BlockOptions, ContainerItem, GapItem, Item, ItemId, ItemKind, Place,
    PlaceholderItem, Tag, TagSet,
};
