// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_block_list --heading-base-level=0

//! Understory Block List: a headless engine for nestable, reorderable block lists.
//!
//! [`BlockList`] wires the Understory block crates together behind one input surface:
//!
//! - [`understory_block_tree`] turns host data into immutable snapshots;
//! - [`understory_block_layout`] places them using renderer measurements;
//! - [`understory_selection`] resolves clicks into selections;
//! - [`understory_dnd`] turns pointer drags into reorders;
//! - [`understory_flip`] animates between successive views.
//!
//! The engine renders nothing and never edits host data. Input handlers return
//! [`BlockListEvent`]s describing what the host should do.
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//! use kurbo::Point;
//! use understory_block_layout::Measurement;
//! use understory_block_list::{BlockList, BlockListEvent, BlockListOptions};
//! use understory_block_tree::{BlockOptions, Container, FnSource, ItemId, Place};
//! use understory_selection::Modifiers;
//!
//! let source = FnSource::new(
//!     |k: &char| *k,
//!     |_: &char| Vec::<Container<char, char>>::new(),
//!     |_: &char| BlockOptions::default(),
//! );
//! let root = Container::new('r').with_blocks(vec![Rc::new('a'), Rc::new('b'), Rc::new('c')]);
//! let mut list = BlockList::new(&root, &source, BlockListOptions::with_width(300.0));
//! for key in ['a', 'b', 'c'] {
//!     list.geometry_mut().set(ItemId::Block(key), Measurement::leaf(40.0));
//! }
//!
//! list.pointer_down('a', Point::new(10.0, 20.0), Modifiers::empty());
//! list.pointer_move(Point::new(10.0, 70.0));
//! let events = list.pointer_up();
//! let Some(BlockListEvent::Reorder(reorder)) = events.first() else {
//!     panic!("expected a reorder");
//! };
//! assert_eq!(reorder.keys, vec!['a']);
//! assert_eq!(reorder.place, Place::before('r', 'c'));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod block_list;
mod events;
mod options;

pub use block_list::BlockList;
pub use events::{BlockListEvent, Key};
pub use options::BlockListOptions;
