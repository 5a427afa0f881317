// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_dnd --heading-base-level=0

//! Understory DnD: drag-and-drop reordering for block trees.
//!
//! Two layers:
//!
//! - [`insertion_points`] and [`resolve_insertion`] are pure functions. The first
//!   lists every legal drop slot for a set of tags, the second picks the slot under a
//!   dragged preview.
//! - [`DragController`] is the pointer state machine: press, threshold, drag, drop or
//!   cancel. It reads the tree, the selection and measurements through a
//!   [`DragContext`] passed to each call, and reports a finished drop as a
//!   [`ReorderEvent`](understory_block_tree::ReorderEvent).
//!
//! ## Drop slots
//!
//! A slot means "insert before this block", or "append" for a container's
//! placeholder. A container offers slots to a drag only when it accepts every tag
//! carried by the dragged blocks; fixed containers offer none. Slots are computed on
//! the tree with the dragged blocks removed, so a block can never be dropped into
//! itself.
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//! use kurbo::Point;
//! use understory_block_layout::{GeometryCache, LayoutOptions, Measurement};
//! use understory_block_tree::{BlockOptions, Container, FnSource, ItemId, Place, TreeBuilder};
//! use understory_dnd::{DragContext, DragController, MoveResult};
//!
//! let source = FnSource::new(
//!     |k: &char| *k,
//!     |_: &char| Vec::<Container<char, char>>::new(),
//!     |_: &char| BlockOptions::default(),
//! );
//! let root = Container::new('r').with_blocks(vec![Rc::new('a'), Rc::new('b'), Rc::new('c')]);
//! let tree = TreeBuilder::new().build(&root, &source);
//!
//! let mut cache = GeometryCache::new();
//! for key in ['a', 'b', 'c'] {
//!     cache.set(ItemId::Block(key), Measurement::leaf(40.0));
//! }
//! let layout = LayoutOptions::with_width(300.0);
//! let ctx = DragContext::new(&tree, &cache, &layout);
//!
//! let mut drag = DragController::default();
//! drag.on_down('a', Point::new(10.0, 20.0));
//! assert_eq!(drag.on_move(ctx, Point::new(10.0, 70.0)), MoveResult::Started);
//!
//! let reorder = drag.on_up(ctx).unwrap();
//! assert_eq!(reorder.keys, vec!['a']);
//! assert_eq!(reorder.place, Place::before('r', 'c'));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod controller;
mod insertion;

pub use controller::{
    DEFAULT_DRAG_RADIUS, DEFAULT_DRAG_THRESHOLD, DragContext, DragController, DragOptions,
    DragState, MoveResult, insertion_index,
};
pub use insertion::{InsertionPoint, insertion_points, resolve_insertion};
