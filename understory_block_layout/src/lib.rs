// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_block_layout --heading-base-level=0

//! Understory Block Layout: vertical layout of block tree snapshots.
//!
//! Given a [`Snapshot`](understory_block_tree::Snapshot) and per-item [`Measurement`]s, this
//! crate computes the absolute rectangle of every item in a virtual coordinate space: the
//! root spans a fixed width and the height accumulates top to bottom.
//!
//! Measurements describe only an item's *frame*: the margin between its outer box and the
//! box holding its children. The layout pass stacks children inside that frame, so a
//! hypothetical tree (with blocks removed, or a drop gap spliced in) can be laid out
//! without rendering it first.
//!
//! - [`calculate_layout`] runs the pass.
//! - [`Measure`] is the measurement source; [`GeometryCache`] is the usual one, fed by the
//!   renderer. [`Fallback`] chains two sources.
//! - [`Measurement::from_boxes`] derives a measurement from raw element boxes.
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//! use understory_block_layout::{GeometryCache, LayoutOptions, Measurement, calculate_layout};
//! use understory_block_tree::{BlockOptions, Container, FnSource, ItemId, Snapshot};
//!
//! let source = FnSource::new(
//!     |k: &u32| *k,
//!     |_: &u32| Vec::<Container<u32, u32>>::new(),
//!     |_: &u32| BlockOptions::default(),
//! );
//! let root = Container::new(0).with_blocks(vec![Rc::new(1_u32), Rc::new(2_u32)]);
//! let tree = Snapshot::create(&root, &source);
//!
//! let mut cache = GeometryCache::new();
//! cache.set(ItemId::Block(1), Measurement::leaf(40.0));
//! cache.set(ItemId::Block(2), Measurement::leaf(40.0));
//!
//! let layout = calculate_layout(&tree, &cache, &LayoutOptions::with_width(300.0));
//! assert_eq!(layout.top(&ItemId::Block(2)), Some(52.0));
//! assert_eq!(layout.height(), 92.0);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod layout;
mod measure;

pub use layout::{DEFAULT_SPACING, Layout, LayoutOptions, calculate_layout};
pub use measure::{Fallback, GeometryCache, Measure, MeasureFn, Measurement};
