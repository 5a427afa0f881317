// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_selection --heading-base-level=0

//! Understory Selection: click-driven multi-selection over block trees.
//!
//! - [`update_selection`] is the pure core: previous selection + click → next selection,
//!   for each [`SelectionMode`].
//! - [`normalize`] removes blocks already covered by a selected ancestor, so moving or
//!   deleting a selection never touches a subtree twice.
//! - [`SelectionState`] holds the selection between clicks, tracks the range anchor,
//!   and orders the two halves of a click (press and release) so a drag can start from
//!   inside a multi-selection without collapsing it.
//! - [`SelectionMode::from_modifiers`] maps held [`Modifiers`] to a mode.
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//! use understory_block_tree::{BlockOptions, Container, FnSource, Snapshot};
//! use understory_selection::{Modifiers, SelectionMode, SelectionOptions, SelectionState};
//!
//! let source = FnSource::new(
//!     |k: &u32| *k,
//!     |_: &u32| Vec::<Container<u32, u32>>::new(),
//!     |_: &u32| BlockOptions::default(),
//! );
//! let root = Container::new(0).with_blocks((1..=5_u32).map(Rc::new).collect());
//! let tree = Snapshot::create(&root, &source);
//!
//! let options = SelectionOptions::default();
//! let mut selection = SelectionState::new();
//! selection.press(&tree, &2, SelectionMode::from_modifiers(Modifiers::empty(), &options));
//! selection.release();
//! selection.press(&tree, &4, SelectionMode::from_modifiers(Modifiers::SHIFT, &options));
//! assert_eq!(selection.selected(), &[2, 3, 4]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod mode;
mod state;
mod update;

pub use mode::{Modifiers, SelectionMode, SelectionOptions};
pub use state::{SelectionEvent, SelectionState};
pub use update::{Selection, SelectionUpdate, normalize, update_selection};
