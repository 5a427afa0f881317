// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_flip --heading-base-level=0

//! Understory FLIP: animated transitions between block tree snapshots.
//!
//! FLIP is First, Last, Invert, Play: measure where items are, switch to the new
//! tree, measure again, displace every item back to where it was, then let it slide
//! to its new position. Only a translation is animated; layout never runs mid-flight.
//!
//! - [`calculate_transitions`] is the pure part. Given the previous and next layouts
//!   it returns two style maps: `invert` (displaced, not transitioning) and `play`
//!   (at rest, transitioning). Deltas compose through nesting, so a child that moves
//!   with its parent has a zero delta of its own.
//! - [`Animator`] sequences the steps. It hands the host [`Schedule`]s to run as
//!   timers and advances one [`Checkpoint`] per fired timer. A new update cancels the
//!   running sequence by invalidating its [`SequenceToken`].
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//! use kurbo::Vec2;
//! use understory_block_layout::{GeometryCache, LayoutOptions, Measurement};
//! use understory_block_tree::{BlockOptions, Container, FnSource, ItemId, TreeBuilder};
//! use understory_flip::{AnimationOptions, Animator};
//!
//! let source = FnSource::new(
//!     |k: &u32| *k,
//!     |_: &u32| Vec::<Container<u32, u32>>::new(),
//!     |_: &u32| BlockOptions::default(),
//! );
//! let mut builder = TreeBuilder::new();
//! let before = builder.build(&Container::new(0).with_blocks(vec![Rc::new(1), Rc::new(2)]), &source);
//! let after = builder.build(&Container::new(0).with_blocks(vec![Rc::new(2), Rc::new(1)]), &source);
//!
//! let mut cache = GeometryCache::new();
//! cache.set(ItemId::Block(1), Measurement::leaf(30.0));
//! cache.set(ItemId::Block(2), Measurement::leaf(30.0));
//!
//! let options = AnimationOptions {
//!     layout: LayoutOptions::with_width(200.0),
//!     ..AnimationOptions::default()
//! };
//! let mut animator = Animator::new(before, options);
//! let mut timer = Some(animator.update(after));
//! let mut inverted = None;
//! while let Some(schedule) = timer {
//!     // A real host waits `schedule.delay()` here.
//!     timer = animator.advance(schedule.token, &cache);
//!     inverted = inverted.or_else(|| animator.style(&ItemId::Block(2)).copied());
//! }
//! // Block 2 started 42 px lower than where it ends up.
//! assert_eq!(inverted.map(|s| s.delta_position), Some(Vec2::new(0.0, 42.0)));
//! assert!(animator.styles().is_empty());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod animator;
mod transitions;

pub use animator::{AnimationOptions, Animator, Checkpoint, Schedule, SequenceToken};
pub use transitions::{AnimationState, Transitions, calculate_transitions};
