// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The timer-driven FLIP sequence.
//!
//! Each tree update starts a sequence of four checkpoints. The host runs a timer
//! for every [`Schedule`] it is handed and calls [`Animator::advance`] when it
//! fires, after re-measuring whatever the previous step changed on screen:
//!
//! | Checkpoint | Delay | Step |
//! |------------|-------|------|
//! | [`First`](Checkpoint::First) | 0 | measure the old tree, show the new one |
//! | [`Last`](Checkpoint::Last) | 0 | measure the new tree, apply `invert` |
//! | [`Play`](Checkpoint::Play) | settle delay | apply `play` |
//! | [`Cleanup`](Checkpoint::Cleanup) | duration + slack | clear all styles |
//!
//! Starting a new sequence invalidates the previous one's token, so timers that
//! were already scheduled for it fire into nothing.

use core::time::Duration;

use hashbrown::HashMap;
use understory_block_layout::{
    Fallback, GeometryCache, Layout, LayoutOptions, Measure, calculate_layout,
};
use understory_block_tree::{BlockKey, ItemId, Snapshot};

use crate::transitions::{AnimationState, calculate_transitions};

/// Timing of the settle sequence.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationOptions {
    /// Length of the `play` transition.
    pub transition_duration_ms: u64,
    /// Pause between applying `invert` and `play`, so the inverted frame is drawn.
    pub settle_delay_ms: u64,
    /// Extra time after the transition before styles are cleared.
    pub cleanup_slack_ms: u64,
    /// Layout used to place both trees.
    pub layout: LayoutOptions,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            transition_duration_ms: 200,
            settle_delay_ms: 10,
            cleanup_slack_ms: 100,
            layout: LayoutOptions::default(),
        }
    }
}

/// A step of the settle sequence. Named after the step that runs when its timer fires.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Checkpoint {
    /// Measure the previous tree and swap in the next one.
    First,
    /// Measure the next tree and displace items back to where they were.
    Last,
    /// Release items towards their new positions.
    Play,
    /// Drop all transient styles.
    Cleanup,
}

/// Identifies one run of the sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SequenceToken(u64);

/// A timer the host should start.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Schedule {
    /// Pass back to [`Animator::advance`].
    pub token: SequenceToken,
    /// The step that will run.
    pub checkpoint: Checkpoint,
    /// How long to wait, in milliseconds. Zero means "next tick".
    pub delay_ms: u64,
}

impl Schedule {
    /// The delay as a [`Duration`].
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug)]
struct Sequence<K, T> {
    token: SequenceToken,
    checkpoint: Checkpoint,
    prev: Snapshot<K, T>,
    next: Snapshot<K, T>,
    on_screen: Option<Layout<K>>,
    first: GeometryCache<K>,
    play: HashMap<ItemId<K>, AnimationState>,
}

/// Drives FLIP transitions between successive trees.
///
/// The animator owns the tree that should be on screen, which lags the latest
/// input by one checkpoint, and the per-item styles to draw it with.
#[derive(Debug)]
pub struct Animator<K, T> {
    options: AnimationOptions,
    displayed: Snapshot<K, T>,
    committed: Snapshot<K, T>,
    styles: HashMap<ItemId<K>, AnimationState>,
    sequence: Option<Sequence<K, T>>,
    tokens: u64,
}

impl<K: BlockKey, T> Animator<K, T> {
    /// An animator showing `tree` at rest.
    pub fn new(tree: Snapshot<K, T>, options: AnimationOptions) -> Self {
        Self {
            options,
            displayed: tree.clone(),
            committed: tree,
            styles: HashMap::new(),
            sequence: None,
            tokens: 0,
        }
    }

    /// Current options.
    pub fn options(&self) -> &AnimationOptions {
        &self.options
    }

    /// Replace the options. A running sequence keeps its schedule but uses the new
    /// layout and durations from its next step on.
    pub fn set_options(&mut self, options: AnimationOptions) {
        self.options = options;
    }

    /// The tree to render.
    pub fn tree(&self) -> &Snapshot<K, T> {
        &self.displayed
    }

    /// The latest input tree.
    pub fn committed(&self) -> &Snapshot<K, T> {
        &self.committed
    }

    /// Transient styles of the displayed items. Items without an entry render at
    /// their layout position.
    pub fn styles(&self) -> &HashMap<ItemId<K>, AnimationState> {
        &self.styles
    }

    /// Style of one item.
    pub fn style(&self, id: &ItemId<K>) -> Option<&AnimationState> {
        self.styles.get(id)
    }

    /// Returns `true` while a sequence is running.
    pub fn is_animating(&self) -> bool {
        self.sequence.is_some()
    }

    /// The step the running sequence waits for.
    pub fn pending(&self) -> Option<Checkpoint> {
        self.sequence.as_ref().map(|s| s.checkpoint)
    }

    /// Animate to `next`. Cancels any running sequence.
    pub fn update(&mut self, next: Snapshot<K, T>) -> Schedule {
        self.start(next, None)
    }

    /// Animate to `next`, starting from the boxes items currently occupy on screen.
    ///
    /// Use this when items may still be displaced by an earlier transition.
    pub fn update_from(&mut self, next: Snapshot<K, T>, on_screen: Layout<K>) -> Schedule {
        self.start(next, Some(on_screen))
    }

    /// Stop any running sequence and show the latest tree at rest.
    ///
    /// Returns `true` if a sequence was running.
    pub fn cancel(&mut self) -> bool {
        let Some(_sequence) = self.sequence.take() else {
            return false;
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(token = _sequence.token.0, "flip sequence cancelled");
        self.styles.clear();
        self.displayed = self.committed.clone();
        true
    }

    /// Run the step `token` was scheduled for.
    ///
    /// `measure` must describe what is on screen right now. Returns the next timer
    /// to start, or `None` when the sequence is over or `token` is stale.
    pub fn advance<M>(&mut self, token: SequenceToken, measure: &M) -> Option<Schedule>
    where
        M: Measure<K> + ?Sized,
    {
        let sequence = self.sequence.as_mut().filter(|s| s.token == token)?;
        #[cfg(feature = "tracing")]
        tracing::trace!(token = token.0, checkpoint = ?sequence.checkpoint, "flip checkpoint");

        let (checkpoint, delay_ms) = match sequence.checkpoint {
            Checkpoint::First => {
                sequence.first = capture(&sequence.prev, measure);
                self.displayed = sequence.next.clone();
                (Checkpoint::Last, 0)
            }
            Checkpoint::Last => {
                let last = capture(&sequence.next, measure);
                let layout = &self.options.layout;
                let prev_layout = calculate_layout(
                    &sequence.prev,
                    &Fallback::new(&sequence.first, &last),
                    layout,
                );
                let next_layout = calculate_layout(
                    &sequence.next,
                    &Fallback::new(&last, &sequence.first),
                    layout,
                );
                let transitions = calculate_transitions(
                    &prev_layout,
                    &sequence.next,
                    &next_layout,
                    sequence.on_screen.as_ref(),
                );
                self.styles = transitions.invert;
                sequence.play = transitions.play;
                (Checkpoint::Play, self.options.settle_delay_ms)
            }
            Checkpoint::Play => {
                self.styles = core::mem::take(&mut sequence.play);
                (
                    Checkpoint::Cleanup,
                    self.options.transition_duration_ms + self.options.cleanup_slack_ms,
                )
            }
            Checkpoint::Cleanup => {
                self.styles.clear();
                self.sequence = None;
                return None;
            }
        };
        sequence.checkpoint = checkpoint;
        Some(Schedule {
            token,
            checkpoint,
            delay_ms,
        })
    }

    fn start(&mut self, next: Snapshot<K, T>, on_screen: Option<Layout<K>>) -> Schedule {
        #[cfg(feature = "tracing")]
        if let Some(running) = &self.sequence {
            tracing::debug!(token = running.token.0, "flip sequence superseded");
        }
        self.tokens += 1;
        let token = SequenceToken(self.tokens);
        let prev = core::mem::replace(&mut self.committed, next.clone());
        self.styles.clear();
        self.sequence = Some(Sequence {
            token,
            checkpoint: Checkpoint::First,
            prev,
            next,
            on_screen,
            first: GeometryCache::new(),
            play: HashMap::new(),
        });
        #[cfg(feature = "tracing")]
        tracing::debug!(token = token.0, "flip sequence started");
        Schedule {
            token,
            checkpoint: Checkpoint::First,
            delay_ms: 0,
        }
    }
}

/// Copy the measurements of every item in `tree`.
fn capture<K, T, M>(tree: &Snapshot<K, T>, measure: &M) -> GeometryCache<K>
where
    K: BlockKey,
    M: Measure<K> + ?Sized,
{
    let mut cache = GeometryCache::new();
    for (id, _) in tree.depth_first() {
        if let Some(measurement) = measure.measure(id) {
            cache.set(id.clone(), measurement);
        }
    }
    cache
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use kurbo::Vec2;
    use understory_block_layout::Measurement;
    use understory_block_tree::{BlockOptions, Container, FnSource, TreeBuilder};

    fn trees() -> (Snapshot<u32, u32>, Snapshot<u32, u32>, Snapshot<u32, u32>) {
        let source = FnSource::new(
            |k: &u32| *k,
            |_: &u32| Vec::<Container<u32, u32>>::new(),
            |_: &u32| BlockOptions::default(),
        );
        let mut builder = TreeBuilder::new();
        let mut build = |keys: &[u32]| {
            let root = Container::new(0).with_blocks(keys.iter().copied().map(Rc::new).collect());
            builder.build(&root, &source)
        };
        (build(&[1, 2, 3]), build(&[2, 1, 3]), build(&[3, 2, 1]))
    }

    fn cache() -> GeometryCache<u32> {
        let mut cache = GeometryCache::new();
        for key in 1..=3 {
            cache.set(ItemId::Block(key), Measurement::leaf(40.0));
        }
        cache
    }

    fn options() -> AnimationOptions {
        AnimationOptions {
            layout: LayoutOptions::with_width(100.0),
            ..AnimationOptions::default()
        }
    }

    #[test]
    fn runs_four_checkpoints() {
        let (a, b, _) = trees();
        let cache = cache();
        let mut animator = Animator::new(a.clone(), options());

        let first = animator.update(b.clone());
        assert_eq!((first.checkpoint, first.delay_ms), (Checkpoint::First, 0));
        // Nothing is swapped until the first checkpoint runs.
        assert_eq!(animator.tree().generation(), a.generation());

        let last = animator.advance(first.token, &cache).unwrap();
        assert_eq!((last.checkpoint, last.delay_ms), (Checkpoint::Last, 0));
        assert_eq!(animator.tree().generation(), b.generation());
        assert!(animator.styles().is_empty());

        let play = animator.advance(last.token, &cache).unwrap();
        assert_eq!((play.checkpoint, play.delay_ms), (Checkpoint::Play, 10));
        let inverted = animator.style(&ItemId::Block(1)).copied().unwrap();
        assert_eq!(inverted.delta_position, Vec2::new(0.0, -52.0));
        assert!(!inverted.transitioning);

        let cleanup = animator.advance(play.token, &cache).unwrap();
        assert_eq!((cleanup.checkpoint, cleanup.delay_ms), (Checkpoint::Cleanup, 300));
        let playing = animator.style(&ItemId::Block(1)).copied().unwrap();
        assert!(playing.is_identity());
        assert!(playing.transitioning);

        assert_eq!(animator.advance(cleanup.token, &cache), None);
        assert!(animator.styles().is_empty());
        assert!(!animator.is_animating());
    }

    #[test]
    fn new_update_supersedes_running_sequence() {
        let (a, b, c) = trees();
        let cache = cache();
        let mut animator = Animator::new(a, options());

        let stale = animator.update(b.clone());
        animator.advance(stale.token, &cache);
        let fresh = animator.update(c.clone());
        assert_ne!(stale.token, fresh.token);
        assert_eq!(animator.advance(stale.token, &cache), None);

        // The new sequence starts from the last input, not the original tree.
        let last = animator.advance(fresh.token, &cache).unwrap();
        animator.advance(last.token, &cache);
        // 3 moved from 104 in [2, 1, 3] to 0 in [3, 2, 1].
        assert_eq!(
            animator.style(&ItemId::Block(3)).map(|s| s.delta_position),
            Some(Vec2::new(0.0, 104.0))
        );
        assert_eq!(animator.tree().generation(), c.generation());
    }

    #[test]
    fn cancel_shows_latest_tree_at_rest() {
        let (a, b, _) = trees();
        let cache = cache();
        let mut animator = Animator::new(a, options());
        let first = animator.update(b.clone());
        assert!(animator.cancel());
        assert!(!animator.cancel());
        assert_eq!(animator.tree().generation(), b.generation());
        assert_eq!(animator.advance(first.token, &cache), None);
        assert!(animator.styles().is_empty());
    }
}
