// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-item deltas between two laid-out snapshots.

use hashbrown::HashMap;
use kurbo::{Affine, Rect, Size, Vec2};
use understory_block_layout::Layout;
use understory_block_tree::{BlockKey, Item, ItemId, Snapshot};

/// Transient render state of one item during a transition.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationState {
    /// The item's size in the next layout. Renderers reserve this much room.
    pub size: Size,
    /// Translation of the item's content relative to its parent's content.
    pub delta_position: Vec2,
    /// Previous size minus next size.
    pub delta_size: Vec2,
    /// Whether changes to this state should be animated.
    pub transitioning: bool,
    /// Nesting depth, for ordering overlapping items.
    pub stack_level: usize,
}

impl AnimationState {
    /// The translation to apply to the item's content.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.delta_position)
    }

    /// Returns `true` if the item is drawn where layout puts it.
    pub fn is_identity(&self) -> bool {
        self.delta_position == Vec2::ZERO && self.delta_size == Vec2::ZERO
    }

    fn settled(self) -> Self {
        Self {
            delta_position: Vec2::ZERO,
            delta_size: Vec2::ZERO,
            transitioning: true,
            ..self
        }
    }
}

/// The two halves of a FLIP transition.
#[derive(Clone, Debug)]
pub struct Transitions<K> {
    /// Items displaced back to where they were, with transitions off.
    pub invert: HashMap<ItemId<K>, AnimationState>,
    /// The same items at their new position, with transitions on.
    pub play: HashMap<ItemId<K>, AnimationState>,
}

impl<K> Default for Transitions<K> {
    fn default() -> Self {
        Self {
            invert: HashMap::new(),
            play: HashMap::new(),
        }
    }
}

impl<K: BlockKey> Transitions<K> {
    /// Returns `true` if nothing moves.
    pub fn is_empty(&self) -> bool {
        self.invert.values().all(AnimationState::is_identity)
    }
}

/// Compute the transition from `prev_layout` to `next` laid out as `next_layout`.
///
/// Every item of `next` that also has a rectangle on the previous side gets an
/// entry. Its delta is its previous position minus its next one, taken relative
/// to the parent's own displacement, so a child moving along with its parent
/// does not move relative to it.
///
/// `on_screen` overrides previous rectangles with where items are actually
/// drawn, e.g. when a transition interrupts another. A gap without a previous
/// rectangle grows from a zero-height line at the top of the item it precedes.
pub fn calculate_transitions<K: BlockKey, T>(
    prev_layout: &Layout<K>,
    next: &Snapshot<K, T>,
    next_layout: &Layout<K>,
    on_screen: Option<&Layout<K>>,
) -> Transitions<K> {
    let mut invert = HashMap::new();
    let mut play = HashMap::new();
    let mut offsets: HashMap<&ItemId<K>, Vec2> = HashMap::new();

    for (id, depth) in next.depth_first() {
        let Some(to) = next_layout.rect(id) else {
            continue;
        };
        let previous = on_screen
            .and_then(|layout| layout.rect(id))
            .or_else(|| prev_layout.rect(id))
            .or_else(|| synthesize_gap(next, prev_layout, id, to));
        let Some(from) = previous else {
            continue;
        };

        let offset = from.origin() - to.origin();
        let parent_offset = next
            .parent_of(id)
            .and_then(|parent| offsets.get(parent))
            .copied()
            .unwrap_or(Vec2::ZERO);
        offsets.insert(id, offset);

        let state = AnimationState {
            size: to.size(),
            delta_position: offset - parent_offset,
            delta_size: (from.size() - to.size()).to_vec2(),
            transitioning: false,
            stack_level: depth,
        };
        invert.insert(id.clone(), state);
        play.insert(id.clone(), state.settled());
    }

    Transitions { invert, play }
}

fn synthesize_gap<K: BlockKey, T>(
    next: &Snapshot<K, T>,
    prev_layout: &Layout<K>,
    id: &ItemId<K>,
    to: Rect,
) -> Option<Rect> {
    let Some(Item::Gap(gap)) = next.item(id) else {
        return None;
    };
    let line = |r: Rect| Rect::new(r.x0, r.y0, r.x1, r.y0);
    Some(prev_layout.rect(&gap.before).map_or(line(to), line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use understory_block_layout::{GeometryCache, LayoutOptions, Measurement, calculate_layout};
    use understory_block_tree::{BlockOptions, Container, FnSource, Place, TreeBuilder};

    type Tree = Snapshot<u32, u32>;

    fn build(builder: &mut TreeBuilder<u32, u32>, keys: &[u32]) -> Tree {
        let source = FnSource::new(
            |k: &u32| *k,
            |_: &u32| Vec::<Container<u32, u32>>::new(),
            |_: &u32| BlockOptions::default(),
        );
        let root = Container::new(0).with_blocks(keys.iter().copied().map(Rc::new).collect());
        builder.build(&root, &source)
    }

    fn layout(tree: &Tree) -> Layout<u32> {
        let mut cache = GeometryCache::new();
        for key in 1..=3 {
            cache.set(ItemId::Block(key), Measurement::leaf(40.0));
        }
        calculate_layout(tree, &cache, &LayoutOptions::with_width(100.0))
    }

    #[test]
    fn swapped_blocks_invert_to_old_position() {
        let mut builder = TreeBuilder::new();
        let prev = build(&mut builder, &[1, 2, 3]);
        let next = build(&mut builder, &[2, 1, 3]);
        let t = calculate_transitions(&layout(&prev), &next, &layout(&next), None);

        // 1 moved from 0 to 52, 2 from 52 to 0, 3 stayed.
        assert_eq!(t.invert[&ItemId::Block(1)].delta_position, Vec2::new(0.0, -52.0));
        assert_eq!(t.invert[&ItemId::Block(2)].delta_position, Vec2::new(0.0, 52.0));
        assert!(t.invert[&ItemId::Block(3)].is_identity());
        assert!(!t.invert[&ItemId::Block(1)].transitioning);
        assert_eq!(t.invert[&ItemId::Block(1)].stack_level, 1);
    }

    #[test]
    fn play_settles_to_identity() {
        let mut builder = TreeBuilder::new();
        let prev = build(&mut builder, &[1, 2, 3]);
        let next = build(&mut builder, &[3, 2, 1]);
        let t = calculate_transitions(&layout(&prev), &next, &layout(&next), None);
        assert!(!t.is_empty());
        for (id, state) in &t.play {
            assert!(state.is_identity(), "{id} still displaced");
            assert!(state.transitioning);
            assert_eq!(state.transform(), Affine::IDENTITY);
            assert_eq!(state.size, t.invert[id].size);
        }
    }

    #[test]
    fn items_on_one_side_are_not_animated() {
        let mut builder = TreeBuilder::new();
        let prev = build(&mut builder, &[1, 2]);
        let next = build(&mut builder, &[2, 3]);
        let t = calculate_transitions(&layout(&prev), &next, &layout(&next), None);
        assert!(t.invert.contains_key(&ItemId::Block(2)));
        assert!(!t.invert.contains_key(&ItemId::Block(1)));
        assert!(!t.invert.contains_key(&ItemId::Block(3)));
    }

    #[test]
    fn gap_grows_from_zero_height() {
        let mut builder = TreeBuilder::new();
        let prev = build(&mut builder, &[1, 2, 3]);
        let next = prev.insert_dropzone(&Place::before(0, 2), 40.0);
        let t = calculate_transitions(&layout(&prev), &next, &layout(&next), None);

        let gap = t.invert[&ItemId::Gap];
        assert_eq!(gap.size, Size::new(100.0, 40.0));
        // Gap sits at 52 in the next layout, block 2 sat at 52 before.
        assert_eq!(gap.delta_position, Vec2::ZERO);
        assert_eq!(gap.delta_size, Vec2::new(0.0, -40.0));
        // Block 2 is pushed down by the gap.
        assert_eq!(t.invert[&ItemId::Block(2)].delta_position, Vec2::new(0.0, -52.0));
    }

    #[test]
    fn on_screen_boxes_override_previous_layout() {
        let mut builder = TreeBuilder::new();
        let prev = build(&mut builder, &[1, 2]);
        let next = build(&mut builder, &[1, 2]);
        let on_screen = Layout::from_rects([(ItemId::Block(2), Rect::new(0.0, 70.0, 100.0, 110.0))]);
        let t = calculate_transitions(&layout(&prev), &next, &layout(&next), Some(&on_screen));
        assert_eq!(t.invert[&ItemId::Block(2)].delta_position, Vec2::new(0.0, 18.0));
        assert!(t.invert[&ItemId::Block(1)].is_identity());
    }
}
