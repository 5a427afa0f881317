// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-item measurements and the sources that provide them.

use hashbrown::HashMap;
use kurbo::{Insets, Rect};
use understory_block_tree::{BlockKey, ItemId, Snapshot};

/// What the layout pass needs to know about one rendered item.
///
/// `margin` is the gap between the item's outer box and the box holding its
/// children: an item without visible children carries its whole height as top
/// margin.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement {
    /// Outer box minus children box. `x0`/`x1` inset the children horizontally,
    /// `y0`/`y1` are the space above and below them.
    pub margin: Insets,
    /// Whether the item's children are currently shown.
    pub children_visible: bool,
}

impl Measurement {
    /// A zero-size item with hidden children. Used for unmeasured items.
    pub const ZERO: Self = Self {
        margin: Insets::ZERO,
        children_visible: false,
    };

    /// A leaf item of the given height.
    pub fn leaf(height: f64) -> Self {
        Self {
            margin: Insets::new(0.0, height, 0.0, 0.0),
            children_visible: false,
        }
    }

    /// An item with visible children, framed by `margin`.
    pub fn framed(margin: Insets) -> Self {
        Self {
            margin,
            children_visible: true,
        }
    }

    /// Derive a measurement from an element's outer box and the box holding its
    /// children.
    ///
    /// A children box that does not overlap the outer box vertically (for example
    /// a collapsed or detached one) is ignored, and the item is treated as a leaf.
    pub fn from_boxes(outer: Rect, inner: Option<Rect>) -> Self {
        let inner = inner.filter(|inner| inner.y0 < outer.y1 && inner.y1 > outer.y0);
        match inner {
            Some(inner) => Self::framed(Insets::new(
                inner.x0 - outer.x0,
                inner.y0 - outer.y0,
                outer.x1 - inner.x1,
                outer.y1 - inner.y1,
            )),
            None => Self::leaf(outer.height()),
        }
    }
}

/// Source of [`Measurement`]s, keyed by item id.
///
/// Returning `None` means "not measured yet"; the layout pass then treats the
/// item as zero-size and heals on the next recompute.
pub trait Measure<K> {
    /// Measurement of `id`, if known.
    fn measure(&self, id: &ItemId<K>) -> Option<Measurement>;
}

impl<K, M: Measure<K> + ?Sized> Measure<K> for &M {
    fn measure(&self, id: &ItemId<K>) -> Option<Measurement> {
        (**self).measure(id)
    }
}

/// A [`Measure`] backed by a closure.
#[derive(Clone, Copy, Debug)]
pub struct MeasureFn<F>(pub F);

impl<K, F> Measure<K> for MeasureFn<F>
where
    F: Fn(&ItemId<K>) -> Option<Measurement>,
{
    fn measure(&self, id: &ItemId<K>) -> Option<Measurement> {
        (self.0)(id)
    }
}

/// Asks `primary` first and falls back to `secondary`.
///
/// Useful when comparing two trees: each side prefers its own measurements and
/// borrows the other's for items it has not rendered.
#[derive(Clone, Copy, Debug)]
pub struct Fallback<A, B> {
    /// First source asked.
    pub primary: A,
    /// Source used when `primary` has no answer.
    pub secondary: B,
}

impl<A, B> Fallback<A, B> {
    /// Combine two sources.
    pub fn new(primary: A, secondary: B) -> Self {
        Self { primary, secondary }
    }
}

impl<K, A: Measure<K>, B: Measure<K>> Measure<K> for Fallback<A, B> {
    fn measure(&self, id: &ItemId<K>) -> Option<Measurement> {
        self.primary
            .measure(id)
            .or_else(|| self.secondary.measure(id))
    }
}

/// Id → measurement cache, written by the renderer and read by layout.
///
/// Entries for items that no longer exist are harmless; [`GeometryCache::retain_live`]
/// drops them.
#[derive(Clone, Debug)]
pub struct GeometryCache<K> {
    entries: HashMap<ItemId<K>, Measurement>,
}

impl<K> Default for GeometryCache<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: BlockKey> GeometryCache<K> {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the measurement of `id`, returning the previous one.
    pub fn set(&mut self, id: ItemId<K>, measurement: Measurement) -> Option<Measurement> {
        debug_assert!(
            is_finite(&measurement.margin),
            "measurements must be finite; got {measurement:?}"
        );
        self.entries.insert(id, measurement)
    }

    /// Record a measurement derived from raw element boxes.
    pub fn set_boxes(&mut self, id: ItemId<K>, outer: Rect, inner: Option<Rect>) {
        self.set(id, Measurement::from_boxes(outer, inner));
    }

    /// Forget `id`, returning its measurement.
    pub fn remove(&mut self, id: &ItemId<K>) -> Option<Measurement> {
        self.entries.remove(id)
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached measurements.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries for ids that are not reachable in `tree`.
    pub fn retain_live<T>(&mut self, tree: &Snapshot<K, T>) {
        self.entries.retain(|id, _| tree.contains(id));
    }
}

impl<K: BlockKey> Measure<K> for GeometryCache<K> {
    fn measure(&self, id: &ItemId<K>) -> Option<Measurement> {
        self.entries.get(id).copied()
    }
}

fn is_finite(insets: &Insets) -> bool {
    insets.x0.is_finite() && insets.y0.is_finite() && insets.x1.is_finite() && insets.y1.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_children_box_becomes_margin() {
        let outer = Rect::new(10.0, 0.0, 210.0, 100.0);
        let inner = Rect::new(30.0, 24.0, 200.0, 90.0);
        let m = Measurement::from_boxes(outer, Some(inner));
        assert!(m.children_visible);
        assert_eq!(m.margin, Insets::new(20.0, 24.0, 10.0, 10.0));
    }

    #[test]
    fn detached_children_box_is_ignored() {
        let outer = Rect::new(0.0, 0.0, 100.0, 40.0);
        // Starts exactly at the outer bottom edge.
        let below = Rect::new(0.0, 40.0, 100.0, 80.0);
        let m = Measurement::from_boxes(outer, Some(below));
        assert!(!m.children_visible);
        assert_eq!(m, Measurement::leaf(40.0));
        assert_eq!(Measurement::from_boxes(outer, None), Measurement::leaf(40.0));
    }

    #[test]
    fn fallback_prefers_primary() {
        let mut a = GeometryCache::new();
        let mut b = GeometryCache::new();
        a.set(ItemId::Block(1), Measurement::leaf(10.0));
        b.set(ItemId::Block(1), Measurement::leaf(20.0));
        b.set(ItemId::Block(2), Measurement::leaf(30.0));
        let both = Fallback::new(&a, &b);
        assert_eq!(both.measure(&ItemId::Block(1)), Some(Measurement::leaf(10.0)));
        assert_eq!(both.measure(&ItemId::Block(2)), Some(Measurement::leaf(30.0)));
        assert_eq!(both.measure(&ItemId::Block(3)), None);
    }

    #[test]
    fn closures_measure() {
        let m = MeasureFn(|id: &ItemId<u32>| id.block_key().map(|_| Measurement::leaf(5.0)));
        assert_eq!(m.measure(&ItemId::Block(1)), Some(Measurement::leaf(5.0)));
        assert_eq!(m.measure(&ItemId::Container(1)), None);
    }
}
