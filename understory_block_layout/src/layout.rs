// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layout pass.

use hashbrown::HashMap;
use kurbo::{Point, Rect};
use understory_block_tree::{BlockKey, Item, ItemId, Snapshot};

use crate::measure::{Measure, Measurement};

/// Spacing between siblings when neither the parent nor the options specify one.
pub const DEFAULT_SPACING: f64 = 12.0;

/// Parameters of [`calculate_layout`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutOptions {
    /// Width of the root, in logical pixels.
    pub width: f64,
    /// Spacing between siblings whose parent does not set its own.
    pub default_spacing: f64,
    /// Skip the children of items whose measurement reports them hidden.
    pub skip_hidden: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            width: 0.0,
            default_spacing: DEFAULT_SPACING,
            skip_hidden: false,
        }
    }
}

impl LayoutOptions {
    /// Default options with the given root width.
    #[must_use]
    pub fn with_width(width: f64) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }
}

/// Absolute rectangles of every laid-out item, in a virtual space whose origin is
/// the root's top-left corner.
#[derive(Clone, Debug)]
pub struct Layout<K> {
    rects: HashMap<ItemId<K>, Rect>,
    width: f64,
    height: f64,
}

impl<K> Default for Layout<K> {
    fn default() -> Self {
        Self {
            rects: HashMap::new(),
            width: 0.0,
            height: 0.0,
        }
    }
}

impl<K: BlockKey> Layout<K> {
    /// A layout from precomputed rectangles. Width and height are the union's extent.
    pub fn from_rects<I>(rects: I) -> Self
    where
        I: IntoIterator<Item = (ItemId<K>, Rect)>,
    {
        let rects: HashMap<_, _> = rects.into_iter().collect();
        let (width, height) = rects
            .values()
            .fold((0.0_f64, 0.0_f64), |(w, h), r| (w.max(r.x1), h.max(r.y1)));
        Self {
            rects,
            width,
            height,
        }
    }

    /// Rectangle of `id`, if it was laid out.
    pub fn rect(&self, id: &ItemId<K>) -> Option<Rect> {
        self.rects.get(id).copied()
    }

    /// Top edge of `id`.
    pub fn top(&self, id: &ItemId<K>) -> Option<f64> {
        self.rect(id).map(|r| r.y0)
    }

    /// Root width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Total height: the bottom of the root's subtree.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Number of laid-out items.
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Returns `true` if nothing was laid out.
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// All rectangles, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemId<K>, &Rect)> + '_ {
        self.rects.iter()
    }

    /// Returns the layout moved by `offset`, e.g. into viewport space.
    #[must_use]
    pub fn translated(&self, offset: Point) -> Self {
        let delta = offset.to_vec2();
        Self {
            rects: self
                .rects
                .iter()
                .map(|(id, r)| (id.clone(), *r + delta))
                .collect(),
            width: self.width,
            height: self.height,
        }
    }
}

/// Lay out `tree` top to bottom.
///
/// One depth-first pass with a running y cursor. For each item in document order:
///
/// - add the parent's spacing, unless the item is the first child or a placeholder;
/// - add the top margin, unless the item is a placeholder that is not the first
///   child (an empty container's placeholder takes its place, a trailing one hugs the
///   last block);
/// - lay out the children, inset horizontally by the left/right margin, when they
///   are visible or `skip_hidden` is off;
/// - add the bottom margin and record the rectangle spanning the item's subtree.
///
/// Unmeasured items are zero-size, except a gap, which falls back to its own
/// height.
pub fn calculate_layout<K, T, M>(tree: &Snapshot<K, T>, measure: &M, options: &LayoutOptions) -> Layout<K>
where
    K: BlockKey,
    M: Measure<K> + ?Sized,
{
    let mut pass = Pass {
        tree,
        measure,
        options,
        rects: HashMap::with_capacity(tree.len()),
        y: 0.0,
    };
    pass.item(tree.root_id(), 0.0, options.width, 0.0, true);
    let height = pass.y;
    Layout {
        rects: pass.rects,
        width: options.width,
        height,
    }
}

struct Pass<'a, K, T, M: ?Sized> {
    tree: &'a Snapshot<K, T>,
    measure: &'a M,
    options: &'a LayoutOptions,
    rects: HashMap<ItemId<K>, Rect>,
    y: f64,
}

impl<K: BlockKey, T, M: Measure<K> + ?Sized> Pass<'_, K, T, M> {
    fn item(&mut self, id: &ItemId<K>, x: f64, width: f64, spacing: f64, first: bool) {
        let Some(item) = self.tree.item(id) else {
            return;
        };
        let measurement = self.measure.measure(id).unwrap_or_else(|| match item {
            Item::Gap(gap) => Measurement::leaf(gap.height),
            _ => Measurement::ZERO,
        });
        let margin = measurement.margin;
        let placeholder = item.is_placeholder();

        if !first && !placeholder {
            self.y += spacing;
        }
        let top = self.y;
        if !placeholder || first {
            self.y += margin.y0;
        }

        if measurement.children_visible || !self.options.skip_hidden {
            let child_spacing = item
                .options()
                .and_then(|o| o.spacing)
                .unwrap_or(self.options.default_spacing);
            let inner_x = x + margin.x0;
            let inner_width = (width - margin.x0 - margin.x1).max(0.0);
            for (i, child) in self.tree.child_ids(id).iter().enumerate() {
                self.item(child, inner_x, inner_width, child_spacing, i == 0);
            }
        }

        self.y += margin.y1;
        self.rects
            .insert(id.clone(), Rect::new(x, top, x + width, self.y));
    }
}
