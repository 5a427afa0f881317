// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drop target enumeration and hit testing.

use alloc::vec::Vec;

use kurbo::{Point, Size, Vec2};
use understory_block_layout::Layout;
use understory_block_tree::{BlockKey, BlockOptions, Item, ItemId, Place, Snapshot, Tag};

/// A legal drop slot: "insert before `id`".
#[derive(Clone, Debug, PartialEq)]
pub struct InsertionPoint<K> {
    /// The block or placeholder the dragged blocks would land in front of.
    pub id: ItemId<K>,
    /// Where the host should insert.
    pub place: Place<K>,
    /// Top edge of `id`, in layout space.
    pub y: f64,
}

/// Enumerate the drop slots for blocks carrying `tags`, in document order.
///
/// `tree` should not contain the dragged blocks. A child of a container is a slot
/// when the container accepts every tag in `tags`; fixed containers never do.
/// Children without a rectangle in `layout` are skipped.
pub fn insertion_points<K: BlockKey, T>(
    tree: &Snapshot<K, T>,
    tags: &[Tag],
    layout: &Layout<K>,
) -> Vec<InsertionPoint<K>> {
    let mut out = Vec::new();
    let root = tree.root();
    if let (Some(key), Some(options)) = (root.key(), root.options()) {
        collect(tree, tags, layout, key, options, &mut out);
    }
    out
}

fn collect<K: BlockKey, T>(
    tree: &Snapshot<K, T>,
    tags: &[Tag],
    layout: &Layout<K>,
    container: &K,
    options: &BlockOptions,
    out: &mut Vec<InsertionPoint<K>>,
) {
    let accepts = options.accepts_all(tags);
    for child in tree.child_ids(&ItemId::Container(container.clone())) {
        if child.is_gap() {
            continue;
        }
        if accepts && let Some(rect) = layout.rect(child) {
            out.push(InsertionPoint {
                id: child.clone(),
                place: Place {
                    parent: container.clone(),
                    before: child.block_key().cloned(),
                },
                y: rect.y0,
            });
        }
        if child.block_key().is_some() {
            for nested in tree.children(child) {
                if let Item::Container(c) = nested {
                    collect(tree, tags, layout, &c.key, &c.options, out);
                }
            }
        }
    }
}

/// Find the slot under a dragged preview.
///
/// `preview` is the preview's top-left corner in layout space and `size` its size.
/// The preview must stay within `radius.x * size.width` of the drop column
/// horizontally. Vertically, slot `i` owns the open band from
/// `y_i - radius.y * size.height` to the nearer of `y_i + radius.y * size.height`
/// and the midpoint to the next slot. The first band containing the preview wins.
pub fn resolve_insertion<'a, K>(
    points: &'a [InsertionPoint<K>],
    preview: Point,
    size: Size,
    radius: Vec2,
) -> Option<&'a InsertionPoint<K>> {
    let radius_x = radius.x * size.width;
    if preview.x < -radius_x || preview.x > radius_x {
        return None;
    }
    let radius_y = radius.y * size.height;
    points.iter().enumerate().find_map(|(i, point)| {
        let next = points.get(i + 1).map_or(f64::INFINITY, |p| p.y);
        let min = point.y - radius_y;
        let max = (point.y + radius_y).min(0.5 * (point.y + next));
        (preview.y > min && preview.y < max).then_some(point)
    })
}
