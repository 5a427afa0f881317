// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drag gesture state machine.
//!
//! ```text
//! Idle ──down──▶ Armed ──move ≥ threshold──▶ Dragging ──up──▶ Idle (+ ReorderEvent)
//!   ▲              │                            │
//!   └──up/cancel───┘◀────────────cancel─────────┘
//! ```
//!
//! While armed nothing changes visually. Promotion resolves which blocks move and
//! captures the preview geometry; afterwards every move is a pure recomputation of
//! the drop slot under the preview.

use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;

use kurbo::{Point, Rect, Size, Vec2};
use understory_block_layout::{Layout, LayoutOptions, Measure, calculate_layout};
use understory_block_tree::{BlockKey, ItemId, Place, ReorderEvent, Snapshot, TagSet};
use understory_selection::normalize;

use crate::insertion::{InsertionPoint, insertion_points, resolve_insertion};

/// Squared-distance threshold of 200 px², as a distance.
pub const DEFAULT_DRAG_THRESHOLD: f64 = 14.142_135_623_730_951;

/// Default drop radii, as factors of the dragged blocks' width and height.
pub const DEFAULT_DRAG_RADIUS: Vec2 = Vec2::new(1.2, 1.5);

/// Drag tuning.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragOptions {
    /// Pointer travel, in logical pixels, that turns a press into a drag.
    pub threshold: f64,
    /// Horizontal and vertical reach of drop slots, as factors of the preview size.
    pub radius: Vec2,
}

impl Default for DragOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_DRAG_THRESHOLD,
            radius: DEFAULT_DRAG_RADIUS,
        }
    }
}

/// Everything a drag reads from the rest of the engine.
#[derive(Debug)]
pub struct DragContext<'a, K, T, M: ?Sized> {
    /// The current snapshot.
    pub tree: &'a Snapshot<K, T>,
    /// Selected block keys.
    pub selection: &'a [K],
    /// Item measurements.
    pub measure: &'a M,
    /// Layout parameters.
    pub layout: &'a LayoutOptions,
    /// Position of the root's top-left corner in pointer coordinates.
    pub origin: Point,
}

impl<K, T, M: ?Sized> Clone for DragContext<'_, K, T, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, T, M: ?Sized> Copy for DragContext<'_, K, T, M> {}

impl<'a, K, T, M: ?Sized> DragContext<'a, K, T, M> {
    /// A context with no selection and the root at the pointer origin.
    pub fn new(tree: &'a Snapshot<K, T>, measure: &'a M, layout: &'a LayoutOptions) -> Self {
        Self {
            tree,
            selection: &[],
            measure,
            layout,
            origin: Point::ZERO,
        }
    }

    /// Set the selected keys.
    #[must_use]
    pub fn with_selection(mut self, selection: &'a [K]) -> Self {
        self.selection = selection;
        self
    }

    /// Set the root's position in pointer coordinates.
    #[must_use]
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }
}

/// Snapshot of an active drag. Created at promotion and never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct DragState<K> {
    /// Moved blocks, normalized, in selection order.
    pub keys: Vec<K>,
    /// The moved block containing the pressed one. Its box is the preview's.
    pub top: K,
    /// Preview top-left minus pointer position.
    pub pointer_offset: Vec2,
    /// Preview size.
    pub size: Size,
    /// Distinct tags of the moved blocks.
    pub tags: TagSet,
}

/// Outcome of [`DragController::on_move`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveResult {
    /// No gesture is in progress, or promotion found nothing to move.
    Idle,
    /// Pressed, still under the drag threshold.
    Armed,
    /// This move promoted the press to a drag.
    Started,
    /// An active drag moved. `target_changed` is set when the drop slot changed.
    Dragged {
        /// Whether the resolved drop slot differs from the previous move's.
        target_changed: bool,
    },
}

#[derive(Clone, Debug)]
struct DropTargets<K, T> {
    generation: u64,
    without: Snapshot<K, T>,
    points: Vec<InsertionPoint<K>>,
}

#[derive(Clone, Debug)]
struct Active<K, T> {
    state: Rc<DragState<K>>,
    pointer: Point,
    targets: Option<DropTargets<K, T>>,
    insertion: Option<InsertionPoint<K>>,
}

#[derive(Clone, Debug)]
enum Phase<K, T> {
    Idle,
    Armed { press: Point, key: K },
    Dragging(Active<K, T>),
}

/// Pointer-driven drag state machine.
///
/// The controller owns no tree; every call that needs one takes a
/// [`DragContext`]. Host data is never touched: a successful drop yields a
/// [`ReorderEvent`] for the host to apply.
#[derive(Clone, Debug)]
pub struct DragController<K, T> {
    phase: Phase<K, T>,
    options: DragOptions,
}

impl<K: BlockKey, T> Default for DragController<K, T> {
    fn default() -> Self {
        Self::new(DragOptions::default())
    }
}

impl<K: BlockKey, T> DragController<K, T> {
    /// An idle controller.
    pub fn new(options: DragOptions) -> Self {
        Self {
            phase: Phase::Idle,
            options,
        }
    }

    /// Current options.
    pub fn options(&self) -> &DragOptions {
        &self.options
    }

    /// Replace the options. Takes effect on the next move.
    pub fn set_options(&mut self, options: DragOptions) {
        self.options = options;
    }

    /// Returns `true` when no gesture is in progress.
    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// Returns `true` between a press and its promotion or release.
    pub fn is_armed(&self) -> bool {
        matches!(self.phase, Phase::Armed { .. })
    }

    /// Returns `true` while dragging.
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging(_))
    }

    /// The active drag.
    pub fn state(&self) -> Option<&Rc<DragState<K>>> {
        match &self.phase {
            Phase::Dragging(active) => Some(&active.state),
            _ => None,
        }
    }

    /// Last pointer position of the active drag.
    pub fn pointer(&self) -> Option<Point> {
        match &self.phase {
            Phase::Dragging(active) => Some(active.pointer),
            _ => None,
        }
    }

    /// The drop slot under the preview, as of the last move.
    pub fn insertion(&self) -> Option<&InsertionPoint<K>> {
        match &self.phase {
            Phase::Dragging(active) => active.insertion.as_ref(),
            _ => None,
        }
    }

    /// Press on the drag handle of block `key`.
    ///
    /// Returns `false`, changing nothing, when a gesture is already in progress.
    pub fn on_down(&mut self, key: K, position: Point) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.phase = Phase::Armed {
            press: position,
            key,
        };
        true
    }

    /// Pointer moved to `position`.
    pub fn on_move<M>(&mut self, ctx: DragContext<'_, K, T, M>, position: Point) -> MoveResult
    where
        M: Measure<K> + ?Sized,
    {
        match &mut self.phase {
            Phase::Idle => MoveResult::Idle,
            Phase::Armed { press, key } => {
                if (position - *press).hypot2() < self.options.threshold * self.options.threshold {
                    return MoveResult::Armed;
                }
                let (press, key) = (*press, key.clone());
                match promote(ctx, &key, press) {
                    Some(state) => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(keys = state.keys.len(), "drag started");
                        let mut active = Active {
                            state: Rc::new(state),
                            pointer: position,
                            targets: None,
                            insertion: None,
                        };
                        active.retarget(ctx, self.options.radius);
                        self.phase = Phase::Dragging(active);
                        MoveResult::Started
                    }
                    None => {
                        self.phase = Phase::Idle;
                        MoveResult::Idle
                    }
                }
            }
            Phase::Dragging(active) => {
                active.pointer = position;
                let target_changed = active.retarget(ctx, self.options.radius);
                MoveResult::Dragged { target_changed }
            }
        }
    }

    /// Pointer released.
    ///
    /// Ends any gesture. A drag over a drop slot yields the reorder for the host;
    /// the slot is re-resolved against `ctx` first, so a tree that changed under
    /// the drag cannot produce a stale drop.
    pub fn on_up<M>(&mut self, ctx: DragContext<'_, K, T, M>) -> Option<ReorderEvent<K>>
    where
        M: Measure<K> + ?Sized,
    {
        let Phase::Dragging(mut active) = core::mem::replace(&mut self.phase, Phase::Idle) else {
            return None;
        };
        active.targets = None;
        active.retarget(ctx, self.options.radius);
        let place = active.insertion.map(|point| point.place);
        #[cfg(feature = "tracing")]
        tracing::debug!(committed = place.is_some(), "drag ended");
        Some(ReorderEvent {
            keys: active.state.keys.clone(),
            place: place?,
        })
    }

    /// Forget the cached drop slots, e.g. after measurements changed.
    ///
    /// Slots are recomputed on the next move. Tree changes are picked up without
    /// this call.
    pub fn invalidate_targets(&mut self) {
        if let Phase::Dragging(active) = &mut self.phase {
            active.targets = None;
        }
    }

    /// Abandon any gesture without a drop. Returns `true` if one was in progress.
    pub fn on_cancel(&mut self) -> bool {
        let was_active = !self.is_idle();
        #[cfg(feature = "tracing")]
        if self.is_dragging() {
            tracing::debug!("drag cancelled");
        }
        self.phase = Phase::Idle;
        was_active
    }

    /// The tree to display: without the dragged blocks, with a gap at the drop slot.
    ///
    /// Returns `tree` unchanged when not dragging.
    pub fn view(&self, tree: &Snapshot<K, T>) -> Snapshot<K, T> {
        let Phase::Dragging(active) = &self.phase else {
            return tree.clone();
        };
        let without = match &active.targets {
            Some(targets) if targets.generation == tree.generation() => targets.without.clone(),
            _ => tree.remove_blocks(&active.state.keys),
        };
        match &active.insertion {
            Some(point) => without.insert_dropzone(&point.place, active.state.size.height),
            None => without,
        }
    }

    /// Where to draw the floating preview, in pointer coordinates.
    pub fn preview_rect(&self) -> Option<Rect> {
        let Phase::Dragging(active) = &self.phase else {
            return None;
        };
        Some(Rect::from_origin_size(
            active.pointer + active.state.pointer_offset,
            active.state.size,
        ))
    }

    /// The dragged blocks alone, for rendering the floating preview.
    pub fn preview_tree(&self, tree: &Snapshot<K, T>) -> Option<Snapshot<K, T>> {
        self.state().map(|state| tree.extract_blocks(&state.keys))
    }
}

impl<K: BlockKey, T> Active<K, T> {
    /// Re-resolve the drop slot. Returns `true` if it changed.
    fn retarget<M>(&mut self, ctx: DragContext<'_, K, T, M>, radius: Vec2) -> bool
    where
        M: Measure<K> + ?Sized,
    {
        let stale = self
            .targets
            .as_ref()
            .is_none_or(|t| t.generation != ctx.tree.generation());
        if stale {
            let without = ctx.tree.remove_blocks(&self.state.keys);
            let layout: Layout<K> = calculate_layout(&without, ctx.measure, ctx.layout);
            let points = insertion_points(&without, &self.state.tags, &layout);
            self.targets = Some(DropTargets {
                generation: ctx.tree.generation(),
                without,
                points,
            });
        }
        let points = self.targets.as_ref().map_or(&[][..], |t| &t.points[..]);
        let preview = self.pointer + self.state.pointer_offset - ctx.origin.to_vec2();
        let next = resolve_insertion(points, preview, self.state.size, radius).cloned();
        let changed = next.as_ref().map(|p| &p.place) != self.insertion.as_ref().map(|p| &p.place);
        self.insertion = next;
        changed
    }
}

/// Resolve the move-set and capture the preview geometry.
fn promote<K, T, M>(ctx: DragContext<'_, K, T, M>, pressed: &K, press: Point) -> Option<DragState<K>>
where
    K: BlockKey,
    M: Measure<K> + ?Sized,
{
    ctx.tree.find_block(pressed)?;
    let selected = normalize(ctx.tree, ctx.selection);
    let (keys, top) = match selected
        .iter()
        .find(|key| ctx.tree.contains_block(key, pressed))
    {
        Some(top) => {
            let top = top.clone();
            (selected, top)
        }
        None => (vec![pressed.clone()], pressed.clone()),
    };

    let layout = calculate_layout(ctx.tree, ctx.measure, ctx.layout);
    let rect = layout.rect(&ItemId::Block(top.clone()))? + ctx.origin.to_vec2();

    let mut tags = TagSet::new();
    for key in &keys {
        if let Some(tag) = ctx.tree.find_block(key).and_then(|b| b.options.tag.as_ref())
            && !tags.contains(tag)
        {
            tags.push(tag.clone());
        }
    }

    Some(DragState {
        keys,
        top,
        pointer_offset: rect.origin() - press,
        size: rect.size(),
        tags,
    })
}

/// Where the blocks of a finished drag go, for hosts applying a [`ReorderEvent`]
/// to a plain ordered list: the index in `siblings` to insert at.
///
/// `siblings` are the destination container's current block keys, with the moved
/// keys already removed.
pub fn insertion_index<K: PartialEq>(siblings: &[K], place: &Place<K>) -> usize {
    place
        .before
        .as_ref()
        .and_then(|before| siblings.iter().position(|k| k == before))
        .unwrap_or(siblings.len())
}
