// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine facade.

use alloc::rc::Rc;
use alloc::vec::Vec;

use kurbo::{Point, Rect};
use understory_block_layout::{GeometryCache, Layout, calculate_layout};
use understory_block_tree::{
    BlockKey, ClipboardHandle, Container, CopyEvent, CutEvent, InsertEvent, ItemId, PasteEvent,
    Place, RemoveEvent, Snapshot, TreeBuilder, TreeSource,
};
use understory_dnd::{DragContext, DragController, DragState, InsertionPoint, MoveResult};
use understory_flip::{AnimationState, Animator, Schedule, SequenceToken};
use understory_selection::{Modifiers, Selection, SelectionMode, SelectionState, normalize};

use crate::events::{BlockListEvent, Key};
use crate::options::BlockListOptions;

type Events<K, T> = Vec<BlockListEvent<K, T>>;

/// What the displayed tree was derived from.
#[derive(Clone, Debug, PartialEq)]
struct ViewKey<K> {
    generation: u64,
    moving: Option<Vec<K>>,
    place: Option<Place<K>>,
}

/// A headless block list.
///
/// Owns the current snapshot, measurements, selection, drag gesture and
/// transition state. The host feeds it input and answers the returned
/// [`BlockListEvent`]s:
///
/// - edits ([`Reorder`](BlockListEvent::Reorder), [`Remove`](BlockListEvent::Remove),
///   and so on) are applied to host data, followed by [`BlockList::set_root`];
/// - [`Selection`](BlockListEvent::Selection) events are informational, the engine
///   already applied them;
/// - [`Animate`](BlockListEvent::Animate) asks for a timer that ends in
///   [`BlockList::advance_animation`].
///
/// Render [`BlockList::view`] at [`BlockList::layout`], offset by each item's
/// [`BlockList::animation_state`], and keep [`BlockList::geometry_mut`] up to date
/// with what was rendered.
#[derive(Debug)]
pub struct BlockList<K, T> {
    options: BlockListOptions,
    builder: TreeBuilder<K, T>,
    tree: Snapshot<K, T>,
    geometry: GeometryCache<K>,
    selection: SelectionState<K>,
    drag: DragController<K, T>,
    animator: Animator<K, T>,
    shown: ViewKey<K>,
    origin: Point,
    drag_height: Option<f64>,
    on_screen: Option<Layout<K>>,
}

impl<K: BlockKey, T> BlockList<K, T> {
    /// Build the first snapshot from host data.
    pub fn new<S>(root: &Container<K, T>, source: &S, options: BlockListOptions) -> Self
    where
        S: TreeSource<K, T> + ?Sized,
    {
        let mut builder = TreeBuilder::new();
        let tree = builder.build(root, source);
        Self {
            shown: ViewKey {
                generation: tree.generation(),
                moving: None,
                place: None,
            },
            animator: Animator::new(tree.clone(), options.animation()),
            drag: DragController::new(options.drag),
            selection: SelectionState::new(),
            geometry: GeometryCache::new(),
            builder,
            tree,
            options,
            origin: Point::ZERO,
            drag_height: None,
            on_screen: None,
        }
    }

    /// Current options.
    pub fn options(&self) -> &BlockListOptions {
        &self.options
    }

    /// Replace the options.
    pub fn set_options(&mut self, options: BlockListOptions) {
        self.drag.set_options(options.drag);
        self.animator.set_options(options.animation());
        self.drag.invalidate_targets();
        self.options = options;
    }

    /// Rebuild from host data, e.g. after applying an edit.
    ///
    /// Selected blocks that disappeared are dropped from the selection silently.
    pub fn set_root<S>(&mut self, root: &Container<K, T>, source: &S) -> Events<K, T>
    where
        S: TreeSource<K, T> + ?Sized,
    {
        self.tree = self.builder.build(root, source);
        self.selection.retain_live(&self.tree);
        let mut events = Vec::new();
        self.refresh(&mut events);
        events
    }

    /// The latest snapshot of host data.
    pub fn tree(&self) -> &Snapshot<K, T> {
        &self.tree
    }

    /// The snapshot to render. While dragging it lacks the dragged blocks and has a
    /// gap at the drop slot. During a transition it may lag [`BlockList::tree`].
    pub fn view(&self) -> &Snapshot<K, T> {
        self.animator.tree()
    }

    /// Rectangles of [`BlockList::view`], relative to the root's top-left corner.
    pub fn layout(&self) -> Layout<K> {
        calculate_layout(self.view(), &self.geometry, &self.options.layout)
    }

    /// Measurements reported by the renderer.
    pub fn geometry(&self) -> &GeometryCache<K> {
        &self.geometry
    }

    /// Mutable access to the measurements. Drop slots of an active drag are
    /// recomputed on the next move.
    pub fn geometry_mut(&mut self) -> &mut GeometryCache<K> {
        self.drag.invalidate_targets();
        &mut self.geometry
    }

    /// Position of the root's top-left corner in pointer coordinates.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Move the root, e.g. after scrolling.
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    /// The current selection.
    pub fn selection(&self) -> &Selection<K> {
        self.selection.selection()
    }

    /// Returns `true` if the block `key` is selected.
    pub fn is_selected(&self, key: &K) -> bool {
        self.selection.is_selected(key)
    }

    /// Replace the selection without emitting an event.
    ///
    /// Blocks inside other selected blocks are dropped.
    pub fn set_selection(&mut self, selection: Selection<K>) {
        let selection = match selection {
            Selection::Blocks(keys) => Selection::Blocks(normalize(&self.tree, &keys)),
            place => place,
        };
        self.selection.set_selection(selection);
    }

    /// Report where items are drawn right now, relative to the root's top-left
    /// corner, when that differs from [`BlockList::layout`]. The next transition
    /// starts from these boxes, so an item caught mid-transition does not jump.
    ///
    /// Used by the next transition only.
    pub fn set_on_screen(&mut self, boxes: Layout<K>) {
        self.on_screen = Some(boxes);
    }

    /// Pointer pressed on the block `key`.
    ///
    /// Selects according to `modifiers` and arms a drag. Ignored while another
    /// gesture is in progress or when `key` is not in the tree.
    pub fn pointer_down(&mut self, key: K, position: Point, modifiers: Modifiers) -> Events<K, T> {
        let mut events = Vec::new();
        if !self.drag.is_idle() || self.tree.find_block(&key).is_none() {
            return events;
        }
        let mode = SelectionMode::from_modifiers(modifiers, &self.options.selection);
        if let Some(event) = self.selection.press(&self.tree, &key, mode) {
            emit(&mut events, event);
        }
        self.drag.on_down(key, position);
        events
    }

    /// Pointer moved.
    pub fn pointer_move(&mut self, position: Point) -> Events<K, T> {
        let ctx = DragContext::new(&self.tree, &self.geometry, &self.options.layout)
            .with_selection(self.selection.selected())
            .with_origin(self.origin);
        let result = self.drag.on_move(ctx, position);
        let mut events = Vec::new();
        match result {
            MoveResult::Started => {
                // The press stays a drag, not a click.
                self.selection.cancel_deferred();
                self.drag_height = Some(
                    calculate_layout(&self.tree, &self.geometry, &self.options.layout).height(),
                );
                self.refresh(&mut events);
            }
            MoveResult::Dragged {
                target_changed: true,
            } => self.refresh(&mut events),
            _ => {}
        }
        events
    }

    /// Pointer released.
    ///
    /// Ends a drag with a [`Reorder`](BlockListEvent::Reorder) when it is over a
    /// drop slot, or completes a click. Either way the dragged blocks return to
    /// the view at once, so a reorder the host declines leaves nothing hidden.
    pub fn pointer_up(&mut self) -> Events<K, T> {
        let mut events = Vec::new();
        if !self.drag.is_dragging() {
            self.drag.on_cancel();
            if let Some(event) = self.selection.release() {
                emit(&mut events, event);
            }
            return events;
        }
        let ctx = DragContext::new(&self.tree, &self.geometry, &self.options.layout)
            .with_selection(self.selection.selected())
            .with_origin(self.origin);
        let reorder = self.drag.on_up(ctx);
        self.drag_height = None;
        if let Some(reorder) = reorder {
            emit(&mut events, reorder);
        }
        self.refresh(&mut events);
        events
    }

    /// Pointer capture lost. Abandons any gesture without an edit.
    pub fn pointer_cancel(&mut self) -> Events<K, T> {
        let mut events = Vec::new();
        self.drag.on_cancel();
        self.selection.cancel_deferred();
        self.drag_height = None;
        self.refresh(&mut events);
        events
    }

    /// A container's placeholder was clicked: select the caret at its end.
    pub fn click_placeholder(&mut self, parent: K) -> Events<K, T> {
        let mut events = Vec::new();
        if self.tree.contains(&ItemId::Container(parent.clone()))
            && let Some(event) = self.selection.select_place(Place::append(parent))
        {
            emit(&mut events, event);
        }
        events
    }

    /// Keyboard focus left the list.
    pub fn focus_out(&mut self) -> Events<K, T> {
        let mut events = Vec::new();
        if let Some(event) = self.selection.deselect() {
            emit(&mut events, event);
        }
        events
    }

    /// A key was pressed while the list had focus.
    pub fn key_down(&mut self, key: Key) -> Events<K, T> {
        match key {
            Key::Delete => {
                let mut events = Vec::new();
                let keys = normalize(&self.tree, self.selection.selected());
                if !keys.is_empty() && !self.drag.is_dragging() {
                    emit(&mut events, RemoveEvent { keys });
                }
                events
            }
            Key::Escape if !self.drag.is_idle() => self.pointer_cancel(),
            Key::Escape | Key::Other => Vec::new(),
        }
    }

    /// Copy the selected blocks.
    pub fn copy(&mut self, clipboard: ClipboardHandle) -> Events<K, T> {
        let mut events = Vec::new();
        let blocks = self.selected_payloads();
        if !blocks.is_empty() {
            emit(&mut events, CopyEvent { blocks, clipboard });
        }
        events
    }

    /// Cut the selected blocks.
    pub fn cut(&mut self, clipboard: ClipboardHandle) -> Events<K, T> {
        let mut events = Vec::new();
        let blocks = self.selected_payloads();
        if !blocks.is_empty() {
            emit(&mut events, CutEvent { blocks, clipboard });
        }
        events
    }

    /// Paste at [`BlockList::paste_place`].
    pub fn paste(&mut self, clipboard: ClipboardHandle) -> Events<K, T> {
        let mut events = Vec::new();
        let place = self.paste_place();
        emit(&mut events, PasteEvent { place, clipboard });
        events
    }

    /// Where pasted blocks go: the selected caret, else after the last selected
    /// block, else at the end of the root.
    pub fn paste_place(&self) -> Place<K> {
        let place = match self.selection.selection() {
            Selection::Place(place) => Some(place.clone()),
            Selection::Blocks(keys) => keys.last().and_then(|key| self.tree.place_after(key)),
        };
        place
            .filter(|p| self.tree.contains(&ItemId::Container(p.parent.clone())))
            .unwrap_or_else(|| Place::append(self.tree.root_key().clone()))
    }

    /// Ask the host to insert `blocks` at `place`. Nothing is emitted when `place`
    /// names an unknown container.
    pub fn insert(&mut self, blocks: Vec<Rc<T>>, place: Place<K>) -> Events<K, T> {
        let mut events = Vec::new();
        if self.tree.contains(&ItemId::Container(place.parent.clone())) {
            emit(&mut events, InsertEvent { blocks, place });
        }
        events
    }

    /// Run the animation step `token` was scheduled for. Returns the next timer.
    ///
    /// Measurements for items that left the tree are dropped once a transition
    /// completes.
    pub fn advance_animation(&mut self, token: SequenceToken) -> Option<Schedule> {
        let next = self.animator.advance(token, &self.geometry);
        if next.is_none() && !self.animator.is_animating() {
            self.geometry.retain_live(&self.tree);
        }
        next
    }

    /// Returns `true` while a transition is running.
    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    /// Transient style of `id`, if it is transitioning.
    pub fn animation_state(&self, id: &ItemId<K>) -> Option<&AnimationState> {
        self.animator.style(id)
    }

    /// Returns `true` while a drag is active.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// The active drag.
    pub fn drag_state(&self) -> Option<&Rc<DragState<K>>> {
        self.drag.state()
    }

    /// The drop slot under the pointer.
    pub fn insertion(&self) -> Option<&InsertionPoint<K>> {
        self.drag.insertion()
    }

    /// Where to draw the floating drag preview, in pointer coordinates.
    pub fn preview_rect(&self) -> Option<Rect> {
        self.drag.preview_rect()
    }

    /// The dragged blocks alone, for rendering the floating drag preview.
    pub fn preview_tree(&self) -> Option<Snapshot<K, T>> {
        self.drag.preview_tree(&self.tree)
    }

    /// Height the root should keep, or `None` to size it to its content.
    ///
    /// Only set while dragging with
    /// [`fixed_height_while_dragging`](BlockListOptions::fixed_height_while_dragging).
    pub fn container_height(&self) -> Option<f64> {
        if self.options.fixed_height_while_dragging && self.drag.is_dragging() {
            self.drag_height
        } else {
            None
        }
    }

    fn selected_payloads(&self) -> Vec<Rc<T>> {
        normalize(&self.tree, self.selection.selected())
            .iter()
            .filter_map(|key| self.tree.find_block(key))
            .map(|block| Rc::clone(&block.block))
            .collect()
    }

    /// Start a transition if the displayed tree is out of date.
    fn refresh(&mut self, events: &mut Events<K, T>) {
        let on_screen = self.on_screen.take();
        let shown = ViewKey {
            generation: self.tree.generation(),
            moving: self.drag.state().map(|state| state.keys.clone()),
            place: self.drag.insertion().map(|point| point.place.clone()),
        };
        if shown == self.shown {
            return;
        }
        self.shown = shown;
        let view = self.drag.view(&self.tree);
        let schedule = match on_screen {
            Some(boxes) => self.animator.update_from(view, boxes),
            None => self.animator.update(view),
        };
        emit(events, schedule);
    }
}

fn emit<K, T>(events: &mut Events<K, T>, event: impl Into<BlockListEvent<K, T>>) {
    let event = event.into();
    #[cfg(feature = "tracing")]
    tracing::debug!(event = event.name(), "block list event");
    events.push(event);
}
