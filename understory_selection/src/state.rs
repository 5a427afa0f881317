// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stateful selection: press/release ordering and the anchor.

use alloc::vec;
use alloc::vec::Vec;

use understory_block_tree::{BlockKey, ItemId, Place, Snapshot};

use crate::mode::SelectionMode;
use crate::update::{Selection, update_selection};

/// A selection change, reported to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionEvent<K> {
    /// Blocks were selected by a click on `key`.
    BlocksSelected {
        /// The clicked block.
        key: K,
        /// Mode of the click.
        mode: SelectionMode,
        /// Selection before the change.
        before: Selection<K>,
        /// Selected keys after the change.
        after: Vec<K>,
    },
    /// A caret place was selected.
    PlaceSelected {
        /// Selection before the change.
        before: Selection<K>,
        /// The selected place.
        place: Place<K>,
    },
    /// The selection was cleared.
    Deselected {
        /// Selection before the change.
        before: Selection<K>,
    },
}

#[derive(Clone, Debug)]
struct Deferred<K> {
    key: K,
    keys: Vec<K>,
}

/// Selection plus the bookkeeping of an in-flight click.
///
/// A click is a [`press`](Self::press) followed by a [`release`](Self::release).
/// A plain press on an already selected block changes nothing; the matching
/// release collapses the selection to that block. If a drag starts in between,
/// the host calls [`cancel_deferred`](Self::cancel_deferred) and the
/// multi-selection survives to be dragged as a whole.
///
/// Every method returning `Option<SelectionEvent>` returns `None` when the
/// selection did not change.
#[derive(Clone, Debug)]
pub struct SelectionState<K> {
    selection: Selection<K>,
    anchor: Option<K>,
    deferred: Option<Deferred<K>>,
}

impl<K> Default for SelectionState<K> {
    fn default() -> Self {
        Self {
            selection: Selection::default(),
            anchor: None,
            deferred: None,
        }
    }
}

impl<K: BlockKey> SelectionState<K> {
    /// Nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current selection.
    pub fn selection(&self) -> &Selection<K> {
        &self.selection
    }

    /// Selected block keys, in selection order.
    pub fn selected(&self) -> &[K] {
        self.selection.blocks()
    }

    /// Returns `true` if `key` is selected.
    pub fn is_selected(&self, key: &K) -> bool {
        self.selection.contains(key)
    }

    /// Range selections extend from here.
    pub fn anchor(&self) -> Option<&K> {
        self.anchor.as_ref()
    }

    /// Returns `true` while a press awaits its release.
    pub fn has_deferred(&self) -> bool {
        self.deferred.is_some()
    }

    /// Replace the selection, e.g. after the host edited it.
    ///
    /// Any pending release is dropped. The anchor moves to the first selected
    /// block.
    pub fn set_selection(&mut self, selection: Selection<K>) {
        self.anchor = selection.blocks().first().cloned();
        self.selection = selection;
        self.deferred = None;
    }

    /// Apply the press half of a click on `key`.
    pub fn press<T>(
        &mut self,
        tree: &Snapshot<K, T>,
        key: &K,
        mode: SelectionMode,
    ) -> Option<SelectionEvent<K>> {
        let update = update_selection(
            tree,
            self.selection.blocks(),
            self.anchor.as_ref(),
            key,
            mode,
        );
        self.deferred = update.deferred.map(|keys| Deferred {
            key: key.clone(),
            keys,
        });
        match mode {
            SelectionMode::Set => self.anchor = Some(key.clone()),
            SelectionMode::Toggle if update.immediate.contains(key) => {
                self.anchor = Some(key.clone());
            }
            SelectionMode::Toggle => {
                // Unselected, or absorbed by a selected ancestor.
                if self
                    .anchor
                    .as_ref()
                    .is_none_or(|anchor| !update.immediate.contains(anchor))
                {
                    self.anchor = update.immediate.first().cloned();
                }
            }
            SelectionMode::Range => {
                if self.anchor.is_none() {
                    self.anchor = update.immediate.first().cloned();
                }
            }
            SelectionMode::Deselect => self.anchor = None,
        }
        self.apply(key, mode, update.immediate)
    }

    /// Apply the release half of a click, if the press deferred anything.
    pub fn release(&mut self) -> Option<SelectionEvent<K>> {
        let Deferred { key, keys } = self.deferred.take()?;
        self.apply(&key, SelectionMode::Set, keys)
    }

    /// Drop the pending release. Returns `true` if one was pending.
    pub fn cancel_deferred(&mut self) -> bool {
        self.deferred.take().is_some()
    }

    /// Clear the selection, e.g. when focus leaves the list.
    pub fn deselect(&mut self) -> Option<SelectionEvent<K>> {
        self.deferred = None;
        self.anchor = None;
        if self.selection.is_empty() {
            return None;
        }
        let before = core::mem::take(&mut self.selection);
        Some(SelectionEvent::Deselected { before })
    }

    /// Select a caret place.
    pub fn select_place(&mut self, place: Place<K>) -> Option<SelectionEvent<K>> {
        self.deferred = None;
        if self.selection.place() == Some(&place) {
            return None;
        }
        let before = core::mem::replace(&mut self.selection, Selection::Place(place.clone()));
        Some(SelectionEvent::PlaceSelected { before, place })
    }

    /// Forget selected keys that are no longer in `tree`.
    ///
    /// Returns `true` if anything was dropped.
    pub fn retain_live<T>(&mut self, tree: &Snapshot<K, T>) -> bool {
        let Selection::Blocks(keys) = &mut self.selection else {
            return false;
        };
        let before = keys.len();
        keys.retain(|key| tree.contains(&ItemId::Block(key.clone())));
        if self
            .anchor
            .as_ref()
            .is_some_and(|anchor| !keys.contains(anchor))
        {
            self.anchor = keys.first().cloned();
        }
        keys.len() != before
    }

    fn apply(&mut self, key: &K, mode: SelectionMode, keys: Vec<K>) -> Option<SelectionEvent<K>> {
        if self.selection == Selection::Blocks(keys.clone()) {
            return None;
        }
        let before = core::mem::replace(&mut self.selection, Selection::Blocks(keys.clone()));
        Some(SelectionEvent::BlocksSelected {
            key: key.clone(),
            mode,
            before,
            after: keys,
        })
    }
}

impl<K: BlockKey> From<Vec<K>> for SelectionState<K> {
    fn from(keys: Vec<K>) -> Self {
        let mut state = Self::new();
        state.set_selection(Selection::Blocks(keys));
        state
    }
}

impl<K: BlockKey> SelectionState<K> {
    /// A state with `key` alone selected.
    pub fn single(key: K) -> Self {
        Self::from(vec![key])
    }
}
