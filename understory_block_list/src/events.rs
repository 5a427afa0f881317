// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Everything the engine asks of its host.

use understory_block_tree::{
    CopyEvent, CutEvent, InsertEvent, PasteEvent, RemoveEvent, ReorderEvent,
};
use understory_flip::Schedule;
use understory_selection::SelectionEvent;

/// Keys the engine reacts to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Delete the selection.
    Delete,
    /// Abort an active drag.
    Escape,
    /// Anything else. Ignored.
    Other,
}

/// A request for the host, produced by [`BlockList`](crate::BlockList) input handlers.
#[derive(Debug)]
pub enum BlockListEvent<K, T> {
    /// Store the new selection.
    Selection(SelectionEvent<K>),
    /// Move blocks.
    Reorder(ReorderEvent<K>),
    /// Delete blocks.
    Remove(RemoveEvent<K>),
    /// Insert new blocks.
    Insert(InsertEvent<K, T>),
    /// Copy to the clipboard.
    Copy(CopyEvent<T>),
    /// Copy to the clipboard, then delete.
    Cut(CutEvent<T>),
    /// Paste from the clipboard.
    Paste(PasteEvent<K>),
    /// Start a timer and call
    /// [`BlockList::advance_animation`](crate::BlockList::advance_animation) when it fires.
    Animate(Schedule),
}

impl<K, T> From<SelectionEvent<K>> for BlockListEvent<K, T> {
    fn from(event: SelectionEvent<K>) -> Self {
        Self::Selection(event)
    }
}

impl<K, T> From<ReorderEvent<K>> for BlockListEvent<K, T> {
    fn from(event: ReorderEvent<K>) -> Self {
        Self::Reorder(event)
    }
}

impl<K, T> From<RemoveEvent<K>> for BlockListEvent<K, T> {
    fn from(event: RemoveEvent<K>) -> Self {
        Self::Remove(event)
    }
}

impl<K, T> From<InsertEvent<K, T>> for BlockListEvent<K, T> {
    fn from(event: InsertEvent<K, T>) -> Self {
        Self::Insert(event)
    }
}

impl<K, T> From<CopyEvent<T>> for BlockListEvent<K, T> {
    fn from(event: CopyEvent<T>) -> Self {
        Self::Copy(event)
    }
}

impl<K, T> From<CutEvent<T>> for BlockListEvent<K, T> {
    fn from(event: CutEvent<T>) -> Self {
        Self::Cut(event)
    }
}

impl<K, T> From<PasteEvent<K>> for BlockListEvent<K, T> {
    fn from(event: PasteEvent<K>) -> Self {
        Self::Paste(event)
    }
}

impl<K, T> From<Schedule> for BlockListEvent<K, T> {
    fn from(schedule: Schedule) -> Self {
        Self::Animate(schedule)
    }
}

impl<K, T> BlockListEvent<K, T> {
    /// Short name of the variant, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Selection(_) => "selection",
            Self::Reorder(_) => "reorder",
            Self::Remove(_) => "remove",
            Self::Insert(_) => "insert",
            Self::Copy(_) => "copy",
            Self::Cut(_) => "cut",
            Self::Paste(_) => "paste",
            Self::Animate(_) => "animate",
        }
    }
}
