// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mutation requests emitted to the host.
//!
//! The engine never mutates host data. Each of these events describes an edit the
//! host is expected to apply and then answer with a fresh snapshot.

use alloc::rc::Rc;
use alloc::vec::Vec;

use crate::types::Place;

/// Move `keys`, in order, into `place`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReorderEvent<K> {
    /// Keys of the moved blocks. None of them is an ancestor of another.
    pub keys: Vec<K>,
    /// Destination slot.
    pub place: Place<K>,
}

/// Delete the blocks with `keys`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RemoveEvent<K> {
    /// Keys of the removed blocks.
    pub keys: Vec<K>,
}

/// Insert new host blocks into `place`.
#[derive(Debug)]
pub struct InsertEvent<K, T> {
    /// Payloads to insert, in order.
    pub blocks: Vec<Rc<T>>,
    /// Destination slot.
    pub place: Place<K>,
}

impl<K: Clone, T> Clone for InsertEvent<K, T> {
    fn clone(&self) -> Self {
        Self {
            blocks: self.blocks.clone(),
            place: self.place.clone(),
        }
    }
}

/// Opaque host clipboard handle passed through clipboard events unchanged.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClipboardHandle(pub u64);

/// Copy the selected blocks to the host clipboard.
#[derive(Debug)]
pub struct CopyEvent<T> {
    /// Payloads of the selected blocks, in selection order.
    pub blocks: Vec<Rc<T>>,
    /// Host clipboard the copy targets.
    pub clipboard: ClipboardHandle,
}

/// Copy the selected blocks to the host clipboard, then remove them.
#[derive(Debug)]
pub struct CutEvent<T> {
    /// Payloads of the selected blocks, in selection order.
    pub blocks: Vec<Rc<T>>,
    /// Host clipboard the cut targets.
    pub clipboard: ClipboardHandle,
}

/// Paste the host clipboard contents into `place`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PasteEvent<K> {
    /// Destination slot.
    pub place: Place<K>,
    /// Host clipboard to read.
    pub clipboard: ClipboardHandle,
}
