// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration.

use understory_block_layout::LayoutOptions;
use understory_dnd::DragOptions;
use understory_flip::AnimationOptions;
use understory_selection::SelectionOptions;

/// Configuration of a [`BlockList`](crate::BlockList).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockListOptions {
    /// Root width, default spacing and hidden-children handling.
    pub layout: LayoutOptions,
    /// Drag threshold and drop radii.
    pub drag: DragOptions,
    /// Transition timing. Its `layout` is replaced by [`BlockListOptions::layout`].
    pub animation: AnimationOptions,
    /// Multi-selection and the toggle modifier.
    pub selection: SelectionOptions,
    /// Keep reporting the pre-drag height from
    /// [`BlockList::container_height`](crate::BlockList::container_height) while
    /// dragging, so the list does not shrink under the pointer.
    pub fixed_height_while_dragging: bool,
}

impl BlockListOptions {
    /// Default options with the given root width.
    #[must_use]
    pub fn with_width(width: f64) -> Self {
        Self {
            layout: LayoutOptions::with_width(width),
            ..Self::default()
        }
    }

    pub(crate) fn animation(&self) -> AnimationOptions {
        AnimationOptions {
            layout: self.layout,
            ..self.animation
        }
    }
}
