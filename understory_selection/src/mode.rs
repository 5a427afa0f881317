// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selection modes and how modifier keys pick them.

bitflags::bitflags! {
    /// Modifier keys held during a pointer press.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Modifiers: u8 {
        /// Shift.
        const SHIFT = 0b0000_0001;
        /// Control.
        const CTRL  = 0b0000_0010;
        /// Alt / Option.
        const ALT   = 0b0000_0100;
        /// Meta / Command / Super.
        const META  = 0b0000_1000;
    }
}

/// How a click changes the selection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionMode {
    /// Select only the clicked block.
    Set,
    /// Add or remove the clicked block.
    Toggle,
    /// Select the contiguous run between the anchor and the clicked block.
    Range,
    /// Clear the selection.
    Deselect,
}

/// Selection behavior knobs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectionOptions {
    /// Allow toggle and range selection. When off, every click is [`SelectionMode::Set`].
    pub multiselect: bool,
    /// Modifier that toggles. Usually [`Modifiers::CTRL`], [`Modifiers::META`] on macOS.
    pub toggle_modifier: Modifiers,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            multiselect: true,
            toggle_modifier: Modifiers::CTRL,
        }
    }
}

impl SelectionOptions {
    /// Defaults for macOS hosts, where Command toggles.
    #[must_use]
    pub fn mac() -> Self {
        Self {
            toggle_modifier: Modifiers::META,
            ..Self::default()
        }
    }
}

impl SelectionMode {
    /// The mode a click with `modifiers` held selects.
    ///
    /// Shift wins over the toggle modifier.
    pub fn from_modifiers(modifiers: Modifiers, options: &SelectionOptions) -> Self {
        if !options.multiselect {
            Self::Set
        } else if modifiers.contains(Modifiers::SHIFT) {
            Self::Range
        } else if modifiers.intersects(options.toggle_modifier) {
            Self::Toggle
        } else {
            Self::Set
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_pick_modes() {
        let options = SelectionOptions::default();
        assert_eq!(SelectionMode::from_modifiers(Modifiers::empty(), &options), SelectionMode::Set);
        assert_eq!(SelectionMode::from_modifiers(Modifiers::CTRL, &options), SelectionMode::Toggle);
        assert_eq!(SelectionMode::from_modifiers(Modifiers::SHIFT, &options), SelectionMode::Range);
        assert_eq!(
            SelectionMode::from_modifiers(Modifiers::SHIFT | Modifiers::CTRL, &options),
            SelectionMode::Range
        );
        // Meta does not toggle unless configured.
        assert_eq!(SelectionMode::from_modifiers(Modifiers::META, &options), SelectionMode::Set);
        assert_eq!(
            SelectionMode::from_modifiers(Modifiers::META, &SelectionOptions::mac()),
            SelectionMode::Toggle
        );
    }

    #[test]
    fn single_select_ignores_modifiers() {
        let options = SelectionOptions {
            multiselect: false,
            ..SelectionOptions::default()
        };
        assert_eq!(
            SelectionMode::from_modifiers(Modifiers::SHIFT | Modifiers::CTRL, &options),
            SelectionMode::Set
        );
    }
}
