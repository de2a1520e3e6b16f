// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus origins and monitor configuration.

use core::fmt;

use understory_input_modality::InputModality;

/// Why an element became focused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FocusOrigin {
    /// A touch interaction.
    Touch,
    /// A mouse interaction.
    Mouse,
    /// A keyboard interaction, including screen reader activation.
    Keyboard,
    /// A programmatic `focus()` call, or anything that could not be attributed
    /// to an interaction (screen reader linear navigation fires no key or
    /// pointer events, so it lands here too).
    Program,
}

impl FocusOrigin {
    /// Every origin, in CSS class order.
    pub const ALL: [Self; 4] = [Self::Touch, Self::Keyboard, Self::Mouse, Self::Program];

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Touch => "touch",
            Self::Mouse => "mouse",
            Self::Keyboard => "keyboard",
            Self::Program => "program",
        }
    }
}

impl fmt::Display for FocusOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<InputModality> for FocusOrigin {
    fn from(modality: InputModality) -> Self {
        match modality {
            InputModality::Keyboard => Self::Keyboard,
            InputModality::Mouse => Self::Mouse,
            InputModality::Touch => Self::Touch,
        }
    }
}

/// How long an interaction keeps counting as the origin of the next focus.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DetectionMode {
    /// The interaction expires shortly after it happened: one tick for keys
    /// and mouse presses, the touch buffer for touches. Later focus changes
    /// are attributed to [`FocusOrigin::Program`].
    #[default]
    Immediate,
    /// The most recent interaction never expires; every focus change is
    /// attributed to it until another interaction replaces it.
    Eventual,
}

/// Configuration for [`FocusMonitor`](crate::FocusMonitor).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FocusMonitorOptions {
    /// Expiry policy for interaction-derived origins.
    pub detection_mode: DetectionMode,
}

/// Options forwarded to the host's `focus()` call.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FocusOptions {
    /// Do not scroll the element into view.
    pub prevent_scroll: bool,
}
