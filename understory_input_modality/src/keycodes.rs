// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Legacy `keyCode` values for the modifier keys ignored by default.

/// Shift.
pub const SHIFT: u32 = 16;
/// Control.
pub const CONTROL: u32 = 17;
/// Alt / Option.
pub const ALT: u32 = 18;
/// Meta (left Windows/Command key).
pub const META: u32 = 91;
/// Meta as reported by Firefox on macOS.
pub const MAC_META: u32 = 224;
