// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CSS state classes applied to monitored elements.

use crate::host::DomHost;
use crate::origin::FocusOrigin;

/// Present whenever the element counts as focused.
pub const FOCUSED: &str = "cdk-focused";
/// Focused through touch.
pub const TOUCH_FOCUSED: &str = "cdk-touch-focused";
/// Focused through the keyboard.
pub const KEYBOARD_FOCUSED: &str = "cdk-keyboard-focused";
/// Focused through the mouse.
pub const MOUSE_FOCUSED: &str = "cdk-mouse-focused";
/// Focused programmatically.
pub const PROGRAM_FOCUSED: &str = "cdk-program-focused";

/// The origin-specific class for `origin`.
#[must_use]
pub const fn origin_class(origin: FocusOrigin) -> &'static str {
    match origin {
        FocusOrigin::Touch => TOUCH_FOCUSED,
        FocusOrigin::Keyboard => KEYBOARD_FOCUSED,
        FocusOrigin::Mouse => MOUSE_FOCUSED,
        FocusOrigin::Program => PROGRAM_FOCUSED,
    }
}

/// Sync all five classes on `node` with `origin`; `None` clears them.
pub(crate) fn set_classes<H: DomHost + ?Sized>(
    host: &mut H,
    node: &H::Node,
    origin: Option<FocusOrigin>,
) {
    host.set_class(node, FOCUSED, origin.is_some());
    for o in FocusOrigin::ALL {
        host.set_class(node, origin_class(o), origin == Some(o));
    }
}
