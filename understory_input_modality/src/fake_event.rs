// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recognizing pointer events synthesized by assistive technology.
//!
//! Screen readers activate controls by dispatching their own `mousedown` or
//! `touchstart` events. Those should count as keyboard interaction. The
//! checks below are heuristics derived from observed screen reader output and
//! will not catch every assistive technology.

use crate::event::{MouseEvent, TouchEvent};

/// Returns `true` if a `mousedown` looks like it was fabricated by a screen
/// reader.
///
/// Firefox reports `buttons == 0` for these events and Chrome reports
/// `detail == 0`; real presses have both set.
///
/// ```rust
/// use kurbo::Point;
/// use understory_input_modality::MouseEvent;
/// use understory_input_modality::fake_event::is_fake_mousedown_from_screen_reader;
///
/// let real = MouseEvent::<u32> {
///     target: Some(1),
///     buttons: 1,
///     detail: 1,
///     client: Point::new(12.0, 30.0),
///     offset: Point::new(4.0, 6.0),
///     time_stamp: 0,
/// };
/// assert!(!is_fake_mousedown_from_screen_reader(&real));
///
/// let synthesized = MouseEvent { buttons: 0, ..real };
/// assert!(is_fake_mousedown_from_screen_reader(&synthesized));
/// ```
#[must_use]
pub fn is_fake_mousedown_from_screen_reader<N>(event: &MouseEvent<N>) -> bool {
    event.buttons == 0 || event.detail == 0
}

/// Returns `true` if a `touchstart` looks like it was fabricated by a screen
/// reader.
///
/// Synthesized contacts carry `identifier == -1` and, when radii are reported
/// at all, a radius of exactly one.
#[must_use]
pub fn is_fake_touchstart_from_screen_reader<N>(event: &TouchEvent<N>) -> bool {
    let Some(touch) = event
        .touches
        .first()
        .or_else(|| event.changed_touches.first())
    else {
        return false;
    };
    let unit = |r: Option<f64>| r.is_none_or(|r| r == 1.0);
    touch.identifier == -1 && unit(touch.radius_x) && unit(touch.radius_y)
}
