// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Global attribution state: the origin the next focus event will receive.
//!
//! Interactions reported by the input modality detector (and explicit
//! `focus_via` calls) set a pending origin. In
//! [`DetectionMode::Immediate`] the pending origin is reset after one tick,
//! or after [`TOUCH_BUFFER_MS`] for touches because mobile browsers fire the
//! focus event late. Every re-arm cancels the previous reset first.

use understory_input_modality::TOUCH_BUFFER_MS;
use understory_timing::{TimerId, TimerQueue};

use crate::origin::{DetectionMode, FocusOrigin};

/// Delay before a non-touch origin expires. Browsers commonly move focus one
/// tick after the key press that caused it.
pub(crate) const ORIGIN_RESET_MS: u64 = 1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Expiry {
    ResetOrigin,
    ClearWindowFocus,
}

#[derive(Debug)]
pub(crate) struct Attribution {
    pub(crate) mode: DetectionMode,
    /// Origin for the next focus event.
    pub(crate) origin: Option<FocusOrigin>,
    /// `origin` came straight from a touch interaction.
    pub(crate) from_touch: bool,
    /// The window itself was focused during the current tick.
    pub(crate) window_focused: bool,
    pub(crate) last_focus_origin: Option<FocusOrigin>,
    timers: TimerQueue<Expiry>,
    origin_timer: Option<TimerId>,
    window_timer: Option<TimerId>,
}

impl Attribution {
    pub(crate) fn new(mode: DetectionMode) -> Self {
        Self {
            mode,
            origin: None,
            from_touch: false,
            window_focused: false,
            last_focus_origin: None,
            timers: TimerQueue::new(),
            origin_timer: None,
            window_timer: None,
        }
    }

    /// Fire every reset that is due at `now`.
    pub(crate) fn advance(&mut self, now: u64) {
        for (id, expiry) in self.timers.advance(now) {
            match expiry {
                Expiry::ResetOrigin => {
                    debug_assert_eq!(self.origin_timer, Some(id), "stale origin reset");
                    self.origin_timer = None;
                    self.origin = None;
                    self.from_touch = false;
                }
                Expiry::ClearWindowFocus => {
                    debug_assert_eq!(self.window_timer, Some(id), "stale window reset");
                    self.window_timer = None;
                    self.window_focused = false;
                }
            }
        }
    }

    pub(crate) fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    /// Record `origin` as the pending origin at time `now`.
    pub(crate) fn set_origin(&mut self, origin: FocusOrigin, from_interaction: bool, now: u64) {
        self.advance(now);
        self.origin = Some(origin);
        self.from_touch = origin == FocusOrigin::Touch && from_interaction;
        if self.mode == DetectionMode::Immediate {
            if let Some(id) = self.origin_timer.take() {
                self.timers.cancel(id);
            }
            let delay = if self.from_touch {
                TOUCH_BUFFER_MS
            } else {
                ORIGIN_RESET_MS
            };
            self.origin_timer = Some(self.timers.schedule(delay, Expiry::ResetOrigin));
        }
    }

    /// The window regained focus; remember that until the next tick.
    pub(crate) fn window_focused(&mut self, now: u64) {
        self.advance(now);
        self.window_focused = true;
        if let Some(id) = self.window_timer.take() {
            self.timers.cancel(id);
        }
        self.window_timer = Some(self.timers.schedule(0, Expiry::ClearWindowFocus));
    }

    /// Cancel both timers.
    ///
    /// An origin that was waiting on its reset timer is dropped with it; in
    /// [`DetectionMode::Eventual`] the pending origin sticks.
    pub(crate) fn cancel_timers(&mut self) {
        self.timers.clear();
        self.window_timer = None;
        self.window_focused = false;
        if self.origin_timer.take().is_some() {
            self.origin = None;
            self.from_touch = false;
        }
    }
}
