// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_timing --heading-base-level=0

//! Understory Timing: host-agnostic timer queue primitives.
//!
//! UI engines frequently need short-lived, cancellable timeouts ("reset this
//! state after one tick", "forget this interaction after 650 ms") without
//! owning an event loop. [`TimerQueue`] keeps such timeouts as plain data: the
//! host tells the queue what time it is via [`TimerQueue::advance`] and gets
//! back every payload whose deadline has passed.
//!
//! ## Clock model
//!
//! - Time is an opaque, monotonically increasing `u64` (typically milliseconds
//!   taken from event timestamps).
//! - [`TimerQueue::schedule`] arms a timer relative to the queue's current time.
//! - A timer is due once the clock has moved strictly past its deadline, so a
//!   zero-delay timer fires on the next tick rather than the current one.
//! - Going backwards in time is ignored; the clock never rewinds.
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_timing::TimerQueue;
//!
//! let mut timers: TimerQueue<&str> = TimerQueue::new();
//! timers.advance(100);
//!
//! let reset = timers.schedule(1, "reset");
//! let _ = timers.schedule(650, "touch");
//! assert_eq!(timers.next_deadline(), Some(101));
//!
//! // Same tick: nothing is due yet.
//! assert!(timers.advance(101).is_empty());
//!
//! // Past the deadline: the reset fires, the touch timer stays armed.
//! let fired = timers.advance(102);
//! assert_eq!(fired, vec![(reset, "reset")]);
//! assert_eq!(timers.len(), 1);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

/// Handle for a scheduled timer.
///
/// Ids are never reused within a queue, so cancelling a stale id is a no-op.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// A queue of pending timeouts ordered by deadline.
#[derive(Clone, Debug)]
pub struct TimerQueue<T> {
    now: u64,
    next_id: u64,
    /// Pending timers keyed by `(deadline, id)` so that iteration yields
    /// deadline order with insertion order as the tie-break.
    pending: BTreeMap<(u64, TimerId), T>,
    /// Reverse index from id to deadline, for cancellation.
    deadlines: BTreeMap<TimerId, u64>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    /// Create an empty queue whose clock starts at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: 0,
            next_id: 0,
            pending: BTreeMap::new(),
            deadlines: BTreeMap::new(),
        }
    }

    /// The queue's current time.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Number of armed timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    /// Returns `true` if no timer is armed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Arm a timer that becomes due `delay` units after the current time.
    pub fn schedule(&mut self, delay: u64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = self.now.saturating_add(delay);
        self.pending.insert((deadline, id), payload);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Disarm a timer, returning its payload if it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let deadline = self.deadlines.remove(&id)?;
        self.pending.remove(&(deadline, id))
    }

    /// Returns `true` if `id` is armed and has not fired yet.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Deadline of an armed timer.
    #[must_use]
    pub fn deadline(&self, id: TimerId) -> Option<u64> {
        self.deadlines.get(&id).copied()
    }

    /// Earliest deadline among armed timers.
    ///
    /// Hosts can use this to decide when to call [`TimerQueue::advance`] next;
    /// the timer fires on the first advance strictly past this value.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.keys().next().map(|&(deadline, _)| deadline)
    }

    /// Move the clock to `now` and remove every timer that has become due.
    ///
    /// Fired timers are returned in deadline order; timers sharing a deadline
    /// come back in the order they were scheduled. If `now` is earlier than
    /// the current time the clock does not move, but timers already past due
    /// are still collected.
    pub fn advance(&mut self, now: u64) -> Vec<(TimerId, T)> {
        self.now = self.now.max(now);
        let mut fired = Vec::new();
        while let Some(entry) = self.pending.first_entry() {
            let (deadline, id) = *entry.key();
            if deadline >= self.now {
                break;
            }
            let payload = entry.remove();
            self.deadlines.remove(&id);
            fired.push((id, payload));
        }
        fired
    }

    /// Disarm every timer without firing it.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.deadlines.clear();
    }
}
