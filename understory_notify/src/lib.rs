// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_notify --heading-base-level=0

//! Understory Notify: single-threaded multicast subjects.
//!
//! A [`Subject`] is a cheap, cloneable handle to an observer list. Every
//! value passed to [`Subject::next`] is delivered to all current observers in
//! subscription order, and the subject remembers the most recent value so it
//! can be read back synchronously with [`Subject::value`].
//!
//! ## Flavors
//!
//! - [`Subject::new`]: plain multicast; late subscribers only see future values.
//! - [`Subject::with_value`]: current-value subject; each new subscriber first
//!   receives the current value, then future ones.
//! - [`Subject::of`]: an already-completed subject that replays a single value
//!   and then completion to every subscriber.
//!
//! ## Lifetime
//!
//! [`Subject::subscribe`] returns a [`Subscription`] guard. Dropping the guard
//! (or calling [`Subscription::unsubscribe`]) removes the observer. After
//! [`Subject::complete`] every observer is notified once with
//! [`Notification::Complete`] and released; further values are ignored.
//!
//! ## Reentrancy
//!
//! Observers may subscribe, unsubscribe, and emit on *other* subjects while
//! being notified. Observers added during a notification start receiving
//! values from the next emission. Emitting on the same subject from inside
//! one of its own observers only reaches observers added during that
//! notification.
//!
//! ## Minimal example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use understory_notify::Subject;
//!
//! let origins: Subject<Option<&str>> = Subject::new();
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let sink = seen.clone();
//! let sub = origins.subscribe(move |o| sink.borrow_mut().push(*o));
//! assert_eq!(origins.observer_count(), 1);
//!
//! origins.next(Some("keyboard"));
//! origins.next(None);
//! assert_eq!(*seen.borrow(), vec![Some("keyboard"), None]);
//! assert_eq!(origins.value(), Some(None));
//!
//! drop(sub);
//! assert!(!origins.has_observers());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

/// A single notification delivered to an observer.
#[derive(Debug, PartialEq, Eq)]
pub enum Notification<'a, T> {
    /// A new value was emitted.
    Next(&'a T),
    /// The subject completed; no further notifications follow.
    Complete,
}

type Observer<T> = Box<dyn FnMut(Notification<'_, T>)>;

struct Inner<T> {
    observers: Vec<(u64, Observer<T>)>,
    next_id: u64,
    last: Option<T>,
    replay: bool,
    completed: bool,
    /// Ids of observers taken out of `observers` by an in-flight emission.
    in_flight: Vec<u64>,
}

impl<T> Inner<T> {
    /// Returns the removed observer so the caller can drop it unborrowed.
    fn unsubscribe(&mut self, id: u64) -> Option<Observer<T>> {
        if let Some(pos) = self.observers.iter().position(|(i, _)| *i == id) {
            return Some(self.observers.remove(pos).1);
        }
        if let Some(pos) = self.in_flight.iter().position(|i| *i == id) {
            self.in_flight.swap_remove(pos);
        }
        None
    }
}

/// A multicast, last-value-retaining observer list.
///
/// Cloning a `Subject` yields another handle to the same observer list; use
/// [`Subject::ptr_eq`] to check identity.
pub struct Subject<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Subject")
            .field("observers", &inner.observers.len())
            .field("last", &inner.last)
            .field("replay", &inner.replay)
            .field("completed", &inner.completed)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Subject<T> {
    fn from_parts(last: Option<T>, replay: bool, completed: bool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                observers: Vec::new(),
                next_id: 0,
                last,
                replay,
                completed,
                in_flight: Vec::new(),
            })),
        }
    }

    /// Create a plain subject with no value.
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(None, false, false)
    }

    /// Create a subject holding `initial` that replays its current value to
    /// each new subscriber.
    #[must_use]
    pub fn with_value(initial: T) -> Self {
        Self::from_parts(Some(initial), true, false)
    }

    /// Create a completed subject that delivers `value` and then completion
    /// to every subscriber.
    #[must_use]
    pub fn of(value: T) -> Self {
        Self::from_parts(Some(value), true, true)
    }

    /// Returns `true` if both handles refer to the same observer list.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of live observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        let inner = self.inner.borrow();
        inner.observers.len() + inner.in_flight.len()
    }

    /// Returns `true` if at least one observer is subscribed.
    #[must_use]
    pub fn has_observers(&self) -> bool {
        self.observer_count() > 0
    }

    /// Returns `true` once [`Subject::complete`] has been called.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.inner.borrow().completed
    }

    /// Register a value observer.
    ///
    /// Completion is not reported; use [`Subject::subscribe_with`] when the
    /// observer needs to know about it.
    pub fn subscribe(&self, mut observer: impl FnMut(&T) + 'static) -> Subscription
    where
        T: Clone,
    {
        self.subscribe_with(move |n| {
            if let Notification::Next(value) = n {
                observer(value);
            }
        })
    }

    /// Register an observer that receives both values and completion.
    pub fn subscribe_with(
        &self,
        mut observer: impl FnMut(Notification<'_, T>) + 'static,
    ) -> Subscription
    where
        T: Clone,
    {
        let (replayed, completed) = {
            let inner = self.inner.borrow();
            let replayed = if inner.replay { inner.last.clone() } else { None };
            (replayed, inner.completed)
        };
        if let Some(value) = &replayed {
            observer(Notification::Next(value));
        }
        if completed {
            observer(Notification::Complete);
            return Subscription::inert();
        }

        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.observers.push((id, Box::new(observer)));
            id
        };
        let weak: Weak<RefCell<Inner<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    let removed = inner.borrow_mut().unsubscribe(id);
                    drop(removed);
                }
            })),
        }
    }

    /// Emit a value to every observer and retain it as the current value.
    ///
    /// Ignored once the subject has completed.
    pub fn next(&self, value: T)
    where
        T: Clone,
    {
        let mut taken = {
            let mut inner = self.inner.borrow_mut();
            if inner.completed {
                return;
            }
            inner.last = Some(value.clone());
            let taken = core::mem::take(&mut inner.observers);
            inner.in_flight.extend(taken.iter().map(|(id, _)| *id));
            taken
        };

        for (id, observer) in taken.iter_mut() {
            if !self.inner.borrow().in_flight.contains(id) {
                continue;
            }
            observer(Notification::Next(&value));
        }

        let mut inner = self.inner.borrow_mut();
        // Observers unsubscribed mid-emission may own subscriptions to this
        // subject, so they are dropped only after the borrow is released.
        let (mut kept, removed): (Vec<_>, Vec<_>) = taken
            .into_iter()
            .partition(|(id, _)| inner.in_flight.contains(id));
        inner
            .in_flight
            .retain(|id| !kept.iter().any(|(k, _)| k == id));
        if inner.completed {
            // Completed from inside an observer: the observers this emission
            // held still need their completion notification.
            drop(inner);
            drop(removed);
            for (_, observer) in kept.iter_mut() {
                observer(Notification::Complete);
            }
            return;
        }
        kept.append(&mut inner.observers);
        inner.observers = kept;
        drop(inner);
        drop(removed);
    }

    /// Complete the subject, notifying and then releasing every observer.
    ///
    /// Idempotent; the current value is retained for [`Subject::value`].
    pub fn complete(&self) {
        let taken = {
            let mut inner = self.inner.borrow_mut();
            if inner.completed {
                return;
            }
            inner.completed = true;
            core::mem::take(&mut inner.observers)
        };
        for (_, mut observer) in taken {
            observer(Notification::Complete);
        }
    }

    /// The most recently emitted (or initial) value.
    #[must_use]
    pub fn value(&self) -> Option<T>
    where
        T: Clone,
    {
        self.inner.borrow().last.clone()
    }
}

/// Guard for a registered observer.
///
/// The observer stays registered until the guard is dropped, explicitly
/// unsubscribed, or the subject completes. Use [`Subscription::detach`] to
/// keep the observer alive for the lifetime of the subject.
#[must_use = "dropping a Subscription immediately unsubscribes its observer"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn inert() -> Self {
        Self { unsubscribe: None }
    }

    /// Remove the observer now.
    pub fn unsubscribe(mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }

    /// Give up the guard without removing the observer.
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }

    /// Returns `true` if dropping this guard would remove an observer.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.unsubscribe.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
