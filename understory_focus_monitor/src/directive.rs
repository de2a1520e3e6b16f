// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative per-element monitoring.

use alloc::rc::Rc;
use core::cell::Cell;
use core::fmt;
use core::hash::Hash;

use understory_notify::{Subject, Subscription};

use crate::host::DomHost;
use crate::monitor::FocusMonitor;
use crate::origin::FocusOrigin;

/// Attribute that switches a [`MonitorFocus`] to subtree monitoring.
pub const SUBTREE_FOCUS_ATTRIBUTE: &str = "cdkMonitorSubtreeFocus";

/// Monitors one element for the lifetime of a UI component.
///
/// Call [`MonitorFocus::attach`] once the element is in the tree and
/// [`MonitorFocus::detach`] before it is removed. Subtree monitoring is used
/// when the element carries [`SUBTREE_FOCUS_ATTRIBUTE`].
pub struct MonitorFocus<N> {
    element: N,
    focus_change: Subject<Option<FocusOrigin>>,
    focus_origin: Rc<Cell<Option<FocusOrigin>>>,
    subscription: Option<Subscription>,
}

impl<N: fmt::Debug> fmt::Debug for MonitorFocus<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorFocus")
            .field("element", &self.element)
            .field("focus_origin", &self.focus_origin.get())
            .field("attached", &self.subscription.is_some())
            .finish_non_exhaustive()
    }
}

impl<N: Clone + Eq + Hash + 'static> MonitorFocus<N> {
    /// Create a detached directive for `element`.
    pub fn new(element: N) -> Self {
        Self {
            element,
            focus_change: Subject::new(),
            focus_origin: Rc::new(Cell::new(None)),
            subscription: None,
        }
    }

    /// The host element.
    pub fn element(&self) -> &N {
        &self.element
    }

    /// Every origin the element reports, including `None` on blur.
    pub fn focus_change(&self) -> &Subject<Option<FocusOrigin>> {
        &self.focus_change
    }

    /// The last origin reported, or `None` while unfocused.
    pub fn focus_origin(&self) -> Option<FocusOrigin> {
        self.focus_origin.get()
    }

    /// Returns `true` between [`MonitorFocus::attach`] and
    /// [`MonitorFocus::detach`].
    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Start monitoring. Does nothing if already attached.
    pub fn attach<H>(&mut self, monitor: &mut FocusMonitor<N>, host: &mut H)
    where
        H: DomHost<Node = N> + ?Sized,
    {
        if self.subscription.is_some() {
            return;
        }
        let check_children = host.is_element(&self.element)
            && host.has_attribute(&self.element, SUBTREE_FOCUS_ATTRIBUTE);
        let stream = monitor.monitor(host, &self.element, check_children);
        let focus_origin = Rc::clone(&self.focus_origin);
        let focus_change = self.focus_change.clone();
        self.subscription = Some(stream.subscribe(move |origin| {
            focus_origin.set(*origin);
            focus_change.next(*origin);
        }));
    }

    /// Stop monitoring. Does nothing if not attached.
    pub fn detach<H>(&mut self, monitor: &mut FocusMonitor<N>, host: &mut H)
    where
        H: DomHost<Node = N> + ?Sized,
    {
        if let Some(subscription) = self.subscription.take() {
            monitor.stop_monitoring(host, &self.element);
            subscription.unsubscribe();
        }
    }
}
