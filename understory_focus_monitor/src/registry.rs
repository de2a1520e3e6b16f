// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference-counted focus/blur listeners per root node.
//!
//! Browsers do not deliver `focus`/`blur` to the document when focus moves
//! inside a shadow root, so each root that contains a monitored element gets
//! its own capture-phase listener pair. A root holds exactly one pair while
//! its count is non-zero.

use core::hash::Hash;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use understory_input_modality::{EventHost, EventKind, EventTarget, ListenerOptions, RootNode};

const KINDS: [EventKind; 2] = [EventKind::Focus, EventKind::Blur];

#[derive(Debug)]
pub(crate) struct RootListenerRegistry<N> {
    counts: HashMap<RootNode<N>, usize>,
}

impl<N: Clone + Eq + Hash> RootListenerRegistry<N> {
    pub(crate) fn new() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }

    /// Count one more monitored element under `root`, installing the
    /// listener pair on the first.
    pub(crate) fn acquire<H>(&mut self, host: &mut H, root: RootNode<N>)
    where
        H: EventHost<Node = N> + ?Sized,
    {
        let count = self.counts.entry(root.clone()).or_insert(0);
        if *count == 0 {
            for kind in KINDS {
                host.add_event_listener(
                    EventTarget::Root(root.clone()),
                    kind,
                    ListenerOptions::CAPTURE_PASSIVE,
                );
            }
            log::trace!("focus listeners installed on {:?} root", RootKind::of(&root));
        }
        *count += 1;
    }

    /// Count one fewer monitored element under `root`, removing the listener
    /// pair with the last.
    pub(crate) fn release<H>(&mut self, host: &mut H, root: &RootNode<N>)
    where
        H: EventHost<Node = N> + ?Sized,
    {
        debug_assert!(
            self.counts.contains_key(root),
            "releasing a root that holds no listeners"
        );
        let Entry::Occupied(mut entry) = self.counts.entry(root.clone()) else {
            return;
        };
        if *entry.get() > 1 {
            *entry.get_mut() -= 1;
            return;
        }
        entry.remove();
        for kind in KINDS {
            host.remove_event_listener(
                EventTarget::Root(root.clone()),
                kind,
                ListenerOptions::CAPTURE_PASSIVE,
            );
        }
        log::trace!("focus listeners removed from {:?} root", RootKind::of(root));
    }

    pub(crate) fn count(&self, root: &RootNode<N>) -> usize {
        self.counts.get(root).copied().unwrap_or(0)
    }

    pub(crate) fn len(&self) -> usize {
        self.counts.len()
    }
}

// Log label that doesn't require `N: Debug`.
#[derive(Debug)]
enum RootKind {
    Document,
    Shadow,
}

impl RootKind {
    fn of<N>(root: &RootNode<N>) -> Self {
        match root {
            RootNode::Document => Self::Document,
            RootNode::ShadowRoot(_) => Self::Shadow,
        }
    }
}
