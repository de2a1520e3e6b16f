// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A scripted document for integration tests.
//!
//! [`Dom`] implements the host traits over a flat node table and records
//! every listener and class change. [`Page`] wires a `Dom` to a detector and a
//! monitor and only delivers an event when a listener for it is installed,
//! the way a browser would.

#![allow(
    dead_code,
    missing_docs,
    reason = "Integration-test helper module; not every test uses every helper."
)]

use std::collections::{BTreeSet, HashMap};

use kurbo::Point;
use smallvec::smallvec;
use understory_focus_monitor::{
    DomHost, FocusMonitor, FocusMonitorOptions, FocusOptions, FocusOrigin,
};
use understory_input_modality::{
    EventHost, EventKind, EventTarget, FocusEvent, InputModalityDetector, InputModalityOptions,
    KeyboardEvent, ListenerOptions, MouseEvent, RootNode, Touch, TouchEvent,
};

pub type Node = u32;

#[derive(Clone, Debug)]
struct NodeData {
    parent: Option<Node>,
    root: RootNode<Node>,
    element: bool,
    labelable: bool,
    attributes: Vec<&'static str>,
    labels: Vec<Node>,
}

#[derive(Debug, Default)]
pub struct Dom {
    nodes: HashMap<Node, NodeData>,
    classes: HashMap<Node, BTreeSet<&'static str>>,
    listeners: Vec<(EventTarget<Node>, EventKind, ListenerOptions)>,
    pub adds: usize,
    pub removes: usize,
    pub active: Option<Node>,
    pub focus_requests: Vec<(Node, FocusOptions)>,
    pub server: bool,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element under `parent` (or at the top of the document).
    pub fn element(&mut self, id: Node, parent: Option<Node>) -> &mut Self {
        let root = parent.map_or(RootNode::Document, |p| self.nodes[&p].root);
        self.insert(id, parent, root, true);
        self
    }

    /// Add an element at the top of the shadow root hosted by `host`.
    pub fn shadow_element(&mut self, id: Node, host: Node) -> &mut Self {
        self.insert(id, None, RootNode::ShadowRoot(host), true);
        self
    }

    /// Add a text node under `parent`.
    pub fn text(&mut self, id: Node, parent: Node) -> &mut Self {
        let root = self.nodes[&parent].root;
        self.insert(id, Some(parent), root, false);
        self
    }

    /// Add an `<input>` under `parent`, labelled by `labels`.
    pub fn input(&mut self, id: Node, parent: Option<Node>, labels: &[Node]) -> &mut Self {
        self.element(id, parent);
        let data = self.nodes.get_mut(&id).unwrap();
        data.labelable = true;
        data.labels = labels.to_vec();
        self
    }

    pub fn set_attribute(&mut self, id: Node, name: &'static str) {
        self.nodes.get_mut(&id).unwrap().attributes.push(name);
    }

    fn insert(&mut self, id: Node, parent: Option<Node>, root: RootNode<Node>, element: bool) {
        self.nodes.insert(
            id,
            NodeData {
                parent,
                root,
                element,
                labelable: false,
                attributes: Vec::new(),
                labels: Vec::new(),
            },
        );
    }

    pub fn classes(&self, id: Node) -> Vec<&'static str> {
        self.classes
            .get(&id)
            .map(|c| c.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn has_listener(&self, target: EventTarget<Node>, kind: EventKind) -> bool {
        self.listeners.iter().any(|(t, k, _)| *t == target && *k == kind)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn root_of(&self, id: Node) -> RootNode<Node> {
        self.nodes[&id].root
    }
}

impl EventHost for Dom {
    type Node = Node;

    fn is_browser(&self) -> bool {
        !self.server
    }

    fn add_event_listener(
        &mut self,
        target: EventTarget<Node>,
        kind: EventKind,
        options: ListenerOptions,
    ) {
        assert!(
            !self.listeners.contains(&(target, kind, options)),
            "listener {target:?}/{} added twice",
            kind.name()
        );
        self.adds += 1;
        self.listeners.push((target, kind, options));
    }

    fn remove_event_listener(
        &mut self,
        target: EventTarget<Node>,
        kind: EventKind,
        options: ListenerOptions,
    ) {
        let before = self.listeners.len();
        self.listeners.retain(|l| *l != (target, kind, options));
        assert_eq!(
            before,
            self.listeners.len() + 1,
            "removed a listener that was never added"
        );
        self.removes += 1;
    }
}

impl DomHost for Dom {
    fn is_element(&self, node: &Node) -> bool {
        self.nodes.get(node).is_some_and(|n| n.element)
    }

    fn parent_element(&self, node: &Node) -> Option<Node> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    fn root_node(&self, node: &Node) -> RootNode<Node> {
        self.nodes[node].root
    }

    fn active_element(&self) -> Option<Node> {
        self.active
    }

    fn set_class(&mut self, node: &Node, class: &'static str, enabled: bool) {
        let set = self.classes.entry(*node).or_default();
        if enabled {
            set.insert(class);
        } else {
            set.remove(class);
        }
    }

    fn focus(&mut self, node: &Node, options: FocusOptions) {
        self.focus_requests.push((*node, options));
    }

    fn has_attribute(&self, node: &Node, name: &str) -> bool {
        self.nodes.get(node).is_some_and(|n| n.attributes.contains(&name))
    }

    fn is_labelable_input(&self, node: &Node) -> bool {
        self.nodes.get(node).is_some_and(|n| n.labelable)
    }

    fn labels(&self, node: &Node) -> Vec<Node> {
        self.nodes.get(node).map(|n| n.labels.clone()).unwrap_or_default()
    }
}

/// A document with an input modality detector and a focus monitor attached.
#[derive(Debug)]
pub struct Page {
    pub dom: Dom,
    pub detector: InputModalityDetector<Node>,
    pub monitor: FocusMonitor<Node>,
}

impl Page {
    pub fn new(dom: Dom) -> Self {
        Self::with_options(dom, FocusMonitorOptions::default())
    }

    pub fn with_options(mut dom: Dom, options: FocusMonitorOptions) -> Self {
        let detector = InputModalityDetector::new(&mut dom, InputModalityOptions::default());
        let monitor = FocusMonitor::new(detector.clone(), options);
        Self {
            dom,
            detector,
            monitor,
        }
    }

    fn document_listens(&self, kind: EventKind) -> bool {
        self.dom.has_listener(EventTarget::Root(RootNode::Document), kind)
    }

    pub fn keydown(&mut self, target: Node, key_code: u32, time_stamp: u64) {
        if self.document_listens(EventKind::KeyDown) {
            self.detector.handle_keydown(&KeyboardEvent {
                target: Some(target),
                key_code,
                time_stamp,
            });
        }
    }

    pub fn mousedown(&mut self, target: Node, time_stamp: u64) {
        self.raw_mousedown(target, 1, 1, time_stamp);
    }

    pub fn raw_mousedown(&mut self, target: Node, buttons: u16, detail: u32, time_stamp: u64) {
        if self.document_listens(EventKind::MouseDown) {
            self.detector.handle_mousedown(&MouseEvent {
                target: Some(target),
                buttons,
                detail,
                client: Point::new(10.0, 10.0),
                offset: Point::new(2.0, 2.0),
                time_stamp,
            });
        }
    }

    pub fn touchstart(&mut self, target: Node, time_stamp: u64) {
        let touch = Touch {
            identifier: 0,
            radius_x: Some(11.5),
            radius_y: Some(11.5),
            client: Point::new(10.0, 10.0),
        };
        self.raw_touchstart(target, touch, time_stamp);
    }

    pub fn raw_touchstart(&mut self, target: Node, touch: Touch, time_stamp: u64) {
        if self.document_listens(EventKind::TouchStart) {
            self.detector.handle_touchstart(&TouchEvent {
                target: Some(target),
                touches: smallvec![touch.clone()],
                changed_touches: smallvec![touch],
                time_stamp,
            });
        }
    }

    /// Move focus to `target` the way the browser does: blur the old active
    /// element, then focus the new one.
    pub fn move_focus(&mut self, target: Option<Node>, time_stamp: u64) {
        let previous = self.dom.active;
        if previous == target {
            return;
        }
        if let Some(previous) = previous {
            let event = FocusEvent {
                target: Some(previous),
                related_target: target,
                time_stamp,
            };
            if self.root_listens(previous, EventKind::Blur) {
                self.monitor.handle_blur(&mut self.dom, &event);
            }
        }
        self.dom.active = target;
        if let Some(target) = target {
            let event = FocusEvent {
                target: Some(target),
                related_target: previous,
                time_stamp,
            };
            if self.root_listens(target, EventKind::Focus) {
                self.monitor.handle_focus(&mut self.dom, &event);
            }
        }
    }

    /// Call `focus_via` and then deliver the focus change it requested.
    pub fn focus_via(&mut self, target: Node, origin: FocusOrigin, time_stamp: u64) {
        self.monitor.focus_via(
            &mut self.dom,
            &target,
            origin,
            FocusOptions::default(),
            time_stamp,
        );
        let requests: Vec<_> = self.dom.focus_requests.drain(..).collect();
        for (node, _) in requests {
            self.move_focus(Some(node), time_stamp);
        }
    }

    pub fn window_focus(&mut self, time_stamp: u64) {
        if self.dom.has_listener(EventTarget::Window, EventKind::Focus) {
            self.monitor.handle_window_focus(time_stamp);
        }
    }

    fn root_listens(&self, node: Node, kind: EventKind) -> bool {
        self.dom.has_listener(EventTarget::Root(self.dom.root_of(node)), kind)
    }
}
