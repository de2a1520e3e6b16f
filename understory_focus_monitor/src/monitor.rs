// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The focus monitor.
//!
//! ## Listener topology
//!
//! - One capture-phase `focus`/`blur` pair per root node (document or shadow
//!   root), reference counted across the monitored elements under it.
//! - One `focus` listener on the window and one subscription to the input
//!   modality detector for the whole monitor, held while at least one element
//!   is monitored.
//!
//! ## Attribution
//!
//! Each captured `focus` walks from the event target up through
//! `parent_element`. Every monitored element on that path whose record
//! covers the target (the target itself, or any descendant when
//! `check_children` is set) is classified from the same event:
//!
//! 1. A pending interaction origin wins. A pending origin that came from a
//!    touch is only kept as [`FocusOrigin::Touch`] if the detection mode is
//!    [`DetectionMode::Eventual`] or the touched node lies inside the focus
//!    target; otherwise something programmatic intervened and the focus is
//!    [`FocusOrigin::Program`].
//! 2. If the window itself was just refocused, the last attributed origin is
//!    restored.
//! 3. A mouse press on a `<label>` that focuses its input counts as
//!    [`FocusOrigin::Mouse`].
//! 4. Anything else is [`FocusOrigin::Program`].

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;
use understory_input_modality::{
    EventKind, EventTarget, FocusEvent, InputModality, InputModalityDetector, ListenerOptions,
    RootNode,
};
use understory_notify::{Subject, Subscription};

use crate::attribution::Attribution;
use crate::classes::set_classes;
use crate::host::DomHost;
use crate::origin::{DetectionMode, FocusMonitorOptions, FocusOptions, FocusOrigin};
use crate::registry::RootListenerRegistry;

/// Per-element stream of focus origins; `None` means the element lost focus.
pub type OriginStream = Subject<Option<FocusOrigin>>;

type Path<N> = SmallVec<[N; 4]>;

#[derive(Debug)]
struct MonitoredElement<N> {
    check_children: bool,
    origin: OriginStream,
    root: RootNode<N>,
}

/// Tracks why monitored elements receive focus.
///
/// Host contract:
/// - Forward captured `focus`/`blur` events from every root that holds
///   listeners to [`FocusMonitor::handle_focus`] / [`FocusMonitor::handle_blur`].
/// - Forward window `focus` to [`FocusMonitor::handle_window_focus`].
/// - Call [`FocusMonitor::advance`] when the clock passes
///   [`FocusMonitor::next_deadline`] with no event in between.
pub struct FocusMonitor<N: 'static> {
    detector: InputModalityDetector<N>,
    attribution: Rc<RefCell<Attribution>>,
    elements: HashMap<N, MonitoredElement<N>>,
    roots: RootListenerRegistry<N>,
    detection: Option<Subscription>,
}

impl<N: fmt::Debug + 'static> fmt::Debug for FocusMonitor<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusMonitor")
            .field("attribution", &self.attribution.borrow())
            .field("elements", &self.elements)
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

impl<N: Clone + Eq + Hash + 'static> FocusMonitor<N> {
    /// Create a monitor that consults `detector` for interaction origins.
    ///
    /// No listeners are installed until the first element is monitored.
    pub fn new(detector: InputModalityDetector<N>, options: FocusMonitorOptions) -> Self {
        Self {
            detector,
            attribution: Rc::new(RefCell::new(Attribution::new(options.detection_mode))),
            elements: HashMap::new(),
            roots: RootListenerRegistry::new(),
            detection: None,
        }
    }

    /// The input modality detector this monitor consults.
    #[must_use]
    pub fn detector(&self) -> &InputModalityDetector<N> {
        &self.detector
    }

    /// The configured detection mode.
    #[must_use]
    pub fn detection_mode(&self) -> DetectionMode {
        self.attribution.borrow().mode
    }

    /// Start monitoring `element` and return its origin stream.
    ///
    /// Monitoring an element twice returns the same stream; `check_children`
    /// can be turned on by a later call but never off. Outside a browser, or
    /// for non-element nodes, this returns a completed stream that only
    /// replays `None`.
    pub fn monitor<H>(&mut self, host: &mut H, element: &N, check_children: bool) -> OriginStream
    where
        H: DomHost<Node = N> + ?Sized,
    {
        if !host.is_browser() || !host.is_element(element) {
            return Subject::of(None);
        }
        if let Some(info) = self.elements.get_mut(element) {
            info.check_children |= check_children;
            return info.origin.clone();
        }

        let root = host.root_node(element);
        let origin = OriginStream::new();
        self.roots.acquire(host, root.clone());
        self.elements.insert(
            element.clone(),
            MonitoredElement {
                check_children,
                origin: origin.clone(),
                root,
            },
        );
        if self.elements.len() == 1 {
            self.start_global_listeners(host);
        }
        origin
    }

    /// Stop monitoring `element`: complete its stream, clear its classes, and
    /// release its root listeners.
    ///
    /// Returns `false` if the element was not monitored.
    pub fn stop_monitoring<H>(&mut self, host: &mut H, element: &N) -> bool
    where
        H: DomHost<Node = N> + ?Sized,
    {
        let Some(info) = self.elements.remove(element) else {
            return false;
        };
        info.origin.complete();
        set_classes(host, element, None);
        self.roots.release(host, &info.root);
        if self.elements.is_empty() {
            self.stop_global_listeners(host);
        }
        true
    }

    /// Focus `element` and attribute the focus to `origin`.
    ///
    /// If `element` already has focus the host would fire no event, so every
    /// monitored record covering it is updated synchronously. Otherwise the
    /// origin is made pending and focus is requested from the host; the
    /// resulting `focus` event must be delivered to
    /// [`FocusMonitor::handle_focus`] before the origin expires.
    pub fn focus_via<H>(
        &mut self,
        host: &mut H,
        element: &N,
        origin: FocusOrigin,
        options: FocusOptions,
        now: u64,
    ) where
        H: DomHost<Node = N> + ?Sized,
    {
        if host.active_element().as_ref() == Some(element) {
            self.attribution.borrow_mut().advance(now);
            for covering in self.monitored_path(host, Some(element)) {
                let covers = covering == *element
                    || self.elements.get(&covering).is_some_and(|info| info.check_children);
                if covers {
                    self.origin_changed(host, &covering, origin);
                }
            }
        } else {
            self.attribution.borrow_mut().set_origin(origin, false, now);
            host.focus(element, options);
        }
    }

    /// Handle a captured `focus` event from any root with listeners.
    pub fn handle_focus<H>(&mut self, host: &mut H, event: &FocusEvent<N>)
    where
        H: DomHost<Node = N> + ?Sized,
    {
        self.attribution.borrow_mut().advance(event.time_stamp);
        let target = event.target.as_ref();
        for element in self.monitored_path(host, target) {
            self.on_focus(host, &element, target);
        }
    }

    /// Handle a captured `blur` event from any root with listeners.
    pub fn handle_blur<H>(&mut self, host: &mut H, event: &FocusEvent<N>)
    where
        H: DomHost<Node = N> + ?Sized,
    {
        self.attribution.borrow_mut().advance(event.time_stamp);
        let related = event.related_target.as_ref();
        for element in self.monitored_path(host, event.target.as_ref()) {
            self.on_blur(host, &element, related);
        }
    }

    /// Handle `focus` on the window.
    pub fn handle_window_focus(&mut self, now: u64) {
        self.attribution.borrow_mut().window_focused(now);
    }

    /// Fire any expired origin or window-focus reset.
    pub fn advance(&mut self, now: u64) {
        self.attribution.borrow_mut().advance(now);
    }

    /// When the next reset becomes due; see [`FocusMonitor::advance`].
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.attribution.borrow().next_deadline()
    }

    /// Stop monitoring every element, releasing all listeners.
    pub fn destroy<H>(&mut self, host: &mut H)
    where
        H: DomHost<Node = N> + ?Sized,
    {
        let elements: Vec<N> = self.elements.keys().cloned().collect();
        for element in &elements {
            self.stop_monitoring(host, element);
        }
    }

    /// Returns `true` if `element` is monitored.
    #[must_use]
    pub fn is_monitored(&self, element: &N) -> bool {
        self.elements.contains_key(element)
    }

    /// Whether focus inside `element`'s subtree counts, if it is monitored.
    #[must_use]
    pub fn checks_children(&self, element: &N) -> Option<bool> {
        self.elements.get(element).map(|info| info.check_children)
    }

    /// Number of monitored elements.
    #[must_use]
    pub fn monitored_count(&self) -> usize {
        self.elements.len()
    }

    /// Number of monitored elements registered under `root`.
    #[must_use]
    pub fn root_listener_count(&self, root: &RootNode<N>) -> usize {
        self.roots.count(root)
    }

    /// Number of roots currently holding a focus/blur listener pair.
    #[must_use]
    pub fn listened_root_count(&self) -> usize {
        self.roots.len()
    }

    /// The origin the next focus event would receive from a pending
    /// interaction, if any.
    #[must_use]
    pub fn pending_origin(&self) -> Option<FocusOrigin> {
        self.attribution.borrow().origin
    }

    /// The origin most recently attributed to any monitored element.
    #[must_use]
    pub fn last_focus_origin(&self) -> Option<FocusOrigin> {
        self.attribution.borrow().last_focus_origin
    }

    fn start_global_listeners<H>(&mut self, host: &mut H)
    where
        H: DomHost<Node = N> + ?Sized,
    {
        host.add_event_listener(EventTarget::Window, EventKind::Focus, ListenerOptions::empty());
        let state = Rc::downgrade(&self.attribution);
        self.detection = Some(self.detector.detections().subscribe(move |detection| {
            if let Some(state) = state.upgrade() {
                state.borrow_mut().set_origin(
                    detection.modality.into(),
                    true,
                    detection.time_stamp,
                );
            }
        }));
        log::debug!("focus monitor started");
    }

    fn stop_global_listeners<H>(&mut self, host: &mut H)
    where
        H: DomHost<Node = N> + ?Sized,
    {
        host.remove_event_listener(EventTarget::Window, EventKind::Focus, ListenerOptions::empty());
        self.detection = None;
        self.attribution.borrow_mut().cancel_timers();
        log::debug!("focus monitor stopped");
    }

    /// Monitored elements from `start` up to its root, inner-most first.
    fn monitored_path<H>(&self, host: &H, start: Option<&N>) -> Path<N>
    where
        H: DomHost<Node = N> + ?Sized,
    {
        let mut path = Path::new();
        let mut current = start.cloned();
        while let Some(node) = current {
            current = host.parent_element(&node);
            if self.elements.contains_key(&node) {
                path.push(node);
            }
        }
        path
    }

    fn on_focus<H>(&mut self, host: &mut H, element: &N, target: Option<&N>)
    where
        H: DomHost<Node = N> + ?Sized,
    {
        let Some(info) = self.elements.get(element) else {
            return;
        };
        if !info.check_children && target != Some(element) {
            return;
        }
        let origin = self.focus_origin(host, target);
        self.origin_changed(host, element, origin);
    }

    fn on_blur<H>(&mut self, host: &mut H, element: &N, related: Option<&N>)
    where
        H: DomHost<Node = N> + ?Sized,
    {
        let Some(info) = self.elements.get(element) else {
            return;
        };
        if info.check_children && related.is_some_and(|r| host.contains(element, r)) {
            return;
        }
        set_classes(host, element, None);
        emit(&info.origin, None);
    }

    fn origin_changed<H>(&mut self, host: &mut H, element: &N, origin: FocusOrigin)
    where
        H: DomHost<Node = N> + ?Sized,
    {
        log::trace!("focus attributed to {origin}");
        set_classes(host, element, Some(origin));
        if let Some(info) = self.elements.get(element) {
            emit(&info.origin, Some(origin));
        }
        self.attribution.borrow_mut().last_focus_origin = Some(origin);
    }

    fn focus_origin<H>(&self, host: &H, target: Option<&N>) -> FocusOrigin
    where
        H: DomHost<Node = N> + ?Sized,
    {
        let (pending, from_touch, mode, restored) = {
            let a = self.attribution.borrow();
            let restored = a.last_focus_origin.filter(|_| a.window_focused);
            (a.origin, a.from_touch, a.mode, restored)
        };
        if let Some(origin) = pending {
            if !from_touch {
                return origin;
            }
            return if mode == DetectionMode::Eventual || self.touch_inside(host, target) {
                FocusOrigin::Touch
            } else {
                FocusOrigin::Program
            };
        }
        if let Some(origin) = restored {
            return origin;
        }
        if target.is_some_and(|t| self.clicked_label_of(host, t)) {
            return FocusOrigin::Mouse;
        }
        FocusOrigin::Program
    }

    /// The most recently touched node lies inside the focus target.
    fn touch_inside<H>(&self, host: &H, target: Option<&N>) -> bool
    where
        H: DomHost<Node = N> + ?Sized,
    {
        match (target, self.detector.most_recent_target()) {
            (Some(target), Some(touched)) => host.contains(target, &touched),
            _ => false,
        }
    }

    /// The most recent interaction was a mouse press on one of `input`'s labels.
    fn clicked_label_of<H>(&self, host: &H, input: &N) -> bool
    where
        H: DomHost<Node = N> + ?Sized,
    {
        if self.detector.most_recent_modality() != Some(InputModality::Mouse) {
            return false;
        }
        let Some(pressed) = self.detector.most_recent_target() else {
            return false;
        };
        if pressed == *input || !host.is_labelable_input(input) {
            return false;
        }
        host.labels(input).iter().any(|label| host.contains(label, &pressed))
    }
}

// Nothing is emitted while a stream has no observers.
fn emit(stream: &OriginStream, origin: Option<FocusOrigin>) {
    if stream.has_observers() {
        stream.next(origin);
    }
}
