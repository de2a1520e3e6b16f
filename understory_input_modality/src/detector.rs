// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The input modality detector.
//!
//! ## Classification
//!
//! - `keydown`: [`InputModality::Keyboard`], unless the key code is in
//!   [`InputModalityOptions::ignore_keys`]. Modifiers are ignored by default
//!   because they usually accompany mouse actions, and some screen readers
//!   emit them during linear navigation.
//! - `mousedown`: [`InputModality::Keyboard`] if the event was synthesized by
//!   a screen reader. Otherwise the event is dropped when it arrives within
//!   [`TOUCH_BUFFER_MS`] of the last `touchstart` (mobile browsers emulate a
//!   mousedown after every tap), and is [`InputModality::Mouse`] if not.
//! - `touchstart`: [`InputModality::Keyboard`] if synthesized by a screen
//!   reader, [`InputModality::Touch`] otherwise.
//!
//! ## Minimal example
//!
//! ```rust
//! # use understory_input_modality::{EventHost, EventKind, EventTarget, ListenerOptions};
//! # #[derive(Default)]
//! # struct Host;
//! # impl EventHost for Host {
//! #     type Node = u32;
//! #     fn add_event_listener(&mut self, _: EventTarget<u32>, _: EventKind, _: ListenerOptions) {}
//! #     fn remove_event_listener(&mut self, _: EventTarget<u32>, _: EventKind, _: ListenerOptions) {}
//! # }
//! use understory_input_modality::{
//!     InputModality, InputModalityDetector, InputModalityOptions, KeyboardEvent, keycodes,
//! };
//!
//! let mut host = Host::default();
//! let detector = InputModalityDetector::new(&mut host, InputModalityOptions::default());
//! assert_eq!(detector.most_recent_modality(), None);
//!
//! // Modifiers alone do not count as keyboard interaction.
//! detector.handle_keydown(&KeyboardEvent { target: Some(7), key_code: keycodes::SHIFT, time_stamp: 0 });
//! assert_eq!(detector.most_recent_modality(), None);
//!
//! detector.handle_keydown(&KeyboardEvent { target: Some(7), key_code: 9, time_stamp: 5 });
//! assert_eq!(detector.most_recent_modality(), Some(InputModality::Keyboard));
//! assert_eq!(detector.most_recent_target(), Some(7));
//! ```

use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use understory_notify::Subject;

use crate::event::{
    EventHost, EventKind, EventTarget, KeyboardEvent, ListenerOptions, MouseEvent, RootNode,
    TouchEvent,
};
use crate::fake_event::{
    is_fake_mousedown_from_screen_reader, is_fake_touchstart_from_screen_reader,
};
use crate::keycodes;

/// How long after a `touchstart` a `mousedown` is treated as the browser's
/// emulated follow-up rather than a separate mouse interaction.
///
/// Also used by focus tracking to bridge the gap between a touch and the
/// deferred focus event it causes.
pub const TOUCH_BUFFER_MS: u64 = 650;

const LISTENED: [EventKind; 3] = [EventKind::KeyDown, EventKind::MouseDown, EventKind::TouchStart];

/// The channel of a user interaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InputModality {
    /// Keyboard, or assistive technology acting on the user's behalf.
    Keyboard,
    /// A pointing device.
    Mouse,
    /// A touch screen.
    Touch,
}

impl InputModality {
    /// Lowercase name, as used in CSS classes and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keyboard => "keyboard",
            Self::Mouse => "mouse",
            Self::Touch => "touch",
        }
    }
}

impl fmt::Display for InputModality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for [`InputModalityDetector`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputModalityOptions {
    /// Key codes whose `keydown` does not count as keyboard interaction.
    pub ignore_keys: Vec<u32>,
}

impl Default for InputModalityOptions {
    fn default() -> Self {
        Self {
            ignore_keys: vec![
                keycodes::ALT,
                keycodes::CONTROL,
                keycodes::MAC_META,
                keycodes::META,
                keycodes::SHIFT,
            ],
        }
    }
}

/// A single classified interaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Detection<N> {
    /// The detected channel.
    pub modality: InputModality,
    /// Target of the raw event, when it was recorded.
    pub target: Option<N>,
    /// Timestamp of the raw event.
    pub time_stamp: u64,
}

#[derive(Debug)]
struct State<N> {
    most_recent_target: Option<N>,
    last_touch: Option<u64>,
    last_changed: Option<InputModality>,
    listening: bool,
}

struct Shared<N: 'static> {
    ignore_keys: Vec<u32>,
    state: RefCell<State<N>>,
    modality: Subject<Option<InputModality>>,
    detected: Subject<InputModality>,
    changed: Subject<InputModality>,
    detections: Subject<Detection<N>>,
}

/// Tracks the most recent input channel across the whole document.
///
/// Create one detector per document and share it by cloning the handle; all
/// clones observe the same state and streams.
///
/// The host must forward every `keydown`, `mousedown`, and `touchstart` that
/// reaches the capture-phase document listeners installed by
/// [`InputModalityDetector::new`] to the matching `handle_*` method.
pub struct InputModalityDetector<N: 'static> {
    shared: Rc<Shared<N>>,
}

impl<N: 'static> Clone for InputModalityDetector<N> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<N: fmt::Debug + 'static> fmt::Debug for InputModalityDetector<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputModalityDetector")
            .field("ignore_keys", &self.shared.ignore_keys)
            .field("state", &self.shared.state.borrow())
            .finish_non_exhaustive()
    }
}

impl<N: Clone + Eq + 'static> InputModalityDetector<N> {
    /// Create a detector and install its document listeners.
    ///
    /// Outside a browser (see [`EventHost::is_browser`]) no listeners are
    /// installed and the detector never reports anything.
    pub fn new<H>(host: &mut H, options: InputModalityOptions) -> Self
    where
        H: EventHost<Node = N> + ?Sized,
    {
        let listening = host.is_browser();
        if listening {
            for kind in LISTENED {
                host.add_event_listener(
                    EventTarget::Root(RootNode::Document),
                    kind,
                    ListenerOptions::CAPTURE_PASSIVE,
                );
            }
            log::debug!("input modality detector listening");
        }
        Self {
            shared: Rc::new(Shared {
                ignore_keys: options.ignore_keys,
                state: RefCell::new(State {
                    most_recent_target: None,
                    last_touch: None,
                    last_changed: None,
                    listening,
                }),
                modality: Subject::with_value(None),
                detected: Subject::new(),
                changed: Subject::new(),
                detections: Subject::new(),
            }),
        }
    }

    /// Remove the document listeners and complete every stream.
    ///
    /// Idempotent.
    pub fn destroy<H>(&self, host: &mut H)
    where
        H: EventHost<Node = N> + ?Sized,
    {
        let was_listening =
            core::mem::replace(&mut self.shared.state.borrow_mut().listening, false);
        if was_listening {
            for kind in LISTENED {
                host.remove_event_listener(
                    EventTarget::Root(RootNode::Document),
                    kind,
                    ListenerOptions::CAPTURE_PASSIVE,
                );
            }
            log::debug!("input modality detector stopped");
        }
        self.shared.modality.complete();
        self.shared.detected.complete();
        self.shared.changed.complete();
        self.shared.detections.complete();
    }

    /// Returns `true` while the document listeners are installed.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.shared.state.borrow().listening
    }

    /// Returns `true` if both handles refer to the same detector.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    /// Emits on every qualifying interaction; never emits the initial unset value.
    #[must_use]
    pub fn modality_detected(&self) -> &Subject<InputModality> {
        &self.shared.detected
    }

    /// Like [`InputModalityDetector::modality_detected`] with consecutive
    /// duplicates suppressed.
    #[must_use]
    pub fn modality_changed(&self) -> &Subject<InputModality> {
        &self.shared.changed
    }

    /// Current-value stream: replays the current modality (initially `None`)
    /// to each subscriber, then every detection.
    #[must_use]
    pub fn modality(&self) -> &Subject<Option<InputModality>> {
        &self.shared.modality
    }

    /// Full detection records, emitted right after
    /// [`InputModalityDetector::modality_detected`].
    #[must_use]
    pub fn detections(&self) -> &Subject<Detection<N>> {
        &self.shared.detections
    }

    /// The most recently detected modality.
    #[must_use]
    pub fn most_recent_modality(&self) -> Option<InputModality> {
        self.shared.modality.value().flatten()
    }

    /// Target of the most recent qualifying event.
    #[must_use]
    pub fn most_recent_target(&self) -> Option<N> {
        self.shared.state.borrow().most_recent_target.clone()
    }

    /// Handle a capture-phase `keydown`.
    pub fn handle_keydown(&self, event: &KeyboardEvent<N>) {
        if !self.is_listening() || self.shared.ignore_keys.contains(&event.key_code) {
            return;
        }
        self.record_target(event.target.clone());
        self.publish(InputModality::Keyboard, event.target.clone(), event.time_stamp);
    }

    /// Handle a capture-phase `mousedown`.
    pub fn handle_mousedown(&self, event: &MouseEvent<N>) {
        if !self.is_listening() {
            return;
        }
        let modality = if is_fake_mousedown_from_screen_reader(event) {
            InputModality::Keyboard
        } else {
            let last_touch = self.shared.state.borrow().last_touch;
            if last_touch.is_some_and(|t| event.time_stamp.saturating_sub(t) < TOUCH_BUFFER_MS) {
                log::trace!("mousedown dropped as touch emulation");
                return;
            }
            InputModality::Mouse
        };
        self.record_target(event.target.clone());
        self.publish(modality, event.target.clone(), event.time_stamp);
    }

    /// Handle a capture-phase `touchstart`.
    pub fn handle_touchstart(&self, event: &TouchEvent<N>) {
        if !self.is_listening() {
            return;
        }
        if is_fake_touchstart_from_screen_reader(event) {
            self.publish(InputModality::Keyboard, None, event.time_stamp);
            return;
        }
        {
            let mut state = self.shared.state.borrow_mut();
            state.last_touch = Some(event.time_stamp);
            state.most_recent_target = event.target.clone();
        }
        self.publish(InputModality::Touch, event.target.clone(), event.time_stamp);
    }

    fn record_target(&self, target: Option<N>) {
        self.shared.state.borrow_mut().most_recent_target = target;
    }

    fn publish(&self, modality: InputModality, target: Option<N>, time_stamp: u64) {
        log::trace!("input modality: {modality}");
        let changed = {
            let mut state = self.shared.state.borrow_mut();
            let changed = state.last_changed != Some(modality);
            state.last_changed = Some(modality);
            changed
        };
        self.shared.modality.next(Some(modality));
        self.shared.detected.next(modality);
        if changed {
            self.shared.changed.next(modality);
        }
        self.shared.detections.next(Detection {
            modality,
            target,
            time_stamp,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Touch;
    use kurbo::Point;
    use smallvec::smallvec;

    #[derive(Default)]
    struct Listeners {
        installed: Vec<(EventTarget<u32>, EventKind, ListenerOptions)>,
        browser: bool,
    }

    impl EventHost for Listeners {
        type Node = u32;

        fn is_browser(&self) -> bool {
            self.browser
        }

        fn add_event_listener(&mut self, t: EventTarget<u32>, k: EventKind, o: ListenerOptions) {
            self.installed.push((t, k, o));
        }

        fn remove_event_listener(&mut self, t: EventTarget<u32>, k: EventKind, o: ListenerOptions) {
            let pos = self.installed.iter().position(|e| *e == (t, k, o));
            self.installed.remove(pos.expect("removing a listener that was never added"));
        }
    }

    fn browser() -> Listeners {
        Listeners {
            browser: true,
            ..Listeners::default()
        }
    }

    fn key(code: u32, t: u64) -> KeyboardEvent<u32> {
        KeyboardEvent {
            target: Some(1),
            key_code: code,
            time_stamp: t,
        }
    }

    fn mouse(target: u32, t: u64) -> MouseEvent<u32> {
        MouseEvent {
            target: Some(target),
            buttons: 1,
            detail: 1,
            client: Point::new(3.0, 4.0),
            offset: Point::new(1.0, 1.0),
            time_stamp: t,
        }
    }

    fn touch(target: u32, t: u64) -> TouchEvent<u32> {
        TouchEvent {
            target: Some(target),
            touches: smallvec![Touch {
                identifier: 0,
                radius_x: Some(12.0),
                radius_y: Some(12.0),
                client: Point::new(3.0, 4.0),
            }],
            changed_touches: smallvec![],
            time_stamp: t,
        }
    }

    fn collect(
        s: &Subject<InputModality>,
    ) -> (Rc<RefCell<Vec<InputModality>>>, understory_notify::Subscription) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let sub = s.subscribe(move |m| sink.borrow_mut().push(*m));
        (log, sub)
    }

    #[test]
    fn installs_and_removes_capture_passive_listeners() {
        let mut host = browser();
        let d = InputModalityDetector::new(&mut host, InputModalityOptions::default());
        assert_eq!(host.installed.len(), 3);
        assert!(
            host.installed
                .iter()
                .all(|(t, _, o)| *t == EventTarget::Root(RootNode::Document)
                    && *o == ListenerOptions::CAPTURE_PASSIVE)
        );
        d.destroy(&mut host);
        d.destroy(&mut host);
        assert!(host.installed.is_empty());
        assert!(d.modality_detected().is_completed());
    }

    #[test]
    fn inert_outside_browser() {
        let mut host = Listeners::default();
        let d = InputModalityDetector::new(&mut host, InputModalityOptions::default());
        assert!(host.installed.is_empty());
        d.handle_keydown(&key(9, 0));
        assert_eq!(d.most_recent_modality(), None);
    }

    #[test]
    fn ignored_keys_are_skipped() {
        let mut host = browser();
        let d = InputModalityDetector::new(
            &mut host,
            InputModalityOptions {
                ignore_keys: vec![9],
            },
        );
        d.handle_keydown(&key(9, 0));
        assert_eq!(d.most_recent_modality(), None);
        d.handle_keydown(&key(keycodes::SHIFT, 1));
        assert_eq!(d.most_recent_modality(), Some(InputModality::Keyboard));
    }

    #[test]
    fn mousedown_after_touch_is_dropped() {
        let mut host = browser();
        let d = InputModalityDetector::new(&mut host, InputModalityOptions::default());
        let (log, _sub) = collect(d.modality_detected());

        d.handle_touchstart(&touch(5, 1_000));
        d.handle_mousedown(&mouse(5, 1_100));
        assert_eq!(*log.borrow(), vec![InputModality::Touch]);
        assert_eq!(d.most_recent_target(), Some(5));

        d.handle_mousedown(&mouse(6, 1_000 + TOUCH_BUFFER_MS));
        assert_eq!(*log.borrow(), vec![InputModality::Touch, InputModality::Mouse]);
        assert_eq!(d.most_recent_target(), Some(6));
    }

    #[test]
    fn fake_mousedown_counts_as_keyboard() {
        let mut host = browser();
        let d = InputModalityDetector::new(&mut host, InputModalityOptions::default());
        let fake = MouseEvent {
            detail: 0,
            ..mouse(3, 10)
        };
        d.handle_mousedown(&fake);
        assert_eq!(d.most_recent_modality(), Some(InputModality::Keyboard));
        assert_eq!(d.most_recent_target(), Some(3));
    }

    #[test]
    fn fake_touchstart_counts_as_keyboard_without_target() {
        let mut host = browser();
        let d = InputModalityDetector::new(&mut host, InputModalityOptions::default());
        let mut fake = touch(4, 10);
        fake.touches[0].identifier = -1;
        fake.touches[0].radius_x = Some(1.0);
        fake.touches[0].radius_y = None;
        d.handle_touchstart(&fake);
        assert_eq!(d.most_recent_modality(), Some(InputModality::Keyboard));
        assert_eq!(d.most_recent_target(), None);
        // A fake touch does not open the emulated-mousedown window.
        d.handle_mousedown(&mouse(4, 20));
        assert_eq!(d.most_recent_modality(), Some(InputModality::Mouse));
    }

    #[test]
    fn changed_suppresses_duplicates() {
        let mut host = browser();
        let d = InputModalityDetector::new(&mut host, InputModalityOptions::default());
        let (detected, _a) = collect(d.modality_detected());
        let (changed, _b) = collect(d.modality_changed());

        d.handle_keydown(&key(9, 0));
        d.handle_keydown(&key(9, 1));
        d.handle_mousedown(&mouse(1, 2));
        d.handle_keydown(&key(9, 3));

        use InputModality::*;
        assert_eq!(*detected.borrow(), vec![Keyboard, Keyboard, Mouse, Keyboard]);
        assert_eq!(*changed.borrow(), vec![Keyboard, Mouse, Keyboard]);
    }

    #[test]
    fn modality_stream_replays_current_value() {
        let mut host = browser();
        let d = InputModalityDetector::new(&mut host, InputModalityOptions::default());
        d.handle_touchstart(&touch(2, 0));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _sub = d.modality().subscribe(move |m| sink.borrow_mut().push(*m));
        assert_eq!(*seen.borrow(), vec![Some(InputModality::Touch)]);
    }

    #[test]
    fn detections_carry_target_and_time() {
        let mut host = browser();
        let d = InputModalityDetector::new(&mut host, InputModalityOptions::default());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _sub = d.detections().subscribe(move |det| sink.borrow_mut().push(det.clone()));
        d.handle_mousedown(&mouse(8, 42));
        assert_eq!(
            *seen.borrow(),
            vec![Detection {
                modality: InputModality::Mouse,
                target: Some(8),
                time_stamp: 42,
            }]
        );
    }
}
