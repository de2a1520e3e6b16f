// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event payloads and the listener boundary shared with the host.
//!
//! The host owns the real element tree and event dispatch. Engines in this
//! workspace ask the host to install listeners through [`EventHost`], and the
//! host forwards each matching event as one of the payload types below.
//!
//! Event targets are expected to be the *composed* target: the inner-most node
//! that originated the event, even when it lives inside a shadow root.

use core::fmt::Debug;
use core::hash::Hash;

use kurbo::Point;
use smallvec::SmallVec;

/// The scope within which native focus and blur events are observable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RootNode<N> {
    /// The owning document.
    Document,
    /// A shadow root, identified by the host's handle for it.
    ShadowRoot(N),
}

/// Something a listener can be attached to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventTarget<N> {
    /// The browser window.
    Window,
    /// A document or shadow root.
    Root(RootNode<N>),
}

impl<N> From<RootNode<N>> for EventTarget<N> {
    fn from(root: RootNode<N>) -> Self {
        Self::Root(root)
    }
}

/// Event types the engines listen for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `keydown`
    KeyDown,
    /// `mousedown`
    MouseDown,
    /// `touchstart`
    TouchStart,
    /// `focus`
    Focus,
    /// `blur`
    Blur,
}

impl EventKind {
    /// The DOM event type name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::KeyDown => "keydown",
            Self::MouseDown => "mousedown",
            Self::TouchStart => "touchstart",
            Self::Focus => "focus",
            Self::Blur => "blur",
        }
    }
}

bitflags::bitflags! {
    /// Options passed along with a listener registration.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ListenerOptions: u8 {
        /// Run during the capture phase, before bubble-phase listeners.
        const CAPTURE = 0b0000_0001;
        /// The listener never cancels the event.
        const PASSIVE = 0b0000_0010;
    }
}

impl ListenerOptions {
    /// Capture-phase, passive: the options used for every global input and
    /// focus listener.
    pub const CAPTURE_PASSIVE: Self = Self::CAPTURE.union(Self::PASSIVE);
}

/// Listener registration boundary implemented by the host.
///
/// Removal must be called with the same target, kind, and options that were
/// used to add the listener, mirroring `removeEventListener`.
pub trait EventHost {
    /// Handle for a node in the host's tree.
    type Node: Clone + Eq + Hash + Debug + 'static;

    /// Returns `false` when running somewhere without a live document (for
    /// example during server-side rendering). Engines become inert there.
    fn is_browser(&self) -> bool {
        true
    }

    /// Install a listener; the host must forward matching events to the
    /// engine that requested it.
    fn add_event_listener(
        &mut self,
        target: EventTarget<Self::Node>,
        kind: EventKind,
        options: ListenerOptions,
    );

    /// Remove a listener previously installed with the same arguments.
    fn remove_event_listener(
        &mut self,
        target: EventTarget<Self::Node>,
        kind: EventKind,
        options: ListenerOptions,
    );
}

/// A `keydown` event.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardEvent<N> {
    /// Composed event target.
    pub target: Option<N>,
    /// Legacy numeric key code (see [`crate::keycodes`]).
    pub key_code: u32,
    /// Event time in milliseconds.
    pub time_stamp: u64,
}

/// A `mousedown` event.
#[derive(Clone, Debug, PartialEq)]
pub struct MouseEvent<N> {
    /// Composed event target.
    pub target: Option<N>,
    /// Bitmask of pressed buttons; zero for many synthesized events.
    pub buttons: u16,
    /// Click count; zero for many synthesized events.
    pub detail: u32,
    /// Position in viewport coordinates.
    pub client: Point,
    /// Position relative to the target's padding edge.
    pub offset: Point,
    /// Event time in milliseconds.
    pub time_stamp: u64,
}

/// A single contact point of a touch event.
#[derive(Clone, Debug, PartialEq)]
pub struct Touch {
    /// Contact identifier; `-1` for contacts synthesized by some screen readers.
    pub identifier: i64,
    /// Horizontal contact radius, when reported.
    pub radius_x: Option<f64>,
    /// Vertical contact radius, when reported.
    pub radius_y: Option<f64>,
    /// Position in viewport coordinates.
    pub client: Point,
}

/// A `touchstart` event.
#[derive(Clone, Debug, PartialEq)]
pub struct TouchEvent<N> {
    /// Composed event target.
    pub target: Option<N>,
    /// Contacts currently on the surface.
    pub touches: SmallVec<[Touch; 2]>,
    /// Contacts that changed in this event.
    pub changed_touches: SmallVec<[Touch; 2]>,
    /// Event time in milliseconds.
    pub time_stamp: u64,
}

/// A `focus` or `blur` event as seen by a root-node listener.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FocusEvent<N> {
    /// Composed event target: the node gaining (focus) or losing (blur) focus.
    pub target: Option<N>,
    /// For `blur`, the node receiving focus next, if any.
    pub related_target: Option<N>,
    /// Event time in milliseconds.
    pub time_stamp: u64,
}
