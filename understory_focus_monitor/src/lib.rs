// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_focus_monitor --heading-base-level=0

//! Understory Focus Monitor: attribute every focus change to the input that
//! caused it.
//!
//! ## Overview
//!
//! [`FocusMonitor`] watches a set of elements and reports, for each one, a
//! stream of [`FocusOrigin`] values: `Some(origin)` when the element (or, with
//! `check_children`, anything inside it) gains focus and `None` when focus
//! leaves. The same origin is reflected as CSS classes on the element (see
//! [`classes`]), so styles can show focus rings for keyboard users only.
//!
//! Origins come from the [`InputModalityDetector`]: the keyboard, mouse, or
//! touch interaction that happened just before the focus event. Focus with no
//! interaction behind it is [`FocusOrigin::Program`]. Callers that move focus
//! themselves can name the origin with [`FocusMonitor::focus_via`].
//!
//! ## Host boundary
//!
//! The monitor never touches a real document. The host implements
//! [`DomHost`], installs the listeners it is asked to, and forwards:
//!
//! - `keydown`/`mousedown`/`touchstart` to the detector,
//! - captured `focus`/`blur` to [`FocusMonitor::handle_focus`] and
//!   [`FocusMonitor::handle_blur`],
//! - window `focus` to [`FocusMonitor::handle_window_focus`].
//!
//! Expiry is driven by event timestamps. Between events, call
//! [`FocusMonitor::advance`] once the clock passes
//! [`FocusMonitor::next_deadline`].
//!
//! ## Minimal example
//!
//! ```rust
//! # use understory_focus_monitor::{DomHost, FocusOptions};
//! # use understory_input_modality::{EventHost, EventKind, EventTarget, ListenerOptions, RootNode};
//! # #[derive(Default)]
//! # struct Dom { active: Option<u32> }
//! # impl EventHost for Dom {
//! #     type Node = u32;
//! #     fn add_event_listener(&mut self, _: EventTarget<u32>, _: EventKind, _: ListenerOptions) {}
//! #     fn remove_event_listener(&mut self, _: EventTarget<u32>, _: EventKind, _: ListenerOptions) {}
//! # }
//! # impl DomHost for Dom {
//! #     fn is_element(&self, _: &u32) -> bool { true }
//! #     fn parent_element(&self, n: &u32) -> Option<u32> { (*n > 1).then_some(1) }
//! #     fn root_node(&self, _: &u32) -> RootNode<u32> { RootNode::Document }
//! #     fn active_element(&self) -> Option<u32> { self.active }
//! #     fn set_class(&mut self, _: &u32, _: &'static str, _: bool) {}
//! #     fn focus(&mut self, n: &u32, _: FocusOptions) { self.active = Some(*n); }
//! # }
//! use core::cell::Cell;
//! use std::rc::Rc;
//!
//! use understory_focus_monitor::{FocusMonitor, FocusMonitorOptions, FocusOrigin};
//! use understory_input_modality::{
//!     FocusEvent, InputModalityDetector, InputModalityOptions, KeyboardEvent,
//! };
//!
//! let mut dom = Dom::default();
//! let detector = InputModalityDetector::new(&mut dom, InputModalityOptions::default());
//! let mut monitor = FocusMonitor::new(detector.clone(), FocusMonitorOptions::default());
//!
//! // Element 1 contains element 2.
//! let seen = Rc::new(Cell::new(None));
//! let sink = Rc::clone(&seen);
//! let _sub = monitor.monitor(&mut dom, &1, true).subscribe(move |o| sink.set(*o));
//!
//! // Tab into element 2.
//! detector.handle_keydown(&KeyboardEvent { target: Some(1), key_code: 9, time_stamp: 100 });
//! let focus = FocusEvent { target: Some(2), related_target: None, time_stamp: 101 };
//! monitor.handle_focus(&mut dom, &focus);
//! assert_eq!(seen.get(), Some(FocusOrigin::Keyboard));
//!
//! // Long after the key press, a focus change is programmatic.
//! let blur = FocusEvent { target: Some(2), related_target: None, time_stamp: 5_000 };
//! monitor.handle_blur(&mut dom, &blur);
//! assert_eq!(seen.get(), None);
//! let focus = FocusEvent { target: Some(2), related_target: None, time_stamp: 5_000 };
//! monitor.handle_focus(&mut dom, &focus);
//! assert_eq!(seen.get(), Some(FocusOrigin::Program));
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for dependencies.
//! - `libm`: enables `no_std` + `alloc` builds that rely on `libm` for floating-point math.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod attribution;
pub mod classes;
mod directive;
mod host;
mod monitor;
mod origin;
mod registry;

pub use directive::{MonitorFocus, SUBTREE_FOCUS_ATTRIBUTE};
pub use host::DomHost;
pub use monitor::{FocusMonitor, OriginStream};
pub use origin::{DetectionMode, FocusMonitorOptions, FocusOptions, FocusOrigin};

pub use understory_input_modality::{InputModalityDetector, RootNode};
