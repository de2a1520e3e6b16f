// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_input_modality --heading-base-level=0

//! Understory Input Modality: which channel did the user interact through last?
//!
//! This crate provides:
//! - An **event boundary** ([`EventHost`], [`EventTarget`], [`RootNode`],
//!   [`ListenerOptions`]) through which an engine asks the host document to
//!   install listeners, plus plain payload types for the events it forwards.
//! - A **fake event filter** ([`fake_event`]) that recognizes `mousedown` and
//!   `touchstart` events synthesized by screen readers.
//! - The **input modality detector** ([`InputModalityDetector`]), which
//!   listens to `keydown`, `mousedown`, and `touchstart` in the capture phase
//!   and publishes the most recent [`InputModality`] as a set of streams.
//!
//! The detector does not read a clock. Every event carries a millisecond
//! `time_stamp`, which is what the touch buffer ([`TOUCH_BUFFER_MS`]) is
//! measured against.
//!
//! Detection is a heuristic. A screen reader that synthesizes perfectly
//! realistic pointer events will be classified as the pointer it imitates.
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for dependencies such as `kurbo`.
//! - `libm`: enables `no_std` + `alloc` builds that rely on `libm` for floating-point math.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod detector;
mod event;
pub mod fake_event;
pub mod keycodes;

pub use detector::{
    Detection, InputModality, InputModalityDetector, InputModalityOptions, TOUCH_BUFFER_MS,
};
pub use event::{
    EventHost, EventKind, EventTarget, FocusEvent, KeyboardEvent, ListenerOptions, MouseEvent,
    RootNode, Touch, TouchEvent,
};
