// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `MonitorFocus` component adapter.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{Dom, Page};
use understory_focus_monitor::{FocusOrigin, MonitorFocus, SUBTREE_FOCUS_ATTRIBUTE};

fn page() -> Page {
    let mut dom = Dom::new();
    dom.element(1, None).element(2, Some(1)).element(3, None);
    dom.set_attribute(1, SUBTREE_FOCUS_ATTRIBUTE);
    Page::new(dom)
}

#[test]
fn subtree_attribute_enables_check_children() {
    let mut page = page();
    let mut subtree = MonitorFocus::new(1);
    let mut plain = MonitorFocus::new(3);
    subtree.attach(&mut page.monitor, &mut page.dom);
    plain.attach(&mut page.monitor, &mut page.dom);

    assert_eq!(page.monitor.checks_children(&1), Some(true));
    assert_eq!(page.monitor.checks_children(&3), Some(false));
}

#[test]
fn reports_origin_changes() {
    let mut page = page();
    let mut directive = MonitorFocus::new(1);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _sub = directive
        .focus_change()
        .subscribe(move |origin| sink.borrow_mut().push(*origin));
    directive.attach(&mut page.monitor, &mut page.dom);

    page.keydown(2, 9, 0);
    page.move_focus(Some(2), 0);
    assert_eq!(directive.focus_origin(), Some(FocusOrigin::Keyboard));

    page.move_focus(Some(3), 20);
    assert_eq!(directive.focus_origin(), None);
    assert_eq!(*seen.borrow(), [Some(FocusOrigin::Keyboard), None]);
}

#[test]
fn attach_and_detach_are_idempotent() {
    let mut page = page();
    let mut directive = MonitorFocus::new(1);

    directive.attach(&mut page.monitor, &mut page.dom);
    directive.attach(&mut page.monitor, &mut page.dom);
    assert!(directive.is_attached());
    assert_eq!(page.monitor.monitored_count(), 1);

    directive.detach(&mut page.monitor, &mut page.dom);
    assert!(!directive.is_attached());
    assert!(!page.monitor.is_monitored(&1));
    directive.detach(&mut page.monitor, &mut page.dom);
    assert_eq!(page.dom.listener_count(), 3, "only the detector's listeners remain");
}

#[test]
fn server_rendering_reports_null_once() {
    let mut dom = Dom::new();
    dom.element(1, None);
    dom.server = true;
    let mut page = Page::new(dom);
    let mut directive = MonitorFocus::new(1);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _sub = directive
        .focus_change()
        .subscribe(move |origin| sink.borrow_mut().push(*origin));

    directive.attach(&mut page.monitor, &mut page.dom);
    assert_eq!(*seen.borrow(), [None]);
    assert_eq!(directive.focus_origin(), None);
    directive.detach(&mut page.monitor, &mut page.dom);
}
