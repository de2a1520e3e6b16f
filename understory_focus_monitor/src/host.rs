// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The document boundary the focus monitor runs against.

use alloc::vec::Vec;

use understory_input_modality::{EventHost, RootNode};

use crate::origin::FocusOptions;

/// Read and write access to the host's element tree.
///
/// `focus()` is requested through `&mut self`, so a host cannot call back into
/// the monitor while it runs. Hosts queue the resulting `blur`/`focus` events
/// and deliver them once the monitor call that requested focus has returned.
pub trait DomHost: EventHost {
    /// Returns `true` for element nodes (as opposed to text, comments, or
    /// document fragments).
    fn is_element(&self, node: &Self::Node) -> bool;

    /// The parent element, stopping at a document or shadow root.
    fn parent_element(&self, node: &Self::Node) -> Option<Self::Node>;

    /// The nearest shadow root containing `node`, or the document.
    fn root_node(&self, node: &Self::Node) -> RootNode<Self::Node>;

    /// Inclusive descendant check within one root, like `Node.contains`.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool {
        let mut current = Some(node.clone());
        while let Some(n) = current {
            if n == *ancestor {
                return true;
            }
            current = self.parent_element(&n);
        }
        false
    }

    /// The focused element, descending into open shadow roots.
    fn active_element(&self) -> Option<Self::Node>;

    /// Add or remove a CSS class.
    fn set_class(&mut self, node: &Self::Node, class: &'static str, enabled: bool);

    /// Move focus to `node`.
    fn focus(&mut self, node: &Self::Node, options: FocusOptions);

    /// Returns `true` if `node` carries the attribute `name`.
    fn has_attribute(&self, node: &Self::Node, name: &str) -> bool {
        let _ = (node, name);
        false
    }

    /// Returns `true` for enabled `<input>` and `<textarea>` elements.
    fn is_labelable_input(&self, node: &Self::Node) -> bool {
        let _ = node;
        false
    }

    /// The `<label>` elements associated with a labelable input.
    fn labels(&self, node: &Self::Node) -> Vec<Self::Node> {
        let _ = node;
        Vec::new()
    }
}
