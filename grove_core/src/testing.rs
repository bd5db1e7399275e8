// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for unit tests.

use kurbo::Size;

use crate::geometry::BoxConstraints;
use crate::tree::{Frame, NodeId, WidgetTree};
use crate::widget::Element;

/// Mounts `root` into a fresh tree without ticking.
pub(crate) fn tree_with(root: impl Into<Element>) -> (WidgetTree, NodeId) {
    let mut tree = WidgetTree::new();
    let id = tree.mount_root(root.into()).unwrap();
    (tree, id)
}

/// Runs one tick within an 800x600 window.
pub(crate) fn settle(tree: &mut WidgetTree) -> Frame {
    tree.tick(BoxConstraints::loose(Size::new(800.0, 600.0))).unwrap()
}
