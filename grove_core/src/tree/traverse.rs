// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::NodeId;
use super::store::WidgetTree;

/// A pre-order iterator over a node and its descendants.
///
/// Created by [`WidgetTree::descendants`]. Stale handles yield nothing.
#[derive(Debug)]
pub struct Descendants<'a> {
    tree: &'a WidgetTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        if let Ok(children) = self.tree.children(id) {
            self.stack.extend(children.iter().rev().copied());
        }
        Some(id)
    }
}

/// An iterator from a node's parent up to the root.
///
/// Created by [`WidgetTree::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    tree: &'a WidgetTree,
    current: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.tree.parent(id).ok().flatten();
        Some(id)
    }
}

impl WidgetTree {
    /// Iterates over `id` and its descendants in pre-order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let stack = if self.is_alive(id) { vec![id] } else { Vec::new() };
        Descendants { tree: self, stack }
    }

    /// Iterates over the ancestors of `id`, nearest first.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            current: self.parent(id).ok().flatten(),
        }
    }
}
