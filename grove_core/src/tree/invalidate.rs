// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raising invalidation flags.
//!
//! There are two entry points. The public [`WidgetTree::invalidate`] family
//! is strict: it refuses stale, unmounted, or already-invalid targets and
//! reports the refusal. The crate-internal `mark` family is soft: the engine
//! uses it for propagation, where "already invalid" is the normal case and
//! not an error.

use super::WidgetTree;
use super::id::NodeId;
use crate::dirty;
use crate::error::TreeError;
use crate::event::{Handlers, NodeHandlers, Request};
use crate::lifecycle::{Invalidation, LifecycleStage};
use crate::trace::InspectionKind;

impl WidgetTree {
    // -- Public API (reported) --

    /// Raises `kind` on a mounted node.
    ///
    /// A raised [`RenderState`](Invalidation::RenderState) flag is shallow:
    /// only the node's own content is recomputed. Use
    /// [`invalidate_render_state`](Self::invalidate_render_state) for the deep
    /// variant.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`], [`TreeError::NotMounted`], or
    /// [`TreeError::AlreadyInvalid`] if the flag is already raised. The tree
    /// is left unchanged in every case.
    pub fn invalidate(&mut self, id: NodeId, kind: Invalidation) -> Result<(), TreeError> {
        self.check_invalidate(id, kind)?;
        self.mark(id, kind);
        Ok(())
    }

    /// Raises the render-state flag, optionally on every descendant too.
    ///
    /// # Errors
    ///
    /// As [`invalidate`](Self::invalidate), judged on `id` alone.
    /// Descendants that are already invalid are skipped silently.
    pub fn invalidate_render_state(&mut self, id: NodeId, deep: bool) -> Result<(), TreeError> {
        self.check_invalidate(id, Invalidation::RenderState)?;
        if deep {
            self.mark_render_deep(id);
        } else {
            self.mark(id, Invalidation::RenderState);
        }
        Ok(())
    }

    fn check_invalidate(&self, id: NodeId, kind: Invalidation) -> Result<(), TreeError> {
        let result = self.mounted(id).and_then(|node| {
            if node.flags.get(kind) {
                Err(TreeError::AlreadyInvalid { node: id, kind })
            } else {
                Ok(())
            }
        });
        if let Err(err) = &result {
            tracing::warn!(node = ?id, ?kind, %err, "invalidation refused");
        }
        result
    }

    // -- Internal marking (soft) --

    /// Raises `kind` if the node is live, not destroyed, and the flag is
    /// down. Returns whether the flag was newly raised.
    pub(crate) fn mark(&mut self, id: NodeId, kind: Invalidation) -> bool {
        let Ok(node) = self.node_mut(id) else {
            return false;
        };
        if node.stage == LifecycleStage::Destroyed || node.flags.get(kind) {
            return false;
        }
        node.flags.set(kind, true);
        self.pending.mark(id.idx, dirty::channel(kind));

        tracing::trace!(node = ?id, ?kind, "invalidated");
        let select: fn(&mut NodeHandlers) -> &mut Handlers<()> = match kind {
            Invalidation::Build => {
                self.inspect(id, InspectionKind::BuildInvalidated);
                |h| &mut h.build_invalidated
            }
            Invalidation::BoxConfig => {
                self.inspect(id, InspectionKind::BoxConfigInvalidated);
                |h| &mut h.box_config_invalidated
            }
            Invalidation::Layout => {
                self.inspect(id, InspectionKind::LayoutInvalidated);
                |h| &mut h.layout_invalidated
            }
            Invalidation::RenderState => {
                self.inspect(id, InspectionKind::RenderStateInvalidated);
                |h| &mut h.render_state_invalidated
            }
        };
        self.emit(id, select, &());
        true
    }

    /// Raises the render-state flag on `id` and every descendant.
    pub(crate) fn mark_render_deep(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            self.mark(current, Invalidation::RenderState);
            if let Ok(node) = self.node(current) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
    }

    /// Raises box config, layout and render state after the node's content
    /// changed.
    pub(crate) fn mark_content_changed(&mut self, id: NodeId) {
        self.mark(id, Invalidation::BoxConfig);
        self.mark(id, Invalidation::Layout);
        self.mark(id, Invalidation::RenderState);
    }

    /// Applies every invalidation queued by handlers.
    ///
    /// Requests whose target is gone or already invalid are dropped; the
    /// refusal is logged by [`invalidate`](Self::invalidate).
    pub(crate) fn apply_requests(&mut self) -> usize {
        let requests = core::mem::take(&mut self.requests);
        let count = requests.len();
        for request in requests {
            let _ = match request {
                Request::Invalidate(id, kind) => self.invalidate(id, kind),
                Request::RenderDeep(id) => self.invalidate_render_state(id, true),
            };
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use kurbo::Size;

    use crate::error::TreeError;
    use crate::lifecycle::{Invalidation, LifecycleStage};
    use crate::testing::{settle, tree_with};
    use crate::widget::Element;
    use crate::widgets::{Column, Fixed};

    fn leaf() -> Element {
        Element::new(Fixed::new(Size::new(10.0, 10.0)))
    }

    #[test]
    fn invalidate_is_guarded() {
        let (mut tree, root) = tree_with(leaf());
        settle(&mut tree);
        tree.invalidate(root, Invalidation::Layout).unwrap();
        assert_eq!(
            tree.invalidate(root, Invalidation::Layout),
            Err(TreeError::AlreadyInvalid {
                node: root,
                kind: Invalidation::Layout
            })
        );
        tree.destroy(root).unwrap();
        assert_eq!(
            tree.invalidate(root, Invalidation::Build),
            Err(TreeError::Destroyed(root))
        );
        assert_eq!(tree.stage(root), LifecycleStage::Destroyed);
    }

    #[test]
    fn deep_render_invalidation_reaches_descendants() {
        let (mut tree, root) = tree_with(Element::new(Column::new(|_| {
            vec![leaf(), Element::new(Column::new(|_| vec![leaf()]))]
        })));
        settle(&mut tree);
        let all: Vec<_> = tree.descendants(root).collect();
        assert_eq!(all.len(), 4);

        tree.invalidate_render_state(root, false).unwrap();
        for &id in &all[1..] {
            assert!(!tree.is_invalid(id, Invalidation::RenderState).unwrap());
        }
        settle(&mut tree);

        tree.invalidate_render_state(root, true).unwrap();
        for &id in &all {
            assert!(tree.is_invalid(id, Invalidation::RenderState).unwrap());
        }
    }

    #[test]
    fn handlers_fire_on_invalidation_and_requests_are_deferred() {
        let (mut tree, root) = tree_with(leaf());
        settle(&mut tree);
        let fired = Rc::new(Cell::new(0));
        let f = fired.clone();
        tree.handlers(root).unwrap().layout_invalidated.add(move |_, cx| {
            f.set(f.get() + 1);
            let node = cx.node();
            cx.request(node, Invalidation::RenderState);
        });
        tree.invalidate(root, Invalidation::Layout).unwrap();
        assert_eq!(fired.get(), 1);
        // Queued, not applied.
        assert!(!tree.is_invalid(root, Invalidation::RenderState).unwrap());
        assert_eq!(tree.apply_requests(), 1);
        assert!(tree.is_invalid(root, Invalidation::RenderState).unwrap());
    }
}
