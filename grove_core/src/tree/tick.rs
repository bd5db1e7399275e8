// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tick driver.
//!
//! [`WidgetTree::tick`] runs one frame's worth of passes in order:
//!
//! 1. **Build**: rebuild build-invalid nodes, shallowest first, then
//!    destroy the children reconciliation abandoned.
//! 2. **Box config**: recompute stale box configs, deepest first, so a
//!    parent reads settled child values.
//! 3. **Layout**: lay the root out with the given constraints, then relayout
//!    any node still layout-invalid, shallowest first, with its previous
//!    constraints.
//! 4. **Render**: refresh render-invalid nodes, shallowest first, and hand
//!    out the root's identified render object.
//!
//! Invalidations requested by event handlers are applied between passes,
//! never in the middle of one.

use understory_dirty::Channel;

use super::WidgetTree;
use super::id::NodeId;
use super::render::RenderReason;
use crate::dirty;
use crate::error::TreeError;
use crate::geometry::BoxConstraints;
use crate::render::RenderObject;
use crate::trace::{PhaseBeginEvent, PhaseEndEvent, PhaseKind};

/// What one tick did.
///
/// Node lists are in processing order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PassReport {
    /// Handler requests applied.
    pub requests: usize,
    /// Nodes whose build step ran.
    pub rebuilt: Vec<NodeId>,
    /// Nodes whose recomputed box config differed from the cached one.
    pub box_config_changed: Vec<NodeId>,
    /// Nodes that actually laid out (short-circuited calls excluded).
    pub laid_out: Vec<NodeId>,
    /// Nodes whose content was recomputed.
    pub rendered: Vec<NodeId>,
    /// Nodes torn down.
    pub destroyed: Vec<NodeId>,
}

/// The output of [`WidgetTree::tick`].
#[derive(Clone, Debug)]
pub struct Frame {
    /// The root's identified render object.
    pub content: RenderObject,
    /// What the tick did.
    pub report: PassReport,
}

impl WidgetTree {
    /// Runs the build, box-config, layout and render passes.
    ///
    /// # Errors
    ///
    /// [`TreeError::NoRoot`] without a mounted root, or the error of the
    /// root's layout or render.
    ///
    /// # Panics
    ///
    /// Panics if `constraints` has an infinite minimum.
    pub fn tick(&mut self, constraints: BoxConstraints) -> Result<Frame, TreeError> {
        let Some(root) = self.root else {
            tracing::warn!("tick without a mounted root");
            return Err(TreeError::NoRoot);
        };
        self.tick_index += 1;
        self.report = PassReport::default();
        self.report.requests += self.apply_requests();

        // -- Build --
        self.begin(PhaseKind::Build);
        let mut processed = 0;
        for id in self.drain_pending(dirty::BUILD, false) {
            if !self.is_attached(id) || !self.node(id).is_ok_and(|n| n.flags.build) {
                continue;
            }
            if let Err(err) = self.rebuild(id) {
                tracing::warn!(node = ?id, %err, "rebuild failed");
            }
            processed += 1;
        }
        self.report.requests += self.apply_requests();
        let flushed = self.flush_graveyard();
        tracing::trace!(flushed, "abandoned nodes destroyed");
        self.end(PhaseKind::Build, processed);

        // -- Box config --
        self.begin(PhaseKind::BoxConfig);
        let mut processed = 0;
        for id in self.drain_pending(dirty::BOX_CONFIG, true) {
            if !self.is_attached(id) || !self.node(id).is_ok_and(|n| n.flags.box_config) {
                continue;
            }
            if let Err(err) = self.box_config(id) {
                tracing::warn!(node = ?id, %err, "box config failed");
            }
            processed += 1;
        }
        self.report.requests += self.apply_requests();
        self.end(PhaseKind::BoxConfig, processed);

        // -- Layout --
        self.begin(PhaseKind::Layout);
        let before = self.report.laid_out.len();
        self.layout(root, constraints)?;
        self.relayout_pending();
        self.report.requests += self.apply_requests();
        let processed = self.report.laid_out.len() - before;
        self.end(PhaseKind::Layout, processed);

        // -- Render --
        self.begin(PhaseKind::Render);
        let before = self.report.rendered.len();
        let mut unlayouted = Vec::new();
        for id in self.drain_pending(dirty::RENDER, false) {
            let Ok(node) = self.node(id) else {
                continue;
            };
            if !node.flags.render_state || !self.is_attached(id) {
                continue;
            }
            if !node.layouted {
                unlayouted.push(id);
                continue;
            }
            if let Err(err) = self.render(id, RenderReason::Tick) {
                tracing::warn!(node = ?id, %err, "render failed");
            }
        }
        for id in unlayouted {
            self.pending.mark(id.idx, dirty::RENDER);
        }
        let content = self.render(root, RenderReason::Tick)?;
        self.report.requests += self.apply_requests();
        let processed = self.report.rendered.len() - before;
        self.end(PhaseKind::Render, processed);

        let report = core::mem::take(&mut self.report);
        tracing::debug!(
            tick = self.tick_index,
            rebuilt = report.rebuilt.len(),
            laid_out = report.laid_out.len(),
            rendered = report.rendered.len(),
            destroyed = report.destroyed.len(),
            "tick finished"
        );
        Ok(Frame { content, report })
    }

    /// Relayouts layout-invalid nodes with their previous constraints until
    /// none are left or the round limit is reached.
    fn relayout_pending(&mut self) {
        let mut deferred = Vec::new();
        for _ in 0..self.config.max_layout_rounds {
            let pending = self.drain_pending(dirty::LAYOUT, false);
            if pending.is_empty() {
                break;
            }
            for id in pending {
                let Ok(node) = self.node(id) else {
                    continue;
                };
                if !node.flags.layout || !self.is_attached(id) {
                    continue;
                }
                let previous = node.previous_constraints;
                match previous {
                    Some(constraints) => {
                        if let Err(err) = self.layout(id, constraints) {
                            tracing::warn!(node = ?id, %err, "relayout failed");
                        }
                    }
                    // Laid out by its parent once the parent gets to it.
                    None => deferred.push(id),
                }
            }
        }
        let leftover: Vec<_> = self
            .drain_pending(dirty::LAYOUT, false)
            .into_iter()
            .filter(|&id| self.node(id).is_ok_and(|n| n.flags.layout))
            .collect();
        if !leftover.is_empty() {
            tracing::warn!(
                rounds = self.config.max_layout_rounds,
                left = leftover.len(),
                "layout did not settle"
            );
        }
        for id in leftover.into_iter().chain(deferred) {
            self.pending.mark(id.idx, dirty::LAYOUT);
        }
    }

    /// Takes every pending node of `channel`, ordered by depth.
    fn drain_pending(&mut self, channel: Channel, deepest_first: bool) -> Vec<NodeId> {
        let drained: Vec<u32> = self.pending.drain(channel).deterministic().run().collect();
        let mut ids: Vec<NodeId> = drained.into_iter().filter_map(|idx| self.id_at(idx)).collect();
        ids.sort_by_key(|&id| self.depth(id));
        if deepest_first {
            ids.reverse();
        }
        ids
    }

    fn begin(&mut self, phase: PhaseKind) {
        self.tracer.phase_begin(&PhaseBeginEvent {
            tick: self.tick_index,
            phase,
        });
    }

    fn end(&mut self, phase: PhaseKind, processed: usize) {
        tracing::trace!(tick = self.tick_index, ?phase, processed, "phase finished");
        self.tracer.phase_end(&PhaseEndEvent {
            tick: self.tick_index,
            phase,
            processed,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use kurbo::Size;

    use super::*;
    use crate::lifecycle::Invalidation;
    use crate::testing::{settle, tree_with};
    use crate::trace::{InspectionEvent, InspectionKind, TraceSink, Tracer};
    use crate::widget::Element;
    use crate::widgets::{Column, Fixed};

    fn fixed(w: f64, h: f64) -> Element {
        Element::new(Fixed::new(Size::new(w, h)))
    }

    #[test]
    fn tick_without_root_is_refused() {
        let mut tree = WidgetTree::new();
        assert_eq!(
            tree.tick(BoxConstraints::UNBOUNDED).err(),
            Some(TreeError::NoRoot)
        );
    }

    #[test]
    fn first_tick_lays_out_and_renders_everything() {
        let (mut tree, root) = tree_with(Element::new(Column::new(|_| {
            vec![fixed(10.0, 10.0), fixed(20.0, 5.0)]
        })));
        let frame = settle(&mut tree);
        let children = tree.children(root).unwrap().to_vec();
        assert_eq!(frame.report.laid_out, [children[0], children[1], root]);
        assert_eq!(frame.report.rendered.len(), 3);
        assert!(frame.content.same_identity(&tree.content(root).unwrap()));
        assert_eq!(tree.size(root).unwrap(), Size::new(20.0, 15.0));
        for id in [root, children[0], children[1]] {
            assert!(!tree.flags(id).unwrap().any(), "{id:?} left dirty");
        }
    }

    #[test]
    fn quiet_tick_does_nothing() {
        let (mut tree, _) = tree_with(Element::new(Column::new(|_| vec![fixed(10.0, 10.0)])));
        settle(&mut tree);
        let report = settle(&mut tree).report;
        assert_eq!(report, PassReport::default());
    }

    #[test]
    fn handler_requests_run_between_passes() {
        let (mut tree, root) = tree_with(Element::new(Column::new(|_| vec![fixed(10.0, 10.0)])));
        settle(&mut tree);
        let leaf = tree.children(root).unwrap()[0];
        // Relayouting the root asks the leaf to repaint.
        tree.handlers(root).unwrap().layouting_finished.add(move |_, cx| {
            cx.request(leaf, Invalidation::RenderState);
        });
        tree.invalidate(root, Invalidation::Layout).unwrap();
        let report = settle(&mut tree).report;
        assert_eq!(report.requests, 1);
        assert!(report.rendered.contains(&leaf));
    }

    #[test]
    fn pass_boundaries_reach_the_sink() {
        #[derive(Default)]
        struct Phases(Vec<(PhaseKind, usize)>, Vec<InspectionKind>);
        impl TraceSink for Phases {
            fn on_phase_end(&mut self, e: &PhaseEndEvent) {
                self.0.push((e.phase, e.processed));
            }

            fn on_inspection(&mut self, e: &InspectionEvent) {
                self.1.push(e.kind);
            }
        }

        let sink = Rc::new(RefCell::new(Phases::default()));
        let (mut tree, _) = tree_with(fixed(1.0, 1.0));
        tree.set_tracer(Tracer::new(Box::new(sink.clone())));
        settle(&mut tree);
        if cfg!(feature = "trace") {
            let phases: Vec<_> = sink.borrow().0.iter().map(|(p, _)| *p).collect();
            assert_eq!(
                phases,
                [PhaseKind::Build, PhaseKind::BoxConfig, PhaseKind::Layout, PhaseKind::Render]
            );
            assert!(sink.borrow().1.contains(&InspectionKind::LayoutFinished));
        } else {
            assert!(sink.borrow().0.is_empty());
        }
    }
}
