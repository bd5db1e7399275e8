// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Box config and layout.
//!
//! # Box config
//!
//! [`WidgetTree::box_config`] is pulled on demand and recomputed only while
//! the node's box-config flag is raised. A recomputed value that differs from
//! the cached one fires `box_config_changed` and propagates:
//!
//! - the node marks its own layout invalid,
//! - its parent recomputes its box config; if the parent's value is
//!   unchanged, the parent relayouts with its previous constraints and the
//!   propagation stops there, otherwise the parent's own change propagates
//!   by the same rule.
//!
//! # Layout
//!
//! [`WidgetTree::layout`] is a no-op when the layout flag is down and the
//! constraints equal the previous ones. Otherwise padding and border are
//! carved out of the constraints, scroll axes are relaxed to `[0, ∞)`, the
//! widget lays out its children, and the node's size becomes the
//! constraint-clamped content size plus padding and border.

use kurbo::{Point, Size, Vec2};

use super::WidgetTree;
use super::id::NodeId;
use crate::error::TreeError;
use crate::event::BoxConfigChanged;
use crate::geometry::{Axis, BoxConfig, BoxConstraints};
use crate::lifecycle::Invalidation;
use crate::style::Overflow;
use crate::trace::InspectionKind;
use crate::widget::{BoxConfigCx, LayoutCx};

impl WidgetTree {
    // -- Box config --

    /// The node's box config: the widget's content config plus padding and
    /// border, recomputed if stale.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`], [`TreeError::NotMounted`], or
    /// [`TreeError::Busy`] when called from the node's own callbacks.
    pub fn box_config(&mut self, id: NodeId) -> Result<BoxConfig, TreeError> {
        let node = self.mounted(id)?;
        if !node.flags.box_config
            && let Some(cached) = node.box_config
        {
            return Ok(cached);
        }
        let chrome = node.style.resolved.chrome_size();

        let widget = self.lend_widget(id)?;
        let content = widget.box_config(&mut BoxConfigCx { tree: self, node: id });
        self.return_widget(id, widget);
        let config = content + chrome;

        let node = self.node_mut(id)?;
        node.flags.box_config = false;
        let old = node.box_config.replace(config);
        if let Some(old) = old
            && old != config
        {
            tracing::debug!(node = ?id, ?old, new = ?config, "box config changed");
            self.inspect(id, InspectionKind::BoxConfigChanged);
            self.emit(
                id,
                |h| &mut h.box_config_changed,
                &BoxConfigChanged { old, new: config },
            );
            self.report.box_config_changed.push(id);
            self.propagate_box_config_change(id);
        }
        Ok(config)
    }

    fn propagate_box_config_change(&mut self, id: NodeId) {
        self.mark(id, Invalidation::Layout);
        let Some(parent) = self.node(id).ok().and_then(|n| n.parent) else {
            return;
        };
        let Ok(parent_node) = self.mounted(parent) else {
            return;
        };
        if parent_node.widget.is_none() {
            // The parent is inside one of its own callbacks and reads the
            // fresh value there; its own config is settled by the next pass.
            self.mark(parent, Invalidation::BoxConfig);
            return;
        }
        let before = parent_node.box_config;
        self.mark(parent, Invalidation::BoxConfig);
        let after = self.box_config(parent).ok();
        if before.is_some() && before == after {
            tracing::trace!(node = ?id, ?parent, "box config change absorbed by parent");
            self.mark(parent, Invalidation::Layout);
        }
    }

    // -- Layout --

    /// Lays the node out within `constraints` and returns its size.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`], [`TreeError::NotMounted`],
    /// [`TreeError::ReentrantLayout`] if the node is already laying out, or
    /// [`TreeError::Busy`].
    ///
    /// # Panics
    ///
    /// Panics if `constraints` has an infinite minimum.
    pub fn layout(&mut self, id: NodeId, constraints: BoxConstraints) -> Result<Size, TreeError> {
        assert!(
            !constraints.has_infinite_min(),
            "layout constraints need a finite minimum, got {constraints:?}"
        );
        let node = self
            .mounted(id)
            .inspect_err(|err| tracing::warn!(node = ?id, %err, "layout refused"))?;
        if node.layouting {
            let err = TreeError::ReentrantLayout(id);
            tracing::warn!(node = ?id, %err, "layout refused");
            return Err(err);
        }
        if !node.flags.layout && node.previous_constraints == Some(constraints) {
            tracing::trace!(node = ?id, "layout skipped, constraints unchanged");
            return Ok(node.size);
        }
        let style = node.style.resolved.clone();
        let mut widget = self.lend_widget(id)?;

        self.node_mut(id)?.layouting = true;
        self.inspect(id, InspectionKind::LayoutStarted);
        self.emit(id, |h| &mut h.layouting_started, &constraints);

        let chrome = style.chrome_size();
        let mut inner = constraints.shrink(chrome);
        if style.overflow_x == Overflow::Scroll {
            inner = inner.unbounded_on(Axis::Horizontal);
        }
        if style.overflow_y == Overflow::Scroll {
            inner = inner.unbounded_on(Axis::Vertical);
        }
        let mut cx = LayoutCx {
            tree: self,
            node: id,
            placements: Vec::new(),
        };
        let content = widget.layout(&mut cx, inner);
        let placements = cx.placements;
        self.return_widget(id, widget);

        let offset = style.content_offset();
        let children = self.children(id).map(<[_]>::to_vec).unwrap_or_default();
        for child in children {
            let origin = placements
                .iter()
                .find(|(c, _)| *c == child)
                .map_or(Point::ZERO, |&(_, p)| p);
            self.set_position(child, origin + offset);
        }

        let size = constraints.constrain(content + chrome);
        let visible = Size::new(
            (size.width - chrome.width).max(0.0),
            (size.height - chrome.height).max(0.0),
        );
        let overhang = |scroll: bool, content: f64, visible: f64| {
            if scroll { -(content - visible).max(0.0) } else { 0.0 }
        };

        let node = self.node_mut(id)?;
        node.scroll.min_offset = Vec2::new(
            overhang(style.overflow_x == Overflow::Scroll, content.width, visible.width),
            overhang(style.overflow_y == Overflow::Scroll, content.height, visible.height),
        );
        node.scroll.max_offset = Vec2::ZERO;
        node.scroll.offset = node.scroll.clamp(node.scroll.offset);
        let first = !node.layouted;
        let old_size = core::mem::replace(&mut node.size, size);
        node.previous_constraints = Some(constraints);
        node.layouting = false;
        node.layouted = true;
        node.flags.layout = false;
        let parent = node.parent;

        self.mark(id, Invalidation::RenderState);
        if !first && old_size != size {
            tracing::debug!(node = ?id, ?old_size, new = ?size, "size changed");
            self.emit(id, |h| &mut h.size_changed, &size);
            self.mark_render_deep(id);
            // A size change the parent did not ask for needs the parent to
            // place its children again.
            if let Some(parent) = parent
                && self.node(parent).is_ok_and(|p| !p.layouting)
            {
                self.mark(parent, Invalidation::Layout);
            }
        }
        self.inspect(id, InspectionKind::LayoutFinished);
        self.emit(id, |h| &mut h.layouting_finished, &size);
        self.report.laid_out.push(id);
        Ok(size)
    }
}
