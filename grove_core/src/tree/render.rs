// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The render cache.
//!
//! Every node owns one identified [`RenderObject`]. Rendering replaces that
//! object's children in place and lowers the render-state flag; until the
//! flag is raised again, [`WidgetTree::render`] hands out the same object
//! without calling the widget. A parent therefore embeds its children's
//! identified objects once and keeps showing their current content.

use kurbo::{Affine, Point, Rect, Vec2};

use super::WidgetTree;
use super::id::NodeId;
use crate::error::TreeError;
use crate::paint::{Color, Paint, TextPaint};
use crate::render::RenderObject;
use crate::style::{Overflow, ResolvedStyle, Visibility};
use crate::trace::InspectionKind;
use crate::widget::RenderCx;

/// Why a node is asked for its render output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderReason {
    /// The render pass of a tick.
    Tick,
    /// The given parent is rendering and embeds the node.
    Parent(NodeId),
    /// An outside caller, such as an inspector.
    External,
}

impl WidgetTree {
    /// Returns the node's identified render object, recomputing its content
    /// if the render-state flag is raised.
    ///
    /// Nodes that were never laid out keep their (empty) cached content and
    /// their raised flag.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`], [`TreeError::NotMounted`], or
    /// [`TreeError::Busy`] when called from the node's own callbacks.
    pub fn render(&mut self, id: NodeId, reason: RenderReason) -> Result<RenderObject, TreeError> {
        let node = self.mounted(id)?;
        if !node.flags.render_state || !node.layouted {
            tracing::trace!(node = ?id, ?reason, "render cache hit");
            return Ok(node.content.clone());
        }
        let content = node.content.clone();
        let style = node.style.resolved.clone();
        let overlay = node.debug_layout || self.config.debug_layout;
        let mut widget = self.lend_widget(id)?;

        self.inspect(id, InspectionKind::RenderingStarted);
        tracing::trace!(node = ?id, ?reason, "rendering");

        if style.visibility == Visibility::Hidden {
            self.return_widget(id, widget);
            content.replace_children(Vec::new());
        } else {
            let main = widget.render(&mut RenderCx { tree: self, node: id });
            self.return_widget(id, widget);
            let previous = core::mem::replace(&mut self.node_mut(id)?.main_content, main.clone());
            if let (Some(main), Some(previous)) = (&main, &previous)
                && main.same_identity(previous)
            {
                // Same object handed back: whatever a consumer derived from
                // it is stale now.
                main.invalidate_cache();
            }
            let bounds = self.global_bounds(id)?;
            let scroll = self.node(id)?.scroll.offset;
            let overlay =
                overlay.then_some((self.config.layout_debug_color, self.config.debug_label_size));
            content.replace_children(decorate(&style, bounds, scroll, main, overlay));
        }

        self.node_mut(id)?.flags.render_state = false;
        self.inspect(id, InspectionKind::RenderingFinished);
        self.report.rendered.push(id);
        Ok(content)
    }
}

/// Wraps a widget's main content in the decorations every node gets.
///
/// Draw order: background, (clipped, scrolled) content, border, debug
/// overlay. The whole stack is wrapped in an opacity layer below full
/// opacity.
fn decorate(
    style: &ResolvedStyle,
    bounds: Rect,
    scroll: Vec2,
    main: Option<RenderObject>,
    overlay: Option<(Color, f64)>,
) -> Vec<RenderObject> {
    let mut layers = Vec::new();
    if !style.background.is_transparent() {
        layers.push(RenderObject::rect(bounds, Paint::fill(style.background)));
    }

    if let Some(mut main) = main {
        if scroll != Vec2::ZERO {
            main = RenderObject::transform(Affine::translate(scroll), vec![main]);
        }
        if style.overflow_x != Overflow::Show || style.overflow_y != Overflow::Show {
            let (x0, x1) = if style.overflow_x == Overflow::Show {
                (f64::NEG_INFINITY, f64::INFINITY)
            } else {
                (bounds.x0, bounds.x1)
            };
            let (y0, y1) = if style.overflow_y == Overflow::Show {
                (f64::NEG_INFINITY, f64::INFINITY)
            } else {
                (bounds.y0, bounds.y1)
            };
            main = RenderObject::clip(Rect::new(x0, y0, x1, y1), vec![main]);
        }
        layers.push(main);
    }

    let border = style.border_width;
    if !style.border_color.is_transparent() {
        let paint = Paint::fill(style.border_color);
        let edges = [
            Rect::new(bounds.x0, bounds.y0, bounds.x1, bounds.y0 + border.y0),
            Rect::new(bounds.x0, bounds.y1 - border.y1, bounds.x1, bounds.y1),
            Rect::new(bounds.x0, bounds.y0 + border.y0, bounds.x0 + border.x0, bounds.y1 - border.y1),
            Rect::new(bounds.x1 - border.x1, bounds.y0 + border.y0, bounds.x1, bounds.y1 - border.y1),
        ];
        layers.extend(
            edges
                .into_iter()
                .filter(|r| r.area() > 0.0)
                .map(|r| RenderObject::rect(r, paint)),
        );
    }

    if let Some((color, label_size)) = overlay {
        layers.push(RenderObject::rect(bounds, Paint::stroke(color, 1.0)));
        let label = format!("{} x {}", bounds.width(), bounds.height());
        layers.push(RenderObject::text(
            label,
            Point::new(bounds.x0 + 1.0, bounds.y0 + 1.0),
            TextPaint::new(color, label_size),
        ));
    }

    if style.opacity < 1.0 {
        vec![RenderObject::opacity(style.opacity, layers)]
    } else {
        layers
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use kurbo::{Insets, Point, Rect, Size, Vec2};

    use super::RenderReason;
    use crate::lifecycle::Invalidation;
    use crate::paint::Color;
    use crate::render::{RenderKind, RenderObject};
    use crate::style::{Overflow, StyleValue, Visibility, keys};
    use crate::testing::{settle, tree_with};
    use crate::widget::{Element, RenderCx, Widget};
    use crate::widgets::{Column, Fixed};

    fn fixed(w: f64, h: f64) -> Element {
        Element::new(Fixed::new(Size::new(w, h)).fill(Color::RED))
    }

    /// Counts its renders and always hands back the same object.
    struct Stable {
        object: RenderObject,
        renders: Rc<Cell<u32>>,
    }

    impl Widget for Stable {
        fn layout(&mut self, _: &mut crate::widget::LayoutCx<'_>, _: crate::BoxConstraints) -> Size {
            Size::new(5.0, 5.0)
        }

        fn render(&mut self, _: &mut RenderCx<'_>) -> Option<RenderObject> {
            self.renders.set(self.renders.get() + 1);
            Some(self.object.clone())
        }
    }

    #[test]
    fn valid_render_state_is_a_cache_hit() {
        let renders = Rc::new(Cell::new(0));
        let object = RenderObject::container(Vec::new());
        let (mut tree, root) = tree_with(Element::new(Stable {
            object: object.clone(),
            renders: renders.clone(),
        }));
        let first = settle(&mut tree).content;
        assert_eq!(renders.get(), 1);
        let again = tree.render(root, RenderReason::External).unwrap();
        assert_eq!(renders.get(), 1, "valid cache must not re-render");
        assert!(again.same_identity(&first));
    }

    #[test]
    fn same_identity_forces_internal_cache_clear() {
        let renders = Rc::new(Cell::new(0));
        let object = RenderObject::container(Vec::new());
        let (mut tree, root) = tree_with(Element::new(Stable {
            object: object.clone(),
            renders: renders.clone(),
        }));
        settle(&mut tree);
        object.store_cache(17_u32);
        let revision = object.revision();

        tree.invalidate(root, Invalidation::RenderState).unwrap();
        let report = settle(&mut tree).report;
        assert_eq!(report.rendered, [root]);
        assert_eq!(renders.get(), 2);
        assert!(!object.has_cache(), "stale consumer cache survived");
        assert!(object.revision() > revision);
    }

    #[test]
    fn shallow_invalidation_reuses_children() {
        let (mut tree, root) = tree_with(Element::new(Column::new(|_| {
            vec![fixed(10.0, 10.0), fixed(10.0, 10.0)]
        })));
        let frame = settle(&mut tree);
        let children = tree.children(root).unwrap().to_vec();
        assert!(frame.content.find_identified(children[0]).is_some());

        tree.invalidate(root, Invalidation::RenderState).unwrap();
        let report = settle(&mut tree).report;
        assert_eq!(report.rendered, [root]);

        tree.invalidate_render_state(root, true).unwrap();
        let report = settle(&mut tree).report;
        // Children render inside the parent's render and finish first.
        assert_eq!(report.rendered, [children[0], children[1], root]);
    }

    #[test]
    fn hidden_keeps_identity_and_draws_nothing() {
        let (mut tree, root) = tree_with(Element::new(Column::new(|_| vec![fixed(10.0, 10.0)])));
        let before = settle(&mut tree).content;
        let child = tree.children(root).unwrap()[0];
        tree.set_style(child, keys::VISIBILITY, StyleValue::Visibility(Visibility::Hidden))
            .unwrap();
        let after = settle(&mut tree).content;
        assert!(after.same_identity(&before));
        let hidden = after.find_identified(child).unwrap();
        assert!(hidden.children().is_empty());
        // Still laid out.
        assert_eq!(tree.size(root).unwrap(), Size::new(10.0, 10.0));
    }

    #[test]
    fn decorations_follow_style() {
        let (mut tree, _) = tree_with(
            Element::new(Fixed::new(Size::new(10.0, 10.0)))
                .style(keys::BACKGROUND, StyleValue::Color(Color::WHITE))
                .style(keys::BORDER_WIDTH, StyleValue::Insets(Insets::uniform(1.0)))
                .style(keys::BORDER_COLOR, StyleValue::Color(Color::BLACK))
                .style(keys::OPACITY, StyleValue::Number(0.5)),
        );
        let content = settle(&mut tree).content;
        let children = content.children();
        assert_eq!(children.len(), 1);
        assert_eq!(*children[0].kind(), RenderKind::Opacity(0.5));
        let layers = children[0].children();
        // Background plus four border edges; the leaf draws nothing.
        assert_eq!(layers.len(), 5);
        assert!(matches!(
            layers[0].kind(),
            RenderKind::Rect { rect, .. } if *rect == Rect::new(0.0, 0.0, 12.0, 12.0)
        ));
    }

    #[test]
    fn scroll_content_is_clipped_and_translated() {
        let (mut tree, root) = tree_with(
            Element::new(Column::new(|_| vec![fixed(50.0, 300.0)]))
                .style(keys::OVERFLOW_Y, StyleValue::Overflow(Overflow::Scroll)),
        );
        tree.tick(crate::BoxConstraints::tight(Size::new(50.0, 100.0))).unwrap();
        tree.scroll_by(root, Vec2::new(0.0, -10.0)).unwrap();
        let offset = tree.scroll(root).unwrap().offset;
        let content = tree
            .tick(crate::BoxConstraints::tight(Size::new(50.0, 100.0)))
            .unwrap()
            .content;
        let children = content.children();
        let RenderKind::Clip(clip) = children[0].kind() else {
            panic!("expected a clip, got {:?}", children[0].kind());
        };
        assert_eq!(clip.y0, 0.0);
        assert_eq!(clip.y1, 100.0);
        assert!(clip.x0.is_infinite(), "horizontal axis shows overflow");
        let inner = children[0].children();
        assert_eq!(*inner[0].kind(), RenderKind::Transform(kurbo::Affine::translate(offset)));
    }

    #[test]
    fn debug_overlay_labels_size() {
        let (mut tree, _) = tree_with(Element::new(Fixed::new(Size::new(12.0, 8.0))).debug_layout(true));
        let content = settle(&mut tree).content;
        let found = content.children().iter().any(|c| {
            matches!(c.kind(), RenderKind::Text { text, origin, .. }
                if text == "12 x 8" && *origin == Point::new(1.0, 1.0))
        });
        assert!(found, "size label missing: {content:?}");
    }
}
