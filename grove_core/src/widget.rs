// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The widget trait, elements, and the contexts handed to widget callbacks.
//!
//! A [`Widget`] is the behavior of one node: it produces children
//! ([`build`](Widget::build)), declares its intrinsic sizing
//! ([`box_config`](Widget::box_config)), sizes and places its children
//! ([`layout`](Widget::layout)), and draws itself
//! ([`render`](Widget::render)). An [`Element`] is a widget together with
//! the per-node attributes its parent assigns: key, classes, direct style,
//! provided dependencies and style rules.
//!
//! While a callback runs, the widget is lent out of the tree; the tree
//! itself is reachable only through the callback's context.

use std::any::{Any, type_name};
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use kurbo::{Point, Rect, Size};

use crate::config::TreeConfig;
use crate::event::NodeHandlers;
use crate::geometry::{BoxConfig, BoxConstraints};
use crate::paint::TextPaint;
use crate::render::RenderObject;
use crate::style::{ResolvedStyle, StyleKey, StyleProperties, StyleRule, StyleValue, SupportSet};
use crate::tree::{NodeId, RenderReason, TreePath, WidgetTree};

/// A stable identity for reconciliation.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Key(Cow<'static, str>);

impl Key {
    /// The key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Key {
    fn from(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }
}

impl From<String> for Key {
    fn from(key: String) -> Self {
        Self(Cow::Owned(key))
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({:?})", self.0)
    }
}

/// The behavior of one node.
///
/// Every method has a default, so a widget only implements what it needs.
/// The defaults make a widget a transparent group: box config and layout
/// pass through to the children and rendering draws the children.
pub trait Widget: Any {
    /// Name used for selector matching, diagnostics and error messages.
    fn name(&self) -> &'static str {
        short_type_name(type_name::<Self>())
    }

    /// Pulls injected values. Called once, at mount, before the first build.
    fn inject(&mut self, deps: &Dependencies<'_>) {
        _ = deps;
    }

    /// Produces the node's children.
    fn build(&mut self, cx: &mut BuildCx<'_>) -> Vec<Element> {
        _ = cx;
        Vec::new()
    }

    /// Hands out persistent state when this instance is being replaced by a
    /// rebuilt instance of the same type.
    fn take_state(&mut self) -> Option<Box<dyn Any>> {
        None
    }

    /// Receives the state handed out by the instance this one replaces.
    fn restore_state(&mut self, state: Box<dyn Any>) {
        _ = state;
    }

    /// Style properties this widget reads, beyond the universal ones.
    fn supported_style_properties(&self) -> SupportSet {
        SupportSet::new()
    }

    /// Style properties this widget defines on its children.
    fn child_style_properties(&self) -> SupportSet {
        SupportSet::new()
    }

    /// Intrinsic sizing of the content box (padding and border are added by
    /// the tree).
    fn box_config(&self, cx: &mut BoxConfigCx<'_>) -> BoxConfig {
        let children = cx.children();
        let mut configs = children.iter().map(|&c| cx.child_box_config(c));
        let Some(first) = configs.next() else {
            return BoxConfig::default();
        };
        configs.fold(first, |acc, c| BoxConfig {
            min_size: max_size(acc.min_size, c.min_size),
            preferred_size: max_size(acc.preferred_size, c.preferred_size),
            max_size: max_size(acc.max_size, c.max_size),
        })
    }

    /// Lays out children inside `constraints` (already reduced by padding
    /// and border) and returns the unconstrained content size.
    fn layout(&mut self, cx: &mut LayoutCx<'_>, constraints: BoxConstraints) -> Size {
        let mut size = Size::ZERO;
        for child in cx.children() {
            let child_size = cx.layout_child(child, constraints);
            cx.place_child(child, Point::ZERO);
            size = max_size(size, child_size);
        }
        size
    }

    /// Produces the node's main content, in global coordinates.
    fn render(&mut self, cx: &mut RenderCx<'_>) -> Option<RenderObject> {
        Some(RenderObject::container(cx.render_children()))
    }

    /// Called once when the node is destroyed.
    fn destroyed(&mut self) {}
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

fn max_size(a: Size, b: Size) -> Size {
    Size::new(a.width.max(b.width), a.height.max(b.height))
}

/// A widget plus the attributes its parent assigns to its node.
pub struct Element {
    pub(crate) widget: Box<dyn Widget>,
    pub(crate) key: Option<Key>,
    pub(crate) classes: Vec<String>,
    pub(crate) style: StyleProperties,
    pub(crate) provided: Vec<Rc<dyn Any>>,
    pub(crate) style_rules: Vec<StyleRule>,
    pub(crate) creates_style_scope: bool,
    pub(crate) debug_layout: bool,
    pub(crate) configure: Vec<Box<dyn FnOnce(&mut NodeHandlers)>>,
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("widget", &self.widget.name())
            .field("key", &self.key)
            .field("classes", &self.classes)
            .finish_non_exhaustive()
    }
}

impl<W: Widget> From<W> for Element {
    fn from(widget: W) -> Self {
        Self::new(widget)
    }
}

impl Element {
    /// Wraps a widget with no attributes.
    #[must_use]
    pub fn new(widget: impl Widget) -> Self {
        Self {
            widget: Box::new(widget),
            key: None,
            classes: Vec::new(),
            style: StyleProperties::new(),
            provided: Vec::new(),
            style_rules: Vec::new(),
            creates_style_scope: false,
            debug_layout: false,
            configure: Vec::new(),
        }
    }

    /// Sets the reconciliation key.
    #[must_use]
    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Adds a class for selector matching.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Sets a direct style property.
    #[must_use]
    pub fn style(mut self, key: StyleKey, value: StyleValue) -> Self {
        self.style.insert(key, value);
        self
    }

    /// Makes `value` injectable into every descendant.
    #[must_use]
    pub fn provide<T: Any>(mut self, value: T) -> Self {
        self.provided.push(Rc::new(value));
        self
    }

    /// Adds a rule that applies to descendants only.
    ///
    /// Implies [`creates_style_scope`](Self::creates_style_scope).
    #[must_use]
    pub fn provide_style(mut self, rule: StyleRule) -> Self {
        self.style_rules.push(rule);
        self.creates_style_scope = true;
        self
    }

    /// Opens a new style scope for the node's descendants.
    #[must_use]
    pub fn creates_style_scope(mut self) -> Self {
        self.creates_style_scope = true;
        self
    }

    /// Registers event handlers on the node when it is created, so that
    /// even [`mounted`](NodeHandlers::mounted) can be observed.
    #[must_use]
    pub fn handlers(mut self, configure: impl FnOnce(&mut NodeHandlers) + 'static) -> Self {
        self.configure.push(Box::new(configure));
        self
    }

    /// Draws the layout debugging overlay for this node.
    #[must_use]
    pub fn debug_layout(mut self, enabled: bool) -> Self {
        self.debug_layout = enabled;
        self
    }
}

/// Injectable values provided by a node's ancestors.
pub struct Dependencies<'a> {
    pub(crate) tree: &'a WidgetTree,
    pub(crate) from: Option<NodeId>,
}

impl fmt::Debug for Dependencies<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependencies")
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl Dependencies<'_> {
    /// The value of type `T` provided by the nearest ancestor.
    #[must_use]
    pub fn get<T: Any>(&self) -> Option<Rc<T>> {
        self.tree.lookup_dependency(self.from)
    }
}

/// Context of [`Widget::build`].
#[derive(Debug)]
pub struct BuildCx<'a> {
    pub(crate) tree: &'a WidgetTree,
    pub(crate) node: NodeId,
}

impl BuildCx<'_> {
    /// The node being built.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The node's tree path.
    #[must_use]
    pub fn tree_path(&self) -> Option<&TreePath> {
        self.tree.tree_path(self.node).ok()
    }

    /// A resolved style value of the node.
    #[must_use]
    pub fn style(&self, key: &StyleKey) -> Option<&StyleValue> {
        self.tree.resolved_style(self.node).ok()?.get(key)
    }

    /// The value of type `T` provided by the nearest ancestor.
    #[must_use]
    pub fn dependency<T: Any>(&self) -> Option<Rc<T>> {
        let parent = self.tree.parent(self.node).ok().flatten();
        self.tree.lookup_dependency(parent)
    }

    /// The tree configuration.
    #[must_use]
    pub fn config(&self) -> &TreeConfig {
        self.tree.config()
    }
}

/// Context of [`Widget::box_config`].
#[derive(Debug)]
pub struct BoxConfigCx<'a> {
    pub(crate) tree: &'a mut WidgetTree,
    pub(crate) node: NodeId,
}

impl BoxConfigCx<'_> {
    /// The node whose config is computed.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The node's children.
    #[must_use]
    pub fn children(&self) -> Vec<NodeId> {
        self.tree.children(self.node).map(<[_]>::to_vec).unwrap_or_default()
    }

    /// A child's box config, recomputed first if stale.
    pub fn child_box_config(&mut self, child: NodeId) -> BoxConfig {
        self.tree.box_config(child).unwrap_or_else(|err| {
            tracing::warn!(node = ?self.node, ?child, %err, "child box config unavailable");
            BoxConfig::default()
        })
    }

    /// A resolved style value of the node.
    #[must_use]
    pub fn style(&self, key: &StyleKey) -> Option<StyleValue> {
        self.tree.resolved_style(self.node).ok()?.get(key).cloned()
    }

    /// Measures text with the configured [`TextMeasure`](crate::TextMeasure).
    #[must_use]
    pub fn measure_text(&self, text: &str, paint: &TextPaint) -> Size {
        self.tree.config().text_measure.measure_text(text, paint)
    }
}

/// Context of [`Widget::layout`].
#[derive(Debug)]
pub struct LayoutCx<'a> {
    pub(crate) tree: &'a mut WidgetTree,
    pub(crate) node: NodeId,
    pub(crate) placements: Vec<(NodeId, Point)>,
}

impl LayoutCx<'_> {
    /// The node being laid out.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The node's children.
    #[must_use]
    pub fn children(&self) -> Vec<NodeId> {
        self.tree.children(self.node).map(<[_]>::to_vec).unwrap_or_default()
    }

    /// A child's box config, recomputed first if stale.
    pub fn child_box_config(&mut self, child: NodeId) -> BoxConfig {
        self.tree.box_config(child).unwrap_or_else(|err| {
            tracing::warn!(node = ?self.node, ?child, %err, "child box config unavailable");
            BoxConfig::default()
        })
    }

    /// Lays out a child and returns its resolved size.
    ///
    /// # Panics
    ///
    /// Panics if `constraints` has an infinite minimum.
    pub fn layout_child(&mut self, child: NodeId, constraints: BoxConstraints) -> Size {
        match self.tree.layout(child, constraints) {
            Ok(size) => size,
            Err(err) => {
                tracing::warn!(node = ?self.node, ?child, %err, "child layout refused");
                self.tree.size(child).unwrap_or(Size::ZERO)
            }
        }
    }

    /// Places a child at `origin` relative to the content box. Children
    /// that are never placed end up at the content origin.
    pub fn place_child(&mut self, child: NodeId, origin: Point) {
        if let Some(slot) = self.placements.iter_mut().find(|(c, _)| *c == child) {
            slot.1 = origin;
        } else {
            self.placements.push((child, origin));
        }
    }

    /// A resolved style value of the node.
    #[must_use]
    pub fn style(&self, key: &StyleKey) -> Option<StyleValue> {
        self.tree.resolved_style(self.node).ok()?.get(key).cloned()
    }

    /// Measures text with the configured [`TextMeasure`](crate::TextMeasure).
    #[must_use]
    pub fn measure_text(&self, text: &str, paint: &TextPaint) -> Size {
        self.tree.config().text_measure.measure_text(text, paint)
    }
}

/// Context of [`Widget::render`].
#[derive(Debug)]
pub struct RenderCx<'a> {
    pub(crate) tree: &'a mut WidgetTree,
    pub(crate) node: NodeId,
}

impl RenderCx<'_> {
    /// The node being rendered.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The node's resolved size.
    #[must_use]
    pub fn size(&self) -> Size {
        self.tree.size(self.node).unwrap_or(Size::ZERO)
    }

    /// The node's border box in global coordinates.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.tree.global_bounds(self.node).unwrap_or(Rect::ZERO)
    }

    /// The node's content box (inside padding and border) in global
    /// coordinates.
    #[must_use]
    pub fn content_bounds(&self) -> Rect {
        let bounds = self.bounds();
        let Ok(style) = self.tree.resolved_style(self.node) else {
            return bounds;
        };
        let origin = bounds.origin() + style.content_offset();
        let chrome = style.chrome_size();
        let size = Size::new(
            (bounds.width() - chrome.width).max(0.0),
            (bounds.height() - chrome.height).max(0.0),
        );
        Rect::from_origin_size(origin, size)
    }

    /// The node's children.
    #[must_use]
    pub fn children(&self) -> Vec<NodeId> {
        self.tree.children(self.node).map(<[_]>::to_vec).unwrap_or_default()
    }

    /// The cached or freshly rendered content of a child.
    pub fn render_child(&mut self, child: NodeId) -> Option<RenderObject> {
        self.tree
            .render(child, RenderReason::Parent(self.node))
            .inspect_err(|err| tracing::warn!(node = ?self.node, ?child, %err, "child render refused"))
            .ok()
    }

    /// The content of every child, in order.
    pub fn render_children(&mut self) -> Vec<RenderObject> {
        self.children()
            .into_iter()
            .filter_map(|c| self.render_child(c))
            .collect()
    }

    /// The node's resolved style.
    #[must_use]
    pub fn resolved_style(&self) -> Option<&ResolvedStyle> {
        self.tree.resolved_style(self.node).ok()
    }

    /// A resolved style value of the node.
    #[must_use]
    pub fn style(&self, key: &StyleKey) -> Option<StyleValue> {
        self.resolved_style()?.get(key).cloned()
    }

    /// Measures text with the configured [`TextMeasure`](crate::TextMeasure).
    #[must_use]
    pub fn measure_text(&self, text: &str, paint: &TextPaint) -> Size {
        self.tree.config().text_measure.measure_text(text, paint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;
    impl Widget for Plain {}

    struct Generic<T>(T);
    impl<T: 'static> Widget for Generic<T> {}

    #[test]
    fn default_names_are_short() {
        assert_eq!(Plain.name(), "Plain");
        assert_eq!(Generic(1_u8).name(), "Generic");
    }

    #[test]
    fn element_builder_collects_attributes() {
        let el = Element::new(Plain)
            .key("a")
            .class("primary")
            .provide(3_u32)
            .provide_style(StyleRule::new(
                crate::style::Selector::any(),
                StyleProperties::new(),
            ));
        assert_eq!(el.key, Some(Key::from("a")));
        assert_eq!(el.classes, ["primary"]);
        assert_eq!(el.provided.len(), 1);
        assert!(el.creates_style_scope);
    }
}
