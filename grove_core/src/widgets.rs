// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A few generic widgets.
//!
//! These cover the layout protocols the tree needs exercised: a leaf with a
//! fixed config, a vertical stack, a single-child pass-through, and a text
//! leaf measured through [`TextMeasure`](crate::TextMeasure).

use std::fmt;

use kurbo::{Insets, Point, Size};

use crate::geometry::{BoxConfig, BoxConstraints};
use crate::paint::{Color, Paint, TextPaint};
use crate::render::RenderObject;
use crate::style::{StyleKey, StyleValue, SupportSet, ValueKind, keys};
use crate::widget::{BoxConfigCx, BuildCx, Element, LayoutCx, RenderCx, Widget};

type Builder = Box<dyn FnMut(&mut BuildCx<'_>) -> Vec<Element>>;

// -- Fixed --

/// A leaf with a fixed box config and an optional fill.
#[derive(Clone, Debug)]
pub struct Fixed {
    config: BoxConfig,
    fill: Option<Color>,
}

impl Fixed {
    /// A leaf that wants exactly `size`.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self::with_config(BoxConfig::fixed(size))
    }

    /// A leaf with an arbitrary config; it lays out at the preferred size.
    #[must_use]
    pub fn with_config(config: BoxConfig) -> Self {
        Self { config, fill: None }
    }

    /// Fills the content box with `color`.
    #[must_use]
    pub fn fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    /// Changes the wanted size. Follow with a box-config invalidation.
    pub fn set_size(&mut self, size: Size) {
        self.config = BoxConfig::fixed(size);
    }

    /// The current config.
    #[must_use]
    pub fn config(&self) -> BoxConfig {
        self.config
    }
}

impl Widget for Fixed {
    fn box_config(&self, _: &mut BoxConfigCx<'_>) -> BoxConfig {
        self.config
    }

    fn layout(&mut self, _: &mut LayoutCx<'_>, _: BoxConstraints) -> Size {
        self.config.preferred_size
    }

    fn render(&mut self, cx: &mut RenderCx<'_>) -> Option<RenderObject> {
        let color = self.fill?;
        Some(RenderObject::rect(cx.content_bounds(), Paint::fill(color)))
    }
}

// -- Column --

/// Stacks its children vertically, top to bottom.
///
/// Every child gets the column's maximum width and unbounded height. The
/// column is as wide as its widest child.
pub struct Column {
    builder: Builder,
    spacing: f64,
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("spacing", &self.spacing)
            .finish_non_exhaustive()
    }
}

impl Column {
    /// A column whose children are produced by `builder` on every build.
    #[must_use]
    pub fn new(builder: impl FnMut(&mut BuildCx<'_>) -> Vec<Element> + 'static) -> Self {
        Self {
            builder: Box::new(builder),
            spacing: 0.0,
        }
    }

    /// Sets the vertical gap between children.
    #[must_use]
    pub fn spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    fn gaps(&self, children: usize) -> f64 {
        self.spacing * children.saturating_sub(1) as f64
    }
}

impl Widget for Column {
    fn build(&mut self, cx: &mut BuildCx<'_>) -> Vec<Element> {
        (self.builder)(cx)
    }

    fn box_config(&self, cx: &mut BoxConfigCx<'_>) -> BoxConfig {
        let children = cx.children();
        let gaps = self.gaps(children.len());
        let stack = |acc: Size, s: Size| Size::new(acc.width.max(s.width), acc.height + s.height);
        let mut min = Size::new(0.0, gaps);
        let mut preferred = min;
        let mut max = min;
        for child in children {
            let c = cx.child_box_config(child);
            min = stack(min, c.min_size);
            preferred = stack(preferred, c.preferred_size);
            max = stack(max, c.max_size);
        }
        BoxConfig::new(min, preferred, max)
    }

    fn layout(&mut self, cx: &mut LayoutCx<'_>, constraints: BoxConstraints) -> Size {
        let child_constraints =
            BoxConstraints::new(Size::ZERO, Size::new(constraints.max().width, f64::INFINITY));
        let mut y = 0.0;
        let mut width: f64 = 0.0;
        for (index, child) in cx.children().into_iter().enumerate() {
            if index > 0 {
                y += self.spacing;
            }
            let size = cx.layout_child(child, child_constraints);
            cx.place_child(child, Point::new(0.0, y));
            y += size.height;
            width = width.max(size.width);
        }
        Size::new(width, y)
    }
}

// -- Padded --

/// A single-child pass-through, usually carrying padding.
pub struct Padded {
    builder: Box<dyn FnMut(&mut BuildCx<'_>) -> Element>,
}

impl fmt::Debug for Padded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Padded").finish_non_exhaustive()
    }
}

impl Padded {
    /// Wraps the element produced by `builder`.
    #[must_use]
    pub fn new(builder: impl FnMut(&mut BuildCx<'_>) -> Element + 'static) -> Self {
        Self {
            builder: Box::new(builder),
        }
    }

    /// An element wrapping `builder`'s child with `insets` of padding.
    #[must_use]
    pub fn element(
        insets: Insets,
        builder: impl FnMut(&mut BuildCx<'_>) -> Element + 'static,
    ) -> Element {
        Element::new(Self::new(builder)).style(keys::PADDING, StyleValue::Insets(insets))
    }
}

impl Widget for Padded {
    fn build(&mut self, cx: &mut BuildCx<'_>) -> Vec<Element> {
        vec![(self.builder)(cx)]
    }
}

// -- Label --

/// One line of text, sized by the configured text measure.
///
/// Reads [`FOREGROUND`](keys::FOREGROUND) and [`FONT_SIZE`](keys::FONT_SIZE).
#[derive(Clone, Debug)]
pub struct Label {
    text: String,
}

impl Label {
    /// Default glyph color.
    pub const DEFAULT_COLOR: Color = Color::BLACK;
    /// Default font size.
    pub const DEFAULT_FONT_SIZE: f64 = 14.0;

    /// A label showing `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The shown text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the text. Follow with a box-config invalidation.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    fn paint(style: impl Fn(&StyleKey) -> Option<StyleValue>) -> TextPaint {
        let color = style(&keys::FOREGROUND)
            .and_then(|v| v.as_color())
            .unwrap_or(Self::DEFAULT_COLOR);
        let size = style(&keys::FONT_SIZE)
            .and_then(|v| v.as_number())
            .unwrap_or(Self::DEFAULT_FONT_SIZE);
        TextPaint::new(color, size)
    }
}

impl Widget for Label {
    fn supported_style_properties(&self) -> SupportSet {
        fn positive(value: &StyleValue) -> bool {
            value.as_number().is_some_and(|n| n > 0.0)
        }
        SupportSet::new()
            .with(keys::FOREGROUND, ValueKind::Color)
            .with_validator(keys::FONT_SIZE, ValueKind::Number, Some(positive))
    }

    fn box_config(&self, cx: &mut BoxConfigCx<'_>) -> BoxConfig {
        let paint = Self::paint(|k| cx.style(k));
        BoxConfig::fixed(cx.measure_text(&self.text, &paint))
    }

    fn layout(&mut self, cx: &mut LayoutCx<'_>, _: BoxConstraints) -> Size {
        let paint = Self::paint(|k| cx.style(k));
        cx.measure_text(&self.text, &paint)
    }

    fn render(&mut self, cx: &mut RenderCx<'_>) -> Option<RenderObject> {
        let paint = Self::paint(|k| cx.style(k));
        Some(RenderObject::text(self.text.clone(), cx.content_bounds().origin(), paint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Invalidation;
    use crate::render::RenderKind;
    use crate::testing::{settle, tree_with};

    fn fixed(w: f64, h: f64) -> Element {
        Element::new(Fixed::new(Size::new(w, h)))
    }

    #[test]
    fn column_stacks_with_spacing() {
        let (mut tree, root) = tree_with(Element::new(
            Column::new(|_| vec![fixed(10.0, 10.0), fixed(30.0, 5.0), fixed(20.0, 1.0)]).spacing(2.0),
        ));
        settle(&mut tree);
        let children = tree.children(root).unwrap().to_vec();
        let ys: Vec<f64> = children.iter().map(|&c| tree.position(c).unwrap().y).collect();
        assert_eq!(ys, [0.0, 12.0, 19.0]);
        assert_eq!(tree.size(root).unwrap(), Size::new(30.0, 20.0));
        assert_eq!(
            tree.cached_box_config(root).unwrap().map(|c| c.preferred_size),
            Some(Size::new(30.0, 20.0))
        );
    }

    #[test]
    fn padded_offsets_its_child() {
        let (mut tree, root) = tree_with(Padded::element(Insets::uniform(4.0), |_| fixed(10.0, 10.0)));
        settle(&mut tree);
        let child = tree.children(root).unwrap()[0];
        assert_eq!(tree.position(child).unwrap(), Point::new(4.0, 4.0));
        assert_eq!(tree.size(root).unwrap(), Size::new(18.0, 18.0));
    }

    #[test]
    fn label_measures_and_draws_text() {
        let (mut tree, root) = tree_with(
            Element::new(Label::new("hello"))
                .style(keys::FONT_SIZE, StyleValue::Number(10.0))
                .style(keys::FOREGROUND, StyleValue::Color(Color::RED)),
        );
        let frame = settle(&mut tree);
        // Five characters at half an em each.
        assert_eq!(tree.size(root).unwrap(), Size::new(25.0, 10.0));
        let children = frame.content.children();
        let RenderKind::Text { text, paint, .. } = children[0].kind() else {
            panic!("expected text, got {:?}", children[0].kind());
        };
        assert_eq!(text, "hello");
        assert_eq!(paint.color, Color::RED);

        tree.widget_mut::<Label>(root).unwrap().set_text("hi");
        tree.invalidate(root, Invalidation::BoxConfig).unwrap();
        settle(&mut tree);
        assert_eq!(tree.size(root).unwrap(), Size::new(10.0, 10.0));
    }

    #[test]
    fn fixed_fill_covers_content_box() {
        let (mut tree, _) = tree_with(
            Element::new(Fixed::new(Size::new(4.0, 4.0)).fill(Color::WHITE))
                .style(keys::PADDING, StyleValue::Insets(Insets::uniform(1.0))),
        );
        let content = settle(&mut tree).content;
        let children = content.children();
        assert!(matches!(
            children[0].kind(),
            RenderKind::Rect { rect, .. } if *rect == kurbo::Rect::new(1.0, 1.0, 5.0, 5.0)
        ));
    }
}
