// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree-wide configuration.

use std::fmt;
use std::rc::Rc;

use kurbo::Size;

use crate::paint::{Color, TextPaint};

/// Measures text for layout.
///
/// Usually backed by the drawing backend's font machinery.
pub trait TextMeasure {
    /// The extent of `text` drawn with `paint`.
    fn measure_text(&self, text: &str, paint: &TextPaint) -> Size;
}

/// A font-free estimate: every character is half an em wide, lines are one
/// em tall.
#[derive(Clone, Copy, Debug, Default)]
pub struct ApproximateTextMeasure;

impl TextMeasure for ApproximateTextMeasure {
    fn measure_text(&self, text: &str, paint: &TextPaint) -> Size {
        let chars = text.chars().count() as f64;
        Size::new(chars * paint.font_size * 0.5, paint.font_size)
    }
}

/// Knobs shared by every node of a [`WidgetTree`](crate::WidgetTree).
#[derive(Clone)]
pub struct TreeConfig {
    /// Draw bounds outlines and size labels on every node.
    pub debug_layout: bool,
    /// Color of the layout debugging overlay.
    pub layout_debug_color: Color,
    /// Font size of the size label in the overlay.
    pub debug_label_size: f64,
    /// Multiplier applied to [`scroll_by`](crate::WidgetTree::scroll_by)
    /// amounts.
    pub scroll_speed: f64,
    /// How often the layout pass drains newly invalidated nodes before
    /// leaving the rest for the next tick.
    pub max_layout_rounds: usize,
    /// Text measurement used by widgets during layout.
    pub text_measure: Rc<dyn TextMeasure>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            debug_layout: false,
            layout_debug_color: Color::RED,
            debug_label_size: 12.0,
            scroll_speed: 1.0,
            max_layout_rounds: 8,
            text_measure: Rc::new(ApproximateTextMeasure),
        }
    }
}

impl fmt::Debug for TreeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeConfig")
            .field("debug_layout", &self.debug_layout)
            .field("layout_debug_color", &self.layout_debug_color)
            .field("debug_label_size", &self.debug_label_size)
            .field("scroll_speed", &self.scroll_speed)
            .field("max_layout_rounds", &self.max_layout_rounds)
            .finish_non_exhaustive()
    }
}
