// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The capability set a drawing backend provides.

use grove_core::{Paint, TextPaint};
use kurbo::{Point, Rect, Size};

/// A surface that draws primitives.
///
/// Every coordinate and color handed to a backend is final: transforms,
/// opacity and clipping of nested scopes have already been resolved by the
/// [`DrawingContext`](crate::DrawingContext). A backend has no notion of
/// nesting.
pub trait DrawingBackend {
    /// Prepares the surface for a sequence of draw calls.
    fn activate(&mut self) {}

    /// Ends a sequence of draw calls.
    fn deactivate(&mut self) {}

    /// Restricts subsequent drawing to `rect`, replacing any previous clip.
    fn clip(&mut self, rect: Rect);

    /// Removes the clip.
    fn reset_clip(&mut self);

    /// Strokes a line segment.
    fn draw_line(&mut self, from: Point, to: Point, paint: &Paint);

    /// Fills and/or strokes a rectangle.
    fn draw_rect(&mut self, rect: Rect, paint: &Paint);

    /// Fills and/or strokes a circle.
    fn draw_circle(&mut self, center: Point, radius: f64, paint: &Paint);

    /// Draws text with its top-left corner at `origin`.
    fn draw_text(&mut self, text: &str, origin: Point, paint: &TextPaint);

    /// The extent of `text` drawn with `paint`.
    fn measure_text(&self, text: &str, paint: &TextPaint) -> Size;
}
