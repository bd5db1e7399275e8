// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nested transform, opacity and clip accumulation.
//!
//! A [`CompositingStack`] has two layers:
//!
//! - the *inherent* layer, fixed once [`lock`](CompositingStack::lock)ed,
//! - the *overlay* layer, which [`transform`](CompositingStack::transform),
//!   [`set_opacity`](CompositingStack::set_opacity) and
//!   [`clip`](CompositingStack::clip) modify.
//!
//! The merged transform applies the overlay first and the inherent layer
//! second; within the overlay, the most recently appended transform applies
//! first. Merged opacity is the product of both layers. The merged clip is
//! the intersection of both clips, where present. Clips are stored in
//! device coordinates.
//!
//! Locking folds the overlay into the inherent layer and resets the overlay
//! to identity, full opacity and no clip. Everything accumulated before the
//! lock keeps applying to everything drawn afterwards.

use core::fmt;

use grove_core::{Paint, TextPaint};
use kurbo::{Affine, Point, Rect, Size};

use crate::backend::DrawingBackend;

/// One layer of compositing state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Compositing {
    /// Maps local coordinates to the coordinates of the enclosing layer.
    pub transform: Affine,
    /// Alpha multiplier in `[0, 1]`.
    pub opacity: f64,
    /// Clip rectangle in device coordinates.
    pub clip: Option<Rect>,
}

impl Default for Compositing {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            opacity: 1.0,
            clip: None,
        }
    }
}

/// Inherent plus overlay compositing state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CompositingStack {
    inherent: Compositing,
    overlay: Compositing,
}

impl CompositingStack {
    /// An identity stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The locked layer.
    #[must_use]
    pub fn inherent(&self) -> &Compositing {
        &self.inherent
    }

    /// The mutable layer.
    #[must_use]
    pub fn overlay(&self) -> &Compositing {
        &self.overlay
    }

    // -- Overlay mutation --

    /// Appends `transform`; it applies before every transform already in
    /// the stack.
    pub fn transform(&mut self, transform: Affine) {
        self.overlay.transform = self.overlay.transform * transform;
    }

    /// Sets the overlay opacity.
    ///
    /// # Panics
    ///
    /// Panics if `opacity` is outside `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f64) {
        assert!(
            (0.0..=1.0).contains(&opacity),
            "opacity must be within [0, 1], got {opacity}"
        );
        self.overlay.opacity = opacity;
    }

    /// Narrows the overlay clip to `rect`, given in local coordinates.
    pub fn clip(&mut self, rect: Rect) {
        let device = self.map_rect(rect);
        self.overlay.clip = Some(match self.overlay.clip {
            Some(current) => current.intersect(device),
            None => device,
        });
    }

    /// Drops the overlay clip; the inherent clip still applies.
    pub fn reset_clip(&mut self) {
        self.overlay.clip = None;
    }

    /// Folds the overlay into the inherent layer.
    pub fn lock(&mut self) {
        self.inherent = Compositing {
            transform: self.merged_transform(),
            opacity: self.merged_opacity(),
            clip: self.merged_clip(),
        };
        self.overlay = Compositing::default();
    }

    // -- Merged state --

    /// Local to device coordinates.
    #[must_use]
    pub fn merged_transform(&self) -> Affine {
        self.inherent.transform * self.overlay.transform
    }

    /// Effective alpha multiplier.
    #[must_use]
    pub fn merged_opacity(&self) -> f64 {
        self.inherent.opacity * self.overlay.opacity
    }

    /// Effective clip in device coordinates.
    #[must_use]
    pub fn merged_clip(&self) -> Option<Rect> {
        match (self.inherent.clip, self.overlay.clip) {
            (Some(a), Some(b)) => Some(a.intersect(b)),
            (a, b) => a.or(b),
        }
    }

    // -- Preprocessing --

    /// Maps a local point to device coordinates.
    #[must_use]
    pub fn map_point(&self, point: Point) -> Point {
        self.merged_transform() * point
    }

    /// Maps a local rectangle to its device-space bounding box.
    ///
    /// Infinite edges stay infinite. Under a rotation or skew, a rectangle
    /// with an infinite edge maps to the whole plane.
    #[must_use]
    pub fn map_rect(&self, rect: Rect) -> Rect {
        let transform = self.merged_transform();
        let finite = [rect.x0, rect.y0, rect.x1, rect.y1].iter().all(|v| v.is_finite());
        if finite {
            return transform.transform_rect_bbox(rect);
        }
        let [a, b, c, d, e, f] = transform.as_coeffs();
        if b != 0.0 || c != 0.0 {
            return Rect::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::INFINITY);
        }
        let (x0, x1) = map_span(rect.x0, rect.x1, a, e);
        let (y0, y1) = map_span(rect.y0, rect.y1, d, f);
        Rect::new(x0, y0, x1, y1)
    }

    /// Scales a local length by the transform's area scale.
    #[must_use]
    pub fn map_length(&self, length: f64) -> f64 {
        length * self.merged_transform().determinant().abs().sqrt()
    }

    /// Applies the merged opacity to a paint.
    #[must_use]
    pub fn map_paint(&self, paint: &Paint) -> Paint {
        paint.multiply_alpha(self.merged_opacity())
    }

    /// Applies the merged opacity and the vertical scale to a text paint.
    #[must_use]
    pub fn map_text_paint(&self, paint: &TextPaint) -> TextPaint {
        let [_, _, c, d, _, _] = self.merged_transform().as_coeffs();
        TextPaint::new(
            paint.color.multiply_alpha(self.merged_opacity()),
            paint.font_size * c.hypot(d),
        )
    }
}

/// Scales and offsets an interval along one axis, keeping it ordered.
fn map_span(lo: f64, hi: f64, scale: f64, offset: f64) -> (f64, f64) {
    if scale == 0.0 {
        return (offset, offset);
    }
    let (a, b) = (lo * scale + offset, hi * scale + offset);
    (a.min(b), a.max(b))
}

/// A [`CompositingStack`] bound to a backend.
///
/// Draw calls map their geometry through the merged transform and their
/// colors through the merged opacity before reaching the backend. Clip
/// changes are forwarded immediately. Use [`nested`](Self::nested) to open
/// a scope whose changes are discarded when it ends.
pub struct DrawingContext<'a, B: DrawingBackend + ?Sized> {
    backend: &'a mut B,
    stack: CompositingStack,
}

impl<B: DrawingBackend + ?Sized> fmt::Debug for DrawingContext<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawingContext")
            .field("stack", &self.stack)
            .finish_non_exhaustive()
    }
}

impl<'a, B: DrawingBackend + ?Sized> DrawingContext<'a, B> {
    /// A context with identity compositing state.
    pub fn new(backend: &'a mut B) -> Self {
        Self {
            backend,
            stack: CompositingStack::new(),
        }
    }

    /// A context sharing the backend and starting from a copy of this
    /// context's state.
    ///
    /// Clip changes made in the nested scope reach the backend; call
    /// [`sync_clip`](Self::sync_clip) on this context after the scope ends
    /// to restore its clip.
    pub fn nested(&mut self) -> DrawingContext<'_, B> {
        DrawingContext {
            backend: &mut *self.backend,
            stack: self.stack,
        }
    }

    /// The compositing state.
    #[must_use]
    pub fn stack(&self) -> &CompositingStack {
        &self.stack
    }

    // -- State --

    /// See [`CompositingStack::transform`].
    pub fn transform(&mut self, transform: Affine) {
        self.stack.transform(transform);
    }

    /// See [`CompositingStack::set_opacity`].
    ///
    /// # Panics
    ///
    /// Panics if `opacity` is outside `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f64) {
        self.stack.set_opacity(opacity);
    }

    /// See [`CompositingStack::lock`].
    pub fn lock(&mut self) {
        self.stack.lock();
    }

    /// Narrows the clip to `rect` and forwards the merged clip.
    pub fn clip(&mut self, rect: Rect) {
        self.stack.clip(rect);
        self.sync_clip();
    }

    /// Drops the overlay clip and forwards what remains.
    pub fn reset_clip(&mut self) {
        self.stack.reset_clip();
        self.sync_clip();
    }

    /// Forwards the merged clip to the backend.
    pub fn sync_clip(&mut self) {
        match self.stack.merged_clip() {
            Some(clip) => self.backend.clip(clip),
            None => self.backend.reset_clip(),
        }
    }

    /// Activates the backend and applies the current clip.
    pub fn begin_drawing(&mut self) {
        self.backend.activate();
        self.sync_clip();
    }

    /// Deactivates the backend.
    pub fn end_drawing(&mut self) {
        self.backend.deactivate();
    }

    // -- Primitives --

    /// Strokes a line segment.
    pub fn draw_line(&mut self, from: Point, to: Point, paint: &Paint) {
        let paint = self.stack.map_paint(paint);
        self.backend
            .draw_line(self.stack.map_point(from), self.stack.map_point(to), &paint);
    }

    /// Fills and/or strokes a rectangle.
    pub fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        let paint = self.stack.map_paint(paint);
        self.backend.draw_rect(self.stack.map_rect(rect), &paint);
    }

    /// Fills and/or strokes a circle.
    pub fn draw_circle(&mut self, center: Point, radius: f64, paint: &Paint) {
        let paint = self.stack.map_paint(paint);
        self.backend.draw_circle(
            self.stack.map_point(center),
            self.stack.map_length(radius),
            &paint,
        );
    }

    /// Draws text with its top-left corner at `origin`.
    pub fn draw_text(&mut self, text: &str, origin: Point, paint: &TextPaint) {
        let paint = self.stack.map_text_paint(paint);
        self.backend
            .draw_text(text, self.stack.map_point(origin), &paint);
    }

    /// Measures text as it would be drawn in this context.
    #[must_use]
    pub fn measure_text(&self, text: &str, paint: &TextPaint) -> Size {
        self.backend
            .measure_text(text, &self.stack.map_text_paint(paint))
    }
}

#[cfg(test)]
mod tests {
    use grove_core::Color;
    use kurbo::Vec2;

    use super::*;
    use crate::recording::{DrawCommand, RecordingBackend};

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn locked_outer_then_overlay_inner_composes_like_matrices() {
        let t1 = Affine::translate((10.0, 0.0)) * Affine::rotate(core::f64::consts::FRAC_PI_2);
        let t2 = Affine::translate((3.0, 4.0)) * Affine::scale(2.0);
        let mut stack = CompositingStack::new();
        stack.transform(t1);
        stack.lock();
        stack.transform(t2);

        let p = Point::new(1.0, 1.0);
        let manual = t1 * (t2 * p);
        assert!(close(stack.map_point(p), manual), "{:?} != {manual:?}", stack.map_point(p));
        // The other order lands elsewhere.
        assert!(!close(stack.map_point(p), t2 * (t1 * p)), "composition order not observable");
    }

    #[test]
    fn origin_lands_where_t2_then_t1_puts_it() {
        let mut backend = RecordingBackend::new();
        let mut cx = DrawingContext::new(&mut backend);
        cx.transform(Affine::translate((10.0, 0.0)));
        cx.lock();
        cx.transform(Affine::translate((3.0, 4.0)) * Affine::scale(2.0));
        let paint = Paint::stroke(Color::BLACK, 1.0);
        cx.draw_line(Point::ZERO, Point::new(1.0, 0.0), &paint);
        assert_eq!(
            backend.commands(),
            [DrawCommand::Line {
                from: Point::new(13.0, 4.0),
                to: Point::new(15.0, 4.0),
                paint,
            }]
        );
    }

    #[test]
    fn nested_opacity_multiplies() {
        let mut stack = CompositingStack::new();
        stack.set_opacity(0.5);
        stack.lock();
        stack.set_opacity(0.5);
        assert_eq!(stack.merged_opacity(), 0.25);
        let paint = stack.map_paint(&Paint::fill(Color::WHITE));
        // 255 * 0.25 = 63.75
        assert_eq!(paint.fill.map(|c| c.a), Some(64));
    }

    #[test]
    fn overlay_opacity_is_replaced_not_multiplied() {
        let mut stack = CompositingStack::new();
        stack.set_opacity(0.5);
        stack.set_opacity(0.8);
        assert_eq!(stack.merged_opacity(), 0.8);
    }

    #[test]
    #[should_panic(expected = "opacity must be within [0, 1]")]
    fn opacity_above_one_panics() {
        CompositingStack::new().set_opacity(1.01);
    }

    #[test]
    fn half_infinite_clips_keep_their_finite_axis() {
        let strip = Rect::new(f64::NEG_INFINITY, 0.0, f64::INFINITY, 10.0);
        let mut stack = CompositingStack::new();
        stack.clip(strip);
        assert_eq!(stack.merged_clip(), Some(strip));

        let mut stack = CompositingStack::new();
        stack.transform(Affine::translate((5.0, 7.0)) * Affine::scale_non_uniform(-2.0, 2.0));
        let mapped = stack.map_rect(strip);
        assert_eq!(mapped, Rect::new(f64::NEG_INFINITY, 7.0, f64::INFINITY, 27.0));

        let mut stack = CompositingStack::new();
        stack.transform(Affine::rotate(0.3));
        let mapped = stack.map_rect(strip);
        assert!(
            [mapped.x0, mapped.y0, mapped.x1, mapped.y1].iter().all(|v| v.is_infinite()),
            "rotated strip should cover the plane, got {mapped:?}"
        );
    }

    #[test]
    fn clips_intersect_across_lock() {
        let mut stack = CompositingStack::new();
        stack.clip(Rect::new(0.0, 0.0, 100.0, 100.0));
        stack.lock();
        stack.transform(Affine::translate(Vec2::new(50.0, 50.0)));
        stack.clip(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(stack.merged_clip(), Some(Rect::new(50.0, 50.0, 100.0, 100.0)));
        stack.reset_clip();
        assert_eq!(stack.merged_clip(), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
    }

    #[test]
    fn lock_resets_overlay_but_keeps_effects() {
        let mut stack = CompositingStack::new();
        stack.transform(Affine::scale(3.0));
        stack.set_opacity(0.5);
        stack.lock();
        assert_eq!(*stack.overlay(), Compositing::default());
        assert_eq!(stack.map_point(Point::new(1.0, 1.0)), Point::new(3.0, 3.0));
        assert_eq!(stack.merged_opacity(), 0.5);
    }

    #[test]
    fn text_and_circles_scale_with_the_transform() {
        let mut backend = RecordingBackend::new();
        let mut cx = DrawingContext::new(&mut backend);
        cx.transform(Affine::scale(2.0));
        cx.draw_circle(Point::new(1.0, 1.0), 3.0, &Paint::fill(Color::RED));
        cx.draw_text("ab", Point::ZERO, &TextPaint::new(Color::RED, 10.0));
        assert_eq!(cx.measure_text("ab", &TextPaint::new(Color::RED, 10.0)), Size::new(20.0, 20.0));
        let commands = backend.commands();
        assert!(matches!(
            commands[0],
            DrawCommand::Circle { center, radius, .. } if center == Point::new(2.0, 2.0) && radius == 6.0
        ));
        assert!(matches!(
            &commands[1],
            DrawCommand::Text { paint, .. } if paint.font_size == 20.0
        ));
    }

    #[test]
    fn nested_scope_clip_reaches_backend_and_is_restored() {
        let mut backend = RecordingBackend::new();
        let mut cx = DrawingContext::new(&mut backend);
        cx.begin_drawing();
        cx.clip(Rect::new(0.0, 0.0, 50.0, 50.0));
        {
            let mut inner = cx.nested();
            inner.clip(Rect::new(10.0, 10.0, 80.0, 80.0));
        }
        cx.sync_clip();
        cx.end_drawing();
        assert_eq!(
            backend.commands(),
            [
                DrawCommand::Activate,
                DrawCommand::ResetClip,
                DrawCommand::Clip(Rect::new(0.0, 0.0, 50.0, 50.0)),
                DrawCommand::Clip(Rect::new(10.0, 10.0, 50.0, 50.0)),
                DrawCommand::Clip(Rect::new(0.0, 0.0, 50.0, 50.0)),
                DrawCommand::Deactivate,
            ]
        );
    }
}
