// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A backend that records draw calls instead of rasterizing them.

use grove_core::{ApproximateTextMeasure, Paint, TextMeasure, TextPaint};
use kurbo::{Point, Rect, Size};

use crate::backend::DrawingBackend;

/// One recorded backend call, with final device coordinates and colors.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// [`DrawingBackend::activate`].
    Activate,
    /// [`DrawingBackend::deactivate`].
    Deactivate,
    /// [`DrawingBackend::clip`].
    Clip(Rect),
    /// [`DrawingBackend::reset_clip`].
    ResetClip,
    /// [`DrawingBackend::draw_line`].
    Line {
        /// Start.
        from: Point,
        /// End.
        to: Point,
        /// Stroke.
        paint: Paint,
    },
    /// [`DrawingBackend::draw_rect`].
    Rect {
        /// Geometry.
        rect: Rect,
        /// Fill and stroke.
        paint: Paint,
    },
    /// [`DrawingBackend::draw_circle`].
    Circle {
        /// Center.
        center: Point,
        /// Radius.
        radius: f64,
        /// Fill and stroke.
        paint: Paint,
    },
    /// [`DrawingBackend::draw_text`].
    Text {
        /// Content.
        text: String,
        /// Top-left corner.
        origin: Point,
        /// Color and size.
        paint: TextPaint,
    },
}

impl DrawCommand {
    /// Returns `true` for the draw-primitive variants.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::Line { .. } | Self::Rect { .. } | Self::Circle { .. } | Self::Text { .. }
        )
    }
}

/// Records every call in order.
///
/// Text is measured with [`ApproximateTextMeasure`], so a tree configured
/// with the same measure lays text out consistently with what gets
/// recorded here.
#[derive(Clone, Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<DrawCommand>,
    active: bool,
}

impl RecordingBackend {
    /// An empty recording.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The calls recorded so far.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Removes and returns the recorded calls.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        core::mem::take(&mut self.commands)
    }

    /// Whether [`activate`](DrawingBackend::activate) was called without a
    /// matching [`deactivate`](DrawingBackend::deactivate).
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The recorded primitives, skipping activation and clip calls.
    pub fn primitives(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(|c| c.is_primitive())
    }
}

impl DrawingBackend for RecordingBackend {
    fn activate(&mut self) {
        self.active = true;
        self.commands.push(DrawCommand::Activate);
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.commands.push(DrawCommand::Deactivate);
    }

    fn clip(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Clip(rect));
    }

    fn reset_clip(&mut self) {
        self.commands.push(DrawCommand::ResetClip);
    }

    fn draw_line(&mut self, from: Point, to: Point, paint: &Paint) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            paint: *paint,
        });
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        self.commands.push(DrawCommand::Rect {
            rect,
            paint: *paint,
        });
    }

    fn draw_circle(&mut self, center: Point, radius: f64, paint: &Paint) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            paint: *paint,
        });
    }

    fn draw_text(&mut self, text: &str, origin: Point, paint: &TextPaint) {
        self.commands.push(DrawCommand::Text {
            text: text.to_owned(),
            origin,
            paint: *paint,
        });
    }

    fn measure_text(&self, text: &str, paint: &TextPaint) -> Size {
        ApproximateTextMeasure.measure_text(text, paint)
    }
}

impl TextMeasure for RecordingBackend {
    fn measure_text(&self, text: &str, paint: &TextPaint) -> Size {
        ApproximateTextMeasure.measure_text(text, paint)
    }
}
