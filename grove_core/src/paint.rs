// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Colors and paint descriptions carried by render objects.

/// An 8-bit-per-channel RGBA color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha; 255 is opaque.
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::rgb(255, 0, 0);

    /// Creates an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Creates a color with explicit alpha.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Alpha as a fraction in `[0, 1]`.
    #[must_use]
    pub fn alpha_fraction(self) -> f64 {
        f64::from(self.a) / 255.0
    }

    /// Returns the color with its alpha scaled by `factor`.
    ///
    /// `factor` is clamped to `[0, 1]`; the result is rounded to the
    /// nearest 8-bit value.
    #[must_use]
    pub fn multiply_alpha(self, factor: f64) -> Self {
        let a = (self.alpha_fraction() * factor.clamp(0.0, 1.0) * 255.0).round();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "clamped to [0, 255] above"
        )]
        let a = a.clamp(0.0, 255.0) as u8;
        Self { a, ..self }
    }

    /// Returns whether the color is fully transparent.
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }
}

/// How a shape is filled and stroked.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Paint {
    /// Fill color, if filled.
    pub fill: Option<Color>,
    /// Stroke color, if stroked.
    pub stroke: Option<Color>,
    /// Stroke width in logical pixels.
    pub stroke_width: f64,
}

impl Paint {
    /// A solid fill with no stroke.
    #[must_use]
    pub const fn fill(color: Color) -> Self {
        Self {
            fill: Some(color),
            stroke: None,
            stroke_width: 0.0,
        }
    }

    /// A stroke with no fill.
    #[must_use]
    pub const fn stroke(color: Color, width: f64) -> Self {
        Self {
            fill: None,
            stroke: Some(color),
            stroke_width: width,
        }
    }

    /// Returns the paint with both colors' alpha scaled by `factor`.
    #[must_use]
    pub fn multiply_alpha(self, factor: f64) -> Self {
        Self {
            fill: self.fill.map(|c| c.multiply_alpha(factor)),
            stroke: self.stroke.map(|c| c.multiply_alpha(factor)),
            ..self
        }
    }
}

/// How text is drawn and measured.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextPaint {
    /// Glyph color.
    pub color: Color,
    /// Font size in logical pixels.
    pub font_size: f64,
}

impl TextPaint {
    /// Creates a text paint.
    #[must_use]
    pub const fn new(color: Color, font_size: f64) -> Self {
        Self { color, font_size }
    }
}
