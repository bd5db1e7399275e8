// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Box constraints and intrinsic box configuration.
//!
//! Layout is a two-sided negotiation. Bottom-up, every node reports a
//! [`BoxConfig`]: the minimum, preferred and maximum extents it can live
//! with, independent of any particular parent. Top-down, every parent hands
//! each child a [`BoxConstraints`] window, and the child resolves a size
//! inside it.

use core::ops::Add;

use kurbo::Size;

/// A layout axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The x axis.
    Horizontal,
    /// The y axis.
    Vertical,
}

/// The window of sizes a parent allows a child to take during layout.
///
/// Invariant: `min <= max` componentwise. The maximum may be infinite on
/// either axis; the minimum must be finite whenever the constraints are
/// used for layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxConstraints {
    min: Size,
    max: Size,
}

impl BoxConstraints {
    /// Constraints that accept any finite size.
    pub const UNBOUNDED: Self = Self {
        min: Size::ZERO,
        max: Size::new(f64::INFINITY, f64::INFINITY),
    };

    /// Creates constraints from a minimum and a maximum size.
    ///
    /// # Panics
    ///
    /// Panics if `min` exceeds `max` on either axis, or if any component
    /// is NaN.
    #[must_use]
    pub fn new(min: Size, max: Size) -> Self {
        assert!(
            min.width <= max.width && min.height <= max.height,
            "box constraints require min <= max, got min {min:?} max {max:?}"
        );
        Self { min, max }
    }

    /// Constraints that only allow exactly `size`.
    #[must_use]
    pub fn tight(size: Size) -> Self {
        Self::new(size, size)
    }

    /// Constraints from zero up to `max`.
    #[must_use]
    pub fn loose(max: Size) -> Self {
        Self::new(Size::ZERO, max)
    }

    /// The minimum size.
    #[must_use]
    pub const fn min(&self) -> Size {
        self.min
    }

    /// The maximum size.
    #[must_use]
    pub const fn max(&self) -> Size {
        self.max
    }

    /// Returns whether the minimum is infinite on either axis.
    ///
    /// Such constraints cannot be satisfied and are rejected by layout.
    #[must_use]
    pub fn has_infinite_min(&self) -> bool {
        self.min.width.is_infinite() || self.min.height.is_infinite()
    }

    /// Returns whether min equals max on both axes.
    #[must_use]
    pub fn is_tight(&self) -> bool {
        self.min == self.max
    }

    /// Clamps `size` into the window componentwise.
    #[must_use]
    pub fn constrain(&self, size: Size) -> Size {
        Size::new(
            size.width.clamp(self.min.width, self.max.width),
            size.height.clamp(self.min.height, self.max.height),
        )
    }

    /// Shrinks both bounds by `amount`, saturating at zero.
    ///
    /// Used to carve padding and border out of the constraints a node
    /// receives before handing them to its content.
    #[must_use]
    pub fn shrink(&self, amount: Size) -> Self {
        let sub = |v: f64, d: f64| (v - d).max(0.0);
        Self {
            min: Size::new(sub(self.min.width, amount.width), sub(self.min.height, amount.height)),
            max: Size::new(sub(self.max.width, amount.width), sub(self.max.height, amount.height)),
        }
    }

    /// Relaxes one axis to `[0, ∞)`.
    #[must_use]
    pub fn unbounded_on(&self, axis: Axis) -> Self {
        let mut out = *self;
        match axis {
            Axis::Horizontal => {
                out.min.width = 0.0;
                out.max.width = f64::INFINITY;
            }
            Axis::Vertical => {
                out.min.height = 0.0;
                out.max.height = f64::INFINITY;
            }
        }
        out
    }
}

/// The intrinsic sizing contract of a node.
///
/// Invariant: `min <= preferred <= max` componentwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxConfig {
    /// Smallest acceptable size.
    pub min_size: Size,
    /// Size the node would take if unconstrained.
    pub preferred_size: Size,
    /// Largest useful size; may be infinite.
    pub max_size: Size,
}

impl Default for BoxConfig {
    fn default() -> Self {
        Self {
            min_size: Size::ZERO,
            preferred_size: Size::ZERO,
            max_size: Size::new(f64::INFINITY, f64::INFINITY),
        }
    }
}

impl BoxConfig {
    /// Creates a box config.
    ///
    /// # Panics
    ///
    /// Panics unless `min <= preferred <= max` on both axes.
    #[must_use]
    pub fn new(min_size: Size, preferred_size: Size, max_size: Size) -> Self {
        assert!(
            min_size.width <= preferred_size.width
                && preferred_size.width <= max_size.width
                && min_size.height <= preferred_size.height
                && preferred_size.height <= max_size.height,
            "box config requires min <= preferred <= max, got {min_size:?} / {preferred_size:?} / {max_size:?}"
        );
        Self {
            min_size,
            preferred_size,
            max_size,
        }
    }

    /// A config that only accepts `size`.
    #[must_use]
    pub fn fixed(size: Size) -> Self {
        Self::new(size, size, size)
    }

    /// A config that prefers `size` but accepts anything from zero to
    /// infinity.
    #[must_use]
    pub fn flexible(preferred: Size) -> Self {
        Self::new(Size::ZERO, preferred, Size::new(f64::INFINITY, f64::INFINITY))
    }
}

impl Add<Size> for BoxConfig {
    type Output = Self;

    fn add(self, rhs: Size) -> Self {
        Self {
            min_size: self.min_size + rhs,
            preferred_size: self.preferred_size + rhs,
            max_size: self.max_size + rhs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constrain_clamps_both_axes() {
        let c = BoxConstraints::new(Size::new(10.0, 10.0), Size::new(50.0, 20.0));
        assert_eq!(c.constrain(Size::new(5.0, 100.0)), Size::new(10.0, 20.0));
        assert_eq!(c.constrain(Size::new(30.0, 15.0)), Size::new(30.0, 15.0));
    }

    #[test]
    fn shrink_saturates_and_keeps_infinity() {
        let c = BoxConstraints::new(Size::new(4.0, 0.0), Size::new(f64::INFINITY, 10.0));
        let s = c.shrink(Size::new(6.0, 4.0));
        assert_eq!(s.min(), Size::new(0.0, 0.0));
        assert_eq!(s.max(), Size::new(f64::INFINITY, 6.0));
    }

    #[test]
    fn unbounded_axis_is_relaxed() {
        let c = BoxConstraints::tight(Size::new(40.0, 40.0)).unbounded_on(Axis::Vertical);
        assert_eq!(c.min(), Size::new(40.0, 0.0));
        assert_eq!(c.max(), Size::new(40.0, f64::INFINITY));
    }

    #[test]
    #[should_panic(expected = "min <= max")]
    fn inverted_constraints_panic() {
        let _ = BoxConstraints::new(Size::new(10.0, 0.0), Size::new(5.0, 5.0));
    }

    #[test]
    fn box_config_adds_chrome_to_every_extent() {
        let cfg = BoxConfig::fixed(Size::new(10.0, 10.0)) + Size::new(4.0, 2.0);
        assert_eq!(cfg, BoxConfig::fixed(Size::new(14.0, 12.0)));
        let flex = BoxConfig::flexible(Size::new(1.0, 1.0)) + Size::new(1.0, 1.0);
        assert!(flex.max_size.width.is_infinite());
        assert_eq!(flex.min_size, Size::new(1.0, 1.0));
    }
}
