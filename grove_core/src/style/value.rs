// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style keys, values and property maps.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use kurbo::Insets;

use crate::paint::Color;

/// The name of a style property.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyleKey(Cow<'static, str>);

impl StyleKey {
    /// Creates a key from a static name.
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// The property name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for StyleKey {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for StyleKey {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl fmt::Debug for StyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StyleKey({})", self.0)
    }
}

impl fmt::Display for StyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keys every node supports.
pub mod keys {
    use super::StyleKey;

    /// Inner spacing between border and content ([`Insets`](kurbo::Insets)).
    pub const PADDING: StyleKey = StyleKey::from_static("padding");
    /// Border stroke widths per edge ([`Insets`](kurbo::Insets)).
    pub const BORDER_WIDTH: StyleKey = StyleKey::from_static("border-width");
    /// Border stroke color.
    pub const BORDER_COLOR: StyleKey = StyleKey::from_static("border-color");
    /// Background fill color.
    pub const BACKGROUND: StyleKey = StyleKey::from_static("background");
    /// Node opacity in `[0, 1]`.
    pub const OPACITY: StyleKey = StyleKey::from_static("opacity");
    /// [`Visibility`](super::Visibility).
    pub const VISIBILITY: StyleKey = StyleKey::from_static("visibility");
    /// Horizontal [`Overflow`](super::Overflow).
    pub const OVERFLOW_X: StyleKey = StyleKey::from_static("overflow-x");
    /// Vertical [`Overflow`](super::Overflow).
    pub const OVERFLOW_Y: StyleKey = StyleKey::from_static("overflow-y");
    /// Text color, for widgets that draw text.
    pub const FOREGROUND: StyleKey = StyleKey::from_static("foreground");
    /// Font size, for widgets that draw text.
    pub const FONT_SIZE: StyleKey = StyleKey::from_static("font-size");
}

/// Whether a node draws anything.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Drawn normally.
    #[default]
    Visible,
    /// Nothing is drawn, but layout is unaffected.
    Hidden,
}

/// What happens to content that exceeds a node's box on one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Overflow {
    /// Content is drawn outside the box.
    #[default]
    Show,
    /// Content is clipped to the box.
    Cut,
    /// Content is clipped and can be scrolled.
    Scroll,
}

/// The type of a [`StyleValue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`StyleValue::Number`].
    Number,
    /// [`StyleValue::Insets`].
    Insets,
    /// [`StyleValue::Color`].
    Color,
    /// [`StyleValue::Visibility`].
    Visibility,
    /// [`StyleValue::Overflow`].
    Overflow,
    /// [`StyleValue::Text`].
    Text,
}

/// A concrete property value.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleValue {
    /// A scalar.
    Number(f64),
    /// Per-edge lengths.
    Insets(Insets),
    /// A color.
    Color(Color),
    /// A visibility.
    Visibility(Visibility),
    /// An overflow policy.
    Overflow(Overflow),
    /// Free text.
    Text(String),
}

impl StyleValue {
    /// The kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Number(_) => ValueKind::Number,
            Self::Insets(_) => ValueKind::Insets,
            Self::Color(_) => ValueKind::Color,
            Self::Visibility(_) => ValueKind::Visibility,
            Self::Overflow(_) => ValueKind::Overflow,
            Self::Text(_) => ValueKind::Text,
        }
    }

    /// Returns the number, if this is one.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the insets, if these are some.
    #[must_use]
    pub const fn as_insets(&self) -> Option<Insets> {
        match self {
            Self::Insets(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the color, if this is one.
    #[must_use]
    pub const fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }
}

/// An ordered map from key to value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleProperties(BTreeMap<StyleKey, StyleValue>);

impl StyleProperties {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<StyleKey>, value: StyleValue) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<StyleKey>, value: StyleValue) -> Option<StyleValue> {
        self.0.insert(key.into(), value)
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &StyleKey) -> Option<StyleValue> {
        self.0.remove(key)
    }

    /// Returns the value of `key`.
    #[must_use]
    pub fn get(&self, key: &StyleKey) -> Option<&StyleValue> {
        self.0.get(key)
    }

    /// Iterates in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&StyleKey, &StyleValue)> {
        self.0.iter()
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
