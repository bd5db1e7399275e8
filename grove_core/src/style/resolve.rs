// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cascade resolution.

use std::rc::Rc;

use kurbo::{Insets, Size, Vec2};

use super::rule::StyleRule;
use super::support::MergedSupport;
use super::value::{Overflow, StyleKey, StyleProperties, StyleValue, Visibility, keys};
use crate::paint::Color;

/// The effective style of one node.
///
/// Universal properties are unpacked into typed fields; every resolved
/// value, universal or widget-declared, is also available through
/// [`get`](Self::get).
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedStyle {
    /// Inner spacing between border and content.
    pub padding: Insets,
    /// Border stroke widths.
    pub border_width: Insets,
    /// Border stroke color.
    pub border_color: Color,
    /// Background fill.
    pub background: Color,
    /// Node opacity in `[0, 1]`.
    pub opacity: f64,
    /// Whether anything is drawn.
    pub visibility: Visibility,
    /// Horizontal overflow policy.
    pub overflow_x: Overflow,
    /// Vertical overflow policy.
    pub overflow_y: Overflow,
    values: StyleProperties,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Self {
            padding: Insets::ZERO,
            border_width: Insets::ZERO,
            border_color: Color::BLACK,
            background: Color::TRANSPARENT,
            opacity: 1.0,
            visibility: Visibility::Visible,
            overflow_x: Overflow::Show,
            overflow_y: Overflow::Show,
            values: StyleProperties::new(),
        }
    }
}

impl ResolvedStyle {
    /// The resolved value of `key`, if any source set it.
    #[must_use]
    pub fn get(&self, key: &StyleKey) -> Option<&StyleValue> {
        self.values.get(key)
    }

    /// All resolved values.
    #[must_use]
    pub fn values(&self) -> &StyleProperties {
        &self.values
    }

    /// Total extent taken by padding and border.
    #[must_use]
    pub fn chrome_size(&self) -> Size {
        let (p, b) = (self.padding, self.border_width);
        Size::new(p.x0 + p.x1 + b.x0 + b.x1, p.y0 + p.y1 + b.y0 + b.y1)
    }

    /// Offset of the content box from the node's origin.
    #[must_use]
    pub fn content_offset(&self) -> Vec2 {
        Vec2::new(
            self.padding.x0 + self.border_width.x0,
            self.padding.y0 + self.border_width.y0,
        )
    }

    /// Returns whether the fields that feed box config and layout differ.
    #[must_use]
    pub fn layout_differs(&self, other: &Self) -> bool {
        self.padding != other.padding
            || self.border_width != other.border_width
            || self.overflow_x != other.overflow_x
            || self.overflow_y != other.overflow_y
    }

    /// Returns whether values outside the universal set differ.
    #[must_use]
    pub fn custom_differs(&self, other: &Self) -> bool {
        let custom = |s: &Self| {
            s.values
                .iter()
                .filter(|(k, _)| !is_universal(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Vec<_>>()
        };
        custom(self) != custom(other)
    }
}

fn is_universal(key: &StyleKey) -> bool {
    [
        keys::PADDING,
        keys::BORDER_WIDTH,
        keys::BORDER_COLOR,
        keys::BACKGROUND,
        keys::OPACITY,
        keys::VISIBILITY,
        keys::OVERFLOW_X,
        keys::OVERFLOW_Y,
    ]
    .contains(key)
}

/// Computes effective values from direct properties and matched rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct StyleResolver;

impl StyleResolver {
    /// Resolves every key in `support`.
    ///
    /// For each key the direct property wins; otherwise the first rule in
    /// `rules` (declaration order) that sets an acceptable value; otherwise
    /// the key keeps its default. Values of the wrong kind or rejected by
    /// the key's validator are skipped.
    #[must_use]
    pub fn resolve(
        direct: &StyleProperties,
        rules: &[Rc<StyleRule>],
        support: &MergedSupport,
    ) -> ResolvedStyle {
        let mut values = StyleProperties::new();
        for key in support.keys() {
            let Some((property, _)) = support.get(key) else {
                continue;
            };
            let candidates = direct
                .get(key)
                .into_iter()
                .chain(rules.iter().filter_map(|r| r.properties.get(key)));
            let mut chosen = None;
            for value in candidates {
                if property.accepts(value) {
                    chosen = Some(value.clone());
                    break;
                }
                tracing::warn!(%key, ?value, "ignoring style value of unsupported kind or range");
            }
            if let Some(value) = chosen {
                values.insert(key.clone(), value);
            }
        }
        for (key, _) in direct.iter() {
            if !support.contains(key) {
                tracing::debug!(%key, "ignoring unsupported direct style property");
            }
        }

        let mut out = ResolvedStyle::default();
        if let Some(v) = values.get(&keys::PADDING).and_then(StyleValue::as_insets) {
            out.padding = v;
        }
        if let Some(v) = values.get(&keys::BORDER_WIDTH).and_then(StyleValue::as_insets) {
            out.border_width = v;
        }
        if let Some(v) = values.get(&keys::BORDER_COLOR).and_then(StyleValue::as_color) {
            out.border_color = v;
        }
        if let Some(v) = values.get(&keys::BACKGROUND).and_then(StyleValue::as_color) {
            out.background = v;
        }
        if let Some(v) = values.get(&keys::OPACITY).and_then(StyleValue::as_number) {
            out.opacity = v;
        }
        if let Some(StyleValue::Visibility(v)) = values.get(&keys::VISIBILITY) {
            out.visibility = *v;
        }
        if let Some(StyleValue::Overflow(v)) = values.get(&keys::OVERFLOW_X) {
            out.overflow_x = *v;
        }
        if let Some(StyleValue::Overflow(v)) = values.get(&keys::OVERFLOW_Y) {
            out.overflow_y = *v;
        }
        out.values = values;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Selector, SupportSet, SupportSource, ValueKind};

    fn universal() -> MergedSupport {
        SupportSet::merge([(SupportSource::Global, &SupportSet::universal())]).unwrap()
    }

    fn rule(props: StyleProperties) -> Rc<StyleRule> {
        Rc::new(StyleRule::new(Selector::any(), props))
    }

    #[test]
    fn direct_property_beats_matched_rule() {
        let direct = StyleProperties::new().with(keys::OPACITY, StyleValue::Number(0.3));
        let rules = [rule(
            StyleProperties::new().with(keys::OPACITY, StyleValue::Number(0.9)),
        )];
        let resolved = StyleResolver::resolve(&direct, &rules, &universal());
        assert_eq!(resolved.opacity, 0.3);
    }

    #[test]
    fn first_matching_rule_wins() {
        let rules = [
            rule(StyleProperties::new().with(keys::BACKGROUND, StyleValue::Color(Color::RED))),
            rule(StyleProperties::new().with(keys::BACKGROUND, StyleValue::Color(Color::WHITE))),
        ];
        let resolved = StyleResolver::resolve(&StyleProperties::new(), &rules, &universal());
        assert_eq!(resolved.background, Color::RED);
    }

    #[test]
    fn missing_and_invalid_values_fall_back() {
        let direct = StyleProperties::new()
            .with(keys::OPACITY, StyleValue::Number(4.0))
            .with(keys::PADDING, StyleValue::Color(Color::RED));
        let rules = [rule(
            StyleProperties::new().with(keys::OPACITY, StyleValue::Number(0.5)),
        )];
        let resolved = StyleResolver::resolve(&direct, &rules, &universal());
        assert_eq!(resolved.opacity, 0.5);
        assert_eq!(resolved.padding, Insets::ZERO);
        assert_eq!(resolved.visibility, Visibility::Visible);
    }

    #[test]
    fn unsupported_keys_are_not_resolved() {
        let size = StyleKey::from_static("font-size");
        let direct = StyleProperties::new().with(size.clone(), StyleValue::Number(12.0));
        let plain = StyleResolver::resolve(&direct, &[], &universal());
        assert!(plain.get(&size).is_none());

        let own = SupportSet::new().with(size.clone(), ValueKind::Number);
        let support = SupportSet::merge([
            (SupportSource::Global, &SupportSet::universal()),
            (SupportSource::Own("Label"), &own),
        ])
        .unwrap();
        let resolved = StyleResolver::resolve(&direct, &[], &support);
        assert_eq!(resolved.get(&size), Some(&StyleValue::Number(12.0)));
        assert!(resolved.custom_differs(&plain));
        assert!(!resolved.layout_differs(&plain));
    }

    #[test]
    fn chrome_combines_padding_and_border() {
        let direct = StyleProperties::new()
            .with(keys::PADDING, StyleValue::Insets(Insets::uniform(2.0)))
            .with(keys::BORDER_WIDTH, StyleValue::Insets(Insets::new(1.0, 0.0, 3.0, 0.0)));
        let resolved = StyleResolver::resolve(&direct, &[], &universal());
        assert_eq!(resolved.chrome_size(), Size::new(8.0, 4.0));
        assert_eq!(resolved.content_offset(), Vec2::new(3.0, 2.0));
    }
}
