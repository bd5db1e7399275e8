// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property-support schemas and their merging.
//!
//! A node's effective schema is assembled from three sources: the universal
//! properties every node has, the properties its parent declares for its
//! children, and the properties its own widget declares. Two sources
//! claiming the same key is an error.

use std::collections::HashMap;
use std::fmt;

use super::value::{StyleKey, StyleValue, ValueKind, keys};

/// Which definition set a supported property came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SupportSource {
    /// The universal properties of every node.
    Global,
    /// Declared by the parent widget (named) for its children.
    Parent(&'static str),
    /// Declared by the widget (named) itself.
    Own(&'static str),
}

impl fmt::Display for SupportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global properties"),
            Self::Parent(name) => write!(f, "child properties of {name}"),
            Self::Own(name) => write!(f, "properties of {name}"),
        }
    }
}

/// Failure to assemble a style schema.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StyleError {
    /// Two definition sets claim the same key.
    #[error("style property `{key}` is declared by both {} and {}", .sources[0], .sources[1])]
    DuplicateKey {
        /// The contested key.
        key: StyleKey,
        /// The earlier and the later claimant.
        sources: [SupportSource; 2],
    },
}

/// One supported property.
#[derive(Clone, Copy, Debug)]
pub struct PropertySupport {
    /// The value kind accepted.
    pub kind: ValueKind,
    /// Extra check on accepted values.
    pub validator: Option<fn(&StyleValue) -> bool>,
}

impl PropertySupport {
    /// Returns whether `value` is acceptable.
    #[must_use]
    pub fn accepts(&self, value: &StyleValue) -> bool {
        value.kind() == self.kind && self.validator.is_none_or(|check| check(value))
    }
}

/// A set of supported properties, as one source declares it.
#[derive(Clone, Debug, Default)]
pub struct SupportSet {
    entries: Vec<(StyleKey, PropertySupport)>,
}

impl SupportSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property accepting any value of `kind`.
    #[must_use]
    pub fn with(self, key: StyleKey, kind: ValueKind) -> Self {
        self.with_validator(key, kind, None)
    }

    /// Adds a property with an additional validator.
    #[must_use]
    pub fn with_validator(
        mut self,
        key: StyleKey,
        kind: ValueKind,
        validator: Option<fn(&StyleValue) -> bool>,
    ) -> Self {
        self.entries.push((key, PropertySupport { kind, validator }));
        self
    }

    /// The properties every node supports.
    #[must_use]
    pub fn universal() -> Self {
        fn unit_interval(value: &StyleValue) -> bool {
            value.as_number().is_some_and(|n| (0.0..=1.0).contains(&n))
        }
        fn non_negative(value: &StyleValue) -> bool {
            value
                .as_insets()
                .is_some_and(|i| i.x0 >= 0.0 && i.y0 >= 0.0 && i.x1 >= 0.0 && i.y1 >= 0.0)
        }
        Self::new()
            .with_validator(keys::PADDING, ValueKind::Insets, Some(non_negative))
            .with_validator(keys::BORDER_WIDTH, ValueKind::Insets, Some(non_negative))
            .with(keys::BORDER_COLOR, ValueKind::Color)
            .with(keys::BACKGROUND, ValueKind::Color)
            .with_validator(keys::OPACITY, ValueKind::Number, Some(unit_interval))
            .with(keys::VISIBILITY, ValueKind::Visibility)
            .with(keys::OVERFLOW_X, ValueKind::Overflow)
            .with(keys::OVERFLOW_Y, ValueKind::Overflow)
    }

    /// Number of declared properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merges definition sets into one schema.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::DuplicateKey`] if a key is declared by more than
    /// one source, or twice by the same one.
    pub fn merge<'a>(
        sets: impl IntoIterator<Item = (SupportSource, &'a Self)>,
    ) -> Result<MergedSupport, StyleError> {
        let mut merged = MergedSupport::default();
        for (source, set) in sets {
            for (key, support) in &set.entries {
                if let Some((_, earlier)) = merged.entries.get(key) {
                    return Err(StyleError::DuplicateKey {
                        key: key.clone(),
                        sources: [*earlier, source],
                    });
                }
                merged.order.push(key.clone());
                merged.entries.insert(key.clone(), (*support, source));
            }
        }
        Ok(merged)
    }
}

/// The effective schema of one node.
#[derive(Clone, Debug, Default)]
pub struct MergedSupport {
    order: Vec<StyleKey>,
    entries: HashMap<StyleKey, (PropertySupport, SupportSource)>,
}

impl MergedSupport {
    /// Returns the support for `key` and where it was declared.
    #[must_use]
    pub fn get(&self, key: &StyleKey) -> Option<(&PropertySupport, SupportSource)> {
        self.entries.get(key).map(|(support, source)| (support, *source))
    }

    /// Iterates keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &StyleKey> {
        self.order.iter()
    }

    /// Returns whether `key` is supported.
    #[must_use]
    pub fn contains(&self, key: &StyleKey) -> bool {
        self.entries.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_rejects_duplicate_across_sources() {
        let global = SupportSet::universal();
        let own = SupportSet::new().with(keys::BACKGROUND, ValueKind::Color);
        let err = SupportSet::merge([
            (SupportSource::Global, &global),
            (SupportSource::Own("Label"), &own),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            StyleError::DuplicateKey {
                key: keys::BACKGROUND,
                sources: [SupportSource::Global, SupportSource::Own("Label")],
            }
        );
        assert!(err.to_string().contains("`background`"));
    }

    #[test]
    fn merge_keeps_declaration_order_and_sources() {
        let global = SupportSet::universal();
        let parent = SupportSet::new().with(StyleKey::from_static("flex"), ValueKind::Number);
        let merged = SupportSet::merge([
            (SupportSource::Global, &global),
            (SupportSource::Parent("Column"), &parent),
        ])
        .unwrap();
        assert_eq!(merged.keys().next(), Some(&keys::PADDING));
        let (_, source) = merged.get(&StyleKey::from_static("flex")).unwrap();
        assert_eq!(source, SupportSource::Parent("Column"));
    }

    #[test]
    fn validators_reject_out_of_range() {
        let merged = SupportSet::merge([(SupportSource::Global, &SupportSet::universal())]).unwrap();
        let (opacity, _) = merged.get(&keys::OPACITY).unwrap();
        assert!(opacity.accepts(&StyleValue::Number(0.4)));
        assert!(!opacity.accepts(&StyleValue::Number(1.5)));
        assert!(!opacity.accepts(&StyleValue::Text("x".into())));
    }
}
