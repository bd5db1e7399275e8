// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node style schemas, rule matching and re-resolution.

use core::mem;

use super::WidgetTree;
use super::id::NodeId;
use crate::error::TreeError;
use crate::lifecycle::{Invalidation, LifecycleStage};
use crate::style::{
    MergedSupport, RuleId, ScopeId, SelectorTarget, StyleKey, StyleResolver, StyleRule,
    StyleValue, SupportSet, SupportSource, same_rules,
};

impl WidgetTree {
    // -- Rules --

    /// Adds a rule visible to every node.
    ///
    /// Every mounted node is re-matched; only nodes whose matched rules
    /// changed are re-resolved.
    pub fn add_style_rule(&mut self, rule: StyleRule) -> RuleId {
        let id = self.styles.add_rule(ScopeId::ROOT, None, rule);
        self.restyle_all();
        id
    }

    /// Removes a rule added with [`add_style_rule`](Self::add_style_rule).
    /// Returns whether it was registered.
    pub fn remove_style_rule(&mut self, rule: RuleId) -> bool {
        let removed = self.styles.remove_rule(rule);
        if removed {
            self.restyle_all();
        }
        removed
    }

    // -- Node attributes --

    /// Sets a direct style property of a node.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles.
    pub fn set_style(&mut self, id: NodeId, key: StyleKey, value: StyleValue) -> Result<(), TreeError> {
        let node = self.node_mut(id)?;
        if node.style.direct.get(&key) == Some(&value) {
            return Ok(());
        }
        node.style.direct.insert(key, value);
        self.refresh_style(id, true);
        Ok(())
    }

    /// Removes a direct style property of a node.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles.
    pub fn remove_style(&mut self, id: NodeId, key: &StyleKey) -> Result<Option<StyleValue>, TreeError> {
        let old = self.node_mut(id)?.style.direct.remove(key);
        if old.is_some() {
            self.refresh_style(id, true);
        }
        Ok(old)
    }

    /// Adds a class to a node.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles.
    pub fn add_class(&mut self, id: NodeId, class: impl Into<String>) -> Result<(), TreeError> {
        let class = class.into();
        let classes = &mut self.node_mut(id)?.style.classes;
        if !classes.contains(&class) {
            classes.push(class);
            self.refresh_style(id, false);
        }
        Ok(())
    }

    /// Removes a class from a node.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles.
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> Result<(), TreeError> {
        let classes = &mut self.node_mut(id)?.style.classes;
        let before = classes.len();
        classes.retain(|c| c != class);
        if classes.len() != before {
            self.refresh_style(id, false);
        }
        Ok(())
    }

    /// Turns a pseudo class (`hover`, `focus`, ...) on or off.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles.
    pub fn set_pseudo_class(&mut self, id: NodeId, pseudo: &str, active: bool) -> Result<(), TreeError> {
        let list = &mut self.node_mut(id)?.style.pseudo_classes;
        let present = list.iter().any(|p| p == pseudo);
        match (present, active) {
            (false, true) => list.push(pseudo.to_owned()),
            (true, false) => list.retain(|p| p != pseudo),
            _ => return Ok(()),
        }
        self.refresh_style(id, false);
        Ok(())
    }

    // -- Engine --

    /// Assembles the node's schema from the universal set, the parent's
    /// child properties and the widget's own properties.
    fn support_of(&self, id: NodeId) -> Result<MergedSupport, TreeError> {
        let node = self.node(id)?;
        let own = node
            .widget
            .as_ref()
            .map(|w| w.supported_style_properties())
            .unwrap_or_default();
        let parent = node.parent.and_then(|p| self.node(p).ok()).map(|p| {
            let set = p
                .widget
                .as_ref()
                .map(|w| w.child_style_properties())
                .unwrap_or_default();
            (p.name, set)
        });
        let global = SupportSet::universal();

        let mut sets = vec![(SupportSource::Global, &global)];
        if let Some((name, set)) = &parent {
            sets.push((SupportSource::Parent(*name), set));
        }
        sets.push((SupportSource::Own(node.name), &own));
        Ok(SupportSet::merge(sets)?)
    }

    /// Sets up style state at mount: schema, scoped rules, first resolution.
    pub(crate) fn init_style(&mut self, id: NodeId) -> Result<(), TreeError> {
        let support = self.support_of(id)?;
        let node = self.node_mut(id)?;
        node.style.support = support;
        let rules = mem::take(&mut node.style.provided_rules);
        if let Some(scope) = node.style.created_scope {
            for rule in rules {
                self.styles.add_rule(scope, Some(id), rule);
            }
        }
        self.refresh_style(id, true);
        Ok(())
    }

    /// Removes the rules and scope a node owns.
    pub(crate) fn drop_style(&mut self, id: NodeId, created_scope: Option<ScopeId>) {
        self.styles.remove_owned(id);
        if let Some(scope) = created_scope {
            self.styles.remove_scope(scope);
        }
    }

    /// Re-matches the node's rules and re-resolves its style if the matched
    /// set changed by identity, or unconditionally with `force`.
    ///
    /// Raises box config and layout when layout-relevant values changed and
    /// render state when anything changed. Returns whether anything changed.
    pub(crate) fn refresh_style(&mut self, id: NodeId, force: bool) -> bool {
        let Ok(node) = self.node(id) else {
            return false;
        };
        if node.stage == LifecycleStage::Destroyed {
            return false;
        }
        let target = SelectorTarget {
            widget: node.name,
            classes: &node.style.classes,
            pseudo_classes: &node.style.pseudo_classes,
        };
        let matched = self.styles.matching(node.style.scope, &target);
        if !force && same_rules(&matched, &node.style.matched) {
            tracing::trace!(node = ?id, "matched rules unchanged");
            return false;
        }
        let resolved = StyleResolver::resolve(&node.style.direct, &matched, &node.style.support);

        let Ok(node) = self.node_mut(id) else {
            return false;
        };
        node.style.matched = matched;
        let old = mem::replace(&mut node.style.resolved, resolved);
        let new = &node.style.resolved;
        let relayout = old.layout_differs(new) || old.custom_differs(new);
        let changed = old != *new;
        if !changed {
            return false;
        }
        tracing::debug!(node = ?id, relayout, "style re-resolved");
        if relayout {
            self.mark(id, Invalidation::BoxConfig);
            self.mark(id, Invalidation::Layout);
        }
        self.mark(id, Invalidation::RenderState);
        true
    }

    fn restyle_all(&mut self) {
        let ids: Vec<NodeId> = (0..self.slots.len())
            .filter_map(|idx| self.id_at(u32::try_from(idx).ok()?))
            .filter(|&id| self.stage(id) == LifecycleStage::Mounted)
            .collect();
        for id in ids {
            self.refresh_style(id, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Insets, Size};

    use crate::error::TreeError;
    use crate::lifecycle::Invalidation;
    use crate::paint::Color;
    use crate::style::{
        Selector, StyleError, StyleKey, StyleProperties, StyleRule, StyleValue, SupportSet,
        SupportSource, ValueKind, keys,
    };
    use crate::testing::{settle, tree_with};
    use crate::tree::WidgetTree;
    use crate::widget::{Element, Widget};
    use crate::widgets::{Column, Fixed};

    fn background(color: Color) -> StyleProperties {
        StyleProperties::new().with(keys::BACKGROUND, StyleValue::Color(color))
    }

    #[test]
    fn direct_property_beats_scoped_rule() {
        let rule = StyleRule::new(Selector::widget("Fixed"), background(Color::RED));
        let (tree, root) = tree_with(
            Element::new(Column::new(|_| {
                vec![
                    Element::new(Fixed::new(Size::new(5.0, 5.0)))
                        .style(keys::BACKGROUND, StyleValue::Color(Color::WHITE)),
                    Element::new(Fixed::new(Size::new(5.0, 5.0))),
                ]
            }))
            .provide_style(rule),
        );
        let children = tree.children(root).unwrap().to_vec();
        assert_eq!(tree.resolved_style(children[0]).unwrap().background, Color::WHITE);
        assert_eq!(tree.resolved_style(children[1]).unwrap().background, Color::RED);
    }

    #[test]
    fn provided_rules_skip_the_providing_node() {
        let rule = StyleRule::new(Selector::any(), background(Color::RED));
        let (tree, root) = tree_with(
            Element::new(Column::new(|_| vec![Element::new(Fixed::new(Size::ZERO))])).provide_style(rule),
        );
        let child = tree.children(root).unwrap()[0];
        assert_eq!(tree.resolved_style(root).unwrap().background, Color::TRANSPARENT);
        assert_eq!(tree.resolved_style(child).unwrap().background, Color::RED);
    }

    #[test]
    fn classes_and_pseudo_classes_rematch() {
        let (mut tree, root) = tree_with(Element::new(Fixed::new(Size::new(5.0, 5.0))));
        tree.add_style_rule(StyleRule::new(
            Selector::any().class("primary"),
            background(Color::RED),
        ));
        tree.add_style_rule(StyleRule::new(
            Selector::any().pseudo("hover"),
            StyleProperties::new().with(keys::PADDING, StyleValue::Insets(Insets::uniform(2.0))),
        ));
        settle(&mut tree);

        tree.add_class(root, "primary").unwrap();
        assert_eq!(tree.resolved_style(root).unwrap().background, Color::RED);
        assert!(tree.is_invalid(root, Invalidation::RenderState).unwrap());
        assert!(!tree.is_invalid(root, Invalidation::Layout).unwrap());

        tree.set_pseudo_class(root, "hover", true).unwrap();
        assert!(tree.is_invalid(root, Invalidation::BoxConfig).unwrap());
        assert!(tree.is_invalid(root, Invalidation::Layout).unwrap());
        settle(&mut tree);
        assert_eq!(tree.size(root).unwrap(), Size::new(9.0, 9.0));

        tree.remove_class(root, "primary").unwrap();
        assert_eq!(tree.resolved_style(root).unwrap().background, Color::TRANSPARENT);
    }

    #[test]
    fn removing_a_rule_restores_defaults() {
        let (mut tree, root) = tree_with(Element::new(Fixed::new(Size::ZERO)));
        let rule = tree.add_style_rule(StyleRule::new(Selector::any(), background(Color::RED)));
        assert_eq!(tree.resolved_style(root).unwrap().background, Color::RED);
        assert!(tree.remove_style_rule(rule));
        assert!(!tree.remove_style_rule(rule));
        assert_eq!(tree.resolved_style(root).unwrap().background, Color::TRANSPARENT);
    }

    #[test]
    fn direct_changes_re_resolve() {
        let (mut tree, root) = tree_with(Element::new(Fixed::new(Size::ZERO)));
        settle(&mut tree);
        tree.set_style(root, keys::OPACITY, StyleValue::Number(0.5)).unwrap();
        assert_eq!(tree.resolved_style(root).unwrap().opacity, 0.5);
        assert_eq!(
            tree.remove_style(root, &keys::OPACITY).unwrap(),
            Some(StyleValue::Number(0.5))
        );
        assert_eq!(tree.resolved_style(root).unwrap().opacity, 1.0);
    }

    #[test]
    fn duplicate_schema_keys_refuse_to_mount() {
        struct Clashing;
        impl Widget for Clashing {
            fn supported_style_properties(&self) -> SupportSet {
                SupportSet::new().with(keys::BACKGROUND, ValueKind::Color)
            }
        }
        let mut tree = WidgetTree::new();
        let err = tree.mount_root(Element::new(Clashing)).unwrap_err();
        assert_eq!(
            err,
            TreeError::Style(StyleError::DuplicateKey {
                key: keys::BACKGROUND,
                sources: [SupportSource::Global, SupportSource::Own("Clashing")],
            })
        );
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
    }

    #[test]
    fn parents_extend_child_schema() {
        struct Flexing;
        impl Widget for Flexing {
            fn child_style_properties(&self) -> SupportSet {
                SupportSet::new().with(StyleKey::from_static("flex"), ValueKind::Number)
            }

            fn build(&mut self, _: &mut crate::widget::BuildCx<'_>) -> Vec<Element> {
                vec![Element::new(Fixed::new(Size::ZERO)).style(flex(), StyleValue::Number(2.0))]
            }
        }
        fn flex() -> StyleKey {
            StyleKey::from_static("flex")
        }
        let (tree, root) = tree_with(Element::new(Flexing).style(flex(), StyleValue::Number(1.0)));
        let child = tree.children(root).unwrap()[0];
        assert!(tree.resolved_style(root).unwrap().get(&flex()).is_none());
        assert_eq!(
            tree.resolved_style(child).unwrap().get(&flex()),
            Some(&StyleValue::Number(2.0))
        );
    }
}
