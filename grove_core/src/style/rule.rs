// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selectors, rules, and the scope registry.

use std::collections::HashMap;
use std::rc::Rc;

use super::value::StyleProperties;
use crate::tree::NodeId;

/// Matches nodes by widget name, classes and pseudo classes.
///
/// Every listed condition must hold; an empty selector matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selector {
    widget: Option<String>,
    classes: Vec<String>,
    pseudo_classes: Vec<String>,
}

impl Selector {
    /// A selector matching every node.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// A selector matching nodes whose widget has `name`.
    #[must_use]
    pub fn widget(name: impl Into<String>) -> Self {
        Self {
            widget: Some(name.into()),
            ..Self::default()
        }
    }

    /// Additionally requires `class`.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Additionally requires the pseudo class `pseudo` (e.g. `hover`).
    #[must_use]
    pub fn pseudo(mut self, pseudo: impl Into<String>) -> Self {
        self.pseudo_classes.push(pseudo.into());
        self
    }

    /// Returns whether the selector matches `target`.
    #[must_use]
    pub fn matches(&self, target: &SelectorTarget<'_>) -> bool {
        self.widget.as_deref().is_none_or(|w| w == target.widget)
            && self.classes.iter().all(|c| target.classes.contains(c))
            && self
                .pseudo_classes
                .iter()
                .all(|p| target.pseudo_classes.contains(p))
    }
}

/// What a selector is matched against.
#[derive(Clone, Copy, Debug)]
pub struct SelectorTarget<'a> {
    /// The widget name.
    pub widget: &'a str,
    /// Classes attached to the node.
    pub classes: &'a [String],
    /// Pseudo classes currently active on the node.
    pub pseudo_classes: &'a [String],
}

/// A selector with the properties it sets.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleRule {
    /// Which nodes the rule applies to.
    pub selector: Selector,
    /// What it sets.
    pub properties: StyleProperties,
}

impl StyleRule {
    /// Creates a rule.
    #[must_use]
    pub fn new(selector: Selector, properties: StyleProperties) -> Self {
        Self {
            selector,
            properties,
        }
    }
}

/// Identifies a style scope.
///
/// The default is [`ScopeId::ROOT`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    /// The scope of the root and of globally added rules.
    pub const ROOT: Self = Self(0);
}

/// Identifies a registered rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RuleId(u64);

#[derive(Debug)]
struct Registered {
    id: RuleId,
    scope: ScopeId,
    owner: Option<NodeId>,
    rule: Rc<StyleRule>,
}

/// All rules and scopes known to a tree.
#[derive(Debug)]
pub(crate) struct StyleRegistry {
    /// Parent of every live scope; the root has none.
    scopes: HashMap<ScopeId, Option<ScopeId>>,
    next_scope: u32,
    /// In declaration order.
    rules: Vec<Registered>,
    next_rule: u64,
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleRegistry {
    pub(crate) fn new() -> Self {
        let mut scopes = HashMap::new();
        scopes.insert(ScopeId::ROOT, None);
        Self {
            scopes,
            next_scope: 1,
            rules: Vec::new(),
            next_rule: 0,
        }
    }

    pub(crate) fn create_scope(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.next_scope);
        self.next_scope += 1;
        self.scopes.insert(id, Some(parent));
        id
    }

    pub(crate) fn remove_scope(&mut self, scope: ScopeId) {
        if scope != ScopeId::ROOT {
            self.scopes.remove(&scope);
            self.rules.retain(|r| r.scope != scope);
        }
    }

    pub(crate) fn add_rule(&mut self, scope: ScopeId, owner: Option<NodeId>, rule: StyleRule) -> RuleId {
        let id = RuleId(self.next_rule);
        self.next_rule += 1;
        self.rules.push(Registered {
            id,
            scope,
            owner,
            rule: Rc::new(rule),
        });
        id
    }

    pub(crate) fn remove_rule(&mut self, id: RuleId) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.id != id);
        self.rules.len() != before
    }

    pub(crate) fn remove_owned(&mut self, owner: NodeId) {
        self.rules.retain(|r| r.owner != Some(owner));
    }

    /// `scope` followed by its ancestors up to the root.
    pub(crate) fn chain(&self, scope: ScopeId) -> Vec<ScopeId> {
        let mut chain = Vec::new();
        let mut current = Some(scope);
        while let Some(s) = current {
            chain.push(s);
            current = self.scopes.get(&s).copied().flatten();
        }
        chain
    }

    /// Rules visible from `scope` that match `target`, in declaration order.
    pub(crate) fn matching(&self, scope: ScopeId, target: &SelectorTarget<'_>) -> Vec<Rc<StyleRule>> {
        let chain = self.chain(scope);
        self.rules
            .iter()
            .filter(|r| chain.contains(&r.scope) && r.rule.selector.matches(target))
            .map(|r| Rc::clone(&r.rule))
            .collect()
    }
}

/// Compares two matched-rule lists by identity.
pub(crate) fn same_rules(a: &[Rc<StyleRule>], b: &[Rc<StyleRule>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Rc::ptr_eq(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{StyleValue, keys};

    fn target<'a>(widget: &'a str, classes: &'a [String]) -> SelectorTarget<'a> {
        SelectorTarget {
            widget,
            classes,
            pseudo_classes: &[],
        }
    }

    #[test]
    fn selector_requires_every_condition() {
        let classes = vec!["primary".to_owned()];
        let sel = Selector::widget("Label").class("primary");
        assert!(sel.matches(&target("Label", &classes)));
        assert!(!sel.matches(&target("Fixed", &classes)));
        assert!(!sel.matches(&target("Label", &[])));
        assert!(!Selector::any().pseudo("hover").matches(&target("Label", &classes)));
    }

    #[test]
    fn rules_are_visible_from_descendant_scopes_only() {
        let mut reg = StyleRegistry::new();
        let inner = reg.create_scope(ScopeId::ROOT);
        let sibling = reg.create_scope(ScopeId::ROOT);
        let props = StyleProperties::new().with(keys::OPACITY, StyleValue::Number(0.5));
        reg.add_rule(inner, None, StyleRule::new(Selector::any(), props));
        let t = target("Fixed", &[]);
        assert_eq!(reg.matching(inner, &t).len(), 1);
        assert!(reg.matching(sibling, &t).is_empty());
        assert!(reg.matching(ScopeId::ROOT, &t).is_empty());
        let deeper = reg.create_scope(inner);
        assert_eq!(reg.chain(deeper), [deeper, inner, ScopeId::ROOT]);
        assert_eq!(reg.matching(deeper, &t).len(), 1);
    }

    #[test]
    fn identity_comparison_ignores_equal_contents() {
        let a = Rc::new(StyleRule::new(Selector::any(), StyleProperties::new()));
        let b = Rc::new(StyleRule::new(Selector::any(), StyleProperties::new()));
        assert!(same_rules(&[Rc::clone(&a)], &[Rc::clone(&a)]));
        assert!(!same_rules(&[a], &[b]));
    }
}
