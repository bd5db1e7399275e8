// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cascading style resolution.
//!
//! A node's effective value for a property is, in order of precedence:
//!
//! 1. its direct (unscoped) property,
//! 2. the value from the first matched rule in declaration order, where a
//!    rule matches if its [`Selector`] matches the node and it is declared in
//!    the node's scope or an ancestor of that scope,
//! 3. the property's default.
//!
//! Only properties in the node's [`MergedSupport`] schema are resolved.
//! Re-resolution happens when the matched-rule list changes by identity or
//! when direct properties change.

mod resolve;
mod rule;
mod support;
mod value;

pub use resolve::{ResolvedStyle, StyleResolver};
pub use rule::{RuleId, ScopeId, Selector, SelectorTarget, StyleRule};
pub use support::{MergedSupport, PropertySupport, StyleError, SupportSet, SupportSource};
pub use value::{Overflow, StyleKey, StyleProperties, StyleValue, ValueKind, Visibility, keys};

pub(crate) use rule::{StyleRegistry, same_rules};
