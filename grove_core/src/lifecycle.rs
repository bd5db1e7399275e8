// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle stages and per-node invalidation flags.

/// Where a node is in its life.
///
/// `Initialized → Mounted → Destroyed`; `Destroyed` is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LifecycleStage {
    /// Created but not yet attached to the tree.
    #[default]
    Initialized,
    /// Attached, built and taking part in passes.
    Mounted,
    /// Torn down. Every further lifecycle operation is reported as an error.
    Destroyed,
}

/// One of the four caches a node keeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Invalidation {
    /// Children must be rebuilt and reconciled.
    Build,
    /// The intrinsic box config must be recomputed.
    BoxConfig,
    /// Size and child positions must be recomputed.
    Layout,
    /// The cached render output must be recomputed.
    RenderState,
}

impl Invalidation {
    /// All four kinds in pass order.
    pub const ALL: [Self; 4] = [Self::Build, Self::BoxConfig, Self::Layout, Self::RenderState];
}

/// The four dirty flags of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct InvalidationFlags {
    /// See [`Invalidation::Build`].
    pub build: bool,
    /// See [`Invalidation::BoxConfig`].
    pub box_config: bool,
    /// See [`Invalidation::Layout`].
    pub layout: bool,
    /// See [`Invalidation::RenderState`].
    pub render_state: bool,
}

impl InvalidationFlags {
    /// Returns the flag for `kind`.
    #[must_use]
    pub const fn get(&self, kind: Invalidation) -> bool {
        match kind {
            Invalidation::Build => self.build,
            Invalidation::BoxConfig => self.box_config,
            Invalidation::Layout => self.layout,
            Invalidation::RenderState => self.render_state,
        }
    }

    /// Sets the flag for `kind`.
    pub fn set(&mut self, kind: Invalidation, value: bool) {
        match kind {
            Invalidation::Build => self.build = value,
            Invalidation::BoxConfig => self.box_config = value,
            Invalidation::Layout => self.layout = value,
            Invalidation::RenderState => self.render_state = value,
        }
    }

    /// Returns whether any flag is set.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.build || self.box_config || self.layout || self.render_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_independent() {
        let mut flags = InvalidationFlags::default();
        assert!(!flags.any());
        flags.set(Invalidation::Layout, true);
        for kind in Invalidation::ALL {
            assert_eq!(flags.get(kind), kind == Invalidation::Layout);
        }
        flags.set(Invalidation::Layout, false);
        assert!(!flags.any());
    }
}
