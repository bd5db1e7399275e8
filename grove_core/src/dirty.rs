// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Grove uses multi-channel dirty tracking (via [`understory_dirty`]) as the
//! pending queue of every pass. Each channel mirrors one of the four
//! per-node invalidation flags.
//!
//! # Propagation semantics
//!
//! No channel carries dependency edges. Upward propagation (a child's box
//! config feeding its parent) and downward propagation (deep render
//! invalidation) depend on runtime outcomes such as "did the recomputed
//! value actually change", so the tree performs them explicitly and marks
//! every affected node on its own. The tracker only remembers *which* nodes
//! are pending.
//!
//! # Consumption
//!
//! Each pass of [`WidgetTree::tick`](crate::WidgetTree::tick) drains its
//! channel deterministically, then orders the drained nodes by depth:
//! shallowest first for build, layout and render; deepest first for box
//! config. A drained node whose flag was already cleared as a side effect of
//! processing another node is skipped.

use understory_dirty::Channel;

use crate::lifecycle::Invalidation;

/// The node must rebuild and reconcile its children.
pub const BUILD: Channel = Channel::new(0);

/// The node's box config is stale.
pub const BOX_CONFIG: Channel = Channel::new(1);

/// The node must lay out again with its previous constraints.
pub const LAYOUT: Channel = Channel::new(2);

/// The node's cached render output is stale.
pub const RENDER: Channel = Channel::new(3);

/// Returns the channel that tracks `kind`.
#[must_use]
pub const fn channel(kind: Invalidation) -> Channel {
    match kind {
        Invalidation::Build => BUILD,
        Invalidation::BoxConfig => BOX_CONFIG,
        Invalidation::Layout => LAYOUT,
        Invalidation::RenderState => RENDER,
    }
}
