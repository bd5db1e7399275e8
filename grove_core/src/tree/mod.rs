// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The widget tree and its lifecycle engine.
//!
//! A *node* is one mounted widget. Each node has:
//!
//! - An identity ([`NodeId`]), a generational handle that becomes stale when
//!   the node is destroyed.
//! - Topology: parent, ordered children and a [`TreePath`].
//! - Four caches guarded by invalidation flags: its children (build), its
//!   [`BoxConfig`](crate::BoxConfig), its layout (size, child positions,
//!   scroll range) and its render output.
//!
//! # Invalidation
//!
//! Flags are raised with [`WidgetTree::invalidate`] or as a consequence of
//! other changes, and lowered only by the step that recomputes the cache.
//! Every raised flag also puts the node on the pending queue of its pass
//! (see [`dirty`](crate::dirty)); [`WidgetTree::tick`] drains the queues.
//!
//! - A rebuild invalidates the node's box config, layout and render state.
//! - A changed box config invalidates the node's layout and its parent's box
//!   config.
//! - A changed size or position deep-invalidates render state.
//! - A style change invalidates render state, plus box config and layout if
//!   a layout-affecting property changed.

mod id;
mod invalidate;
mod layout;
mod mount;
mod node;
mod render;
mod store;
mod style;
mod tick;
mod traverse;

pub use id::{NodeId, TreePath};
pub use node::ScrollState;
pub use render::RenderReason;
pub use store::WidgetTree;
pub use tick::{Frame, PassReport};
pub use traverse::{Ancestors, Descendants};
