// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained widget tree with invalidation-driven build, layout and render.
//!
//! `grove_core` keeps a tree of widget nodes and three interdependent caches
//! per node (box config, layout, render output), plus the node's children
//! themselves. Each cache is guarded by an invalidation flag; a driver calls
//! [`WidgetTree::tick`] once per frame and only the invalid parts are
//! recomputed.
//!
//! # Architecture
//!
//! ```text
//!   Element ──► WidgetTree::mount_root
//!                    │
//!                    ▼
//!   tick ──► build (reconcile) ──► box config (bottom-up)
//!                                        │
//!                 ┌──────────────────────┘
//!                 ▼
//!            layout (top-down) ──► render (cache) ──► Frame
//!                                                       │
//!                 ┌─────────────────────────────────────┘
//!                 ▼
//!   grove_draw::paint_frame ──► DrawingContext ──► DrawingBackend
//! ```
//!
//! **[`tree`]**: Arena of generational [`NodeId`] handles, mounting,
//! reconciliation, invalidation, layout, the render cache and the tick
//! driver.
//!
//! **[`widget`]**: The [`Widget`] trait, [`Element`]s and the contexts
//! handed to widget callbacks.
//!
//! **[`geometry`]**: [`BoxConstraints`] and [`BoxConfig`].
//!
//! **[`style`]**: Property-support schemas, selectors, scoped rules and the
//! [`StyleResolver`](style::StyleResolver).
//!
//! **[`render`]**: Identity-bearing [`RenderObject`]s with a per-object
//! consumer cache.
//!
//! **[`event`]**: Per-node event handlers; invalidations they request are
//! deferred to the end of the running pass.
//!
//! **[`dirty`]**: Pending queues of the passes via `understory_dirty`.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and inspection
//! events, with a zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! **[`widgets`]**: A few generic widgets.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod config;
pub mod dirty;
pub mod error;
pub mod event;
pub mod geometry;
pub mod lifecycle;
pub mod paint;
pub mod render;
pub mod style;
pub mod trace;
pub mod tree;
pub mod widget;
pub mod widgets;

#[cfg(test)]
mod testing;

pub use config::{ApproximateTextMeasure, TextMeasure, TreeConfig};
pub use error::TreeError;
pub use geometry::{Axis, BoxConfig, BoxConstraints};
pub use lifecycle::{Invalidation, InvalidationFlags, LifecycleStage};
pub use paint::{Color, Paint, TextPaint};
pub use render::{RenderKind, RenderObject};
pub use tree::{Frame, NodeId, PassReport, RenderReason, TreePath, WidgetTree};
pub use widget::{Element, Key, Widget};
