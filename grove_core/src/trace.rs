// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inspection events for the lifecycle engine.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! tree calls while it builds, lays out, and renders. All method bodies
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] owns an optional boxed sink. When the `trace` feature is
//! **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use std::cell::RefCell;
use std::rc::Rc;

use crate::tree::NodeId;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which pass of a tick is being reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Rebuilding build-invalid nodes and reconciling their children.
    Build,
    /// Recomputing stale box configs, deepest first.
    BoxConfig,
    /// Top-down layout from the root plus pending relayouts.
    Layout,
    /// Refreshing render-invalid nodes and collecting the root content.
    Render,
}

/// What happened to a single node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InspectionKind {
    /// The node finished mounting.
    Mounted,
    /// The node's build step is about to run.
    BuildStarted,
    /// The node's children were reconciled.
    BuildFinished,
    /// The node's build flag was raised.
    BuildInvalidated,
    /// The node's box-config flag was raised.
    BoxConfigInvalidated,
    /// A recomputed box config differed from the cached one.
    BoxConfigChanged,
    /// The node's layout flag was raised.
    LayoutInvalidated,
    /// Layout of the node started.
    LayoutStarted,
    /// Layout of the node finished.
    LayoutFinished,
    /// The node's render-state flag was raised.
    RenderStateInvalidated,
    /// Rendering of the node started.
    RenderingStarted,
    /// Rendering of the node finished.
    RenderingFinished,
    /// The node was destroyed.
    Destroyed,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Marks the beginning of a pass.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Tick counter.
    pub tick: u64,
    /// Which pass is starting.
    pub phase: PhaseKind,
}

/// Marks the end of a pass.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Tick counter.
    pub tick: u64,
    /// Which pass is ending.
    pub phase: PhaseKind,
    /// How many nodes the pass did work for.
    pub processed: usize,
}

/// A per-node lifecycle record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InspectionEvent {
    /// Tick counter at the time of the event.
    pub tick: u64,
    /// The node concerned.
    pub node: NodeId,
    /// What happened.
    pub kind: InspectionKind,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives inspection events from a [`WidgetTree`](crate::WidgetTree).
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called at the beginning of a pass.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a pass.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called for every per-node lifecycle event.
    fn on_inspection(&mut self, e: &InspectionEvent) {
        _ = e;
    }
}

/// Shared sinks let the caller keep reading a sink the tree writes to.
impl<T: TraceSink + ?Sized> TraceSink for Rc<RefCell<T>> {
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.borrow_mut().on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.borrow_mut().on_phase_end(e);
    }

    fn on_inspection(&mut self, e: &InspectionEvent) {
        self.borrow_mut().on_inspection(e);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin owner of an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
#[derive(Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`InspectionEvent`].
    #[inline]
    pub fn inspect(&mut self, tick: u64, node: NodeId, kind: InspectionKind) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_inspection(&InspectionEvent { tick, node, kind });
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (tick, node, kind);
        }
    }
}
