// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, tree snapshots and log setup for grove
//! diagnostics.
//!
//! This crate provides [`TraceSink`](grove_core::trace::TraceSink)
//! implementations and helpers for development:
//!
//! - [`recorder::RecorderSink`]: a bounded in-memory event roll with
//!   per-kind counters.
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`snapshot`]: the widget tree as JSON.
//! - [`logging::init`]: a `tracing` fmt subscriber filtered by `RUST_LOG`.

pub mod logging;
pub mod pretty;
pub mod recorder;
pub mod snapshot;
