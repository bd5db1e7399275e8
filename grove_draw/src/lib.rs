// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing backend contract and compositing drawing context for grove.
//!
//! This crate sits between [`grove_core`]'s render-object trees and a
//! concrete rasterizer. It defines:
//!
//! - [`DrawingBackend`]: the primitive set a surface must provide
//! - [`CompositingStack`]: inherent and overlay transform, opacity and clip
//! - [`DrawingContext`]: a stack bound to a backend, mapping every draw call
//! - [`paint_frame`]: walks a [`RenderObject`](grove_core::RenderObject)
//!   tree through a context
//! - [`RecordingBackend`]: records calls, for tests and inspection

#![cfg_attr(docsrs, feature(doc_cfg))]

mod backend;
mod context;
mod painter;
mod recording;

pub use backend::DrawingBackend;
pub use context::{Compositing, CompositingStack, DrawingContext};
pub use painter::{PaintStats, paint, paint_frame};
pub use recording::{DrawCommand, RecordingBackend};
