// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Walks a render-object tree and issues draw calls.

use grove_core::{RenderKind, RenderObject};

use crate::backend::DrawingBackend;
use crate::context::DrawingContext;

/// What one paint walk did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaintStats {
    /// Primitives handed to the backend.
    pub primitives: usize,
    /// Transform, opacity and clip scopes opened.
    pub scopes: usize,
    /// Subtrees skipped because they were fully transparent.
    pub skipped: usize,
}

/// Paints `content` between an activate/deactivate pair.
pub fn paint_frame<B: DrawingBackend + ?Sized>(backend: &mut B, content: &RenderObject) -> PaintStats {
    let mut cx = DrawingContext::new(backend);
    cx.begin_drawing();
    let stats = paint(&mut cx, content);
    cx.end_drawing();
    tracing::trace!(
        primitives = stats.primitives,
        scopes = stats.scopes,
        skipped = stats.skipped,
        "frame painted"
    );
    stats
}

/// Paints `object` and its descendants in the context's current state.
///
/// Every transform, opacity or clip object opens a nested scope that is
/// locked before its own effect is applied, so the effect composes with
/// everything above it. The context's clip is restored on the backend after
/// each clip scope.
pub fn paint<B: DrawingBackend + ?Sized>(
    cx: &mut DrawingContext<'_, B>,
    object: &RenderObject,
) -> PaintStats {
    let mut stats = PaintStats::default();
    paint_into(cx, object, &mut stats);
    stats
}

fn paint_into<B: DrawingBackend + ?Sized>(
    cx: &mut DrawingContext<'_, B>,
    object: &RenderObject,
    stats: &mut PaintStats,
) {
    match object.kind() {
        RenderKind::Container | RenderKind::Identified(_) => paint_children(cx, object, stats),
        RenderKind::Transform(transform) => {
            stats.scopes += 1;
            let mut inner = cx.nested();
            inner.lock();
            inner.transform(*transform);
            paint_children(&mut inner, object, stats);
        }
        RenderKind::Opacity(opacity) => {
            if cx.stack().merged_opacity() * opacity <= 0.0 {
                stats.skipped += 1;
                return;
            }
            stats.scopes += 1;
            let mut inner = cx.nested();
            inner.lock();
            inner.set_opacity(opacity.clamp(0.0, 1.0));
            paint_children(&mut inner, object, stats);
        }
        RenderKind::Clip(rect) => {
            stats.scopes += 1;
            {
                let mut inner = cx.nested();
                inner.lock();
                inner.clip(*rect);
                paint_children(&mut inner, object, stats);
            }
            cx.sync_clip();
        }
        RenderKind::Rect { rect, paint } => {
            stats.primitives += 1;
            cx.draw_rect(*rect, paint);
        }
        RenderKind::Line { from, to, paint } => {
            stats.primitives += 1;
            cx.draw_line(*from, *to, paint);
        }
        RenderKind::Circle {
            center,
            radius,
            paint,
        } => {
            stats.primitives += 1;
            cx.draw_circle(*center, *radius, paint);
        }
        RenderKind::Text {
            text,
            origin,
            paint,
        } => {
            stats.primitives += 1;
            cx.draw_text(text, *origin, paint);
        }
    }
}

fn paint_children<B: DrawingBackend + ?Sized>(
    cx: &mut DrawingContext<'_, B>,
    object: &RenderObject,
    stats: &mut PaintStats,
) {
    for child in object.children().iter() {
        paint_into(cx, child, stats);
    }
}
