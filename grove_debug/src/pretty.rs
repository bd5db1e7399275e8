// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Inspection
//! lines are indented under the pass they belong to.

use std::io::Write;

use grove_core::trace::{
    InspectionEvent, InspectionKind, PhaseBeginEvent, PhaseEndEvent, PhaseKind, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    inspections: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("inspections", &self.inspections)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            inspections: true,
        }
    }

    /// Writes only pass boundaries, skipping per-node events.
    #[must_use]
    pub fn phases_only(mut self) -> Self {
        self.inspections = false;
        self
    }

    /// Consumes the sink and returns its destination.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Build => "build",
        PhaseKind::BoxConfig => "box-config",
        PhaseKind::Layout => "layout",
        PhaseKind::Render => "render",
    }
}

fn kind_name(kind: InspectionKind) -> &'static str {
    match kind {
        InspectionKind::Mounted => "mounted",
        InspectionKind::BuildStarted => "build-started",
        InspectionKind::BuildFinished => "build-finished",
        InspectionKind::BuildInvalidated => "build-invalidated",
        InspectionKind::BoxConfigInvalidated => "box-config-invalidated",
        InspectionKind::BoxConfigChanged => "box-config-changed",
        InspectionKind::LayoutInvalidated => "layout-invalidated",
        InspectionKind::LayoutStarted => "layout-started",
        InspectionKind::LayoutFinished => "layout-finished",
        InspectionKind::RenderStateInvalidated => "render-invalidated",
        InspectionKind::RenderingStarted => "render-started",
        InspectionKind::RenderingFinished => "render-finished",
        InspectionKind::Destroyed => "destroyed",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(self.writer, "[{}] tick={} begin", phase_name(e.phase), e.tick);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[{}] tick={} end processed={}",
            phase_name(e.phase),
            e.tick,
            e.processed
        );
    }

    fn on_inspection(&mut self, e: &InspectionEvent) {
        if !self.inspections {
            return;
        }
        let _ = writeln!(
            self.writer,
            "  {:?} {} tick={}",
            e.node,
            kind_name(e.kind),
            e.tick
        );
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use grove_core::trace::Tracer;
    use grove_core::widgets::Fixed;
    use grove_core::{BoxConstraints, Element, WidgetTree};
    use kurbo::Size;

    use super::*;

    fn output_of(sink: PrettyPrintSink<Vec<u8>>) -> String {
        let sink = Rc::new(RefCell::new(sink));
        let mut tree = WidgetTree::new();
        tree.set_tracer(Tracer::new(Box::new(sink.clone())));
        tree.mount_root(Element::new(Fixed::new(Size::new(1.0, 1.0))))
            .unwrap();
        tree.tick(BoxConstraints::UNBOUNDED).unwrap();
        drop(tree);
        let sink = Rc::try_unwrap(sink).unwrap().into_inner();
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn one_line_per_event() {
        let out = output_of(PrettyPrintSink::with_writer(Vec::new()));
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines.iter().any(|l| l.contains("mounted")), "got {lines:?}");
        assert!(lines.contains(&"[build] tick=1 begin"), "got {lines:?}");
        assert!(lines.contains(&"[render] tick=1 end processed=1"), "got {lines:?}");
        assert!(lines.iter().any(|l| l.ends_with("layout-finished tick=1")), "got {lines:?}");
    }

    #[test]
    fn phases_only_skips_node_events() {
        let out = output_of(PrettyPrintSink::with_writer(Vec::new()).phases_only());
        assert_eq!(out.lines().count(), 8);
        assert!(out.lines().all(|l| l.starts_with('[')), "got {out}");
    }
}
