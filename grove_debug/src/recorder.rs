// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event roll.
//!
//! [`RecorderSink`] implements [`TraceSink`] and keeps the most recent events
//! in a bounded roll, plus running counts of every [`InspectionKind`] seen
//! since creation or the last [`clear`](RecorderSink::clear). Counts are not
//! affected by the roll dropping old events.

use std::collections::{HashMap, VecDeque};

use grove_core::NodeId;
use grove_core::trace::{
    InspectionEvent, InspectionKind, PhaseBeginEvent, PhaseEndEvent, PhaseKind, TraceSink,
};

// ---------------------------------------------------------------------------
// RecordedEvent
// ---------------------------------------------------------------------------

/// One recorded event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A pass started.
    PhaseBegin {
        /// Tick counter.
        tick: u64,
        /// Which pass.
        phase: PhaseKind,
    },
    /// A pass ended.
    PhaseEnd {
        /// Tick counter.
        tick: u64,
        /// Which pass.
        phase: PhaseKind,
        /// Nodes the pass did work for.
        processed: usize,
    },
    /// A per-node lifecycle event.
    Inspection(InspectionEvent),
}

impl RecordedEvent {
    /// The tick the event belongs to.
    #[must_use]
    pub fn tick(&self) -> u64 {
        match self {
            Self::PhaseBegin { tick, .. } | Self::PhaseEnd { tick, .. } => *tick,
            Self::Inspection(e) => e.tick,
        }
    }
}

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that keeps the last `capacity` events.
#[derive(Debug)]
pub struct RecorderSink {
    events: VecDeque<RecordedEvent>,
    capacity: usize,
    counts: HashMap<InspectionKind, usize>,
    dropped: usize,
}

impl Default for RecorderSink {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

impl RecorderSink {
    /// Roll size of [`new`](Self::new).
    pub const DEFAULT_CAPACITY: usize = 4096;

    /// Creates a recorder with the default roll size.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recorder keeping at most `capacity` events.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "recorder capacity must be non-zero");
        Self {
            events: VecDeque::with_capacity(capacity.min(Self::DEFAULT_CAPACITY)),
            capacity,
            counts: HashMap::new(),
            dropped: 0,
        }
    }

    /// The retained events, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &RecordedEvent> {
        self.events.iter()
    }

    /// The retained inspection events concerning `node`, oldest first.
    pub fn events_for(&self, node: NodeId) -> impl Iterator<Item = &InspectionEvent> {
        self.events.iter().filter_map(move |e| match e {
            RecordedEvent::Inspection(i) if i.node == node => Some(i),
            _ => None,
        })
    }

    /// How many events of `kind` were seen.
    #[must_use]
    pub fn count(&self, kind: InspectionKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// How many events fell out of the roll.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Forgets all events and counts.
    pub fn clear(&mut self) {
        self.events.clear();
        self.counts.clear();
        self.dropped = 0;
    }

    fn push(&mut self, event: RecordedEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
    }
}

impl TraceSink for RecorderSink {
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.push(RecordedEvent::PhaseBegin {
            tick: e.tick,
            phase: e.phase,
        });
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.push(RecordedEvent::PhaseEnd {
            tick: e.tick,
            phase: e.phase,
            processed: e.processed,
        });
    }

    fn on_inspection(&mut self, e: &InspectionEvent) {
        *self.counts.entry(e.kind).or_default() += 1;
        self.push(RecordedEvent::Inspection(*e));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use grove_core::trace::Tracer;
    use grove_core::widgets::{Column, Fixed};
    use grove_core::{BoxConstraints, Element, Invalidation, WidgetTree};
    use kurbo::Size;

    use super::*;

    fn recorded_tree() -> (WidgetTree, Rc<RefCell<RecorderSink>>) {
        let sink = Rc::new(RefCell::new(RecorderSink::new()));
        let mut tree = WidgetTree::new();
        tree.set_tracer(Tracer::new(Box::new(sink.clone())));
        tree.mount_root(Element::new(Column::new(|_| {
            vec![
                Element::new(Fixed::new(Size::new(10.0, 10.0))),
                Element::new(Fixed::new(Size::new(10.0, 10.0))),
            ]
        })))
        .unwrap();
        (tree, sink)
    }

    #[test]
    fn counts_lifecycle_events() {
        let (mut tree, sink) = recorded_tree();
        tree.tick(BoxConstraints::UNBOUNDED).unwrap();
        let sink = sink.borrow();
        assert_eq!(sink.count(InspectionKind::Mounted), 3);
        assert_eq!(sink.count(InspectionKind::LayoutFinished), 3);
        assert_eq!(sink.count(InspectionKind::RenderingFinished), 3);
        assert_eq!(sink.count(InspectionKind::Destroyed), 0);
    }

    #[test]
    fn phases_bracket_inspections() {
        let (mut tree, sink) = recorded_tree();
        tree.tick(BoxConstraints::UNBOUNDED).unwrap();
        let sink = sink.borrow();
        let phases: Vec<_> = sink
            .events()
            .filter_map(|e| match e {
                RecordedEvent::PhaseBegin { phase, .. } => Some(*phase),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            [PhaseKind::Build, PhaseKind::BoxConfig, PhaseKind::Layout, PhaseKind::Render]
        );
        assert!(sink.events().all(|e| e.tick() <= 1), "events from a future tick");
    }

    #[test]
    fn per_node_history() {
        let (mut tree, sink) = recorded_tree();
        tree.tick(BoxConstraints::UNBOUNDED).unwrap();
        let root = tree.root().unwrap();
        sink.borrow_mut().clear();
        tree.invalidate(root, Invalidation::RenderState).unwrap();
        tree.tick(BoxConstraints::UNBOUNDED).unwrap();
        let kinds: Vec<_> = sink.borrow().events_for(root).map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            [
                InspectionKind::RenderStateInvalidated,
                InspectionKind::RenderingStarted,
                InspectionKind::RenderingFinished,
            ]
        );
    }

    #[test]
    fn roll_drops_oldest() {
        let mut sink = RecorderSink::with_capacity(2);
        for tick in 0..5 {
            sink.on_phase_begin(&PhaseBeginEvent {
                tick,
                phase: PhaseKind::Build,
            });
        }
        assert_eq!(sink.dropped(), 3);
        let ticks: Vec<_> = sink.events().map(RecordedEvent::tick).collect();
        assert_eq!(ticks, [3, 4]);
    }

    #[test]
    #[should_panic(expected = "recorder capacity must be non-zero")]
    fn zero_capacity_panics() {
        let _ = RecorderSink::with_capacity(0);
    }
}
