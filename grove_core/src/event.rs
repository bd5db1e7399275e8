// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node event subscription.
//!
//! Handlers are registered explicitly through [`NodeHandlers`] (see
//! [`WidgetTree::handlers`](crate::WidgetTree::handlers)). They run
//! synchronously, inline with the phase that raises the event, and receive an
//! [`EventCx`] through which they may request invalidations. Requests are
//! queued and applied once the current phase has finished, so no pass sees
//! its traversal order change underneath it.

use kurbo::Size;

use crate::geometry::{BoxConfig, BoxConstraints};
use crate::lifecycle::Invalidation;
use crate::tree::NodeId;

/// Identifies a registered handler within one [`Handlers`] list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// A deferred invalidation queued by a handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Request {
    Invalidate(NodeId, Invalidation),
    RenderDeep(NodeId),
}

/// What a handler may do while it runs.
#[derive(Debug)]
pub struct EventCx<'a> {
    node: NodeId,
    requests: &'a mut Vec<Request>,
}

impl<'a> EventCx<'a> {
    pub(crate) fn new(node: NodeId, requests: &'a mut Vec<Request>) -> Self {
        Self { node, requests }
    }

    /// The node that raised the event.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Requests that `kind` of `node` be invalidated once this phase ends.
    pub fn request(&mut self, node: NodeId, kind: Invalidation) {
        self.requests.push(Request::Invalidate(node, kind));
    }

    /// Requests a deep render invalidation of `node` once this phase ends.
    pub fn request_render_deep(&mut self, node: NodeId) {
        self.requests.push(Request::RenderDeep(node));
    }
}

type Callback<E> = Box<dyn FnMut(&E, &mut EventCx<'_>)>;

/// An ordered list of handlers for one event.
pub struct Handlers<E> {
    next: u64,
    entries: Vec<(HandlerId, Callback<E>)>,
}

impl<E> Default for Handlers<E> {
    fn default() -> Self {
        Self {
            next: 0,
            entries: Vec::new(),
        }
    }
}

impl<E> core::fmt::Debug for Handlers<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Handlers")
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl<E> Handlers<E> {
    /// Appends a handler; handlers run in registration order.
    pub fn add(&mut self, handler: impl FnMut(&E, &mut EventCx<'_>) + 'static) -> HandlerId {
        let id = HandlerId(self.next);
        self.next += 1;
        self.entries.push((id, Box::new(handler)));
        id
    }

    /// Removes a handler. Returns whether it was registered.
    pub fn remove(&mut self, id: HandlerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(h, _)| *h != id);
        self.entries.len() != before
    }

    /// Removes every handler.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn invoke(&mut self, event: &E, cx: &mut EventCx<'_>) {
        for (_, handler) in &mut self.entries {
            handler(event, cx);
        }
    }
}

/// Payload of [`NodeHandlers::box_config_changed`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxConfigChanged {
    /// The previously cached config.
    pub old: BoxConfig,
    /// The freshly computed config.
    pub new: BoxConfig,
}

/// Every event a node raises.
#[derive(Debug, Default)]
pub struct NodeHandlers {
    /// The node finished mounting.
    pub mounted: Handlers<()>,
    /// The node's dependencies were injected.
    pub dependencies_injected: Handlers<()>,
    /// The node's build flag was raised.
    pub build_invalidated: Handlers<()>,
    /// The node's box-config flag was raised.
    pub box_config_invalidated: Handlers<()>,
    /// A recomputed box config differed from the cached one.
    pub box_config_changed: Handlers<BoxConfigChanged>,
    /// The node's layout flag was raised.
    pub layout_invalidated: Handlers<()>,
    /// Layout of the node started with the given constraints.
    pub layouting_started: Handlers<BoxConstraints>,
    /// Layout of the node finished with the given size.
    pub layouting_finished: Handlers<Size>,
    /// The resolved size differs from the previous layout round.
    pub size_changed: Handlers<Size>,
    /// The node's render-state flag was raised.
    pub render_state_invalidated: Handlers<()>,
    /// The node is being destroyed.
    pub destroy: Handlers<()>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn handlers_run_in_order_and_can_be_removed() {
        let log = Rc::new(Cell::new(0_u32));
        let mut handlers = Handlers::<Size>::default();
        let l = log.clone();
        let first = handlers.add(move |_, _| l.set(l.get() * 10 + 1));
        let l = log.clone();
        handlers.add(move |_, _| l.set(l.get() * 10 + 2));

        let mut requests = Vec::new();
        let node = NodeId::dangling();
        handlers.invoke(&Size::ZERO, &mut EventCx::new(node, &mut requests));
        assert_eq!(log.get(), 12);

        assert!(handlers.remove(first));
        assert!(!handlers.remove(first));
        log.set(0);
        handlers.invoke(&Size::ZERO, &mut EventCx::new(node, &mut requests));
        assert_eq!(log.get(), 2);
    }

    #[test]
    fn requests_are_queued_not_applied() {
        let mut handlers = Handlers::<()>::default();
        handlers.add(|_, cx| {
            let node = cx.node();
            cx.request(node, Invalidation::Layout);
            cx.request_render_deep(node);
        });
        let mut requests = Vec::new();
        let node = NodeId::dangling();
        handlers.invoke(&(), &mut EventCx::new(node, &mut requests));
        assert_eq!(
            requests,
            [
                Request::Invalidate(node, Invalidation::Layout),
                Request::RenderDeep(node)
            ]
        );
    }
}
