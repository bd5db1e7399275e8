// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena storage for widget nodes, plus read access.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use kurbo::{Point, Rect, Size, Vec2};
use understory_dirty::{CycleHandling, DirtyTracker};

use super::id::{NodeId, TreePath};
use super::node::{Node, NodeStyle, ScrollState};
use super::tick::PassReport;
use crate::config::TreeConfig;
use crate::error::TreeError;
use crate::event::{EventCx, Handlers, NodeHandlers, Request};
use crate::geometry::{BoxConfig, BoxConstraints};
use crate::lifecycle::{Invalidation, InvalidationFlags, LifecycleStage};
use crate::render::RenderObject;
use crate::style::{ResolvedStyle, ScopeId, StyleRegistry};
use crate::trace::{InspectionKind, Tracer};
use crate::widget::{Element, Key, Widget};

pub(crate) struct Slot {
    pub(crate) generation: u32,
    pub(crate) node: Option<Node>,
}

/// A retained tree of widget nodes.
///
/// Nodes are addressed by [`NodeId`] handles. The tree owns every node;
/// parents are stored as handles, never as owning references. Destroyed
/// nodes are recycled via a free list, and generation counters make stale
/// handles fail with [`TreeError::Destroyed`].
pub struct WidgetTree {
    // -- Allocation --
    pub(crate) slots: Vec<Slot>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) root: Option<NodeId>,

    // -- Pending work --
    pub(crate) pending: DirtyTracker<u32>,
    /// Old children abandoned by reconciliation, destroyed after the pass.
    pub(crate) graveyard: Vec<NodeId>,
    /// Invalidations requested by handlers, applied after the phase.
    pub(crate) requests: Vec<Request>,

    // -- Style --
    pub(crate) styles: StyleRegistry,

    // -- Settings and instrumentation --
    pub(crate) config: TreeConfig,
    pub(crate) tracer: Tracer,
    pub(crate) tick_index: u64,
    pub(crate) report: PassReport,
}

impl Default for WidgetTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WidgetTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetTree")
            .field("len", &self.len())
            .field("root", &self.root)
            .field("tick", &self.tick_index)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl WidgetTree {
    /// Creates an empty tree with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Creates an empty tree.
    #[must_use]
    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            root: None,
            pending: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            graveyard: Vec::new(),
            requests: Vec::new(),
            styles: StyleRegistry::new(),
            config,
            tracer: Tracer::none(),
            tick_index: 0,
            report: PassReport::default(),
        }
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Replaces the inspection sink.
    pub fn set_tracer(&mut self, tracer: Tracer) {
        self.tracer = tracer;
    }

    /// Turns the layout debugging overlay on or off for every node.
    pub fn set_debug_layout(&mut self, enabled: bool) {
        if self.config.debug_layout == enabled {
            return;
        }
        self.config.debug_layout = enabled;
        if let Some(root) = self.root {
            self.mark_render_deep(root);
        }
    }

    // -- Allocation API --

    /// Allocates an initialized, detached node for `element`.
    pub(crate) fn insert(&mut self, element: Element, scope: ScopeId) -> NodeId {
        let Element {
            widget,
            key,
            classes,
            style,
            provided,
            style_rules,
            creates_style_scope,
            debug_layout,
            configure,
        } = element;
        let mut handlers = NodeHandlers::default();
        for configure in configure {
            configure(&mut handlers);
        }
        let created_scope = creates_style_scope.then(|| self.styles.create_scope(scope));

        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot; its generation was bumped on destroy.
            idx
        } else {
            let idx = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
            assert!(idx != u32::MAX, "widget tree exhausted its index space");
            self.slots.push(Slot {
                generation: 0,
                node: None,
            });
            idx
        };
        let slot = &mut self.slots[idx as usize];
        let id = NodeId {
            idx,
            generation: slot.generation,
        };
        slot.node = Some(Node {
            name: widget.name(),
            widget: Some(widget),
            key,
            parent: None,
            children: Vec::new(),
            path: TreePath::root(),
            predecessor: None,
            stage: LifecycleStage::Initialized,
            flags: InvalidationFlags::default(),
            layouting: false,
            layouted: false,
            position: Point::ZERO,
            size: Size::ZERO,
            box_config: None,
            previous_constraints: None,
            scroll: ScrollState::default(),
            style: NodeStyle {
                scope,
                created_scope,
                classes,
                direct: style,
                provided_rules: style_rules,
                ..NodeStyle::default()
            },
            content: RenderObject::identified(id),
            main_content: None,
            debug_layout,
            provided,
            handlers,
        });
        id
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.slots
            .get(id.idx as usize)
            .is_some_and(|s| s.generation == id.generation && s.node.is_some())
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.slots
            .get(id.idx as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.node.as_ref())
            .ok_or(TreeError::Destroyed(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.slots
            .get_mut(id.idx as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.node.as_mut())
            .ok_or(TreeError::Destroyed(id))
    }

    /// The live handle currently occupying slot `idx`.
    pub(crate) fn id_at(&self, idx: u32) -> Option<NodeId> {
        let slot = self.slots.get(idx as usize)?;
        slot.node.as_ref().map(|_| NodeId {
            idx,
            generation: slot.generation,
        })
    }

    /// Returns a node that must be mounted, reporting otherwise.
    pub(crate) fn mounted(&self, id: NodeId) -> Result<&Node, TreeError> {
        let node = self.node(id)?;
        if node.stage == LifecycleStage::Mounted {
            Ok(node)
        } else {
            Err(TreeError::NotMounted(id))
        }
    }

    /// Takes the widget out of its node for the duration of a callback.
    pub(crate) fn lend_widget(&mut self, id: NodeId) -> Result<Box<dyn Widget>, TreeError> {
        self.node_mut(id)?.widget.take().ok_or(TreeError::Busy(id))
    }

    pub(crate) fn return_widget(&mut self, id: NodeId, widget: Box<dyn Widget>) {
        if let Ok(node) = self.node_mut(id) {
            node.widget = Some(widget);
        }
    }

    // -- Topology getters --

    /// The mounted root, if any.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    /// Returns whether the tree holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The node's parent.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, TreeError> {
        Ok(self.node(id)?.parent)
    }

    /// The node's children, in order.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles.
    pub fn children(&self, id: NodeId) -> Result<&[NodeId], TreeError> {
        Ok(&self.node(id)?.children)
    }

    /// The node's tree path.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles.
    pub fn tree_path(&self, id: NodeId) -> Result<&TreePath, TreeError> {
        Ok(&self.node(id)?.path)
    }

    /// Distance from the root.
    pub(crate) fn depth(&self, id: NodeId) -> usize {
        self.node(id).map_or(0, |n| n.path.depth())
    }

    // -- Property getters --

    /// The node's lifecycle stage; [`Destroyed`](LifecycleStage::Destroyed)
    /// for stale handles.
    #[must_use]
    pub fn stage(&self, id: NodeId) -> LifecycleStage {
        self.node(id).map_or(LifecycleStage::Destroyed, |n| n.stage)
    }

    /// The node's widget name.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles.
    pub fn name(&self, id: NodeId) -> Result<&'static str, TreeError> {
        Ok(self.node(id)?.name)
    }

    /// The node's reconciliation key.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles.
    pub fn key(&self, id: NodeId) -> Result<Option<&Key>, TreeError> {
        Ok(self.node(id)?.key.as_ref())
    }

    /// The node's invalidation flags.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles.
    pub fn flags(&self, id: NodeId) -> Result<InvalidationFlags, TreeError> {
        Ok(self.node(id)?.flags)
    }

    /// Returns whether `kind` of the node is invalid.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles.
    pub fn is_invalid(&self, id: NodeId, kind: Invalidation) -> Result<bool, TreeError> {
        Ok(self.node(id)?.flags.get(kind))
    }

    /// The node's offset within its parent.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles.
    pub fn position(&self, id: NodeId) -> Result<Point, TreeError> {
        Ok(self.node(id)?.position)
    }

    /// The node's resolved size.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles.
    pub fn size(&self, id: NodeId) -> Result<Size, TreeError> {
        Ok(self.node(id)?.size)
    }

    /// The node's origin in root coordinates.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles.
    pub fn global_position(&self, id: NodeId) -> Result<Point, TreeError> {
        let mut node = self.node(id)?;
        let mut offset = node.position.to_vec2();
        while let Some(parent) = node.parent {
            node = self.node(parent)?;
            offset += node.position.to_vec2();
        }
        Ok(offset.to_point())
    }

    /// The node's border box in root coordinates.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles.
    pub fn global_bounds(&self, id: NodeId) -> Result<Rect, TreeError> {
        Ok(Rect::from_origin_size(self.global_position(id)?, self.size(id)?))
    }

    /// The last computed box config, without recomputing.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles.
    pub fn cached_box_config(&self, id: NodeId) -> Result<Option<BoxConfig>, TreeError> {
        Ok(self.node(id)?.box_config)
    }

    /// The constraints of the node's last layout.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles.
    pub fn previous_constraints(&self, id: NodeId) -> Result<Option<BoxConstraints>, TreeError> {
        Ok(self.node(id)?.previous_constraints)
    }

    /// The node's scroll state.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles.
    pub fn scroll(&self, id: NodeId) -> Result<ScrollState, TreeError> {
        Ok(self.node(id)?.scroll)
    }

    /// The node's effective style.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles.
    pub fn resolved_style(&self, id: NodeId) -> Result<&ResolvedStyle, TreeError> {
        Ok(&self.node(id)?.style.resolved)
    }

    /// The identified render object of the node, as last rendered.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles.
    pub fn content(&self, id: NodeId) -> Result<RenderObject, TreeError> {
        Ok(self.node(id)?.content.clone())
    }

    /// Borrows the node's widget as its concrete type.
    ///
    /// Returns `None` for stale handles, other types, or while the widget is
    /// inside one of its own callbacks.
    #[must_use]
    pub fn widget<W: Widget>(&self, id: NodeId) -> Option<&W> {
        let widget: &dyn Widget = self.node(id).ok()?.widget.as_deref()?;
        (widget as &dyn Any).downcast_ref::<W>()
    }

    /// Mutably borrows the node's widget as its concrete type.
    ///
    /// Mutation does not invalidate anything by itself; follow it with
    /// [`invalidate`](Self::invalidate).
    #[must_use]
    pub fn widget_mut<W: Widget>(&mut self, id: NodeId) -> Option<&mut W> {
        let widget: &mut dyn Widget = self.node_mut(id).ok()?.widget.as_deref_mut()?;
        (widget as &mut dyn Any).downcast_mut::<W>()
    }

    /// The node's event handlers, for registration and removal.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles.
    pub fn handlers(&mut self, id: NodeId) -> Result<&mut NodeHandlers, TreeError> {
        Ok(&mut self.node_mut(id)?.handlers)
    }

    // -- Dependency lookup --

    /// Walks up from `from` and returns the first provided `T`.
    pub(crate) fn lookup_dependency<T: Any>(&self, from: Option<NodeId>) -> Option<Rc<T>> {
        let mut current = from;
        while let Some(id) = current {
            let node = self.node(id).ok()?;
            if let Some(found) = node
                .provided
                .iter()
                .find_map(|p| Rc::clone(p).downcast::<T>().ok())
            {
                return Some(found);
            }
            current = node.parent;
        }
        None
    }

    // -- Events and inspection --

    /// Runs the handlers of one event. Handlers are taken out of the node
    /// while they run, so they cannot observe themselves.
    pub(crate) fn emit<E>(
        &mut self,
        id: NodeId,
        select: fn(&mut NodeHandlers) -> &mut Handlers<E>,
        event: &E,
    ) {
        let Ok(node) = self.node_mut(id) else {
            return;
        };
        let slot = select(&mut node.handlers);
        if slot.is_empty() {
            return;
        }
        let mut handlers = core::mem::take(slot);
        handlers.invoke(event, &mut EventCx::new(id, &mut self.requests));
        if let Ok(node) = self.node_mut(id) {
            *select(&mut node.handlers) = handlers;
        }
    }

    pub(crate) fn inspect(&mut self, id: NodeId, kind: InspectionKind) {
        self.tracer.inspect(self.tick_index, id, kind);
    }

    /// Shifts a node, deep-invalidating its render state on change.
    pub(crate) fn set_position(&mut self, id: NodeId, position: Point) {
        let Ok(node) = self.node_mut(id) else {
            return;
        };
        if node.position != position {
            node.position = position;
            self.mark_render_deep(id);
        }
    }

    /// Scrolls the node's content by `amount` times the configured speed.
    ///
    /// The offset is clamped to the node's scroll range; axes without
    /// scrolling stay at zero. Returns the applied offset.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles, [`TreeError::NotMounted`]
    /// before mounting.
    pub fn scroll_by(&mut self, id: NodeId, amount: Vec2) -> Result<Vec2, TreeError> {
        self.mounted(id)?;
        let speed = self.config.scroll_speed;
        let node = self.node_mut(id)?;
        let offset = node.scroll.clamp(node.scroll.offset + amount * speed);
        if offset != node.scroll.offset {
            node.scroll.offset = offset;
            self.mark_render_deep(id);
        }
        Ok(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::Element;

    struct Leaf;
    impl Widget for Leaf {}

    #[test]
    fn insert_reuses_slots_with_new_generation() {
        let mut tree = WidgetTree::new();
        let a = tree.mount_root(Element::new(Leaf)).unwrap();
        tree.destroy(a).unwrap();
        assert!(!tree.is_alive(a));
        let b = tree.mount_root(Element::new(Leaf)).unwrap();
        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert_eq!(tree.node(a).err(), Some(TreeError::Destroyed(a)));
        assert_eq!(tree.stage(a), LifecycleStage::Destroyed);
        assert_eq!(tree.stage(b), LifecycleStage::Mounted);
    }

    #[test]
    fn widget_downcast() {
        struct Other;
        impl Widget for Other {}
        let mut tree = WidgetTree::new();
        let root = tree.mount_root(Element::new(Leaf)).unwrap();
        assert!(tree.widget::<Leaf>(root).is_some());
        assert!(tree.widget::<Other>(root).is_none());
        assert!(tree.widget_mut::<Leaf>(root).is_some());
    }

    #[test]
    fn dependencies_resolve_nearest_ancestor_first() {
        let mut tree = WidgetTree::new();
        let outer = tree.insert(Element::new(Leaf).provide(1_u32), ScopeId::ROOT);
        let inner = tree.insert(
            Element::new(Leaf).provide(2_u32).provide(String::from("name")),
            ScopeId::ROOT,
        );
        tree.node_mut(inner).unwrap().parent = Some(outer);
        assert_eq!(tree.lookup_dependency::<u32>(Some(inner)).as_deref(), Some(&2));
        assert_eq!(tree.lookup_dependency::<u32>(Some(outer)).as_deref(), Some(&1));
        assert_eq!(
            tree.lookup_dependency::<String>(Some(inner)).as_deref().map(String::as_str),
            Some("name")
        );
        assert!(tree.lookup_dependency::<u64>(Some(inner)).is_none());
        assert!(tree.lookup_dependency::<u32>(None).is_none());
    }
}
