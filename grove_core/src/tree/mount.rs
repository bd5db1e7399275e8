// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mounting, reconciliation and destruction.
//!
//! A rebuild asks the widget for a fresh list of [`Element`]s and matches
//! each against the previous children: a keyed element against the first
//! node with the same key anywhere in the previous subtree (breadth first),
//! an unkeyed element against the unkeyed previous child at the same index.
//! A match of the same concrete widget type hands the old widget's state to
//! the new one before it mounts, and the old node's children become the
//! "previous children" of the new node's first build, so state survives at
//! every depth.
//!
//! Every element gets a fresh node. The previous children are abandoned and
//! destroyed only once the current pass has finished.

use std::any::Any;
use std::collections::VecDeque;

use super::WidgetTree;
use super::id::{NodeId, TreePath};
use crate::error::TreeError;
use crate::lifecycle::LifecycleStage;
use crate::style::ScopeId;
use crate::trace::InspectionKind;
use crate::widget::{BuildCx, Dependencies, Element, Key};

impl WidgetTree {
    /// Mounts `element` as the root, destroying any previous root.
    ///
    /// The whole subtree is built immediately; box config, layout and
    /// render happen on the next [`tick`](Self::tick).
    ///
    /// # Errors
    ///
    /// [`TreeError::Style`] if the root's style schema is inconsistent, and
    /// [`TreeError::Busy`] if the previous root cannot be destroyed.
    pub fn mount_root(&mut self, element: Element) -> Result<NodeId, TreeError> {
        if let Some(old) = self.root {
            self.destroy(old)?;
        }
        let id = self.insert(element, ScopeId::ROOT);
        if let Err(err) = self.mount_node(id, None, TreePath::root()) {
            tracing::warn!(node = ?id, %err, "root refused to mount");
            self.teardown(id);
            return Err(err);
        }
        self.root = Some(id);
        Ok(id)
    }

    /// Attaches an initialized node, injects its dependencies, resolves its
    /// style and builds it.
    fn mount_node(&mut self, id: NodeId, parent: Option<NodeId>, path: TreePath) -> Result<(), TreeError> {
        let node = self.node_mut(id)?;
        if node.stage != LifecycleStage::Initialized {
            return Err(TreeError::AlreadyMounted(id));
        }
        node.parent = parent;
        node.path = path;
        self.init_style(id)?;

        let mut widget = self.lend_widget(id)?;
        widget.inject(&Dependencies {
            tree: self,
            from: parent,
        });
        self.return_widget(id, widget);
        self.emit(id, |h| &mut h.dependencies_injected, &());

        let node = self.node_mut(id)?;
        node.stage = LifecycleStage::Mounted;
        tracing::debug!(node = ?id, name = node.name, path = %node.path, "mounted");
        self.rebuild(id)?;
        self.inspect(id, InspectionKind::Mounted);
        self.emit(id, |h| &mut h.mounted, &());
        Ok(())
    }

    /// Builds the node's children and reconciles them against the previous
    /// ones. Raises box config, layout and render state on the node.
    pub(crate) fn rebuild(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.mounted(id)?;
        self.inspect(id, InspectionKind::BuildStarted);
        let mut widget = self.lend_widget(id)?;
        let elements = widget.build(&mut BuildCx { tree: self, node: id });
        self.return_widget(id, widget);

        let node = self.node_mut(id)?;
        node.flags.build = false;
        let abandoned = core::mem::take(&mut node.children);
        let scope = node.style.created_scope.unwrap_or(node.style.scope);
        let path = node.path.clone();
        let previous = match node.predecessor.take() {
            Some(predecessor) => self
                .node(predecessor)
                .map(|n| n.children.clone())
                .unwrap_or_default(),
            None => abandoned.clone(),
        };

        let keyed = self.keyed_descendants(&previous);
        let mut used = Vec::new();
        let mut mounted = 0;
        for (index, mut element) in elements.into_iter().enumerate() {
            let matched = self.find_match(&element, index, &previous, &keyed, &used);
            if let Some(old) = matched {
                used.push(old);
                self.transfer_state(old, &mut element);
            }
            let child = self.insert(element, scope);
            if let Ok(node) = self.node_mut(child) {
                node.predecessor = matched;
            }
            match self.mount_node(child, Some(id), path.child(mounted)) {
                Ok(()) => {
                    self.node_mut(id)?.children.push(child);
                    mounted += 1;
                }
                Err(err) => {
                    tracing::warn!(node = ?id, %err, "child refused to mount; skipped");
                    self.teardown(child);
                }
            }
        }

        tracing::debug!(node = ?id, children = mounted, abandoned = abandoned.len(), "rebuilt");
        self.graveyard.extend(abandoned);
        self.mark_content_changed(id);
        self.inspect(id, InspectionKind::BuildFinished);
        self.report.rebuilt.push(id);
        Ok(())
    }

    /// Keyed nodes of the previous subtree, breadth first.
    fn keyed_descendants(&self, previous: &[NodeId]) -> Vec<(Key, NodeId)> {
        let mut keyed = Vec::new();
        let mut queue: VecDeque<NodeId> = previous.iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            let Ok(node) = self.node(id) else {
                continue;
            };
            if let Some(key) = &node.key {
                keyed.push((key.clone(), id));
            }
            queue.extend(node.children.iter().copied());
        }
        keyed
    }

    fn find_match(
        &self,
        element: &Element,
        index: usize,
        previous: &[NodeId],
        keyed: &[(Key, NodeId)],
        used: &[NodeId],
    ) -> Option<NodeId> {
        let candidate = match &element.key {
            Some(key) => keyed
                .iter()
                .find(|(k, id)| k == key && !used.contains(id))
                .map(|&(_, id)| id),
            None => previous.get(index).copied().filter(|old| {
                !used.contains(old) && self.node(*old).is_ok_and(|n| n.key.is_none())
            }),
        }?;
        let old: &dyn Any = self.node(candidate).ok()?.widget.as_deref()?;
        let new: &dyn Any = &*element.widget;
        (old.type_id() == new.type_id()).then_some(candidate)
    }

    fn transfer_state(&mut self, old: NodeId, element: &mut Element) {
        let Some(widget) = self.node_mut(old).ok().and_then(|n| n.widget.as_mut()) else {
            return;
        };
        if let Some(state) = widget.take_state() {
            tracing::trace!(from = ?old, "state transferred");
            element.widget.restore_state(state);
        }
    }

    // -- Destruction --

    /// Destroys a node and its subtree, children first.
    ///
    /// The node is detached from its parent, which then has to rebuild its
    /// box config, layout and render state. Destroying an already destroyed
    /// node has no effect beyond the reported error.
    ///
    /// # Errors
    ///
    /// [`TreeError::Destroyed`] for stale handles, [`TreeError::Busy`] while
    /// the node is inside one of its own callbacks.
    pub fn destroy(&mut self, id: NodeId) -> Result<(), TreeError> {
        let node = self
            .node(id)
            .inspect_err(|err| tracing::warn!(node = ?id, %err, "destroy refused"))?;
        if node.widget.is_none() {
            let err = TreeError::Busy(id);
            tracing::warn!(node = ?id, %err, "destroy refused");
            return Err(err);
        }
        if let Some(parent) = node.parent
            && let Ok(parent_node) = self.node_mut(parent)
            && let Some(pos) = parent_node.children.iter().position(|&c| c == id)
        {
            parent_node.children.remove(pos);
            self.mark_content_changed(parent);
        }
        self.teardown(id);
        Ok(())
    }

    /// Destroys a subtree without any checks.
    pub(crate) fn teardown(&mut self, id: NodeId) {
        let children = self.node(id).map(|n| n.children.clone()).unwrap_or_default();
        for child in children {
            self.teardown(child);
        }
        self.emit(id, |h| &mut h.destroy, &());
        self.inspect(id, InspectionKind::Destroyed);

        let Some(slot) = self
            .slots
            .get_mut(id.idx as usize)
            .filter(|s| s.generation == id.generation)
        else {
            return;
        };
        let Some(mut node) = slot.node.take() else {
            return;
        };
        // A retired generation would alias a handle already handed out.
        if let Some(next) = slot.generation.checked_add(1) {
            slot.generation = next;
            self.free_list.push(id.idx);
        }
        node.stage = LifecycleStage::Destroyed;
        if let Some(widget) = node.widget.as_mut() {
            widget.destroyed();
        }
        node.content.replace_children(Vec::new());
        self.drop_style(id, node.style.created_scope);
        self.pending.remove_key(id.idx);
        if self.root == Some(id) {
            self.root = None;
        }
        self.report.destroyed.push(id);
        tracing::debug!(node = ?id, name = node.name, "destroyed");
    }

    /// Destroys the children abandoned by the rebuilds of the last pass.
    pub(crate) fn flush_graveyard(&mut self) -> usize {
        let graveyard = core::mem::take(&mut self.graveyard);
        let mut destroyed = 0;
        for id in graveyard {
            if self.is_alive(id) {
                self.teardown(id);
                destroyed += 1;
            }
        }
        destroyed
    }

    /// Returns whether the node is still reachable from the root.
    pub(crate) fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            let Ok(node) = self.node(current) else {
                return false;
            };
            match node.parent {
                None => return self.root == Some(current),
                Some(parent) => {
                    let Ok(parent_node) = self.node(parent) else {
                        return false;
                    };
                    if !parent_node.children.contains(&current) {
                        return false;
                    }
                    current = parent;
                }
            }
        }
    }
}
