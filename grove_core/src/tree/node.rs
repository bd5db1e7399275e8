// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node records stored in the arena.

use std::any::Any;
use std::rc::Rc;

use kurbo::{Point, Size, Vec2};

use super::id::{NodeId, TreePath};
use crate::event::NodeHandlers;
use crate::geometry::{BoxConfig, BoxConstraints};
use crate::lifecycle::{InvalidationFlags, LifecycleStage};
use crate::render::RenderObject;
use crate::style::{MergedSupport, ResolvedStyle, ScopeId, StyleProperties, StyleRule};
use crate::widget::{Key, Widget};

/// Scroll position and range of a node.
///
/// The offset is the translation applied to the content. It stays within
/// `[min_offset, max_offset]`, where `max_offset` is zero and `min_offset`
/// is how far the content overhangs the box (negative or zero), on axes with
/// scrolling enabled. On other axes all three are zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollState {
    /// Current translation of the content.
    pub offset: Vec2,
    /// Most negative allowed offset.
    pub min_offset: Vec2,
    /// Most positive allowed offset.
    pub max_offset: Vec2,
}

impl ScrollState {
    pub(crate) fn clamp(&self, offset: Vec2) -> Vec2 {
        Vec2::new(
            offset.x.clamp(self.min_offset.x, self.max_offset.x),
            offset.y.clamp(self.min_offset.y, self.max_offset.y),
        )
    }
}

/// Style-related state of a node.
#[derive(Debug, Default)]
pub(crate) struct NodeStyle {
    /// Scope the node's own rules are looked up in.
    pub(crate) scope: ScopeId,
    /// Scope opened for the node's descendants, if any.
    pub(crate) created_scope: Option<ScopeId>,
    pub(crate) classes: Vec<String>,
    pub(crate) pseudo_classes: Vec<String>,
    pub(crate) direct: StyleProperties,
    /// Rules to register in `created_scope` at mount.
    pub(crate) provided_rules: Vec<StyleRule>,
    /// Currently matched rules, compared by identity.
    pub(crate) matched: Vec<Rc<StyleRule>>,
    pub(crate) support: MergedSupport,
    pub(crate) resolved: ResolvedStyle,
}

pub(crate) struct Node {
    /// `None` while lent out to one of its own callbacks.
    pub(crate) widget: Option<Box<dyn Widget>>,
    pub(crate) name: &'static str,
    pub(crate) key: Option<Key>,

    // -- Topology --
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) path: TreePath,
    /// The abandoned node this one replaced during reconciliation; its
    /// children are the previous children of the first build.
    pub(crate) predecessor: Option<NodeId>,

    // -- Lifecycle --
    pub(crate) stage: LifecycleStage,
    pub(crate) flags: InvalidationFlags,

    // -- Layout --
    pub(crate) layouting: bool,
    pub(crate) layouted: bool,
    pub(crate) position: Point,
    pub(crate) size: Size,
    pub(crate) box_config: Option<BoxConfig>,
    pub(crate) previous_constraints: Option<BoxConstraints>,
    pub(crate) scroll: ScrollState,

    // -- Style --
    pub(crate) style: NodeStyle,

    // -- Render cache --
    /// The identified object standing for this node; lives as long as it.
    pub(crate) content: RenderObject,
    /// What the widget returned from its last render.
    pub(crate) main_content: Option<RenderObject>,
    pub(crate) debug_layout: bool,

    // -- Injection and events --
    pub(crate) provided: Vec<Rc<dyn Any>>,
    pub(crate) handlers: NodeHandlers,
}
