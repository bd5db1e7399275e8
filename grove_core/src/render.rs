// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identity-bearing render objects.
//!
//! A [`RenderObject`] is a cheap handle to a shared node of drawable content.
//! Cloning the handle keeps the identity; [`RenderObject::same_identity`]
//! compares identities, not contents.
//!
//! Every widget node owns one long-lived *identified* render object for its
//! whole mounted life. When the node re-renders, the children of that object
//! are replaced in place, so any parent that embedded it keeps showing the
//! up-to-date content without re-rendering itself.
//!
//! Each object carries a small internal cache: a revision counter and an
//! opaque slot consumers (a backend keeping tessellated paths or textures,
//! say) may attach data to. [`RenderObject::invalidate_cache`] bumps the
//! revision and clears the slot. Replacing children does the same.

use std::any::Any;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use kurbo::{Affine, Point, Rect};

use crate::paint::{Paint, TextPaint};
use crate::tree::NodeId;

/// What a render object draws or how it affects its children.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderKind {
    /// Groups children.
    Container,
    /// Groups the content of the given widget node.
    Identified(NodeId),
    /// Transforms children.
    Transform(Affine),
    /// Multiplies the alpha of children by a factor in `[0, 1]`.
    Opacity(f64),
    /// Clips children to a rectangle.
    Clip(Rect),
    /// A rectangle.
    Rect {
        /// Geometry.
        rect: Rect,
        /// Fill and stroke.
        paint: Paint,
    },
    /// A line segment.
    Line {
        /// Start.
        from: Point,
        /// End.
        to: Point,
        /// Stroke (fill is ignored).
        paint: Paint,
    },
    /// A circle.
    Circle {
        /// Center.
        center: Point,
        /// Radius.
        radius: f64,
        /// Fill and stroke.
        paint: Paint,
    },
    /// A run of text; `origin` is its top-left corner.
    Text {
        /// Content.
        text: String,
        /// Top-left corner.
        origin: Point,
        /// Color and size.
        paint: TextPaint,
    },
}

struct Inner {
    kind: RenderKind,
    children: RefCell<Vec<RenderObject>>,
    revision: Cell<u64>,
    cache: RefCell<Option<Box<dyn Any>>>,
}

/// A shared, identity-bearing node of drawable content.
#[derive(Clone)]
pub struct RenderObject(Rc<Inner>);

impl fmt::Debug for RenderObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderObject")
            .field("kind", &self.0.kind)
            .field("children", &self.0.children.borrow())
            .field("revision", &self.0.revision.get())
            .finish_non_exhaustive()
    }
}

impl RenderObject {
    fn new(kind: RenderKind, children: Vec<Self>) -> Self {
        Self(Rc::new(Inner {
            kind,
            children: RefCell::new(children),
            revision: Cell::new(0),
            cache: RefCell::new(None),
        }))
    }

    // -- Constructors --

    /// A plain group.
    #[must_use]
    pub fn container(children: Vec<Self>) -> Self {
        Self::new(RenderKind::Container, children)
    }

    /// The long-lived group for a widget node.
    #[must_use]
    pub fn identified(node: NodeId) -> Self {
        Self::new(RenderKind::Identified(node), Vec::new())
    }

    /// Children drawn through `transform`.
    #[must_use]
    pub fn transform(transform: Affine, children: Vec<Self>) -> Self {
        Self::new(RenderKind::Transform(transform), children)
    }

    /// Children drawn with their alpha multiplied by `opacity`.
    ///
    /// # Panics
    ///
    /// Panics if `opacity` is outside `[0, 1]`.
    #[must_use]
    pub fn opacity(opacity: f64, children: Vec<Self>) -> Self {
        assert!(
            (0.0..=1.0).contains(&opacity),
            "opacity must be within [0, 1], got {opacity}"
        );
        Self::new(RenderKind::Opacity(opacity), children)
    }

    /// Children clipped to `rect`.
    #[must_use]
    pub fn clip(rect: Rect, children: Vec<Self>) -> Self {
        Self::new(RenderKind::Clip(rect), children)
    }

    /// A rectangle primitive.
    #[must_use]
    pub fn rect(rect: Rect, paint: Paint) -> Self {
        Self::new(RenderKind::Rect { rect, paint }, Vec::new())
    }

    /// A line primitive.
    #[must_use]
    pub fn line(from: Point, to: Point, paint: Paint) -> Self {
        Self::new(RenderKind::Line { from, to, paint }, Vec::new())
    }

    /// A circle primitive.
    #[must_use]
    pub fn circle(center: Point, radius: f64, paint: Paint) -> Self {
        Self::new(
            RenderKind::Circle {
                center,
                radius,
                paint,
            },
            Vec::new(),
        )
    }

    /// A text primitive.
    #[must_use]
    pub fn text(text: impl Into<String>, origin: Point, paint: TextPaint) -> Self {
        Self::new(
            RenderKind::Text {
                text: text.into(),
                origin,
                paint,
            },
            Vec::new(),
        )
    }

    // -- Access --

    /// What this object is.
    #[must_use]
    pub fn kind(&self) -> &RenderKind {
        &self.0.kind
    }

    /// The widget node this object stands for, if identified.
    #[must_use]
    pub fn node(&self) -> Option<NodeId> {
        match self.0.kind {
            RenderKind::Identified(node) => Some(node),
            _ => None,
        }
    }

    /// The children.
    ///
    /// # Panics
    ///
    /// Panics if the children are currently borrowed mutably.
    #[must_use]
    pub fn children(&self) -> Ref<'_, Vec<Self>> {
        self.0.children.borrow()
    }

    /// Mutable access to the children. Does not touch the cache.
    ///
    /// # Panics
    ///
    /// Panics if the children are currently borrowed.
    #[must_use]
    pub fn children_mut(&self) -> RefMut<'_, Vec<Self>> {
        self.0.children.borrow_mut()
    }

    /// Replaces all children and invalidates the cache.
    pub fn replace_children(&self, children: Vec<Self>) {
        *self.0.children.borrow_mut() = children;
        self.invalidate_cache();
    }

    /// Returns whether both handles refer to the same object.
    #[must_use]
    pub fn same_identity(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // -- Cache --

    /// Bumps the revision and drops any attached cache data.
    pub fn invalidate_cache(&self) {
        self.0.revision.set(self.0.revision.get() + 1);
        self.0.cache.borrow_mut().take();
    }

    /// Changes every time the cache is invalidated.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.0.revision.get()
    }

    /// Attaches consumer data, replacing what was there.
    pub fn store_cache<T: Any>(&self, value: T) {
        *self.0.cache.borrow_mut() = Some(Box::new(value));
    }

    /// Returns a copy of attached data of type `T`.
    #[must_use]
    pub fn cached<T: Any + Clone>(&self) -> Option<T> {
        self.0
            .cache
            .borrow()
            .as_ref()
            .and_then(|c| c.downcast_ref::<T>())
            .cloned()
    }

    /// Returns whether any data is attached.
    #[must_use]
    pub fn has_cache(&self) -> bool {
        self.0.cache.borrow().is_some()
    }

    // -- Queries --

    /// Bounding box of everything drawn, in the object's own coordinates.
    ///
    /// Transforms map child bounds through their affine; clips intersect.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        let own = match &self.0.kind {
            RenderKind::Rect { rect, .. } => Some(*rect),
            RenderKind::Line { from, to, .. } => Some(Rect::from_points(*from, *to)),
            RenderKind::Circle { center, radius, .. } => Some(Rect::new(
                center.x - radius,
                center.y - radius,
                center.x + radius,
                center.y + radius,
            )),
            RenderKind::Text { origin, .. } => Some(Rect::from_origin_size(*origin, (0.0, 0.0))),
            _ => None,
        };
        let children = self
            .children()
            .iter()
            .filter_map(Self::bounds)
            .reduce(|a, b| a.union(b));
        let merged = match (own, children) {
            (Some(a), Some(b)) => Some(a.union(b)),
            (a, b) => a.or(b),
        };
        match &self.0.kind {
            RenderKind::Transform(t) => merged.map(|r| t.transform_rect_bbox(r)),
            RenderKind::Clip(clip) => merged.map(|r| r.intersect(*clip)),
            _ => merged,
        }
    }

    /// Finds the identified object of `node` in this subtree.
    #[must_use]
    pub fn find_identified(&self, node: NodeId) -> Option<Self> {
        if self.node() == Some(node) {
            return Some(self.clone());
        }
        self.children()
            .iter()
            .find_map(|child| child.find_identified(node))
    }

    /// Number of objects in the subtree, including this one.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(Self::count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Color;

    fn square(x: f64) -> RenderObject {
        RenderObject::rect(Rect::new(x, 0.0, x + 10.0, 10.0), Paint::fill(Color::RED))
    }

    #[test]
    fn clones_share_identity() {
        let a = square(0.0);
        let b = a.clone();
        let c = square(0.0);
        assert!(a.same_identity(&b));
        assert!(!a.same_identity(&c));
    }

    #[test]
    fn replacing_children_invalidates_cache() {
        let group = RenderObject::identified(NodeId::dangling());
        group.store_cache(7_u32);
        let rev = group.revision();
        group.replace_children(vec![square(0.0)]);
        assert!(!group.has_cache());
        assert_eq!(group.revision(), rev + 1);
    }

    #[test]
    fn children_mut_keeps_cache() {
        let group = RenderObject::container(Vec::new());
        group.store_cache(String::from("memo"));
        group.children_mut().push(square(0.0));
        assert_eq!(group.cached::<String>().as_deref(), Some("memo"));
    }

    #[test]
    fn bounds_follow_transforms_and_clips() {
        let moved = RenderObject::transform(
            Affine::translate((5.0, 5.0)),
            vec![square(0.0), square(20.0)],
        );
        assert_eq!(moved.bounds(), Some(Rect::new(5.0, 5.0, 35.0, 15.0)));
        let clipped = RenderObject::clip(Rect::new(0.0, 0.0, 12.0, 12.0), vec![moved]);
        assert_eq!(clipped.bounds(), Some(Rect::new(5.0, 5.0, 12.0, 12.0)));
        assert_eq!(RenderObject::container(Vec::new()).bounds(), None);
    }

    #[test]
    #[should_panic(expected = "opacity must be within [0, 1]")]
    fn opacity_out_of_range_panics() {
        let _ = RenderObject::opacity(1.5, Vec::new());
    }
}
