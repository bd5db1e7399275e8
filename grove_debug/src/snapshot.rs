// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON snapshots of a widget tree.
//!
//! [`snapshot`] walks a [`WidgetTree`] from its root and describes every
//! mounted node: widget name, tree path, key, geometry, pending
//! invalidations and scroll state. The result nests children under their
//! parent, in child order.

use std::io::{self, Write};

use grove_core::{NodeId, WidgetTree};
use serde_json::{Value, json};

/// Describes the whole tree, or `null` without a mounted root.
#[must_use]
pub fn snapshot(tree: &WidgetTree) -> Value {
    tree.root().map_or(Value::Null, |root| snapshot_node(tree, root))
}

/// Describes `id` and its descendants, or `null` for a stale handle.
#[must_use]
pub fn snapshot_node(tree: &WidgetTree, id: NodeId) -> Value {
    let (Ok(name), Ok(path), Ok(flags)) = (tree.name(id), tree.tree_path(id), tree.flags(id)) else {
        return Value::Null;
    };
    let key = tree
        .key(id)
        .ok()
        .flatten()
        .map(|k| k.as_str().to_owned());
    let size = tree.size(id).ok();
    let position = tree.position(id).ok();
    let scroll = tree.scroll(id).ok();
    let children: Vec<Value> = tree
        .children(id)
        .map(|c| c.iter().map(|&child| snapshot_node(tree, child)).collect())
        .unwrap_or_default();

    json!({
        "id": { "index": id.index(), "generation": id.generation() },
        "name": name,
        "path": path.to_string(),
        "key": key,
        "stage": format!("{:?}", tree.stage(id)),
        "position": position.map(|p| [p.x, p.y]),
        "size": size.map(|s| [s.width, s.height]),
        "scroll": scroll.map(|s| [s.offset.x, s.offset.y]),
        "invalid": {
            "build": flags.build,
            "box_config": flags.box_config,
            "layout": flags.layout,
            "render_state": flags.render_state,
        },
        "children": children,
    })
}

/// Writes [`snapshot`] as pretty-printed JSON.
///
/// # Errors
///
/// Propagates write failures of `writer`.
pub fn write_snapshot(tree: &WidgetTree, writer: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &snapshot(tree))?;
    writeln!(writer)
}

/// Counts the nodes below and including the described root.
#[must_use]
pub fn node_count(snapshot: &Value) -> usize {
    snapshot.get("children").and_then(Value::as_array).map_or(
        usize::from(!snapshot.is_null()),
        |children| 1 + children.iter().map(node_count).sum::<usize>(),
    )
}

#[cfg(test)]
mod tests {
    use grove_core::widgets::{Column, Fixed};
    use grove_core::{BoxConstraints, Element};
    use kurbo::Size;

    use super::*;

    fn tree() -> WidgetTree {
        let mut tree = WidgetTree::new();
        tree.mount_root(Element::new(Column::new(|_| {
            vec![
                Element::new(Fixed::new(Size::new(10.0, 10.0))).key("first"),
                Element::new(Fixed::new(Size::new(20.0, 5.0))),
            ]
        })))
        .unwrap();
        tree
    }

    #[test]
    fn empty_tree_is_null() {
        assert_eq!(snapshot(&WidgetTree::new()), Value::Null);
        assert_eq!(node_count(&Value::Null), 0);
    }

    #[test]
    fn describes_settled_tree() {
        let mut tree = tree();
        tree.tick(BoxConstraints::UNBOUNDED).unwrap();
        let value = snapshot(&tree);
        assert_eq!(node_count(&value), 3);
        assert_eq!(value["name"], "Column");
        assert_eq!(value["path"], "/");
        assert_eq!(value["size"], json!([20.0, 15.0]));
        assert_eq!(value["invalid"]["layout"], false);

        let second = &value["children"][1];
        assert_eq!(second["path"], "/1");
        assert_eq!(second["position"], json!([0.0, 10.0]));
        assert_eq!(value["children"][0]["key"], "first");
        assert_eq!(second["key"], Value::Null);
    }

    #[test]
    fn pending_work_is_visible_before_the_first_tick() {
        let tree = tree();
        let value = snapshot(&tree);
        assert_eq!(node_count(&value), 3);
        assert_eq!(value["invalid"]["build"], false);
        assert_eq!(value["invalid"]["layout"], true);
    }

    #[test]
    fn writes_parseable_json() {
        let mut tree = tree();
        tree.tick(BoxConstraints::UNBOUNDED).unwrap();
        let mut out = Vec::new();
        write_snapshot(&tree, &mut out).unwrap();
        let parsed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, snapshot(&tree));
    }
}
