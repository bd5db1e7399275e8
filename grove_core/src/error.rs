// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recoverable misuse faults reported by the tree.

use crate::lifecycle::Invalidation;
use crate::style::StyleError;
use crate::tree::NodeId;

/// A lifecycle operation that was refused.
///
/// Every variant leaves the tree unchanged. Violations that would leave the
/// model inconsistent (an infinite minimum constraint, an opacity outside
/// `[0, 1]`) panic instead.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum TreeError {
    /// The node exists but is not mounted yet.
    #[error("node {0:?} is not mounted")]
    NotMounted(NodeId),
    /// The handle refers to a destroyed node.
    #[error("node {0:?} was destroyed")]
    Destroyed(NodeId),
    /// The flag was already raised.
    #[error("{kind:?} of node {node:?} is already invalid")]
    AlreadyInvalid {
        /// The node concerned.
        node: NodeId,
        /// The flag that was already set.
        kind: Invalidation,
    },
    /// Layout was requested for a node that is currently laying out.
    #[error("layout of node {0:?} re-entered while it was in progress")]
    ReentrantLayout(NodeId),
    /// The node's widget is lent out to one of its own callbacks.
    #[error("node {0:?} is busy in one of its own callbacks")]
    Busy(NodeId),
    /// The node was already mounted once.
    #[error("node {0:?} is already mounted")]
    AlreadyMounted(NodeId),
    /// A pass needs a root but none is mounted.
    #[error("the tree has no root")]
    NoRoot,
    /// The style schema of a node could not be assembled.
    #[error(transparent)]
    Style(#[from] StyleError),
}
