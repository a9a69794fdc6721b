//! Error types for surface operations

use thiserror::Error;

use crate::surface::NodeId;

/// Errors reported by a [`Surface`](crate::Surface)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The node was removed or never existed
    #[error("node {0:?} not found")]
    NodeNotFound(NodeId),

    /// The operation needs a parent but the node has none
    #[error("node {0:?} is not attached to a parent")]
    Detached(NodeId),

    /// Inserting the node would make it its own ancestor
    #[error("cannot insert {node:?} under {parent:?}: would create a cycle")]
    HierarchyCycle { parent: NodeId, node: NodeId },

    /// The node does not hold an editable value
    #[error("node {0:?} is not a form control")]
    NotFormControl(NodeId),

    /// The document root cannot be removed or moved
    #[error("the document root cannot be removed or moved")]
    Root,

    /// The layout engine rejected the tree
    #[error("layout failed: {0}")]
    Layout(String),
}

/// Result type for surface operations
pub type Result<T> = std::result::Result<T, SurfaceError>;
