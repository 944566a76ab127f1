//! Accessibility tree synchronization for mcore
//!
//! The host hands over a flat snapshot of its UI nodes on every change. The
//! snapshot is validated into a tree, published to the platform host, and
//! platform actions are routed back through a single callback.

pub mod node;
pub mod sync;
pub mod tree;

pub use node::{A11yAction, A11yNode, A11yRole, ActionSet};
pub use sync::{AccessibilityHost, AccessibilitySync, ActionCallback, UpdateOutcome};
pub use tree::{build_tree, PublishedTree, Repairs, ValidationPolicy};

use thiserror::Error;

/// Accessibility errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum A11yError {
    #[error("root node {0} is not in the update")]
    MissingRoot(u64),

    #[error("node {0} appears more than once")]
    DuplicateNode(u64),

    #[error("node {0} lists itself as a child")]
    SelfReference(u64),

    #[error("node {parent} references unknown child {child}")]
    UnknownChild { parent: u64, child: u64 },

    #[error("node {child} already has a parent, cannot add it under {parent}")]
    ChildAlreadyParented { parent: u64, child: u64 },

    #[error("node {0} is not reachable from the root")]
    UnreachableNode(u64),

    #[error("focus node {0} is not in the tree")]
    UnknownFocus(u64),

    #[error("accessibility state is in use")]
    Busy,
}

pub type Result<T> = std::result::Result<T, A11yError>;
