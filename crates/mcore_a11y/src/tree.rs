//! Snapshot validation
//!
//! A host snapshot is a flat node list plus a root and a focus id. Before it
//! is published it must form a tree: every child id resolves within the same
//! batch, each node has at most one parent, and there are no cycles.

use std::collections::VecDeque;

use accesskit::{NodeId, Tree, TreeUpdate};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::node::A11yNode;
use crate::{A11yError, Result};

/// What to do with a snapshot that is not a well-formed tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
    /// Repair the snapshot and publish what remains
    #[default]
    Normalize,
    /// Refuse the snapshot; the previous tree stays published
    Reject,
}

/// Repairs applied while normalizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Repairs {
    pub duplicate_nodes: usize,
    pub self_references: usize,
    pub dangling_children: usize,
    /// Second parents and cycle edges
    pub reparented_children: usize,
    pub unreachable_nodes: usize,
    pub focus_fallback: bool,
}

impl Repairs {
    pub fn is_clean(&self) -> bool {
        *self == Repairs::default()
    }
}

/// A validated tree, nodes in breadth-first order from the root
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedTree {
    root: u64,
    focus: u64,
    nodes: Vec<A11yNode>,
    index: FxHashMap<u64, usize>,
}

impl PublishedTree {
    pub fn root(&self) -> u64 {
        self.root
    }

    pub fn focus(&self) -> u64 {
        self.focus
    }

    pub(crate) fn set_focus(&mut self, focus: u64) {
        self.focus = focus;
    }

    pub fn nodes(&self) -> &[A11yNode] {
        &self.nodes
    }

    pub fn get(&self, id: u64) -> Option<&A11yNode> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: u64) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Full-tree update for an AccessKit platform adapter
    pub fn to_tree_update(&self) -> TreeUpdate {
        TreeUpdate {
            nodes: self
                .nodes
                .iter()
                .map(|node| (NodeId(node.id), node.to_accesskit()))
                .collect(),
            tree: Some(Tree::new(NodeId(self.root))),
            focus: NodeId(self.focus),
        }
    }
}

/// Validate a snapshot under `policy`.
pub fn build_tree(
    nodes: Vec<A11yNode>,
    root: u64,
    focus: u64,
    policy: ValidationPolicy,
) -> Result<(PublishedTree, Repairs)> {
    let reject = policy == ValidationPolicy::Reject;
    let mut repairs = Repairs::default();

    // First occurrence of an id wins
    let mut by_id: FxHashMap<u64, A11yNode> = FxHashMap::default();
    let mut order: Vec<u64> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if by_id.contains_key(&node.id) {
            if reject {
                return Err(A11yError::DuplicateNode(node.id));
            }
            debug!("a11y: dropping duplicate node {}", node.id);
            repairs.duplicate_nodes += 1;
            continue;
        }
        order.push(node.id);
        by_id.insert(node.id, node);
    }

    if !by_id.contains_key(&root) {
        return Err(A11yError::MissingRoot(root));
    }

    // Breadth-first from the root; the first parent to claim a child keeps it
    let mut claimed: FxHashSet<u64> = FxHashSet::default();
    claimed.insert(root);
    let mut queue = VecDeque::from([root]);
    let mut tree_nodes: Vec<A11yNode> = Vec::with_capacity(by_id.len());

    while let Some(id) = queue.pop_front() {
        let Some(mut node) = by_id.remove(&id) else {
            continue;
        };
        let mut kept = Vec::with_capacity(node.children.len());
        for &child in &node.children {
            if child == id {
                if reject {
                    return Err(A11yError::SelfReference(id));
                }
                debug!("a11y: node {id} lists itself as a child");
                repairs.self_references += 1;
            } else if !by_id.contains_key(&child) && !claimed.contains(&child) {
                if reject {
                    return Err(A11yError::UnknownChild { parent: id, child });
                }
                debug!("a11y: node {id} references missing child {child}");
                repairs.dangling_children += 1;
            } else if !claimed.insert(child) {
                if reject {
                    return Err(A11yError::ChildAlreadyParented { parent: id, child });
                }
                debug!("a11y: dropping second parent {id} of node {child}");
                repairs.reparented_children += 1;
            } else {
                kept.push(child);
                queue.push_back(child);
            }
        }
        node.children = kept;
        tree_nodes.push(node);
    }

    if !by_id.is_empty() {
        if reject {
            let first = order.iter().find(|id| by_id.contains_key(id)).copied();
            return Err(A11yError::UnreachableNode(first.unwrap_or_default()));
        }
        debug!("a11y: pruning {} unreachable nodes", by_id.len());
        repairs.unreachable_nodes = by_id.len();
    }

    let index: FxHashMap<u64, usize> = tree_nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id, i))
        .collect();

    let focus = if index.contains_key(&focus) {
        focus
    } else {
        if reject {
            return Err(A11yError::UnknownFocus(focus));
        }
        debug!("a11y: focus {focus} not in tree, using root {root}");
        repairs.focus_fallback = true;
        root
    };

    Ok((
        PublishedTree {
            root,
            focus,
            nodes: tree_nodes,
            index,
        },
        repairs,
    ))
}
