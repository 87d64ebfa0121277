// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Recstack-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Recstack and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::ids::{NodeId, SessionId};
use super::node::Node;

/// One independent decomposition tree plus its navigation stack.
///
/// Invariants held at every point after construction:
/// - The nodes form one tree rooted at `path[0]`: every node is reached exactly once from the
///   root and sits one level below its parent.
/// - `path` is non-empty and names a single root-to-current chain (`path[i + 1]` is a child
///   of `path[i]`, one level deeper).
/// - `node_id_counter` is greater than every allocated node id.
/// - `max_depth_reached` never decreases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    created: u64,
    nodes: BTreeMap<NodeId, Node>,
    path: Vec<NodeId>,
    node_id_counter: u64,
    max_depth_reached: u32,
}

impl Session {
    /// Creates a session holding a single fresh root.
    pub fn new(id: SessionId, created: u64) -> Self {
        let mut session = Self {
            id,
            created,
            nodes: BTreeMap::new(),
            path: Vec::new(),
            node_id_counter: 0,
            max_depth_reached: 0,
        };
        session.install_root();
        session
    }

    /// Rebuilds a session from decoded storage, checking the tree and path invariants.
    ///
    /// The counter and the running max depth are raised to cover what the node store
    /// actually holds; everything else must already be consistent.
    pub fn from_parts(
        id: SessionId,
        created: u64,
        nodes: BTreeMap<NodeId, Node>,
        path: Vec<NodeId>,
        node_id_counter: u64,
        max_depth_reached: u32,
    ) -> Result<Self, InvariantError> {
        validate_tree(&nodes, &path)?;

        let next_free = nodes
            .keys()
            .next_back()
            .map(|id| id.get().saturating_add(1))
            .unwrap_or(0);
        let deepest = nodes.values().map(Node::depth).max().unwrap_or(0);

        Ok(Self {
            id,
            created,
            nodes,
            path,
            node_id_counter: node_id_counter.max(next_free),
            max_depth_reached: max_depth_reached.max(deepest),
        })
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Creation time in epoch milliseconds.
    pub fn created(&self) -> u64 {
        self.created
    }

    pub fn nodes(&self) -> &BTreeMap<NodeId, Node> {
        &self.nodes
    }

    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    pub fn path(&self) -> &[NodeId] {
        &self.path
    }

    pub fn current_id(&self) -> NodeId {
        self.path[self.path.len() - 1]
    }

    pub fn current(&self) -> &Node {
        &self.nodes[&self.current_id()]
    }

    pub fn root(&self) -> &Node {
        &self.nodes[&self.path[0]]
    }

    pub fn node_id_counter(&self) -> u64 {
        self.node_id_counter
    }

    pub fn max_depth_reached(&self) -> u32 {
        self.max_depth_reached
    }

    pub fn total_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Drops every node and installs a fresh root with id 0.
    pub(crate) fn install_root(&mut self) {
        let root_id = NodeId::ROOT;
        self.nodes.clear();
        self.nodes.insert(root_id, Node::root(root_id));
        self.path.clear();
        self.path.push(root_id);
        self.node_id_counter = root_id.get() + 1;
        self.max_depth_reached = 0;
    }

    pub(crate) fn current_mut(&mut self) -> &mut Node {
        let current_id = self.current_id();
        self.nodes
            .get_mut(&current_id)
            .unwrap_or_else(|| unreachable!("path names node {current_id} missing from store"))
    }

    pub(crate) fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    pub(crate) fn allocate_node_id(&mut self) -> NodeId {
        let node_id = NodeId::new(self.node_id_counter);
        self.node_id_counter = self.node_id_counter.saturating_add(1);
        node_id
    }

    pub(crate) fn insert_node(&mut self, node: Node) {
        self.max_depth_reached = self.max_depth_reached.max(node.depth());
        self.nodes.insert(node.id(), node);
    }

    pub(crate) fn path_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.path
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantError {
    EmptyPath,
    KeyMismatch { key: NodeId, node_id: NodeId },
    MissingNode { node_id: NodeId },
    DanglingChild { parent: NodeId, child: NodeId },
    RootDepth { node_id: NodeId, depth: u32 },
    BrokenPath { parent: NodeId, child: NodeId },
    DepthMismatch { node_id: NodeId, expected: u32, found: u32 },
    /// A node listed as a child more than once, by one parent or several. Cycles land here.
    SharedChild { parent: NodeId, child: NodeId },
    Unreachable { node_id: NodeId },
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPath => f.write_str("navigation path is empty"),
            Self::KeyMismatch { key, node_id } => {
                write!(f, "node stored under key {key} carries id {node_id}")
            }
            Self::MissingNode { node_id } => write!(f, "path names missing node {node_id}"),
            Self::DanglingChild { parent, child } => {
                write!(f, "node {parent} lists missing child {child}")
            }
            Self::RootDepth { node_id, depth } => {
                write!(f, "path root {node_id} has depth {depth}, expected 0")
            }
            Self::BrokenPath { parent, child } => {
                write!(f, "path step {parent} -> {child} is not a parent/child link")
            }
            Self::DepthMismatch {
                node_id,
                expected,
                found,
            } => write!(f, "node {node_id} has depth {found}, expected {expected}"),
            Self::SharedChild { parent, child } => {
                write!(f, "node {child} is reached again as a child of {parent}")
            }
            Self::Unreachable { node_id } => {
                write!(f, "node {node_id} is not reachable from the root")
            }
        }
    }
}

impl std::error::Error for InvariantError {}

fn validate_tree(nodes: &BTreeMap<NodeId, Node>, path: &[NodeId]) -> Result<(), InvariantError> {
    for (key, node) in nodes {
        if *key != node.id() {
            return Err(InvariantError::KeyMismatch {
                key: *key,
                node_id: node.id(),
            });
        }
        if let Some(child) = node.children().iter().find(|c| !nodes.contains_key(c)) {
            return Err(InvariantError::DanglingChild {
                parent: node.id(),
                child: *child,
            });
        }
    }

    let Some(first) = path.first() else {
        return Err(InvariantError::EmptyPath);
    };
    let root = nodes
        .get(first)
        .ok_or(InvariantError::MissingNode { node_id: *first })?;
    if root.depth() != 0 {
        return Err(InvariantError::RootDepth {
            node_id: root.id(),
            depth: root.depth(),
        });
    }

    for pair in path.windows(2) {
        let (parent_id, child_id) = (pair[0], pair[1]);
        let parent = nodes
            .get(&parent_id)
            .ok_or(InvariantError::MissingNode { node_id: parent_id })?;
        let child = nodes
            .get(&child_id)
            .ok_or(InvariantError::MissingNode { node_id: child_id })?;
        if !parent.has_child(child_id) {
            return Err(InvariantError::BrokenPath {
                parent: parent_id,
                child: child_id,
            });
        }
        let expected = parent.depth().saturating_add(1);
        if child.depth() != expected {
            return Err(InvariantError::DepthMismatch {
                node_id: child_id,
                expected,
                found: child.depth(),
            });
        }
    }

    let mut seen = BTreeSet::from([root.id()]);
    let mut stack = vec![root];
    while let Some(parent) = stack.pop() {
        let expected = parent.depth().saturating_add(1);
        for &child_id in parent.children() {
            if !seen.insert(child_id) {
                return Err(InvariantError::SharedChild {
                    parent: parent.id(),
                    child: child_id,
                });
            }
            let child = nodes
                .get(&child_id)
                .ok_or(InvariantError::MissingNode { node_id: child_id })?;
            if child.depth() != expected {
                return Err(InvariantError::DepthMismatch {
                    node_id: child_id,
                    expected,
                    found: child.depth(),
                });
            }
            stack.push(child);
        }
    }

    // Every stored node must hang off the root; orphans are not dropped.
    if let Some(orphan) = nodes.keys().find(|node_id| !seen.contains(node_id)) {
        return Err(InvariantError::Unreachable { node_id: *orphan });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{InvariantError, Session};
    use crate::model::{Node, NodeId, SessionId};

    fn sid() -> SessionId {
        SessionId::new("s1").unwrap()
    }

    fn chain() -> BTreeMap<NodeId, Node> {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            NodeId::new(0),
            Node::from_parts(NodeId::new(0), "Root", "a", vec![NodeId::new(1)], 0),
        );
        nodes.insert(
            NodeId::new(1),
            Node::from_parts(NodeId::new(1), "a", "", Vec::new(), 1),
        );
        nodes
    }

    #[test]
    fn new_session_has_single_root() {
        let session = Session::new(sid(), 10);
        assert_eq!(session.path(), &[NodeId::ROOT]);
        assert_eq!(session.node_id_counter(), 1);
        assert_eq!(session.max_depth_reached(), 0);
        assert_eq!(session.current().question(), "Root");
        assert_eq!(session.current().depth(), 0);
        assert_eq!(session.created(), 10);
    }

    #[test]
    fn from_parts_raises_counter_and_max_depth() {
        let session =
            Session::from_parts(sid(), 0, chain(), vec![NodeId::new(0), NodeId::new(1)], 0, 0)
                .unwrap();
        assert_eq!(session.node_id_counter(), 2);
        assert_eq!(session.max_depth_reached(), 1);
        assert_eq!(session.current_id(), NodeId::new(1));
    }

    #[test]
    fn from_parts_rejects_empty_path() {
        let err = Session::from_parts(sid(), 0, chain(), Vec::new(), 2, 1).unwrap_err();
        assert_eq!(err, InvariantError::EmptyPath);
    }

    #[test]
    fn from_parts_rejects_path_that_skips_a_link() {
        let mut nodes = chain();
        nodes.insert(
            NodeId::new(2),
            Node::from_parts(NodeId::new(2), "b", "", Vec::new(), 1),
        );
        let err = Session::from_parts(sid(), 0, nodes, vec![NodeId::new(0), NodeId::new(2)], 3, 1)
            .unwrap_err();
        assert_eq!(
            err,
            InvariantError::BrokenPath {
                parent: NodeId::new(0),
                child: NodeId::new(2)
            }
        );
    }

    #[test]
    fn from_parts_rejects_dangling_child() {
        let mut nodes = chain();
        nodes.remove(&NodeId::new(1));
        let err = Session::from_parts(sid(), 0, nodes, vec![NodeId::new(0)], 2, 1).unwrap_err();
        assert_eq!(
            err,
            InvariantError::DanglingChild {
                parent: NodeId::new(0),
                child: NodeId::new(1)
            }
        );
    }

    #[test]
    fn from_parts_rejects_key_mismatch() {
        let mut nodes = BTreeMap::new();
        nodes.insert(NodeId::new(5), Node::root(NodeId::new(0)));
        let err = Session::from_parts(sid(), 0, nodes, vec![NodeId::new(5)], 1, 0).unwrap_err();
        assert_eq!(
            err,
            InvariantError::KeyMismatch {
                key: NodeId::new(5),
                node_id: NodeId::new(0)
            }
        );
    }

    fn node(id: u64, children: &[u64], depth: u32) -> (NodeId, Node) {
        let children = children.iter().copied().map(NodeId::new).collect();
        (
            NodeId::new(id),
            Node::from_parts(NodeId::new(id), "q", "", children, depth),
        )
    }

    #[test]
    fn from_parts_rejects_cycle_back_to_root() {
        let nodes = BTreeMap::from([node(0, &[1], 0), node(1, &[0], 1)]);
        let err = Session::from_parts(sid(), 0, nodes, vec![NodeId::new(0)], 2, 1).unwrap_err();
        assert_eq!(
            err,
            InvariantError::SharedChild {
                parent: NodeId::new(1),
                child: NodeId::new(0)
            }
        );
    }

    #[test]
    fn from_parts_rejects_child_shared_by_two_parents() {
        let nodes = BTreeMap::from([
            node(0, &[1, 2], 0),
            node(1, &[3], 1),
            node(2, &[3], 1),
            node(3, &[], 2),
        ]);
        let err = Session::from_parts(sid(), 0, nodes, vec![NodeId::new(0)], 4, 2).unwrap_err();
        assert!(
            matches!(err, InvariantError::SharedChild { child, .. } if child == NodeId::new(3)),
            "got {err:?}"
        );
    }

    #[test]
    fn from_parts_rejects_off_path_depth_mismatch() {
        let nodes = BTreeMap::from([node(0, &[1, 2], 0), node(1, &[], 1), node(2, &[], 7)]);
        let err = Session::from_parts(sid(), 0, nodes, vec![NodeId::new(0), NodeId::new(1)], 3, 1)
            .unwrap_err();
        assert_eq!(
            err,
            InvariantError::DepthMismatch {
                node_id: NodeId::new(2),
                expected: 1,
                found: 7
            }
        );
    }

    #[test]
    fn from_parts_rejects_unreachable_node() {
        let mut nodes = chain();
        let (id, orphan) = node(2, &[], 4_000_000_000);
        nodes.insert(id, orphan);
        let err = Session::from_parts(sid(), 0, nodes, vec![NodeId::new(0)], 3, 1).unwrap_err();
        assert_eq!(
            err,
            InvariantError::Unreachable {
                node_id: NodeId::new(2)
            }
        );
    }
}
