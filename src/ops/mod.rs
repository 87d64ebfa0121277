// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Recstack-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Recstack and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tree and navigation-stack operations on a single session.
//!
//! These are the only functions that change a session's tree shape or path. Each one either
//! applies fully or returns a [`NavError`] and leaves the session untouched, so a refused
//! operation is a no-op the caller can report.

use std::fmt;

use crate::model::{Node, NodeId, Session};
use crate::ErrorKind;

/// Resets `session` to a single fresh root: id 0, path `[0]`, counter 1, max depth 0.
pub fn create_root(session: &mut Session) {
    session.install_root();
}

/// Spawns a child of the current node for `token` and descends into it.
///
/// The new node is appended to the current node's children and pushed on the path, so it
/// becomes current. Creating and navigating are a single step; there is no way to create a
/// child without opening it.
pub fn create_child(session: &mut Session, token: &str) -> NodeId {
    let parent_id = session.current_id();
    let depth = session.current().depth().saturating_add(1);
    let child_id = session.allocate_node_id();

    session.insert_node(Node::new(child_id, token, depth));
    session.current_mut().push_child(child_id);
    debug_assert!(session.node(parent_id).is_some_and(|p| p.has_child(child_id)));
    session.path_mut().push(child_id);
    child_id
}

/// Saves the current node's text.
///
/// Both values are trimmed. An empty question keeps the existing one; the answer is always
/// replaced.
pub fn update_current(session: &mut Session, question: &str, answer: &str) {
    let question = question.trim();
    let current = session.current_mut();
    if !question.is_empty() {
        current.set_question(question);
    }
    current.set_answer(answer.trim());
}

/// Steps back to the parent. Refused at the root; never deletes the node being left.
pub fn pop(session: &mut Session) -> Result<NodeId, NavError> {
    if session.path().len() <= 1 {
        return Err(NavError::AtRoot);
    }
    session.path_mut().pop();
    Ok(session.current_id())
}

/// Truncates the path so that `path[index]` becomes current (breadcrumb navigation).
///
/// Can discard several frames at once. The discarded nodes stay in the store and remain
/// reachable through their parents' children.
pub fn jump_to(session: &mut Session, index: usize) -> Result<NodeId, NavError> {
    let len = session.path().len();
    if index >= len {
        return Err(NavError::IndexOutOfRange { index, len });
    }
    session.path_mut().truncate(index + 1);
    Ok(session.current_id())
}

/// Re-opens an existing child of the current node without creating anything.
///
/// Callers must only offer ids taken from the current node's children; anything else is
/// refused.
pub fn descend_into(session: &mut Session, child_id: NodeId) -> Result<NodeId, NavError> {
    let parent = session.current();
    if !parent.has_child(child_id) {
        return Err(NavError::NotAChild {
            parent: parent.id(),
            child: child_id,
        });
    }
    if session.node(child_id).is_none() {
        return Err(NavError::MissingNode { node_id: child_id });
    }
    session.path_mut().push(child_id);
    Ok(child_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavError {
    AtRoot,
    IndexOutOfRange { index: usize, len: usize },
    NotAChild { parent: NodeId, child: NodeId },
    MissingNode { node_id: NodeId },
}

impl NavError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AtRoot | Self::IndexOutOfRange { .. } => ErrorKind::InvalidStateTransition,
            Self::NotAChild { .. } | Self::MissingNode { .. } => ErrorKind::NotFound,
        }
    }
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtRoot => f.write_str("already at the root; nothing to go back to"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "path index {index} out of range (path length {len})")
            }
            Self::NotAChild { parent, child } => {
                write!(f, "node {child} is not a child of node {parent}")
            }
            Self::MissingNode { node_id } => write!(f, "node not found (id={node_id})"),
        }
    }
}

impl std::error::Error for NavError {}
