// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Recstack-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Recstack and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only queries over sessions and the registry.
//!
//! Queries provide derived views (breadcrumbs, listings, exports) that power front ends. None
//! of them mutate state.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::model::{Node, NodeId, Session, SessionId, SessionRegistry};
use crate::tokenize::tokenize;

const CRUMB_MAX_CHARS: usize = 30;
const CRUMB_KEEP_CHARS: usize = 27;
const CRUMB_ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub index: usize,
    pub node_id: NodeId,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: SessionId,
    pub created: u64,
    pub root_question: String,
    pub node_count: usize,
    pub max_depth_reached: u32,
    pub is_current: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub current_depth: u32,
    pub total_nodes: usize,
    pub max_depth_reached: u32,
    pub can_go_back: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Edge {
    pub parent: NodeId,
    pub child: NodeId,
}

/// One crumb per path element; the last one is active.
pub fn breadcrumbs(session: &Session) -> Vec<Breadcrumb> {
    let last = session.path().len().saturating_sub(1);
    session
        .path()
        .iter()
        .enumerate()
        .map(|(index, node_id)| Breadcrumb {
            index,
            node_id: *node_id,
            label: session
                .node(*node_id)
                .map(|node| crumb_label(node.question()))
                .unwrap_or_default(),
            active: index == last,
        })
        .collect()
}

fn crumb_label(question: &str) -> String {
    if question.chars().count() <= CRUMB_MAX_CHARS {
        return question.to_owned();
    }
    let mut label = question.chars().take(CRUMB_KEEP_CHARS).collect::<String>();
    label.push_str(CRUMB_ELLIPSIS);
    label
}

/// Sessions most-recent-first.
pub fn session_list(registry: &SessionRegistry) -> Vec<SessionSummary> {
    let current = registry.current_session_id();
    registry
        .sessions_by_recency()
        .into_iter()
        .map(|session| SessionSummary {
            id: session.id().clone(),
            created: session.created(),
            root_question: session.root().question().to_owned(),
            node_count: session.total_nodes(),
            max_depth_reached: session.max_depth_reached(),
            is_current: session.id() == current,
        })
        .collect()
}

pub fn stats(session: &Session) -> SessionStats {
    SessionStats {
        current_depth: session.current().depth(),
        total_nodes: session.total_nodes(),
        max_depth_reached: session.max_depth_reached(),
        can_go_back: session.path().len() > 1,
    }
}

/// Children of the current node that already carry an answer, in stored order.
pub fn resolved_children(session: &Session) -> Vec<&Node> {
    session
        .current()
        .children()
        .iter()
        .filter_map(|child_id| session.node(*child_id))
        .filter(|child| child.is_answered())
        .collect()
}

/// Tokens offered as sub-questions of the current node.
pub fn candidate_tokens(session: &Session) -> Vec<String> {
    tokenize(session.current().answer())
}

/// Parent -> child edges, by parent id then child order.
pub fn edges(session: &Session) -> Vec<Edge> {
    session
        .nodes()
        .values()
        .flat_map(|node| {
            node.children().iter().map(move |child| Edge {
                parent: node.id(),
                child: *child,
            })
        })
        .collect()
}

/// Depth-first text outline of the tree, starting at the root.
///
/// Each node emits a `Q:` line and, when answered, an `A:` line, indented two spaces per
/// depth level.
pub fn export_text(session: &Session) -> String {
    let mut out = String::new();
    let mut seen = BTreeSet::new();
    let mut stack = vec![session.root().id()];

    while let Some(node_id) = stack.pop() {
        if !seen.insert(node_id) {
            continue;
        }
        let Some(node) = session.node(node_id) else {
            continue;
        };

        let indent = "  ".repeat(usize::try_from(node.depth()).unwrap_or(0));
        let _ = writeln!(out, "{indent}Q: {}", node.question());
        if node.is_answered() {
            let _ = writeln!(out, "{indent}A: {}", node.answer());
        }

        // Reverse so the first child is popped first.
        stack.extend(node.children().iter().rev().copied());
    }

    out
}
