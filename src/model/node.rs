// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Recstack-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Recstack and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::ids::NodeId;

/// Question label given to a session's root until the user edits it.
pub const ROOT_QUESTION: &str = "Root";

/// One question/answer pair in a session tree.
///
/// `depth` and `id` are fixed at creation. `children` only grows, in creation order; the
/// mutators that touch it are crate-private so the tree shape can only change through
/// [`crate::ops`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    question: String,
    answer: String,
    children: Vec<NodeId>,
    depth: u32,
}

impl Node {
    pub fn new(id: NodeId, question: impl Into<String>, depth: u32) -> Self {
        Self {
            id,
            question: question.into(),
            answer: String::new(),
            children: Vec::new(),
            depth,
        }
    }

    pub fn root(id: NodeId) -> Self {
        Self::new(id, ROOT_QUESTION, 0)
    }

    /// Rebuilds a node from decoded storage.
    pub fn from_parts(
        id: NodeId,
        question: impl Into<String>,
        answer: impl Into<String>,
        children: Vec<NodeId>,
        depth: u32,
    ) -> Self {
        Self {
            id,
            question: question.into(),
            answer: answer.into(),
            children,
            depth,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn is_answered(&self) -> bool {
        !self.answer.is_empty()
    }

    pub fn has_child(&self, child: NodeId) -> bool {
        self.children.contains(&child)
    }

    pub(crate) fn set_question(&mut self, question: impl Into<String>) {
        self.question = question.into();
    }

    pub(crate) fn set_answer(&mut self, answer: impl Into<String>) {
        self.answer = answer.into();
    }

    pub(crate) fn push_child(&mut self, child: NodeId) {
        self.children.push(child);
    }
}
