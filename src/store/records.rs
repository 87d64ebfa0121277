// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Recstack-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Recstack and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Wire formats for the three persisted generations and their conversion to the model.
//!
//! Field names are camelCase to stay byte-compatible with records written by earlier
//! versions of the tool. Node maps are keyed by integer ids, rendered as JSON strings.

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{
    IdError, InvariantError, Node, NodeId, RegistryError, Session, SessionId, SessionRegistry,
};
use crate::ErrorKind;

/// Generation 3: the session registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionsRecord {
    pub current_session_id: String,
    pub sessions: BTreeMap<String, SessionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub nodes: BTreeMap<u64, NodeRecord>,
    pub path: Vec<u64>,
    pub node_id_counter: u64,
    pub max_depth_reached: u32,
    /// Creation time, epoch milliseconds.
    pub created: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: u64,
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub children: Vec<u64>,
    pub depth: u32,
}

/// Generation 2: one implicit session, no registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeRecord {
    pub nodes: BTreeMap<u64, NodeRecord>,
    pub path: Vec<u64>,
    #[serde(default)]
    pub node_id_counter: u64,
    #[serde(default)]
    pub max_depth_reached: u32,
}

/// Generation 1: only the open path was kept; popped nodes were deleted outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackRecord {
    pub stack: Vec<StackNodeRecord>,
    #[serde(default)]
    pub node_id_counter: u64,
    #[serde(default)]
    pub max_depth_reached: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_nodes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackNodeRecord {
    pub id: u64,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub depth: Option<u32>,
    /// Ignored on load: it may name nodes the old format already discarded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
}

#[derive(Debug)]
pub enum RecordError {
    /// The stored bytes are not text.
    InvalidUtf8(std::str::Utf8Error),
    Json(serde_json::Error),
    InvalidId {
        field: &'static str,
        value: String,
        source: IdError,
    },
    Invariant {
        session_id: Option<String>,
        source: InvariantError,
    },
    Registry(RegistryError),
    EmptyStack,
    DuplicateStackNode {
        node_id: u64,
    },
}

impl RecordError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::CorruptRecord
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUtf8(source) => write!(f, "not valid UTF-8: {source}"),
            Self::Json(source) => write!(f, "malformed JSON: {source}"),
            Self::InvalidId {
                field,
                value,
                source,
            } => write!(f, "invalid id for {field}: {value:?}: {source}"),
            Self::Invariant {
                session_id: Some(session_id),
                source,
            } => write!(f, "session {session_id} is inconsistent: {source}"),
            Self::Invariant {
                session_id: None,
                source,
            } => write!(f, "tree is inconsistent: {source}"),
            Self::Registry(source) => write!(f, "registry is inconsistent: {source}"),
            Self::EmptyStack => f.write_str("legacy stack is empty"),
            Self::DuplicateStackNode { node_id } => {
                write!(f, "legacy stack lists node {node_id} twice")
            }
        }
    }
}

impl std::error::Error for RecordError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidUtf8(source) => Some(source),
            Self::Json(source) => Some(source),
            Self::InvalidId { source, .. } => Some(source),
            Self::Invariant { source, .. } => Some(source),
            Self::Registry(source) => Some(source),
            Self::EmptyStack | Self::DuplicateStackNode { .. } => None,
        }
    }
}

impl From<serde_json::Error> for RecordError {
    fn from(source: serde_json::Error) -> Self {
        Self::Json(source)
    }
}

pub fn registry_to_record(registry: &SessionRegistry) -> SessionsRecord {
    SessionsRecord {
        current_session_id: registry.current_session_id().to_string(),
        sessions: registry
            .sessions()
            .iter()
            .map(|(session_id, session)| (session_id.to_string(), session_to_record(session)))
            .collect(),
    }
}

pub fn registry_from_record(record: SessionsRecord) -> Result<SessionRegistry, RecordError> {
    let current_session_id = parse_session_id("currentSessionId", record.current_session_id)?;

    let mut sessions = BTreeMap::new();
    for (key, session_record) in record.sessions {
        let key = parse_session_id("sessions key", key)?;
        let session = session_from_record(session_record)?;
        sessions.insert(key, session);
    }

    SessionRegistry::from_parts(current_session_id, sessions).map_err(RecordError::Registry)
}

pub fn session_to_record(session: &Session) -> SessionRecord {
    SessionRecord {
        id: session.id().to_string(),
        nodes: nodes_to_records(session.nodes()),
        path: session.path().iter().map(|id| id.get()).collect(),
        node_id_counter: session.node_id_counter(),
        max_depth_reached: session.max_depth_reached(),
        created: session.created(),
    }
}

pub fn session_from_record(record: SessionRecord) -> Result<Session, RecordError> {
    let session_id = parse_session_id("sessions[].id", record.id)?;
    Session::from_parts(
        session_id.clone(),
        record.created,
        nodes_from_records(record.nodes),
        record.path.into_iter().map(NodeId::new).collect(),
        record.node_id_counter,
        record.max_depth_reached,
    )
    .map_err(|source| RecordError::Invariant {
        session_id: Some(session_id.into_string()),
        source,
    })
}

/// Decodes a Generation-2 tree as a session with the given identity.
pub fn tree_from_record(
    record: TreeRecord,
    session_id: SessionId,
    created: u64,
) -> Result<Session, RecordError> {
    Session::from_parts(
        session_id,
        created,
        nodes_from_records(record.nodes),
        record.path.into_iter().map(NodeId::new).collect(),
        record.node_id_counter,
        record.max_depth_reached,
    )
    .map_err(|source| RecordError::Invariant {
        session_id: None,
        source,
    })
}

pub fn session_to_tree_record(session: &Session) -> TreeRecord {
    TreeRecord {
        nodes: nodes_to_records(session.nodes()),
        path: session.path().iter().map(|id| id.get()).collect(),
        node_id_counter: session.node_id_counter(),
        max_depth_reached: session.max_depth_reached(),
    }
}

fn nodes_to_records(nodes: &BTreeMap<NodeId, Node>) -> BTreeMap<u64, NodeRecord> {
    nodes
        .iter()
        .map(|(node_id, node)| {
            (
                node_id.get(),
                NodeRecord {
                    id: node.id().get(),
                    question: node.question().to_owned(),
                    answer: node.answer().to_owned(),
                    children: node.children().iter().map(|id| id.get()).collect(),
                    depth: node.depth(),
                },
            )
        })
        .collect()
}

fn nodes_from_records(records: BTreeMap<u64, NodeRecord>) -> BTreeMap<NodeId, Node> {
    records
        .into_iter()
        .map(|(key, record)| {
            let node = Node::from_parts(
                NodeId::new(record.id),
                record.question,
                record.answer,
                record.children.into_iter().map(NodeId::new).collect(),
                record.depth,
            );
            (NodeId::new(key), node)
        })
        .collect()
}

fn parse_session_id(field: &'static str, value: String) -> Result<SessionId, RecordError> {
    SessionId::new(value.clone()).map_err(|source| RecordError::InvalidId {
        field,
        value,
        source,
    })
}
