// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Recstack-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Recstack and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Startup loading and forward migration of persisted state.
//!
//! `detect -> decode -> upgrade (until Sessions) -> install`. Generations are read newest
//! first and the first one that decodes wins; a record that fails to parse or validate is
//! reported as corrupt and treated as absent. A migrated source record is removed only after
//! the Generation-3 snapshot has been written, so a migration is never applied twice.

use std::collections::BTreeMap;
use std::fmt;

use super::kv::{KeyValueStore, StoreError};
use super::records::{
    registry_from_record, registry_to_record, tree_from_record, RecordError, SessionsRecord,
    StackRecord, TreeRecord,
};
use crate::model::{Node, NodeId, Session, SessionId, SessionRegistry};

pub const SESSIONS_KEY: &str = "recursiveStackSessions";
pub const TREE_KEY: &str = "recursiveStackTree";
pub const STACK_KEY: &str = "recursiveStack";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Generation {
    /// Flat array of the open path only (lossy).
    Stack = 1,
    /// Full node tree for a single implicit session.
    Tree = 2,
    /// Session registry; the current format.
    Sessions = 3,
}

impl Generation {
    pub const NEWEST_FIRST: [Generation; 3] =
        [Generation::Sessions, Generation::Tree, Generation::Stack];

    pub fn key(self) -> &'static str {
        match self {
            Self::Sessions => SESSIONS_KEY,
            Self::Tree => TREE_KEY,
            Self::Stack => STACK_KEY,
        }
    }

    pub fn number(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "generation {}", self.number())
    }
}

/// Tree rebuilt from a Generation-1 stack.
///
/// Only the nodes of the saved path exist; every branch the user had backed out of was
/// deleted by that format and cannot be restored, so `lossy` is always set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredTree {
    pub session: Session,
    pub recovered_nodes: usize,
    pub lossy: bool,
}

/// A record decoded into validated model values, tagged by its generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Sessions(SessionRegistry),
    Tree(Session),
    Stack(RecoveredTree),
}

impl Decoded {
    pub fn generation(&self) -> Generation {
        match self {
            Self::Sessions(_) => Generation::Sessions,
            Self::Tree(_) => Generation::Tree,
            Self::Stack(_) => Generation::Stack,
        }
    }
}

/// A stored record that could not be used.
#[derive(Debug)]
pub struct CorruptRecord {
    pub generation: Generation,
    pub key: &'static str,
    pub reason: RecordError,
}

impl fmt::Display for CorruptRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "corrupt {} record under {:?}: {}",
            self.generation, self.key, self.reason
        )
    }
}

impl std::error::Error for CorruptRecord {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Current,
    MigratedFromTree,
    RecoveredFromStack { recovered_nodes: usize },
    Fresh,
}

#[derive(Debug)]
pub struct LoadReport {
    pub registry: SessionRegistry,
    pub source: LoadSource,
    pub corrupt: Vec<CorruptRecord>,
    /// Set when the Generation-3 snapshot (or source cleanup) could not be written. The
    /// registry is still valid; it is just not durable yet.
    pub write_error: Option<StoreError>,
}

/// Finds the newest usable record.
///
/// Read failures of the store itself abort; undecodable records (including values that are not
/// text) are collected and skipped.
pub fn detect<S: KeyValueStore + ?Sized>(
    store: &S,
    now_millis: u64,
) -> Result<(Option<Decoded>, Vec<CorruptRecord>), StoreError> {
    let mut corrupt = Vec::new();

    for generation in Generation::NEWEST_FIRST {
        let key = generation.key();
        let decoded = match store.get(key) {
            Ok(Some(raw)) => decode(generation, &raw, now_millis),
            Ok(None) => continue,
            Err(StoreError::InvalidUtf8 { source, .. }) => Err(RecordError::InvalidUtf8(source)),
            Err(err) => return Err(err),
        };

        match decoded {
            Ok(decoded) => return Ok((Some(decoded), corrupt)),
            Err(reason) => {
                tracing::warn!(%generation, key, %reason, "ignoring unreadable record");
                corrupt.push(CorruptRecord {
                    generation,
                    key,
                    reason,
                });
            }
        }
    }

    Ok((None, corrupt))
}

/// Parses and validates one stored record.
///
/// Older generations get a fresh session identity derived from `now_millis`.
pub fn decode(generation: Generation, raw: &str, now_millis: u64) -> Result<Decoded, RecordError> {
    match generation {
        Generation::Sessions => {
            let record: SessionsRecord = serde_json::from_str(raw)?;
            registry_from_record(record).map(Decoded::Sessions)
        }
        Generation::Tree => {
            let record: TreeRecord = serde_json::from_str(raw)?;
            tree_from_record(record, SessionId::for_created(now_millis, 0), now_millis)
                .map(Decoded::Tree)
        }
        Generation::Stack => {
            let record: StackRecord = serde_json::from_str(raw)?;
            recover_from_stack(record, now_millis).map(Decoded::Stack)
        }
    }
}

/// Moves a decoded record one generation forward. Sessions is a fixed point.
pub fn upgrade(decoded: Decoded) -> Decoded {
    match decoded {
        Decoded::Stack(recovered) => Decoded::Tree(recovered.session),
        Decoded::Tree(session) => Decoded::Sessions(SessionRegistry::from_single(session)),
        Decoded::Sessions(registry) => Decoded::Sessions(registry),
    }
}

/// Best-effort reconstruction of a tree from a Generation-1 stack.
///
/// Builds one node per stack entry and links each to the next, so every recovered node has at
/// most one child. Recorded `children` are ignored because they can name nodes the old format
/// already deleted. A recorded depth that disagrees with the entry's position is replaced by
/// the position.
pub fn recover_from_stack(
    record: StackRecord,
    now_millis: u64,
) -> Result<RecoveredTree, RecordError> {
    if record.stack.is_empty() {
        return Err(RecordError::EmptyStack);
    }

    let next_ids = record
        .stack
        .iter()
        .skip(1)
        .map(|entry| Some(NodeId::new(entry.id)))
        .chain(std::iter::once(None))
        .collect::<Vec<_>>();

    let mut nodes = BTreeMap::new();
    let mut path = Vec::with_capacity(record.stack.len());
    for ((index, entry), next_id) in record.stack.into_iter().enumerate().zip(next_ids) {
        let node_id = NodeId::new(entry.id);
        let depth = u32::try_from(index).unwrap_or(u32::MAX);
        if entry.depth.is_some_and(|recorded| recorded != depth) {
            tracing::debug!(
                node_id = entry.id,
                recorded = ?entry.depth,
                depth,
                "normalizing legacy node depth to its path position"
            );
        }

        let node = Node::from_parts(
            node_id,
            entry.question,
            entry.answer,
            next_id.into_iter().collect(),
            depth,
        );
        if nodes.insert(node_id, node).is_some() {
            return Err(RecordError::DuplicateStackNode { node_id: entry.id });
        }
        path.push(node_id);
    }

    let recovered_nodes = nodes.len();
    let session = Session::from_parts(
        SessionId::for_created(now_millis, 0),
        now_millis,
        nodes,
        path,
        record.node_id_counter,
        record.max_depth_reached,
    )
    .map_err(|source| RecordError::Invariant {
        session_id: None,
        source,
    })?;

    tracing::warn!(
        recovered_nodes,
        "recovered legacy stack record; branches abandoned before this version are unrecoverable"
    );

    Ok(RecoveredTree {
        session,
        recovered_nodes,
        lossy: true,
    })
}

/// Loads the registry, migrating older records forward, or creates a fresh one.
///
/// Runs at most one migration. Anything other than a clean Generation-3 load is written back
/// as Generation 3 immediately.
pub fn load_or_init<S: KeyValueStore + ?Sized>(
    store: &mut S,
    now_millis: u64,
) -> Result<LoadReport, StoreError> {
    let (detected, corrupt) = detect(&*store, now_millis)?;

    let Some(decoded) = detected else {
        let registry = SessionRegistry::new(now_millis);
        tracing::info!(session_id = %registry.current_session_id(), "no usable state; starting fresh");
        let write_error = save_registry(store, &registry).err();
        return Ok(LoadReport {
            registry,
            source: LoadSource::Fresh,
            corrupt,
            write_error,
        });
    };

    let origin = decoded.generation();
    let source = match &decoded {
        Decoded::Sessions(_) => LoadSource::Current,
        Decoded::Tree(_) => LoadSource::MigratedFromTree,
        Decoded::Stack(recovered) => LoadSource::RecoveredFromStack {
            recovered_nodes: recovered.recovered_nodes,
        },
    };

    let mut decoded = decoded;
    let registry = loop {
        match decoded {
            Decoded::Sessions(registry) => break registry,
            older => decoded = upgrade(older),
        }
    };

    if origin == Generation::Sessions {
        return Ok(LoadReport {
            registry,
            source,
            corrupt,
            write_error: None,
        });
    }

    tracing::info!(from = %origin, "migrating persisted state to generation 3");
    let write_error = match save_registry(store, &registry) {
        Ok(()) => store.remove(origin.key()).err(),
        Err(err) => Some(err),
    };
    if let Some(err) = &write_error {
        tracing::warn!(error = %err, "migrated state is not yet durable");
    }

    Ok(LoadReport {
        registry,
        source,
        corrupt,
        write_error,
    })
}

/// Writes the whole registry as one Generation-3 snapshot.
pub fn save_registry<S: KeyValueStore + ?Sized>(
    store: &mut S,
    registry: &SessionRegistry,
) -> Result<(), StoreError> {
    let record = registry_to_record(registry);
    let json = serde_json::to_string_pretty(&record).map_err(|source| StoreError::Json {
        key: SESSIONS_KEY.to_owned(),
        source,
    })?;
    store.set(SESSIONS_KEY, &format!("{json}\n"))
}
