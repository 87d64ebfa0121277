// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Recstack-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Recstack and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;

use super::ids::SessionId;
use super::session::Session;
use crate::ErrorKind;

/// All sessions known to the process plus the one currently being edited.
///
/// Once constructed the registry is never empty and `current_session_id` always names an
/// entry. Every mutator either succeeds completely or leaves the registry untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRegistry {
    sessions: BTreeMap<SessionId, Session>,
    current_session_id: SessionId,
}

/// Result of [`SessionRegistry::delete_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted: SessionId,
    pub current: SessionId,
    pub replacement_created: bool,
}

impl SessionRegistry {
    /// Creates a registry holding one fresh session created at `now_millis`.
    pub fn new(now_millis: u64) -> Self {
        let session = Session::new(SessionId::for_created(now_millis, 0), now_millis);
        Self::from_single(session)
    }

    pub fn from_single(session: Session) -> Self {
        let current_session_id = session.id().clone();
        let mut sessions = BTreeMap::new();
        sessions.insert(current_session_id.clone(), session);
        Self {
            sessions,
            current_session_id,
        }
    }

    /// Rebuilds a registry from decoded storage.
    ///
    /// A `current_session_id` that names no session is redirected to the fallback session
    /// instead of failing the whole load.
    pub fn from_parts(
        current_session_id: SessionId,
        sessions: BTreeMap<SessionId, Session>,
    ) -> Result<Self, RegistryError> {
        if sessions.is_empty() {
            return Err(RegistryError::Empty);
        }
        if let Some((key, session)) = sessions.iter().find(|(key, s)| *key != s.id()) {
            return Err(RegistryError::KeyMismatch {
                key: key.clone(),
                session_id: session.id().clone(),
            });
        }

        let current_session_id = if sessions.contains_key(&current_session_id) {
            current_session_id
        } else {
            let fallback = fallback_session_id(&sessions)
                .cloned()
                .ok_or(RegistryError::Empty)?;
            tracing::warn!(
                missing = %current_session_id,
                fallback = %fallback,
                "current session id not found; switching to fallback session"
            );
            fallback
        };

        Ok(Self {
            sessions,
            current_session_id,
        })
    }

    pub fn sessions(&self) -> &BTreeMap<SessionId, Session> {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get(&self, session_id: &str) -> Option<&Session> {
        self.sessions.get(session_id)
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn current_session_id(&self) -> &SessionId {
        &self.current_session_id
    }

    pub fn current(&self) -> &Session {
        &self.sessions[&self.current_session_id]
    }

    pub fn current_mut(&mut self) -> &mut Session {
        let current_session_id = &self.current_session_id;
        self.sessions
            .get_mut(current_session_id)
            .unwrap_or_else(|| unreachable!("current session {current_session_id} missing"))
    }

    /// Sessions ordered most-recent-first; ties keep id order.
    pub fn sessions_by_recency(&self) -> Vec<&Session> {
        let mut sessions = self.sessions.values().collect::<Vec<_>>();
        sessions.sort_by(|a, b| b.created().cmp(&a.created()));
        sessions
    }

    /// Creates a session with a fresh root, makes it current, and returns its id.
    ///
    /// Ids derive from `now_millis`; a collision within the same millisecond falls back to
    /// a counter suffix so every call yields a distinct id.
    pub fn create_session(&mut self, now_millis: u64) -> SessionId {
        let mut attempt = 0_u32;
        let session_id = loop {
            let candidate = SessionId::for_created(now_millis, attempt);
            if !self.sessions.contains_key(&candidate) {
                break candidate;
            }
            attempt = attempt.saturating_add(1);
        };

        self.sessions.insert(
            session_id.clone(),
            Session::new(session_id.clone(), now_millis),
        );
        self.current_session_id = session_id.clone();
        session_id
    }

    /// Makes `session_id` the current session.
    pub fn load_session(&mut self, session_id: &str) -> Result<&Session, RegistryError> {
        let Some((key, _)) = self.sessions.get_key_value(session_id) else {
            return Err(RegistryError::NotFound {
                session_id: session_id.to_owned(),
            });
        };
        self.current_session_id = key.clone();
        Ok(self.current())
    }

    /// Removes a session.
    ///
    /// Deleting the last session creates a replacement at `now_millis` in the same call.
    /// Deleting the current session while others remain moves "current" to the earliest
    /// created remaining session (lowest id on ties).
    pub fn delete_session(
        &mut self,
        session_id: &str,
        now_millis: u64,
    ) -> Result<DeleteOutcome, RegistryError> {
        let Some((deleted, _)) = self.sessions.remove_entry(session_id) else {
            return Err(RegistryError::NotFound {
                session_id: session_id.to_owned(),
            });
        };

        let mut replacement_created = false;
        if self.sessions.is_empty() {
            self.create_session(now_millis);
            replacement_created = true;
        } else if self.current_session_id == deleted {
            if let Some(fallback) = fallback_session_id(&self.sessions) {
                self.current_session_id = fallback.clone();
            }
        }

        Ok(DeleteOutcome {
            deleted,
            current: self.current_session_id.clone(),
            replacement_created,
        })
    }
}

fn fallback_session_id(sessions: &BTreeMap<SessionId, Session>) -> Option<&SessionId> {
    sessions
        .values()
        .min_by(|a, b| a.created().cmp(&b.created()).then_with(|| a.id().cmp(b.id())))
        .map(Session::id)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    NotFound { session_id: String },
    Empty,
    KeyMismatch { key: SessionId, session_id: SessionId },
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Empty | Self::KeyMismatch { .. } => ErrorKind::CorruptRecord,
        }
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { session_id } => write!(f, "session not found (id={session_id})"),
            Self::Empty => f.write_str("registry holds no sessions"),
            Self::KeyMismatch { key, session_id } => {
                write!(f, "session stored under key {key} carries id {session_id}")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

#[cfg(test)]
mod tests;
