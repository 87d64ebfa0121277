// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Recstack-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Recstack and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The long-lived application context.
//!
//! [`App`] owns the live registry together with the store it came from. Every successful
//! mutation is followed by a full snapshot write; refused navigation writes nothing. There is
//! no draft buffer: text a front end has not passed to [`App::answer`] before navigating is
//! discarded.

use std::fmt;

use crate::clock::Clock;
use crate::model::{DeleteOutcome, NodeId, RegistryError, Session, SessionId, SessionRegistry};
use crate::ops::{self, NavError};
use crate::store::{
    load_or_init, save_registry, CorruptRecord, KeyValueStore, LoadReport, LoadSource, StoreError,
    STACK_KEY, TREE_KEY,
};
use crate::tokenize::tokenize;
use crate::ErrorKind;

pub struct App<S, C> {
    store: S,
    clock: C,
    registry: SessionRegistry,
}

/// What [`App::open`] found in the store.
#[derive(Debug)]
pub struct OpenReport {
    pub source: LoadSource,
    pub corrupt: Vec<CorruptRecord>,
    pub write_error: Option<StoreError>,
}

impl<S: KeyValueStore, C: Clock> App<S, C> {
    /// Loads (migrating if needed) or initializes the registry held by `store`.
    pub fn open(mut store: S, clock: C) -> Result<(Self, OpenReport), StoreError> {
        let LoadReport {
            registry,
            source,
            corrupt,
            write_error,
        } = load_or_init(&mut store, clock.now_millis())?;

        let app = Self {
            store,
            clock,
            registry,
        };
        Ok((
            app,
            OpenReport {
                source,
                corrupt,
                write_error,
            },
        ))
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// The session being edited.
    pub fn session(&self) -> &Session {
        self.registry.current()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Saves the current node's text and returns the tokens of the saved answer.
    pub fn answer(&mut self, question: &str, answer: &str) -> Result<Vec<String>, AppError> {
        let session = self.registry.current_mut();
        ops::update_current(session, question, answer);
        let tokens = tokenize(session.current().answer());
        self.save()?;
        Ok(tokens)
    }

    /// Opens a new sub-question for `token` under the current node.
    pub fn dive(&mut self, token: &str) -> Result<NodeId, AppError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::EmptyToken);
        }
        let child_id = ops::create_child(self.registry.current_mut(), token);
        self.save()?;
        Ok(child_id)
    }

    pub fn back(&mut self) -> Result<NodeId, AppError> {
        let result = ops::pop(self.registry.current_mut());
        self.finish_nav(result)
    }

    pub fn jump(&mut self, index: usize) -> Result<NodeId, AppError> {
        let result = ops::jump_to(self.registry.current_mut(), index);
        self.finish_nav(result)
    }

    pub fn open_child(&mut self, child_id: NodeId) -> Result<NodeId, AppError> {
        let result = ops::descend_into(self.registry.current_mut(), child_id);
        self.finish_nav(result)
    }

    pub fn new_session(&mut self) -> Result<SessionId, AppError> {
        let session_id = self.registry.create_session(self.clock.now_millis());
        tracing::debug!(session_id = %session_id, "session created");
        self.save()?;
        Ok(session_id)
    }

    pub fn switch_session(&mut self, session_id: &str) -> Result<(), AppError> {
        self.registry
            .load_session(session_id)
            .map_err(AppError::Registry)?;
        self.save()
    }

    pub fn delete_session(&mut self, session_id: &str) -> Result<DeleteOutcome, AppError> {
        let outcome = self
            .registry
            .delete_session(session_id, self.clock.now_millis())
            .map_err(AppError::Registry)?;
        tracing::debug!(
            deleted = %outcome.deleted,
            current = %outcome.current,
            replacement_created = outcome.replacement_created,
            "session deleted"
        );
        self.save()?;
        Ok(outcome)
    }

    /// Drops the current session's tree and starts over from a fresh root.
    pub fn reset_current_session(&mut self) -> Result<(), AppError> {
        ops::create_root(self.registry.current_mut());
        self.save()
    }

    /// Forgets every session and every legacy record.
    pub fn clear_all(&mut self) -> Result<(), AppError> {
        self.registry = SessionRegistry::new(self.clock.now_millis());
        for key in [TREE_KEY, STACK_KEY] {
            self.store.remove(key).map_err(AppError::Persistence)?;
        }
        self.save()
    }

    /// Writes the whole registry.
    pub fn save(&mut self) -> Result<(), AppError> {
        save_registry(&mut self.store, &self.registry).map_err(|err| {
            tracing::warn!(error = %err, "state changed in memory but was not saved");
            AppError::Persistence(err)
        })
    }

    fn finish_nav(&mut self, result: Result<NodeId, NavError>) -> Result<NodeId, AppError> {
        match result {
            Ok(node_id) => {
                self.save()?;
                Ok(node_id)
            }
            Err(err) => {
                tracing::debug!(error = %err, "navigation refused");
                Err(AppError::Nav(err))
            }
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    EmptyToken,
    Nav(NavError),
    Registry(RegistryError),
    Persistence(StoreError),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyToken => ErrorKind::InvalidStateTransition,
            Self::Nav(err) => err.kind(),
            Self::Registry(err) => err.kind(),
            Self::Persistence(err) => err.kind(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyToken => f.write_str("token is empty"),
            Self::Nav(err) => write!(f, "{err}"),
            Self::Registry(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "state not saved: {err}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EmptyToken => None,
            Self::Nav(err) => Some(err),
            Self::Registry(err) => Some(err),
            Self::Persistence(err) => Some(err),
        }
    }
}
