// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Recstack-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Recstack and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Recstack: recursive question decomposition.
//!
//! A user answers a question, the answer's distinct words become candidate sub-questions,
//! and picking one opens a child question one level deeper. Navigation is a stack of node ids
//! from the root to the node being edited. Several independent trees live side by side in a
//! session registry that is persisted as one JSON snapshot, with forward migration from the
//! two older storage layouts.

use std::fmt;

pub mod app;
pub mod clock;
pub mod model;
pub mod ops;
pub mod query;
pub mod store;
pub mod tokenize;

/// Coarse classification shared by every error type in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A session or node id that is not present.
    NotFound,
    /// A refused operation such as going back from the root. Nothing changed.
    InvalidStateTransition,
    /// The durable store rejected a read or write.
    PersistenceFailure,
    /// A stored record could not be parsed or violates the tree invariants.
    CorruptRecord,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidStateTransition => "invalid_state_transition",
            Self::PersistenceFailure => "persistence_failure",
            Self::CorruptRecord => "corrupt_record",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
