// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Recstack-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Recstack and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for the session registry.
//!
//! Backends implement [`KeyValueStore`]; [`migrate`] decides which stored generation to load
//! and writes everything back as the current one.

pub mod dir_store;
pub mod kv;
pub mod migrate;
pub mod records;

pub use dir_store::{DirStore, WriteDurability};
pub use kv::{KeyValueStore, MemoryStore, StoreError};
pub use migrate::{
    load_or_init, save_registry, CorruptRecord, Generation, LoadReport, LoadSource, SESSIONS_KEY,
    STACK_KEY, TREE_KEY,
};
pub use records::{RecordError, SessionsRecord};

/// JSON Schema of the current (Generation 3) record.
pub fn current_record_schema() -> schemars::Schema {
    schemars::schema_for!(SessionsRecord)
}
