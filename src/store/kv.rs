// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Recstack-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Recstack and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::ErrorKind;

/// Durable string-keyed storage for whole JSON documents.
///
/// Each key holds one complete record; writes replace the value as a unit, so the last
/// complete write wins.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`. Removing an absent key succeeds.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-process store, optionally capped at `quota` bytes across all values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = Some(quota);
        self
    }

    pub fn set_quota(&mut self, quota: Option<usize>) {
        self.quota = quota;
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(_, v)| v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(quota) = self.quota {
            let len = self.used_bytes_without(key).saturating_add(value.len());
            if len > quota {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_owned(),
                    len,
                    quota,
                });
            }
        }
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        key: String,
        source: serde_json::Error,
    },
    QuotaExceeded {
        key: String,
        len: usize,
        quota: usize,
    },
    InvalidKey {
        key: String,
    },
    /// The value under `key` exists but is not UTF-8 text.
    InvalidUtf8 {
        key: String,
        source: std::str::Utf8Error,
    },
    SymlinkRefused {
        path: PathBuf,
    },
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::PersistenceFailure
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { key, source } => write!(f, "cannot encode record {key:?}: {source}"),
            Self::QuotaExceeded { key, len, quota } => write!(
                f,
                "storage quota exceeded writing {key:?} ({len} bytes, quota {quota})"
            ),
            Self::InvalidKey { key } => write!(f, "invalid storage key {key:?}"),
            Self::InvalidUtf8 { key, source } => {
                write!(f, "record {key:?} is not valid UTF-8: {source}")
            }
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to write through symlink at {path:?}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::InvalidUtf8 { source, .. } => Some(source),
            Self::QuotaExceeded { .. } | Self::InvalidKey { .. } | Self::SymlinkRefused { .. } => {
                None
            }
        }
    }
}
