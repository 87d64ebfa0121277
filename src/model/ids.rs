// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Recstack-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Recstack and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Identifier of a node inside one session's node store.
///
/// Assigned from the session's monotonic counter and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for NodeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}

/// Opaque session identifier, unique within a registry.
///
/// Ids are derived from the creation timestamp (see [`SessionId::for_created`]) but any
/// non-empty token without whitespace or control characters is accepted so that ids read
/// back from storage survive unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId {
    value: String,
}

impl SessionId {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        validate_session_id(&value)?;
        Ok(Self { value })
    }

    /// Builds the id for a session created at `created_millis`.
    ///
    /// `attempt` is the collision counter: two sessions created within the same millisecond
    /// get `s<millis>` and `s<millis>-1`.
    pub fn for_created(created_millis: u64, attempt: u32) -> Self {
        let value = if attempt == 0 {
            format!("s{created_millis}")
        } else {
            format!("s{created_millis}-{attempt}")
        };
        Self { value }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for SessionId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl TryFrom<String> for SessionId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    Empty,
    InvalidChar { ch: char },
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("id must not be empty"),
            Self::InvalidChar { ch } => write!(f, "id must not contain {ch:?}"),
        }
    }
}

impl std::error::Error for IdError {}

fn validate_session_id(value: &str) -> Result<(), IdError> {
    if value.is_empty() {
        return Err(IdError::Empty);
    }
    if let Some(ch) = value.chars().find(|ch| ch.is_whitespace() || ch.is_control()) {
        return Err(IdError::InvalidChar { ch });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{IdError, NodeId, SessionId};

    #[test]
    fn session_id_rejects_empty() {
        assert_eq!(SessionId::new(""), Err(IdError::Empty));
    }

    #[test]
    fn session_id_rejects_whitespace() {
        assert_eq!(SessionId::new("a b"), Err(IdError::InvalidChar { ch: ' ' }));
    }

    #[test]
    fn session_id_for_created_appends_attempt_counter() {
        assert_eq!(SessionId::for_created(1700, 0).as_str(), "s1700");
        assert_eq!(SessionId::for_created(1700, 2).as_str(), "s1700-2");
    }

    #[test]
    fn node_id_parses_trimmed_integer() {
        assert_eq!(" 42 ".parse::<NodeId>(), Ok(NodeId::new(42)));
        assert!("x".parse::<NodeId>().is_err());
    }
}
