// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Recstack-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Recstack and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A [`SessionRegistry`] owns sessions; each [`Session`] owns its node store and the
//! navigation path from the root to the node being edited.

pub mod ids;
pub mod node;
pub mod registry;
pub mod session;

pub use ids::{IdError, NodeId, SessionId};
pub use node::{Node, ROOT_QUESTION};
pub use registry::{DeleteOutcome, RegistryError, SessionRegistry};
pub use session::{InvariantError, Session};
