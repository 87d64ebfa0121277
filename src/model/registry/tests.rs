// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Recstack-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Recstack and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::{RegistryError, SessionRegistry};
use crate::model::{NodeId, Session, SessionId};
use crate::ops;
use crate::ErrorKind;

#[test]
fn new_registry_holds_one_current_session() {
    let registry = SessionRegistry::new(1_000);
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.current_session_id().as_str(), "s1000");
    assert_eq!(registry.current().path(), &[NodeId::ROOT]);
}

#[test]
fn create_session_switches_current_and_keeps_ids_unique_within_a_millisecond() {
    let mut registry = SessionRegistry::new(5);
    let first = registry.create_session(5);
    let second = registry.create_session(5);

    assert_eq!(first.as_str(), "s5-1");
    assert_eq!(second.as_str(), "s5-2");
    assert_eq!(registry.len(), 3);
    assert_eq!(registry.current_session_id(), &second);
}

#[test]
fn load_session_switches_current() {
    let mut registry = SessionRegistry::new(1);
    let second = registry.create_session(2);
    assert_eq!(registry.current_session_id(), &second);

    let loaded = registry.load_session("s1").expect("load");
    assert_eq!(loaded.id().as_str(), "s1");
    assert_eq!(registry.current_session_id().as_str(), "s1");
}

#[test]
fn load_session_rejects_unknown_id_without_switching() {
    let mut registry = SessionRegistry::new(1);
    let err = registry.load_session("nope").unwrap_err();
    assert_eq!(
        err,
        RegistryError::NotFound {
            session_id: "nope".to_owned()
        }
    );
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(registry.current_session_id().as_str(), "s1");
}

#[test]
fn deleting_only_session_recreates_a_fresh_one() {
    let mut registry = SessionRegistry::new(1);
    ops::create_child(registry.current_mut(), "deep");

    let outcome = registry.delete_session("s1", 9).expect("delete");

    assert!(outcome.replacement_created);
    assert_eq!(registry.len(), 1);
    assert_eq!(outcome.current.as_str(), "s9");
    assert_eq!(registry.current().path(), &[NodeId::ROOT]);
    assert_eq!(registry.current().total_nodes(), 1);
}

#[test]
fn deleting_current_session_falls_back_to_earliest_created() {
    let mut registry = SessionRegistry::new(10);
    registry.create_session(30);
    registry.create_session(20);
    let current = registry.create_session(40);

    let outcome = registry.delete_session(current.as_str(), 50).expect("delete");

    assert!(!outcome.replacement_created);
    assert_eq!(outcome.current.as_str(), "s10");
    assert_eq!(registry.current_session_id().as_str(), "s10");
}

#[test]
fn deleting_other_session_keeps_current() {
    let mut registry = SessionRegistry::new(10);
    let current = registry.create_session(20);

    registry.delete_session("s10", 30).expect("delete");

    assert_eq!(registry.current_session_id(), &current);
    assert_eq!(registry.len(), 1);
}

#[test]
fn delete_unknown_session_is_not_found() {
    let mut registry = SessionRegistry::new(10);
    let err = registry.delete_session("missing", 11).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(registry.len(), 1);
}

#[test]
fn sessions_by_recency_orders_newest_first() {
    let mut registry = SessionRegistry::new(10);
    registry.create_session(30);
    registry.create_session(20);

    let order = registry
        .sessions_by_recency()
        .into_iter()
        .map(|s| s.id().to_string())
        .collect::<Vec<_>>();
    assert_eq!(order, vec!["s30", "s20", "s10"]);
}

#[test]
fn from_parts_repairs_dangling_current_id() {
    let mut sessions = BTreeMap::new();
    for created in [7_u64, 3] {
        let id = SessionId::for_created(created, 0);
        sessions.insert(id.clone(), Session::new(id, created));
    }

    let registry =
        SessionRegistry::from_parts(SessionId::new("gone").unwrap(), sessions).expect("registry");
    assert_eq!(registry.current_session_id().as_str(), "s3");
}

#[test]
fn from_parts_rejects_empty_and_mismatched_maps() {
    let err = SessionRegistry::from_parts(SessionId::new("s1").unwrap(), BTreeMap::new())
        .unwrap_err();
    assert_eq!(err, RegistryError::Empty);

    let mut sessions = BTreeMap::new();
    sessions.insert(
        SessionId::new("a").unwrap(),
        Session::new(SessionId::new("b").unwrap(), 0),
    );
    let err = SessionRegistry::from_parts(SessionId::new("a").unwrap(), sessions).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptRecord);
}
