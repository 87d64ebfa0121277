// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Recstack-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Recstack and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use recstack::model::{Session, SessionRegistry};
use recstack::ops;
use recstack::store::records::{session_to_tree_record, StackNodeRecord, StackRecord};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let pid = std::process::id();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut path = std::env::temp_dir();
        path.push(format!("recstack_bench_{prefix}_{pid}_{nanos}_{counter}"));
        std::fs::create_dir_all(&path).expect("create temp dir");

        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// Answer text with `words` distinct tokens and some repeats and punctuation.
pub fn answer_text(words: usize) -> String {
    let mut out = String::new();
    for i in 0..words {
        if i > 0 {
            out.push_str(if i % 7 == 0 { ", " } else { " " });
        }
        out.push_str(&format!("word{i}"));
        if i % 5 == 0 {
            out.push_str(" word0 it's");
        }
    }
    out.push('?');
    out
}

#[derive(Debug, Clone, Copy)]
pub enum Case {
    /// One session, a few dozen nodes.
    Small,
    /// Eight sessions, each a few hundred nodes.
    Medium,
}

/// A session explored breadth-first: every answered node spawns `fanout` children, and the
/// path ends `depth` levels down the first branch.
pub fn explored_session(session: &mut Session, fanout: usize, depth: usize) {
    for _ in 0..depth {
        let answer = answer_text(fanout);
        ops::update_current(session, "", &answer);
        let tokens = recstack::tokenize::tokenize(&answer);
        for token in tokens.iter().skip(1).take(fanout.saturating_sub(1)) {
            ops::create_child(session, token);
            ops::update_current(session, "", "leaf answer");
            ops::pop(session).expect("pop after create_child");
        }
        ops::create_child(session, &tokens[0]);
    }
}

pub fn registry(case: Case) -> SessionRegistry {
    let (sessions, fanout, depth) = match case {
        Case::Small => (1, 4, 8),
        Case::Medium => (8, 12, 24),
    };

    let mut registry = SessionRegistry::new(1_000);
    for i in 0..sessions {
        if i > 0 {
            registry.create_session(1_000 + i as u64);
        }
        explored_session(registry.current_mut(), fanout, depth);
    }
    registry
}

pub fn tree_json(case: Case) -> String {
    let registry = registry(case);
    serde_json::to_string(&session_to_tree_record(registry.current())).expect("tree json")
}

/// Generation-1 stack along the current path of the first session.
pub fn stack_json(case: Case) -> String {
    let registry = registry(case);
    let session = registry.current();
    let stack = session
        .path()
        .iter()
        .map(|node_id| {
            let node = session.node(*node_id).expect("path node");
            StackNodeRecord {
                id: node.id().get(),
                question: node.question().to_owned(),
                answer: node.answer().to_owned(),
                depth: Some(node.depth()),
                children: node.children().iter().map(|id| id.get()).collect(),
                parent: None,
            }
        })
        .collect();
    let record = StackRecord {
        stack,
        node_id_counter: session.node_id_counter(),
        max_depth_reached: session.max_depth_reached(),
        total_nodes: Some(session.total_nodes() as u64),
    };
    serde_json::to_string(&record).expect("stack json")
}
