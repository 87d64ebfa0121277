// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Recstack-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Recstack and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use recstack::store::migrate::{decode, Generation};
use recstack::store::{
    load_or_init, save_registry, DirStore, KeyValueStore, MemoryStore, SESSIONS_KEY, STACK_KEY,
    TREE_KEY,
};

mod fixtures;
mod profiler;

use fixtures::{Case, TempDir};

const NOW: u64 = 1_700_000_000_000;

// Benchmark identity (keep stable):
// - Groups in this file: `store.save_registry`, `store.load`, `store.migrate`.
// - Case IDs (after the `/`) must remain stable so results stay comparable over time.
fn benches_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("store.save_registry");

    for (name, case) in [("small", Case::Small), ("medium", Case::Medium)] {
        let registry = fixtures::registry(case);
        let memory_registry = registry.clone();
        group.bench_function(format!("memory_{name}"), move |b| {
            let mut store = MemoryStore::new();
            b.iter(|| save_registry(&mut store, black_box(&memory_registry)).expect("save"))
        });
        group.bench_function(format!("io_{name}"), move |b| {
            b.iter_batched_ref(
                || TempDir::new("store_save_registry"),
                |tmp| {
                    let mut store = DirStore::new(tmp.path());
                    save_registry(&mut store, black_box(&registry)).expect("save");
                    black_box(store.key_path(SESSIONS_KEY).expect("key path"))
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn benches_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("store.load");

    for (name, case) in [("small", Case::Small), ("medium", Case::Medium)] {
        let mut store = MemoryStore::new();
        save_registry(&mut store, &fixtures::registry(case)).expect("save");
        let raw = store.get(SESSIONS_KEY).expect("get").expect("record");

        group.bench_function(format!("decode_{name}"), |b| {
            b.iter(|| decode(Generation::Sessions, black_box(&raw), NOW).expect("decode"))
        });
    }

    group.finish();
}

fn benches_migrate(c: &mut Criterion) {
    let mut group = c.benchmark_group("store.migrate");

    let tree = fixtures::tree_json(Case::Medium);
    group.bench_function("tree_medium", |b| {
        b.iter_batched(
            || {
                let mut store = MemoryStore::new();
                store.set(TREE_KEY, &tree).expect("seed");
                store
            },
            |mut store| load_or_init(&mut store, NOW).expect("migrate"),
            BatchSize::SmallInput,
        )
    });

    let stack = fixtures::stack_json(Case::Medium);
    group.bench_function("stack_medium", |b| {
        b.iter_batched(
            || {
                let mut store = MemoryStore::new();
                store.set(STACK_KEY, &stack).expect("seed");
                store
            },
            |mut store| load_or_init(&mut store, NOW).expect("migrate"),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_save, benches_load, benches_migrate
}
criterion_main!(benches);
