// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Recstack-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Recstack and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use recstack::tokenize::tokenize;

mod fixtures;
mod profiler;

// Benchmark identity (keep stable):
// - Group name in this file: `tokenize.answer`
// - Case IDs are the distinct-word counts (`words_16`, `words_256`, `words_4096`).
fn benches_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize.answer");

    for words in [16_usize, 256, 4096] {
        let text = fixtures::answer_text(words);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_function(format!("words_{words}"), |b| {
            b.iter(|| black_box(tokenize(black_box(&text))).len())
        });
    }

    let unicode = "What's the Naïve-Bayes 2nd rule? Ünïcödé wörds, ünd mörë wörds. ".repeat(64);
    group.throughput(Throughput::Bytes(unicode.len() as u64));
    group.bench_function("unicode_repeated", |b| {
        b.iter(|| black_box(tokenize(black_box(&unicode))).len())
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_tokenize
}
criterion_main!(benches);
