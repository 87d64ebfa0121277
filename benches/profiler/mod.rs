// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Recstack-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Recstack and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::str::FromStr;
use std::time::Duration;

use criterion::Criterion;
use pprof::criterion::{Output, PProfProfiler};

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Criterion config shared by every bench target.
///
/// `RECSTACK_PROFILE_FREQ=0` turns the flamegraph profiler off; sample size and timings can
/// be shortened through `RECSTACK_BENCH_*` for quick local runs.
pub fn criterion() -> Criterion {
    let frequency = env_or("RECSTACK_PROFILE_FREQ", 100_i32).clamp(0, 1000);
    let sample_size = env_or("RECSTACK_BENCH_SAMPLE_SIZE", 50_usize).clamp(10, 200);
    let warmup = Duration::from_secs(env_or("RECSTACK_BENCH_WARMUP_SECS", 2_u64).clamp(1, 60));
    let measurement =
        Duration::from_secs(env_or("RECSTACK_BENCH_MEASUREMENT_SECS", 4_u64).clamp(1, 120));

    let criterion = Criterion::default()
        .sample_size(sample_size)
        .warm_up_time(warmup)
        .measurement_time(measurement);
    if frequency == 0 {
        criterion
    } else {
        criterion.with_profiler(PProfProfiler::new(frequency, Output::Flamegraph(None)))
    }
}
