// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Shared utility functions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Generate a formatted ISO8601-like timestamp string.
///
/// Returns a string in the format "SECONDS.MILLISZ" using SystemTime.
pub fn now_iso8601() -> String {
    let duration = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();
    format!("{}.{:03}Z", secs, millis)
}

/// Generate a unique ID string with an optional prefix.
///
/// Uses a monotonic counter combined with a timestamp to produce
/// collision-resistant IDs without requiring the `uuid` crate. Submission,
/// scratch, and output file names all derive from these IDs, which is what
/// keeps concurrent submissions from colliding on disk.
pub fn generate_unique_id(prefix: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    let ts = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{}-{}-{}", prefix, ts, count)
}
