// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod wait;

use std::sync::atomic::{AtomicU64, Ordering};

pub use wait::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, wait_for, wait_for_condition};

static NEXT: AtomicU64 = AtomicU64::new(1);

/// Name unique within the test process.
pub fn unique_name(prefix: &str) -> String {
	format!("{prefix}-{}", NEXT.fetch_add(1, Ordering::Relaxed))
}
