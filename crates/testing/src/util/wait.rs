// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Wait utilities for testing
//!
//! Poll for a condition instead of sleeping for a fixed time, so tests are
//! both faster and more reliable.

use std::{
	thread,
	time::{Duration, Instant},
};

/// Default timeout for wait operations (5 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default poll interval (1 millisecond)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Wait for a condition to become true, polling at regular intervals
///
/// # Panics
/// Panics if the condition doesn't become true within the timeout period
pub fn wait_for_condition<F>(condition: F, timeout: Duration, poll_interval: Duration, timeout_message: &str)
where
	F: Fn() -> bool,
{
	let start = Instant::now();
	while !condition() {
		if start.elapsed() > timeout {
			panic!("Timeout after {:?}: {}", timeout, timeout_message);
		}
		thread::sleep(poll_interval);
	}
}

/// Wait for a condition with default timeout and poll interval
pub fn wait_for<F>(condition: F, timeout_message: &str)
where
	F: Fn() -> bool,
{
	wait_for_condition(condition, DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL, timeout_message)
}

#[cfg(test)]
mod tests {
	use std::sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	};

	use super::*;

	#[test]
	fn test_wait_for_condition_met() {
		let flag = Arc::new(AtomicBool::new(false));
		let setter = {
			let flag = flag.clone();
			thread::spawn(move || {
				thread::sleep(Duration::from_millis(10));
				flag.store(true, Ordering::SeqCst);
			})
		};
		wait_for(|| flag.load(Ordering::SeqCst), "flag never set");
		setter.join().unwrap();
	}

	#[test]
	#[should_panic(expected = "Timeout after")]
	fn test_wait_for_condition_times_out() {
		wait_for_condition(|| false, Duration::from_millis(10), Duration::from_millis(1), "never");
	}
}
