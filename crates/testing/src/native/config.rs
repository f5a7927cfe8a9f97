// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	ffi::{c_char, c_int, c_void},
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};

use parking_lot::Mutex;
use vci_abi::{ConfigObjectFFI, ErrorFFI, VCI_ERROR, VCI_OK};

use super::{context, dup, fail, into_obj, read, release};

/// Configuration object that stores whatever it is given. `check` rejects
/// documents equal to the configured rejection marker.
pub struct FakeConfig {
	current: Mutex<String>,
	reject: Option<String>,
	checks: AtomicUsize,
	sets: AtomicUsize,
	frees: AtomicUsize,
}

impl FakeConfig {
	pub fn new(initial: &str) -> Arc<Self> {
		Arc::new(Self {
			current: Mutex::new(initial.to_string()),
			reject: None,
			checks: AtomicUsize::new(0),
			sets: AtomicUsize::new(0),
			frees: AtomicUsize::new(0),
		})
	}

	pub fn rejecting(initial: &str, marker: &str) -> Arc<Self> {
		Arc::new(Self {
			current: Mutex::new(initial.to_string()),
			reject: Some(marker.to_string()),
			checks: AtomicUsize::new(0),
			sets: AtomicUsize::new(0),
			frees: AtomicUsize::new(0),
		})
	}

	/// Object record owning one reference to `self`.
	pub fn object(self: &Arc<Self>) -> ConfigObjectFFI {
		ConfigObjectFFI {
			obj: into_obj(self),
			set: Some(config_set),
			check: Some(config_check),
			get: Some(config_get),
			free: Some(config_free),
		}
	}

	pub fn current(&self) -> String {
		self.current.lock().clone()
	}

	pub fn checks(&self) -> usize {
		self.checks.load(Ordering::SeqCst)
	}

	pub fn sets(&self) -> usize {
		self.sets.load(Ordering::SeqCst)
	}

	pub fn frees(&self) -> usize {
		self.frees.load(Ordering::SeqCst)
	}
}

extern "C" fn config_set(obj: *mut c_void, input: *const c_char, _error: *mut ErrorFFI) -> c_int {
	let config = unsafe { context::<FakeConfig>(obj) };
	config.sets.fetch_add(1, Ordering::SeqCst);
	*config.current.lock() = read(input).unwrap_or_default();
	VCI_OK
}

extern "C" fn config_check(obj: *mut c_void, input: *const c_char, error: *mut ErrorFFI) -> c_int {
	let config = unsafe { context::<FakeConfig>(obj) };
	config.checks.fetch_add(1, Ordering::SeqCst);
	if config.reject.is_some() && read(input) == config.reject {
		fail(error, "config-check", "/config", "configuration rejected");
		return VCI_ERROR;
	}
	VCI_OK
}

extern "C" fn config_get(obj: *mut c_void, out: *mut *mut c_char) {
	let config = unsafe { context::<FakeConfig>(obj) };
	unsafe { *out = dup(&config.current()) };
}

extern "C" fn config_free(obj: *mut c_void) {
	let config = unsafe { release::<FakeConfig>(obj) };
	config.frees.fetch_add(1, Ordering::SeqCst);
}
