// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	ffi::{c_char, c_void},
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};

use parking_lot::Mutex;
use vci_abi::StateObjectFFI;

use super::{context, dup, into_obj, release};

pub struct FakeState {
	value: Mutex<String>,
	frees: AtomicUsize,
}

impl FakeState {
	pub fn new(value: &str) -> Arc<Self> {
		Arc::new(Self {
			value: Mutex::new(value.to_string()),
			frees: AtomicUsize::new(0),
		})
	}

	pub fn object(self: &Arc<Self>) -> StateObjectFFI {
		StateObjectFFI {
			obj: into_obj(self),
			get: Some(state_get),
			free: Some(state_free),
		}
	}

	pub fn set(&self, value: &str) {
		*self.value.lock() = value.to_string();
	}

	pub fn frees(&self) -> usize {
		self.frees.load(Ordering::SeqCst)
	}
}

extern "C" fn state_get(obj: *mut c_void, out: *mut *mut c_char) {
	let state = unsafe { context::<FakeState>(obj) };
	let value = state.value.lock().clone();
	unsafe { *out = dup(&value) };
}

extern "C" fn state_free(obj: *mut c_void) {
	let state = unsafe { release::<FakeState>(obj) };
	state.frees.fetch_add(1, Ordering::SeqCst);
}
