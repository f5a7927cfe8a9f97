// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use vci_abi::StateObjectFFI;
use vci_component::State;
use vci_type::RawPayload;

pub(crate) struct NativeState {
	record: StateObjectFFI,
}

// SAFETY: see `NativeConfig`.
unsafe impl Send for NativeState {}
unsafe impl Sync for NativeState {}

impl NativeState {
	/// # Safety
	/// `record` must be null or point to a valid record.
	pub(crate) unsafe fn from_ptr(record: *const StateObjectFFI) -> Option<Self> {
		unsafe { record.as_ref() }.map(|record| Self {
			record: *record,
		})
	}
}

impl State for NativeState {
	fn get(&self) -> RawPayload {
		super::read(self.record.obj, self.record.get)
	}
}

impl Drop for NativeState {
	fn drop(&mut self) {
		super::release(self.record.obj, self.record.free);
	}
}
