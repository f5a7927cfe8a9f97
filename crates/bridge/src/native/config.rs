// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tracing::instrument;
use vci_abi::ConfigObjectFFI;
use vci_component::Config;
use vci_type::{RawPayload, Result};

/// Native configuration object attached to a model.
pub(crate) struct NativeConfig {
	record: ConfigObjectFFI,
}

// SAFETY: native objects handed to the bridge must accept calls from any
// thread; the record itself is plain data.
unsafe impl Send for NativeConfig {}
unsafe impl Sync for NativeConfig {}

impl NativeConfig {
	/// Copy the record behind `record`; `None` if it is null.
	///
	/// # Safety
	/// `record` must be null or point to a valid record.
	pub(crate) unsafe fn from_ptr(record: *const ConfigObjectFFI) -> Option<Self> {
		unsafe { record.as_ref() }.map(|record| Self {
			record: *record,
		})
	}
}

impl Config for NativeConfig {
	#[instrument(name = "native::config::set", level = "trace", skip_all)]
	fn set(&self, input: &RawPayload) -> Result<()> {
		super::apply(self.record.obj, self.record.set, input)
	}

	#[instrument(name = "native::config::check", level = "trace", skip_all)]
	fn check(&self, input: &RawPayload) -> Result<()> {
		super::apply(self.record.obj, self.record.check, input)
	}

	fn get(&self) -> RawPayload {
		super::read(self.record.obj, self.record.get)
	}
}

impl Drop for NativeConfig {
	fn drop(&mut self) {
		super::release(self.record.obj, self.record.free);
	}
}
