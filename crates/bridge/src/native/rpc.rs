// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{ffi::c_char, ptr};

use tracing::instrument;
use vci_abi::{RpcObjectFFI, VCI_OK};
use vci_component::Method;
use vci_type::{AppError, RawPayload, Result};

use crate::{
	error::ScopedError,
	marshal::{NativeString, payload_to_c},
};

/// Native implementation of a single RPC.
pub(crate) struct NativeRpc {
	record: RpcObjectFFI,
}

// SAFETY: see `NativeConfig`.
unsafe impl Send for NativeRpc {}
unsafe impl Sync for NativeRpc {}

impl NativeRpc {
	/// # Safety
	/// `record` must be null or point to a valid record.
	pub(crate) unsafe fn from_ptr(record: *const RpcObjectFFI) -> Option<Self> {
		unsafe { record.as_ref() }.map(|record| Self {
			record: *record,
		})
	}
}

impl Method for NativeRpc {
	#[instrument(name = "native::rpc::call", level = "trace", skip_all)]
	fn call(&self, input: &RawPayload) -> Result<RawPayload> {
		let Some(call) = self.record.call else {
			return Err(AppError::operation_failed().with_message("RPC has no implementation").into());
		};

		let input = payload_to_c(input)?;
		let mut out: *mut c_char = ptr::null_mut();
		let mut error = ScopedError::new();
		let status = call(self.record.obj, input.as_ptr(), &mut out, error.as_mut_ptr());
		// Native code may hand back output even when it fails.
		let output = NativeString::new(out);
		if status != VCI_OK {
			return Err(error.decode().into());
		}
		Ok(output.to_payload())
	}
}

impl Drop for NativeRpc {
	fn drop(&mut self) {
		super::release(self.record.obj, self.record.free);
	}
}
