// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Boundary value wrappers
//!
//! Host-side adapters around native callback objects. Each wrapper copies the
//! native record when it is created and calls the record's `free` exactly
//! once, when the wrapper is dropped.

mod config;
mod rpc;
mod state;
mod subscriber;

use std::{
	ffi::{c_char, c_void},
	ptr,
};

pub(crate) use config::NativeConfig;
pub(crate) use rpc::NativeRpc;
pub(crate) use state::NativeState;
pub(crate) use subscriber::NativeSubscriber;
use vci_abi::{ConfigApplyFnFFI, FreeFnFFI, GetFnFFI, VCI_OK};
use vci_type::{RawPayload, Result};

use crate::{
	error::ScopedError,
	marshal::{NativeString, payload_to_c},
};

/// Run a validating/applying function; a missing function accepts everything.
fn apply(obj: *mut c_void, apply: Option<ConfigApplyFnFFI>, input: &RawPayload) -> Result<()> {
	let Some(apply) = apply else {
		return Ok(());
	};

	let input = payload_to_c(input)?;
	let mut error = ScopedError::new();
	if apply(obj, input.as_ptr(), error.as_mut_ptr()) != VCI_OK {
		return Err(error.decode().into());
	}
	Ok(())
}

/// Run a getter; a missing getter yields the absent payload.
fn read(obj: *mut c_void, get: Option<GetFnFFI>) -> RawPayload {
	let Some(get) = get else {
		return RawPayload::absent();
	};

	let mut out: *mut c_char = ptr::null_mut();
	get(obj, &mut out);
	NativeString::new(out).to_payload()
}

fn release(obj: *mut c_void, free: Option<FreeFnFFI>) {
	if let Some(free) = free {
		free(obj);
	}
}
