// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{ffi::c_char, ptr};

use vci_abi::ErrorFFI;

use super::guard;
use crate::{error as channel, marshal::alloc_c_string};

/// Null every field of a record before first use.
///
/// # Safety
/// `error` must be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_error_init(error: *mut ErrorFFI) {
	guard("vci_error_init", || {
		if let Some(record) = unsafe { error.as_mut() } {
			channel::init(record);
		}
	})
}

/// Render a record as text. The caller releases the result with `free`.
///
/// # Safety
/// `error` must be null or point to an initialised record.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_error_string(error: *mut ErrorFFI) -> *mut c_char {
	guard("vci_error_string", || match unsafe { error.as_ref() } {
		Some(record) => alloc_c_string(unsafe { channel::to_string(record) }.as_bytes()),
		None => ptr::null_mut(),
	})
}

/// Release every field of a record and null it again.
///
/// # Safety
/// `error` must be null or point to an initialised record.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_error_free(error: *mut ErrorFFI) {
	guard("vci_error_free", || {
		if let Some(record) = unsafe { error.as_mut() } {
			unsafe { channel::release(record) };
		}
	})
}
