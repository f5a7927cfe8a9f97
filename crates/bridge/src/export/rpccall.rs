// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::ffi::{c_char, c_int};

use vci_abi::{ErrorFFI, HandleFFI};

use super::{guard, status};
use crate::{marshal::store_payload, object};

/// Release the call handle. A call still running completes unobserved.
#[unsafe(no_mangle)]
pub extern "C" fn vci_rpccall_free(call: HandleFFI) {
	guard("vci_rpccall_free", || {
		drop(object::unregister(call));
	})
}

/// Block until the call finishes and store its output into `output`, which
/// the caller releases with `free`. May be called repeatedly.
///
/// # Safety
/// `output` must be null or valid for a write; `error` must be null or point
/// to an initialised error record.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_rpccall_store_output_into(
	call: HandleFFI,
	output: *mut *mut c_char,
	error: *mut ErrorFFI,
) -> c_int {
	guard("vci_rpccall_store_output_into", || {
		let result = object::rpc_call(call)
			.and_then(|call| call.output())
			.map(|out| unsafe { store_payload(output, &out) });
		unsafe { status("vci_rpccall_store_output_into", result, error) }
	})
}
