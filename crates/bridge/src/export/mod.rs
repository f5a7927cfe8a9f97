// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! C entry points
//!
//! Every entry point runs inside [`guard`], which turns a Rust panic (a trap,
//! such as a stale handle passed where no error channel exists) into a logged
//! process abort so unwinding never crosses the boundary. Fallible entry
//! points return `VCI_OK` or `VCI_ERROR` and describe failures in the
//! caller's error record.

pub mod client;
pub mod component;
pub mod error;
pub mod model;
pub mod rpccall;
pub mod subscription;

use std::{
	any::Any,
	ffi::c_int,
	panic::{AssertUnwindSafe, catch_unwind},
	process::abort,
};

use tracing::{debug, error};
use vci_abi::{ErrorFFI, VCI_ERROR, VCI_OK};
use vci_type::Result;

fn guard<R>(entry: &'static str, body: impl FnOnce() -> R) -> R {
	crate::init();
	match catch_unwind(AssertUnwindSafe(body)) {
		Ok(result) => result,
		Err(panic) => {
			error!(entry, reason = %panic_message(panic.as_ref()), "trapped at the C boundary, aborting");
			abort()
		}
	}
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
	if let Some(message) = panic.downcast_ref::<&str>() {
		message
	} else if let Some(message) = panic.downcast_ref::<String>() {
		message
	} else {
		"unknown panic"
	}
}

/// Map an outcome to a status code, describing a failure in `error` when the
/// caller supplied a record.
///
/// # Safety
/// `error` must be null or point to a valid, initialised record.
unsafe fn status(entry: &'static str, result: Result<()>, error: *mut ErrorFFI) -> c_int {
	match result {
		Ok(()) => VCI_OK,
		Err(err) => {
			debug!(entry, error = %err, "entry point failed");
			if let Some(record) = unsafe { error.as_mut() } {
				unsafe { crate::error::encode(&err, record) };
			}
			VCI_ERROR
		}
	}
}
