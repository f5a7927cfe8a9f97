// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Error channel
//!
//! Translates between the native three-field error record and structured
//! application errors. Every field of a record is either null or a `malloc`
//! allocation; whoever reads a record last releases all three fields.

use std::{ffi::CStr, ptr};

use vci_abi::{ErrorFFI, VCI_APP_TAG_FAILURE};
use vci_type::{AppError, Error};

use crate::marshal::{alloc_c_string, c_str};

/// Null every field without releasing anything.
pub fn init(record: &mut ErrorFFI) {
	*record = ErrorFFI::empty();
}

/// Structured form of a record filled in by native code. Fields are copied
/// verbatim; null fields read as empty.
///
/// # Safety
/// Every non-null field must point to a NUL-terminated string.
pub unsafe fn decode(record: &ErrorFFI) -> AppError {
	unsafe {
		AppError::operation_failed()
			.with_app_tag(c_str(record.app_tag))
			.with_path(c_str(record.path))
			.with_message(c_str(record.info))
	}
}

/// Fill `record` from a host error. Fields already present are released
/// first.
///
/// # Safety
/// Every non-null field of `record` must be a live `malloc` allocation.
pub unsafe fn encode(error: &Error, record: &mut ErrorFFI) {
	unsafe { release(record) };

	record.app_tag = alloc_c_string(VCI_APP_TAG_FAILURE.to_bytes());
	record.info = alloc_c_string(error.to_string().as_bytes());
	if let Error::App(app) = error {
		if !app.path.is_empty() {
			record.path = alloc_c_string(app.path.as_bytes());
		}
	}
}

/// Free every field and null it again.
///
/// # Safety
/// Every non-null field must be a live `malloc` allocation.
pub unsafe fn release(record: &mut ErrorFFI) {
	for field in [&mut record.app_tag, &mut record.path, &mut record.info] {
		if !field.is_null() {
			unsafe { libc::free(*field as *mut libc::c_void) };
			*field = ptr::null_mut();
		}
	}
}

/// Human readable rendering of a record.
///
/// # Safety
/// Same as [`decode`].
pub unsafe fn to_string(record: &ErrorFFI) -> String {
	unsafe { decode(record) }.to_string()
}

/// Error record owned by the bridge for the duration of one native call.
pub(crate) struct ScopedError {
	record: ErrorFFI,
}

impl ScopedError {
	pub(crate) fn new() -> Self {
		Self {
			record: ErrorFFI::empty(),
		}
	}

	pub(crate) fn as_mut_ptr(&mut self) -> *mut ErrorFFI {
		&mut self.record
	}

	pub(crate) fn decode(&self) -> AppError {
		unsafe { decode(&self.record) }
	}
}

impl Drop for ScopedError {
	fn drop(&mut self) {
		unsafe { release(&mut self.record) };
	}
}

/// Whether `record` carries the sentinel tag set by [`encode`].
///
/// # Safety
/// Same as [`decode`].
pub unsafe fn is_bridge_failure(record: &ErrorFFI) -> bool {
	!record.app_tag.is_null() && unsafe { CStr::from_ptr(record.app_tag) } == VCI_APP_TAG_FAILURE
}

#[cfg(test)]
mod tests {
	use vci_type::ErrorKind;

	use super::*;

	#[test]
	fn test_decode_all_null() {
		let record = ErrorFFI::empty();
		let app = unsafe { decode(&record) };
		assert_eq!(app.kind, ErrorKind::OperationFailed);
		assert!(app.app_tag.is_empty());
		assert!(app.path.is_empty());
		assert!(app.message.is_empty());
	}

	#[test]
	fn test_reencode_all_null() {
		let mut record = ErrorFFI::empty();
		let app = unsafe { decode(&record) };
		unsafe { encode(&Error::App(app), &mut record) };

		assert!(unsafe { is_bridge_failure(&record) });
		assert!(record.path.is_null());
		assert_eq!(unsafe { CStr::from_ptr(record.info) }.to_bytes(), b"operation-failed");

		unsafe { release(&mut record) };
		assert!(record.is_empty());
	}

	#[test]
	fn test_encode_keeps_path_of_app_errors() {
		let mut record = ErrorFFI::empty();
		let app = AppError::operation_failed().with_app_tag("rpc-failure").with_path("/a/b").with_message("boom");
		unsafe { encode(&Error::App(app), &mut record) };

		let decoded = unsafe { decode(&record) };
		assert_eq!(decoded.app_tag, "vci-failure");
		assert_eq!(decoded.path, "/a/b");
		assert_eq!(decoded.message, "operation-failed [rpc-failure]: /a/b: boom");
		unsafe { release(&mut record) };
	}

	#[test]
	fn test_encode_other_errors_without_path() {
		let mut record = ErrorFFI::empty();
		unsafe { encode(&Error::Transport("no bus reachable at 'vci'".to_string()), &mut record) };

		assert!(record.path.is_null());
		assert_eq!(unsafe { to_string(&record) }, "operation-failed [vci-failure]: transport error: no bus reachable at 'vci'");
		unsafe { release(&mut record) };
	}

	#[test]
	fn test_encode_releases_previous_fields() {
		let mut record = ErrorFFI::empty();
		unsafe { encode(&Error::Internal("first".to_string()), &mut record) };
		unsafe { encode(&Error::Internal("second".to_string()), &mut record) };
		assert_eq!(unsafe { decode(&record) }.message, "internal error: second");
		unsafe { release(&mut record) };
	}

	#[test]
	fn test_release_is_repeatable() {
		let mut record = ErrorFFI::empty();
		unsafe { encode(&Error::Internal("x".to_string()), &mut record) };
		unsafe { release(&mut record) };
		unsafe { release(&mut record) };
		assert!(record.is_empty());
	}

	#[test]
	fn test_init_nulls_fields() {
		let mut record = ErrorFFI {
			app_tag: alloc_c_string(b"t"),
			path: ptr::null_mut(),
			info: ptr::null_mut(),
		};
		let tag = record.app_tag;
		init(&mut record);
		assert!(record.is_empty());
		unsafe { libc::free(tag as *mut libc::c_void) };
	}
}
