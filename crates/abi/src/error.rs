// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::{ffi::c_char, ptr};

/// Structured error record exchanged across the boundary
///
/// All three fields are NUL-terminated strings allocated with the C allocator
/// by whichever side fills them in. The side that consumes the record releases
/// all three exactly once; a null field means "not set".
#[repr(C)]
#[derive(Debug)]
pub struct ErrorFFI {
	/// Application tag identifying the origin of the failure
	pub app_tag: *mut c_char,
	/// Path of the element the failure refers to
	pub path: *mut c_char,
	/// Human readable description
	pub info: *mut c_char,
}

impl ErrorFFI {
	/// An error record with every field unset
	pub const fn empty() -> Self {
		Self {
			app_tag: ptr::null_mut(),
			path: ptr::null_mut(),
			info: ptr::null_mut(),
		}
	}

	/// True when no field has been populated
	pub fn is_empty(&self) -> bool {
		self.app_tag.is_null() && self.path.is_null() && self.info.is_null()
	}
}

impl Default for ErrorFFI {
	fn default() -> Self {
		Self::empty()
	}
}
