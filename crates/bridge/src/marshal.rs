// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! String and payload marshaling across the C boundary
//!
//! Strings handed to native code are allocated with `malloc` so the caller
//! can release them with `free`; strings native code hands back are released
//! with `free` as well.

use std::{
	borrow::Cow,
	ffi::{CStr, CString, c_char},
	ptr,
};

use vci_type::{Error, RawPayload, Result};

/// Borrow a native string; null reads as empty.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives the
/// returned value.
pub(crate) unsafe fn c_str<'a>(ptr: *const c_char) -> Cow<'a, str> {
	if ptr.is_null() {
		return Cow::Borrowed("");
	}
	unsafe { CStr::from_ptr(ptr) }.to_string_lossy()
}

/// Copy a native payload; null reads as the absent payload.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn c_payload(ptr: *const c_char) -> RawPayload {
	if ptr.is_null() {
		return RawPayload::absent();
	}
	RawPayload::decode(unsafe { CStr::from_ptr(ptr) }.to_bytes())
}

/// Encode a payload as a C string for the duration of a native call.
pub(crate) fn payload_to_c(payload: &RawPayload) -> Result<CString> {
	CString::new(payload.encode())
		.map_err(|err| Error::Payload(format!("payload has a NUL byte at offset {}", err.nul_position())))
}

/// Copy `bytes` into a fresh `malloc` allocation with a trailing NUL. Returns
/// null if the allocation fails.
pub(crate) fn alloc_c_string(bytes: &[u8]) -> *mut c_char {
	unsafe {
		let buffer = libc::malloc(bytes.len() + 1) as *mut u8;
		if buffer.is_null() {
			return ptr::null_mut();
		}
		ptr::copy_nonoverlapping(bytes.as_ptr(), buffer, bytes.len());
		*buffer.add(bytes.len()) = 0;
		buffer as *mut c_char
	}
}

/// Hand a payload to the caller through an out-parameter.
///
/// # Safety
/// `out` must be null or valid for a pointer write.
pub(crate) unsafe fn store_payload(out: *mut *mut c_char, payload: &RawPayload) {
	if let Some(out) = unsafe { out.as_mut() } {
		*out = alloc_c_string(payload.encode());
	}
}

/// Owned string produced by native code, released with `free` on drop.
pub(crate) struct NativeString(*mut c_char);

impl NativeString {
	pub(crate) fn new(ptr: *mut c_char) -> Self {
		Self(ptr)
	}

	/// Payload view of the string; null reads as absent.
	pub(crate) fn to_payload(&self) -> RawPayload {
		unsafe { c_payload(self.0) }
	}
}

impl Drop for NativeString {
	fn drop(&mut self) {
		if !self.0.is_null() {
			unsafe { libc::free(self.0 as *mut libc::c_void) };
		}
	}
}
