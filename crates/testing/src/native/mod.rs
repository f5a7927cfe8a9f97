// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Fake native objects
//!
//! Each fake lives in an `Arc`; the object record handed to the bridge owns
//! one strong reference through its `obj` pointer, which the record's `free`
//! gives back. Tests keep their own reference to inspect counters after the
//! bridge is done with the object.

mod config;
mod rpc;
mod state;
mod subscriber;

use std::{
	ffi::{CStr, CString, c_char, c_void},
	ptr,
	sync::Arc,
};

pub use config::FakeConfig;
pub use rpc::{FakeRpc, RpcBehaviour};
pub use state::FakeState;
pub use subscriber::FakeSubscriber;
use vci_abi::ErrorFFI;

/// `malloc`-allocated copy of `text`, as native code would produce it.
pub fn dup(text: &str) -> *mut c_char {
	let text = CString::new(text).expect("text has an interior NUL");
	unsafe { libc::strdup(text.as_ptr()) }
}

/// Copy a native string; null reads as `None`.
pub fn read(ptr: *const c_char) -> Option<String> {
	if ptr.is_null() {
		return None;
	}
	Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

/// Copy and `free` a string the bridge handed out.
pub fn take(ptr: *mut c_char) -> Option<String> {
	let text = read(ptr);
	if !ptr.is_null() {
		unsafe { libc::free(ptr as *mut c_void) };
	}
	text
}

/// Fields of an error record, copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorFields {
	pub app_tag: Option<String>,
	pub path: Option<String>,
	pub info: Option<String>,
}

impl ErrorFields {
	pub fn read(record: &ErrorFFI) -> Self {
		Self {
			app_tag: read(record.app_tag),
			path: read(record.path),
			info: read(record.info),
		}
	}
}

/// Fill an error record the way native code reports a failure.
pub fn fail(error: *mut ErrorFFI, app_tag: &str, path: &str, info: &str) {
	if let Some(record) = unsafe { error.as_mut() } {
		record.app_tag = dup(app_tag);
		record.path = if path.is_empty() {
			ptr::null_mut()
		} else {
			dup(path)
		};
		record.info = dup(info);
	}
}

fn into_obj<T>(context: &Arc<T>) -> *mut c_void {
	Arc::into_raw(context.clone()) as *mut c_void
}

/// # Safety
/// `obj` must come from [`into_obj`] for the same `T` and not be released yet.
unsafe fn context<'a, T>(obj: *mut c_void) -> &'a T {
	unsafe { &*(obj as *const T) }
}

/// # Safety
/// `obj` must come from [`into_obj`] for the same `T`; it is consumed.
unsafe fn release<T>(obj: *mut c_void) -> Arc<T> {
	unsafe { Arc::from_raw(obj as *const T) }
}
