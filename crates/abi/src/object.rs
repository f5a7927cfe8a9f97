// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Native callback objects
//!
//! Each object is a context pointer plus a set of function pointers operating
//! on it. Native code owns the context; the bridge copies the record when it is
//! handed over and calls `free` exactly once when it no longer needs the
//! object. A null `free` means the object needs no cleanup.

use core::ffi::{c_char, c_int, c_void};

use crate::ErrorFFI;

/// Release function shared by every object kind
pub type FreeFnFFI = extern "C" fn(obj: *mut c_void);

/// Getter producing a freshly allocated encoded document in `out`
pub type GetFnFFI = extern "C" fn(obj: *mut c_void, out: *mut *mut c_char);

/// Validating or applying a configuration document
pub type ConfigApplyFnFFI = extern "C" fn(obj: *mut c_void, input: *const c_char, error: *mut ErrorFFI) -> c_int;

/// Configuration object attached to a model
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ConfigObjectFFI {
	/// Native context passed back to every function
	pub obj: *mut c_void,

	/// Apply a new configuration
	///
	/// # Parameters
	/// - `obj`: The native context
	/// - `input`: Encoded configuration document
	/// - `error`: Error record to populate on failure
	///
	/// # Returns
	/// - 0 on success, non-zero on failure
	pub set: Option<ConfigApplyFnFFI>,

	/// Validate a candidate configuration without applying it
	///
	/// Same contract as `set`.
	pub check: Option<ConfigApplyFnFFI>,

	/// Return the configuration currently in effect
	///
	/// # Parameters
	/// - `obj`: The native context
	/// - `out`: Receives a `malloc`-allocated document owned by the caller
	pub get: Option<GetFnFFI>,

	/// Release the native context
	pub free: Option<FreeFnFFI>,
}

/// Operational state object attached to a model
#[repr(C)]
#[derive(Clone, Copy)]
pub struct StateObjectFFI {
	pub obj: *mut c_void,
	/// Return the current state, see [`ConfigObjectFFI::get`]
	pub get: Option<GetFnFFI>,
	pub free: Option<FreeFnFFI>,
}

/// RPC implementation registered under a module and RPC name
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RpcObjectFFI {
	pub obj: *mut c_void,

	/// Invoke the RPC
	///
	/// # Parameters
	/// - `obj`: The native context
	/// - `input`: Encoded RPC input
	/// - `out`: Receives the `malloc`-allocated encoded output on success
	/// - `error`: Error record to populate on failure
	///
	/// # Returns
	/// - 0 on success, non-zero on failure
	pub call: Option<
		extern "C" fn(obj: *mut c_void, input: *const c_char, out: *mut *mut c_char, error: *mut ErrorFFI) -> c_int,
	>,

	pub free: Option<FreeFnFFI>,
}

/// Notification subscriber
#[repr(C)]
#[derive(Clone, Copy)]
pub struct SubscriberObjectFFI {
	pub obj: *mut c_void,

	/// Deliver one notification
	///
	/// # Parameters
	/// - `obj`: The native context
	/// - `input`: Encoded notification body, only valid for the duration of the call
	pub subscriber: Option<extern "C" fn(obj: *mut c_void, input: *const c_char)>,

	pub free: Option<FreeFnFFI>,
}
