// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Subscription lifecycle and flow control.
//!
//! The flow-control setters have no error channel: they trap on a stale
//! handle and are ignored once the subscription has finished.

use std::ffi::c_int;

use vci_abi::{ErrorFFI, HandleFFI};

use super::{guard, status};
use crate::object::{self, trap};

/// Release the subscription handle. A `run` in progress keeps going until the
/// subscription is cancelled or completes.
#[unsafe(no_mangle)]
pub extern "C" fn vci_subscription_free(sub: HandleFFI) {
	guard("vci_subscription_free", || {
		drop(object::unregister(sub));
	})
}

/// Deliver events on the calling thread until cancelled or the bus goes
/// away.
///
/// # Safety
/// `error` must be null or point to an initialised error record.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_subscription_run(sub: HandleFFI, error: *mut ErrorFFI) -> c_int {
	guard("vci_subscription_run", || {
		let result = object::subscription(sub).and_then(|subscription| subscription.run());
		unsafe { status("vci_subscription_run", result, error) }
	})
}

/// # Safety
/// `error` must be null or point to an initialised error record.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_subscription_cancel(sub: HandleFFI, error: *mut ErrorFFI) -> c_int {
	guard("vci_subscription_cancel", || {
		let result = object::subscription(sub).and_then(|subscription| subscription.cancel());
		unsafe { status("vci_subscription_cancel", result, error) }
	})
}

#[unsafe(no_mangle)]
pub extern "C" fn vci_subscription_coalesce(sub: HandleFFI) {
	guard("vci_subscription_coalesce", || {
		trap(object::subscription(sub)).coalesce();
	})
}

#[unsafe(no_mangle)]
pub extern "C" fn vci_subscription_drop_after_limit(sub: HandleFFI, limit: u32) {
	guard("vci_subscription_drop_after_limit", || {
		trap(object::subscription(sub)).drop_after_limit(limit as usize);
	})
}

/// A limit of 0 behaves like 1.
#[unsafe(no_mangle)]
pub extern "C" fn vci_subscription_block_after_limit(sub: HandleFFI, limit: u32) {
	guard("vci_subscription_block_after_limit", || {
		trap(object::subscription(sub)).block_after_limit(limit as usize);
	})
}

#[unsafe(no_mangle)]
pub extern "C" fn vci_subscription_remove_limit(sub: HandleFFI) {
	guard("vci_subscription_remove_limit", || {
		trap(object::subscription(sub)).remove_limit();
	})
}
