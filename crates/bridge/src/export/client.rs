// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Client surface: dial, emit, read configuration and state, call RPCs and
//! subscribe to notifications.

use std::{
	ffi::{c_char, c_int},
	sync::Arc,
};

use tracing::{debug, warn};
use vci_abi::{ErrorFFI, HandleFFI, SubscriberObjectFFI, VCI_INVALID_HANDLE};
use vci_component::Client;

use super::{guard, status};
use crate::{
	config,
	marshal::{c_payload, c_str, store_payload},
	native::NativeSubscriber,
	object::{self, Object, trap},
};

/// Connect to the configured bus and store the new client handle in
/// `client`. Nothing is registered when the bus is unreachable.
///
/// # Safety
/// `client` must be null or valid for a write; `error` must be null or point
/// to an initialised error record.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_client_dial(client: *mut HandleFFI, error: *mut ErrorFFI) -> c_int {
	guard("vci_client_dial", || {
		let result = Client::dial_address(config::current().bus_address()).map(|dialed| {
			let handle = object::register(Object::Client(Arc::new(dialed)));
			debug!(handle, "client dialed");
			if let Some(out) = unsafe { client.as_mut() } {
				*out = handle;
			}
		});
		unsafe { status("vci_client_dial", result, error) }
	})
}

/// Unregister the client, then close its connection. Calls still in flight
/// on other handles keep running.
#[unsafe(no_mangle)]
pub extern "C" fn vci_client_free(client: HandleFFI) {
	guard("vci_client_free", || {
		if let Ok(opened) = object::client(client) {
			object::unregister(client);
			opened.close();
		}
	})
}

/// Publish notification `module:name` with body `data`.
///
/// # Safety
/// String arguments must be null or NUL-terminated; `error` must be null or
/// point to an initialised error record.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_client_emit(
	client: HandleFFI,
	module: *const c_char,
	name: *const c_char,
	data: *const c_char,
	error: *mut ErrorFFI,
) -> c_int {
	guard("vci_client_emit", || {
		let (module, name, data) = unsafe { (c_str(module), c_str(name), c_payload(data)) };
		let result = object::client(client).and_then(|client| client.emit(&module, &name, &data));
		unsafe { status("vci_client_emit", result, error) }
	})
}

/// Store the configuration of `model` into `output`, which the caller
/// releases with `free`.
///
/// # Safety
/// `model` must be null or NUL-terminated; `output` must be null or valid for
/// a write; `error` must be null or point to an initialised error record.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_client_store_config_by_model_into(
	client: HandleFFI,
	model: *const c_char,
	output: *mut *mut c_char,
	error: *mut ErrorFFI,
) -> c_int {
	guard("vci_client_store_config_by_model_into", || {
		let model = unsafe { c_str(model) };
		let result = object::client(client)
			.and_then(|client| client.config_by_model(&model))
			.map(|config| unsafe { store_payload(output, &config) });
		unsafe { status("vci_client_store_config_by_model_into", result, error) }
	})
}

/// Store the operational state of `model` into `output`, which the caller
/// releases with `free`.
///
/// # Safety
/// Same as [`vci_client_store_config_by_model_into`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_client_store_state_by_model_into(
	client: HandleFFI,
	model: *const c_char,
	output: *mut *mut c_char,
	error: *mut ErrorFFI,
) -> c_int {
	guard("vci_client_store_state_by_model_into", || {
		let model = unsafe { c_str(model) };
		let result = object::client(client)
			.and_then(|client| client.state_by_model(&model))
			.map(|state| unsafe { store_payload(output, &state) });
		unsafe { status("vci_client_store_state_by_model_into", result, error) }
	})
}

/// Start RPC `module:name` and return a handle to the call in flight. Traps
/// on a stale client handle.
///
/// # Safety
/// String arguments must be null or NUL-terminated.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_client_call(
	client: HandleFFI,
	module: *const c_char,
	name: *const c_char,
	input: *const c_char,
) -> HandleFFI {
	guard("vci_client_call", || {
		let (module, name, input) = unsafe { (c_str(module), c_str(name), c_payload(input)) };
		let call = trap(object::client(client)).call(&module, &name, input);
		object::register(Object::RpcCall(Arc::new(call)))
	})
}

/// Subscribe to notification `module:name`. Events are queued from now on and
/// delivered once the subscription runs. Returns 0 when the subscription
/// could not be set up; traps on a stale client handle. The bridge takes
/// ownership of the subscriber object.
///
/// # Safety
/// String arguments must be null or NUL-terminated; `subscriber` must be null
/// or point to a valid record.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_client_subscribe(
	client: HandleFFI,
	module: *const c_char,
	name: *const c_char,
	subscriber: *const SubscriberObjectFFI,
) -> HandleFFI {
	guard("vci_client_subscribe", || {
		let (module, name) = unsafe { (c_str(module), c_str(name)) };
		let client = trap(object::client(client));
		let Some(subscriber) = (unsafe { NativeSubscriber::from_ptr(subscriber) }) else {
			warn!(module = %module, name = %name, "null subscriber object");
			return VCI_INVALID_HANDLE;
		};

		match client.subscribe(&module, &name, Arc::new(subscriber)) {
			Ok(subscription) => object::register(Object::Subscription(subscription)),
			Err(err) => {
				warn!(module = %module, name = %name, error = %err, "subscription failed");
				VCI_INVALID_HANDLE
			}
		}
	})
}
