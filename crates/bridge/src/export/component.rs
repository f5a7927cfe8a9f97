// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Component lifecycle: `new -> run -> (wait | stop) -> free`.

use std::{
	ffi::{c_char, c_int},
	sync::Arc,
};

use tracing::debug;
use vci_abi::{ErrorFFI, HandleFFI, SubscriberObjectFFI};
use vci_component::{Client, Component};
use vci_type::{AppError, ErrorKind};

use super::{guard, status};
use crate::{
	config,
	marshal::c_str,
	native::NativeSubscriber,
	object::{self, Object, trap},
};

/// Create a component called `name`, to run on the configured bus.
///
/// # Safety
/// `name` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_component_new(name: *const c_char) -> HandleFFI {
	guard("vci_component_new", || {
		let name = unsafe { c_str(name) };
		let component = Component::with_address(name.as_ref(), config::current().bus_address());
		let handle = object::register(Object::Component(component));
		debug!(component = %name, handle, "component created");
		handle
	})
}

/// Release the component handle. A running component stops once nothing
/// else refers to it. Unknown handles are ignored.
#[unsafe(no_mangle)]
pub extern "C" fn vci_component_free(comp: HandleFFI) {
	guard("vci_component_free", || {
		drop(object::unregister(comp));
	})
}

/// Connect to the bus and start serving; returns without blocking.
///
/// # Safety
/// `error` must be null or point to an initialised error record.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_component_run(comp: HandleFFI, error: *mut ErrorFFI) -> c_int {
	guard("vci_component_run", || {
		let result = object::component(comp).and_then(|component| component.run());
		unsafe { status("vci_component_run", result, error) }
	})
}

/// Block until the component stops. Fails if it never ran or stopped
/// because of an error.
///
/// # Safety
/// `error` must be null or point to an initialised error record.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_component_wait(comp: HandleFFI, error: *mut ErrorFFI) -> c_int {
	guard("vci_component_wait", || {
		let result = object::component(comp).and_then(|component| component.wait());
		unsafe { status("vci_component_wait", result, error) }
	})
}

/// Request orderly termination; repeated calls succeed.
///
/// # Safety
/// `error` must be null or point to an initialised error record.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_component_stop(comp: HandleFFI, error: *mut ErrorFFI) -> c_int {
	guard("vci_component_stop", || {
		let result = object::component(comp).and_then(|component| component.stop());
		unsafe { status("vci_component_stop", result, error) }
	})
}

/// Open a client on the component's bus and store its handle in `client`.
///
/// # Safety
/// `client` must be null or valid for a write; `error` must be null or point
/// to an initialised error record.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_component_client(comp: HandleFFI, client: *mut HandleFFI, error: *mut ErrorFFI) -> c_int {
	guard("vci_component_client", || {
		let result = object::component(comp).and_then(|component| component.client()).map(|opened: Client| {
			let handle = object::register(Object::Client(Arc::new(opened)));
			if let Some(out) = unsafe { client.as_mut() } {
				*out = handle;
			}
		});
		unsafe { status("vci_component_client", result, error) }
	})
}

/// Deliver notifications `module:name` to a native subscriber, replacing any
/// earlier subscriber for the same notification. The bridge takes ownership
/// of the subscriber object, also on failure.
///
/// # Safety
/// String arguments must be null or NUL-terminated; `subscriber` must be null
/// or point to a valid record; `error` must be null or point to an
/// initialised error record.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_component_subscribe(
	comp: HandleFFI,
	module: *const c_char,
	name: *const c_char,
	subscriber: *const SubscriberObjectFFI,
	error: *mut ErrorFFI,
) -> c_int {
	guard("vci_component_subscribe", || {
		let (module, name) = unsafe { (c_str(module), c_str(name)) };
		let subscriber = unsafe { NativeSubscriber::from_ptr(subscriber) };
		let result = object::component(comp).and_then(|component| {
			let subscriber = subscriber.ok_or_else(|| {
				AppError::new(ErrorKind::InvalidValue).with_message("subscriber object is null")
			})?;
			component.subscribe(&module, &name, Arc::new(subscriber))
		});
		unsafe { status("vci_component_subscribe", result, error) }
	})
}

/// # Safety
/// String arguments must be null or NUL-terminated; `error` must be null or
/// point to an initialised error record.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_component_unsubscribe(
	comp: HandleFFI,
	module: *const c_char,
	name: *const c_char,
	error: *mut ErrorFFI,
) -> c_int {
	guard("vci_component_unsubscribe", || {
		let (module, name) = unsafe { (c_str(module), c_str(name)) };
		let result = object::component(comp).and_then(|component| component.unsubscribe(&module, &name));
		unsafe { status("vci_component_unsubscribe", result, error) }
	})
}

/// Handle to the model called `name`, created on first use. Traps on a stale
/// component handle.
///
/// # Safety
/// `name` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_component_model(comp: HandleFFI, name: *const c_char) -> HandleFFI {
	guard("vci_component_model", || {
		let name = unsafe { c_str(name) };
		let model = trap(object::component(comp)).model(&name);
		object::register(Object::Model(model))
	})
}
