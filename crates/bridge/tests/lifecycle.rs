// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{ffi::CString, ptr, thread, time::Duration};

use vci::export::{
	client::{vci_client_emit, vci_client_free},
	component::{
		vci_component_client, vci_component_free, vci_component_new, vci_component_run, vci_component_stop,
		vci_component_wait,
	},
	error::vci_error_free,
};
use vci_abi::{ErrorFFI, VCI_ERROR, VCI_INVALID_HANDLE, VCI_OK};
use vci_testing::{bus::shared_bus, native::ErrorFields, util::unique_name};

fn new_component(prefix: &str) -> u64 {
	let name = CString::new(unique_name(prefix)).unwrap();
	unsafe { vci_component_new(name.as_ptr()) }
}

#[test]
fn test_run_stop_wait() {
	shared_bus();
	let comp = new_component("lifecycle");
	let mut error = ErrorFFI::empty();

	assert_eq!(unsafe { vci_component_run(comp, &mut error) }, VCI_OK);
	assert!(error.is_empty());

	let waiter = thread::spawn(move || unsafe { vci_component_wait(comp, ptr::null_mut()) });
	thread::sleep(Duration::from_millis(20));
	assert_eq!(unsafe { vci_component_stop(comp, &mut error) }, VCI_OK);
	assert_eq!(waiter.join().unwrap(), VCI_OK);

	// stop is idempotent
	assert_eq!(unsafe { vci_component_stop(comp, &mut error) }, VCI_OK);
	vci_component_free(comp);
}

#[test]
fn test_second_run_fails() {
	shared_bus();
	let comp = new_component("twice");
	let mut error = ErrorFFI::empty();

	assert_eq!(unsafe { vci_component_run(comp, &mut error) }, VCI_OK);
	assert_eq!(unsafe { vci_component_run(comp, &mut error) }, VCI_ERROR);
	assert!(ErrorFields::read(&error).info.unwrap().contains("is already running"));
	unsafe { vci_error_free(&mut error) };

	vci_component_free(comp);
}

#[test]
fn test_free_never_run_component() {
	let comp = new_component("idle");
	vci_component_free(comp);
	// freeing again is a no-op
	vci_component_free(comp);
}

#[test]
fn test_use_after_free_is_rejected() {
	let comp = new_component("freed");
	vci_component_free(comp);

	let mut error = ErrorFFI::empty();
	assert_eq!(unsafe { vci_component_run(comp, &mut error) }, VCI_ERROR);
	let info = ErrorFields::read(&error).info.unwrap();
	assert_eq!(info, format!("invalid component handle {comp}"));
	unsafe { vci_error_free(&mut error) };
}

#[test]
fn test_component_client() {
	shared_bus();
	let comp = new_component("with-client");
	let mut client = VCI_INVALID_HANDLE;
	let mut error = ErrorFFI::empty();

	assert_eq!(unsafe { vci_component_client(comp, &mut client, &mut error) }, VCI_OK);
	assert_ne!(client, VCI_INVALID_HANDLE);

	let status = unsafe {
		vci_client_emit(client, c"lifecycle".as_ptr(), c"nobody-listens".as_ptr(), c"{}".as_ptr(), &mut error)
	};
	assert_eq!(status, VCI_OK);

	vci_client_free(client);
	let status = unsafe {
		vci_client_emit(client, c"lifecycle".as_ptr(), c"nobody-listens".as_ptr(), c"{}".as_ptr(), &mut error)
	};
	assert_eq!(status, VCI_ERROR);
	assert_eq!(ErrorFields::read(&error).info, Some(format!("invalid client handle {client}")));
	unsafe { vci_error_free(&mut error) };

	vci_component_free(comp);
}
