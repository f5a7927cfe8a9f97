// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Entry points used while no bus is bound.

use std::ptr;

use vci::export::{
	client::vci_client_dial,
	component::{vci_component_free, vci_component_new, vci_component_run, vci_component_wait},
	error::{vci_error_free, vci_error_string},
};
use vci_abi::{ErrorFFI, VCI_ERROR, VCI_INVALID_HANDLE};
use vci_testing::native::{ErrorFields, take};

#[test]
fn test_dial_unreachable_bus() {
	let mut client = VCI_INVALID_HANDLE;
	let mut error = ErrorFFI::empty();

	let status = unsafe { vci_client_dial(&mut client, &mut error) };
	assert_eq!(status, VCI_ERROR);
	assert_eq!(client, VCI_INVALID_HANDLE);

	let fields = ErrorFields::read(&error);
	assert_eq!(fields.app_tag.as_deref(), Some("vci-failure"));
	assert_eq!(fields.path, None);
	assert!(fields.info.unwrap().contains("no bus reachable at 'vci'"));

	let rendered = take(unsafe { vci_error_string(&mut error) }).unwrap();
	assert!(rendered.starts_with("operation-failed [vci-failure]: transport error"));

	unsafe { vci_error_free(&mut error) };
	assert!(error.is_empty());
}

#[test]
fn test_run_without_bus_fails() {
	let comp = unsafe { vci_component_new(c"orphan".as_ptr()) };
	let mut error = ErrorFFI::empty();

	assert_eq!(unsafe { vci_component_run(comp, &mut error) }, VCI_ERROR);
	assert!(ErrorFields::read(&error).info.unwrap().contains("transport error"));
	unsafe { vci_error_free(&mut error) };

	assert_eq!(unsafe { vci_component_wait(comp, &mut error) }, VCI_ERROR);
	assert_eq!(ErrorFields::read(&error).info.as_deref(), Some("component 'orphan' is not running"));
	unsafe { vci_error_free(&mut error) };

	vci_component_free(comp);
}

#[test]
fn test_null_error_record_is_tolerated() {
	let mut client = VCI_INVALID_HANDLE;
	assert_eq!(unsafe { vci_client_dial(&mut client, ptr::null_mut()) }, VCI_ERROR);
	assert!(unsafe { vci_error_string(ptr::null_mut()) }.is_null());
}
