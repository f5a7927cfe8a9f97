// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Bridge configured to start its own bus. Lives in its own test binary since
//! configuration is fixed on the first entry point.

use std::ffi::CString;

use vci::{
	BridgeConfig, configure,
	export::{
		client::{vci_client_dial, vci_client_free, vci_client_store_state_by_model_into},
		component::{vci_component_free, vci_component_model, vci_component_new, vci_component_run},
		model::{vci_model_free, vci_model_state},
	},
};
use vci_abi::{ErrorFFI, VCI_INVALID_HANDLE, VCI_OK};
use vci_testing::native::{FakeState, take};

#[test]
fn test_autostarted_bus_serves_components() {
	let config = BridgeConfig::builder().bus_address("autostart-test").autostart_bus(true).build();
	assert!(configure(config).is_ok());
	assert_eq!(vci::config::current().bus_address(), "autostart-test");

	let name = CString::new("autostart-component").unwrap();
	let comp = unsafe { vci_component_new(name.as_ptr()) };
	let model = unsafe { vci_component_model(comp, c"autostart-model".as_ptr()) };
	let state = FakeState::new(r#"{"up":true}"#);
	unsafe { vci_model_state(model, &state.object()) };

	let mut error = ErrorFFI::empty();
	assert_eq!(unsafe { vci_component_run(comp, &mut error) }, VCI_OK);

	let mut client = VCI_INVALID_HANDLE;
	assert_eq!(unsafe { vci_client_dial(&mut client, &mut error) }, VCI_OK);
	let mut out = std::ptr::null_mut();
	assert_eq!(
		unsafe { vci_client_store_state_by_model_into(client, c"autostart-model".as_ptr(), &mut out, &mut error) },
		VCI_OK
	);
	assert_eq!(take(out).as_deref(), Some(r#"{"up":true}"#));

	// a second configuration is refused once set
	assert!(configure(BridgeConfig::default()).is_err());

	vci_client_free(client);
	vci_model_free(model);
	vci_component_free(comp);
}
