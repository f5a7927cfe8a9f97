// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Notification delivery through client subscriptions and component
//! subscribers.

use std::{ffi::CString, ptr, thread, time::Duration};

use vci::export::{
	client::{vci_client_dial, vci_client_emit, vci_client_free, vci_client_subscribe},
	component::{
		vci_component_free, vci_component_new, vci_component_run, vci_component_subscribe,
		vci_component_unsubscribe,
	},
	error::vci_error_free,
	subscription::{
		vci_subscription_cancel, vci_subscription_coalesce, vci_subscription_drop_after_limit,
		vci_subscription_free, vci_subscription_run,
	},
};
use vci_abi::{ErrorFFI, VCI_ERROR, VCI_INVALID_HANDLE, VCI_OK};
use vci_testing::{
	bus::shared_bus,
	native::{ErrorFields, FakeSubscriber},
	util::{unique_name, wait_for},
};

const TIMEOUT: Duration = Duration::from_secs(2);

fn dial() -> u64 {
	shared_bus();
	let mut client = VCI_INVALID_HANDLE;
	let mut error = ErrorFFI::empty();
	assert_eq!(unsafe { vci_client_dial(&mut client, &mut error) }, VCI_OK);
	client
}

fn emit(client: u64, module: &CString, name: &CString, data: &str) {
	let data = CString::new(data).unwrap();
	let mut error = ErrorFFI::empty();
	assert_eq!(unsafe { vci_client_emit(client, module.as_ptr(), name.as_ptr(), data.as_ptr(), &mut error) }, VCI_OK);
}

fn topic(prefix: &str) -> (CString, CString) {
	(CString::new(unique_name(prefix)).unwrap(), CString::new("event").unwrap())
}

#[test]
fn test_drop_after_limit_keeps_oldest() {
	let client = dial();
	let (module, name) = topic("drop");
	let subscriber = FakeSubscriber::new();
	let sub = unsafe { vci_client_subscribe(client, module.as_ptr(), name.as_ptr(), &subscriber.object()) };
	assert_ne!(sub, VCI_INVALID_HANDLE);

	vci_subscription_drop_after_limit(sub, 2);
	for n in 1..=5 {
		emit(client, &module, &name, &n.to_string());
	}

	let runner = thread::spawn(move || unsafe { vci_subscription_run(sub, ptr::null_mut()) });
	assert_eq!(subscriber.next(TIMEOUT).as_deref(), Some("1"));
	assert_eq!(subscriber.next(TIMEOUT).as_deref(), Some("2"));
	assert_eq!(subscriber.next(Duration::from_millis(100)), None);

	let mut error = ErrorFFI::empty();
	assert_eq!(unsafe { vci_subscription_cancel(sub, &mut error) }, VCI_OK);
	assert_eq!(runner.join().unwrap(), VCI_OK);

	vci_subscription_free(sub);
	vci_client_free(client);
}

#[test]
fn test_coalesce_delivers_latest() {
	let client = dial();
	let (module, name) = topic("coalesce");
	let subscriber = FakeSubscriber::new();
	let sub = unsafe { vci_client_subscribe(client, module.as_ptr(), name.as_ptr(), &subscriber.object()) };

	vci_subscription_coalesce(sub);
	for n in 1..=3 {
		emit(client, &module, &name, &format!("{{\"n\":{n}}}"));
	}

	let runner = thread::spawn(move || unsafe { vci_subscription_run(sub, ptr::null_mut()) });
	assert_eq!(subscriber.next(TIMEOUT).as_deref(), Some(r#"{"n":3}"#));
	assert_eq!(subscriber.next(Duration::from_millis(100)), None);

	unsafe { vci_subscription_cancel(sub, ptr::null_mut()) };
	runner.join().unwrap();
	vci_subscription_free(sub);
	vci_client_free(client);
}

#[test]
fn test_cancel_unblocks_run_and_finishes() {
	let client = dial();
	let (module, name) = topic("cancel");
	let subscriber = FakeSubscriber::new();
	let sub = unsafe { vci_client_subscribe(client, module.as_ptr(), name.as_ptr(), &subscriber.object()) };

	let runner = thread::spawn(move || unsafe { vci_subscription_run(sub, ptr::null_mut()) });
	emit(client, &module, &name, "\"live\"");
	assert_eq!(subscriber.next(TIMEOUT).as_deref(), Some("\"live\""));

	assert_eq!(unsafe { vci_subscription_cancel(sub, ptr::null_mut()) }, VCI_OK);
	assert_eq!(runner.join().unwrap(), VCI_OK);

	// a finished subscription cannot be cancelled or run again
	let mut error = ErrorFFI::empty();
	assert_eq!(unsafe { vci_subscription_cancel(sub, &mut error) }, VCI_ERROR);
	assert!(ErrorFields::read(&error).info.unwrap().contains("has already finished"));
	unsafe { vci_error_free(&mut error) };
	assert_eq!(unsafe { vci_subscription_run(sub, &mut error) }, VCI_ERROR);
	unsafe { vci_error_free(&mut error) };

	// flow-control changes after the end are ignored
	vci_subscription_drop_after_limit(sub, 1);

	vci_subscription_free(sub);
	vci_client_free(client);
}

#[test]
fn test_subscriber_freed_once_with_subscription() {
	let client = dial();
	let (module, name) = topic("free");
	let subscriber = FakeSubscriber::new();
	let sub = unsafe { vci_client_subscribe(client, module.as_ptr(), name.as_ptr(), &subscriber.object()) };
	assert_eq!(subscriber.frees(), 0);

	vci_subscription_free(sub);
	vci_subscription_free(sub);
	assert_eq!(subscriber.frees(), 1);
	vci_client_free(client);
}

#[test]
fn test_null_subscriber_yields_invalid_handle() {
	let client = dial();
	let (module, name) = topic("null");
	let sub = unsafe { vci_client_subscribe(client, module.as_ptr(), name.as_ptr(), ptr::null()) };
	assert_eq!(sub, VCI_INVALID_HANDLE);
	vci_client_free(client);
}

#[test]
fn test_component_subscriber() {
	let client = dial();
	let (module, name) = topic("component-sub");
	let component_name = CString::new(unique_name("subscriber")).unwrap();
	let comp = unsafe { vci_component_new(component_name.as_ptr()) };
	let subscriber = FakeSubscriber::new();
	let mut error = ErrorFFI::empty();

	assert_eq!(
		unsafe { vci_component_subscribe(comp, module.as_ptr(), name.as_ptr(), &subscriber.object(), &mut error) },
		VCI_OK
	);
	assert_eq!(unsafe { vci_component_run(comp, &mut error) }, VCI_OK);

	emit(client, &module, &name, "\"up\"");
	assert_eq!(subscriber.next(TIMEOUT).as_deref(), Some("\"up\""));

	assert_eq!(unsafe { vci_component_unsubscribe(comp, module.as_ptr(), name.as_ptr(), &mut error) }, VCI_OK);
	wait_for(|| subscriber.frees() == 1, "subscriber was not released");
	emit(client, &module, &name, "\"down\"");
	assert_eq!(subscriber.next(Duration::from_millis(100)), None);

	assert_eq!(unsafe { vci_component_unsubscribe(comp, module.as_ptr(), name.as_ptr(), &mut error) }, VCI_ERROR);
	assert!(ErrorFields::read(&error).info.unwrap().contains("no subscription to"));
	unsafe { vci_error_free(&mut error) };

	vci_component_free(comp);
	vci_client_free(client);
}

#[test]
fn test_component_null_subscriber_is_rejected() {
	shared_bus();
	let component_name = CString::new(unique_name("null-subscriber")).unwrap();
	let comp = unsafe { vci_component_new(component_name.as_ptr()) };
	let mut error = ErrorFFI::empty();

	assert_eq!(
		unsafe { vci_component_subscribe(comp, c"m".as_ptr(), c"n".as_ptr(), ptr::null(), &mut error) },
		VCI_ERROR
	);
	assert!(ErrorFields::read(&error).info.unwrap().contains("subscriber object is null"));
	unsafe { vci_error_free(&mut error) };
	vci_component_free(comp);
}

#[test]
fn test_freeing_client_completes_running_subscription() {
	let client = dial();
	let other = dial();
	let (module, name) = topic("client-free");
	let subscriber = FakeSubscriber::new();
	let sub = unsafe { vci_client_subscribe(client, module.as_ptr(), name.as_ptr(), &subscriber.object()) };

	let runner = thread::spawn(move || unsafe { vci_subscription_run(sub, ptr::null_mut()) });
	emit(other, &module, &name, "\"before\"");
	assert_eq!(subscriber.next(TIMEOUT).as_deref(), Some("\"before\""));

	vci_client_free(client);
	assert_eq!(runner.join().unwrap(), VCI_OK);

	emit(other, &module, &name, "\"after\"");
	assert_eq!(subscriber.next(Duration::from_millis(100)), None);

	vci_subscription_free(sub);
	vci_client_free(other);
}
