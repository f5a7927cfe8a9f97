// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Process-wide table of objects handed to native code.

use std::sync::Arc;

use once_cell::sync::Lazy;
use vci_abi::HandleFFI;
use vci_component::{Client, Component, Model, RpcCall, Subscription};
use vci_type::{Error, Result};

use crate::registry::Registry;

#[derive(Clone)]
pub(crate) enum Object {
	Component(Component),
	Model(Model),
	Client(Arc<Client>),
	RpcCall(Arc<RpcCall>),
	Subscription(Subscription),
}

pub(crate) static OBJECTS: Lazy<Registry<Object>> = Lazy::new(Registry::new);

pub(crate) fn register(object: Object) -> HandleFFI {
	OBJECTS.register(object)
}

pub(crate) fn unregister(handle: HandleFFI) -> Option<Object> {
	OBJECTS.unregister(handle)
}

fn resolve<T>(handle: HandleFFI, expected: &'static str, pick: impl FnOnce(Object) -> Option<T>) -> Result<T> {
	OBJECTS.try_get(handle).and_then(pick).ok_or(Error::InvalidHandle {
		handle,
		expected,
	})
}

pub(crate) fn component(handle: HandleFFI) -> Result<Component> {
	resolve(handle, "component", |object| match object {
		Object::Component(component) => Some(component),
		_ => None,
	})
}

pub(crate) fn model(handle: HandleFFI) -> Result<Model> {
	resolve(handle, "model", |object| match object {
		Object::Model(model) => Some(model),
		_ => None,
	})
}

pub(crate) fn client(handle: HandleFFI) -> Result<Arc<Client>> {
	resolve(handle, "client", |object| match object {
		Object::Client(client) => Some(client),
		_ => None,
	})
}

pub(crate) fn rpc_call(handle: HandleFFI) -> Result<Arc<RpcCall>> {
	resolve(handle, "rpc call", |object| match object {
		Object::RpcCall(call) => Some(call),
		_ => None,
	})
}

pub(crate) fn subscription(handle: HandleFFI) -> Result<Subscription> {
	resolve(handle, "subscription", |object| match object {
		Object::Subscription(subscription) => Some(subscription),
		_ => None,
	})
}

/// Unwrap a lookup for an entry point that has no error channel. A stale
/// handle there is a caller bug and traps.
pub(crate) fn trap<T>(lookup: Result<T>) -> T {
	match lookup {
		Ok(object) => object,
		Err(err) => panic!("{err}"),
	}
}
