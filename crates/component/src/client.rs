// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	sync::{Arc, Weak},
	thread,
};

use crossbeam_channel::{Receiver, bounded};
use parking_lot::Mutex;
use tracing::{debug, instrument, warn};
use vci_type::{Error, RawPayload, Result};

use crate::{
	bus::{Connection, DEFAULT_BUS_ADDRESS, Topic},
	subscription::{Subscription, SubscriptionInner},
	traits::Subscriber,
};

/// Caller-side connection to a bus.
///
/// Closing the client ends every subscription opened through it: their
/// backlog is still delivered, then [`Subscription::run`] returns.
pub struct Client {
	connection: Connection,
	subscriptions: Mutex<Vec<Weak<SubscriptionInner>>>,
}

impl Client {
	/// Connect to the bus at the default address.
	pub fn dial() -> Result<Self> {
		Self::dial_address(DEFAULT_BUS_ADDRESS)
	}

	pub fn dial_address(address: &str) -> Result<Self> {
		Ok(Self {
			connection: Connection::open(address)?,
			subscriptions: Mutex::new(Vec::new()),
		})
	}

	pub fn address(&self) -> &str {
		self.connection.address()
	}

	/// Publish a notification to every current subscriber of `module:name`.
	pub fn emit(&self, module: &str, name: &str, payload: &RawPayload) -> Result<()> {
		let bus = self.connection.bus()?;
		let topic: Topic = (module.to_string(), name.to_string());
		bus.emit(&topic, payload);
		Ok(())
	}

	/// Start an RPC. The call runs on its own thread; the returned handle
	/// yields its outcome.
	#[instrument(name = "client::call", level = "debug", skip(self, input))]
	pub fn call(&self, module: &str, name: &str, input: RawPayload) -> RpcCall {
		let bus = match self.connection.bus() {
			Ok(bus) => bus,
			Err(err) => return RpcCall::ready(module, name, Err(err)),
		};

		let (sender, receiver) = bounded(1);
		let (rpc_module, rpc_name) = (module.to_string(), name.to_string());
		let spawned = thread::Builder::new().name(format!("vci-rpc-{name}")).spawn(move || {
			let outcome = bus.dispatch(&rpc_module, &rpc_name, &input);
			if let Err(err) = &outcome {
				debug!(module = %rpc_module, name = %rpc_name, error = %err, "rpc failed");
			}
			// The caller may have dropped its handle already.
			let _ = sender.send(outcome);
		});

		match spawned {
			Ok(_) => RpcCall::pending(module, name, receiver),
			Err(err) => {
				warn!(module = %module, name = %name, error = %err, "could not spawn rpc thread");
				RpcCall::ready(module, name, Err(Error::Internal(format!("failed to spawn rpc thread: {err}"))))
			}
		}
	}

	/// Current configuration of the model called `model`.
	pub fn config_by_model(&self, model: &str) -> Result<RawPayload> {
		let config = self.connection.bus()?.model(model)?.read_config()?;
		validate_document(model, config)
	}

	/// Current operational state of the model called `model`.
	pub fn state_by_model(&self, model: &str) -> Result<RawPayload> {
		let state = self.connection.bus()?.model(model)?.read_state()?;
		validate_document(model, state)
	}

	/// Subscribe to `module:name`. Events are queued from now on; they are
	/// handed to `subscriber` once [`Subscription::run`] is called.
	pub fn subscribe(&self, module: &str, name: &str, subscriber: Arc<dyn Subscriber>) -> Result<Subscription> {
		let bus = self.connection.bus()?;
		let subscription = Subscription::open(&bus, module, name, subscriber);

		let mut subscriptions = self.subscriptions.lock();
		subscriptions.retain(|opened| opened.strong_count() > 0);
		subscriptions.push(subscription.downgrade());
		Ok(subscription)
	}

	/// Close the connection and end the subscriptions opened through it.
	pub fn close(&self) {
		self.connection.close();
		let subscriptions = std::mem::take(&mut *self.subscriptions.lock());
		let mut ended = 0;
		for opened in subscriptions.iter().filter_map(Weak::upgrade) {
			opened.end();
			ended += 1;
		}
		if ended > 0 {
			debug!(address = %self.connection.address(), subscriptions = ended, "client subscriptions ended");
		}
	}

	pub fn is_closed(&self) -> bool {
		self.connection.is_closed()
	}
}

impl Drop for Client {
	fn drop(&mut self) {
		self.close();
	}
}

// Documents handed out to callers must at least parse.
fn validate_document(model: &str, document: RawPayload) -> Result<RawPayload> {
	serde_json::from_slice::<RawPayload>(document.encode())
		.map_err(|err| Error::Payload(format!("model '{model}' returned a malformed document: {err}")))
}

/// Handle to an RPC in flight.
///
/// [`RpcCall::output`] blocks until the call has finished; every later call
/// returns the same outcome.
pub struct RpcCall {
	module: String,
	name: String,
	receiver: Receiver<Result<RawPayload>>,
	outcome: Mutex<Option<Result<RawPayload>>>,
	// Serializes waiters; `outcome` is only ever held briefly.
	waiting: Mutex<()>,
}

impl RpcCall {
	fn pending(module: &str, name: &str, receiver: Receiver<Result<RawPayload>>) -> Self {
		Self {
			module: module.to_string(),
			name: name.to_string(),
			receiver,
			outcome: Mutex::new(None),
			waiting: Mutex::new(()),
		}
	}

	fn ready(module: &str, name: &str, outcome: Result<RawPayload>) -> Self {
		let (_, receiver) = bounded(0);
		Self {
			module: module.to_string(),
			name: name.to_string(),
			receiver,
			outcome: Mutex::new(Some(outcome)),
			waiting: Mutex::new(()),
		}
	}

	pub fn module(&self) -> &str {
		&self.module
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn output(&self) -> Result<RawPayload> {
		if let Some(outcome) = self.outcome.lock().as_ref() {
			return outcome.clone();
		}

		let _waiting = self.waiting.lock();
		// Another waiter may have received the outcome meanwhile.
		if let Some(outcome) = self.outcome.lock().as_ref() {
			return outcome.clone();
		}
		let received = self.receiver.recv().unwrap_or_else(|_| {
			Err(Error::Internal(format!("rpc {}:{} ended without a result", self.module, self.name)))
		});
		*self.outcome.lock() = Some(received.clone());
		received
	}

	/// Whether `output` would return without blocking.
	pub fn is_finished(&self) -> bool {
		self.outcome.lock().is_some() || !self.receiver.is_empty()
	}
}
