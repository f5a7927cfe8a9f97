// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! In-process message bus.
//!
//! A bus is bound to a textual address in a process-wide directory. Components
//! and clients reach it through a [`Connection`]; once the owning [`Bus`] is
//! dropped, every connection fails with a transport error, component
//! deliveries stop and running components are told the bus went away.

use std::{
	collections::HashMap,
	sync::{
		Arc, Weak,
		atomic::{AtomicBool, AtomicU64, Ordering},
	},
};

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, instrument, trace};
use vci_type::{Error, RawPayload, Result};

use crate::{
	model::Model,
	queue::{EventQueue, PushOutcome},
};

/// Address a component or client uses when none is given.
pub const DEFAULT_BUS_ADDRESS: &str = "vci";

static DIRECTORY: Lazy<RwLock<HashMap<String, Weak<BusInner>>>> = Lazy::new(|| RwLock::new(HashMap::new()));

/// Notification topic: module and notification name.
pub(crate) type Topic = (String, String);

pub(crate) type CloseHook = Box<dyn FnOnce() + Send>;

/// Owner of a bound bus address.
pub struct Bus {
	inner: Arc<BusInner>,
}

impl Bus {
	/// Bind a new bus to `address`.
	pub fn bind(address: impl Into<String>) -> Result<Self> {
		let address = address.into();
		let mut directory = DIRECTORY.write();
		if directory.get(&address).and_then(Weak::upgrade).is_some() {
			return Err(Error::AddressInUse(address));
		}

		let inner = Arc::new(BusInner::new(address.clone()));
		directory.insert(address.clone(), Arc::downgrade(&inner));
		info!(address = %address, "bus bound");
		Ok(Self {
			inner,
		})
	}

	pub fn address(&self) -> &str {
		&self.inner.address
	}

	/// Push a configuration to a published model: validated first, then
	/// applied.
	pub fn commit_config(&self, model: &str, input: &RawPayload) -> Result<()> {
		self.inner.model(model)?.commit(input)
	}

	/// Names of the models currently published, sorted.
	pub fn models(&self) -> Vec<String> {
		let mut names: Vec<_> = self.inner.models.read().keys().cloned().collect();
		names.sort();
		names
	}

	/// Number of live routes for a notification.
	pub fn route_count(&self, module: &str, name: &str) -> usize {
		self.inner.routes.read().get(&(module.to_string(), name.to_string())).map_or(0, Vec::len)
	}
}

impl Drop for Bus {
	fn drop(&mut self) {
		{
			let mut directory = DIRECTORY.write();
			let bound_here = directory
				.get(&self.inner.address)
				.is_some_and(|entry| std::ptr::eq(entry.as_ptr(), Arc::as_ptr(&self.inner)));
			if bound_here {
				directory.remove(&self.inner.address);
			}
		}
		self.inner.close();
	}
}

struct Route {
	id: u64,
	queue: Arc<EventQueue>,
}

pub(crate) struct BusInner {
	address: String,
	models: RwLock<HashMap<String, Model>>,
	routes: RwLock<HashMap<Topic, Vec<Route>>>,
	next_route: AtomicU64,
	closed: AtomicBool,
	next_hook: AtomicU64,
	close_hooks: Mutex<Vec<(u64, CloseHook)>>,
}

impl BusInner {
	fn new(address: String) -> Self {
		Self {
			address,
			models: RwLock::new(HashMap::new()),
			routes: RwLock::new(HashMap::new()),
			next_route: AtomicU64::new(1),
			closed: AtomicBool::new(false),
			next_hook: AtomicU64::new(1),
			close_hooks: Mutex::new(Vec::new()),
		}
	}

	pub(crate) fn address(&self) -> &str {
		&self.address
	}

	pub(crate) fn is_closed(&self) -> bool {
		self.closed.load(Ordering::Acquire)
	}

	#[instrument(name = "bus::close", level = "debug", skip_all, fields(address = %self.address))]
	fn close(&self) {
		if self.closed.swap(true, Ordering::AcqRel) {
			return;
		}

		let routes = std::mem::take(&mut *self.routes.write());
		for route in routes.into_values().flatten() {
			route.queue.finish();
		}
		let models = std::mem::take(&mut *self.models.write());
		drop(models);

		let hooks = std::mem::take(&mut *self.close_hooks.lock());
		debug!(hooks = hooks.len(), "running close hooks");
		for (_, hook) in hooks {
			hook();
		}
		info!("bus closed");
	}

	/// Run `hook` once the bus closes. Returns the id to remove it with, or
	/// `None`, without running it, if the bus is already closed.
	pub(crate) fn on_close(&self, hook: CloseHook) -> Option<u64> {
		let mut hooks = self.close_hooks.lock();
		if self.is_closed() {
			return None;
		}
		let id = self.next_hook.fetch_add(1, Ordering::Relaxed);
		hooks.push((id, hook));
		Some(id)
	}

	/// Drop a hook registered with [`on_close`] without running it. Unknown
	/// ids, including hooks that already ran, are ignored.
	///
	/// [`on_close`]: BusInner::on_close
	pub(crate) fn remove_close_hook(&self, id: u64) {
		let mut hooks = self.close_hooks.lock();
		if let Some(index) = hooks.iter().position(|(hook, _)| *hook == id) {
			drop(hooks.swap_remove(index));
		}
	}

	pub(crate) fn publish_model(&self, model: &Model) -> Result<()> {
		let mut models = self.models.write();
		match models.get(model.name()) {
			Some(existing) if existing.ptr_eq(model) => Ok(()),
			Some(_) => Err(Error::ModelInUse(model.name().to_string())),
			None => {
				models.insert(model.name().to_string(), model.clone());
				debug!(address = %self.address, model = %model.name(), "model published");
				Ok(())
			}
		}
	}

	pub(crate) fn withdraw_model(&self, model: &Model) {
		let mut models = self.models.write();
		if models.get(model.name()).is_some_and(|existing| existing.ptr_eq(model)) {
			models.remove(model.name());
			debug!(address = %self.address, model = %model.name(), "model withdrawn");
		}
	}

	pub(crate) fn model(&self, name: &str) -> Result<Model> {
		self.models.read().get(name).cloned().ok_or_else(|| Error::UnknownModel(name.to_string()))
	}

	pub(crate) fn attach(&self, topic: &Topic, queue: Arc<EventQueue>) -> u64 {
		let id = self.next_route.fetch_add(1, Ordering::Relaxed);
		if self.is_closed() {
			queue.finish();
			return id;
		}
		self.routes.write().entry(topic.clone()).or_default().push(Route {
			id,
			queue,
		});
		trace!(module = %topic.0, name = %topic.1, route = id, "route attached");
		id
	}

	pub(crate) fn detach(&self, topic: &Topic, id: u64) {
		let mut routes = self.routes.write();
		if let Some(entries) = routes.get_mut(topic) {
			entries.retain(|route| route.id != id);
			if entries.is_empty() {
				routes.remove(topic);
			}
		}
	}

	/// Deliver a notification to every route of its topic.
	pub(crate) fn emit(&self, topic: &Topic, payload: &RawPayload) {
		let queues: Vec<_> = match self.routes.read().get(topic) {
			Some(routes) => routes.iter().map(|route| route.queue.clone()).collect(),
			None => return,
		};
		// Pushing may block under flow control; the route table stays unlocked.
		for queue in queues {
			let outcome = queue.push(payload.clone());
			if outcome == PushOutcome::Dropped {
				trace!(module = %topic.0, name = %topic.1, "notification dropped by flow control");
			}
		}
	}

	/// Find the RPC implementation across every published model and run it.
	pub(crate) fn dispatch(&self, module: &str, name: &str, input: &RawPayload) -> Result<RawPayload> {
		let method = self.models.read().values().find_map(|model| model.method(module, name)).ok_or_else(|| {
			Error::UnknownRpc {
				module: module.to_string(),
				name: name.to_string(),
			}
		})?;
		method.call(input)
	}
}

/// Link from a component or client to a bus.
pub(crate) struct Connection {
	address: String,
	bus: Weak<BusInner>,
	closed: AtomicBool,
}

impl Connection {
	pub(crate) fn open(address: &str) -> Result<Self> {
		let bus = DIRECTORY.read().get(address).and_then(Weak::upgrade);
		match bus {
			Some(bus) if !bus.is_closed() => {
				debug!(address = %address, "connected to bus");
				Ok(Self {
					address: address.to_string(),
					bus: Arc::downgrade(&bus),
					closed: AtomicBool::new(false),
				})
			}
			_ => Err(Error::Transport(format!("no bus reachable at '{address}'"))),
		}
	}

	pub(crate) fn address(&self) -> &str {
		&self.address
	}

	pub(crate) fn bus(&self) -> Result<Arc<BusInner>> {
		if self.closed.load(Ordering::Acquire) {
			return Err(Error::Transport(format!("connection to '{}' is closed", self.address)));
		}
		match self.bus.upgrade() {
			Some(bus) if !bus.is_closed() => Ok(bus),
			_ => Err(Error::Transport(format!("bus at '{}' is no longer reachable", self.address))),
		}
	}

	pub(crate) fn close(&self) {
		if !self.closed.swap(true, Ordering::AcqRel) {
			debug!(address = %self.address, "connection closed");
		}
	}

	pub(crate) fn is_closed(&self) -> bool {
		self.closed.load(Ordering::Acquire)
	}
}
