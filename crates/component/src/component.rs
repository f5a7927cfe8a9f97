// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::HashMap,
	sync::{Arc, Weak},
	thread,
};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info, instrument, warn};
use vci_type::{AppError, Error, ErrorKind, Result};

use crate::{
	bus::{BusInner, Connection, DEFAULT_BUS_ADDRESS, Topic},
	client::Client,
	model::Model,
	queue::EventQueue,
	traits::Subscriber,
};

/// Named participant on a bus that publishes models and receives
/// notifications.
///
/// Models and subscriptions may be declared before or after [`run`]; once
/// running, additions take effect immediately. Cloning yields another
/// reference to the same component. The component stops when the last
/// reference goes away.
///
/// [`run`]: Component::run
#[derive(Clone)]
pub struct Component {
	inner: Arc<ComponentInner>,
}

struct ComponentInner {
	name: String,
	address: String,
	models: Mutex<Vec<Model>>,
	subscriptions: Mutex<HashMap<Topic, Arc<dyn Subscriber>>>,
	lifecycle: Mutex<Lifecycle>,
	stopped: Condvar,
}

enum Lifecycle {
	Idle,
	Running(Session),
	Stopped(Option<Error>),
}

struct Session {
	connection: Connection,
	deliveries: HashMap<Topic, Delivery>,
	close_hook: Option<u64>,
}

/// Route feeding one subscriber through its own delivery thread.
struct Delivery {
	route: u64,
	queue: Arc<EventQueue>,
}

impl Component {
	/// Component reaching the bus at the default address.
	pub fn new(name: impl Into<String>) -> Self {
		Self::with_address(name, DEFAULT_BUS_ADDRESS)
	}

	pub fn with_address(name: impl Into<String>, address: impl Into<String>) -> Self {
		Self {
			inner: Arc::new(ComponentInner {
				name: name.into(),
				address: address.into(),
				models: Mutex::new(Vec::new()),
				subscriptions: Mutex::new(HashMap::new()),
				lifecycle: Mutex::new(Lifecycle::Idle),
				stopped: Condvar::new(),
			}),
		}
	}

	pub fn name(&self) -> &str {
		&self.inner.name
	}

	pub fn address(&self) -> &str {
		&self.inner.address
	}

	pub fn is_running(&self) -> bool {
		matches!(*self.inner.lifecycle.lock(), Lifecycle::Running(_))
	}

	/// The model called `name`, created on first use.
	pub fn model(&self, name: &str) -> Model {
		let mut models = self.inner.models.lock();
		if let Some(model) = models.iter().find(|model| model.name() == name) {
			return model.clone();
		}
		let model = Model::new(name);
		models.push(model.clone());
		drop(models);

		let lifecycle = self.inner.lifecycle.lock();
		if let Lifecycle::Running(session) = &*lifecycle {
			if let Err(err) = session.connection.bus().and_then(|bus| bus.publish_model(&model)) {
				warn!(component = %self.inner.name, model = %name, error = %err, "could not publish model");
			}
		}
		model
	}

	/// Connect to the bus, publish every model and start delivering
	/// notifications. Does not block.
	#[instrument(name = "component::run", level = "debug", skip_all, fields(component = %self.inner.name))]
	pub fn run(&self) -> Result<()> {
		let mut lifecycle = self.inner.lifecycle.lock();
		if matches!(*lifecycle, Lifecycle::Running(_)) {
			return Err(Error::AlreadyRunning(self.inner.name.clone()));
		}

		let connection = Connection::open(&self.inner.address)?;
		let bus = connection.bus()?;

		let models = self.inner.models.lock().clone();
		let mut session = Session {
			connection,
			deliveries: HashMap::new(),
			close_hook: None,
		};

		if let Err(err) = self.start(&bus, &models, &mut session) {
			session.teardown(&models);
			return Err(err);
		}

		let component = Arc::downgrade(&self.inner);
		let address = bus.address().to_string();
		session.close_hook = bus.on_close(Box::new(move || {
			if let Some(component) = Weak::upgrade(&component) {
				component.halt(Some(Error::Transport(format!("bus at '{address}' shut down"))));
			}
		}));
		if session.close_hook.is_none() {
			session.teardown(&models);
			return Err(Error::Transport(format!("bus at '{}' shut down", self.inner.address)));
		}

		*lifecycle = Lifecycle::Running(session);
		info!(address = %self.inner.address, models = models.len(), "component running");
		Ok(())
	}

	fn start(&self, bus: &Arc<BusInner>, models: &[Model], session: &mut Session) -> Result<()> {
		for model in models {
			bus.publish_model(model)?;
		}
		let subscriptions: Vec<_> =
			self.inner.subscriptions.lock().iter().map(|(topic, sub)| (topic.clone(), sub.clone())).collect();
		for (topic, subscriber) in subscriptions {
			let delivery = Delivery::start(bus, &topic, subscriber)?;
			session.deliveries.insert(topic, delivery);
		}
		Ok(())
	}

	/// Block until the component stops. Returns the reason it stopped, if it
	/// stopped because of a failure.
	pub fn wait(&self) -> Result<()> {
		let mut lifecycle = self.inner.lifecycle.lock();
		loop {
			match &*lifecycle {
				Lifecycle::Idle => return Err(Error::NotRunning(self.inner.name.clone())),
				Lifecycle::Running(_) => self.inner.stopped.wait(&mut lifecycle),
				Lifecycle::Stopped(None) => return Ok(()),
				Lifecycle::Stopped(Some(err)) => return Err(err.clone()),
			}
		}
	}

	/// Stop the component; waiters return. Stopping a component that is not
	/// running does nothing.
	pub fn stop(&self) -> Result<()> {
		self.inner.halt(None);
		Ok(())
	}

	/// Deliver notifications `module:name` to `subscriber`, replacing any
	/// subscriber registered earlier for the same notification.
	pub fn subscribe(&self, module: &str, name: &str, subscriber: Arc<dyn Subscriber>) -> Result<()> {
		let topic: Topic = (module.to_string(), name.to_string());

		// Nothing changes unless the new delivery is in place.
		let mut lifecycle = self.inner.lifecycle.lock();
		if let Lifecycle::Running(session) = &mut *lifecycle {
			let bus = session.connection.bus()?;
			let delivery = Delivery::start(&bus, &topic, subscriber.clone())?;
			if let Some(replaced) = session.deliveries.insert(topic.clone(), delivery) {
				replaced.stop(Some(&bus), &topic);
			}
		}
		let previous = self.inner.subscriptions.lock().insert(topic, subscriber);
		drop(lifecycle);

		debug!(component = %self.inner.name, module = %module, name = %name, replaced = previous.is_some(), "subscribed");
		Ok(())
	}

	pub fn unsubscribe(&self, module: &str, name: &str) -> Result<()> {
		let topic: Topic = (module.to_string(), name.to_string());
		let removed = self.inner.subscriptions.lock().remove(&topic);
		if removed.is_none() {
			return Err(AppError::new(ErrorKind::UnknownElement)
				.with_message(format!("no subscription to {module}:{name}"))
				.into());
		}

		let mut lifecycle = self.inner.lifecycle.lock();
		if let Lifecycle::Running(session) = &mut *lifecycle {
			if let Some(delivery) = session.deliveries.remove(&topic) {
				delivery.stop(session.connection.bus().ok().as_ref(), &topic);
			}
		}
		drop(lifecycle);

		debug!(component = %self.inner.name, module = %module, name = %name, "unsubscribed");
		Ok(())
	}

	/// A new client of the bus this component uses.
	pub fn client(&self) -> Result<Client> {
		Client::dial_address(&self.inner.address)
	}
}

impl ComponentInner {
	fn halt(&self, failure: Option<Error>) {
		let mut lifecycle = self.lifecycle.lock();
		let session = match std::mem::replace(&mut *lifecycle, Lifecycle::Idle) {
			Lifecycle::Running(session) => session,
			other => {
				*lifecycle = other;
				return;
			}
		};

		let models = self.models.lock().clone();
		session.teardown(&models);

		match &failure {
			Some(err) => error!(component = %self.name, error = %err, "component stopped"),
			None => info!(component = %self.name, "component stopped"),
		}
		*lifecycle = Lifecycle::Stopped(failure);
		drop(lifecycle);
		self.stopped.notify_all();
	}
}

impl Drop for ComponentInner {
	fn drop(&mut self) {
		self.halt(None);
	}
}

impl Session {
	fn teardown(self, models: &[Model]) {
		let bus = self.connection.bus().ok();
		if let Some(bus) = &bus {
			if let Some(hook) = self.close_hook {
				bus.remove_close_hook(hook);
			}
			for model in models {
				bus.withdraw_model(model);
			}
		}
		for (topic, delivery) in self.deliveries {
			delivery.stop(bus.as_ref(), &topic);
		}
		self.connection.close();
	}
}

impl Delivery {
	fn start(bus: &Arc<BusInner>, topic: &Topic, subscriber: Arc<dyn Subscriber>) -> Result<Self> {
		let queue = Arc::new(EventQueue::new());
		let route = bus.attach(topic, queue.clone());

		let worker = queue.clone();
		let spawned = thread::Builder::new().name(format!("vci-notify-{}", topic.1)).spawn(move || {
			while let Some(payload) = worker.pop() {
				subscriber.notify(&payload);
			}
		});

		match spawned {
			Ok(_) => Ok(Self {
				route,
				queue,
			}),
			Err(err) => {
				bus.detach(topic, route);
				Err(Error::Internal(format!("failed to spawn delivery thread: {err}")))
			}
		}
	}

	fn stop(self, bus: Option<&Arc<BusInner>>, topic: &Topic) {
		if let Some(bus) = bus {
			bus.detach(topic, self.route);
		}
		self.queue.close();
	}
}
