// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, instrument};
use vci_type::{Error, Result};

use crate::{
	bus::{BusInner, Topic},
	queue::{EventQueue, FlowControl},
	traits::Subscriber,
};

/// Lifecycle of a client subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
	/// Queueing events, nobody delivering them yet.
	Created,
	Running,
	Cancelled,
	/// The bus or the owning client went away and the backlog was delivered.
	Completed,
}

impl SubscriptionState {
	pub fn is_terminal(&self) -> bool {
		matches!(self, SubscriptionState::Cancelled | SubscriptionState::Completed)
	}
}

/// Client-side subscription to one notification.
///
/// Cloning yields another reference to the same subscription. The route is
/// removed from the bus when the subscription is cancelled, completes, or
/// the last reference goes away.
#[derive(Clone)]
pub struct Subscription {
	inner: Arc<SubscriptionInner>,
}

pub(crate) struct SubscriptionInner {
	topic: Topic,
	route: u64,
	queue: Arc<EventQueue>,
	bus: Weak<BusInner>,
	subscriber: Arc<dyn Subscriber>,
	state: Mutex<SubscriptionState>,
}

impl Subscription {
	pub(crate) fn open(bus: &Arc<BusInner>, module: &str, name: &str, subscriber: Arc<dyn Subscriber>) -> Self {
		let topic: Topic = (module.to_string(), name.to_string());
		let queue = Arc::new(EventQueue::new());
		let route = bus.attach(&topic, queue.clone());
		debug!(module = %module, name = %name, route, "subscription opened");

		Self {
			inner: Arc::new(SubscriptionInner {
				topic,
				route,
				queue,
				bus: Arc::downgrade(bus),
				subscriber,
				state: Mutex::new(SubscriptionState::Created),
			}),
		}
	}

	pub(crate) fn downgrade(&self) -> Weak<SubscriptionInner> {
		Arc::downgrade(&self.inner)
	}

	pub fn module(&self) -> &str {
		&self.inner.topic.0
	}

	pub fn name(&self) -> &str {
		&self.inner.topic.1
	}

	pub fn state(&self) -> SubscriptionState {
		*self.inner.state.lock()
	}

	/// Deliver queued and future events on the calling thread until the
	/// subscription is cancelled or the bus goes away.
	#[instrument(name = "subscription::run", level = "debug", skip_all, fields(module = %self.inner.topic.0, name = %self.inner.topic.1))]
	pub fn run(&self) -> Result<()> {
		{
			let mut state = self.inner.state.lock();
			match *state {
				SubscriptionState::Created => *state = SubscriptionState::Running,
				SubscriptionState::Running => return Err(self.error_running()),
				SubscriptionState::Cancelled | SubscriptionState::Completed => {
					return Err(self.error_finished());
				}
			}
		}

		let mut delivered = 0u64;
		while let Some(payload) = self.inner.queue.pop() {
			self.inner.subscriber.notify(&payload);
			delivered += 1;
		}

		{
			let mut state = self.inner.state.lock();
			if *state == SubscriptionState::Running {
				*state = SubscriptionState::Completed;
			}
		}
		self.inner.detach();
		debug!(delivered, dropped = self.inner.queue.dropped(), "subscription finished");
		Ok(())
	}

	/// Stop the subscription; a concurrent [`run`] returns promptly and
	/// pending events are discarded.
	///
	/// [`run`]: Subscription::run
	pub fn cancel(&self) -> Result<()> {
		{
			let mut state = self.inner.state.lock();
			if state.is_terminal() {
				return Err(self.error_finished());
			}
			*state = SubscriptionState::Cancelled;
		}
		self.inner.queue.close();
		self.inner.detach();
		debug!(module = %self.inner.topic.0, name = %self.inner.topic.1, "subscription cancelled");
		Ok(())
	}

	/// Keep only the most recent undelivered event.
	pub fn coalesce(&self) -> &Self {
		self.set_flow_control(FlowControl::Coalesce)
	}

	/// Queue at most `limit` undelivered events and discard new arrivals
	/// beyond that.
	pub fn drop_after_limit(&self, limit: usize) -> &Self {
		self.set_flow_control(FlowControl::DropAfterLimit(limit))
	}

	/// Queue at most `limit` undelivered events and make emitters wait
	/// beyond that.
	pub fn block_after_limit(&self, limit: usize) -> &Self {
		self.set_flow_control(FlowControl::BlockAfterLimit(limit))
	}

	pub fn remove_limit(&self) -> &Self {
		self.set_flow_control(FlowControl::Unbounded)
	}

	pub fn set_flow_control(&self, policy: FlowControl) -> &Self {
		if self.state().is_terminal() {
			debug!(module = %self.inner.topic.0, name = %self.inner.topic.1, ?policy, "flow control ignored on finished subscription");
			return self;
		}
		self.inner.queue.set_policy(policy);
		self
	}

	pub fn flow_control(&self) -> FlowControl {
		self.inner.queue.policy()
	}

	/// Undelivered events waiting in the queue.
	pub fn pending(&self) -> usize {
		self.inner.queue.len()
	}

	/// Events discarded by flow control so far.
	pub fn dropped(&self) -> u64 {
		self.inner.queue.dropped()
	}

	fn error_running(&self) -> Error {
		Error::SubscriptionRunning {
			module: self.inner.topic.0.clone(),
			name: self.inner.topic.1.clone(),
		}
	}

	fn error_finished(&self) -> Error {
		Error::SubscriptionFinished {
			module: self.inner.topic.0.clone(),
			name: self.inner.topic.1.clone(),
		}
	}
}

impl SubscriptionInner {
	/// Stop taking events from the bus. A running delivery drains the
	/// backlog, then completes.
	pub(crate) fn end(&self) {
		self.detach();
		self.queue.finish();
	}

	fn detach(&self) {
		if let Some(bus) = self.bus.upgrade() {
			bus.detach(&self.topic, self.route);
		}
	}
}

impl Drop for SubscriptionInner {
	fn drop(&mut self) {
		self.queue.close();
		self.detach();
	}
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription")
			.field("module", &self.inner.topic.0)
			.field("name", &self.inner.topic.1)
			.field("state", &self.state())
			.finish()
	}
}
