// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Per-subscription event queue with switchable flow control.
//!
//! Producers (the bus, on behalf of emitters) push; a single consumer pops
//! and hands events to the subscriber. The policy only governs what happens
//! to new arrivals: events already queued are never discarded when it
//! changes.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};
use vci_type::RawPayload;

/// Policy applied to events arriving faster than they are consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowControl {
	/// Queue everything.
	#[default]
	Unbounded,
	/// Keep only the most recent pending event.
	Coalesce,
	/// Queue up to the limit, then discard new arrivals.
	DropAfterLimit(usize),
	/// Queue up to the limit, then block the producer until space frees up.
	BlockAfterLimit(usize),
}

/// What happened to a pushed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
	Queued,
	/// Queued, replacing at least one pending event.
	Coalesced,
	Dropped,
	/// The queue no longer accepts events.
	Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
	Open,
	Draining,
	Closed,
}

struct Pending {
	payload: RawPayload,
	// Only events queued under coalescing may be superseded.
	coalescable: bool,
}

struct QueueState {
	policy: FlowControl,
	events: VecDeque<Pending>,
	status: Status,
	dropped: u64,
}

pub struct EventQueue {
	state: Mutex<QueueState>,
	readable: Condvar,
	writable: Condvar,
}

impl EventQueue {
	pub fn new() -> Self {
		Self::with_policy(FlowControl::Unbounded)
	}

	pub fn with_policy(policy: FlowControl) -> Self {
		Self {
			state: Mutex::new(QueueState {
				policy,
				events: VecDeque::new(),
				status: Status::Open,
				dropped: 0,
			}),
			readable: Condvar::new(),
			writable: Condvar::new(),
		}
	}

	pub fn policy(&self) -> FlowControl {
		self.state.lock().policy
	}

	/// Switch the policy for future arrivals. Producers blocked under the
	/// previous policy re-evaluate against the new one.
	pub fn set_policy(&self, policy: FlowControl) {
		self.state.lock().policy = policy;
		self.writable.notify_all();
	}

	pub fn push(&self, payload: RawPayload) -> PushOutcome {
		let mut state = self.state.lock();
		let outcome = loop {
			if state.status != Status::Open {
				return PushOutcome::Closed;
			}

			match state.policy {
				FlowControl::Unbounded => {
					state.events.push_back(Pending {
						payload,
						coalescable: false,
					});
					break PushOutcome::Queued;
				}
				FlowControl::Coalesce => {
					let before = state.events.len();
					state.events.retain(|pending| !pending.coalescable);
					let superseded = before - state.events.len();
					state.dropped += superseded as u64;
					state.events.push_back(Pending {
						payload,
						coalescable: true,
					});
					break if superseded > 0 {
						PushOutcome::Coalesced
					} else {
						PushOutcome::Queued
					};
				}
				FlowControl::DropAfterLimit(limit) => {
					if state.events.len() >= limit {
						state.dropped += 1;
						return PushOutcome::Dropped;
					}
					state.events.push_back(Pending {
						payload,
						coalescable: false,
					});
					break PushOutcome::Queued;
				}
				FlowControl::BlockAfterLimit(limit) => {
					// A zero limit would never admit anything.
					if state.events.len() >= limit.max(1) {
						self.writable.wait(&mut state);
						continue;
					}
					state.events.push_back(Pending {
						payload,
						coalescable: false,
					});
					break PushOutcome::Queued;
				}
			}
		};
		drop(state);
		self.readable.notify_one();
		outcome
	}

	/// Next event in arrival order, blocking while the queue is open and
	/// empty. Returns `None` once the queue is closed, or once a finished
	/// queue has been drained.
	pub fn pop(&self) -> Option<RawPayload> {
		let mut state = self.state.lock();
		loop {
			if state.status == Status::Closed {
				return None;
			}
			if let Some(pending) = state.events.pop_front() {
				drop(state);
				self.writable.notify_one();
				return Some(pending.payload);
			}
			if state.status == Status::Draining {
				return None;
			}
			self.readable.wait(&mut state);
		}
	}

	/// Stop immediately: pending events are discarded and every blocked
	/// producer and consumer is released.
	pub fn close(&self) {
		let discarded = {
			let mut state = self.state.lock();
			state.status = Status::Closed;
			std::mem::take(&mut state.events)
		};
		self.readable.notify_all();
		self.writable.notify_all();
		drop(discarded);
	}

	/// Stop accepting events but let the consumer drain what is queued.
	pub fn finish(&self) {
		{
			let mut state = self.state.lock();
			if state.status == Status::Open {
				state.status = Status::Draining;
			}
		}
		self.readable.notify_all();
		self.writable.notify_all();
	}

	pub fn len(&self) -> usize {
		self.state.lock().events.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Events discarded by flow control so far.
	pub fn dropped(&self) -> u64 {
		self.state.lock().dropped
	}
}

impl Default for EventQueue {
	fn default() -> Self {
		Self::new()
	}
}
