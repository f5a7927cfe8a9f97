// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	ffi::{c_char, c_void},
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use crossbeam_channel::{Receiver, Sender, unbounded};
use vci_abi::SubscriberObjectFFI;

use super::{context, into_obj, read, release};

/// Subscriber collecting every notification in delivery order.
pub struct FakeSubscriber {
	sender: Sender<String>,
	receiver: Receiver<String>,
	frees: AtomicUsize,
}

impl FakeSubscriber {
	pub fn new() -> Arc<Self> {
		let (sender, receiver) = unbounded();
		Arc::new(Self {
			sender,
			receiver,
			frees: AtomicUsize::new(0),
		})
	}

	pub fn object(self: &Arc<Self>) -> SubscriberObjectFFI {
		SubscriberObjectFFI {
			obj: into_obj(self),
			subscriber: Some(subscriber_notify),
			free: Some(subscriber_free),
		}
	}

	/// Next notification, waiting up to `timeout`.
	pub fn next(&self, timeout: Duration) -> Option<String> {
		self.receiver.recv_timeout(timeout).ok()
	}

	/// Notifications received so far and not yet taken.
	pub fn drain(&self) -> Vec<String> {
		self.receiver.try_iter().collect()
	}

	pub fn frees(&self) -> usize {
		self.frees.load(Ordering::SeqCst)
	}
}

extern "C" fn subscriber_notify(obj: *mut c_void, input: *const c_char) {
	let subscriber = unsafe { context::<FakeSubscriber>(obj) };
	let _ = subscriber.sender.send(read(input).unwrap_or_default());
}

extern "C" fn subscriber_free(obj: *mut c_void) {
	let subscriber = unsafe { release::<FakeSubscriber>(obj) };
	subscriber.frees.fetch_add(1, Ordering::SeqCst);
}
