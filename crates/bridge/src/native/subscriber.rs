// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tracing::warn;
use vci_abi::SubscriberObjectFFI;
use vci_component::Subscriber;
use vci_type::RawPayload;

use crate::marshal::payload_to_c;

pub(crate) struct NativeSubscriber {
	record: SubscriberObjectFFI,
}

// SAFETY: see `NativeConfig`.
unsafe impl Send for NativeSubscriber {}
unsafe impl Sync for NativeSubscriber {}

impl NativeSubscriber {
	/// # Safety
	/// `record` must be null or point to a valid record.
	pub(crate) unsafe fn from_ptr(record: *const SubscriberObjectFFI) -> Option<Self> {
		unsafe { record.as_ref() }.map(|record| Self {
			record: *record,
		})
	}
}

impl Subscriber for NativeSubscriber {
	fn notify(&self, payload: &RawPayload) {
		let Some(callback) = self.record.subscriber else {
			return;
		};
		match payload_to_c(payload) {
			Ok(input) => callback(self.record.obj, input.as_ptr()),
			Err(err) => warn!(error = %err, "notification not deliverable to native subscriber"),
		}
	}
}

impl Drop for NativeSubscriber {
	fn drop(&mut self) {
		super::release(self.record.obj, self.record.free);
	}
}
