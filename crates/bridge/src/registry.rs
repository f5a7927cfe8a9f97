// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Handle registry
//!
//! Maps opaque integer handles to host objects so native code can hold on to
//! them indefinitely. Handles increase monotonically from 1 and are never
//! reused; 0 is never issued.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::trace;
use vci_abi::HandleFFI;

pub struct Registry<T> {
	inner: RwLock<RegistryInner<T>>,
}

struct RegistryInner<T> {
	next: HandleFFI,
	entries: HashMap<HandleFFI, T>,
}

impl<T: Clone> Registry<T> {
	pub fn new() -> Self {
		Self {
			inner: RwLock::new(RegistryInner {
				next: 1,
				entries: HashMap::new(),
			}),
		}
	}

	pub fn register(&self, object: T) -> HandleFFI {
		let mut inner = self.inner.write();
		let handle = inner.next;
		inner.next += 1;
		inner.entries.insert(handle, object);
		trace!(handle, "handle registered");
		handle
	}

	/// Object behind a live handle.
	///
	/// # Panics
	/// If `handle` is not registered.
	pub fn get(&self, handle: HandleFFI) -> T {
		match self.try_get(handle) {
			Some(object) => object,
			None => panic!("invalid handle {handle}"),
		}
	}

	pub fn try_get(&self, handle: HandleFFI) -> Option<T> {
		self.inner.read().entries.get(&handle).cloned()
	}

	/// Remove the mapping and hand the object back so it can be released
	/// after the entry is gone. Unknown handles yield `None`.
	pub fn unregister(&self, handle: HandleFFI) -> Option<T> {
		let removed = self.inner.write().entries.remove(&handle);
		if removed.is_some() {
			trace!(handle, "handle unregistered");
		}
		removed
	}

	pub fn len(&self) -> usize {
		self.inner.read().entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl<T: Clone> Default for Registry<T> {
	fn default() -> Self {
		Self::new()
	}
}
