// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;
use tracing::debug;
use vci_type::{Error, RawPayload, Result};

use crate::traits::{Config, Method, State};

/// RPC implementations of one module, keyed by RPC name.
pub type RpcTable = HashMap<String, Arc<dyn Method>>;

/// Named unit of configuration, state and RPCs published by a component.
///
/// Cloning yields another reference to the same model.
#[derive(Clone)]
pub struct Model {
	inner: Arc<ModelInner>,
}

struct ModelInner {
	name: String,
	config: RwLock<Option<Arc<dyn Config>>>,
	state: RwLock<Option<Arc<dyn State>>>,
	rpcs: RwLock<HashMap<String, Arc<RpcTable>>>,
}

impl Model {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			inner: Arc::new(ModelInner {
				name: name.into(),
				config: RwLock::new(None),
				state: RwLock::new(None),
				rpcs: RwLock::new(HashMap::new()),
			}),
		}
	}

	pub fn name(&self) -> &str {
		&self.inner.name
	}

	/// Replace the configuration provider.
	pub fn config(&self, config: Arc<dyn Config>) -> &Self {
		// The previous provider is released outside the lock.
		let previous = self.inner.config.write().replace(config);
		debug!(model = %self.inner.name, replaced = previous.is_some(), "config attached");
		drop(previous);
		self
	}

	/// Replace the state provider.
	pub fn state(&self, state: Arc<dyn State>) -> &Self {
		let previous = self.inner.state.write().replace(state);
		debug!(model = %self.inner.name, replaced = previous.is_some(), "state attached");
		drop(previous);
		self
	}

	/// Replace the whole RPC table of `module`.
	pub fn rpc(&self, module: impl Into<String>, table: RpcTable) -> &Self {
		let module = module.into();
		debug!(model = %self.inner.name, module = %module, rpcs = table.len(), "rpc table attached");
		let previous = self.inner.rpcs.write().insert(module, Arc::new(table));
		drop(previous);
		self
	}

	/// Edit the RPC table of `module`, creating it if needed. The edited
	/// table replaces the previous one atomically.
	pub fn update_rpc(&self, module: &str, edit: impl FnOnce(&mut RpcTable)) -> &Self {
		let mut rpcs = self.inner.rpcs.write();
		let mut table = rpcs.get(module).map(|table| RpcTable::clone(table)).unwrap_or_default();
		edit(&mut table);
		debug!(model = %self.inner.name, module = %module, rpcs = table.len(), "rpc table updated");
		let previous = rpcs.insert(module.to_string(), Arc::new(table));
		drop(rpcs);
		// Methods no longer referenced are released outside the lock.
		drop(previous);
		self
	}

	pub fn config_provider(&self) -> Option<Arc<dyn Config>> {
		self.inner.config.read().clone()
	}

	pub fn state_provider(&self) -> Option<Arc<dyn State>> {
		self.inner.state.read().clone()
	}

	pub fn method(&self, module: &str, name: &str) -> Option<Arc<dyn Method>> {
		self.inner.rpcs.read().get(module).and_then(|table| table.get(name).cloned())
	}

	/// Validate `input` with the configuration provider, then apply it.
	pub fn commit(&self, input: &RawPayload) -> Result<()> {
		let config = self.require_config()?;
		config.check(input)?;
		config.set(input)?;
		debug!(model = %self.inner.name, "config committed");
		Ok(())
	}

	pub fn read_config(&self) -> Result<RawPayload> {
		Ok(self.require_config()?.get())
	}

	pub fn read_state(&self) -> Result<RawPayload> {
		let state = self.state_provider().ok_or_else(|| Error::Unsupported {
			model: self.inner.name.clone(),
			capability: "state",
		})?;
		Ok(state.get())
	}

	pub(crate) fn ptr_eq(&self, other: &Model) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}

	fn require_config(&self) -> Result<Arc<dyn Config>> {
		self.config_provider().ok_or_else(|| Error::Unsupported {
			model: self.inner.name.clone(),
			capability: "config",
		})
	}
}
