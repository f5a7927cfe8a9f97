// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Model attachment
//!
//! These entry points have no error channel: a stale model handle traps and
//! a null object record is logged and ignored. The bridge takes ownership of
//! every non-null object record it is given; a replaced object is released
//! once nothing uses it any more.

use std::{ffi::c_char, sync::Arc};

use tracing::warn;
use vci_abi::{ConfigObjectFFI, HandleFFI, RpcObjectFFI, StateObjectFFI};

use super::guard;
use crate::{
	marshal::c_str,
	native::{NativeConfig, NativeRpc, NativeState},
	object::{self, trap},
};

/// Attach a configuration object, replacing the previous one.
///
/// # Safety
/// `config` must be null or point to a valid record.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_model_config(model: HandleFFI, config: *const ConfigObjectFFI) {
	guard("vci_model_config", || {
		let model = trap(object::model(model));
		match unsafe { NativeConfig::from_ptr(config) } {
			Some(config) => {
				model.config(Arc::new(config));
			}
			None => warn!(model = %model.name(), "null config object ignored"),
		}
	})
}

/// Attach a state object, replacing the previous one.
///
/// # Safety
/// `state` must be null or point to a valid record.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_model_state(model: HandleFFI, state: *const StateObjectFFI) {
	guard("vci_model_state", || {
		let model = trap(object::model(model));
		match unsafe { NativeState::from_ptr(state) } {
			Some(state) => {
				model.state(Arc::new(state));
			}
			None => warn!(model = %model.name(), "null state object ignored"),
		}
	})
}

/// Register the implementation of RPC `module:name`. Other RPCs of the
/// module are kept; an earlier implementation of the same RPC is replaced.
///
/// # Safety
/// String arguments must be null or NUL-terminated; `rpc` must be null or
/// point to a valid record.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vci_model_rpc(
	model: HandleFFI,
	module: *const c_char,
	name: *const c_char,
	rpc: *const RpcObjectFFI,
) {
	guard("vci_model_rpc", || {
		let model = trap(object::model(model));
		let (module, name) = unsafe { (c_str(module), c_str(name)) };
		match unsafe { NativeRpc::from_ptr(rpc) } {
			Some(rpc) => {
				model.update_rpc(&module, |table| {
					table.insert(name.to_string(), Arc::new(rpc));
				});
			}
			None => warn!(model = %model.name(), module = %module, name = %name, "null rpc object ignored"),
		}
	})
}

/// Release the model handle. The model stays published by its component.
#[unsafe(no_mangle)]
pub extern "C" fn vci_model_free(model: HandleFFI) {
	guard("vci_model_free", || {
		drop(object::unregister(model));
	})
}
