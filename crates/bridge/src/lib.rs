// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! VCI object bridge
//!
//! Exposes the component runtime to native programs through a C ABI. Host
//! objects (components, models, clients, RPC calls, subscriptions) are handed
//! out as opaque integer handles; native callback objects (configuration,
//! state, RPCs, subscribers) are wrapped so the runtime can call them and
//! release them exactly once. Failures travel back as a three-field error
//! record. The C declarations live in `include/vci.h`.

// #![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod config;
pub mod error;
pub mod export;
mod logging;
mod marshal;
mod native;
mod object;
pub mod registry;

use std::sync::Once;

pub use config::{BridgeConfig, BridgeConfigBuilder, configure};
use once_cell::sync::OnceCell;
pub use registry::Registry;
use tracing::{debug, warn};
use vci_component::Bus;

static INIT: Once = Once::new();
static AUTOSTARTED_BUS: OnceCell<Bus> = OnceCell::new();

/// One-time process setup run by the first entry point: logging, and the
/// in-process bus when autostart is configured.
pub(crate) fn init() {
	INIT.call_once(|| {
		let config = config::current();
		logging::init(config);
		debug!(address = %config.bus_address(), autostart = config.autostart_bus(), "bridge initialised");

		if config.autostart_bus() {
			match Bus::bind(config.bus_address()) {
				Ok(bus) => {
					let _ = AUTOSTARTED_BUS.set(bus);
				}
				Err(err) => warn!(error = %err, "bus autostart skipped"),
			}
		}
	});
}
