// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Process-wide bridge configuration.
//!
//! Installed once, either explicitly through [`configure`] before the first
//! entry point runs, or read from the environment on first use.

use once_cell::sync::OnceCell;
use vci_component::DEFAULT_BUS_ADDRESS;

/// Bus address components and clients connect to.
pub const ENV_BUS_ADDRESS: &str = "VCI_BUS_ADDRESS";
/// Bind the in-process bus on first use.
pub const ENV_BUS_AUTOSTART: &str = "VCI_BUS_AUTOSTART";
/// Log filter directives; logging stays off when unset.
pub const ENV_LOG: &str = "VCI_LOG";

static CONFIG: OnceCell<BridgeConfig> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
	bus_address: String,
	autostart_bus: bool,
	log_filter: Option<String>,
}

impl Default for BridgeConfig {
	fn default() -> Self {
		Self {
			bus_address: DEFAULT_BUS_ADDRESS.to_string(),
			autostart_bus: false,
			log_filter: None,
		}
	}
}

impl BridgeConfig {
	pub fn builder() -> BridgeConfigBuilder {
		BridgeConfigBuilder::default()
	}

	pub fn from_env() -> Self {
		let defaults = Self::default();
		Self {
			bus_address: env_string(ENV_BUS_ADDRESS).unwrap_or(defaults.bus_address),
			autostart_bus: env_bool(ENV_BUS_AUTOSTART, defaults.autostart_bus),
			log_filter: env_string(ENV_LOG),
		}
	}

	pub fn bus_address(&self) -> &str {
		&self.bus_address
	}

	pub fn autostart_bus(&self) -> bool {
		self.autostart_bus
	}

	pub fn log_filter(&self) -> Option<&str> {
		self.log_filter.as_deref()
	}
}

#[derive(Debug, Default)]
pub struct BridgeConfigBuilder {
	config: BridgeConfig,
}

impl BridgeConfigBuilder {
	pub fn bus_address(mut self, address: impl Into<String>) -> Self {
		self.config.bus_address = address.into();
		self
	}

	pub fn autostart_bus(mut self, autostart: bool) -> Self {
		self.config.autostart_bus = autostart;
		self
	}

	pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
		self.config.log_filter = Some(filter.into());
		self
	}

	pub fn build(self) -> BridgeConfig {
		self.config
	}
}

/// Install the configuration for this process. Fails, handing the
/// configuration back, once one is in place.
pub fn configure(config: BridgeConfig) -> Result<(), BridgeConfig> {
	CONFIG.set(config)
}

/// Configuration in effect, read from the environment if none was installed.
pub fn current() -> &'static BridgeConfig {
	CONFIG.get_or_init(BridgeConfig::from_env)
}

fn env_string(name: &str) -> Option<String> {
	std::env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_bool(name: &str, default: bool) -> bool {
	std::env::var(name)
		.ok()
		.and_then(|v| match v.trim() {
			"1" | "true" | "TRUE" | "yes" | "YES" | "on" | "ON" => Some(true),
			"0" | "false" | "FALSE" | "no" | "NO" | "off" | "OFF" => Some(false),
			_ => None,
		})
		.unwrap_or(default)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = BridgeConfig::default();
		assert_eq!(config.bus_address(), "vci");
		assert!(!config.autostart_bus());
		assert_eq!(config.log_filter(), None);
	}

	#[test]
	fn test_builder() {
		let config = BridgeConfig::builder().bus_address("lab").autostart_bus(true).log_filter("vci=debug").build();
		assert_eq!(config.bus_address(), "lab");
		assert!(config.autostart_bus());
		assert_eq!(config.log_filter(), Some("vci=debug"));
	}

	#[test]
	fn test_env_bool_falls_back_on_garbage() {
		assert!(env_bool("VCI_TEST_UNSET_FLAG", true));
		assert!(!env_bool("VCI_TEST_UNSET_FLAG", false));
	}
}
