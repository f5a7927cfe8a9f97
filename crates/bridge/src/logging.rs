// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tracing_subscriber::EnvFilter;

use crate::config::BridgeConfig;

/// Install a stderr subscriber when a log filter is configured. A subscriber
/// the host installed earlier always wins.
pub(crate) fn init(config: &BridgeConfig) {
	let Some(directives) = config.log_filter() else {
		return;
	};

	let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"));
	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_thread_names(true)
		.with_writer(std::io::stderr)
		.try_init();
}
