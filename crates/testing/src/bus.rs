// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use once_cell::sync::OnceCell;
use vci_component::{Bus, DEFAULT_BUS_ADDRESS};

static SHARED: OnceCell<Bus> = OnceCell::new();

/// Bus bound at the default address for the lifetime of the test process.
///
/// Tests sharing it should use distinct model and notification names, see
/// [`crate::util::unique_name`].
pub fn shared_bus() -> &'static Bus {
	SHARED.get_or_init(|| Bus::bind(DEFAULT_BUS_ADDRESS).expect("default bus address is already bound"))
}
