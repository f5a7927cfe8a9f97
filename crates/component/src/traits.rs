// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use vci_type::{RawPayload, Result};

/// Configuration provider of a model.
///
/// `check` validates a candidate without applying it; `set` applies it. A
/// commit always runs `check` first and only calls `set` if it succeeded.
pub trait Config: Send + Sync {
	fn set(&self, input: &RawPayload) -> Result<()>;

	fn check(&self, input: &RawPayload) -> Result<()>;

	fn get(&self) -> RawPayload;
}

/// Operational state provider of a model.
pub trait State: Send + Sync {
	fn get(&self) -> RawPayload;
}

/// Implementation of a single RPC.
pub trait Method: Send + Sync {
	fn call(&self, input: &RawPayload) -> Result<RawPayload>;
}

/// Receiver of notifications.
pub trait Subscriber: Send + Sync {
	fn notify(&self, payload: &RawPayload);
}

impl<F> State for F
where
	F: Fn() -> RawPayload + Send + Sync,
{
	fn get(&self) -> RawPayload {
		self()
	}
}

impl<F> Method for F
where
	F: Fn(&RawPayload) -> Result<RawPayload> + Send + Sync,
{
	fn call(&self, input: &RawPayload) -> Result<RawPayload> {
		self(input)
	}
}

impl<F> Subscriber for F
where
	F: Fn(&RawPayload) + Send + Sync,
{
	fn notify(&self, payload: &RawPayload) {
		self(payload)
	}
}
