// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod app;

pub use app::{AppError, ErrorKind};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
	#[error("transport error: {0}")]
	Transport(String),

	#[error("{0}")]
	App(AppError),

	#[error("unknown model '{0}'")]
	UnknownModel(String),

	#[error("model '{model}' does not provide {capability}")]
	Unsupported {
		model: String,
		capability: &'static str,
	},

	#[error("unknown RPC {module}:{name}")]
	UnknownRpc {
		module: String,
		name: String,
	},

	#[error("model '{0}' is already published on the bus")]
	ModelInUse(String),

	#[error("bus address '{0}' is already bound")]
	AddressInUse(String),

	#[error("component '{0}' is not running")]
	NotRunning(String),

	#[error("component '{0}' is already running")]
	AlreadyRunning(String),

	#[error("subscription to {module}:{name} has already finished")]
	SubscriptionFinished {
		module: String,
		name: String,
	},

	#[error("subscription to {module}:{name} is already running")]
	SubscriptionRunning {
		module: String,
		name: String,
	},

	#[error("invalid {expected} handle {handle}")]
	InvalidHandle {
		handle: u64,
		expected: &'static str,
	},

	#[error("payload error: {0}")]
	Payload(String),

	#[error("internal error: {0}")]
	Internal(String),
}

impl Error {
	/// Structured form of this error; anything that is not already an
	/// application error is reported as a failed operation.
	pub fn into_app_error(self) -> AppError {
		match self {
			Error::App(err) => err,
			other => AppError::operation_failed().with_message(other.to_string()),
		}
	}
}

impl From<AppError> for Error {
	fn from(err: AppError) -> Self {
		Error::App(err)
	}
}
