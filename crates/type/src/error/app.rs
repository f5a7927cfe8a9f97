// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

/// Classification of an application error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	OperationFailed,
	InvalidValue,
	MissingElement,
	UnknownElement,
	AccessDenied,
}

impl ErrorKind {
	/// Stable identifier used when rendering the error.
	pub fn code(&self) -> &'static str {
		match self {
			ErrorKind::OperationFailed => "operation-failed",
			ErrorKind::InvalidValue => "invalid-value",
			ErrorKind::MissingElement => "missing-element",
			ErrorKind::UnknownElement => "unknown-element",
			ErrorKind::AccessDenied => "access-denied",
		}
	}
}

impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.code())
	}
}

/// Structured application error: what failed, where, and why.
///
/// Every textual field may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
	pub kind: ErrorKind,
	pub app_tag: String,
	pub path: String,
	pub message: String,
}

impl AppError {
	pub fn new(kind: ErrorKind) -> Self {
		Self {
			kind,
			app_tag: String::new(),
			path: String::new(),
			message: String::new(),
		}
	}

	pub fn operation_failed() -> Self {
		Self::new(ErrorKind::OperationFailed)
	}

	pub fn with_app_tag(mut self, app_tag: impl Into<String>) -> Self {
		self.app_tag = app_tag.into();
		self
	}

	pub fn with_path(mut self, path: impl Into<String>) -> Self {
		self.path = path.into();
		self
	}

	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = message.into();
		self
	}
}

impl Display for AppError {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.kind.code())?;
		if !self.app_tag.is_empty() {
			write!(f, " [{}]", self.app_tag)?;
		}
		match (self.path.is_empty(), self.message.is_empty()) {
			(true, true) => Ok(()),
			(false, true) => write!(f, ": {}", self.path),
			(true, false) => write!(f, ": {}", self.message),
			(false, false) => write!(f, ": {}: {}", self.path, self.message),
		}
	}
}

impl std::error::Error for AppError {}
