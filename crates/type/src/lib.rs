// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

// #![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod error;
pub mod payload;

pub use error::{AppError, Error, ErrorKind};
pub use payload::RawPayload;

pub type Result<T> = std::result::Result<T, Error>;
