// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! C ABI definitions for the VCI object bridge
//!
//! This crate provides the stable C ABI shared by the bridge library and the
//! native programs that drive it. It defines the FFI-safe records native code
//! hands to the bridge (config, state, RPC and subscriber objects), the error
//! record exchanged in both directions, and the status codes every fallible
//! entry point returns.

// #![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod constants;
pub mod error;
pub mod object;

pub use constants::*;
pub use error::ErrorFFI;
pub use object::{ConfigApplyFnFFI, ConfigObjectFFI, FreeFnFFI, GetFnFFI, RpcObjectFFI, StateObjectFFI, SubscriberObjectFFI};

/// Opaque token identifying a host-owned object across the boundary
pub type HandleFFI = u64;
