// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Test support for the VCI bridge
//!
//! Fake native objects written as `extern "C"` functions over an `Arc`
//! context, so tests can drive the bridge exactly like a C program would and
//! observe how often each callback and each `free` ran.

pub mod bus;
pub mod native;
pub mod util;
