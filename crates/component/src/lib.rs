// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Component infrastructure runtime.
//!
//! Components publish models (configuration, state and RPCs) on a bus and
//! subscribe to notifications; clients dial the same bus to read
//! configuration and state, call RPCs, emit notifications and run their own
//! subscriptions. The bus is an in-process broker addressed by name.

// #![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod bus;
pub mod client;
pub mod component;
pub mod model;
pub mod queue;
pub mod subscription;
pub mod traits;

pub use bus::{Bus, DEFAULT_BUS_ADDRESS};
pub use client::{Client, RpcCall};
pub use component::Component;
pub use model::{Model, RpcTable};
pub use queue::{EventQueue, FlowControl, PushOutcome};
pub use subscription::{Subscription, SubscriptionState};
pub use traits::{Config, Method, State, Subscriber};
