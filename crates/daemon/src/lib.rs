// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `flow-driver`: the stream-processing driver's coordinator logic.
//!
//! The binary (`src/main.rs`) is a thin shell over this library: load
//! [`Config`], install logging, bind a listener, construct a [`DriverState`],
//! and run the [`dispatcher`] loop and the [`coordinator`] barrier loop side
//! by side until shutdown.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod coordinator;
pub mod deploy;
pub mod dispatcher;
pub mod env;
pub mod error;
pub mod logging;
pub mod state;
pub mod transport;

pub use config::Config;
pub use coordinator::RestoreScheduler;
pub use error::DriverError;
pub use state::DriverState;
pub use transport::{Inbound, InboundRx, InboundTx, Outbound};
