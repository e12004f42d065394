// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Driver-core error type.
//!
//! Per the design's best-effort error model, most anomalies (a malformed
//! inbound message, an impossible placement) are logged and absorbed rather
//! than propagated. This type exists for the handful of conditions where
//! `?`-propagation up to the process boundary is the right response.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to bind driver listener on port {0}: {1}")]
    Bind(u16, std::io::Error),

    #[error("could not resolve driver state directory")]
    Config(#[from] crate::env::ConfigError),

    #[error("failed to install log file appender: {0}")]
    Logging(std::io::Error),
}
