// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup (§2.G): a `tracing-subscriber` registry writing to stderr
//! in development and to a daily-rotating file under `FLOW_STATE_DIR`
//! (via `tracing-appender`) otherwise, filtered by the standard `RUST_LOG`
//! environment variable.

use crate::error::DriverError;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber. The returned [`WorkerGuard`] must be kept
/// alive for the process lifetime — dropping it stops flushing the
/// non-blocking file writer.
pub fn init(state_dir: &Path) -> Result<WorkerGuard, DriverError> {
    let file_appender = tracing_appender::rolling::daily(state_dir, "flow-driver.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init()
        .map_err(|err| DriverError::Logging(std::io::Error::other(err)))?;

    Ok(guard)
}
