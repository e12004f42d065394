// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `flow-driverd`: loads configuration from the environment, opens the
//! listening socket, constructs the coordinator state, and runs the event
//! loop until a shutdown signal (§2.F).

use flow_core::SystemClock;
use flow_driver::{coordinator, dispatcher, logging, Config, DriverState, Outbound, RestoreScheduler};
use fs2::FileExt;
use std::fs::OpenOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    std::fs::create_dir_all(&config.state_dir)?;

    let _log_guard = logging::init(&config.state_dir)?;

    let lock_path = config.state_dir.join("flow-driverd.lock");
    let lock_file = OpenOptions::new().create(true).write(true).open(&lock_path)?;
    lock_file.try_lock_exclusive().map_err(|err| {
        format!("another flow-driverd instance holds the lock at {}: {err}", lock_path.display())
    })?;

    info!(port = config.driver_port, "starting flow-driverd");

    let listener = TcpListener::bind(("0.0.0.0", config.driver_port))
        .await
        .map_err(|err| flow_driver::DriverError::Bind(config.driver_port, err))?;

    let clock = SystemClock;
    let state = Arc::new(DriverState::new(clock.clone(), config.snapshot_interval));
    let outbound = Outbound::new();
    let config = Arc::new(config);
    let restore = RestoreScheduler::new(clock.clone());

    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

    let dispatcher_handle = tokio::spawn(dispatcher::run(inbound_rx, state.clone(), outbound.clone(), config.clone(), restore));
    let barrier_handle = tokio::spawn(coordinator::run_barrier_loop(state.clone(), outbound.clone(), config.clone()));
    let listener_handle = tokio::spawn(flow_driver::transport::run_listener(listener, inbound_tx, outbound));

    tokio::select! {
        result = listener_handle => {
            result??;
        }
        _ = dispatcher_handle => {
            info!("dispatcher loop exited");
        }
        _ = barrier_handle => {
            info!("barrier loop exited");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("received shutdown signal");
        }
    }

    lock_file.unlock().ok();
    Ok(())
}
