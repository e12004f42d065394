// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the driver crate.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("could not resolve a state directory: none of FLOW_STATE_DIR, XDG_STATE_HOME, HOME is set")]
    NoStateDir,
}

/// TCP port the driver listens on for supervisor and client connections.
pub fn driver_port() -> u16 {
    std::env::var("FLOW_DRIVER_PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(5050)
}

/// Base port from which task instance ports are allocated.
pub fn contractor_base_port() -> u16 {
    std::env::var("FLOW_CONTRACTOR_BASE_PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(6000)
}

/// Base interval between checkpoint barriers.
pub fn snapshot_interval() -> Duration {
    std::env::var("FLOW_SNAPSHOT_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(30))
}

/// Added to the snapshot interval after a failover, before it's clamped
/// back to base on the next barrier.
pub fn restore_backoff() -> Duration {
    std::env::var("FLOW_RESTORE_BACKOFF_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(20))
}

/// Deadline before a pending restore fires.
pub fn restore_deadline() -> Duration {
    std::env::var("FLOW_RESTORE_DEADLINE_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(2000))
}

/// Pause between broadcasting `restore_request` and replanning.
pub fn restore_settle() -> Duration {
    std::env::var("FLOW_RESTORE_SETTLE_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(800))
}

/// Intra-stage pacing delay between state-file pulls during deployment Stage 1.
pub fn stage1_pacing() -> Duration {
    std::env::var("FLOW_STAGE1_PACING_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(400))
}

/// Wait between deployment Stage 1->2 and Stage 2->3.
pub fn stage_gap() -> Duration {
    std::env::var("FLOW_STAGE_GAP_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(5000))
}

/// Per-message pacing delay within deployment Stage 2.
pub fn stage2_pacing() -> Duration {
    std::env::var("FLOW_STAGE2_PACING_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(20))
}

/// Optional deadline for an in-progress barrier round. Unset by default,
/// matching the upstream protocol's unbounded wait.
pub fn round_deadline() -> Option<Duration> {
    std::env::var("FLOW_ROUND_DEADLINE_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Resolve the driver's own runtime directory:
/// `FLOW_STATE_DIR` > `XDG_STATE_HOME/flow-driver` > `~/.local/state/flow-driver`.
pub fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("FLOW_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("flow-driver"));
    }
    let home = std::env::var("HOME").map_err(|_| ConfigError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/flow-driver"))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
