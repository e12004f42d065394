// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Config` collects every environment-driven setting the driver reads at
//! startup into one struct, loaded once (`Config::load()`), rather than
//! calling the [`crate::env`] accessors piecemeal from call sites.

use crate::env::{self, ConfigError};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub driver_port: u16,
    pub contractor_base_port: u16,
    pub snapshot_interval: Duration,
    pub restore_backoff: Duration,
    pub restore_deadline: Duration,
    pub restore_settle: Duration,
    pub stage1_pacing: Duration,
    pub stage_gap: Duration,
    pub stage2_pacing: Duration,
    pub round_deadline: Option<Duration>,
    pub state_dir: PathBuf,
}

impl Config {
    /// Read every driver setting from the environment, applying the
    /// documented default for anything unset.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            driver_port: env::driver_port(),
            contractor_base_port: env::contractor_base_port(),
            snapshot_interval: env::snapshot_interval(),
            restore_backoff: env::restore_backoff(),
            restore_deadline: env::restore_deadline(),
            restore_settle: env::restore_settle(),
            stage1_pacing: env::stage1_pacing(),
            stage_gap: env::stage_gap(),
            stage2_pacing: env::stage2_pacing(),
            round_deadline: env::round_deadline(),
            state_dir: env::state_dir()?,
        })
    }
}
