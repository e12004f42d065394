// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types raised by planning and fleet bookkeeping.

use thiserror::Error;

/// Errors the planner and fleet registry can raise.
///
/// Most anomalies described in the design (unknown predecessor name, an
/// empty fleet) are not represented here — they are absorbed and logged at
/// the call site rather than propagated, per the best-effort error model.
/// This type exists for the handful of conditions worth a typed `Err`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("node name {0:?} is not unique within the topology")]
    DuplicateNodeName(String),

    #[error("topology has no spout nodes")]
    NoSpouts,
}
