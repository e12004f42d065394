// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task identity and naming conventions shared by planning, deployment, and
//! checkpoint restore.

use crate::topology::NodeRef;

/// A monotonic integer identifying a globally consistent checkpoint.
///
/// Version 0 means "fresh topology, no state to restore"; version V >= 1
/// means a checkpoint at level V exists on supervisor-side storage.
pub type SnapshotVersion = u32;

/// A single instance of a spout or bolt placed on a supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedTask {
    pub node: NodeRef,
    /// 1-based position among this node's instances, assigned in planning order.
    pub ordinal: u32,
    pub supervisor_index: usize,
    pub port: u16,
}

/// `"<nodeName>_<ordinal>"`, the task's identity on the wire.
pub fn task_name(node_name: &str, ordinal: u32) -> String {
    format!("{node_name}_{ordinal}")
}

/// `"<nodeName>_<ordinal>_<snapshotVersion>"`, the checkpoint state file
/// naming convention a supervisor uses to persist and restore a task.
pub fn state_file_name(node_name: &str, ordinal: u32, version: SnapshotVersion) -> String {
    format!("{node_name}_{ordinal}_{version}")
}
