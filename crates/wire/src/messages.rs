// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inner payload shapes for each [`crate::MessageType`].

use flow_core::{GroupingHint, SnapshotVersion, Topology};
use serde::{Deserialize, Serialize};

/// `S -> D`. A supervisor announcing itself to the fleet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JoinRequest {
    #[serde(rename = "Name")]
    pub name: String,
}

/// Kind of connection-pool change the transport layer is reporting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConnEvent {
    #[serde(rename = "CONN_ADD")]
    Add,
    #[serde(rename = "CONN_DELETE")]
    Delete,
}

/// `transport -> D`. Synthesized by the transport layer, never sent by a peer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnNotify {
    #[serde(rename = "Type")]
    pub kind: ConnEvent,
    #[serde(rename = "ConnId")]
    pub conn_id: String,
}

/// `D -> S`. Asks a supervisor to pull an artifact or state file by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilePull {
    #[serde(rename = "Filename")]
    pub filename: String,
}

/// A task descriptor's snapshot-version field: `-1` means "no prior
/// checkpoint to resume from" (the topology has never completed a
/// snapshot); any value `>= 0` names the checkpoint generation to restore.
pub type DescriptorVersion = i64;

/// Compute a descriptor's snapshot-version field from the coordinator's
/// current version. Version 0 (no snapshot yet) yields the `-1` sentinel.
pub fn descriptor_version(current: SnapshotVersion) -> DescriptorVersion {
    current as DescriptorVersion - 1
}

/// `D -> S`. Spout task descriptor, sent during deployment Stage 2.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpoutTask {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Port")]
    pub port: String,
    #[serde(rename = "GroupingHint")]
    pub grouping_hint: GroupingHint,
    #[serde(rename = "FieldIndex")]
    pub field_index: u32,
    #[serde(rename = "PluginFile")]
    pub plugin_file: String,
    #[serde(rename = "PluginSymbol")]
    pub plugin_symbol: String,
    #[serde(rename = "SnapshotVersion")]
    pub snapshot_version: DescriptorVersion,
}

/// `D -> S`. Bolt task descriptor, sent during deployment Stage 2.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoltTask {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Port")]
    pub port: String,
    #[serde(rename = "PrevBoltAddr")]
    pub prev_bolt_addr: Vec<String>,
    #[serde(rename = "PrevBoltGroupingHint")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_bolt_grouping_hint: Option<GroupingHint>,
    #[serde(rename = "PrevBoltFieldIndex")]
    pub prev_bolt_field_index: u32,
    #[serde(rename = "SuccBoltGroupingHint")]
    pub succ_bolt_grouping_hint: GroupingHint,
    #[serde(rename = "SuccBoltFieldIndex")]
    pub succ_bolt_field_index: u32,
    #[serde(rename = "PluginFile")]
    pub plugin_file: String,
    #[serde(rename = "PluginSymbol")]
    pub plugin_symbol: String,
    #[serde(rename = "SnapshotVersion")]
    pub snapshot_version: DescriptorVersion,
}

/// `client -> D`. The full topology object.
pub type TopoSubmission = Topology;

/// `D -> client`. Acknowledges a topology submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopoSubmissionResponse {
    pub ok: bool,
}

/// Literal payload of `task_all_dispatched`.
pub const TASK_ALL_DISPATCHED_PAYLOAD: &str = "ok";

/// `D -> S`. Integer checkpoint generation being requested.
pub type SnapshotRequestVersion = SnapshotVersion;

/// `D -> S`/`D -> all`. A minimal status query, added for operability; it
/// does not gate or replace any deployment or checkpoint behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusRequest;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub fleet_size: usize,
    pub topology_name: Option<String>,
    pub snapshot_version: SnapshotVersion,
    pub tasks_per_supervisor: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_version_sentinel_for_fresh_topology() {
        assert_eq!(descriptor_version(0), -1);
    }

    #[test]
    fn descriptor_version_for_an_existing_snapshot() {
        assert_eq!(descriptor_version(3), 2);
    }

    #[test]
    fn conn_notify_renders_go_style_constants() {
        let notify = ConnNotify { kind: ConnEvent::Delete, conn_id: "10.0.0.1:9000".to_string() };
        let json = serde_json::to_string(&notify).expect("serialize");
        assert!(json.contains("\"Type\":\"CONN_DELETE\""));
    }
}
