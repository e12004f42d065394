// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `{Header:{Type}, Content}` envelope every control message is wrapped in.

use serde::{Deserialize, Serialize};

/// Every message type exchanged between the driver and a supervisor (or the
/// submission client), keyed by the exact string used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    #[serde(rename = "join_request")]
    JoinRequest,
    #[serde(rename = "conn_notify")]
    ConnNotify,
    #[serde(rename = "topo_submission")]
    TopoSubmission,
    #[serde(rename = "topo_submission_response")]
    TopoSubmissionResponse,
    #[serde(rename = "file_pull")]
    FilePull,
    #[serde(rename = "spout_task")]
    SpoutTask,
    #[serde(rename = "bolt_task")]
    BoltTask,
    #[serde(rename = "task_all_dispatched")]
    TaskAllDispatched,
    #[serde(rename = "suspend_request")]
    SuspendRequest,
    #[serde(rename = "suspend_response")]
    SuspendResponse,
    #[serde(rename = "snapshot_request")]
    SnapshotRequest,
    #[serde(rename = "snapshot_response")]
    SnapshotResponse,
    #[serde(rename = "restore_request")]
    RestoreRequest,
    /// Not present in the upstream protocol; a minimal read-only
    /// observability hook added here (see the driver's status query).
    #[serde(rename = "status_request")]
    StatusRequest,
    #[serde(rename = "status_response")]
    StatusResponse,
}

flow_core::simple_display! {
    MessageType {
        JoinRequest => "join_request",
        ConnNotify => "conn_notify",
        TopoSubmission => "topo_submission",
        TopoSubmissionResponse => "topo_submission_response",
        FilePull => "file_pull",
        SpoutTask => "spout_task",
        BoltTask => "bolt_task",
        TaskAllDispatched => "task_all_dispatched",
        SuspendRequest => "suspend_request",
        SuspendResponse => "suspend_response",
        SnapshotRequest => "snapshot_request",
        SnapshotResponse => "snapshot_response",
        RestoreRequest => "restore_request",
        StatusRequest => "status_request",
        StatusResponse => "status_response",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(rename = "Type")]
    pub kind: MessageType,
}

/// `{Header:{Type}, Content}`. `content` carries the inner JSON payload
/// whose shape is determined by `header.kind` — unlike the upstream Go
/// implementation, which stuffs the inner payload into a `[]byte` field
/// (serializing it as base64 under Go's default `json.Marshal`), this
/// embeds it as a nested JSON value directly. Same contract, no
/// byte-string round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "Header")]
    pub header: Header,
    #[serde(rename = "Content")]
    pub content: serde_json::Value,
}

impl Envelope {
    pub fn new<T: Serialize>(kind: MessageType, content: &T) -> serde_json::Result<Self> {
        Ok(Self { header: Header { kind }, content: serde_json::to_value(content)? })
    }

    pub fn kind(&self) -> MessageType {
        self.header.kind
    }

    pub fn decode<T: for<'de> Deserialize<'de>>(&self) -> serde_json::Result<T> {
        serde_json::from_value(self.content.clone())
    }
}
