// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol for driver <-> supervisor control-channel messages.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod codec;
mod envelope;
mod messages;

pub use codec::{
    read_envelope, read_envelope_timeout, write_envelope, write_envelope_timeout, ProtocolError,
    MAX_FRAME_BYTES,
};
pub use envelope::{Envelope, Header, MessageType};
pub use messages::{
    descriptor_version, BoltTask, ConnEvent, ConnNotify, DescriptorVersion, FilePull, JoinRequest,
    SnapshotRequestVersion, SpoutTask, StatusRequest, StatusResponse, TopoSubmission,
    TopoSubmissionResponse, TASK_ALL_DISPATCHED_PAYLOAD,
};
