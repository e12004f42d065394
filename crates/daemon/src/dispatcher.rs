// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event Dispatcher (§4.A): a single-threaded loop over one
//! `mpsc::UnboundedReceiver<Inbound>`, decoding each envelope and routing it
//! to a handler. Never blocks on a handler — the restore path is handed off
//! to a background task by the coordinator itself.

use crate::config::Config;
use crate::coordinator::RestoreScheduler;
use crate::deploy;
use crate::state::DriverState;
use crate::transport::{Inbound, InboundRx, Outbound};
use flow_core::Clock;
use flow_wire::{
    ConnEvent, ConnNotify, JoinRequest, MessageType, StatusRequest, StatusResponse, TopoSubmission,
    TopoSubmissionResponse,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Runs until the inbound channel closes (driver shutdown).
pub async fn run<C: Clock>(
    mut inbound_rx: InboundRx,
    state: Arc<DriverState<C>>,
    outbound: Outbound,
    config: Arc<Config>,
    restore: RestoreScheduler<C>,
) {
    while let Some(Inbound { conn_id, envelope }) = inbound_rx.recv().await {
        let kind = envelope.kind();
        match kind {
            MessageType::JoinRequest => match envelope.decode::<JoinRequest>() {
                Ok(req) => {
                    let index = state.join(conn_id.clone());
                    info!(conn_id = %conn_id, name = %req.name, index, "supervisor joined fleet");
                }
                Err(err) => warn!(conn_id = %conn_id, error = %err, "malformed join_request, ignored"),
            },

            MessageType::ConnNotify => match envelope.decode::<ConnNotify>() {
                Ok(notify) if notify.kind == ConnEvent::Delete => {
                    info!(conn_id = %notify.conn_id, "supervisor connection lost");
                    restore.trigger(notify.conn_id, state.clone(), outbound.clone(), config.clone());
                }
                Ok(_) => {}
                Err(err) => warn!(conn_id = %conn_id, error = %err, "malformed conn_notify, ignored"),
            },

            MessageType::TopoSubmission => match envelope.decode::<TopoSubmission>() {
                Ok(topology) => {
                    if let Err(err) = topology.validate() {
                        warn!(conn_id = %conn_id, error = %err, "rejected malformed topology submission");
                        outbound.send(&conn_id, MessageType::TopoSubmissionResponse, &TopoSubmissionResponse { ok: false });
                        continue;
                    }
                    outbound.send(&conn_id, MessageType::TopoSubmissionResponse, &TopoSubmissionResponse { ok: true });
                    info!(conn_id = %conn_id, "topology submitted");
                    state.set_topology(topology);
                    deploy::plan_and_deploy(&state, &outbound, &config).await;
                }
                Err(err) => warn!(conn_id = %conn_id, error = %err, "malformed topo_submission, ignored"),
            },

            MessageType::SuspendResponse => {
                let acks = state.record_suspend_ack();
                let threshold = state.spout_instance_count();
                if threshold > 0 && acks == threshold {
                    crate::coordinator::broadcast_snapshot(&state, &outbound);
                }
            }

            MessageType::SnapshotResponse => {
                let acks = state.record_snapshot_ack();
                let fleet_size = state.fleet_size() as u32;
                if fleet_size > 0 && acks == fleet_size {
                    let version = state.advance_version();
                    info!(version, "snapshot version advanced");
                }
            }

            MessageType::StatusRequest => {
                let _ = envelope.decode::<StatusRequest>();
                let response = status_response(&state);
                outbound.send(&conn_id, MessageType::StatusResponse, &response);
            }

            other => {
                warn!(conn_id = %conn_id, kind = %other, "no dispatcher handler for this message type, ignored");
            }
        }
    }
}

fn status_response<C: Clock>(state: &DriverState<C>) -> StatusResponse {
    StatusResponse {
        fleet_size: state.fleet_size(),
        // The data model carries no topology-level name (§3), only
        // per-node names; there is nothing to report here yet.
        topology_name: None,
        snapshot_version: state.snapshot_version(),
        tasks_per_supervisor: state.tasks_per_supervisor(),
    }
}
