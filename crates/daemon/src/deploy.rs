// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deployment Protocol (§4.D): drives supervisors through the four ordered
//! stages of a deploy. All inter-stage waits are fixed delays issued through
//! the injected [`Clock`] — there is no per-stage ack, and no retry of
//! individual messages (§7).

use crate::config::Config;
use crate::state::DriverState;
use flow_core::task::{state_file_name, task_name};
use flow_core::topology::{NodeRef, Topology};
use flow_core::{planner, Clock, PlacementResult, SnapshotVersion};
use flow_wire::{descriptor_version, BoltTask, FilePull, MessageType, SpoutTask, TASK_ALL_DISPATCHED_PAYLOAD};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::transport::Outbound;

/// Plan placement against the current fleet and drive the four deployment
/// stages. A no-op if no topology has been submitted yet, or the fleet is
/// empty — matching the "submit-before-join" boundary scenario (§8.1).
pub async fn plan_and_deploy<C: Clock>(state: &DriverState<C>, outbound: &Outbound, config: &Config) {
    let Some(result) = state.plan_topology(config.contractor_base_port) else {
        debug!("no topology submitted yet, deployment skipped");
        return;
    };
    if result.is_empty() {
        debug!("fleet is empty, deployment skipped");
        return;
    }
    let topology = state.topology().expect("just planned against a stored topology");
    let version = state.snapshot_version();

    info!(task_count = result.task_sum, version, "starting deployment");
    stage1_artifact_pull(state, outbound, config, &topology, &result, version).await;
    state.clock.sleep(config.stage_gap).await;
    stage2_task_descriptors(state, outbound, config, &topology, &result, version).await;
    state.clock.sleep(config.stage_gap).await;
    stage3_dispatch(state, outbound, &result).await;
}

async fn stage1_artifact_pull<C: Clock>(
    state: &DriverState<C>,
    outbound: &Outbound,
    config: &Config,
    topology: &Topology,
    result: &PlacementResult,
    version: SnapshotVersion,
) {
    for (index, tasks) in result.by_supervisor.iter().enumerate() {
        if tasks.is_empty() {
            continue;
        }
        let Some(conn_id) = state.conn_id_at(index) else { continue };

        let mut plugin_files = HashSet::new();
        for task in tasks {
            let file = topology.plugin_file(task.node).to_string();
            if plugin_files.insert(file.clone()) {
                outbound.send(&conn_id, MessageType::FilePull, &FilePull { filename: file });
            }
        }

        if version > 0 {
            for task in tasks {
                let name = topology.name(task.node);
                let filename = state_file_name(name, task.ordinal, version - 1);
                outbound.send(&conn_id, MessageType::FilePull, &FilePull { filename });
                state.clock.sleep(config.stage1_pacing).await;
            }
        }
    }
}

async fn stage2_task_descriptors<C: Clock>(
    state: &DriverState<C>,
    outbound: &Outbound,
    config: &Config,
    topology: &Topology,
    result: &PlacementResult,
    version: SnapshotVersion,
) {
    let descriptor_version = descriptor_version(version);

    for (index, tasks) in result.by_supervisor.iter().enumerate() {
        let Some(conn_id) = state.conn_id_at(index) else { continue };

        for task in tasks {
            let name = task_name(topology.name(task.node), task.ordinal);
            let port = task.port.to_string();

            match task.node {
                NodeRef::Spout(_) => {
                    let descriptor = SpoutTask {
                        name,
                        port,
                        grouping_hint: topology.grouping_hint(task.node),
                        field_index: topology.field_index(task.node),
                        plugin_file: topology.plugin_file(task.node).to_string(),
                        plugin_symbol: topology.plugin_symbol(task.node).to_string(),
                        snapshot_version: descriptor_version,
                    };
                    outbound.send(&conn_id, MessageType::SpoutTask, &descriptor);
                }
                NodeRef::Bolt(bolt_index) => {
                    let bolt = &topology.bolts[bolt_index];
                    let prev_bolt_addr = planner::predecessor_addrs(topology, &bolt.prev_task_names);
                    let (prev_bolt_grouping_hint, prev_bolt_field_index) =
                        match planner::first_predecessor(topology, &bolt.prev_task_names) {
                            Some(node) => (Some(topology.grouping_hint(node)), topology.field_index(node)),
                            None => (None, 0),
                        };
                    let descriptor = BoltTask {
                        name,
                        port,
                        prev_bolt_addr,
                        prev_bolt_grouping_hint,
                        prev_bolt_field_index,
                        succ_bolt_grouping_hint: topology.grouping_hint(task.node),
                        succ_bolt_field_index: topology.field_index(task.node),
                        plugin_file: topology.plugin_file(task.node).to_string(),
                        plugin_symbol: topology.plugin_symbol(task.node).to_string(),
                        snapshot_version: descriptor_version,
                    };
                    outbound.send(&conn_id, MessageType::BoltTask, &descriptor);
                }
            }
            state.clock.sleep(config.stage2_pacing).await;
        }
    }
}

async fn stage3_dispatch<C: Clock>(state: &DriverState<C>, outbound: &Outbound, result: &PlacementResult) {
    for (index, tasks) in result.by_supervisor.iter().enumerate() {
        if tasks.is_empty() {
            continue;
        }
        if let Some(conn_id) = state.conn_id_at(index) {
            outbound.send(&conn_id, MessageType::TaskAllDispatched, &TASK_ALL_DISPATCHED_PAYLOAD);
        }
    }
}
