// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Checkpoint Coordinator (§4.E): the periodic suspend→snapshot barrier, the
//! version counter, and the failover-driven restore path. All timing goes
//! through the injected [`Clock`], which is what makes the barrier interval
//! and the restore deadline exercisable under a `FakeClock` in tests.

use crate::config::Config;
use crate::deploy;
use crate::state::DriverState;
use crate::transport::Outbound;
use flow_core::topology::NodeRef;
use flow_core::{planner, Clock, ConnId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Runs the periodic barrier loop until the driver shuts down. Each tick:
/// wait out the current `snapshot_interval`, clamp it back to base (§4.E —
/// the back-off from a restore lasts exactly one barrier), then broadcast
/// `suspend_request` to the supervisors currently hosting a spout instance.
pub async fn run_barrier_loop<C: Clock>(state: Arc<DriverState<C>>, outbound: Outbound, config: Arc<Config>) {
    loop {
        let interval = state.snapshot_interval();
        state.clock.sleep(interval).await;
        state.clamp_snapshot_interval();

        if state.topology().is_none() || state.fleet_size() == 0 {
            continue;
        }

        info!("barrier tick: broadcasting suspend_request");
        broadcast_suspend(&state, &outbound, config.contractor_base_port);
        spawn_round_deadline_watcher(&state, &config);
    }
}

/// If `FLOW_ROUND_DEADLINE_SECS` is configured, abandon this round the same
/// way a restore would (reset counters, no version advance) if it hasn't
/// completed within the deadline — without requiring an actual connection
/// loss (§9's resolved open question on per-round timeout).
fn spawn_round_deadline_watcher<C: Clock>(state: &Arc<DriverState<C>>, config: &Arc<Config>) {
    let Some(deadline) = config.round_deadline else { return };
    let state = state.clone();
    let version_at_start = state.snapshot_version();
    tokio::spawn(async move {
        state.clock.sleep(deadline).await;
        if state.snapshot_version() == version_at_start {
            info!("round deadline elapsed without completing a barrier, abandoning round");
            state.reset_counters();
        }
    });
}

/// Supervisors currently hosting at least one spout instance, deduplicated.
/// Re-derives placement from the stored topology and current fleet rather
/// than retaining a separate mapping — planning is a pure function of
/// (topology, fleet), so recomputing it is cheap and always current.
fn broadcast_suspend<C: Clock>(state: &DriverState<C>, outbound: &Outbound, base_port: u16) {
    let Some(mut topology) = state.topology() else { return };
    let result = state.with_fleet(|fleet| planner::plan(&mut topology, base_port, fleet));

    let spout_hosts: Vec<ConnId> = result
        .by_supervisor
        .iter()
        .enumerate()
        .filter(|(_, tasks)| tasks.iter().any(|t| matches!(t.node, NodeRef::Spout(_))))
        .filter_map(|(index, _)| state.conn_id_at(index))
        .collect();

    outbound.broadcast(spout_hosts, flow_wire::MessageType::SuspendRequest, &());
}

/// Broadcast `snapshot_request` to every supervisor in the fleet, using
/// version 1 in place of 0 the first time a topology is ever checkpointed.
pub fn broadcast_snapshot<C: Clock>(state: &DriverState<C>, outbound: &Outbound) {
    let version = state.snapshot_version();
    let version = if version == 0 { 1 } else { version };
    let targets: Vec<ConnId> = state.with_fleet(|fleet| fleet.iter().map(String::from).collect());
    info!(version, "suspend threshold reached, broadcasting snapshot_request");
    outbound.broadcast(targets, flow_wire::MessageType::SnapshotRequest, &version);
}

/// Schedules the cancellable 2-second (by default) restore deadline. Each
/// new loss bumps a generation counter; when a deadline fires it checks its
/// own generation is still current before acting, so near-simultaneous
/// losses coalesce into a single restore (§8.5).
#[derive(Clone)]
pub struct RestoreScheduler<C: Clock> {
    generation: Arc<AtomicU64>,
    clock: C,
}

impl<C: Clock> RestoreScheduler<C> {
    pub fn new(clock: C) -> Self {
        Self { generation: Arc::new(AtomicU64::new(0)), clock }
    }

    /// Handle a `conn_notify{DELETE}` for `lost_conn_id`. A no-op if the
    /// connection was not a member of the fleet (§8's idempotence property).
    pub fn trigger(
        &self,
        lost_conn_id: ConnId,
        state: Arc<DriverState<C>>,
        outbound: Outbound,
        config: Arc<Config>,
    ) {
        if state.leave(&lost_conn_id).is_none() {
            return;
        }
        state.back_off_snapshot_interval(config.restore_backoff);
        state.reset_counters();

        let my_generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = self.generation.clone();
        let clock = self.clock.clone();

        tokio::spawn(async move {
            clock.sleep(config.restore_deadline).await;
            if generation.load(Ordering::SeqCst) != my_generation {
                info!(conn_id = %lost_conn_id, "restore deadline superseded by a later loss, skipping");
                return;
            }

            info!("restore deadline elapsed, broadcasting restore_request");
            let remaining: Vec<ConnId> = state.with_fleet(|fleet| fleet.iter().map(String::from).collect());
            outbound.broadcast(remaining, flow_wire::MessageType::RestoreRequest, &());

            clock.sleep(config.restore_settle).await;
            deploy::plan_and_deploy(&state, &outbound, &config).await;
        });
    }
}
