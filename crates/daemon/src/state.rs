// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Driver-wide mutable state: fleet registry, topology, and checkpoint
//! bookkeeping, grouped behind one mutex per the design's "treat them as
//! fields of a single coordinator state object" guidance.

use flow_core::{planner, Clock, FleetRegistry, PlacementResult, SnapshotVersion, Topology};
use parking_lot::Mutex;
use std::time::Duration;

/// Per-round barrier ack counts. Reset to zero on threshold or on restore.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    pub suspend_acks: u32,
    pub snapshot_acks: u32,
}

struct Inner {
    fleet: FleetRegistry,
    topology: Option<Topology>,
    snapshot_version: SnapshotVersion,
    counters: Counters,
    snapshot_interval: Duration,
    base_snapshot_interval: Duration,
}

/// The coordinator's global mutable fields, generic over the clock so tests
/// can drive it with a [`flow_core::FakeClock`] instead of real time.
pub struct DriverState<C: Clock> {
    pub clock: C,
    inner: Mutex<Inner>,
}

impl<C: Clock> DriverState<C> {
    pub fn new(clock: C, base_snapshot_interval: Duration) -> Self {
        Self {
            clock,
            inner: Mutex::new(Inner {
                fleet: FleetRegistry::new(),
                topology: None,
                snapshot_version: 0,
                counters: Counters::default(),
                snapshot_interval: base_snapshot_interval,
                base_snapshot_interval,
            }),
        }
    }

    pub fn join(&self, conn_id: impl Into<String>) -> usize {
        self.inner.lock().fleet.add(conn_id)
    }

    /// Drop a supervisor from the fleet. Returns its former index, if it was
    /// present.
    pub fn leave(&self, conn_id: &str) -> Option<usize> {
        self.inner.lock().fleet.remove(conn_id)
    }

    pub fn fleet_size(&self) -> usize {
        self.inner.lock().fleet.size()
    }

    pub fn with_fleet<R>(&self, f: impl FnOnce(&FleetRegistry) -> R) -> R {
        f(&self.inner.lock().fleet)
    }

    pub fn set_topology(&self, topology: Topology) {
        self.inner.lock().topology = Some(topology);
    }

    pub fn topology(&self) -> Option<Topology> {
        self.inner.lock().topology.clone()
    }

    /// Run `f` against the stored topology and write its mutations back.
    /// No-op (returns `None`) if no topology has been submitted yet.
    pub fn with_topology_mut<R>(&self, f: impl FnOnce(&mut Topology) -> R) -> Option<R> {
        let mut guard = self.inner.lock();
        guard.topology.as_mut().map(f)
    }

    /// Plan placement of the submitted topology across the current fleet,
    /// writing the resulting addresses back into the stored topology.
    /// `None` if no topology has been submitted yet; an empty result if the
    /// fleet is empty (deployment is skipped in both cases).
    pub fn plan_topology(&self, base_port: u16) -> Option<PlacementResult> {
        let mut guard = self.inner.lock();
        let Inner { topology, fleet, .. } = &mut *guard;
        let topology = topology.as_mut()?;
        Some(planner::plan(topology, base_port, fleet))
    }

    /// Connection id of the supervisor at the given fleet index, if still
    /// connected.
    pub fn conn_id_at(&self, index: usize) -> Option<String> {
        self.inner.lock().fleet.by_index(index).map(str::to_owned)
    }

    /// Suspend-ack threshold for the current topology: its total spout
    /// instance count. `0` if no topology has been submitted.
    pub fn spout_instance_count(&self) -> u32 {
        self.inner.lock().topology.as_ref().map(Topology::spout_instance_count).unwrap_or(0)
    }

    /// Number of placed task instances per supervisor, for the status query
    /// (§6). Derived from the stored topology's task addresses rather than
    /// the transient `PlacementResult`, which the planner does not retain.
    pub fn tasks_per_supervisor(&self) -> Vec<usize> {
        let guard = self.inner.lock();
        let mut counts = vec![0usize; guard.fleet.size()];
        let Some(topology) = &guard.topology else { return counts };
        for index in 0..guard.fleet.size() {
            let Some(host) = guard.fleet.host(index) else { continue };
            let prefix = format!("{host}:");
            let all_addrs = topology
                .spouts
                .iter()
                .flat_map(|s| s.task_addrs.iter())
                .chain(topology.bolts.iter().flat_map(|b| b.task_addrs.iter()));
            counts[index] = all_addrs.filter(|addr| addr.starts_with(&prefix)).count();
        }
        counts
    }

    pub fn snapshot_version(&self) -> SnapshotVersion {
        self.inner.lock().snapshot_version
    }

    pub fn counters(&self) -> Counters {
        self.inner.lock().counters
    }

    /// Record a `suspend_response` ack, returning the new count.
    pub fn record_suspend_ack(&self) -> u32 {
        let mut guard = self.inner.lock();
        guard.counters.suspend_acks += 1;
        guard.counters.suspend_acks
    }

    /// Record a `snapshot_response` ack, returning the new count.
    pub fn record_snapshot_ack(&self) -> u32 {
        let mut guard = self.inner.lock();
        guard.counters.snapshot_acks += 1;
        guard.counters.snapshot_acks
    }

    /// Advance the snapshot version by one and reset both counters for the
    /// next round. Returns the new version.
    pub fn advance_version(&self) -> SnapshotVersion {
        let mut guard = self.inner.lock();
        guard.snapshot_version += 1;
        guard.counters = Counters::default();
        guard.snapshot_version
    }

    /// Abandon the in-progress round without advancing the version --
    /// used on failover and on an optional round-deadline expiry.
    pub fn reset_counters(&self) {
        self.inner.lock().counters = Counters::default();
    }

    pub fn back_off_snapshot_interval(&self, extra: Duration) {
        self.inner.lock().snapshot_interval += extra;
    }

    pub fn clamp_snapshot_interval(&self) {
        let mut guard = self.inner.lock();
        guard.snapshot_interval = guard.base_snapshot_interval;
    }

    pub fn snapshot_interval(&self) -> Duration {
        self.inner.lock().snapshot_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_core::FakeClock;

    fn state() -> DriverState<FakeClock> {
        DriverState::new(FakeClock::new(), Duration::from_secs(30))
    }

    #[test]
    fn join_and_leave_round_trip_through_the_fleet() {
        let state = state();
        assert_eq!(state.join("a:1"), 0);
        assert_eq!(state.join("b:1"), 1);
        assert_eq!(state.fleet_size(), 2);
        assert_eq!(state.leave("a:1"), Some(0));
        assert_eq!(state.fleet_size(), 1);
    }

    #[test]
    fn advance_version_resets_counters() {
        let state = state();
        state.record_suspend_ack();
        state.record_snapshot_ack();
        assert_eq!(state.advance_version(), 1);
        assert_eq!(state.counters(), Counters::default());
    }

    #[test]
    fn reset_counters_does_not_advance_version() {
        let state = state();
        state.record_suspend_ack();
        state.reset_counters();
        assert_eq!(state.snapshot_version(), 0);
        assert_eq!(state.counters(), Counters::default());
    }

    #[test]
    fn snapshot_interval_backs_off_then_clamps() {
        let state = state();
        state.back_off_snapshot_interval(Duration::from_secs(20));
        assert_eq!(state.snapshot_interval(), Duration::from_secs(50));
        state.clamp_snapshot_interval();
        assert_eq!(state.snapshot_interval(), Duration::from_secs(30));
    }
}
