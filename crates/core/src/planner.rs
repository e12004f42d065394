// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Placement planner: turns a topology DAG and an ordered fleet into a
//! deterministic task -> supervisor assignment.
//!
//! Depth-first traversal rooted at [`ROOT`], visiting each node at most
//! once. Instances of a node are placed one at a time onto
//! `placedSoFar mod fleetSize`, where `placedSoFar` is a single counter
//! shared across the whole traversal — this is what keeps placement a pure
//! function of (topology, ordered fleet) rather than of wall-clock timing
//! or handler scheduling.

use crate::fleet::FleetRegistry;
use crate::task::PlacedTask;
use crate::topology::{NodeRef, Topology, TopologyGraph, ROOT};
use std::collections::HashSet;

/// Result of one planning pass.
#[derive(Debug, Default, Clone)]
pub struct PlacementResult {
    pub task_sum: u32,
    /// Tasks grouped by supervisor index, in the order they were assigned.
    /// `by_supervisor[i]` is supervisor `i`'s ordered task list.
    pub by_supervisor: Vec<Vec<PlacedTask>>,
}

impl PlacementResult {
    pub fn is_empty(&self) -> bool {
        self.task_sum == 0
    }
}

/// Plan placement of `topology`'s tasks across `fleet`, writing the
/// resulting `host:port` addresses back into the topology's nodes.
///
/// If the fleet is empty, returns immediately without mutating the
/// topology — deployment is skipped in that case (see the design's
/// submit-before-join boundary scenario).
pub fn plan(topology: &mut Topology, base_port: u16, fleet: &FleetRegistry) -> PlacementResult {
    topology.clear_task_addrs();
    let fleet_size = fleet.size();
    if fleet_size == 0 {
        return PlacementResult::default();
    }

    let graph = TopologyGraph::build(topology);
    let mut by_supervisor: Vec<Vec<PlacedTask>> = vec![Vec::new(); fleet_size];
    let mut visited = HashSet::new();
    let mut placed_so_far: u32 = 0;

    traverse(topology, &graph, fleet, ROOT, &mut visited, &mut placed_so_far, base_port, &mut by_supervisor);

    PlacementResult { task_sum: placed_so_far, by_supervisor }
}

#[allow(clippy::too_many_arguments)]
fn traverse(
    topology: &mut Topology,
    graph: &TopologyGraph,
    fleet: &FleetRegistry,
    from: &str,
    visited: &mut HashSet<String>,
    placed_so_far: &mut u32,
    base_port: u16,
    by_supervisor: &mut [Vec<PlacedTask>],
) {
    let successors = graph.successors(from).to_vec();
    let fleet_size = by_supervisor.len();

    for node in successors {
        let name = topology.name(node).to_string();
        if !visited.insert(name.clone()) {
            continue;
        }

        let instances = topology.instances(node);
        for ordinal in 1..=instances {
            let supervisor_index = (*placed_so_far as usize) % fleet_size;
            let offset = by_supervisor[supervisor_index].len();
            let port = base_port + offset as u16;
            let host = fleet.host(supervisor_index).unwrap_or_default();
            topology.push_task_addr(node, format!("{host}:{port}"));
            by_supervisor[supervisor_index].push(PlacedTask { node, ordinal, supervisor_index, port });
            *placed_so_far += 1;
        }

        traverse(topology, graph, fleet, &name, visited, placed_so_far, base_port, by_supervisor);
    }
}

/// Union of a bolt's predecessor task addresses, preserving per-predecessor
/// order. A predecessor name that does not resolve to a placed node
/// contributes no addresses — the soft edge the design accepts for unknown
/// predecessor names.
pub fn predecessor_addrs(topology: &Topology, prev_names: &[String]) -> Vec<String> {
    let mut addrs = Vec::new();
    for name in prev_names {
        if let Some(node) = topology.find(name) {
            addrs.extend(topology.task_addrs(node).iter().cloned());
        }
    }
    addrs
}

/// The node behind a bolt's first named predecessor, used to populate
/// `PrevBoltGroupingHint`/`PrevBoltFieldIndex` on its task descriptor.
/// Only the first predecessor name is consulted — matching the upstream
/// protocol's single-predecessor-hint descriptor shape — and it resolves
/// to `None` if that name does not name a placed node.
pub fn first_predecessor(topology: &Topology, prev_names: &[String]) -> Option<NodeRef> {
    prev_names.first().and_then(|name| topology.find(name))
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;
