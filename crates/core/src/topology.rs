// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The topology data model: spouts, bolts, and the adjacency graph between them.

use crate::error::CoreError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Sentinel predecessor name under which every spout is rooted.
pub const ROOT: &str = "None";

pub type NodeName = String;

/// Policy by which an upstream node partitions tuples across a downstream
/// node's instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupingHint {
    #[serde(rename = "grouping_by_field")]
    ByField,
    #[serde(rename = "grouping_by_shuffle")]
    ByShuffle,
    #[serde(rename = "grouping_by_all")]
    ByAll,
}

crate::simple_display! {
    GroupingHint {
        ByField => "grouping_by_field",
        ByShuffle => "grouping_by_shuffle",
        ByAll => "grouping_by_all",
    }
}

/// A source node producing tuples into the topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpoutNode {
    pub name: NodeName,
    /// Instance count N >= 1.
    pub instances: u32,
    pub plugin_file: String,
    pub plugin_symbol: String,
    pub grouping_hint: GroupingHint,
    pub field_index: u32,
    /// `host:port` addresses of this node's placed instances, in ordinal
    /// order. Empty until a planning pass has run.
    #[serde(default)]
    pub task_addrs: Vec<String>,
}

/// A transform node consuming tuples from named predecessors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoltNode {
    pub name: NodeName,
    pub instances: u32,
    pub plugin_file: String,
    pub plugin_symbol: String,
    pub grouping_hint: GroupingHint,
    pub field_index: u32,
    /// Names of predecessor nodes (spouts or bolts). Resolved by name, not
    /// by pointer, so the topology stays plain old (de)serializable data.
    pub prev_task_names: Vec<NodeName>,
    #[serde(default)]
    pub task_addrs: Vec<String>,
}

/// Reference to a node by kind and position within its owning vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Spout(usize),
    Bolt(usize),
}

/// The DAG of spouts and bolts submitted by the user application.
///
/// Immutable once submitted, except for the `task_addrs` fields that the
/// planner fills in on each planning pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub spouts: Vec<SpoutNode>,
    #[serde(default)]
    pub bolts: Vec<BoltNode>,
}

impl Topology {
    /// Name of a node, regardless of kind.
    pub fn name(&self, node: NodeRef) -> &str {
        match node {
            NodeRef::Spout(i) => &self.spouts[i].name,
            NodeRef::Bolt(i) => &self.bolts[i].name,
        }
    }

    pub fn instances(&self, node: NodeRef) -> u32 {
        match node {
            NodeRef::Spout(i) => self.spouts[i].instances,
            NodeRef::Bolt(i) => self.bolts[i].instances,
        }
    }

    pub fn task_addrs(&self, node: NodeRef) -> &[String] {
        match node {
            NodeRef::Spout(i) => &self.spouts[i].task_addrs,
            NodeRef::Bolt(i) => &self.bolts[i].task_addrs,
        }
    }

    pub fn push_task_addr(&mut self, node: NodeRef, addr: String) {
        match node {
            NodeRef::Spout(i) => self.spouts[i].task_addrs.push(addr),
            NodeRef::Bolt(i) => self.bolts[i].task_addrs.push(addr),
        }
    }

    pub fn clear_task_addrs(&mut self) {
        for spout in &mut self.spouts {
            spout.task_addrs.clear();
        }
        for bolt in &mut self.bolts {
            bolt.task_addrs.clear();
        }
    }

    /// Shared-object file backing a node's plugin implementation.
    pub fn plugin_file(&self, node: NodeRef) -> &str {
        match node {
            NodeRef::Spout(i) => &self.spouts[i].plugin_file,
            NodeRef::Bolt(i) => &self.bolts[i].plugin_file,
        }
    }

    /// Entry-point symbol a node's plugin file is loaded by.
    pub fn plugin_symbol(&self, node: NodeRef) -> &str {
        match node {
            NodeRef::Spout(i) => &self.spouts[i].plugin_symbol,
            NodeRef::Bolt(i) => &self.bolts[i].plugin_symbol,
        }
    }

    /// Policy this node uses to fan tuples out to its own successors.
    pub fn grouping_hint(&self, node: NodeRef) -> GroupingHint {
        match node {
            NodeRef::Spout(i) => self.spouts[i].grouping_hint,
            NodeRef::Bolt(i) => self.bolts[i].grouping_hint,
        }
    }

    pub fn field_index(&self, node: NodeRef) -> u32 {
        match node {
            NodeRef::Spout(i) => self.spouts[i].field_index,
            NodeRef::Bolt(i) => self.bolts[i].field_index,
        }
    }

    /// Find a node by name, searching spouts before bolts.
    pub fn find(&self, name: &str) -> Option<NodeRef> {
        self.spouts
            .iter()
            .position(|s| s.name == name)
            .map(NodeRef::Spout)
            .or_else(|| self.bolts.iter().position(|b| b.name == name).map(NodeRef::Bolt))
    }

    /// Total number of spout instances across the topology — the suspend
    /// threshold used by the checkpoint coordinator.
    pub fn spout_instance_count(&self) -> u32 {
        self.spouts.iter().map(|s| s.instances).sum()
    }

    /// Reject a topology with duplicate node names across spouts and bolts.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut seen = HashSet::new();
        for name in self.spouts.iter().map(|s| &s.name).chain(self.bolts.iter().map(|b| &b.name)) {
            if !seen.insert(name.as_str()) {
                return Err(CoreError::DuplicateNodeName(name.clone()));
            }
        }
        if self.spouts.is_empty() {
            return Err(CoreError::NoSpouts);
        }
        Ok(())
    }
}

/// Adjacency mapping from predecessor-name to the list of successor nodes.
///
/// Built once per planning pass from a topology's `prev_task_names`. Spouts
/// are always reachable from [`ROOT`]; a bolt is reachable from any one of
/// its declared predecessor names that resolves to a real, reachable node —
/// a bolt whose predecessors are *all* unresolvable is simply never visited.
#[derive(Debug, Default)]
pub struct TopologyGraph {
    adjacency: IndexMap<NodeName, Vec<NodeRef>>,
}

impl TopologyGraph {
    pub fn build(topo: &Topology) -> Self {
        let mut adjacency: IndexMap<NodeName, Vec<NodeRef>> = IndexMap::new();
        for (i, bolt) in topo.bolts.iter().enumerate() {
            for pred in &bolt.prev_task_names {
                adjacency.entry(pred.clone()).or_default().push(NodeRef::Bolt(i));
            }
        }
        for (i, _) in topo.spouts.iter().enumerate() {
            adjacency.entry(ROOT.to_string()).or_default().push(NodeRef::Spout(i));
        }
        Self { adjacency }
    }

    pub fn successors(&self, name: &str) -> &[NodeRef] {
        self.adjacency.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
#[path = "topology_tests.rs"]
mod tests;
