// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fleet registry: the ordered set of currently joined supervisors.
//!
//! Order is join order and doubles as the stable integer index planning
//! depends on. A reconnecting supervisor is a brand-new join — it is
//! appended at the tail, never reinserted at its former index (see the
//! determinism discussion on placement).

/// `"host:port"` identifying one supervisor's control connection.
pub type ConnId = String;

/// Ordered sequence of joined supervisor connection ids.
///
/// Not internally synchronized: callers that share a registry across tasks
/// are expected to guard it themselves (a single-writer event loop, or a
/// `parking_lot::RwLock` at the call site), matching the single-writer /
/// many-reader discipline the design calls for.
#[derive(Debug, Default, Clone)]
pub struct FleetRegistry {
    ids: Vec<ConnId>,
}

impl FleetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly joined supervisor, returning its assigned index.
    pub fn add(&mut self, conn_id: impl Into<ConnId>) -> usize {
        self.ids.push(conn_id.into());
        self.ids.len() - 1
    }

    /// Drop a supervisor from the registry. Indices above the removed slot
    /// shift down — callers must treat any held index as invalidated.
    pub fn remove(&mut self, conn_id: &str) -> Option<usize> {
        let idx = self.index_of(conn_id)?;
        self.ids.remove(idx);
        Some(idx)
    }

    pub fn index_of(&self, conn_id: &str) -> Option<usize> {
        self.ids.iter().position(|id| id == conn_id)
    }

    pub fn size(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn by_index(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }

    /// Host portion of the supervisor's `host:port` connection id.
    pub fn host(&self, index: usize) -> Option<&str> {
        self.by_index(index).map(|id| id.rsplit_once(':').map(|(host, _)| host).unwrap_or(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}
