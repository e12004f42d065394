// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the workspace's black-box specs: spawning a real
//! `flow-driverd` subprocess, a tiny fake-supervisor client speaking the
//! wire protocol directly over a loopback socket, and the topology fixture
//! the placement boundary scenario in the design's §8.2 is built around.

use flow_core::{BoltNode, GroupingHint, SpoutNode, Topology};
use flow_wire::{read_envelope_timeout, write_envelope, Envelope, JoinRequest, MessageType};
use std::net::TcpListener as StdTcpListener;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::Instant;

pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Binds ephemeral port 0 long enough to read back the OS-assigned port,
/// then releases it for the driver subprocess to bind in turn. Racy in
/// principle, harmless in practice for a loopback-only test fleet.
pub fn free_port() -> u16 {
    StdTcpListener::bind("127.0.0.1:0")
        .expect("bind ephemeral port")
        .local_addr()
        .expect("read local addr")
        .port()
}

/// A running `flow-driverd` subprocess, configured with fast deployment and
/// checkpoint timings so specs don't have to wait out the 30s/5s production
/// defaults. Killed on drop.
pub struct DriverProcess {
    child: Child,
    port: u16,
    // Held for its lifetime so the directory isn't cleaned up mid-test.
    _state_dir: tempfile::TempDir,
}

impl DriverProcess {
    /// Spawns with a checkpoint barrier far enough out that a spec testing
    /// deployment alone never races it.
    pub async fn spawn() -> Self {
        Self::spawn_with_snapshot_interval_secs(30).await
    }

    pub async fn spawn_with_snapshot_interval_secs(snapshot_interval_secs: u64) -> Self {
        let port = free_port();
        let state_dir = tempfile::tempdir().expect("create temp state dir");
        let bin = assert_cmd::cargo::cargo_bin("flow-driverd");

        let child = Command::new(bin)
            .env("FLOW_DRIVER_PORT", port.to_string())
            .env("FLOW_STATE_DIR", state_dir.path())
            .env("FLOW_SNAPSHOT_INTERVAL_SECS", snapshot_interval_secs.to_string())
            .env("FLOW_STAGE_GAP_MS", "20")
            .env("FLOW_STAGE1_PACING_MS", "0")
            .env("FLOW_STAGE2_PACING_MS", "0")
            .env("FLOW_RESTORE_DEADLINE_MS", "200")
            .env("FLOW_RESTORE_SETTLE_MS", "50")
            .env("RUST_LOG", "warn")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn flow-driverd");

        let driver = Self { child, port, _state_dir: state_dir };
        driver.wait_until_listening().await;
        driver
    }

    async fn wait_until_listening(&self) {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if TcpStream::connect(("127.0.0.1", self.port)).await.is_ok() {
                return;
            }
            if Instant::now() > deadline {
                panic!("flow-driverd never started listening on port {}", self.port);
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    pub fn addr(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }
}

impl Drop for DriverProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// A bare TCP connection a spec drives directly at the envelope level,
/// standing in for either a supervisor or the submission client without
/// pulling in another layer of framing helpers.
pub struct Peer {
    stream: TcpStream,
}

impl Peer {
    pub async fn connect(addr: &str) -> Self {
        Self { stream: TcpStream::connect(addr).await.expect("connect to driver") }
    }

    /// Connects and immediately sends the `join_request` a supervisor sends
    /// on startup.
    pub async fn join(addr: &str, name: &str) -> Self {
        let mut peer = Self::connect(addr).await;
        peer.send(MessageType::JoinRequest, &JoinRequest { name: name.to_string() }).await;
        peer
    }

    pub async fn send<T: serde::Serialize>(&mut self, kind: MessageType, content: &T) {
        let envelope = Envelope::new(kind, content).expect("encode envelope");
        write_envelope(&mut self.stream, &envelope).await.expect("write envelope");
    }

    pub async fn recv(&mut self) -> Envelope {
        read_envelope_timeout(&mut self.stream, RESPONSE_TIMEOUT).await.expect("recv envelope before timeout")
    }

    pub async fn recv_kind(&mut self) -> MessageType {
        self.recv().await.kind()
    }

    /// `true` if no envelope arrives within `within` -- used to assert the
    /// *absence* of deployment traffic (e.g. the submit-before-join
    /// scenario, §8.1).
    pub async fn recv_nothing_within(&mut self, within: Duration) -> bool {
        matches!(
            tokio::time::timeout(within, read_envelope_timeout(&mut self.stream, within)).await,
            Err(_) | Ok(Err(_))
        )
    }
}

/// One spout node (N=2) feeding one bolt node (N=2) -- the exact fixture the
/// design's three-supervisor placement boundary scenario (§8.2) is built
/// around: task names `spout_1, spout_2, bolt_1, bolt_2`.
pub fn two_instance_spout_and_bolt_topology() -> Topology {
    Topology {
        spouts: vec![SpoutNode {
            name: "spout".to_string(),
            instances: 2,
            plugin_file: "spout.so".to_string(),
            plugin_symbol: "Spout".to_string(),
            grouping_hint: GroupingHint::ByShuffle,
            field_index: 0,
            task_addrs: vec![],
        }],
        bolts: vec![BoltNode {
            name: "bolt".to_string(),
            instances: 2,
            plugin_file: "bolt.so".to_string(),
            plugin_symbol: "Bolt".to_string(),
            grouping_hint: GroupingHint::ByField,
            field_index: 1,
            prev_task_names: vec!["spout".to_string()],
            task_addrs: vec![],
        }],
    }
}

/// A single spout instance with no downstream bolt -- the minimal topology
/// a checkpoint-barrier spec needs.
pub fn single_spout_topology() -> Topology {
    Topology {
        spouts: vec![SpoutNode {
            name: "spout".to_string(),
            instances: 1,
            plugin_file: "spout.so".to_string(),
            plugin_symbol: "Spout".to_string(),
            grouping_hint: GroupingHint::ByShuffle,
            field_index: 0,
            task_addrs: vec![],
        }],
        bolts: vec![],
    }
}
