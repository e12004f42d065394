// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Driver daemon lifecycle specs: placement, deployment, and the
//! checkpoint barrier, each driven against a real `flow-driverd`
//! subprocess over loopback TCP.

use crate::prelude::{
    single_spout_topology, two_instance_spout_and_bolt_topology, DriverProcess, Peer,
};
use flow_wire::{
    MessageType, SnapshotRequestVersion, StatusRequest, StatusResponse, TopoSubmissionResponse,
};
use std::time::Duration;

async fn submit(addr: &str, topology: &flow_core::Topology) {
    let mut client = Peer::connect(addr).await;
    client.send(MessageType::TopoSubmission, topology).await;
    let response = client.recv().await;
    assert_eq!(response.kind(), MessageType::TopoSubmissionResponse);
    let ack: TopoSubmissionResponse = response.decode().expect("decode ack");
    assert!(ack.ok, "driver rejected a valid topology");
}

#[tokio::test]
async fn submitting_a_topology_before_any_supervisor_joins_skips_deployment() {
    let driver = DriverProcess::spawn().await;
    submit(&driver.addr(), &two_instance_spout_and_bolt_topology()).await;

    // A supervisor joining afterward gets nothing -- deployment only runs
    // at the moment a topology is submitted, and the fleet was empty then.
    let mut supervisor = Peer::join(&driver.addr(), "s0").await;
    assert!(
        supervisor.recv_nothing_within(Duration::from_millis(300)).await,
        "a late-joining supervisor should not receive a deployment it missed"
    );
}

#[tokio::test]
async fn three_supervisors_receive_tasks_in_round_robin_placement_order() {
    let driver = DriverProcess::spawn().await;

    let mut sup0 = Peer::join(&driver.addr(), "s0").await;
    let mut sup1 = Peer::join(&driver.addr(), "s1").await;
    let mut sup2 = Peer::join(&driver.addr(), "s2").await;

    submit(&driver.addr(), &two_instance_spout_and_bolt_topology()).await;

    // spout (N=2): ordinal 1 -> s0, ordinal 2 -> s1.
    // bolt (N=2): ordinal 1 -> s2, ordinal 2 -> s0 (placedSoFar keeps
    // counting across both nodes rather than restarting per node).
    let mut sup0_kinds = Vec::new();
    for _ in 0..5 {
        sup0_kinds.push(sup0.recv_kind().await);
    }
    assert_eq!(
        sup0_kinds,
        vec![
            MessageType::FilePull,
            MessageType::FilePull,
            MessageType::SpoutTask,
            MessageType::BoltTask,
            MessageType::TaskAllDispatched,
        ],
        "s0 hosts the first spout instance and the second bolt instance"
    );

    let mut sup1_kinds = Vec::new();
    for _ in 0..3 {
        sup1_kinds.push(sup1.recv_kind().await);
    }
    assert_eq!(
        sup1_kinds,
        vec![MessageType::FilePull, MessageType::SpoutTask, MessageType::TaskAllDispatched],
        "s1 hosts only the second spout instance"
    );

    let mut sup2_kinds = Vec::new();
    for _ in 0..3 {
        sup2_kinds.push(sup2.recv_kind().await);
    }
    assert_eq!(
        sup2_kinds,
        vec![MessageType::FilePull, MessageType::BoltTask, MessageType::TaskAllDispatched],
        "s2 hosts only the first bolt instance"
    );
}

#[tokio::test]
async fn checkpoint_barrier_advances_the_snapshot_version_once_every_supervisor_acks() {
    let driver = DriverProcess::spawn_with_snapshot_interval_secs(1).await;

    let mut sup0 = Peer::join(&driver.addr(), "s0").await;
    let mut sup1 = Peer::join(&driver.addr(), "s1").await;
    let mut sup2 = Peer::join(&driver.addr(), "s2").await;

    submit(&driver.addr(), &two_instance_spout_and_bolt_topology()).await;
    drain_deployment(&mut sup0, 5).await;
    drain_deployment(&mut sup1, 3).await;
    drain_deployment(&mut sup2, 3).await;

    // Only s0 and s1 host a spout instance; s2 hosts only the bolt and
    // should not be asked to suspend.
    assert_eq!(sup0.recv_kind().await, MessageType::SuspendRequest);
    assert_eq!(sup1.recv_kind().await, MessageType::SuspendRequest);
    assert!(
        sup2.recv_nothing_within(Duration::from_millis(300)).await,
        "a supervisor hosting no spout instance should not be asked to suspend"
    );

    sup0.send(MessageType::SuspendResponse, &()).await;
    sup1.send(MessageType::SuspendResponse, &()).await;

    // Suspend threshold reached (2 spout instances) -> snapshot_request
    // broadcast to the whole fleet, s2 included.
    let version0: SnapshotRequestVersion = sup0.recv().await.decode().expect("decode version");
    let version1: SnapshotRequestVersion = sup1.recv().await.decode().expect("decode version");
    let version2: SnapshotRequestVersion = sup2.recv().await.decode().expect("decode version");
    assert_eq!((version0, version1, version2), (1, 1, 1));

    sup0.send(MessageType::SnapshotResponse, &()).await;
    sup1.send(MessageType::SnapshotResponse, &()).await;
    sup2.send(MessageType::SnapshotResponse, &()).await;

    // Give the dispatcher a moment to process the third ack and advance
    // the version, then confirm through the status query.
    let mut status_peer = Peer::connect(&driver.addr()).await;
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        status_peer.send(MessageType::StatusRequest, &StatusRequest).await;
        let response = status_peer.recv().await;
        assert_eq!(response.kind(), MessageType::StatusResponse);
        let status: StatusResponse = response.decode().expect("decode status");
        if status.snapshot_version == 1 {
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "snapshot version never advanced to 1");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn supervisor_disconnect_triggers_a_restore_and_redeploy() {
    let driver = DriverProcess::spawn().await;

    let mut sup0 = Peer::join(&driver.addr(), "s0").await;
    let mut sup1 = Peer::join(&driver.addr(), "s1").await;

    submit(&driver.addr(), &single_spout_topology()).await;
    // Single spout instance (N=1), two supervisors: s0 (joined first) hosts
    // it, s1 hosts nothing and gets no deployment traffic at all.
    drain_deployment(&mut sup0, 3).await;
    assert!(
        sup1.recv_nothing_within(Duration::from_millis(300)).await,
        "s1 hosts no tasks in the initial placement"
    );

    drop(sup0);

    // s1 survives the loss, is told to restore, and is redeployed to as the
    // sole remaining supervisor -- now hosting the spout instance itself.
    assert_eq!(sup1.recv_kind().await, MessageType::RestoreRequest);
    assert_eq!(sup1.recv_kind().await, MessageType::FilePull);
    assert_eq!(sup1.recv_kind().await, MessageType::SpoutTask);
    assert_eq!(sup1.recv_kind().await, MessageType::TaskAllDispatched);
}

async fn drain_deployment(peer: &mut Peer, count: usize) {
    for _ in 0..count {
        peer.recv().await;
    }
}
