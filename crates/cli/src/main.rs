// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `flow-submit`: a thin client of the driver's own wire protocol (§6). It
//! connects to the driver's TCP port, frames and sends a `topo_submission`
//! envelope built from a topology description file, and prints the
//! driver's acknowledgement or a connection error.

use anyhow::{bail, Context, Result};
use clap::Parser;
use flow_core::Topology;
use flow_wire::{read_envelope_timeout, write_envelope, Envelope, MessageType, TopoSubmissionResponse};
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpStream;

const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(
    name = "flow-submit",
    about = "Submit a topology to a running flow-driverd",
    version = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH"))
)]
struct Args {
    /// Path to a JSON file describing the topology (spouts and bolts).
    topology: PathBuf,

    /// Driver address to connect to.
    #[arg(long, default_value = "127.0.0.1:5050")]
    addr: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let raw = std::fs::read_to_string(&args.topology)
        .with_context(|| format!("reading topology file {}", args.topology.display()))?;
    let topology: Topology = serde_json::from_str(&raw).context("parsing topology JSON")?;
    topology.validate().context("topology failed validation")?;

    let mut stream =
        TcpStream::connect(&args.addr).await.with_context(|| format!("connecting to {}", args.addr))?;

    let envelope = Envelope::new(MessageType::TopoSubmission, &topology).context("encoding submission")?;
    write_envelope(&mut stream, &envelope).await.context("sending topo_submission")?;

    let response = read_envelope_timeout(&mut stream, DEFAULT_RESPONSE_TIMEOUT)
        .await
        .context("waiting for driver acknowledgement")?;
    if response.kind() != MessageType::TopoSubmissionResponse {
        bail!("unexpected response type from driver: {}", response.kind());
    }
    let ack: TopoSubmissionResponse = response.decode().context("decoding acknowledgement")?;
    if ack.ok {
        println!("OK");
        Ok(())
    } else {
        bail!("driver rejected the submission");
    }
}
