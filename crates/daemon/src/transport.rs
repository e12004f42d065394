// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TCP realization of the transport contract §6 describes as "consumed":
//! one read task and one write task per connection, a single inbound
//! channel keyed by `connId`, and a synthesized `conn_notify{DELETE}` on
//! disconnect so the dispatcher never touches a raw socket.
//!
//! Grounded in this codebase's WebSocket event-bridge (`adapters/agent/coop/ws.rs`):
//! a `tokio::select!` loop translating wire frames into domain events posted
//! to a central channel, with the connection's own teardown synthesizing a
//! terminal event rather than leaving the consumer to infer disconnection.

use flow_core::ConnId;
use flow_wire::{read_envelope, write_envelope, ConnEvent, ConnNotify, Envelope, MessageType};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// One inbound item: a connection id paired with the envelope it sent (or a
/// synthetic `conn_notify` if the transport generated this item itself).
#[derive(Debug)]
pub struct Inbound {
    pub conn_id: ConnId,
    pub envelope: Envelope,
}

pub type InboundTx = mpsc::UnboundedSender<Inbound>;
pub type InboundRx = mpsc::UnboundedReceiver<Inbound>;

/// Publishes outbound envelopes to per-connection writer tasks, keyed by
/// `connId`. Stands in for the opaque "named send channel" the design
/// describes as the transport's half of the contract.
#[derive(Clone, Default)]
pub struct Outbound {
    writers: Arc<Mutex<HashMap<ConnId, mpsc::UnboundedSender<Envelope>>>>,
}

impl Outbound {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&self, conn_id: ConnId, tx: mpsc::UnboundedSender<Envelope>) {
        self.writers.lock().insert(conn_id, tx);
    }

    pub(crate) fn unregister(&self, conn_id: &str) {
        self.writers.lock().remove(conn_id);
    }

    pub fn is_connected(&self, conn_id: &str) -> bool {
        self.writers.lock().contains_key(conn_id)
    }

    /// Enqueue `content` under `kind` for delivery to `conn_id`. A dead or
    /// unknown connection is logged and dropped — there are no outbound
    /// retries (§7).
    pub fn send<T: Serialize>(&self, conn_id: &str, kind: MessageType, content: &T) {
        let envelope = match Envelope::new(kind, content) {
            Ok(e) => e,
            Err(err) => {
                warn!(conn_id, %kind, error = %err, "failed to encode outbound envelope");
                return;
            }
        };
        let tx = self.writers.lock().get(conn_id).cloned();
        match tx {
            Some(tx) => {
                if tx.send(envelope).is_err() {
                    debug!(conn_id, %kind, "outbound queue closed, dropping message");
                }
            }
            None => warn!(conn_id, %kind, "no outbound channel for connection, dropping message"),
        }
    }

    /// [`Outbound::send`] fanned out to every connection id in `targets`.
    pub fn broadcast<T: Serialize>(&self, targets: impl IntoIterator<Item = ConnId>, kind: MessageType, content: &T) {
        for conn_id in targets {
            self.send(&conn_id, kind, content);
        }
    }
}

/// Accept loop: binds `FLOW_DRIVER_PORT` and spawns a read/write task pair
/// per connection, in the accept-loop shape this codebase's daemon listener
/// already uses.
pub async fn run_listener(
    listener: TcpListener,
    inbound_tx: InboundTx,
    outbound: Outbound,
) -> std::io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let conn_id: ConnId = peer.to_string();
        info!(conn_id, "accepted connection");
        stream.set_nodelay(true).ok();
        tokio::spawn(handle_connection(stream, conn_id, inbound_tx.clone(), outbound.clone()));
    }
}

async fn handle_connection(stream: TcpStream, conn_id: ConnId, inbound_tx: InboundTx, outbound: Outbound) {
    let (mut read_half, mut write_half) = stream.into_split();
    let (write_tx, mut write_rx) = mpsc::unbounded_channel::<Envelope>();
    outbound.register(conn_id.clone(), write_tx);

    let writer_conn_id = conn_id.clone();
    let writer = tokio::spawn(async move {
        while let Some(envelope) = write_rx.recv().await {
            if let Err(err) = write_envelope(&mut write_half, &envelope).await {
                warn!(conn_id = %writer_conn_id, error = %err, "failed writing envelope, closing connection");
                break;
            }
        }
    });

    loop {
        match read_envelope(&mut read_half).await {
            Ok(envelope) => {
                if inbound_tx.send(Inbound { conn_id: conn_id.clone(), envelope }).is_err() {
                    break;
                }
            }
            Err(err) => {
                debug!(conn_id, error = %err, "connection closed");
                break;
            }
        }
    }

    writer.abort();
    outbound.unregister(&conn_id);
    let notify = ConnNotify { kind: ConnEvent::Delete, conn_id: conn_id.clone() };
    if let Ok(envelope) = Envelope::new(MessageType::ConnNotify, &notify) {
        let _ = inbound_tx.send(Inbound { conn_id, envelope });
    }
}
