// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire framing: 4-byte big-endian length prefix + JSON payload.

use crate::envelope::Envelope;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on a single frame's payload size. Guards against a
/// corrupt or hostile length prefix driving an unbounded allocation.
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame of {0} bytes exceeds the {1} byte limit")]
    FrameTooLarge(usize, usize),
    #[error("malformed json payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("timed out waiting for a frame")]
    Timeout,
}

/// Read one length-prefixed envelope from `reader`.
pub async fn read_envelope<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Envelope, ProtocolError> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_FRAME_BYTES {
        return Err(ProtocolError::FrameTooLarge(len, MAX_FRAME_BYTES));
    }
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(serde_json::from_slice(&buf)?)
}

/// Write one length-prefixed envelope to `writer`.
pub async fn write_envelope<W: AsyncWrite + Unpin>(
    writer: &mut W,
    envelope: &Envelope,
) -> Result<(), ProtocolError> {
    let bytes = serde_json::to_vec(envelope)?;
    if bytes.len() > MAX_FRAME_BYTES {
        return Err(ProtocolError::FrameTooLarge(bytes.len(), MAX_FRAME_BYTES));
    }
    writer.write_all(&(bytes.len() as u32).to_be_bytes()).await?;
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// [`read_envelope`], bounded by `timeout`.
pub async fn read_envelope_timeout<R: AsyncRead + Unpin>(
    reader: &mut R,
    timeout: Duration,
) -> Result<Envelope, ProtocolError> {
    tokio::time::timeout(timeout, read_envelope(reader)).await.map_err(|_| ProtocolError::Timeout)?
}

/// [`write_envelope`], bounded by `timeout`.
pub async fn write_envelope_timeout<W: AsyncWrite + Unpin>(
    writer: &mut W,
    envelope: &Envelope,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    tokio::time::timeout(timeout, write_envelope(writer, envelope)).await.map_err(|_| ProtocolError::Timeout)?
}
