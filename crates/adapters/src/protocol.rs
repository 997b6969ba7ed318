// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire format for the controller IPC channel.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload.

use crate::controller::{CheckpointAble, ControllerActivity};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sm_core::{JobDesc, JobId, JobInfo, NodeInfo, NodeState, PartitionInfo, StepId};
use std::path::PathBuf;
use thiserror::Error;

/// Protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Timeout")]
    Timeout,
}

/// Maximum message size (8 MB). A full cluster job table fits comfortably.
pub const MAX_MESSAGE_SIZE: usize = 8 * 1024 * 1024;

/// Default IPC timeout
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Requests understood by the controller's migration endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    LoadJobs,
    LoadJob {
        job_id: JobId,
    },
    LoadNodes,
    LoadNode {
        name: String,
    },
    LoadPartitions,
    CheckpointAble {
        job_id: JobId,
        step_id: Option<StepId>,
    },
    CheckpointVacate {
        job_id: JobId,
        step_id: Option<StepId>,
        dir: PathBuf,
    },
    CheckpointRestart {
        job_id: JobId,
        step_id: Option<StepId>,
        dir: PathBuf,
    },
    JobWillRun {
        desc: JobDesc,
    },
    UpdateJob {
        desc: JobDesc,
    },
    UpdateNode {
        name: String,
        state: NodeState,
    },
    TopJob {
        job_id: JobId,
    },
    StageBurstBuffers,
    Activity,
}

/// Error classes the controller reports back over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    JobNotFound,
    NodeNotFound,
    Failed,
}

/// Responses from the controller's migration endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Response {
    Ok,
    Jobs { jobs: Vec<JobInfo> },
    Job { job: JobInfo },
    Nodes { nodes: Vec<NodeInfo> },
    Node { node: NodeInfo },
    Partitions { partitions: Vec<PartitionInfo> },
    CheckpointAble { answer: CheckpointAble },
    WillRun { will_run: bool },
    Activity { activity: ControllerActivity },
    Error { code: ErrorCode, message: String },
}

/// Encode a message to JSON bytes (without length prefix)
///
/// Use with `write_message()` which handles the length-prefix wire format.
pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    let json = serde_json::to_vec(msg)?;

    if json.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: json.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }

    Ok(json)
}

/// Decode a message from wire format
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Read a length-prefixed message from an async reader
pub async fn read_message<R: tokio::io::AsyncReadExt + Unpin>(
    reader: &mut R,
) -> Result<Vec<u8>, ProtocolError> {
    // Read length prefix
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed);
        }
        Err(e) => return Err(ProtocolError::Io(e)),
    }
    let len = u32::from_be_bytes(len_buf) as usize;

    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    // Read payload
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Write a length-prefixed message to an async writer
pub async fn write_message<W: tokio::io::AsyncWriteExt + Unpin>(
    writer: &mut W,
    data: &[u8],
) -> Result<(), ProtocolError> {
    let len = data.len();
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    writer.write_all(&(len as u32).to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
