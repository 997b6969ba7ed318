// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Controller client over a Unix-domain socket.
//!
//! One connection per request: the controller's migration endpoint is a
//! low-traffic administrative channel, and per-call connections keep the
//! client free of connection-state bookkeeping.

use crate::controller::{
    CheckpointAble, Controller, ControllerActivity, ControllerError,
};
use crate::protocol::{self, ErrorCode, ProtocolError, Request, Response};
use async_trait::async_trait;
use sm_core::{JobDesc, JobId, JobInfo, NodeInfo, NodeState, PartitionInfo, StepId};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::net::UnixStream;

/// [`Controller`] implementation speaking the IPC protocol.
#[derive(Debug, Clone)]
pub struct RpcController {
    socket_path: PathBuf,
    timeout: Duration,
}

impl RpcController {
    /// Client for the migration endpoint at `socket_path`.
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout: protocol::DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Send one request and await its response.
    async fn call(&self, request: Request) -> Result<Response, ControllerError> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(ProtocolError::Io)?;

        let payload = protocol::encode(&request)?;
        tokio::time::timeout(self.timeout, protocol::write_message(&mut stream, &payload))
            .await
            .map_err(|_| ProtocolError::Timeout)??;

        let bytes = tokio::time::timeout(self.timeout, protocol::read_message(&mut stream))
            .await
            .map_err(|_| ProtocolError::Timeout)??;
        let response: Response = protocol::decode(&bytes)?;

        match response {
            Response::Error { code, message } => Err(error_from_wire(code, message)),
            other => Ok(other),
        }
    }
}

fn error_from_wire(code: ErrorCode, message: String) -> ControllerError {
    match code {
        ErrorCode::JobNotFound => match message.parse::<u32>() {
            Ok(id) => ControllerError::JobNotFound(JobId::new(id)),
            Err(_) => ControllerError::Request(message),
        },
        ErrorCode::NodeNotFound => ControllerError::NodeNotFound(message),
        ErrorCode::Failed => ControllerError::Request(message),
    }
}

#[async_trait]
impl Controller for RpcController {
    async fn load_jobs(&self) -> Result<Vec<JobInfo>, ControllerError> {
        match self.call(Request::LoadJobs).await? {
            Response::Jobs { jobs } => Ok(jobs),
            _ => Err(ControllerError::UnexpectedResponse),
        }
    }

    async fn load_job(&self, job_id: JobId) -> Result<JobInfo, ControllerError> {
        match self.call(Request::LoadJob { job_id }).await? {
            Response::Job { job } => Ok(job),
            _ => Err(ControllerError::UnexpectedResponse),
        }
    }

    async fn load_nodes(&self) -> Result<Vec<NodeInfo>, ControllerError> {
        match self.call(Request::LoadNodes).await? {
            Response::Nodes { nodes } => Ok(nodes),
            _ => Err(ControllerError::UnexpectedResponse),
        }
    }

    async fn load_node(&self, name: &str) -> Result<NodeInfo, ControllerError> {
        let request = Request::LoadNode { name: name.into() };
        match self.call(request).await? {
            Response::Node { node } => Ok(node),
            _ => Err(ControllerError::UnexpectedResponse),
        }
    }

    async fn load_partitions(&self) -> Result<Vec<PartitionInfo>, ControllerError> {
        match self.call(Request::LoadPartitions).await? {
            Response::Partitions { partitions } => Ok(partitions),
            _ => Err(ControllerError::UnexpectedResponse),
        }
    }

    async fn checkpoint_able(
        &self,
        job_id: JobId,
        step_id: Option<StepId>,
    ) -> Result<CheckpointAble, ControllerError> {
        let request = Request::CheckpointAble { job_id, step_id };
        match self.call(request).await? {
            Response::CheckpointAble { answer } => Ok(answer),
            _ => Err(ControllerError::UnexpectedResponse),
        }
    }

    async fn checkpoint_vacate(
        &self,
        job_id: JobId,
        step_id: Option<StepId>,
        dir: &Path,
    ) -> Result<(), ControllerError> {
        let request = Request::CheckpointVacate {
            job_id,
            step_id,
            dir: dir.to_path_buf(),
        };
        match self.call(request).await? {
            Response::Ok => Ok(()),
            _ => Err(ControllerError::UnexpectedResponse),
        }
    }

    async fn checkpoint_restart(
        &self,
        job_id: JobId,
        step_id: Option<StepId>,
        dir: &Path,
    ) -> Result<(), ControllerError> {
        let request = Request::CheckpointRestart {
            job_id,
            step_id,
            dir: dir.to_path_buf(),
        };
        match self.call(request).await? {
            Response::Ok => Ok(()),
            _ => Err(ControllerError::UnexpectedResponse),
        }
    }

    async fn job_will_run(&self, desc: &JobDesc) -> Result<bool, ControllerError> {
        let request = Request::JobWillRun { desc: desc.clone() };
        match self.call(request).await? {
            Response::WillRun { will_run } => Ok(will_run),
            _ => Err(ControllerError::UnexpectedResponse),
        }
    }

    async fn update_job(&self, desc: &JobDesc) -> Result<(), ControllerError> {
        let request = Request::UpdateJob { desc: desc.clone() };
        match self.call(request).await? {
            Response::Ok => Ok(()),
            _ => Err(ControllerError::UnexpectedResponse),
        }
    }

    async fn update_node(&self, name: &str, state: NodeState) -> Result<(), ControllerError> {
        let request = Request::UpdateNode {
            name: name.into(),
            state,
        };
        match self.call(request).await? {
            Response::Ok => Ok(()),
            _ => Err(ControllerError::UnexpectedResponse),
        }
    }

    async fn top_job(&self, job_id: JobId) -> Result<(), ControllerError> {
        match self.call(Request::TopJob { job_id }).await? {
            Response::Ok => Ok(()),
            _ => Err(ControllerError::UnexpectedResponse),
        }
    }

    async fn stage_burst_buffers(&self) -> Result<(), ControllerError> {
        match self.call(Request::StageBurstBuffers).await? {
            Response::Ok => Ok(()),
            _ => Err(ControllerError::UnexpectedResponse),
        }
    }

    async fn activity(&self) -> Result<ControllerActivity, ControllerError> {
        match self.call(Request::Activity).await? {
            Response::Activity { activity } => Ok(activity),
            _ => Err(ControllerError::UnexpectedResponse),
        }
    }
}

#[cfg(test)]
#[path = "rpc_tests.rs"]
mod tests;
