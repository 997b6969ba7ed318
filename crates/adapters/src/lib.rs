// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sm-adapters: seams between the migration subsystem and the outside world.
//!
//! The subsystem never talks to the workload controller or the checkpoint
//! runtime directly; it goes through the [`Controller`] trait (implemented
//! over IPC by [`RpcController`]) and the checkpoint glue in [`dmtcp`].
//! Tests use the in-memory [`FakeController`].

pub mod controller;
pub mod dmtcp;
pub mod env;
pub mod protocol;
pub mod rpc;
pub mod subprocess;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{ControllerCall, FakeController};

pub use controller::{CheckpointAble, Controller, ControllerActivity, ControllerError};
pub use dmtcp::{CoordinatorSpawner, DmtcpError, ProcessSpawner, Rendezvous};
pub use protocol::{ProtocolError, Request, Response};
pub use rpc::RpcController;
