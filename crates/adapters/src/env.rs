// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment variable access for the checkpoint glue.

/// User override for the coordinator base port.
pub const DMTCP_PORT_VAR: &str = "DMTCP_PORT";

/// Coordinator base port from the environment, if set and valid.
pub fn dmtcp_port() -> Option<u16> {
    std::env::var(DMTCP_PORT_VAR)
        .ok()
        .and_then(|s| s.trim().parse::<u16>().ok())
        .filter(|&p| p > 0)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
