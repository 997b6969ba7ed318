// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! smigrate - one-shot job migration front-end
//!
//! Builds a single migration request from the command line, hands it to the
//! driver (or the drain orchestrator), and maps each failure class to its
//! own exit code so scripts can tell them apart.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod run;

use anyhow::Result;
use clap::Parser;
use sm_adapters::RpcController;
use sm_core::MigrationConfig;
use sm_daemon::lifecycle::Config;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "smigrate",
    version,
    about = "Migrate a running job to other nodes via checkpoint/restart"
)]
struct Cli {
    /// Job to migrate
    #[arg(long = "jobid", value_name = "ID")]
    jobid: Option<u32>,

    /// Step to checkpoint (default: the whole job)
    #[arg(long = "stepid", value_name = "ID")]
    stepid: Option<u32>,

    /// Destination hostlist for the restarted job
    #[arg(long = "nodes", value_name = "HOSTLIST")]
    nodes: Option<String>,

    /// Hostlist the restarted job must avoid
    #[arg(long = "excluded-nodes", value_name = "HOSTLIST")]
    excluded_nodes: Option<String>,

    /// Evacuate every job from this node instead of migrating one job
    #[arg(long = "drain-node", value_name = "NODE")]
    drain_node: Option<String>,

    /// Destination partition for the restarted job
    #[arg(long = "partition", value_name = "NAME")]
    partition: Option<String>,

    /// Override the job's shared flag on restart
    #[arg(
        long = "shared",
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    shared: Option<bool>,

    /// Spread the restarted job across nodes
    #[arg(long = "spread")]
    spread: bool,

    /// Feasibility test only; no migration is performed
    #[arg(long = "test")]
    test: bool,

    /// Controller migration endpoint (default: $SMIG_CTLD_SOCKET)
    #[arg(long = "socket", value_name = "PATH")]
    socket: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let request = match run::build_request(&cli) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("smigrate: {e}");
            std::process::exit(e.exit_code());
        }
    };

    let socket = match &cli.socket {
        Some(path) => path.clone(),
        None => Config::load()?.socket_path,
    };
    let controller = Arc::new(RpcController::new(&socket));
    let config = MigrationConfig::from_params(
        &std::env::var("SMIG_SCHED_PARAMS").unwrap_or_default(),
    );

    match run::execute(controller, config, &request).await {
        Ok(outcome) => {
            println!("{}", run::describe(&request, &outcome));
            Ok(())
        }
        Err(e) => {
            eprintln!("smigrate: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
