// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Migration daemon (smigd)
//!
//! Hosts the periodic migration agent next to the workload controller. The
//! agent talks to the controller's migration endpoint over its Unix socket
//! and dispatches at most one policy-driven migration per tick.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::sync::Arc;

use sm_adapters::RpcController;
use sm_core::MigrationConfig;
use sm_daemon::agent::MigrationAgent;
use sm_daemon::lifecycle::{self, Config, LifecycleError};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before any config/lock acquisition
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("smigd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("smigd {}", env!("CARGO_PKG_VERSION"));
                println!("Migration daemon - periodically migrates running jobs to consolidate");
                println!("load and promote work into higher-priority partitions");
                println!();
                println!("USAGE:");
                println!("    smigd");
                println!();
                println!("The daemon connects to the controller's migration endpoint");
                println!("(SMIG_CTLD_SOCKET) and runs until SIGINT or SIGTERM.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: smigd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;
    let log_guard = setup_logging(&config)?;

    // One agent per host; a second instance would double-migrate.
    let _lock = match lifecycle::acquire_lock(&config.lock_path) {
        Ok(lock) => lock,
        Err(LifecycleError::LockFailed(path)) => {
            let pid = std::fs::read_to_string(&path)
                .unwrap_or_default()
                .trim()
                .to_string();
            eprintln!("smigd is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            error!("failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    info!("starting migration daemon");

    let controller = Arc::new(RpcController::new(&config.socket_path));
    let migration_config = MigrationConfig::from_params(&config.sched_params);
    let diag = sm_core::shared_diag();
    let shutdown = Arc::new(Notify::new());

    let params_loader: sm_daemon::agent::ParamsLoader = Arc::new(|| {
        std::env::var("SMIG_SCHED_PARAMS").unwrap_or_default()
    });
    let agent = Arc::new(MigrationAgent::new(
        controller,
        migration_config,
        params_loader,
        diag,
        Arc::clone(&shutdown),
    ));

    let agent_task = {
        let agent = Arc::clone(&agent);
        tokio::spawn(async move { agent.run().await })
    };

    info!(
        socket = %config.socket_path.display(),
        "agent running against controller endpoint"
    );

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    shutdown.notify_one();
    if let Err(e) = agent_task.await {
        error!("agent task failed: {}", e);
    }
    info!("daemon stopped");
    Ok(())
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Create log directory if needed
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().ok_or(LifecycleError::NoStateDir)?,
        config
            .log_path
            .file_name()
            .ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
