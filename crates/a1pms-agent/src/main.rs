//! A1 policy management agent
//!
//! Keeps the policies of every configured near-RT RIC in line with the
//! repository until interrupted.

use std::path::PathBuf;

use a1pms_agent::{Agent, AgentConfig};
use a1pms_sync::SyncOutcome;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "a1pms-agent")]
#[command(about = "A1 policy management agent", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "a1pms.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Synchronize every ric once and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AgentConfig::load(&cli.config).await?;
    let agent = Agent::new(&config)?;
    tracing::info!(
        config = %cli.config.display(),
        rics = config.rics.len(),
        controllers = config.controllers.len(),
        "configuration loaded"
    );
    agent.apply_config(&config);

    if cli.once {
        let outcomes = agent.trigger().wait_all().await;
        let failed = outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, SyncOutcome::Failed(_)))
            .count();
        for (ric, outcome) in &outcomes {
            tracing::info!(ric = %ric, outcome = ?outcome, "synchronization finished");
        }
        anyhow::ensure!(failed == 0, "{failed} of {} rics failed to synchronize", outcomes.len());
        return Ok(());
    }

    agent.start(Some(cli.config.clone()));
    shutdown_signal().await;
    agent.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown requested");
}
