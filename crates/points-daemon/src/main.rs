// crates/points-daemon/src/main.rs
//
// Binary entrypoint for the points daemon.
//
// Loads configuration, initializes tracing, issues the genesis capabilities,
// constructs the economy behind its single-writer service, drives the epoch
// clock, and relays events until shutdown.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use points_core::issue_genesis_capabilities;
use points_daemon::{run_epoch_clock, run_event_relay, telemetry, DaemonConfig, EconomyService};
use points_economics::PointsEconomy;

/// Points economy daemon: ledger, staking, lending, and rate oracles.
#[derive(Parser, Debug)]
#[command(name = "points-daemon", version = "0.1.0", about = "Points economy daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.points/config.toml")]
    config: String,

    /// Override the configured log level.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration before tracing so the configured level applies;
    // report the outcome once the subscriber is installed.
    let loaded = DaemonConfig::load(&args.config);
    let mut daemon_config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => DaemonConfig::default(),
    };
    if let Some(level) = args.log_level {
        daemon_config.log_level = level;
    }

    telemetry::init_tracing(&daemon_config.log_level);

    match loaded {
        Ok(_) => tracing::info!("Loaded configuration from {}", args.config),
        Err(e) => tracing::warn!("Could not load config: {}. Using defaults.", e),
    }

    tracing::info!("Points daemon v0.1.0");
    tracing::info!(
        "Policy: epoch_mint_cap={} ltv_bps={} annual_interest_bps={} epochs_per_year={} max_stake_duration={}",
        daemon_config.policy.epoch_mint_cap,
        daemon_config.policy.ltv_bps,
        daemon_config.policy.annual_interest_bps,
        daemon_config.policy.epochs_per_year,
        daemon_config.policy.max_stake_duration_epochs
    );

    let caps = issue_genesis_capabilities();
    tracing::info!("Governance capability {}", caps.governance.id());
    tracing::info!("Oracle capability {}", caps.oracle.id());

    let economy = PointsEconomy::new(&caps.governance, daemon_config.policy.clone())?;
    let service = EconomyService::new(economy, daemon_config.event_buffer);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let relay = tokio::spawn(run_event_relay(service.subscribe(), shutdown_rx.clone()));
    let clock = tokio::spawn(run_epoch_clock(
        service.clone(),
        Arc::new(caps.governance),
        Duration::from_secs(daemon_config.epoch_interval_secs),
        shutdown_rx,
    ));

    tracing::info!("Economy ready; waiting for shutdown signal");
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    let _ = shutdown_tx.send(true);
    let final_epoch = clock.await?;
    relay.await?;
    tracing::info!(
        "Final supply {} at epoch {}, {} open loans with {} outstanding principal",
        service.total_supply().await,
        final_epoch,
        service.read(|e| e.loans().len()).await,
        service.outstanding_principal().await
    );
    Ok(())
}
