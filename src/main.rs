//! Monero Agent Gateway
//!
//! Process wiring: parse configuration, initialize logging, launch the
//! HTTP listener.

use anyhow::Result;
use clap::Parser;
use monero_agent_gateway::api;
use monero_agent_gateway::config::{GatewayConfig, Opts};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[rocket::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();

    // Initialize logging
    let filter = if opts.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = GatewayConfig::from(opts);
    if !config.auth_enabled {
        warn!("API key is empty, running with authentication disabled");
    }
    info!("wallet daemon at {}", config.wallet_rpc_url);
    info!(
        "{} height sources configured, listening on {}:{}",
        config.height_nodes.len(),
        config.listen_addr,
        config.listen_port
    );

    let _rocket = api::build(config)?.launch().await?;
    Ok(())
}
