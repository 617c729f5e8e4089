//! Startup configuration.
//!
//! Every knob is a long flag with an environment-variable fallback. The
//! parsed options are folded once into an immutable [`GatewayConfig`] that
//! is passed into each component; nothing reads the environment after
//! startup.

use clap::Parser;
use std::net::IpAddr;
use std::time::Duration;

/// Default stagenet height sources, most reliable first.
///
/// Order is the fallback policy: earlier entries are always probed first,
/// and the first node reporting a positive height wins.
pub const DEFAULT_HEIGHT_NODES: &[&str] = &[
    "https://rpc-stagenet.kyc.rip/json_rpc",
    "https://stagenet.xmr.ditatompel.com/json_rpc",
    "http://192.99.8.110:38089/json_rpc",
];

/// Command-line and environment options.
#[derive(Parser, Debug)]
#[command(name = "monero-agent-gateway")]
#[command(about = "Authenticated HTTP gateway in front of monero-wallet-rpc")]
#[command(version)]
pub struct Opts {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// API key callers must present in X-API-KEY; an empty string disables
    /// authentication entirely (development mode)
    #[arg(long, env = "AGENT_API_KEY", default_value = "dev_key_only")]
    pub api_key: String,

    /// monero-wallet-rpc JSON-RPC endpoint
    #[arg(
        long,
        env = "WALLET_RPC_URL",
        default_value = "http://127.0.0.1:38083/json_rpc"
    )]
    pub wallet_rpc_url: String,

    /// Wallet file the gateway provisions and uses on the daemon
    #[arg(long, env = "WALLET_NAME", default_value = "agent_stagenet")]
    pub wallet_name: String,

    /// Passphrase for the gateway wallet
    #[arg(long, env = "WALLET_PASSWORD", default_value = "super_secret_password")]
    pub wallet_password: String,

    /// External height sources, probed in order (comma-separated in env)
    #[arg(
        long = "node",
        env = "HEIGHT_NODES",
        value_delimiter = ',',
        default_values_t = DEFAULT_HEIGHT_NODES.iter().map(|s| s.to_string())
    )]
    pub nodes: Vec<String>,

    /// Network name reported in responses
    #[arg(long, env = "NETWORK", default_value = "stagenet")]
    pub network: String,

    /// Address to bind the HTTP listener on
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0")]
    pub listen_addr: IpAddr,

    /// Port to bind the HTTP listener on
    #[arg(long, env = "LISTEN_PORT", default_value_t = 38084)]
    pub listen_port: u16,

    /// Timeout in seconds for wallet daemon calls
    #[arg(long, env = "RPC_TIMEOUT_SECS", default_value_t = 20)]
    pub rpc_timeout_secs: u64,

    /// Timeout in seconds for each height-source probe
    #[arg(long, env = "NODE_TIMEOUT_SECS", default_value_t = 3)]
    pub node_timeout_secs: u64,
}

/// Immutable runtime configuration, built once in main and shared
/// read-only by every component.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: String,
    /// Derived once at startup: false iff the configured key is empty.
    pub auth_enabled: bool,
    pub wallet_rpc_url: String,
    pub wallet_name: String,
    pub wallet_password: String,
    pub height_nodes: Vec<String>,
    pub network: String,
    pub listen_addr: IpAddr,
    pub listen_port: u16,
    pub rpc_timeout: Duration,
    pub node_timeout: Duration,
}

impl From<Opts> for GatewayConfig {
    fn from(opts: Opts) -> Self {
        Self {
            auth_enabled: !opts.api_key.is_empty(),
            api_key: opts.api_key,
            wallet_rpc_url: opts.wallet_rpc_url,
            wallet_name: opts.wallet_name,
            wallet_password: opts.wallet_password,
            height_nodes: opts.nodes,
            network: opts.network,
            listen_addr: opts.listen_addr,
            listen_port: opts.listen_port,
            rpc_timeout: Duration::from_secs(opts.rpc_timeout_secs),
            node_timeout: Duration::from_secs(opts.node_timeout_secs),
        }
    }
}
