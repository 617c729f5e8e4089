//! Monero Agent Gateway
//!
//! An authenticated HTTP gateway that sits between an autonomous caller
//! (an AI agent or a CLI) and a local `monero-wallet-rpc` daemon.
//!
//! ## Trust Model
//!
//! - The wallet daemon is local and trusted; calls to it never route
//!   through ambient proxy configuration
//! - External height sources are untrusted and best-effort; any of them
//!   may be down, stale, or lying, so they are only consulted in a fixed
//!   reliability-first order and their failures are absorbed
//! - Callers authenticate with a single shared API key; an empty
//!   configured key switches the gateway into an explicit
//!   auth-disabled development mode

pub mod amounts;
pub mod api;
pub mod config;
pub mod error;
pub mod height;
pub mod rpc;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use height::{reconcile, HeightOracle, SyncReport, SyncState};
pub use rpc::WalletRpc;
