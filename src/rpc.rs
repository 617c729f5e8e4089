//! Wallet daemon JSON-RPC client with lazy wallet provisioning.
//!
//! The daemon may start with no wallet loaded. Rather than making callers
//! provision one, every call classifies "no wallet" errors and runs a
//! single open-or-create recovery before re-issuing the call exactly once.
//! The retry bound is structural: the retried call goes straight to the
//! transport layer, so a wallet that can never be opened or created fails
//! after one recovery attempt instead of looping.

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Daemon error phrases that mean no wallet is currently loaded.
/// Matching is classification by substring, not equality.
const NO_WALLET_PHRASES: &[&str] = &["No wallet file", "No wallet"];

/// JSON-RPC 2.0 request envelope.
///
/// The id is constant: calls are synchronous and one-shot, so request
/// correlation is not needed.
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: &'static str,
    method: &'a str,
    params: Value,
}

/// JSON-RPC 2.0 response envelope. Exactly one of result/error is present.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    message: String,
}

// Typed results for the daemon methods the gateway uses.

#[derive(Debug, Deserialize)]
pub struct BalanceInfo {
    #[serde(default)]
    pub balance: u64,
    #[serde(default)]
    pub unlocked_balance: u64,
}

#[derive(Debug, Deserialize)]
pub struct AddressInfo {
    pub address: String,
    #[serde(default)]
    pub address_index: u32,
}

#[derive(Debug, Deserialize)]
struct HeightInfo {
    #[serde(default)]
    height: u64,
}

#[derive(Debug, Deserialize)]
pub struct TransferInfo {
    pub tx_hash: String,
    #[serde(default)]
    pub fee: u64,
}

/// Client for the single configured `monero-wallet-rpc` endpoint.
pub struct WalletRpc {
    http: reqwest::Client,
    url: String,
    wallet_name: String,
    wallet_password: String,
}

impl WalletRpc {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        // The daemon is local and trusted; never route through an ambient
        // proxy.
        let http = reqwest::Client::builder()
            .timeout(config.rpc_timeout)
            .no_proxy()
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            url: config.wallet_rpc_url.clone(),
            wallet_name: config.wallet_name.clone(),
            wallet_password: config.wallet_password.clone(),
        })
    }

    /// JSON-RPC call with at most one wallet-recovery retry.
    ///
    /// On a "no wallet" upstream error the configured wallet is opened or
    /// created, then the call is re-issued once and that outcome is
    /// returned as-is, even if it is the same daemon error.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, GatewayError> {
        match self.call_raw(method, params.clone()).await {
            Err(GatewayError::Upstream(message)) if is_no_wallet(&message) => {
                warn!(
                    "daemon has no wallet loaded, provisioning {}",
                    self.wallet_name
                );
                self.provision_wallet().await;
                self.call_raw(method, params).await
            }
            outcome => outcome,
        }
    }

    /// One JSON-RPC round trip, no recovery.
    async fn call_raw(&self, method: &str, params: Value) -> Result<Value, GatewayError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: "0",
            method,
            params,
        };

        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GatewayError::Transport(format!(
                "{method} returned HTTP {}",
                response.status()
            )));
        }

        let envelope: RpcResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if let Some(error) = envelope.error {
            return Err(GatewayError::Upstream(error.message));
        }

        Ok(envelope.result.unwrap_or_else(|| json!({})))
    }

    /// Open the configured wallet, creating it if opening fails.
    ///
    /// Failures are logged only; the caller's retried call surfaces the
    /// daemon's own error, not the recovery error.
    async fn provision_wallet(&self) {
        let open = self
            .call_raw(
                "open_wallet",
                json!({
                    "filename": self.wallet_name,
                    "password": self.wallet_password,
                }),
            )
            .await;

        if let Err(e) = open {
            debug!("open_wallet failed ({e}), creating wallet instead");
            if let Err(e) = self
                .call_raw(
                    "create_wallet",
                    json!({
                        "filename": self.wallet_name,
                        "password": self.wallet_password,
                        "language": "English",
                    }),
                )
                .await
            {
                warn!("create_wallet failed: {e}");
            }
        }
    }

    async fn call_as<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, GatewayError> {
        let result = self.call(method, params).await?;
        serde_json::from_value(result).map_err(|e| {
            GatewayError::Transport(format!("{method} returned malformed result: {e}"))
        })
    }

    /// Balance of account 0 in atomic units.
    pub async fn get_balance(&self) -> Result<BalanceInfo, GatewayError> {
        self.call_as("get_balance", json!({ "account_index": 0 }))
            .await
    }

    /// Create a labelled subaddress under account 0.
    pub async fn create_address(&self, label: &str) -> Result<AddressInfo, GatewayError> {
        self.call_as(
            "create_address",
            json!({ "account_index": 0, "label": label }),
        )
        .await
    }

    /// Height the wallet has synced to.
    pub async fn get_height(&self) -> Result<u64, GatewayError> {
        let info: HeightInfo = self.call_as("get_height", json!({})).await?;
        Ok(info.height)
    }

    /// Trigger a full blockchain rescan. Fire-and-forget: success means
    /// the daemon accepted the request, not that the rescan finished.
    pub async fn rescan_blockchain(&self) -> Result<(), GatewayError> {
        self.call("rescan_blockchain", json!({})).await.map(|_| ())
    }

    /// Send `amount` atomic units to `address` from account 0.
    pub async fn transfer(&self, address: &str, amount: u64) -> Result<TransferInfo, GatewayError> {
        self.call_as(
            "transfer",
            json!({
                "destinations": [{ "address": address, "amount": amount }],
                "account_index": 0,
                "priority": 1,
            }),
        )
        .await
    }
}

/// Classify a daemon error message as "no wallet loaded".
fn is_no_wallet(message: &str) -> bool {
    NO_WALLET_PHRASES
        .iter()
        .any(|phrase| message.contains(phrase))
}
