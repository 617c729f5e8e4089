//! Independent chain-height reconciliation.
//!
//! The wallet daemon only knows how far it has synced, not the true chain
//! tip, so the gateway probes an ordered list of public nodes for the real
//! height and folds both numbers into a sync report. Probing is strictly
//! best-effort: every failure mode is a typed skip, and an exhausted list
//! degrades to an `unknown` status instead of failing the request.

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

/// Outcome of probing one external height source.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// The node answered with a positive chain height.
    Height(u64),
    /// The node was unusable for the stated reason; try the next one.
    Skipped(String),
}

/// Synchronization state relative to the best known network height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Synced,
    Synchronizing,
    /// No height source was reachable. Indistinguishable from "not
    /// synced", so the gateway reports the ambiguity instead of guessing.
    Unknown,
}

/// Derived sync snapshot; recomputed on every request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub wallet_height: u64,
    pub network_height: u64,
    pub gap: u64,
    pub sync_percentage: f64,
    pub status: SyncState,
}

/// Probes an ordered list of public nodes for the true chain height.
pub struct HeightOracle {
    http: reqwest::Client,
    nodes: Vec<String>,
}

impl HeightOracle {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.node_timeout)
            .no_proxy()
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            nodes: config.height_nodes.clone(),
        })
    }

    /// Best known network height, or 0 when no source is usable.
    ///
    /// Nodes are tried strictly in list order; the first one reporting a
    /// positive height wins. Latency and reported values never reorder
    /// the list.
    pub async fn network_height(&self) -> u64 {
        for url in &self.nodes {
            match self.probe(url).await {
                ProbeOutcome::Height(height) => {
                    debug!("height source {url} reports height {height}");
                    return height;
                }
                ProbeOutcome::Skipped(reason) => {
                    debug!("skipping height source {url}: {reason}");
                }
            }
        }
        0
    }

    async fn probe(&self, url: &str) -> ProbeOutcome {
        let request = json!({ "jsonrpc": "2.0", "id": "0", "method": "get_info" });

        let response = match self.http.post(url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => return ProbeOutcome::Skipped(e.to_string()),
        };

        if !response.status().is_success() {
            return ProbeOutcome::Skipped(format!("HTTP {}", response.status()));
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => return ProbeOutcome::Skipped(e.to_string()),
        };

        match body["result"]["height"].as_u64() {
            Some(height) if height > 0 => ProbeOutcome::Height(height),
            _ => ProbeOutcome::Skipped("reported zero height".to_string()),
        }
    }
}

/// Combine the wallet's own height with the network height.
///
/// A wallet may transiently report a height ahead of a stale public node,
/// so the percentage is clamped at 100 and the state still counts as
/// synced. With no usable network height everything degrades to zeros and
/// [`SyncState::Unknown`].
pub fn reconcile(wallet_height: u64, network_height: u64) -> SyncReport {
    let gap = network_height.saturating_sub(wallet_height);

    let sync_percentage = if wallet_height == 0 || network_height == 0 {
        0.0
    } else {
        let pct = wallet_height as f64 / network_height as f64 * 100.0;
        ((pct * 100.0).round() / 100.0).min(100.0)
    };

    let status = if network_height == 0 {
        SyncState::Unknown
    } else if wallet_height >= network_height {
        SyncState::Synced
    } else {
        SyncState::Synchronizing
    };

    SyncReport {
        wallet_height,
        network_height,
        gap,
        sync_percentage,
        status,
    }
}
