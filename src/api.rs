//! HTTP surface: request guard, endpoint handlers, response shapes.
//!
//! Every endpoint except the health check passes through the [`ApiKey`]
//! guard before any handler logic runs. Handlers are thin compositions:
//! authenticate, call the wallet RPC (wallet provisioning happens
//! transparently inside it), convert amounts at the boundary, shape the
//! response.

use crate::amounts;
use crate::config::GatewayConfig;
use crate::error::{ErrorBody, GatewayError};
use crate::height::{reconcile, HeightOracle, SyncState};
use crate::rpc::WalletRpc;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::serde::json::Json;
use rocket::{catch, catchers, get, post, routes, Build, Request, Rocket, State};
use serde::{Deserialize, Serialize};

/// Header carrying the caller credential.
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Proof that the request passed the API-key check.
pub struct ApiKey;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ApiKey {
    type Error = GatewayError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let config = req
            .rocket()
            .state::<GatewayConfig>()
            .expect("GatewayConfig is managed at launch");

        if !config.auth_enabled {
            return Outcome::Success(ApiKey);
        }

        match req.headers().get_one(API_KEY_HEADER) {
            Some(presented) if presented == config.api_key => Outcome::Success(ApiKey),
            _ => Outcome::Error((Status::Forbidden, GatewayError::Auth)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance_xmr: f64,
    pub unlocked_xmr: f64,
    pub network: String,
}

#[derive(Debug, Deserialize)]
pub struct SubaddressRequest {
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct SubaddressResponse {
    pub address: String,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub wallet_height: u64,
    pub network_height: u64,
    pub gap: u64,
    pub sync_percentage: f64,
    pub network: String,
    pub status: SyncState,
}

#[derive(Debug, Serialize)]
pub struct RescanResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub address: String,
    pub amount_xmr: f64,
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub status: String,
    pub tx_hash: String,
    pub fee_xmr: f64,
}

#[get("/")]
fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Monero Agent Gateway is Active".to_string(),
    })
}

#[get("/balance")]
async fn balance(
    _key: ApiKey,
    rpc: &State<WalletRpc>,
    config: &State<GatewayConfig>,
) -> Result<Json<BalanceResponse>, GatewayError> {
    let info = rpc.get_balance().await?;
    Ok(Json(BalanceResponse {
        balance_xmr: amounts::to_xmr(info.balance),
        unlocked_xmr: amounts::to_xmr(info.unlocked_balance),
        network: config.network.clone(),
    }))
}

#[post("/subaddress", data = "<req>")]
async fn subaddress(
    _key: ApiKey,
    rpc: &State<WalletRpc>,
    req: Json<SubaddressRequest>,
) -> Result<Json<SubaddressResponse>, GatewayError> {
    let info = rpc.create_address(&req.label).await?;
    Ok(Json(SubaddressResponse {
        address: info.address,
        label: req.into_inner().label,
    }))
}

/// Sync status never fails past auth: an unreachable daemon or an
/// exhausted node list degrades to zero heights and `unknown`.
#[get("/sync")]
async fn sync(
    _key: ApiKey,
    rpc: &State<WalletRpc>,
    oracle: &State<HeightOracle>,
    config: &State<GatewayConfig>,
) -> Json<SyncResponse> {
    let network_height = oracle.network_height().await;
    let wallet_height = rpc.get_height().await.unwrap_or(0);

    let report = reconcile(wallet_height, network_height);
    Json(SyncResponse {
        wallet_height: report.wallet_height,
        network_height: report.network_height,
        gap: report.gap,
        sync_percentage: report.sync_percentage,
        network: config.network.clone(),
        status: report.status,
    })
}

#[post("/rescan")]
async fn rescan(
    _key: ApiKey,
    rpc: &State<WalletRpc>,
) -> Result<Json<RescanResponse>, GatewayError> {
    rpc.rescan_blockchain().await?;
    Ok(Json(RescanResponse {
        status: "Rescan initiated".to_string(),
    }))
}

#[post("/transfer", data = "<req>")]
async fn transfer(
    _key: ApiKey,
    rpc: &State<WalletRpc>,
    req: Json<TransferRequest>,
) -> Result<Json<TransferResponse>, GatewayError> {
    let atomic = amounts::to_atomic(req.amount_xmr);
    let info = rpc.transfer(&req.address, atomic).await?;
    Ok(Json(TransferResponse {
        status: "Transferred".to_string(),
        tx_hash: info.tx_hash,
        fee_xmr: amounts::to_xmr(info.fee),
    }))
}

/// Guard rejections bypass handler responders, so the 403 body is shaped
/// here to match the endpoint error format.
#[catch(403)]
fn forbidden() -> Json<ErrorBody> {
    Json(ErrorBody {
        detail: GatewayError::Auth.to_string(),
    })
}

/// Build the rocket instance with all routes and shared state mounted.
pub fn build(config: GatewayConfig) -> Result<Rocket<Build>, GatewayError> {
    let rpc = WalletRpc::new(&config)?;
    let oracle = HeightOracle::new(&config)?;

    let figment = rocket::Config::figment()
        .merge(("address", config.listen_addr.to_string()))
        .merge(("port", config.listen_port));

    Ok(rocket::custom(figment)
        .manage(config)
        .manage(rpc)
        .manage(oracle)
        .mount(
            "/",
            routes![health, balance, subaddress, sync, rescan, transfer],
        )
        .register("/", catchers![forbidden]))
}
