//! Gateway error taxonomy and its HTTP mapping.

use rocket::http::Status;
use rocket::response::{self, Responder, Response};
use rocket::serde::json::Json;
use rocket::Request;
use serde::Serialize;
use thiserror::Error;

/// Failures surfaced by gateway endpoints.
///
/// Wallet-recovery classification is internal to the RPC client and never
/// appears here: it is always absorbed by the single bounded recovery
/// attempt, after which the daemon's own error surfaces as [`Upstream`].
///
/// [`Upstream`]: GatewayError::Upstream
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing or mismatched API key.
    #[error("Invalid or missing API Key")]
    Auth,

    /// Network-level failure talking to the wallet daemon.
    #[error("{0}")]
    Transport(String),

    /// The wallet daemon answered with a JSON-RPC error.
    #[error("{0}")]
    Upstream(String),
}

/// JSON error body sent to callers: `{"detail": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl<'r> Responder<'r, 'static> for GatewayError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = match self {
            GatewayError::Auth => Status::Forbidden,
            GatewayError::Transport(_) | GatewayError::Upstream(_) => {
                Status::InternalServerError
            }
        };
        let body = Json(ErrorBody {
            detail: self.to_string(),
        });
        Response::build_from(body.respond_to(req)?)
            .status(status)
            .ok()
    }
}
