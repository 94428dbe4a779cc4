use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::daemon::Daemon;

#[derive(Serialize)]
struct MintConditionResponse {
    mintcondition: chain_core::UnlockCondition,
}

enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}

async fn active_mint_condition(
    State(daemon): State<Arc<Daemon>>,
) -> Result<Json<MintConditionResponse>, ApiError> {
    let mintcondition = daemon
        .chain
        .active_mint_condition()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(MintConditionResponse { mintcondition }))
}

async fn mint_condition_at_height(
    State(daemon): State<Arc<Daemon>>,
    Path(height): Path<String>,
) -> Result<Json<MintConditionResponse>, ApiError> {
    let height: u64 = height
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("{} is not a valid height", height)))?;
    let mintcondition = daemon
        .chain
        .mint_condition_at(chain_core::BlockHeight(height))
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(MintConditionResponse { mintcondition }))
}

async fn relay_transaction_set(
    State(daemon): State<Arc<Daemon>>,
    body: axum::body::Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let ceiling = daemon.config.minting_tx.block_size_limit;
    let id = daemon
        .pool
        .relay(&body, ceiling)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(Json(serde_json::json!({ "setid": id.to_string() })))
}

/// The consensus/explorer mint-condition routes and the Relay RPC, mounted
/// on the API address. A real deployment would split these across
/// `api_addr`/`rpc_addr` and gate them behind `authenticate_api`; this
/// core exposes the routes and leaves that policy wiring to the binary
/// that owns the network listener.
pub fn router(daemon: Arc<Daemon>) -> Router {
    Router::new()
        .route("/consensus/mintcondition", get(active_mint_condition))
        .route("/consensus/mintcondition/:height", get(mint_condition_at_height))
        .route("/explorer/mintcondition", get(active_mint_condition))
        .route("/explorer/mintcondition/:height", get(mint_condition_at_height))
        .route("/rpc/relaytransactionset", post(relay_transaction_set))
        .with_state(daemon)
}
