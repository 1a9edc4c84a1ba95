//! HTTP routes for the star registry.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::model::{Block, Record};
use crate::AppState;

#[derive(Deserialize)]
pub struct ValidationRequest {
    pub address: String,
}

/// POST /requestValidation: challenge message for the wallet to sign.
pub async fn request_validation(
    State(state): State<AppState>,
    Json(req): Json<ValidationRequest>,
) -> Result<Json<String>, AppError> {
    if req.address.trim().is_empty() {
        return Err(AppError::BadRequest("address is required".into()));
    }
    Ok(Json(state.proof.issue_challenge(&req.address)))
}

#[derive(Deserialize)]
pub struct StarSubmission {
    pub address: String,
    pub message: String,
    pub signature: String,
    pub star: Value,
}

/// POST /submitstar
pub async fn submit_star(
    State(state): State<AppState>,
    Json(sub): Json<StarSubmission>,
) -> Result<Json<Block>, AppError> {
    let mut ledger = state.ledger.write();
    let result = state.proof.verify_and_submit(
        &mut ledger,
        &sub.address,
        &sub.message,
        &sub.signature,
        sub.star,
    );
    drop(ledger);

    match result {
        Ok(block) => {
            tracing::info!(
                height = block.height,
                fingerprint = %block.fingerprint,
                owner = %sub.address,
                "star registered"
            );
            Ok(Json(block))
        }
        Err(e) => {
            tracing::warn!(owner = %sub.address, error = %e, "star submission rejected");
            Err(e.into())
        }
    }
}

/// GET /block/height/:height
pub async fn get_block_by_height(
    State(state): State<AppState>,
    Path(height): Path<u64>,
) -> Result<Json<Block>, AppError> {
    let block = state.ledger.read().get_by_height(height).cloned();
    block
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("no block at height {height}")))
}

/// GET /block/hash/:hash
pub async fn get_block_by_hash(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<Block>, AppError> {
    let block = state.ledger.read().get_by_fingerprint(&hash).cloned();
    block
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("no block with fingerprint {hash}")))
}

/// GET /blocks/:address: every star claimed by the wallet, oldest first.
pub async fn get_stars(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Vec<Record>>, AppError> {
    let stars = state.proof.stars_by_owner(&state.ledger.read(), &address)?;
    if stars.is_empty() {
        return Err(AppError::NotFound(format!("no stars owned by {address}")));
    }
    Ok(Json(stars))
}

/// GET /validate: heights of blocks failing self-verification or linkage.
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResp {
    pub ok: bool,
    pub height: u64,
    pub faulty: Vec<u64>,
}

pub async fn validate_chain(State(state): State<AppState>) -> Json<ValidateResp> {
    let ledger = state.ledger.read();
    let faulty: Vec<u64> = ledger.validate().iter().map(|b| b.height).collect();
    if !faulty.is_empty() {
        tracing::warn!(?faulty, "chain validation found faulty blocks");
    }
    Json(ValidateResp {
        ok: faulty.is_empty(),
        height: ledger.current_height(),
        faulty,
    })
}

/// GET /health: liveness plus the current chain height.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResp {
    pub status: String,
    pub height: u64,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResp> {
    let height = state.ledger.read().current_height();
    Json(HealthResp {
        status: "ok".into(),
        height,
    })
}

/// GET /version
pub async fn version() -> Json<Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "git_sha": option_env!("GIT_SHA"),
    }))
}
