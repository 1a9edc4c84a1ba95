//! In-memory hash-linked ledger with a signed-challenge star registry.
//!
//! [`ledger::Ledger`] is the integrity engine; [`proof::OwnershipProof`]
//! gates appends behind a wallet signature. The HTTP layer in [`routes`]
//! shares one ledger behind a read/write lock.

pub mod clock;
pub mod config;
pub mod crypto;
pub mod error;
pub mod ledger;
pub mod model;
pub mod proof;
pub mod routes;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use parking_lot::RwLock;

use clock::{Clock, SystemClock};
use ledger::Ledger;
use proof::OwnershipProof;

/// Shared application state passed to Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<RwLock<Ledger>>,
    pub proof: Arc<OwnershipProof>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Ledger and proof protocol reading the same clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(Ledger::with_clock(clock.clone()))),
            proof: Arc::new(OwnershipProof::with_clock(clock)),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/requestValidation", post(routes::request_validation))
        .route("/submitstar", post(routes::submit_star))
        .route("/block/height/:height", get(routes::get_block_by_height))
        .route("/block/hash/:hash", get(routes::get_block_by_hash))
        .route("/blocks/:address", get(routes::get_stars))
        .route("/validate", get(routes::validate_chain))
        .route("/health", get(routes::health))
        .route("/version", get(routes::version))
        .with_state(state)
}
