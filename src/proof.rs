//! Challenge/response ownership proof gating writes to the ledger.
//!
//! A wallet asks for a challenge `"<address>:<unix secs>:starRegistry"`,
//! signs it, and submits the signature with its star within
//! [`VALIDATION_WINDOW_SECS`]. Nothing is remembered between calls: the
//! challenge carries its own issue time.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::clock::{Clock, SystemClock};
use crate::crypto::{self, CryptoError};
use crate::ledger::{AppendError, Ledger};
use crate::model::{Block, PayloadError, Record};

/// Trailing tag of every challenge message.
pub const CHALLENGE_TAG: &str = "starRegistry";

/// How long a challenge stays valid, inclusive.
pub const VALIDATION_WINDOW_SECS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("challenge issued {elapsed}s ago, window is {}s", VALIDATION_WINDOW_SECS)]
    Expired { elapsed: i64 },

    #[error("bad signature: {0}")]
    BadSignature(#[from] CryptoError),

    #[error("malformed challenge: {0}")]
    MalformedChallenge(&'static str),

    #[error("ledger rejected the block: {0}")]
    LedgerRejected(#[from] AppendError),
}

pub struct OwnershipProof {
    clock: Arc<dyn Clock>,
}

impl OwnershipProof {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn issue_challenge(&self, address: &str) -> String {
        format!("{address}:{}:{CHALLENGE_TAG}", self.clock.now_unix())
    }

    /// Check the challenge is fresh and signed by `address`, then append
    /// `{owner: address, star}` to the ledger.
    pub fn verify_and_submit(
        &self,
        ledger: &mut Ledger,
        address: &str,
        message: &str,
        signature: &str,
        star: Value,
    ) -> Result<Block, SubmissionError> {
        let issued_at = parse_challenge(address, message)?;

        let elapsed = self
            .clock
            .now_unix()
            .checked_sub(issued_at)
            .ok_or(SubmissionError::MalformedChallenge("timestamp out of range"))?;
        if elapsed < 0 {
            return Err(SubmissionError::MalformedChallenge(
                "challenge timestamp is in the future",
            ));
        }
        if elapsed > VALIDATION_WINDOW_SECS {
            return Err(SubmissionError::Expired { elapsed });
        }

        crypto::verify_message(address, message, signature)?;

        let block = Block::new(&Record::star_claim(address, star));
        Ok(ledger.append(block)?)
    }

    /// Decoded `{owner, star}` records claimed by `address`, oldest first.
    pub fn stars_by_owner(
        &self,
        ledger: &Ledger,
        address: &str,
    ) -> Result<Vec<Record>, PayloadError> {
        let mut stars = Vec::new();
        for block in ledger.blocks().iter().skip(1) {
            let record = block.decode_payload()?;
            if record.owner() == Some(address) {
                stars.push(record);
            }
        }
        Ok(stars)
    }
}

impl Default for OwnershipProof {
    fn default() -> Self {
        Self::new()
    }
}

/// Issue time embedded in `message`, after checking it belongs to `address`.
fn parse_challenge(address: &str, message: &str) -> Result<i64, SubmissionError> {
    let mut parts = message.split(':');
    let (Some(owner), Some(issued_at), Some(tag), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(SubmissionError::MalformedChallenge(
            "expected <address>:<timestamp>:starRegistry",
        ));
    };
    if owner != address {
        return Err(SubmissionError::MalformedChallenge(
            "challenge was issued for another address",
        ));
    }
    if tag != CHALLENGE_TAG {
        return Err(SubmissionError::MalformedChallenge("unknown challenge tag"));
    }
    let issued_at: i64 = issued_at
        .parse()
        .map_err(|_| SubmissionError::MalformedChallenge("timestamp is not an integer"))?;
    if issued_at < 0 {
        return Err(SubmissionError::MalformedChallenge("timestamp is negative"));
    }
    Ok(issued_at)
}
