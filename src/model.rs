//! Data model: records carried by the chain and the blocks that wrap them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Payload of the first block in every ledger.
pub const GENESIS_DATA: &str = "Genesis Block";

#[derive(Debug, Error)]
pub enum PayloadError {
    /// The genesis payload is a sentinel and is not decoded as domain data.
    #[error("genesis block payload is not domain data")]
    GenesisAccess,

    #[error("payload is not valid hex: {0}")]
    Encoding(#[from] hex::FromHexError),

    #[error("payload is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),
}

/// Structured payload stored in a block. Keys are kept sorted so the
/// encoded form of a record is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn genesis() -> Self {
        Self::new().with("data", GENESIS_DATA)
    }

    /// Payload of a registry block: the claimed star and who claimed it.
    pub fn star_claim(owner: &str, star: Value) -> Self {
        Self::new().with("owner", owner).with("star", star)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn owner(&self) -> Option<&str> {
        self.get("owner").and_then(Value::as_str)
    }

    pub fn star(&self) -> Option<&Value> {
        self.get("star")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hex of the compact JSON form.
    pub fn encode(&self) -> String {
        // A map of strings to JSON values always serializes.
        hex::encode(serde_json::to_vec(&self.0).unwrap_or_default())
    }

    pub fn decode(encoded: &str) -> Result<Self, PayloadError> {
        let raw = hex::decode(encoded)?;
        Ok(Self(serde_json::from_slice(&raw)?))
    }
}

impl From<BTreeMap<String, Value>> for Record {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// SHA-256 hex over every other field. Empty until the ledger seals it.
    pub fingerprint: String,
    /// Zero-based position in the ledger.
    pub height: u64,
    /// Encoded [`Record`].
    pub payload: String,
    /// Unix seconds at append time.
    pub timestamp: i64,
    /// Fingerprint of the block at `height - 1`; `None` for genesis.
    pub previous_fingerprint: Option<String>,
}

impl Block {
    /// Unsealed block carrying `record`. Chain metadata is assigned on append.
    pub fn new(record: &Record) -> Self {
        Self {
            fingerprint: String::new(),
            height: 0,
            payload: record.encode(),
            timestamp: 0,
            previous_fingerprint: None,
        }
    }

    pub fn genesis() -> Self {
        Self::new(&Record::genesis())
    }

    /// Fixed-order byte layout hashed into the fingerprint.
    fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + 8 + 1 + 8 + 64 + self.payload.len());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.timestamp.to_le_bytes());
        match &self.previous_fingerprint {
            Some(prev) => {
                out.push(1);
                out.extend_from_slice(&(prev.len() as u64).to_le_bytes());
                out.extend_from_slice(prev.as_bytes());
            }
            None => out.push(0),
        }
        out.extend_from_slice(self.payload.as_bytes());
        out
    }

    /// Digest over the block with its own fingerprint left out.
    pub fn compute_fingerprint(&self) -> String {
        sha256_hex(&self.canonical_bytes())
    }

    pub(crate) fn seal(&mut self) {
        self.fingerprint = self.compute_fingerprint();
    }

    /// Whether the stored fingerprint still matches the block's contents.
    pub fn self_verify(&self) -> bool {
        self.fingerprint == self.compute_fingerprint()
    }

    pub fn decode_payload(&self) -> Result<Record, PayloadError> {
        if self.previous_fingerprint.is_none() {
            return Err(PayloadError::GenesisAccess);
        }
        Record::decode(&self.payload)
    }
}

/// SHA-256 of `bytes` as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
