//! Wallet addresses and message signatures (Ed25519).
//!
//! An address is the lowercase hex of a 32-byte verifying key, so whoever
//! holds the matching signing key controls the address. Signatures are the
//! lowercase hex of a 64-byte Ed25519 signature over the UTF-8 message.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("address is not a hex encoded ed25519 public key")]
    InvalidAddress,

    #[error("signature is not a hex encoded ed25519 signature")]
    InvalidSignature,

    #[error("signature does not match address and message")]
    VerificationFailed,
}

/// Keypair bundle held by a wallet.
pub struct Keypair {
    pub signing: SigningKey,
    pub verifying: VerifyingKey,
}

impl Keypair {
    pub fn address(&self) -> String {
        address_of(&self.verifying)
    }

    pub fn sign(&self, message: &str) -> String {
        sign_message(&self.signing, message)
    }
}

/// Generate a fresh Ed25519 keypair using the OS RNG.
pub fn generate_keypair() -> Keypair {
    let signing = SigningKey::generate(&mut OsRng);
    let verifying = signing.verifying_key();
    Keypair { signing, verifying }
}

pub fn address_of(verifying: &VerifyingKey) -> String {
    hex::encode(verifying.to_bytes())
}

/// Sign `message` and return the signature as hex.
pub fn sign_message(signing: &SigningKey, message: &str) -> String {
    hex::encode(signing.sign(message.as_bytes()).to_bytes())
}

fn parse_address(address: &str) -> Result<VerifyingKey, CryptoError> {
    let raw: [u8; 32] = hex::decode(address)
        .ok()
        .and_then(|b| b.try_into().ok())
        .ok_or(CryptoError::InvalidAddress)?;
    VerifyingKey::from_bytes(&raw).map_err(|_| CryptoError::InvalidAddress)
}

fn parse_signature(signature: &str) -> Result<Signature, CryptoError> {
    let raw: [u8; 64] = hex::decode(signature)
        .ok()
        .and_then(|b| b.try_into().ok())
        .ok_or(CryptoError::InvalidSignature)?;
    Ok(Signature::from_bytes(&raw))
}

/// Check that `signature` over `message` was produced by the key behind `address`.
pub fn verify_message(address: &str, message: &str, signature: &str) -> Result<(), CryptoError> {
    let verifying = parse_address(address)?;
    let signature = parse_signature(signature)?;
    verifying
        .verify(message.as_bytes(), &signature)
        .map_err(|_| CryptoError::VerificationFailed)
}
