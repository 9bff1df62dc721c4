//! Identity derivation from the configured private key.
//!
//! Key material is a hex-encoded 32-byte Ed25519 seed. Only the public
//! half ever leaves this module; signing and sealing of payloads is the
//! relay library's concern, not modeled here.

use ed25519_dalek::SigningKey;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{Result, RuntimeError};

/// Derives the hex-encoded public key for `private_key`.
pub fn public_key(private_key: &SecretString) -> Result<String> {
    let seed = hex::decode(private_key.expose_secret())
        .map_err(|_| RuntimeError::InvalidPrivateKey)?;
    let seed: [u8; 32] = seed
        .try_into()
        .map_err(|_| RuntimeError::InvalidPrivateKey)?;
    let signing = SigningKey::from_bytes(&seed);
    Ok(hex::encode(signing.verifying_key().to_bytes()))
}
