//! Defaults table for fields no tier sets.

use rand::Rng;
use secrecy::SecretString;

use crate::constants::DEFAULT_RELAYS;

/// Built-in relay list.
pub(super) fn default_relays() -> Vec<String> {
    DEFAULT_RELAYS.iter().map(|r| r.to_string()).collect()
}

/// Generates a fresh hex-encoded 32-byte private key.
///
/// Used when no tier configures a key, so that a resolved config is always
/// total. The caller surfaces an `EphemeralKey` warning because the
/// identity will not survive a restart.
pub(super) fn generate_private_key() -> SecretString {
    let mut seed = [0u8; 32];
    rand::rng().fill_bytes(&mut seed);
    SecretString::from(hex::encode(seed))
}
