//! Error and warning types for configuration resolution.
//!
//! Responsibilities:
//! - Define the fatal resolution errors (only the primary operation can
//!   fail: a missing or unusable target/server).
//! - Define non-fatal warnings accumulated during resolution.
//!
//! Invariants:
//! - File-read failures are never errors; they surface, at most, as
//!   warnings.
//! - No variant carries secret material.

use std::path::PathBuf;

use thiserror::Error;

use super::Tier;
use crate::types::EncryptionPolicy;

/// Fatal resolution failures.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("no target to serve: pass a command or URL, or set one in a config file")]
    MissingTarget,

    #[error("no server to attach to: pass an identifier, use --server, or set one in a config file")]
    MissingServer,

    #[error("invalid target URL {value:?}: {message}")]
    InvalidTargetUrl { value: String, message: String },
}

/// Non-fatal findings surfaced after resolution completes.
///
/// A misconfigured secondary setting must not prevent the primary
/// operation, so these are reported and resolution proceeds with the
/// field's default.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveWarning {
    #[error("unrecognized encryption policy {value:?} from {tier}; using \"{fallback}\"")]
    UnknownEncryptionPolicy {
        value: String,
        tier: Tier,
        fallback: EncryptionPolicy,
    },

    #[error("invalid boolean {value:?} for {var}; expected true, false, 1, or 0")]
    InvalidBool { var: String, value: String },

    #[error("config file {path} is malformed and was ignored")]
    MalformedFile { path: PathBuf },

    #[error("{tier} sets both a url and a command; using the url")]
    ConflictingTarget { tier: Tier },

    #[error("no private key configured; generated an ephemeral key for this session")]
    EphemeralKey,
}
