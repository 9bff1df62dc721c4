//! Error types for skill management.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SkillError>;

/// Errors that can occur while fetching, planning, or installing skills.
#[derive(Error, Debug)]
pub enum SkillError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("registry returned {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("invalid skill source URL {value:?}")]
    InvalidSource { value: String },

    #[error("malformed manifest for {name}: {message}")]
    MalformedManifest { name: String, message: String },

    #[error("lockfile at {path} is corrupt: {message}")]
    LockCorrupt { path: PathBuf, message: String },

    #[error("unable to determine a per-user directory for skills")]
    DirUnavailable,

    #[error("skill file path {path:?} escapes the install directory")]
    UnsafePath { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
