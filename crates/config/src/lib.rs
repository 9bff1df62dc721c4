//! Configuration management for tether.
//!
//! This crate provides types and loaders for building a fully-resolved
//! serve or use configuration out of five layered sources: command-line
//! overrides, an explicit config file, the project-local config file, the
//! global per-user config file, and environment variables.

pub mod argv;
pub mod constants;
mod loader;
mod source;
pub mod types;

pub use loader::{
    EnvSnapshot, Resolved, ResolveError, ResolveWarning, SourceStack, Tier, global_config_path,
    project_config_path, split_relays,
};
pub use source::PartialConfig;
pub use types::{EncryptionPolicy, Mode, ServeConfig, Target, UseConfig};
