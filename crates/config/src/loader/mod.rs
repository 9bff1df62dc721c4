//! Configuration loading and merging.
//!
//! Responsibilities:
//! - Gather the five configuration tiers for an invocation, highest
//!   priority first: CLI flags, explicit config file, project-local file,
//!   global per-user file, environment variables.
//! - Fold the tiers into one resolved config per mode (see `merge`).
//!
//! Does NOT handle:
//! - Flag parsing (the CLI crate builds the flags tier).
//! - Anything after resolution; the resolved config is handed off as-is.
//!
//! Invariants / Assumptions:
//! - Per field, the highest tier that explicitly sets it wins; absence at a
//!   tier skips that tier and nothing else.
//! - A missing or unreadable config file contributes an empty partial,
//!   never an error — every file tier is optional.
//! - Resolution never aborts for a malformed secondary setting; it warns
//!   and falls back to the default.

mod defaults;
mod env;
mod error;
mod file;
mod merge;

pub use env::{EnvSnapshot, split_relays};
pub use error::{ResolveError, ResolveWarning};
pub use file::{global_config_path, project_config_path};
pub use merge::{Resolved, SourceStack};

use std::fmt;

/// One of the five ranked configuration sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Command-line flag overrides.
    Flags,
    /// File named explicitly with `--config`.
    CustomFile,
    /// `tether.json` in the working directory.
    ProjectFile,
    /// Per-user config file at the platform config location.
    GlobalFile,
    /// Environment variables.
    Environment,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::Flags => "command line",
            Tier::CustomFile => "custom config file",
            Tier::ProjectFile => "project config file",
            Tier::GlobalFile => "global config file",
            Tier::Environment => "environment",
        })
    }
}
