//! Config file tiers.
//!
//! Responsibilities:
//! - Locate the project-local and global per-user config files.
//! - Load one file tier into a `PartialConfig`.
//!
//! Does NOT handle:
//! - Writing config files; tether never persists configuration.
//!
//! Invariants:
//! - A missing or unreadable file contributes an empty partial, never an
//!   error. A file that exists but fails to parse additionally surfaces a
//!   `MalformedFile` warning so the user can find the typo.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::error::ResolveWarning;
use crate::constants::{GLOBAL_CONFIG_FILE, PROJECT_CONFIG_FILE};
use crate::source::{PartialConfig, parse_config_file};
use crate::types::Mode;

/// Path of the project-local config file under `dir`.
pub fn project_config_path(dir: &Path) -> PathBuf {
    dir.join(PROJECT_CONFIG_FILE)
}

/// Path of the global per-user config file:
/// `~/.config/tether/config.json` on Linux, the platform equivalent
/// elsewhere. `None` when no home directory can be determined.
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "tether")
        .map(|dirs| dirs.config_dir().join(GLOBAL_CONFIG_FILE))
}

/// Loads one file tier, tolerating absence.
pub(super) fn file_partial(
    path: &Path,
    mode: Mode,
    warnings: &mut Vec<ResolveWarning>,
) -> PartialConfig {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            if e.kind() != ErrorKind::NotFound {
                tracing::debug!(path = %path.display(), error = %e, "config file unreadable");
            }
            return PartialConfig::default();
        }
    };

    match parse_config_file(&text, mode) {
        Ok(partial) => partial,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "config file malformed");
            warnings.push(ResolveWarning::MalformedFile {
                path: path.to_path_buf(),
            });
            PartialConfig::default()
        }
    }
}
