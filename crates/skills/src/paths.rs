//! Install-path resolution.
//!
//! Skills live in the per-user data directory and the lockfile next to the
//! tether config, so `tether skills` state survives project directories
//! coming and going.

use std::path::PathBuf;

use crate::error::{Result, SkillError};

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "tether").ok_or(SkillError::DirUnavailable)
}

/// Directory skills are installed under; one subdirectory per skill.
pub fn install_root() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().join("skills"))
}

/// Location of the lockfile.
pub fn lock_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("skills.lock.json"))
}
