//! Skill installation.
//!
//! Responsibilities:
//! - Fetch a skill's bundle files and write them under the install root.
//! - Record the result in the lockfile entry the caller persists.
//!
//! Invariants:
//! - Bundle file paths must stay inside the skill's directory; absolute
//!   paths and `..` components are rejected before anything is written.

use std::path::{Component, Path, PathBuf};

use crate::error::{Result, SkillError};
use crate::lock::LockedSkill;
use crate::manifest::SkillManifest;
use crate::source::SkillSource;

/// Installs `manifest` from `source` under `root`, returning the lockfile
/// entry to record. Existing files of the same skill are overwritten, so
/// installing over an older version updates it in place.
pub async fn install<S: SkillSource>(
    source: &S,
    manifest: &SkillManifest,
    root: &Path,
) -> Result<LockedSkill> {
    let skill_dir = root.join(&manifest.name);
    std::fs::create_dir_all(&skill_dir)?;

    for file in &manifest.files {
        let relative = safe_relative_path(file)?;
        let contents = source.file(manifest, file).await?;
        let destination = skill_dir.join(relative);
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&destination, contents)?;
        tracing::debug!(skill = %manifest.name, file, "wrote skill file");
    }

    Ok(LockedSkill {
        version: manifest.version.clone(),
        integrity: manifest.integrity.clone(),
        source: source.id().to_string(),
    })
}

/// Validates a bundle-relative path: no absolute paths, no parent-dir
/// traversal.
fn safe_relative_path(raw: &str) -> Result<PathBuf> {
    let path = Path::new(raw);
    let safe = path.components().all(|c| matches!(c, Component::Normal(_)));
    if !safe || raw.is_empty() {
        return Err(SkillError::UnsafePath {
            path: raw.to_string(),
        });
    }
    Ok(path.to_path_buf())
}
