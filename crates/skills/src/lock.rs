//! Lockfile persistence.
//!
//! Responsibilities:
//! - Record which skill versions are installed, keyed by name.
//! - Load and save the lockfile as JSON.
//!
//! Invariants:
//! - A missing lockfile reads as empty; a present-but-corrupt one is an
//!   error (silently resetting it would orphan installed skills).
//! - Entries are kept in a `BTreeMap` so serialization order, and
//!   therefore diffs, stay stable.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkillError};

/// One installed skill as recorded in the lockfile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedSkill {
    pub version: String,
    pub integrity: String,
    /// Registry the skill was installed from.
    pub source: String,
}

/// The set of installed skills.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lockfile {
    #[serde(default)]
    pub skills: BTreeMap<String, LockedSkill>,
}

impl Lockfile {
    /// Reads the lockfile at `path`; a missing file is an empty lockfile.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&text).map_err(|e| SkillError::LockCorrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Writes the lockfile, creating parent directories as needed. The
    /// write goes through a sibling temp file and a rename so a crash
    /// cannot leave a half-written lockfile behind.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self).map_err(|e| SkillError::LockCorrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_lockfile_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let lock = Lockfile::load(&dir.path().join("skills.lock.json")).unwrap();
        assert!(lock.skills.is_empty());
    }

    #[test]
    fn test_corrupt_lockfile_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skills.lock.json");
        std::fs::write(&path, "{ nope").unwrap();

        assert!(matches!(
            Lockfile::load(&path),
            Err(SkillError::LockCorrupt { .. })
        ));
    }

    #[test]
    fn test_save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/skills.lock.json");

        let mut lock = Lockfile::default();
        lock.skills.insert(
            "summarize".into(),
            LockedSkill {
                version: "1.2.0".into(),
                integrity: "sha256-abc".into(),
                source: "https://skills.tethermesh.io".into(),
            },
        );
        lock.save(&path).unwrap();

        assert_eq!(Lockfile::load(&path).unwrap(), lock);
        assert!(!path.with_extension("tmp").exists());
    }
}
