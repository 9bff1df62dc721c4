//! Skill manifest schema.

use serde::{Deserialize, Serialize};

/// What a registry publishes about one skill version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillManifest {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Bundle files, as paths relative to the skill's install directory.
    pub files: Vec<String>,
    /// Opaque integrity string computed by the registry over the bundle.
    pub integrity: String,
}
