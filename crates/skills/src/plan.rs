//! Update planning.
//!
//! Pure comparison of registry manifests against the lockfile. No I/O, so
//! the CLI can print a plan without touching the network twice.

use crate::lock::Lockfile;
use crate::manifest::SkillManifest;

/// What would happen to one skill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Not in the lockfile yet.
    Install,
    /// Locked at a different version.
    Update { from: String },
    /// Locked at the manifest's version with matching integrity.
    UpToDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub name: String,
    pub version: String,
    pub action: Action,
}

/// Compares `manifests` against `lock`, returning one entry per manifest
/// sorted by skill name.
pub fn plan(manifests: &[SkillManifest], lock: &Lockfile) -> Vec<PlanEntry> {
    let mut entries: Vec<PlanEntry> = manifests
        .iter()
        .map(|manifest| {
            let action = match lock.skills.get(&manifest.name) {
                None => Action::Install,
                Some(locked)
                    if locked.version == manifest.version
                        && locked.integrity == manifest.integrity =>
                {
                    Action::UpToDate
                }
                Some(locked) => Action::Update {
                    from: locked.version.clone(),
                },
            };
            PlanEntry {
                name: manifest.name.clone(),
                version: manifest.version.clone(),
                action,
            }
        })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}
