//! Skill package management for tether.
//!
//! Skills are small file bundles published by a registry. This crate holds
//! the client-side surface: manifest and lockfile types, install-path
//! resolution, deterministic update planning, and a fetch trait with an
//! HTTP implementation. Registry internals (indexing, publishing) are not
//! tether's concern.

mod error;
mod install;
mod lock;
mod manifest;
mod paths;
mod plan;
mod source;

pub use error::{Result, SkillError};
pub use install::install;
pub use lock::{Lockfile, LockedSkill};
pub use manifest::SkillManifest;
pub use paths::{install_root, lock_path};
pub use plan::{Action, PlanEntry, plan};
pub use source::{HttpSource, SkillSource, DEFAULT_SOURCE};
