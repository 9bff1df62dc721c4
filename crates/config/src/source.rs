//! Sparse configuration views and the on-disk config file schema.
//!
//! Responsibilities:
//! - Define `PartialConfig`, the sparse per-tier view of a resolved config.
//! - Define the JSON config file schema (one section per mode) and its
//!   conversion into a `PartialConfig`.
//!
//! Does NOT handle:
//! - Reading files or environment variables (see `loader`).
//! - Merging tiers (see `loader::merge`).
//!
//! Invariants:
//! - Absence is the merge signal: a field that is `None` never participates
//!   in resolution, while `Some` always does — even `Some(vec![])`.
//! - A `command` given as a single string is decomposed into argv tokens at
//!   conversion time, so every tier hands the merge engine a token list.

use std::collections::BTreeSet;

use secrecy::SecretString;
use serde::Deserialize;

use crate::argv::tokenize;
use crate::types::Mode;

/// One tier's contribution to a resolved configuration.
///
/// Every field is optional; tiers set only what their backing store
/// actually contains. Constructed fresh per invocation and never mutated
/// after construction.
#[derive(Debug, Clone, Default)]
pub struct PartialConfig {
    pub private_key: Option<SecretString>,
    pub relays: Option<Vec<String>>,
    /// Serve: remote URL target.
    pub url: Option<String>,
    /// Serve: local command target, already tokenized.
    pub command: Option<Vec<String>>,
    /// Serve: visibility flag.
    pub public: Option<bool>,
    /// Serve: access allowlist of public keys.
    pub allow: Option<BTreeSet<String>>,
    /// Raw policy name; parsed during the merge so that an unrecognized
    /// value can be reported against the tier that supplied it.
    pub encryption: Option<String>,
    pub verbose: Option<bool>,
    /// Use: server identifier.
    pub server: Option<String>,
}

/// On-disk shape of a config file: one sparse section per mode.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    serve: Option<ModeSection>,
    #[serde(rename = "use")]
    use_: Option<ModeSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ModeSection {
    /// Supported for backward compatibility; prefer the environment
    /// variables for key material.
    private_key: Option<SecretString>,
    relays: Option<Vec<String>>,
    url: Option<String>,
    command: Option<CommandField>,
    public: Option<bool>,
    allow: Option<BTreeSet<String>>,
    encryption: Option<String>,
    verbose: Option<bool>,
    server: Option<String>,
}

/// A command target is written either as one shell-style string or as an
/// explicit argv array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CommandField {
    Line(String),
    Argv(Vec<String>),
}

impl CommandField {
    fn into_argv(self) -> Option<Vec<String>> {
        let tokens = match self {
            CommandField::Line(line) => tokenize(&line),
            CommandField::Argv(argv) => argv,
        };
        if tokens.is_empty() { None } else { Some(tokens) }
    }
}

/// Parses the JSON text of a config file, keeping only `mode`'s section.
///
/// A file without a section for `mode` contributes an empty partial.
pub(crate) fn parse_config_file(
    text: &str,
    mode: Mode,
) -> Result<PartialConfig, serde_json::Error> {
    let file: ConfigFile = serde_json::from_str(text)?;
    let section = match mode {
        Mode::Serve => file.serve,
        Mode::Use => file.use_,
    };
    let section = section.unwrap_or_default();

    Ok(PartialConfig {
        private_key: section.private_key,
        relays: section.relays,
        url: section.url,
        command: section.command.and_then(CommandField::into_argv),
        public: section.public,
        allow: section.allow,
        encryption: section.encryption,
        verbose: section.verbose,
        server: section.server,
    })
}
