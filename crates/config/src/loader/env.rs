//! Environment variable tier.
//!
//! Responsibilities:
//! - Hold an injected snapshot of the environment so resolution never
//!   consults process globals directly.
//! - Build the environment `PartialConfig` for a mode, resolving each
//!   field through its canonical/legacy variable name pair.
//!
//! Does NOT handle:
//! - File tiers (see `file.rs`) or merging (see `merge.rs`).
//!
//! Invariants:
//! - Empty or whitespace-only variables are treated as unset.
//! - The canonical name is checked before the legacy name, per field, at
//!   lookup time.

use std::collections::HashMap;

use secrecy::SecretString;

use super::error::ResolveWarning;
use crate::constants::EnvAlias;
use crate::source::PartialConfig;
use crate::types::Mode;

/// An immutable view of the environment taken once per invocation.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Snapshot the current process environment.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// An empty snapshot; useful in tests.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Snapshot built from explicit pairs; useful in tests.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns the trimmed value of `key`, or `None` if it is unset,
    /// empty, or whitespace-only.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Resolves an aliased field: canonical name if set, else legacy.
    pub fn lookup(&self, alias: &EnvAlias) -> Option<&str> {
        self.get(alias.canonical).or_else(|| self.get(alias.legacy))
    }
}

/// Splits a comma-separated relay list, dropping blank entries.
pub fn split_relays(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Builds the environment tier for `mode`.
pub(super) fn env_partial(
    mode: Mode,
    snapshot: &EnvSnapshot,
    warnings: &mut Vec<ResolveWarning>,
) -> PartialConfig {
    let names = mode.env();
    let mut partial = PartialConfig {
        private_key: snapshot
            .lookup(&names.private_key)
            .map(|v| SecretString::from(v.to_string())),
        relays: snapshot.lookup(&names.relays).map(split_relays),
        encryption: snapshot.lookup(&names.encryption).map(str::to_string),
        ..Default::default()
    };

    if let Some(alias) = &names.public
        && let Some(raw) = snapshot.lookup(alias)
    {
        match parse_bool(raw) {
            Some(value) => partial.public = Some(value),
            None => warnings.push(ResolveWarning::InvalidBool {
                var: alias.canonical.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    if let Some(alias) = &names.url {
        partial.url = snapshot.lookup(alias).map(str::to_string);
    }

    partial
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SERVE_ENV;

    #[test]
    fn test_snapshot_filters_empty_and_whitespace_values() {
        let snapshot = EnvSnapshot::from_pairs([
            ("A", "value"),
            ("B", ""),
            ("C", "   "),
            ("D", "  padded  "),
        ]);
        assert_eq!(snapshot.get("A"), Some("value"));
        assert_eq!(snapshot.get("B"), None);
        assert_eq!(snapshot.get("C"), None);
        assert_eq!(snapshot.get("D"), Some("padded"));
        assert_eq!(snapshot.get("UNSET"), None);
    }

    #[test]
    fn test_lookup_prefers_canonical_over_legacy() {
        let snapshot = EnvSnapshot::from_pairs([
            ("TETHER_SERVE_RELAYS", "wss://new.example"),
            ("TETHER_GATEWAY_RELAYS", "wss://old.example"),
        ]);
        assert_eq!(snapshot.lookup(&SERVE_ENV.relays), Some("wss://new.example"));
    }

    #[test]
    fn test_lookup_falls_back_to_legacy_name() {
        let snapshot = EnvSnapshot::from_pairs([("TETHER_GATEWAY_RELAYS", "wss://old.example")]);
        assert_eq!(snapshot.lookup(&SERVE_ENV.relays), Some("wss://old.example"));
    }

    #[test]
    fn test_blank_canonical_falls_back_to_legacy() {
        let snapshot = EnvSnapshot::from_pairs([
            ("TETHER_SERVE_RELAYS", "  "),
            ("TETHER_GATEWAY_RELAYS", "wss://old.example"),
        ]);
        assert_eq!(snapshot.lookup(&SERVE_ENV.relays), Some("wss://old.example"));
    }

    #[test]
    fn test_split_relays_drops_blank_entries() {
        assert_eq!(
            split_relays("wss://a, wss://b ,,wss://c"),
            vec!["wss://a", "wss://b", "wss://c"]
        );
    }

    #[test]
    fn test_env_partial_reads_serve_fields() {
        let snapshot = EnvSnapshot::from_pairs([
            ("TETHER_SERVE_PRIVATE_KEY", "aa".repeat(32)),
            ("TETHER_SERVE_PUBLIC", "1".to_string()),
            ("TETHER_GATEWAY_ENCRYPTION", "Required".to_string()),
        ]);
        let mut warnings = Vec::new();
        let partial = env_partial(Mode::Serve, &snapshot, &mut warnings);

        assert!(partial.private_key.is_some());
        assert_eq!(partial.public, Some(true));
        assert_eq!(partial.encryption.as_deref(), Some("Required"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_env_partial_warns_on_bad_bool() {
        let snapshot = EnvSnapshot::from_pairs([("TETHER_SERVE_PUBLIC", "yes")]);
        let mut warnings = Vec::new();
        let partial = env_partial(Mode::Serve, &snapshot, &mut warnings);

        assert!(partial.public.is_none());
        assert_eq!(
            warnings,
            vec![ResolveWarning::InvalidBool {
                var: "TETHER_SERVE_PUBLIC".to_string(),
                value: "yes".to_string(),
            }]
        );
    }

    #[test]
    #[serial_test::serial]
    fn test_from_process_snapshots_the_real_environment() {
        temp_env::with_vars([("_TETHER_TEST_SNAPSHOT_VAR", Some("live"))], || {
            let snapshot = EnvSnapshot::from_process();
            assert_eq!(snapshot.get("_TETHER_TEST_SNAPSHOT_VAR"), Some("live"));
        });
    }

    #[test]
    fn test_use_mode_has_no_url_or_public_variables() {
        let snapshot = EnvSnapshot::from_pairs([
            ("TETHER_SERVE_URL", "https://example.com"),
            ("TETHER_SERVE_PUBLIC", "true"),
            ("TETHER_USE_RELAYS", "wss://a"),
        ]);
        let mut warnings = Vec::new();
        let partial = env_partial(Mode::Use, &snapshot, &mut warnings);

        assert!(partial.url.is_none());
        assert!(partial.public.is_none());
        assert_eq!(partial.relays, Some(vec!["wss://a".to_string()]));
    }
}
