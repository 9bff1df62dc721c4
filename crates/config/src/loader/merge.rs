//! The configuration merge engine.
//!
//! Responsibilities:
//! - Hold the ordered tier stack for one invocation.
//! - Fold the tiers into a `ServeConfig` or `UseConfig`: per field, the
//!   highest tier that explicitly sets it wins, then defaults fill the rest.
//! - Resolve the target descriptor, keeping url/command mutually exclusive.
//!
//! Does NOT handle:
//! - Constructing tiers (see `env.rs`, `file.rs`, and the CLI crate).
//!
//! Invariants:
//! - Presence, not truthiness, is the merge signal: `Some(vec![])` at a
//!   high tier hides a populated list at a lower one.
//! - Resolution is synchronous and reads nothing beyond the tiers it was
//!   given, so identical stacks resolve identically.

use std::path::Path;

use super::defaults::{default_relays, generate_private_key};
use super::env::{EnvSnapshot, env_partial};
use super::error::{ResolveError, ResolveWarning};
use super::file::{file_partial, global_config_path, project_config_path};
use super::Tier;
use crate::source::PartialConfig;
use crate::types::{EncryptionPolicy, Mode, ServeConfig, Target, UseConfig};

/// A resolved config plus the non-fatal findings made along the way.
#[derive(Debug)]
pub struct Resolved<C> {
    pub config: C,
    pub warnings: Vec<ResolveWarning>,
}

/// The ordered configuration tiers for one invocation, highest first.
#[derive(Debug)]
pub struct SourceStack {
    mode: Mode,
    tiers: Vec<(Tier, PartialConfig)>,
    warnings: Vec<ResolveWarning>,
}

impl SourceStack {
    /// Gathers all five tiers: `flags`, then the custom file (when named),
    /// the project-local file under `project_dir`, the global per-user
    /// file, and finally a view of `env`.
    pub fn gather(
        mode: Mode,
        flags: PartialConfig,
        custom_file: Option<&Path>,
        project_dir: &Path,
        env: &EnvSnapshot,
    ) -> Self {
        let mut warnings = Vec::new();
        let mut tiers = vec![(Tier::Flags, flags)];

        if let Some(path) = custom_file {
            tiers.push((Tier::CustomFile, file_partial(path, mode, &mut warnings)));
        }
        tiers.push((
            Tier::ProjectFile,
            file_partial(&project_config_path(project_dir), mode, &mut warnings),
        ));
        if let Some(path) = global_config_path() {
            tiers.push((Tier::GlobalFile, file_partial(&path, mode, &mut warnings)));
        }
        tiers.push((Tier::Environment, env_partial(mode, env, &mut warnings)));

        Self {
            mode,
            tiers,
            warnings,
        }
    }

    /// Builds a stack from explicit tiers, highest priority first.
    /// Intended for tests and embedding.
    pub fn from_tiers(mode: Mode, tiers: Vec<(Tier, PartialConfig)>) -> Self {
        Self {
            mode,
            tiers,
            warnings: Vec::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// First explicitly-present value for a field, scanning highest tier
    /// first. Absence at a tier skips that tier only.
    fn first<T>(&self, pick: impl Fn(&PartialConfig) -> Option<T>) -> Option<T> {
        self.tiers.iter().find_map(|(_, partial)| pick(partial))
    }

    /// Resolves the stack into a serve configuration.
    pub fn resolve_serve(mut self) -> Result<Resolved<ServeConfig>, ResolveError> {
        let target = resolve_target(&self.tiers, &mut self.warnings)?
            .ok_or(ResolveError::MissingTarget)?;
        let encryption = resolve_encryption(&self.tiers, &mut self.warnings);
        let private_key = match self.first(|p| p.private_key.clone()) {
            Some(key) => key,
            None => {
                self.warnings.push(ResolveWarning::EphemeralKey);
                generate_private_key()
            }
        };

        let config = ServeConfig {
            private_key,
            relays: self
                .first(|p| p.relays.clone())
                .unwrap_or_else(default_relays),
            target,
            public: self.first(|p| p.public).unwrap_or(false),
            allow: self.first(|p| p.allow.clone()).unwrap_or_default(),
            encryption,
            verbose: self.first(|p| p.verbose).unwrap_or(false),
        };

        Ok(Resolved {
            config,
            warnings: self.warnings,
        })
    }

    /// Resolves the stack into a use configuration.
    pub fn resolve_use(mut self) -> Result<Resolved<UseConfig>, ResolveError> {
        let server = self
            .first(|p| p.server.clone())
            .ok_or(ResolveError::MissingServer)?;
        let encryption = resolve_encryption(&self.tiers, &mut self.warnings);
        let private_key = match self.first(|p| p.private_key.clone()) {
            Some(key) => key,
            None => {
                self.warnings.push(ResolveWarning::EphemeralKey);
                generate_private_key()
            }
        };

        let config = UseConfig {
            private_key,
            relays: self
                .first(|p| p.relays.clone())
                .unwrap_or_else(default_relays),
            server,
            encryption,
            verbose: self.first(|p| p.verbose).unwrap_or(false),
        };

        Ok(Resolved {
            config,
            warnings: self.warnings,
        })
    }
}

/// Picks the target from the highest tier that sets one.
///
/// Within a tier an explicit `url` beats a `command` (with a warning when
/// both appear). A one-token command that parses as an http(s) URL is a
/// remote target, not an executable named like one.
fn resolve_target(
    tiers: &[(Tier, PartialConfig)],
    warnings: &mut Vec<ResolveWarning>,
) -> Result<Option<Target>, ResolveError> {
    for (tier, partial) in tiers {
        let command = partial
            .command
            .as_ref()
            .filter(|argv| !argv.is_empty());
        if partial.url.is_none() && command.is_none() {
            continue;
        }

        if partial.url.is_some() && command.is_some() {
            warnings.push(ResolveWarning::ConflictingTarget { tier: *tier });
        }

        if let Some(raw) = &partial.url {
            return parse_target_url(raw).map(Some);
        }

        let argv = command.cloned().unwrap_or_default();
        if argv.len() == 1
            && let Some(url) = http_url(&argv[0])
        {
            return Ok(Some(Target::Url(url)));
        }

        let mut tokens = argv.into_iter();
        let program = tokens.next().unwrap_or_default();
        return Ok(Some(Target::Command {
            program,
            args: tokens.collect(),
        }));
    }
    Ok(None)
}

/// Picks and parses the encryption policy.
///
/// An unrecognized value is a warning, not an error, and resolves to the
/// default rather than falling through to a lower tier.
fn resolve_encryption(
    tiers: &[(Tier, PartialConfig)],
    warnings: &mut Vec<ResolveWarning>,
) -> EncryptionPolicy {
    let Some((tier, raw)) = tiers
        .iter()
        .find_map(|(t, p)| p.encryption.clone().map(|v| (*t, v)))
    else {
        return EncryptionPolicy::default();
    };

    match raw.parse() {
        Ok(policy) => policy,
        Err(()) => {
            let fallback = EncryptionPolicy::default();
            warnings.push(ResolveWarning::UnknownEncryptionPolicy {
                value: raw,
                tier,
                fallback,
            });
            fallback
        }
    }
}

/// Validates an explicitly-configured target URL.
fn parse_target_url(raw: &str) -> Result<Target, ResolveError> {
    let url = url::Url::parse(raw.trim()).map_err(|e| ResolveError::InvalidTargetUrl {
        value: raw.to_string(),
        message: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ResolveError::InvalidTargetUrl {
            value: raw.to_string(),
            message: "scheme must be http or https".to_string(),
        });
    }
    Ok(Target::Url(url))
}

/// Parses `s` as a URL and keeps it only when the scheme is http(s).
/// Plain program names fail the parse and fall through to command spawning.
fn http_url(s: &str) -> Option<url::Url> {
    url::Url::parse(s)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::{ExposeSecret, SecretString};
    use std::collections::BTreeSet;

    fn with_command(argv: &[&str]) -> PartialConfig {
        PartialConfig {
            command: Some(argv.iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        }
    }

    fn stack(tiers: Vec<(Tier, PartialConfig)>) -> SourceStack {
        SourceStack::from_tiers(Mode::Serve, tiers)
    }

    #[test]
    fn test_higher_tier_wins_per_field() {
        let flags = PartialConfig {
            relays: Some(vec!["wss://from-flags".into()]),
            ..with_command(&["cat"])
        };
        let env = PartialConfig {
            relays: Some(vec!["wss://from-env".into()]),
            public: Some(true),
            ..Default::default()
        };

        let resolved = stack(vec![(Tier::Flags, flags), (Tier::Environment, env)])
            .resolve_serve()
            .unwrap();

        assert_eq!(resolved.config.relays, vec!["wss://from-flags"]);
        // Flags tier omits `public`, so the environment's value survives.
        assert!(resolved.config.public);
    }

    #[test]
    fn test_omission_skips_a_tier_without_hiding_lower_ones() {
        let project = PartialConfig {
            verbose: Some(true),
            ..Default::default()
        };
        let global = PartialConfig {
            relays: Some(vec!["wss://global".into()]),
            ..Default::default()
        };

        let resolved = stack(vec![
            (Tier::Flags, with_command(&["cat"])),
            (Tier::ProjectFile, project),
            (Tier::GlobalFile, global),
        ])
        .resolve_serve()
        .unwrap();

        assert!(resolved.config.verbose);
        assert_eq!(resolved.config.relays, vec!["wss://global"]);
    }

    #[test]
    fn test_present_empty_list_beats_populated_lower_tier() {
        let flags = PartialConfig {
            relays: Some(vec![]),
            ..with_command(&["cat"])
        };
        let global = PartialConfig {
            relays: Some(vec!["wss://global".into()]),
            ..Default::default()
        };

        let resolved = stack(vec![(Tier::Flags, flags), (Tier::GlobalFile, global)])
            .resolve_serve()
            .unwrap();

        assert!(resolved.config.relays.is_empty());
    }

    #[test]
    fn test_defaults_fill_unset_fields() {
        let resolved = stack(vec![(Tier::Flags, with_command(&["cat"]))])
            .resolve_serve()
            .unwrap();

        assert_eq!(resolved.config.relays, super::default_relays());
        assert_eq!(resolved.config.encryption, EncryptionPolicy::Optional);
        assert!(!resolved.config.public);
        assert!(!resolved.config.verbose);
        assert!(resolved.config.allow.is_empty());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let tiers = || {
            vec![
                (
                    Tier::Flags,
                    PartialConfig {
                        private_key: Some(SecretString::from("aa".repeat(32))),
                        encryption: Some("required".into()),
                        ..with_command(&["npx", "-y", "pkg"])
                    },
                ),
                (
                    Tier::Environment,
                    PartialConfig {
                        relays: Some(vec!["wss://env".into()]),
                        ..Default::default()
                    },
                ),
            ]
        };

        let a = stack(tiers()).resolve_serve().unwrap().config;
        let b = stack(tiers()).resolve_serve().unwrap().config;

        assert_eq!(
            a.private_key.expose_secret(),
            b.private_key.expose_secret()
        );
        assert_eq!(a.relays, b.relays);
        assert_eq!(a.target, b.target);
        assert_eq!(a.encryption, b.encryption);
        assert_eq!((a.public, a.verbose), (b.public, b.verbose));
    }

    #[test]
    fn test_missing_target_is_an_error() {
        let result = stack(vec![(Tier::Flags, PartialConfig::default())]).resolve_serve();
        assert!(matches!(result, Err(ResolveError::MissingTarget)));
    }

    #[test]
    fn test_missing_key_generates_ephemeral_key_with_warning() {
        let resolved = stack(vec![(Tier::Flags, with_command(&["cat"]))])
            .resolve_serve()
            .unwrap();

        assert_eq!(resolved.config.private_key.expose_secret().len(), 64);
        assert!(resolved.warnings.contains(&ResolveWarning::EphemeralKey));
    }

    #[test]
    fn test_invalid_encryption_warns_and_defaults_without_falling_through() {
        let project = PartialConfig {
            encryption: Some("scrambled".into()),
            ..Default::default()
        };
        let env = PartialConfig {
            encryption: Some("required".into()),
            ..Default::default()
        };

        let resolved = stack(vec![
            (Tier::Flags, with_command(&["cat"])),
            (Tier::ProjectFile, project),
            (Tier::Environment, env),
        ])
        .resolve_serve()
        .unwrap();

        // The malformed project value masks the environment; the default
        // applies instead of "required".
        assert_eq!(resolved.config.encryption, EncryptionPolicy::Optional);
        assert!(resolved.warnings.contains(
            &ResolveWarning::UnknownEncryptionPolicy {
                value: "scrambled".into(),
                tier: Tier::ProjectFile,
                fallback: EncryptionPolicy::Optional,
            }
        ));
    }

    #[test]
    fn test_url_and_command_in_one_tier_warns_and_url_wins() {
        let flags = PartialConfig {
            url: Some("https://api.example.com/mcp".into()),
            ..with_command(&["cat"])
        };

        let resolved = stack(vec![(Tier::Flags, flags)]).resolve_serve().unwrap();

        assert!(matches!(resolved.config.target, Target::Url(_)));
        assert!(resolved
            .warnings
            .contains(&ResolveWarning::ConflictingTarget { tier: Tier::Flags }));
    }

    #[test]
    fn test_single_http_token_is_a_url_target() {
        let resolved = stack(vec![(Tier::Flags, with_command(&["https://example.com/svc"]))])
            .resolve_serve()
            .unwrap();

        match resolved.config.target {
            Target::Url(url) => assert_eq!(url.as_str(), "https://example.com/svc"),
            other => panic!("expected url target, got {other:?}"),
        }
    }

    #[test]
    fn test_url_followed_by_arguments_stays_a_command() {
        let resolved = stack(vec![(
            Tier::Flags,
            with_command(&["https://example.com/svc", "--flag"]),
        )])
        .resolve_serve()
        .unwrap();

        assert!(matches!(resolved.config.target, Target::Command { .. }));
    }

    #[test]
    fn test_host_port_token_is_a_command_not_a_url() {
        // "localhost:8080" parses as a URL with scheme "localhost"; the
        // scheme check keeps it a command.
        let resolved = stack(vec![(Tier::Flags, with_command(&["localhost:8080"]))])
            .resolve_serve()
            .unwrap();

        assert!(matches!(resolved.config.target, Target::Command { .. }));
    }

    #[test]
    fn test_invalid_explicit_url_is_an_error() {
        let flags = PartialConfig {
            url: Some("ftp://example.com".into()),
            ..Default::default()
        };
        let result = stack(vec![(Tier::Flags, flags)]).resolve_serve();
        assert!(matches!(
            result,
            Err(ResolveError::InvalidTargetUrl { .. })
        ));
    }

    #[test]
    fn test_command_argv_splits_program_and_args() {
        let resolved = stack(vec![(Tier::Flags, with_command(&["npx", "-y", "pkg"]))])
            .resolve_serve()
            .unwrap();

        assert_eq!(
            resolved.config.target,
            Target::Command {
                program: "npx".into(),
                args: vec!["-y".into(), "pkg".into()],
            }
        );
    }

    #[test]
    fn test_allowlist_merges_whole_value() {
        let mut high = BTreeSet::new();
        high.insert("key-a".to_string());
        let mut low = BTreeSet::new();
        low.insert("key-b".to_string());
        low.insert("key-c".to_string());

        let custom = PartialConfig {
            allow: Some(high.clone()),
            ..Default::default()
        };
        let global = PartialConfig {
            allow: Some(low),
            ..Default::default()
        };

        let resolved = stack(vec![
            (Tier::Flags, with_command(&["cat"])),
            (Tier::CustomFile, custom),
            (Tier::GlobalFile, global),
        ])
        .resolve_serve()
        .unwrap();

        assert_eq!(resolved.config.allow, high);
    }

    #[test]
    fn test_use_mode_requires_a_server() {
        let result = SourceStack::from_tiers(Mode::Use, vec![(Tier::Flags, PartialConfig::default())])
            .resolve_use();
        assert!(matches!(result, Err(ResolveError::MissingServer)));
    }

    #[test]
    fn test_use_mode_server_from_highest_tier() {
        let flags = PartialConfig {
            server: Some("from-flags".into()),
            ..Default::default()
        };
        let global = PartialConfig {
            server: Some("from-global".into()),
            ..Default::default()
        };

        let resolved = SourceStack::from_tiers(
            Mode::Use,
            vec![(Tier::Flags, flags), (Tier::GlobalFile, global)],
        )
        .resolve_use()
        .unwrap();

        assert_eq!(resolved.config.server, "from-flags");
    }
}
