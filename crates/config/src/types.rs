//! Resolved configuration types for tether.
//!
//! Responsibilities:
//! - Define the fully-resolved per-mode configuration records handed to the
//!   runtime (`ServeConfig`, `UseConfig`).
//! - Define the target descriptor and encryption policy types.
//! - Provide redacted JSON rendering for `tether config show`.
//!
//! Does NOT handle:
//! - Loading or merging configuration sources (see the `loader` module).
//! - Network connections or process spawning (see the runtime crate).
//!
//! Invariants:
//! - Every field of a resolved config is present; resolution fills gaps from
//!   the defaults table before a config is constructed.
//! - A target is either a remote URL or a local command, never both.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::constants::{ModeEnv, SERVE_ENV, USE_ENV};

/// Invocation mode: expose a target (`serve`) or connect to one (`use`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Serve,
    Use,
}

impl Mode {
    /// Environment variable names for this mode.
    pub(crate) fn env(self) -> &'static ModeEnv {
        match self {
            Mode::Serve => &SERVE_ENV,
            Mode::Use => &USE_ENV,
        }
    }

    /// Key of this mode's section in a JSON config file.
    pub(crate) fn section(self) -> &'static str {
        match self {
            Mode::Serve => "serve",
            Mode::Use => "use",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section())
    }
}

/// Whether envelope payloads exchanged with peers must be sealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncryptionPolicy {
    /// Accept both sealed and plaintext payloads.
    #[default]
    Optional,
    /// Reject plaintext payloads.
    Required,
    /// Reject sealed payloads.
    Disabled,
}

impl FromStr for EncryptionPolicy {
    type Err = ();

    /// Case-insensitive parse; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "optional" => Ok(EncryptionPolicy::Optional),
            "required" => Ok(EncryptionPolicy::Required),
            "disabled" => Ok(EncryptionPolicy::Disabled),
            _ => Err(()),
        }
    }
}

impl fmt::Display for EncryptionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EncryptionPolicy::Optional => "optional",
            EncryptionPolicy::Required => "required",
            EncryptionPolicy::Disabled => "disabled",
        })
    }
}

/// What a gateway exposes: a remote HTTP endpoint or a local command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Requests are forwarded to this URL.
    Url(url::Url),
    /// Requests are bridged to this spawned process over stdio.
    Command { program: String, args: Vec<String> },
}

impl Target {
    fn as_json(&self) -> serde_json::Value {
        match self {
            Target::Url(url) => serde_json::json!({ "url": url.as_str() }),
            Target::Command { program, args } => {
                serde_json::json!({ "command": program, "args": args })
            }
        }
    }
}

/// Fully-resolved configuration for `tether serve`.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Signing key for the gateway identity. Hex-encoded 32-byte seed.
    pub private_key: SecretString,
    /// Relays to connect to, in connection-attempt order.
    pub relays: Vec<String>,
    /// What is being exposed.
    pub target: Target,
    /// Whether the gateway announces itself on the relays.
    pub public: bool,
    /// Public keys allowed to reach the target; empty means everyone.
    pub allow: BTreeSet<String>,
    pub encryption: EncryptionPolicy,
    pub verbose: bool,
}

/// Fully-resolved configuration for `tether use`.
#[derive(Debug, Clone)]
pub struct UseConfig {
    /// Signing key for the client identity. Hex-encoded 32-byte seed.
    pub private_key: SecretString,
    /// Relays to connect to, in connection-attempt order.
    pub relays: Vec<String>,
    /// Public key of the server to attach to.
    pub server: String,
    pub encryption: EncryptionPolicy,
    pub verbose: bool,
}

impl ServeConfig {
    /// JSON rendering with the private key redacted, for `config show`.
    pub fn redacted_json(&self) -> serde_json::Value {
        serde_json::json!({
            "private_key": "<redacted>",
            "relays": self.relays,
            "target": self.target.as_json(),
            "public": self.public,
            "allow": self.allow,
            "encryption": self.encryption.to_string(),
            "verbose": self.verbose,
        })
    }
}

impl UseConfig {
    /// JSON rendering with the private key redacted, for `config show`.
    pub fn redacted_json(&self) -> serde_json::Value {
        serde_json::json!({
            "private_key": "<redacted>",
            "relays": self.relays,
            "server": self.server,
            "encryption": self.encryption.to_string(),
            "verbose": self.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_encryption_policy_parses_case_insensitively() {
        assert_eq!("required".parse(), Ok(EncryptionPolicy::Required));
        assert_eq!("REQUIRED".parse(), Ok(EncryptionPolicy::Required));
        assert_eq!(" Disabled ".parse(), Ok(EncryptionPolicy::Disabled));
        assert_eq!("optional".parse(), Ok(EncryptionPolicy::Optional));
        assert_eq!(EncryptionPolicy::from_str("sometimes"), Err(()));
    }

    #[test]
    fn test_serve_config_debug_does_not_expose_private_key() {
        let config = ServeConfig {
            private_key: SecretString::from("super-secret-seed".to_string()),
            relays: vec!["wss://relay.example".into()],
            target: Target::Command {
                program: "cat".into(),
                args: vec![],
            },
            public: false,
            allow: BTreeSet::new(),
            encryption: EncryptionPolicy::Optional,
            verbose: false,
        };

        let debug_output = format!("{:?}", config);
        assert!(
            !debug_output.contains("super-secret-seed"),
            "Debug output should not contain the private key"
        );
        assert!(debug_output.contains("wss://relay.example"));
    }

    #[test]
    fn test_redacted_json_hides_private_key() {
        let config = UseConfig {
            private_key: SecretString::from("super-secret-seed".to_string()),
            relays: vec!["wss://relay.example".into()],
            server: "abcd1234".into(),
            encryption: EncryptionPolicy::Required,
            verbose: true,
        };

        let rendered = config.redacted_json().to_string();
        assert!(!rendered.contains("super-secret-seed"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("abcd1234"));
        assert!(rendered.contains("required"));
    }
}
