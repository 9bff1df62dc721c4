//! Shared constants for configuration resolution.
//!
//! Responsibilities:
//! - Define default relay endpoints and config file names.
//! - Define the canonical/legacy environment variable name pairs per mode.
//!
//! Does NOT handle:
//! - Reading any of these sources (see the `loader` module).
//!
//! Invariants:
//! - Every environment-sourced field has exactly one canonical and one
//!   legacy variable name; the canonical name always wins when both are set.

/// Relays used when no source configures a relay list.
pub const DEFAULT_RELAYS: [&str; 2] = [
    "wss://relay.tethermesh.io",
    "wss://relay2.tethermesh.io",
];

/// File name of the project-local config, discovered in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "tether.json";

/// File name of the global per-user config inside the tether config directory.
pub const GLOBAL_CONFIG_FILE: &str = "config.json";

/// A canonical environment variable name plus the legacy name it supersedes.
///
/// The legacy names predate the serve/use command split, when the two halves
/// of the tool were called "gateway" and "proxy". They keep working so that
/// existing deployments do not break, but only when the canonical name is
/// unset.
#[derive(Debug, Clone, Copy)]
pub struct EnvAlias {
    pub canonical: &'static str,
    pub legacy: &'static str,
}

/// Environment variable names for one invocation mode.
#[derive(Debug, Clone, Copy)]
pub struct ModeEnv {
    pub private_key: EnvAlias,
    pub relays: EnvAlias,
    pub encryption: EnvAlias,
    /// Serve only: visibility flag.
    pub public: Option<EnvAlias>,
    /// Serve only: remote URL target.
    pub url: Option<EnvAlias>,
}

pub const SERVE_ENV: ModeEnv = ModeEnv {
    private_key: EnvAlias {
        canonical: "TETHER_SERVE_PRIVATE_KEY",
        legacy: "TETHER_GATEWAY_PRIVATE_KEY",
    },
    relays: EnvAlias {
        canonical: "TETHER_SERVE_RELAYS",
        legacy: "TETHER_GATEWAY_RELAYS",
    },
    encryption: EnvAlias {
        canonical: "TETHER_SERVE_ENCRYPTION",
        legacy: "TETHER_GATEWAY_ENCRYPTION",
    },
    public: Some(EnvAlias {
        canonical: "TETHER_SERVE_PUBLIC",
        legacy: "TETHER_GATEWAY_PUBLIC",
    }),
    url: Some(EnvAlias {
        canonical: "TETHER_SERVE_URL",
        legacy: "TETHER_GATEWAY_URL",
    }),
};

pub const USE_ENV: ModeEnv = ModeEnv {
    private_key: EnvAlias {
        canonical: "TETHER_USE_PRIVATE_KEY",
        legacy: "TETHER_PROXY_PRIVATE_KEY",
    },
    relays: EnvAlias {
        canonical: "TETHER_USE_RELAYS",
        legacy: "TETHER_PROXY_RELAYS",
    },
    encryption: EnvAlias {
        canonical: "TETHER_USE_ENCRYPTION",
        legacy: "TETHER_PROXY_ENCRYPTION",
    },
    public: None,
    url: None,
};
