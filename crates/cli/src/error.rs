//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish
//!   failure classes.
//! - Map runtime and skill errors to appropriate exit codes.
//!
//! Invariants:
//! - Exit code 2 covers every argument problem: unknown flags, missing
//!   values, and missing positionals. No side effect happens before a
//!   code-2 exit.
//! - Exit code 130 is reserved for SIGINT (Unix standard: 128 + SIGINT).

use tether_runtime::RuntimeError;
use tether_skills::SkillError;

/// Structured exit codes for tether.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Command completed, or the runtime was handed off cleanly.
    Success = 0,

    /// Unhandled or generic failure.
    GeneralError = 1,

    /// Bad invocation: unknown flag, missing value, missing target or
    /// server identifier. Fix the command line and retry.
    Usage = 2,

    /// Configuration resolved but was unusable (e.g. invalid target URL).
    Config = 3,

    /// No relay or target endpoint could be reached. Possibly transient.
    Connection = 4,

    /// Interrupted by SIGINT/Ctrl+C (Unix standard: 128 + 2).
    Interrupted = 130,
}

impl ExitCode {
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<&RuntimeError> for ExitCode {
    fn from(err: &RuntimeError) -> Self {
        match err {
            RuntimeError::NoRelayReachable
            | RuntimeError::AllRelaysLost
            | RuntimeError::Transport(_)
            | RuntimeError::Forward(_) => ExitCode::Connection,
            RuntimeError::InvalidPrivateKey => ExitCode::Config,
            _ => ExitCode::GeneralError,
        }
    }
}

impl From<&SkillError> for ExitCode {
    fn from(err: &SkillError) -> Self {
        match err {
            SkillError::Http(_) | SkillError::Status { .. } => ExitCode::Connection,
            _ => ExitCode::GeneralError,
        }
    }
}
