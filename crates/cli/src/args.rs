//! Argument scanning for the serve and use commands.
//!
//! Responsibilities:
//! - Scan the arguments after the mode keyword into flag values, a
//!   mode-specific payload, and a list of rejected tokens.
//! - Implement both scanning policies: strict (a `--` separator splits
//!   tether flags from a verbatim target argv) and lenient (no separator;
//!   recognized flags are consumed wherever they appear and everything
//!   else accumulates into the target argv).
//!
//! Non-responsibilities:
//! - Does not print, exit, or resolve configuration (see `dispatch`).
//! - The `skills` and `config` subcommands have conventional grammar and
//!   are parsed with clap instead (see `commands`).
//!
//! Invariants:
//! - Scanning never fails: malformed input lands in `unknown`, and a
//!   non-empty `unknown` must stop the caller before any side effect.
//! - Tokens after the first `--` are never reinterpreted as tether flags.

use std::path::PathBuf;

use secrecy::SecretString;
use tether_config::{argv::tokenize, split_relays, Mode, PartialConfig};

/// The token separating tether flags from the target argv in serve mode.
pub const SEPARATOR: &str = "--";

const LONG_PREFIX: &str = "--";

/// Values collected for the recognized tether-level flags.
#[derive(Debug, Clone, Default)]
pub struct FlagValues {
    pub private_key: Option<String>,
    /// Raw comma-separated list, split when the flags tier is built.
    pub relays: Option<String>,
    /// Raw policy name; parsed (with warnings) by the merge engine.
    pub encryption: Option<String>,
    pub config_path: Option<PathBuf>,
    /// Serve only.
    pub public: bool,
    pub verbose: bool,
    /// Use only: explicit server identifier, overrides any positional.
    pub server: Option<String>,
}

/// Outcome of scanning a `tether serve` invocation.
#[derive(Debug)]
pub struct ServeInvocation {
    pub flags: FlagValues,
    /// The target argv: a command and its arguments, or a single URL token.
    pub target: Vec<String>,
    pub unknown: Vec<String>,
}

/// Outcome of scanning a `tether use` invocation.
#[derive(Debug)]
pub struct UseInvocation {
    pub flags: FlagValues,
    /// Explicit `--server` value, else the first positional token.
    pub server: Option<String>,
    pub unknown: Vec<String>,
}

/// Scans a serve invocation.
///
/// With a separator, everything before it is held to the strict policy and
/// everything after it is the target argv, verbatim. Without one, the
/// legacy lenient policy applies and a single-token target is decomposed
/// with the argv tokenizer.
pub fn parse_serve(args: &[String]) -> ServeInvocation {
    if let Some(pos) = args.iter().position(|a| a == SEPARATOR) {
        let (flags, _, unknown) = Scanner::new(Mode::Serve, true).scan(&args[..pos]);
        ServeInvocation {
            flags,
            target: args[pos + 1..].to_vec(),
            unknown,
        }
    } else {
        let (flags, mut target, unknown) = Scanner::new(Mode::Serve, false).scan(args);
        if target.len() == 1 {
            target = tokenize(&target[0]);
        }
        ServeInvocation {
            flags,
            target,
            unknown,
        }
    }
}

/// Scans a use invocation. There is no separator here: with no child argv
/// to protect, every flag-like token is for tether.
pub fn parse_use(args: &[String]) -> UseInvocation {
    let (flags, positionals, unknown) = Scanner::new(Mode::Use, false).scan(args);
    let server = flags.server.clone().or_else(|| positionals.first().cloned());
    UseInvocation {
        flags,
        server,
        unknown,
    }
}

impl ServeInvocation {
    /// The flags tier for the merge engine.
    pub fn partial(&self) -> PartialConfig {
        PartialConfig {
            command: (!self.target.is_empty()).then(|| self.target.clone()),
            public: self.flags.public.then_some(true),
            ..shared_partial(&self.flags)
        }
    }
}

impl UseInvocation {
    /// The flags tier for the merge engine.
    pub fn partial(&self) -> PartialConfig {
        PartialConfig {
            server: self.server.clone(),
            ..shared_partial(&self.flags)
        }
    }
}

fn shared_partial(flags: &FlagValues) -> PartialConfig {
    PartialConfig {
        private_key: flags
            .private_key
            .clone()
            .map(SecretString::from),
        relays: flags.relays.as_deref().map(split_relays),
        encryption: flags.encryption.clone(),
        verbose: flags.verbose.then_some(true),
        ..Default::default()
    }
}

/// The value-taking flags.
#[derive(Clone, Copy)]
enum ValueField {
    PrivateKey,
    Relays,
    Encryption,
    Config,
    Server,
}

/// One scanner for both policies; `strict` is the only switch.
struct Scanner {
    mode: Mode,
    strict: bool,
    flags: FlagValues,
    positionals: Vec<String>,
    unknown: Vec<String>,
}

impl Scanner {
    fn new(mode: Mode, strict: bool) -> Self {
        Self {
            mode,
            strict,
            flags: FlagValues::default(),
            positionals: Vec::new(),
            unknown: Vec::new(),
        }
    }

    fn scan(mut self, tokens: &[String]) -> (FlagValues, Vec<String>, Vec<String>) {
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            if token.starts_with(LONG_PREFIX) && token.len() > 2 {
                i = self.long_flag(tokens, i);
            } else {
                self.operand(token, token.starts_with('-') && token.len() > 1);
                i += 1;
            }
        }
        (self.flags, self.positionals, self.unknown)
    }

    fn long_flag(&mut self, tokens: &[String], i: usize) -> usize {
        let token = &tokens[i];
        match token.as_str() {
            "--verbose" => {
                self.flags.verbose = true;
                i + 1
            }
            "--public" if self.mode == Mode::Serve => {
                self.flags.public = true;
                i + 1
            }
            "--private-key" => self.value_flag(tokens, i, ValueField::PrivateKey),
            "--relays" => self.value_flag(tokens, i, ValueField::Relays),
            "--encryption" => self.value_flag(tokens, i, ValueField::Encryption),
            "--config" => self.value_flag(tokens, i, ValueField::Config),
            "--server" if self.mode == Mode::Use => self.value_flag(tokens, i, ValueField::Server),
            _ => {
                self.unknown.push(token.clone());
                i + 1
            }
        }
    }

    /// Consumes a value-taking flag. A flag at the end of input, or one
    /// followed by another long flag, has no value: it is recorded as
    /// malformed and the scan resumes at the next token so that the
    /// following flag is still processed.
    fn value_flag(&mut self, tokens: &[String], i: usize, field: ValueField) -> usize {
        let name = &tokens[i];
        match tokens.get(i + 1) {
            Some(value) if !value.starts_with(LONG_PREFIX) => {
                self.store(field, value.clone());
                i + 2
            }
            _ => {
                self.unknown.push(format!("{name} (missing value)"));
                i + 1
            }
        }
    }

    fn store(&mut self, field: ValueField, value: String) {
        match field {
            ValueField::PrivateKey => self.flags.private_key = Some(value),
            ValueField::Relays => self.flags.relays = Some(value),
            ValueField::Encryption => self.flags.encryption = Some(value),
            ValueField::Config => self.flags.config_path = Some(PathBuf::from(value)),
            ValueField::Server => self.flags.server = Some(value),
        }
    }

    /// Handles a token that is not a long flag: a short token (`-x`) or a
    /// plain positional.
    fn operand(&mut self, token: &str, dashed: bool) {
        match (self.mode, self.strict) {
            // Strict serve: nothing but recognized flags may appear before
            // the separator.
            (Mode::Serve, true) => self
                .unknown
                .push(format!("{token} (unexpected before '{SEPARATOR}')")),
            // Lenient serve: short tokens and positionals flow into the
            // target argv in order.
            (Mode::Serve, false) => self.positionals.push(token.to_string()),
            (Mode::Use, _) => {
                if self.positionals.is_empty() {
                    self.positionals.push(token.to_string());
                } else if dashed {
                    self.unknown.push(token.to_string());
                }
                // A second plain positional is ignored: the first one won.
            }
        }
    }
}
