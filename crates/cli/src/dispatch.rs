//! Mode dispatch and command execution.
//!
//! Responsibilities:
//! - Route on the mode keyword (`serve`, `use`, `skills`, `config`).
//! - Enforce the unknown-flag gate: nothing resolves and nothing runs
//!   while the scanner rejected any token.
//! - Wire scanner output through the merge engine and hand the resolved
//!   config to the runtime.
//!
//! Does NOT handle:
//! - Flag scanning (see `args`) or configuration semantics (config crate).
//!
//! Invariants:
//! - Tracing is initialized only after resolution, when the effective
//!   verbosity is known; accumulated warnings are emitted right after.

use std::path::PathBuf;

use tether_config::{EnvSnapshot, Mode, PartialConfig, Resolved, ResolveError, SourceStack};
use tether_runtime::{Gateway, Proxy};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::args::{self, SEPARATOR};
use crate::commands;
use crate::error::ExitCode;

const USAGE: &str = "\
tether - expose or consume services over a relay mesh

Usage:
  tether serve [FLAGS] [--] <command|url> [args...]
  tether use   [FLAGS] <server>
  tether skills <list|install|update> [options]
  tether config show [--mode serve|use] [--config FILE]

Flags (serve and use):
  --private-key <hex>    signing key for this identity
  --relays <list>        comma-separated relay URLs
  --encryption <policy>  optional | required | disabled
  --config <file>        explicit config file, overriding discovery
  --verbose              debug logging

Serve only:
  --public               announce the service on the relays
  --                     everything after is the target argv, verbatim

Use only:
  --server <id>          server identifier, overriding the positional
";

/// Entry point for an invocation; `argv` excludes the program name.
pub async fn run(argv: Vec<String>) -> ExitCode {
    let Some((mode, rest)) = argv.split_first() else {
        eprint!("{USAGE}");
        return ExitCode::Usage;
    };

    match mode.as_str() {
        "serve" => run_serve(rest).await,
        "use" => run_use(rest).await,
        "skills" => commands::skills::run(rest).await,
        "config" => commands::config_cmd::run(rest),
        "help" | "--help" | "-h" => {
            print!("{USAGE}");
            ExitCode::Success
        }
        "--version" | "-V" => {
            println!("tether {}", env!("CARGO_PKG_VERSION"));
            ExitCode::Success
        }
        other => {
            eprintln!("error: unknown command {other:?}\n");
            eprint!("{USAGE}");
            ExitCode::Usage
        }
    }
}

async fn run_serve(rest: &[String]) -> ExitCode {
    let parsed = args::parse_serve(rest);
    if let Some(code) = reject_unknown(&parsed.unknown) {
        return code;
    }

    let resolved = match resolve(Mode::Serve, parsed.partial(), parsed.flags.config_path.clone()) {
        Ok(stack) => match stack.resolve_serve() {
            Ok(resolved) => resolved,
            Err(e) => return report_resolve_error(e),
        },
        Err(code) => return code,
    };

    let Resolved { config, warnings } = resolved;
    init_tracing(config.verbose);
    for warning in &warnings {
        tracing::warn!("{warning}");
    }

    let gateway = Gateway::new(config);
    tokio::select! {
        result = gateway.run() => match result {
            Ok(()) => ExitCode::Success,
            Err(e) => {
                eprintln!("{e}");
                ExitCode::from(&e)
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("interrupted");
            ExitCode::Interrupted
        }
    }
}

async fn run_use(rest: &[String]) -> ExitCode {
    let parsed = args::parse_use(rest);
    if let Some(code) = reject_unknown(&parsed.unknown) {
        return code;
    }

    let resolved = match resolve(Mode::Use, parsed.partial(), parsed.flags.config_path.clone()) {
        Ok(stack) => match stack.resolve_use() {
            Ok(resolved) => resolved,
            Err(e) => return report_resolve_error(e),
        },
        Err(code) => return code,
    };

    let Resolved { config, warnings } = resolved;
    init_tracing(config.verbose);
    for warning in &warnings {
        tracing::warn!("{warning}");
    }

    let proxy = Proxy::new(config);
    tokio::select! {
        result = proxy.run() => match result {
            Ok(()) => ExitCode::Success,
            Err(e) => {
                eprintln!("{e}");
                ExitCode::from(&e)
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("interrupted");
            ExitCode::Interrupted
        }
    }
}

/// Builds the five-tier stack for this invocation.
pub(crate) fn resolve(
    mode: Mode,
    flags: PartialConfig,
    custom_file: Option<PathBuf>,
) -> Result<SourceStack, ExitCode> {
    let project_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("error: cannot determine working directory: {e}");
            return Err(ExitCode::GeneralError);
        }
    };
    let env = EnvSnapshot::from_process();
    Ok(SourceStack::gather(
        mode,
        flags,
        custom_file.as_deref(),
        &project_dir,
        &env,
    ))
}

/// Prints every rejected token and stops the invocation.
fn reject_unknown(unknown: &[String]) -> Option<ExitCode> {
    if unknown.is_empty() {
        return None;
    }
    for entry in unknown {
        eprintln!("error: unrecognized argument: {entry}");
    }
    eprintln!("hint: pass target arguments after '{SEPARATOR}', or see 'tether help'");
    Some(ExitCode::Usage)
}

pub(crate) fn report_resolve_error(e: ResolveError) -> ExitCode {
    eprintln!("error: {e}");
    match e {
        ResolveError::MissingTarget | ResolveError::MissingServer => {
            eprintln!();
            eprint!("{USAGE}");
            ExitCode::Usage
        }
        ResolveError::InvalidTargetUrl { .. } => ExitCode::Config,
    }
}

/// Installs the tracing subscriber. `RUST_LOG` still wins when set.
pub(crate) fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
