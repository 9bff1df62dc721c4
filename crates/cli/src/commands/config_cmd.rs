//! `tether config` - configuration introspection.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tether_config::{Mode, PartialConfig, ResolveError};

use crate::dispatch::{report_resolve_error, resolve};
use crate::error::ExitCode;

#[derive(Parser)]
#[command(name = "tether config", about = "Inspect the resolved configuration")]
struct ConfigCli {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the configuration an invocation would resolve to, with the
    /// private key redacted.
    Show {
        /// Which mode's configuration to resolve
        #[arg(long, value_enum, default_value_t)]
        mode: ModeArg,

        /// Explicit config file, overriding discovery
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Default)]
enum ModeArg {
    #[default]
    Serve,
    Use,
}

pub fn run(rest: &[String]) -> ExitCode {
    let argv = std::iter::once("tether config".to_string()).chain(rest.iter().cloned());
    let cli = match ConfigCli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::Usage
            } else {
                ExitCode::Success
            };
        }
    };

    match cli.command {
        ConfigCommand::Show { mode, config } => show(mode, config),
    }
}

fn show(mode: ModeArg, config: Option<PathBuf>) -> ExitCode {
    let stack = match mode {
        ModeArg::Serve => resolve(Mode::Serve, PartialConfig::default(), config),
        ModeArg::Use => resolve(Mode::Use, PartialConfig::default(), config),
    };
    let stack = match stack {
        Ok(stack) => stack,
        Err(code) => return code,
    };

    let (rendered, warnings) = match mode {
        ModeArg::Serve => match stack.resolve_serve() {
            Ok(resolved) => (resolved.config.redacted_json(), resolved.warnings),
            Err(e) => return explain(e),
        },
        ModeArg::Use => match stack.resolve_use() {
            Ok(resolved) => (resolved.config.redacted_json(), resolved.warnings),
            Err(e) => return explain(e),
        },
    };

    for warning in &warnings {
        eprintln!("warning: {warning}");
    }
    match serde_json::to_string_pretty(&rendered) {
        Ok(text) => {
            println!("{text}");
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::GeneralError
        }
    }
}

fn explain(e: ResolveError) -> ExitCode {
    // `show` reports exactly what serve/use would report, so a dry run
    // doubles as diagnostics for a broken setup.
    report_resolve_error(e)
}
