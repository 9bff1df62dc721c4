//! Conventional subcommands, parsed with clap.
//!
//! The serve/use surface needs its own scanner (see `args`); everything
//! else has ordinary grammar and uses clap derive like any other CLI.

pub mod config_cmd;
pub mod skills;
