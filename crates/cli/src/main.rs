//! tether - expose or consume services over a relay mesh, and manage
//! skill packages.
//!
//! Responsibilities:
//! - Load `.env` before anything reads the environment.
//! - Dispatch on the mode keyword and translate outcomes into structured
//!   exit codes.
//!
//! Does NOT handle:
//! - Configuration semantics (see `tether-config`) or relay/process
//!   mechanics (see `tether-runtime`).
//!
//! Invariants:
//! - `.env` is loaded BEFORE argument handling so that the environment
//!   tier and any `RUST_LOG` override see its values.
//! - Any rejected argument exits with code 2 before side effects.

mod args;
mod commands;
mod dispatch;
mod error;

use error::ExitCode;

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("failed to load .env: {e}");
        std::process::exit(ExitCode::GeneralError.as_i32());
    }

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let code = dispatch::run(argv).await;
    std::process::exit(code.as_i32());
}
