//! Latchkey server binary.
//!
//! ```text
//! latchkey-server --credential password1,password2 --admin-password secret
//! ```
//!
//! Every flag also reads from a `LATCHKEY_*` environment variable; see
//! `--help`.

use std::process::ExitCode;

use clap::Parser;
use latchkey_server::{Args, init_tracing, run};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if init_tracing(&args.log_filter).is_err() {
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "latchkey-server failed");
            ExitCode::FAILURE
        },
    }
}
