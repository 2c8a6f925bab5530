//! formguard CLI
//!
//! # Usage
//!
//! ```bash
//! # Validate a values file against a schema document
//! formguard validate --schema signup.yaml --values submitted.json --format json
//!
//! # Re-check one field
//! formguard check --schema signup.yaml --form signup --field username --value ab
//!
//! # List forms, fields and rules
//! formguard inspect --schema signup.yaml
//! ```
//!
//! # Exit Codes
//!
//! - 0: All values valid
//! - 1: At least one field invalid
//! - 3: Invalid input or arguments
//! - 4: File not found or inaccessible
//! - 5: Schema document errors
//! - 10: Internal error

use clap::Parser;
use formguard_cli::{run_cli, FormguardCli};

fn main() {
    let cli = FormguardCli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::WARN,
        (false, 1) => tracing::Level::INFO,
        (false, 2) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = run_cli(cli);
    std::process::exit(exit_code.into());
}
