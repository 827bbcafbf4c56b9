//! # agrifcst
//!
//! Prints one JSON document on stdout per invocation; logs go to stderr.

use agrifcst_cli::{cli_try, error_json, run, Cli, EXIT_FAILURE};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();

    // Targets are prefix-matched, so this covers agrifcst_core and agrifcst_cli
    let default_filter = if cli.verbose {
        "agrifcst=debug"
    } else {
        "agrifcst=info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    match cli_try(|| run(&cli)) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            println!("{}", error_json(&e));
            std::process::exit(EXIT_FAILURE);
        }
    }
}
