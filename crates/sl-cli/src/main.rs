//! sqllineage CLI - column-level lineage for SQL views and metadata documents

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{extract, metadata, remarks};

/// Initialize env_logger: `warn` by default, `debug` with `--verbose`,
/// `RUST_LOG` overrides both.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let result = match &cli.command {
        cli::Commands::Extract(args) => extract::execute(args, &cli.global).await,
        cli::Commands::Metadata(args) => metadata::execute(args, &cli.global).await,
        cli::Commands::Remarks => remarks::execute().await,
        #[cfg(feature = "serve")]
        cli::Commands::Serve(args) => commands::serve::execute(args, &cli.global).await,
    };

    match result {
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(code) => std::process::exit(code.0),
            None => Err(err),
        },
        ok => ok,
    }
}
