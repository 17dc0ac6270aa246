//! ghpin - pinned package fetcher for GitHub-hosted code

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use ghpin::config::Config;
use ghpin::error::Result;

/// Log to stderr at a level picked by `-v`, unless `RUST_LOG` is set
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ghpin={level}")));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run(cli: Cli) -> Result<()> {
    let load = || Config::load(cli.cache_dir.clone());
    match cli.command {
        Commands::Fetch(args) => commands::fetch::run(load()?, args),
        Commands::Pin(args) => commands::pin::run(load()?, args),
        Commands::Unpin(args) => commands::unpin::run(load()?, args),
        Commands::Show(args) => commands::show::run(load()?, args),
        Commands::Cache(args) => commands::cache::run(load()?, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
