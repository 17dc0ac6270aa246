use clap::{Parser, Subcommand};

/// Arguments for the cache command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show cache statistics:\n    ghpin cache\n\n\
                  Remove every cached package:\n    ghpin cache clear\n\n\
                  Remove cached packages and all pins:\n    ghpin cache clear --pins")]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: Option<CacheSubcommand>,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheSubcommand {
    /// Remove cached packages
    Clear(ClearCacheArgs),
}

/// Arguments for the cache clear command
#[derive(Parser, Debug)]
pub struct ClearCacheArgs {
    /// Delete the pin store as well
    #[arg(long)]
    pub pins: bool,
}
