//! Cache command implementation

use console::Style;
use ghpin::cache::{Cache, CacheStats, ClearSummary};
use ghpin::config::Config;
use ghpin::error::Result;
use ghpin::fetch::Orchestrator;

use crate::cli::{CacheArgs, CacheSubcommand};

pub fn run(config: Config, args: CacheArgs) -> Result<()> {
    match args.command {
        Some(CacheSubcommand::Clear(clear)) => {
            let orchestrator = Orchestrator::connect(config)?;
            let summary = orchestrator.clear(clear.pins)?;
            print_cleared(&summary);
            Ok(())
        }
        None => show_stats(&config),
    }
}

fn show_stats(config: &Config) -> Result<()> {
    let cache = Cache::from_config(config);
    let stats = cache.stats()?;
    let label = Style::new().bold();

    println!("{}", label.apply_to("Cache Statistics:"));
    println!("  Location: {}", cache.base_dir().display());
    println!("  Pin store: {}", config.store_path.display());
    println!("  Packages: {}", stats.packages);
    println!("  Files: {}", stats.files);
    println!("  Size: {}", stats.formatted_size());

    if stats.packages == 0 {
        println!("\nCache is empty.");
    } else {
        println!("\nRun 'ghpin cache clear' to remove every cached package.");
    }
    Ok(())
}

fn print_cleared(summary: &ClearSummary) {
    let freed = CacheStats {
        total_size: summary.bytes,
        ..CacheStats::default()
    };
    println!(
        "Cache cleared: {} package{} removed ({}).",
        summary.packages,
        if summary.packages == 1 { "" } else { "s" },
        freed.formatted_size()
    );
    if summary.pins_removed {
        println!("Pin store removed.");
    }
}
