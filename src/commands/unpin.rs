//! Unpin command implementation

use console::Style;
use ghpin::config::Config;
use ghpin::error::Result;
use ghpin::fetch::Orchestrator;

use crate::cli::UnpinArgs;

pub fn run(config: Config, args: UnpinArgs) -> Result<()> {
    let orchestrator = Orchestrator::connect(config)?;
    let removed = orchestrator.unpin(&args.path)?;

    println!(
        "{} {} (was {})",
        Style::new().green().bold().apply_to("Unpinned"),
        args.path,
        removed.reference
    );
    Ok(())
}
