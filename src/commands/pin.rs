//! Pin command implementation

use console::Style;
use ghpin::config::Config;
use ghpin::error::{self, Result};
use ghpin::fetch::Orchestrator;

use super::fetch::short_sha;
use crate::cli::PinArgs;

pub fn run(config: Config, args: PinArgs) -> Result<()> {
    let reference = args
        .reference()
        .ok_or_else(|| error::path::invalid(&args.path, "one of --branch, --tag or --sha is required"))?;

    let orchestrator = Orchestrator::connect(config)?;
    let record = orchestrator.pin(&args.path, reference, args.force)?;

    println!(
        "{} {} to {} ({})",
        Style::new().green().bold().apply_to("Pinned"),
        args.path,
        record.reference,
        short_sha(&record.commit_sha)
    );
    Ok(())
}
