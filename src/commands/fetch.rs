//! Fetch command implementation

use console::Style;
use ghpin::config::Config;
use ghpin::error::Result;
use ghpin::fetch::{Orchestrator, Outcome};

use crate::cli::FetchArgs;

pub fn run(config: Config, args: FetchArgs) -> Result<()> {
    let orchestrator = Orchestrator::connect(config)?;
    let report = orchestrator.resolve_and_fetch(&args.path)?;

    let style = match report.outcome {
        Outcome::Installed | Outcome::Updated => Style::new().green().bold(),
        Outcome::Degraded { .. } => Style::new().yellow().bold(),
        _ => Style::new().dim(),
    };
    let commit = report
        .commit_sha
        .as_deref()
        .map(|sha| format!(" @ {}", short_sha(sha)))
        .unwrap_or_default();

    println!(
        "{} {}{}",
        style.apply_to(report.outcome.to_string()),
        report.pin_key,
        commit
    );
    println!("  {}", report.artifact.display());
    Ok(())
}

pub(crate) fn short_sha(sha: &str) -> &str {
    sha.char_indices().nth(12).map_or(sha, |(end, _)| &sha[..end])
}
