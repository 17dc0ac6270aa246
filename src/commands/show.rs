//! Show command implementation

use ghpin::config::Config;
use ghpin::error::{self, Result};
use ghpin::fetch::Orchestrator;

use crate::cli::ShowArgs;

pub fn run(config: Config, args: ShowArgs) -> Result<()> {
    let orchestrator = Orchestrator::connect(config)?;
    let prefix = args.path.as_deref().unwrap_or("");

    let Some(node) = orchestrator.pins(prefix)? else {
        return Err(error::store::no_such_path(prefix));
    };
    let json = serde_json::to_string_pretty(&node)?;
    println!("{json}");
    Ok(())
}
