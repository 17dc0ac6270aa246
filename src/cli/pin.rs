use clap::{ArgGroup, Parser};

use ghpin::reference::RefSpec;

/// Arguments for the pin command
#[derive(Parser, Debug)]
#[command(
    group(ArgGroup::new("reference").required(true).args(["branch", "tag", "sha"])),
    after_help = "EXAMPLES:\n  \
                  Follow a branch:\n    ghpin pin github/octo/demo --branch develop\n\n\
                  Fix to a tag:\n    ghpin pin github/octo/demo --tag v1.0\n\n\
                  Replace a branch pin with a commit:\n    ghpin pin github/octo/demo --sha 3f2a9c1 --force"
)]
pub struct PinArgs {
    /// Package path: github/owner/repo
    pub path: String,

    /// Follow the head of a branch
    #[arg(long)]
    pub branch: Option<String>,

    /// Fix to the commit a tag points at
    #[arg(long)]
    pub tag: Option<String>,

    /// Fix to a commit SHA
    #[arg(long)]
    pub sha: Option<String>,

    /// Replace an existing pin of a different kind
    #[arg(long, short = 'f')]
    pub force: bool,
}

impl PinArgs {
    /// The requested ref; clap guarantees exactly one is set
    pub fn reference(&self) -> Option<RefSpec> {
        self.branch
            .clone()
            .map(RefSpec::Branch)
            .or_else(|| self.tag.clone().map(RefSpec::Tag))
            .or_else(|| self.sha.clone().map(RefSpec::Sha))
    }
}
