use clap::Parser;

/// Arguments for the unpin command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Remove a pin:\n    ghpin unpin github/octo/demo")]
pub struct UnpinArgs {
    /// Package path: github/owner/repo
    pub path: String,
}
