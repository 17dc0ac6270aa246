use clap::Parser;

/// Arguments for the fetch command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Fetch a whole repository:\n    ghpin fetch github/octo/demo\n\n\
                  Fetch one module file:\n    ghpin fetch github/octo/demo/util/strings\n\n\
                  Fetch a branch, tag or commit without changing the pin:\n    ghpin fetch github/octo/demo@v2.0\n\n\
                  Create the owner directory only:\n    ghpin fetch github/octo")]
pub struct FetchArgs {
    /// Package path: github/owner/repo[@ref][/module/...]
    pub path: String,
}
