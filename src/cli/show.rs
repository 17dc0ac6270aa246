use clap::Parser;

/// Arguments for the show command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show every pin:\n    ghpin show\n\n\
                  Show the pins of one owner:\n    ghpin show github/octo\n\n\
                  Show one pin:\n    ghpin show github/octo/demo")]
pub struct ShowArgs {
    /// Path or prefix to show (if omitted, shows the whole pin tree)
    pub path: Option<String>,
}
