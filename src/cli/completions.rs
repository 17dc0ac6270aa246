use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    ghpin completions bash > ~/.bash_completion.d/ghpin\n\n\
                  Generate zsh completions:\n    ghpin completions zsh > ~/.zfunc/_ghpin\n\n\
                  Generate fish completions:\n    ghpin completions fish > ~/.config/fish/completions/ghpin.fish\n\n\
                  Generate PowerShell completions:\n    ghpin completions powershell")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
