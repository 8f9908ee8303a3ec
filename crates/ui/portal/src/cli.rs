use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "portal", version, about = "Portal terminal front end")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    /// Run the interactive TUI (default)
    Run,
    /// Validate a piece of text the way the contact form does and print the verdict as JSON
    Check {
        text: String,
        /// Judge as the long-form message field
        #[arg(long)]
        multiline: bool,
    },
    /// Show or change the stored theme preference
    Theme {
        #[command(subcommand)]
        action: Option<ThemeCmd>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ThemeCmd {
    /// Print the effective theme and where it came from
    Show,
    /// Flip between light and dark
    Toggle,
    /// Store a theme
    Set {
        #[arg(value_enum)]
        theme: ThemeArg,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for contact_guard::ThemePreference {
    fn from(value: ThemeArg) -> Self {
        match value {
            ThemeArg::Light => contact_guard::ThemePreference::Light,
            ThemeArg::Dark => contact_guard::ThemePreference::Dark,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_check_and_theme() {
        let cli = Cli::parse_from(["portal", "check", "hello", "--multiline"]);
        assert_eq!(
            cli.cmd,
            Some(Cmd::Check {
                text: "hello".into(),
                multiline: true
            })
        );

        let cli = Cli::parse_from(["portal", "theme", "set", "light"]);
        assert_eq!(
            cli.cmd,
            Some(Cmd::Theme {
                action: Some(ThemeCmd::Set {
                    theme: ThemeArg::Light
                })
            })
        );

        assert_eq!(Cli::parse_from(["portal"]).cmd, None);
    }
}
