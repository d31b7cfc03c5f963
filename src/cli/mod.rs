//! Command-line interface.
//!
//! Running the binary without a subcommand starts the HTTP server.

use clap::{Parser, Subcommand};

/// wawatch - anime tracking API
#[derive(Parser)]
#[command(name = "wawatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP API server (default)
    Serve,

    /// Create default config file
    Init,

    /// Apply database migrations and exit
    Migrate,

    /// Load and validate the configuration, then print a summary
    CheckConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["wawatch"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_kebab_case_subcommands() {
        let cli = Cli::try_parse_from(["wawatch", "check-config"]).unwrap();
        assert_eq!(cli.command, Some(Commands::CheckConfig));

        let cli = Cli::try_parse_from(["wawatch", "migrate"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Migrate));
    }

    #[test]
    fn rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["wawatch", "daemon"]).is_err());
    }
}
