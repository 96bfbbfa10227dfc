//! Command-line interface for pasteguard.
//!
//! This module provides the CLI structure for the `pasteguard` binary and the
//! terminal host used by `pasteguard paste`.

mod commands;
pub mod terminal;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, RedactCommand, RulesCommand, ScanCommand};

/// pasteguard - Catch secrets before they are pasted
///
/// Scans text for email addresses, API keys, tokens, IP addresses, private
/// keys and your own custom rules, and offers a redacted version instead.
#[derive(Debug, Parser)]
#[command(name = "pasteguard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Report sensitive content in a file or stdin
    Scan(ScanCommand),

    /// Print a redacted copy of a file or stdin
    Redact(RedactCommand),

    /// Paste the clipboard to stdout, asking first if it holds sensitive content
    Paste,

    /// Manage custom redaction rules
    #[command(subcommand)]
    Rules(RulesCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;
    use clap::CommandFactory;

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "pasteguard");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        let cli = Cli::try_parse_from(["pasteguard", "-q", "paste"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Quiet);

        let cli = Cli::try_parse_from(["pasteguard", "paste"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Normal);

        let cli = Cli::try_parse_from(["pasteguard", "-vv", "paste"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_scan() {
        let cli = Cli::try_parse_from(["pasteguard", "scan", "notes.txt", "--json"]).unwrap();
        let Command::Scan(scan) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(scan.file, Some(PathBuf::from("notes.txt")));
        assert!(scan.json);
    }

    #[test]
    fn test_parse_scan_stdin() {
        let cli = Cli::try_parse_from(["pasteguard", "scan"]).unwrap();
        assert!(matches!(cli.command, Command::Scan(ScanCommand { file: None, .. })));
    }

    #[test]
    fn test_parse_redact() {
        let cli = Cli::try_parse_from(["pasteguard", "redact", "-"]).unwrap();
        assert!(matches!(cli.command, Command::Redact(_)));
    }

    #[test]
    fn test_parse_rules_add() {
        let cli = Cli::try_parse_from(["pasteguard", "rules", "add", "Project Falcon"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Rules(RulesCommand::Add { ref rule }) if rule == "Project Falcon"
        ));
    }

    #[test]
    fn test_parse_rules_remove_by_index() {
        let cli = Cli::try_parse_from(["pasteguard", "rules", "remove", "--index", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Rules(RulesCommand::Remove {
                rule: None,
                index: Some(2)
            })
        ));
    }

    #[test]
    fn test_parse_rules_remove_requires_target() {
        assert!(Cli::try_parse_from(["pasteguard", "rules", "remove"]).is_err());
        assert!(Cli::try_parse_from(["pasteguard", "rules", "remove", "x", "-i", "0"]).is_err());
    }

    #[test]
    fn test_parse_with_config() {
        let cli =
            Cli::try_parse_from(["pasteguard", "-c", "/custom/config.toml", "config", "show"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Show { json: false })
        ));
    }
}
