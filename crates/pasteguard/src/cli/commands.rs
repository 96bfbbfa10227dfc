//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Scan command arguments.
#[derive(Debug, Args)]
pub struct ScanCommand {
    /// File to scan (reads stdin when omitted)
    pub file: Option<PathBuf>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Redact command arguments.
#[derive(Debug, Args)]
pub struct RedactCommand {
    /// File to redact (reads stdin when omitted)
    pub file: Option<PathBuf>,
}

/// Custom rule commands.
#[derive(Debug, Subcommand)]
pub enum RulesCommand {
    /// List stored rules
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Add a rule
    Add {
        /// Word or phrase to redact, matched whole-word and case-insensitively
        rule: String,
    },

    /// Remove a rule by text or by its position in `rules list`
    Remove {
        /// Rule text to remove
        #[arg(required_unless_present = "index")]
        rule: Option<String>,

        /// Zero-based position to remove
        #[arg(short, long, conflicts_with = "rule")]
        index: Option<usize>,
    },

    /// Remove every rule
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
