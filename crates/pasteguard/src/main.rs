//! `pasteguard` - CLI for the paste guard
//!
//! Scans and redacts text, manages custom rules, and runs the interactive
//! paste workflow over the system clipboard.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::warn;

use pasteguard::cli::terminal::{StdoutSurface, TerminalDialog, TerminalPaste};
use pasteguard::cli::{Cli, Command, ConfigCommand, RedactCommand, RulesCommand, ScanCommand};
use pasteguard::storage::load_rule_set;
use pasteguard::{
    detect, init_logging, redact, ActiveSurface, ClipboardSource, Config, GuardOptions,
    MemoryRuleStore, PasteDisposition, PasteGuard, RuleSet, RuleStore, SqliteRuleStore,
    SystemClipboard,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Scan(scan_cmd) => handle_scan(&config, &scan_cmd),
        Command::Redact(redact_cmd) => handle_redact(&config, &redact_cmd),
        Command::Paste => handle_paste(&config).await,
        Command::Rules(rules_cmd) => handle_rules(&config, rules_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

/// Open the configured rule store, falling back to an empty in-memory one.
fn open_store(config: &Config) -> Box<dyn RuleStore> {
    match SqliteRuleStore::open(config.database_path()) {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(error = %e, "Rule database unavailable, using no stored rules");
            Box::new(MemoryRuleStore::new())
        }
    }
}

fn rule_set(config: &Config) -> RuleSet {
    let store = open_store(config);
    load_rule_set(store.as_ref(), &config.rules.extra)
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            Ok(text)
        }
    }
}

fn handle_scan(config: &Config, cmd: &ScanCommand) -> anyhow::Result<()> {
    let text = read_input(cmd.file.as_deref())?;
    let findings = detect(&text, &rule_set(config));

    if cmd.json {
        let report = serde_json::json!({
            "clean": findings.is_empty(),
            "findings": findings,
            "labels": findings.labels(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if findings.is_empty() {
        println!("No sensitive content found.");
    } else {
        println!("Sensitive content found:");
        for label in findings.labels() {
            println!("  - {label}");
        }
    }
    Ok(())
}

fn handle_redact(config: &Config, cmd: &RedactCommand) -> anyhow::Result<()> {
    let text = read_input(cmd.file.as_deref())?;
    print!("{}", redact(&text, &rule_set(config)));
    Ok(())
}

async fn handle_paste(config: &Config) -> anyhow::Result<()> {
    let options = GuardOptions::from(config);
    let clipboard = Arc::new(SystemClipboard::new());
    let (guard, mut events, task) = PasteGuard::spawn(
        open_store(config),
        Box::new(TerminalDialog::new()),
        clipboard.clone(),
        options,
    );

    let surface = Arc::new(StdoutSurface::new());
    guard.focus(&ActiveSurface::Rich(surface.clone()));

    let paste = TerminalPaste::new();
    if guard.paste(&paste) == PasteDisposition::PassThrough {
        // Default paste: the clipboard as is.
        if let Some(text) = clipboard.read_text().await? {
            print!("{text}");
        }
        return Ok(());
    }

    while let Some(event) = events.recv().await {
        if event.outcome.is_final() {
            tracing::debug!(?event, "Paste finished");
            break;
        }
    }

    guard.shutdown()?;
    task.await.context("guard task failed")?;
    Ok(())
}

fn handle_rules(config: &Config, cmd: RulesCommand) -> anyhow::Result<()> {
    let store = SqliteRuleStore::open(config.database_path())?;

    match cmd {
        RulesCommand::List { json } => {
            let rules = store.rules()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rules)?);
            } else if rules.is_empty() {
                println!("No custom rules.");
            } else {
                for (index, rule) in rules.iter().enumerate() {
                    println!("{index:>3}  {rule}");
                }
            }
        }
        RulesCommand::Add { rule } => {
            if store.add(&rule)? {
                println!("Added rule: {}", rule.trim());
            } else {
                println!("Rule already exists: {}", rule.trim());
            }
        }
        RulesCommand::Remove { rule, index } => {
            let removed = match (rule, index) {
                (_, Some(index)) => store.remove_at(index)?,
                (Some(rule), None) => store.remove(&rule)?.then_some(rule),
                (None, None) => bail!("specify a rule or --index"),
            };
            match removed {
                Some(rule) => println!("Removed rule: {}", rule.trim()),
                None => bail!("no such rule"),
            }
        }
        RulesCommand::Clear { yes } => {
            if yes {
                let removed = store.clear()?;
                println!("Removed {removed} rule(s).");
            } else {
                println!(
                    "This will remove all {} custom rule(s).",
                    store.count()?
                );
                println!("Use --yes to confirm.");
            }
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Guard]");
                println!("  Enabled:            {}", config.guard.enabled);
                println!();
                println!("[Rules]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Extra rules:        {}", config.rules.extra.len());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
