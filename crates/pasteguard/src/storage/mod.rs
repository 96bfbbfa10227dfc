//! Custom rule storage.
//!
//! The interception path only ever reads rules, through the [`RuleStore`]
//! trait. [`SqliteRuleStore`] is the persistent store the CLI manages;
//! [`MemoryRuleStore`] serves embedding hosts and tests.

pub mod migrations;
pub mod schema;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::privacy::RuleSet;

/// Read access to the configured custom rules.
pub trait RuleStore: Send {
    /// The configured rules, in the order they were added.
    ///
    /// A store with nothing configured returns an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn rules(&self) -> Result<Vec<String>>;
}

/// Build the rule set for one scan: stored rules followed by `extra`.
///
/// A store that cannot be read contributes no rules.
pub fn load_rule_set(store: &dyn RuleStore, extra: &[String]) -> RuleSet {
    let stored = store.rules().unwrap_or_else(|e| {
        warn!(error = %e, "Rule store unavailable, continuing without stored rules");
        Vec::new()
    });
    RuleSet::new(stored.iter().chain(extra))
}

/// Shared access to a rule store plus the rules layered on top of it.
///
/// Clones share the same store. [`RuleSource::load`] runs the store query on
/// the blocking pool so an async loop never waits on the database.
#[derive(Clone)]
pub struct RuleSource {
    store: Arc<Mutex<Box<dyn RuleStore>>>,
    extra: Arc<[String]>,
}

impl RuleSource {
    /// Wrap a store with no extra rules.
    #[must_use]
    pub fn new(store: Box<dyn RuleStore>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            extra: Arc::from(Vec::new()),
        }
    }

    /// Replace the rules applied on top of the store's.
    #[must_use]
    pub fn with_extra_rules(mut self, extra: Vec<String>) -> Self {
        self.extra = Arc::from(extra);
        self
    }

    /// Number of extra rules.
    #[must_use]
    pub fn extra_len(&self) -> usize {
        self.extra.len()
    }

    /// Query the store on the calling thread.
    #[must_use]
    pub fn snapshot(&self) -> RuleSet {
        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        load_rule_set(&**store, &self.extra)
    }

    /// Query the store on tokio's blocking pool.
    ///
    /// If the blocking task fails, only the extra rules apply.
    pub async fn load(&self) -> RuleSet {
        let source = self.clone();
        match tokio::task::spawn_blocking(move || source.snapshot()).await {
            Ok(rules) => rules,
            Err(e) => {
                warn!(error = %e, "Rule snapshot task failed, continuing without stored rules");
                RuleSet::new(self.extra.iter())
            }
        }
    }
}

impl fmt::Debug for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSource")
            .field("extra", &self.extra.len())
            .finish_non_exhaustive()
    }
}

/// Trim a rule and reject it if blank.
fn normalize_rule(rule: &str) -> Result<&str> {
    let rule = rule.trim();
    if rule.is_empty() {
        return Err(Error::invalid_rule("rule is blank"));
    }
    Ok(rule)
}

/// `SQLite`-backed rule store.
#[derive(Debug)]
pub struct SqliteRuleStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl SqliteRuleStore {
    /// Open or create a rule database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening rule database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        info!("Rule database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory rule store.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add a rule.
    ///
    /// The rule is trimmed first. Returns `false` if it was already stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule is blank or the database operation fails.
    pub fn add(&self, rule: &str) -> Result<bool> {
        let rule = normalize_rule(rule)?;

        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO rules (rule, created_at) VALUES (?1, ?2)",
            params![rule, Utc::now().to_rfc3339()],
        )?;

        if inserted == 0 {
            debug!("Rule already stored, skipping");
        }
        Ok(inserted > 0)
    }

    /// Remove a rule by its text.
    ///
    /// Returns `false` if no such rule was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove(&self, rule: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM rules WHERE rule = ?1", [rule.trim()])?;
        Ok(removed > 0)
    }

    /// Remove the rule at `index` in list order.
    ///
    /// Returns the removed rule, or `None` if the index is out of range.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove_at(&self, index: usize) -> Result<Option<String>> {
        let offset = i64::try_from(index).unwrap_or(i64::MAX);
        let found: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT id, rule FROM rules ORDER BY id ASC LIMIT 1 OFFSET ?1",
                [offset],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((id, rule)) = found else {
            return Ok(None);
        };
        self.conn.execute("DELETE FROM rules WHERE id = ?1", [id])?;
        Ok(Some(rule))
    }

    /// Remove every rule. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn clear(&self) -> Result<usize> {
        let removed = self.conn.execute("DELETE FROM rules", [])?;
        info!(removed, "Cleared custom rules");
        Ok(removed)
    }

    /// Number of stored rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM rules", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

impl RuleStore for SqliteRuleStore {
    fn rules(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT rule FROM rules ORDER BY id ASC")?;
        let rules = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(rules)
    }
}

/// In-memory rule store.
#[derive(Debug, Clone, Default)]
pub struct MemoryRuleStore {
    rules: Vec<String>,
}

impl MemoryRuleStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `rules`, skipping blanks and duplicates.
    #[must_use]
    pub fn with_rules<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = Self::new();
        for rule in rules {
            // Blank rules are dropped.
            let _ = store.add(rule.as_ref());
        }
        store
    }

    /// Add a rule. Returns `false` if it was already stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule is blank.
    pub fn add(&mut self, rule: &str) -> Result<bool> {
        let rule = normalize_rule(rule)?;
        if self.rules.iter().any(|r| r == rule) {
            return Ok(false);
        }
        self.rules.push(rule.to_string());
        Ok(true)
    }

    /// Remove a rule by its text. Returns `false` if it was not stored.
    pub fn remove(&mut self, rule: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r != rule.trim());
        self.rules.len() != before
    }
}

impl RuleStore for MemoryRuleStore {
    fn rules(&self) -> Result<Vec<String>> {
        Ok(self.rules.clone())
    }
}
