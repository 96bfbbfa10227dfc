//! `SQLite` schema definitions for the rule store.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the rules table.
///
/// `id` preserves insertion order; `rule` is unique so a rule is never
/// stored twice.
pub const CREATE_RULES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS rules (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    rule TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_RULES_TABLE, CREATE_METADATA_TABLE];
