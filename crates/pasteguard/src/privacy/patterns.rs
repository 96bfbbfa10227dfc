//! Built-in sensitive-content patterns.
//!
//! This module provides the fixed set of regex matchers the guard checks every
//! paste against, the [`Category`] each one reports, and the placeholder it is
//! redacted to.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A class of sensitive content.
///
/// Every category owns exactly one placeholder. [`Category::CustomRule`] is the
/// only category backed by user configuration; the others have one built-in
/// pattern each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// A user-configured literal rule.
    CustomRule,
    /// An email address.
    Email,
    /// A `sk_live_` / `sk_test_` secret key.
    ApiKey,
    /// A JWT-shaped structured token.
    Token,
    /// A dotted-quad IPv4-looking address.
    IpAddress,
    /// A PEM private key block.
    PrivateKey,
}

impl Category {
    /// Built-in categories in the order they are detected and redacted.
    pub const BUILTIN: [Self; 5] = [
        Self::Email,
        Self::ApiKey,
        Self::Token,
        Self::IpAddress,
        Self::PrivateKey,
    ];

    /// Human-readable label shown in the decision dialog.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CustomRule => "Custom Rule",
            Self::Email => "Email Address",
            Self::ApiKey => "API Key",
            Self::Token => "JWT Token",
            Self::IpAddress => "IP Address",
            Self::PrivateKey => "Private Key",
        }
    }

    /// The text a matched span is replaced with.
    #[must_use]
    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::CustomRule | Self::PrivateKey => "[REDACTED]",
            Self::Email => "[REDACTED_EMAIL]",
            Self::ApiKey => "[REDACTED_API_KEY]",
            Self::Token => "[REDACTED_TOKEN]",
            Self::IpAddress => "[REDACTED_IP]",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A compiled built-in pattern.
#[derive(Debug)]
pub struct SensitivePattern {
    /// The category this pattern reports.
    pub category: Category,

    /// Description of what this pattern matches.
    pub description: &'static str,

    regex: Regex,
}

impl SensitivePattern {
    /// Create a new pattern.
    ///
    /// # Panics
    ///
    /// Panics if the regex pattern is invalid.
    #[must_use]
    pub fn new(category: Category, description: &'static str, pattern: &str) -> Self {
        Self {
            category,
            description,
            regex: Regex::new(pattern).expect("Invalid regex pattern"),
        }
    }

    /// The compiled regex.
    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Replacement text for every match of this pattern.
    #[must_use]
    pub fn placeholder(&self) -> &'static str {
        self.category.placeholder()
    }
}

/// Get all built-in patterns, in detection order.
///
/// The patterns are compiled once per process and shared.
#[must_use]
pub fn builtin_patterns() -> &'static [SensitivePattern] {
    static PATTERNS: OnceLock<Vec<SensitivePattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            SensitivePattern::new(
                Category::Email,
                "Email addresses (local@domain.tld)",
                r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b",
            ),
            SensitivePattern::new(
                Category::ApiKey,
                "Live and test secret keys (sk_live_..., sk_test_...)",
                r"sk_(?:live|test)_[0-9a-zA-Z]{16,}",
            ),
            SensitivePattern::new(
                Category::Token,
                "JWT-shaped tokens (three base64url segments starting with eyJ)",
                r"eyJ[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+",
            ),
            SensitivePattern::new(
                Category::IpAddress,
                "Dotted-quad addresses (no range validation)",
                r"\b[0-9]{1,3}(?:\.[0-9]{1,3}){3}\b",
            ),
            // The END marker is optional: with it the whole block goes,
            // without it only the BEGIN marker does.
            SensitivePattern::new(
                Category::PrivateKey,
                "PEM-encoded private key blocks",
                r"-----BEGIN [A-Z0-9 ]*PRIVATE KEY-----(?s:.*?-----END [A-Z0-9 ]*PRIVATE KEY-----)?",
            ),
        ]
    })
}

/// Matches placeholder tokens already present in text.
///
/// Spans covered by a placeholder are never matched again, which keeps
/// redaction idempotent.
#[must_use]
pub fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\[REDACTED(?:_[A-Z]+)*\]").expect("Invalid placeholder regex")
    })
}
