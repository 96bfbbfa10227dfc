//! User-configured custom rules.
//!
//! A custom rule is a literal string matched as a whole word, ignoring case.
//! The rule text is escaped before compilation, so any input produces a valid
//! matcher.

use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Upper bound on the compiled size of a single rule matcher.
const RULE_SIZE_LIMIT: usize = 16 * (1 << 20);

/// A compiled whole-word, case-insensitive literal matcher.
#[derive(Debug, Clone)]
pub struct CustomRule {
    rule: String,
    regex: Option<Regex>,
}

impl CustomRule {
    /// Compile a matcher for `rule`.
    ///
    /// Never fails. A rule too large for the regex engine yields a matcher
    /// that matches nothing.
    #[must_use]
    pub fn new(rule: &str) -> Self {
        let pattern = format!(r"\b{}\b", regex::escape(rule));
        let regex = match RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .size_limit(RULE_SIZE_LIMIT)
            .build()
        {
            Ok(regex) => Some(regex),
            Err(e) => {
                warn!(len = rule.len(), error = %e, "Custom rule could not be compiled, ignoring");
                None
            }
        };

        Self {
            rule: rule.to_string(),
            regex,
        }
    }

    /// The literal rule text.
    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// The compiled regex, if the rule compiled.
    #[must_use]
    pub fn regex(&self) -> Option<&Regex> {
        self.regex.as_ref()
    }
}

/// An immutable snapshot of the custom rules active for one paste attempt.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<CustomRule>,
}

impl RuleSet {
    /// An empty rule set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a rule set from rule strings.
    ///
    /// Rules are trimmed; blank rules are dropped and duplicates keep their
    /// first position.
    #[must_use]
    pub fn new<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: Vec<String> = Vec::new();
        for rule in rules {
            let rule = rule.as_ref().trim();
            if rule.is_empty() || seen.iter().any(|s| s == rule) {
                continue;
            }
            seen.push(rule.to_string());
        }

        Self {
            rules: seen.iter().map(|r| CustomRule::new(r)).collect(),
        }
    }

    /// Iterate over the rules in configured order.
    pub fn iter(&self) -> impl Iterator<Item = &CustomRule> {
        self.rules.iter()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
