//! Detection of sensitive content.

use std::ops::Range;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::patterns::{builtin_patterns, placeholder_regex, Category};
use super::rules::RuleSet;

/// The ordered, de-duplicated set of categories found in a text.
///
/// Serialized as a plain list. Deserializing goes through [`Findings::insert`],
/// so repeated categories collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Category>", into = "Vec<Category>")]
pub struct Findings(Vec<Category>);

impl Findings {
    /// Record a category, keeping only its first occurrence.
    pub fn insert(&mut self, category: Category) {
        if !self.0.contains(&category) {
            self.0.push(category);
        }
    }

    /// Whether `category` was found.
    #[must_use]
    pub fn contains(&self, category: Category) -> bool {
        self.0.contains(&category)
    }

    /// Whether nothing was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct categories found.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Categories in detection order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.0
    }

    /// Human-readable labels in detection order.
    #[must_use]
    pub fn labels(&self) -> Vec<&'static str> {
        self.0.iter().map(|c| c.label()).collect()
    }
}

impl FromIterator<Category> for Findings {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        let mut findings = Self::default();
        for category in iter {
            findings.insert(category);
        }
        findings
    }
}

impl From<Vec<Category>> for Findings {
    fn from(categories: Vec<Category>) -> Self {
        categories.into_iter().collect()
    }
}

impl From<Findings> for Vec<Category> {
    fn from(findings: Findings) -> Self {
        findings.0
    }
}

/// Spans of placeholder tokens already present in `text`.
pub(crate) fn placeholder_spans(text: &str) -> Vec<Range<usize>> {
    placeholder_regex()
        .find_iter(text)
        .map(|m| m.range())
        .collect()
}

/// Whether `span` lies entirely inside one of the placeholder spans.
///
/// A match that only touches or straddles a placeholder still counts.
pub(crate) fn within_placeholder(span: &Range<usize>, placeholders: &[Range<usize>]) -> bool {
    placeholders
        .iter()
        .any(|p| p.start <= span.start && span.end <= p.end)
}

/// Whether `regex` matches `text` anywhere except inside existing placeholders.
fn matches_outside(regex: &Regex, text: &str, placeholders: &[Range<usize>]) -> bool {
    regex
        .find_iter(text)
        .any(|m| !within_placeholder(&m.range(), placeholders))
}

/// Detect every category of sensitive content in `text`.
///
/// Custom rules are checked first, then the built-in patterns in their fixed
/// order. All matchers run; every matching category is reported once.
#[must_use]
pub fn detect(text: &str, rules: &RuleSet) -> Findings {
    let mut findings = Findings::default();
    if text.is_empty() {
        return findings;
    }

    let placeholders = placeholder_spans(text);

    for rule in rules.iter() {
        if let Some(regex) = rule.regex() {
            if matches_outside(regex, text, &placeholders) {
                trace!(category = %Category::CustomRule, "Custom rule matched");
                findings.insert(Category::CustomRule);
            }
        }
    }

    for pattern in builtin_patterns() {
        if matches_outside(pattern.regex(), text, &placeholders) {
            trace!(category = %pattern.category, "Built-in pattern matched");
            findings.insert(pattern.category);
        }
    }

    findings
}
