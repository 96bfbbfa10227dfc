//! Sensitive-content detection and redaction.
//!
//! This module is the pure half of the guard:
//!
//! - **Built-in patterns**: email addresses, `sk_live_`/`sk_test_` keys,
//!   JWT-shaped tokens, dotted-quad addresses and PEM private key blocks.
//!
//! - **Custom rules**: user literals matched as whole words, ignoring case.
//!
//! - **Detection and redaction**: both run custom rules first and then the
//!   built-in patterns in a fixed order. Placeholders already in the text are
//!   never matched again.
//!
//! # Example
//!
//! ```
//! use pasteguard::privacy::{detect, redact, Category, RuleSet};
//!
//! let rules = RuleSet::new(["project falcon"]);
//! let text = "Project Falcon notes for a@b.com";
//!
//! let findings = detect(text, &rules);
//! assert_eq!(findings.categories(), &[Category::CustomRule, Category::Email]);
//!
//! assert_eq!(redact(text, &rules), "[REDACTED] notes for [REDACTED_EMAIL]");
//! ```

mod detector;
mod patterns;
mod redactor;
mod rules;

pub use detector::{detect, Findings};
pub use patterns::{builtin_patterns, placeholder_regex, Category, SensitivePattern};
pub use redactor::redact;
pub use rules::{CustomRule, RuleSet};
