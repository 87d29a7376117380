//! Classification predicates: is this key, or this value, sensitive?
//!
//! Matching is case-insensitive substring containment over a small ordered
//! list of patterns. No regular expressions.

use serde::{Deserialize, Serialize};

use crate::tree::{ParamKey, ParameterTree};

/// Placeholder substituted for masked values.
pub const FILTERED_PLACEHOLDER: &str = "[FILTERED]";

/// Value stored under [`FILTERED_PLACEHOLDER`] in the depth marker mapping.
pub const MAX_DEPTH_MARKER: &str = "[max_depth_exceeded]";

/// Substrings that mark a key or value as sensitive by default.
pub const DEFAULT_SENSITIVE_PATTERNS: &[&str] = &["password", "secret", "token", "key", "auth"];

/// An ordered, lowercased, de-duplicated set of substrings.
///
/// ```rust
/// use paramfilter::SensitivePatterns;
///
/// let patterns = SensitivePatterns::new(["PIN", "ssn", "pin"]);
/// assert!(patterns.matches("Card_Pin"));
/// assert!(!patterns.matches("username"));
/// assert_eq!(patterns.len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SensitivePatterns {
    patterns: Vec<String>,
}

impl SensitivePatterns {
    /// Builds a pattern set. Patterns are lowercased; empty strings and
    /// duplicates are dropped, first occurrence wins.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref().to_lowercase();
            if !pattern.is_empty() && !normalized.contains(&pattern) {
                normalized.push(pattern);
            }
        }
        Self {
            patterns: normalized,
        }
    }

    /// Returns `true` if the lowercase form of `text` contains any pattern.
    pub fn matches(&self, text: &str) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let lowered = text.to_lowercase();
        self.patterns
            .iter()
            .any(|pattern| lowered.contains(pattern.as_str()))
    }

    /// Number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns `true` if there are no patterns; nothing will match.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Iterates over the normalized patterns.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }
}

impl Default for SensitivePatterns {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVE_PATTERNS)
    }
}

impl From<Vec<String>> for SensitivePatterns {
    fn from(patterns: Vec<String>) -> Self {
        Self::new(patterns)
    }
}

impl From<SensitivePatterns> for Vec<String> {
    fn from(patterns: SensitivePatterns) -> Self {
        patterns.patterns
    }
}

/// Returns `true` if `key` should have its whole value masked.
///
/// Keys that cannot be rendered as text are never filtered.
pub fn should_filter_key(patterns: &SensitivePatterns, key: &ParamKey) -> bool {
    key.coerce().is_ok_and(|name| patterns.matches(&name))
}

/// Masks a string scalar whose content matches `patterns`.
///
/// Everything that is not a string, including mappings and sequences, is
/// returned unchanged.
pub fn filter_value(patterns: &SensitivePatterns, value: ParameterTree) -> ParameterTree {
    match value {
        ParameterTree::String(text) if patterns.matches(&text) => {
            ParameterTree::String(FILTERED_PLACEHOLDER.to_owned())
        }
        other => other,
    }
}
