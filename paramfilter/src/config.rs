//! Engine and request-logger configuration.
//!
//! Both structs deserialize with `#[serde(default)]`, so a host config file
//! only needs to name the settings it changes:
//!
//! ```rust
//! use paramfilter::RequestLogConfig;
//!
//! let config = RequestLogConfig::from_json(r#"{ "filter": { "max_depth": 4 } }"#).unwrap();
//! assert!(config.enabled);
//! assert_eq!(config.filter.max_depth, 4);
//! assert_eq!(config.filter.max_keys, 50);
//! ```

use serde::{Deserialize, Serialize};

use crate::{classify::SensitivePatterns, error::ConfigError};

/// Mapping nesting beyond this depth is replaced by the depth marker.
pub const DEFAULT_MAX_DEPTH: usize = 10;
/// Entries kept per mapping.
pub const DEFAULT_MAX_KEYS: usize = 50;
/// Elements kept per sequence.
pub const DEFAULT_MAX_ITEMS: usize = 100;
/// Top-level keys dropped from every result: framework routing bookkeeping.
pub const DEFAULT_EXCEPTION_KEYS: &[&str] = &["controller", "action", "format"];

/// How sequences count toward the depth limit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceDepth {
    /// A sequence held by a mapping does not add a level; its mapping elements
    /// sit one level below the mapping. A sequence directly inside another
    /// sequence adds one level.
    #[default]
    Transparent,
    /// Every sequence adds one level, like a mapping.
    Counted,
}

/// Settings for [`crate::ParamFilter`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Substrings that mark a key's whole value as sensitive.
    pub key_patterns: SensitivePatterns,
    /// Substrings that mark a string value as sensitive.
    pub value_patterns: SensitivePatterns,
    /// Names removed from the top level of every result.
    pub exception_keys: Vec<String>,
    /// Deepest mapping level that is still traversed.
    pub max_depth: usize,
    /// Entries kept per mapping.
    pub max_keys: usize,
    /// Elements kept per sequence.
    pub max_items: usize,
    /// Depth accounting for sequences.
    pub sequence_depth: SequenceDepth,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            key_patterns: SensitivePatterns::default(),
            value_patterns: SensitivePatterns::default(),
            exception_keys: DEFAULT_EXCEPTION_KEYS
                .iter()
                .map(|key| (*key).to_owned())
                .collect(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_keys: DEFAULT_MAX_KEYS,
            max_items: DEFAULT_MAX_ITEMS,
            sequence_depth: SequenceDepth::default(),
        }
    }
}

impl FilterConfig {
    /// Replaces both key and value patterns.
    #[must_use]
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = SensitivePatterns::new(patterns);
        self.key_patterns = patterns.clone();
        self.value_patterns = patterns;
        self
    }

    /// Replaces the key patterns only.
    #[must_use]
    pub fn with_key_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.key_patterns = SensitivePatterns::new(patterns);
        self
    }

    /// Replaces the value patterns only.
    #[must_use]
    pub fn with_value_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.value_patterns = SensitivePatterns::new(patterns);
        self
    }

    /// Replaces the exception key set.
    #[must_use]
    pub fn with_exception_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exception_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the depth limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the per-mapping entry cap.
    #[must_use]
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys;
        self
    }

    /// Sets the per-sequence element cap.
    #[must_use]
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Sets the sequence depth policy.
    #[must_use]
    pub fn with_sequence_depth(mut self, sequence_depth: SequenceDepth) -> Self {
        self.sequence_depth = sequence_depth;
        self
    }

    /// Rejects zero size caps, which would log every mapping as `{}`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_keys == 0 {
            return Err(ConfigError::ZeroLimit("max_keys"));
        }
        if self.max_items == 0 {
            return Err(ConfigError::ZeroLimit("max_items"));
        }
        Ok(())
    }

    pub(crate) fn is_exception_key(&self, name: &str) -> bool {
        self.exception_keys.iter().any(|key| key == name)
    }
}

/// Settings for [`crate::RequestLogger`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequestLogConfig {
    /// When `false`, requests are not logged at all.
    pub enabled: bool,
    /// Parameter filtering settings.
    pub filter: FilterConfig,
}

impl Default for RequestLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            filter: FilterConfig::default(),
        }
    }
}

impl RequestLogConfig {
    /// Parses and validates a JSON document.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(document)?;
        config.filter.validate()?;
        Ok(config)
    }

    /// Turns request logging on or off.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Replaces the filter settings.
    #[must_use]
    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }
}
