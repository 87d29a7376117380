//! The redaction engine.
//!
//! [`ParamFilter::filter_params`] is the entrypoint used per request. It asks
//! the delegate first, if one is installed, and falls back to the manual
//! recursive filter when the delegate fails. Nothing here returns an error or
//! panics: every failure ends in a (possibly empty) mapping.
//!
//! Manual filtering rules:
//!
//! | Input | Result |
//! |-------|--------|
//! | deeper than `max_depth` | `{"[FILTERED]": "[max_depth_exceeded]"}` |
//! | mapping | first `max_keys` entries; sensitive keys masked, others recursed |
//! | sequence | first `max_items` elements, each handled like a mapping value |
//! | string | masked if its content matches a value pattern |
//! | other scalar | unchanged |

use std::{
    any::Any,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use slog::{debug, o, Discard, Logger};

use crate::{
    classify::{self, FILTERED_PLACEHOLDER, MAX_DEPTH_MARKER},
    config::{FilterConfig, SequenceDepth},
    delegate::DelegateFilter,
    error::DelegateError,
    tree::{Mapping, ParamKey, ParameterTree},
};

/// Sanitizes request parameters before they are logged.
///
/// Immutable once built; share it across request handlers by reference or
/// behind an `Arc`.
///
/// ```rust
/// use paramfilter::{ParamFilter, ParameterTree};
/// use serde_json::json;
///
/// let filter = ParamFilter::default();
/// let params = ParameterTree::from(json!({
///     "controller": "sessions",
///     "user": {"email": "bob@example.com", "password": "hunter2"}
/// }));
///
/// let filtered = filter.filter_params(&params);
/// assert!(!filtered.contains_key("controller"));
/// assert_eq!(filtered["user"]["password"], "[FILTERED]");
/// assert_eq!(filtered["user"]["email"], "bob@example.com");
/// ```
#[derive(Clone)]
pub struct ParamFilter {
    config: FilterConfig,
    delegate: Option<Arc<dyn DelegateFilter>>,
    logger: Logger,
}

impl Default for ParamFilter {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

impl fmt::Debug for ParamFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamFilter")
            .field("config", &self.config)
            .field("delegate", &self.delegate.is_some())
            .finish_non_exhaustive()
    }
}

impl ParamFilter {
    /// Builds an engine with no delegate and a discarding logger.
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            delegate: None,
            logger: Logger::root(Discard, o!()),
        }
    }

    /// Installs a delegate filter.
    #[must_use]
    pub fn with_delegate<D>(self, delegate: D) -> Self
    where
        D: DelegateFilter + 'static,
    {
        self.with_shared_delegate(Arc::new(delegate))
    }

    /// Installs a delegate filter that is shared with other owners.
    #[must_use]
    pub fn with_shared_delegate(mut self, delegate: Arc<dyn DelegateFilter>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// Logger for fallback diagnostics (delegate failures).
    #[must_use]
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Returns `true` if a delegate is installed.
    pub fn has_delegate(&self) -> bool {
        self.delegate.is_some()
    }

    /// Filters one request's parameters for logging.
    ///
    /// - Non-mapping input yields an empty mapping.
    /// - With a delegate: a mapping result is returned minus exception keys;
    ///   any other result yields an empty mapping; an error or panic falls
    ///   back to manual filtering of `params`.
    /// - Without a delegate: manual filtering.
    pub fn filter_params(&self, params: &ParameterTree) -> Mapping {
        let ParameterTree::Mapping(mapping) = params else {
            return Mapping::new();
        };
        let Some(delegate) = &self.delegate else {
            return self.filter_top_level(mapping);
        };

        match invoke_delegate(delegate.as_ref(), mapping) {
            Ok(ParameterTree::Mapping(filtered)) => self.strip_exception_keys(filtered),
            Ok(_) => {
                debug!(self.logger, "delegate filter returned a non-mapping result; logging no parameters");
                Mapping::new()
            }
            Err(err) => {
                debug!(self.logger, "delegate filter failed; filtering parameters manually"; "error" => %err);
                self.filter_top_level(mapping)
            }
        }
    }

    /// Runs the manual filter from depth 0 and strips top-level exception
    /// keys from a mapping result.
    pub fn filter_manually(&self, params: &ParameterTree) -> ParameterTree {
        match self.filter_at(params, 0) {
            ParameterTree::Mapping(mapping) => {
                ParameterTree::Mapping(self.strip_exception_keys(mapping))
            }
            other => other,
        }
    }

    /// Runs the manual filter on `tree` as if it sat at `depth`.
    ///
    /// Exception keys are not stripped; nested occurrences are ordinary keys.
    pub fn filter_at(&self, tree: &ParameterTree, depth: usize) -> ParameterTree {
        if depth > self.config.max_depth {
            return ParameterTree::Mapping(depth_marker());
        }
        match tree {
            ParameterTree::Mapping(mapping) => {
                ParameterTree::Mapping(self.filter_mapping(mapping, depth))
            }
            ParameterTree::Sequence(items) => ParameterTree::Sequence(self.filter_items(items, depth)),
            scalar => self.filter_value(scalar.clone()),
        }
    }

    /// Returns `true` if the whole value under `key` must be masked.
    pub fn should_filter_key(&self, key: &ParamKey) -> bool {
        classify::should_filter_key(&self.config.key_patterns, key)
    }

    /// Masks a string whose content matches a value pattern; everything else
    /// is returned unchanged.
    pub fn filter_value(&self, value: ParameterTree) -> ParameterTree {
        classify::filter_value(&self.config.value_patterns, value)
    }

    fn filter_top_level(&self, mapping: &Mapping) -> Mapping {
        self.strip_exception_keys(self.filter_mapping(mapping, 0))
    }

    fn filter_mapping(&self, mapping: &Mapping, depth: usize) -> Mapping {
        if depth > self.config.max_depth {
            return depth_marker();
        }
        let mut filtered = Mapping::with_capacity(mapping.len().min(self.config.max_keys));
        for (key, value) in mapping.iter().take(self.config.max_keys) {
            let value = if self.should_filter_key(key) {
                ParameterTree::String(FILTERED_PLACEHOLDER.to_owned())
            } else {
                self.filter_child(value, depth, false)
            };
            filtered.push(key.clone(), value);
        }
        filtered
    }

    fn filter_items(&self, items: &[ParameterTree], depth: usize) -> Vec<ParameterTree> {
        items
            .iter()
            .take(self.config.max_items)
            .map(|item| self.filter_child(item, depth, true))
            .collect()
    }

    /// Filters a value held by a container at `depth`.
    fn filter_child(&self, value: &ParameterTree, depth: usize, in_sequence: bool) -> ParameterTree {
        match value {
            ParameterTree::Mapping(mapping) => {
                ParameterTree::Mapping(self.filter_mapping(mapping, depth + 1))
            }
            ParameterTree::Sequence(items) => {
                // Sequences of sequences always count, or nesting would be unbounded.
                if in_sequence || self.config.sequence_depth == SequenceDepth::Counted {
                    self.filter_at(value, depth + 1)
                } else {
                    ParameterTree::Sequence(self.filter_items(items, depth))
                }
            }
            scalar => self.filter_value(scalar.clone()),
        }
    }

    fn strip_exception_keys(&self, mut mapping: Mapping) -> Mapping {
        mapping.retain(|key, _| !key.name().is_some_and(|name| self.config.is_exception_key(name)));
        mapping
    }
}

fn depth_marker() -> Mapping {
    let mut marker = Mapping::with_capacity(1);
    marker.push(
        ParamKey::from(FILTERED_PLACEHOLDER),
        ParameterTree::String(MAX_DEPTH_MARKER.to_owned()),
    );
    marker
}

fn invoke_delegate(
    delegate: &dyn DelegateFilter,
    params: &Mapping,
) -> Result<ParameterTree, DelegateError> {
    panic::catch_unwind(AssertUnwindSafe(|| delegate.filter(params)))
        .unwrap_or_else(|payload| Err(DelegateError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
