//! Emitting filtered parameters and request records through `slog`.
//!
//! This module connects the engine to `slog`:
//! - [`FilteredJson`] is a `slog::Value` carrying already-filtered parameters
//!   as nested JSON via `slog`'s nested-value support.
//! - [`RequestLog`] implements `slog::KV`, one key per record field.
//! - [`RequestLogger`] filters, builds and emits one record per request.
//!
//! Logging is infallible from the caller's point of view; drain errors are
//! the drain's business.
//!
//! It does not configure drains or formats.

use serde_json::Value as JsonValue;
use slog::{
    error, info, o, Key, Logger, Record, Result as SlogResult, Serializer, Value as SlogValue, KV,
};

use crate::{
    config::RequestLogConfig,
    delegate::DelegateFilter,
    filter::ParamFilter,
    record::{RequestEvent, RequestLog},
    tree::IntoParameterTree,
};

/// A `slog::Value` that emits filtered parameters as structured JSON.
///
/// Only ever built from the output of [`ParamFilter::filter_params`], so the
/// raw parameters are never reachable from a log statement.
#[derive(Clone, Debug)]
pub struct FilteredJson {
    value: JsonValue,
}

impl FilteredJson {
    fn new(value: JsonValue) -> Self {
        Self { value }
    }

    /// The filtered JSON.
    pub fn as_json(&self) -> &JsonValue {
        &self.value
    }
}

impl SlogValue for FilteredJson {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.value.clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}

/// Converts parameters into a `slog::Value` that logs their filtered form.
///
/// ```ignore
/// use paramfilter::slog::IntoFilteredJson;
///
/// info!(logger, "signup"; "params" => form.into_filtered_json(&filter));
/// ```
pub trait IntoFilteredJson: IntoParameterTree + Sized {
    /// Filters `self` with `filter` and wraps the resulting mapping.
    fn into_filtered_json(self, filter: &ParamFilter) -> FilteredJson {
        let tree = self.into_parameter_tree();
        FilteredJson::new(filter.filter_params(&tree).to_json())
    }
}

impl<T> IntoFilteredJson for T where T: IntoParameterTree {}

impl KV for RequestLog {
    fn serialize(&self, record: &Record<'_>, serializer: &mut dyn Serializer) -> SlogResult {
        serializer.emit_str("method", &self.method)?;
        serializer.emit_str("path", &self.path)?;
        serializer.emit_u16("status", self.status)?;
        serializer.emit_f64("duration_ms", self.duration_ms)?;
        SlogValue::serialize(
            &FilteredJson::new(self.params.to_json()),
            record,
            "params",
            serializer,
        )?;
        if let Some(exception) = &self.exception {
            let nested = slog::Serde(exception.clone());
            SlogValue::serialize(&nested, record, "exception", serializer)?;
        }
        for (key, value) in [
            ("request_id", &self.request_id),
            ("host", &self.host),
            ("remote_addr", &self.remote_addr),
            ("format", &self.format),
        ] {
            if let Some(value) = value {
                serializer.emit_str(key, value)?;
            }
        }
        Ok(())
    }
}

struct BorrowedRecord<'a>(&'a RequestLog);

impl KV for BorrowedRecord<'_> {
    fn serialize(&self, record: &Record<'_>, serializer: &mut dyn Serializer) -> SlogResult {
        KV::serialize(self.0, record, serializer)
    }
}

/// Filters request parameters and emits one structured record per request.
///
/// Completed requests log at `info`; requests with an exception log at
/// `error`. A disabled logger does nothing.
#[derive(Clone, Debug)]
pub struct RequestLogger {
    enabled: bool,
    filter: ParamFilter,
    logger: Logger,
}

impl RequestLogger {
    /// Builds a logger writing to `logger`.
    ///
    /// The engine's own diagnostics go to a child logger tagged
    /// `component = "param_filter"`.
    pub fn new(logger: Logger, config: RequestLogConfig) -> Self {
        let filter = ParamFilter::new(config.filter)
            .with_logger(logger.new(o!("component" => "param_filter")));
        Self {
            enabled: config.enabled,
            filter,
            logger,
        }
    }

    /// Installs a delegate filter on the underlying engine.
    #[must_use]
    pub fn with_delegate<D>(mut self, delegate: D) -> Self
    where
        D: DelegateFilter + 'static,
    {
        let filter = std::mem::take(&mut self.filter);
        self.filter = filter.with_delegate(delegate);
        self
    }

    /// Replaces the engine.
    ///
    /// The engine's diagnostics are routed to this logger's
    /// `component = "param_filter"` child, replacing any logger it carried.
    #[must_use]
    pub fn with_filter(mut self, filter: ParamFilter) -> Self {
        self.filter = filter.with_logger(self.logger.new(o!("component" => "param_filter")));
        self
    }

    /// The engine used for parameters.
    pub fn filter(&self) -> &ParamFilter {
        &self.filter
    }

    /// Returns `false` if logging is turned off.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Filters, builds and emits the record for `event`.
    ///
    /// Returns the emitted record, or `None` when disabled.
    pub fn log(&self, event: RequestEvent) -> Option<RequestLog> {
        if !self.enabled {
            return None;
        }
        let record = RequestLog::from_event(event, &self.filter);
        if record.is_failure() {
            error!(self.logger, "{} {} failed", record.method, record.path; BorrowedRecord(&record));
        } else {
            info!(self.logger, "{} {}", record.method, record.path; BorrowedRecord(&record));
        }
        Some(record)
    }
}
