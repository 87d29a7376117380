//! The structured request log record.
//!
//! The host fills a [`RequestEvent`] with what it extracted from the
//! request/response cycle; [`RequestLog::from_event`] filters the parameters
//! and produces the record that is emitted.

use std::{
    error::Error,
    time::{Duration, Instant},
};

use serde::Serialize;

use crate::{
    filter::ParamFilter,
    tree::{IntoParameterTree, Mapping, ParameterTree},
};

/// Status logged for a failed request that carries no status of its own.
pub const DEFAULT_ERROR_STATUS: u16 = 500;
/// Status logged for a completed request that carries no status of its own.
pub const DEFAULT_SUCCESS_STATUS: u16 = 200;

/// An exception raised while serving the request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExceptionInfo {
    /// Short type name of the error, e.g. `ParseIntError`.
    pub class: String,
    /// The error's `Display` output.
    pub message: String,
    /// `Display` output of each `source()` in the chain, outermost first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl ExceptionInfo {
    /// Builds exception info from explicit parts.
    pub fn new(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            message: message.into(),
            causes: Vec::new(),
        }
    }

    /// Captures an error's type name, message and source chain.
    pub fn from_error<E>(error: &E) -> Self
    where
        E: Error + 'static,
    {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }
        Self {
            class: short_type_name::<E>().to_owned(),
            message: error.to_string(),
            causes,
        }
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Raw facts about one request, before filtering.
#[derive(Clone, Debug, Default)]
pub struct RequestEvent {
    /// HTTP method.
    pub method: String,
    /// Request path, without query string.
    pub path: String,
    /// Response status, if a response was produced.
    pub status: Option<u16>,
    /// Time spent serving the request.
    pub duration: Duration,
    /// Unfiltered request parameters.
    pub params: ParameterTree,
    /// Error raised while serving, if any.
    pub exception: Option<ExceptionInfo>,
    /// Request identifier.
    pub request_id: Option<String>,
    /// `Host` of the request.
    pub host: Option<String>,
    /// Client address.
    pub remote_addr: Option<String>,
    /// Negotiated format, e.g. `json`.
    pub format: Option<String>,
}

impl RequestEvent {
    /// Starts an event for `method` and `path`.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Sets the duration to the time elapsed since `started`.
    #[must_use]
    pub fn finished_since(self, started: Instant) -> Self {
        self.with_duration(started.elapsed())
    }

    #[must_use]
    pub fn with_params<P: IntoParameterTree>(mut self, params: P) -> Self {
        self.params = params.into_parameter_tree();
        self
    }

    #[must_use]
    pub fn with_exception(mut self, exception: ExceptionInfo) -> Self {
        self.exception = Some(exception);
        self
    }

    /// Attaches an error as [`ExceptionInfo`].
    #[must_use]
    pub fn with_error<E: Error + 'static>(self, error: &E) -> Self {
        self.with_exception(ExceptionInfo::from_error(error))
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn with_remote_addr(mut self, remote_addr: impl Into<String>) -> Self {
        self.remote_addr = Some(remote_addr.into());
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// The record handed to the log sink.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RequestLog {
    pub method: String,
    pub path: String,
    pub status: u16,
    /// Milliseconds, rounded to two decimals.
    pub duration_ms: f64,
    /// Filtered parameters.
    pub params: Mapping,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<ExceptionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_addr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl RequestLog {
    /// Filters the event's parameters and builds the record.
    ///
    /// A missing status becomes 500 when an exception is attached, 200
    /// otherwise.
    pub fn from_event(event: RequestEvent, filter: &ParamFilter) -> Self {
        let params = filter.filter_params(&event.params);
        let status = event.status.unwrap_or(if event.exception.is_some() {
            DEFAULT_ERROR_STATUS
        } else {
            DEFAULT_SUCCESS_STATUS
        });
        Self {
            method: event.method,
            path: event.path,
            status,
            duration_ms: round_millis(event.duration),
            params,
            exception: event.exception,
            request_id: event.request_id,
            host: event.host,
            remote_addr: event.remote_addr,
            format: event.format,
        }
    }

    /// Returns `true` if an exception was recorded.
    pub fn is_failure(&self) -> bool {
        self.exception.is_some()
    }
}

fn round_millis(duration: Duration) -> f64 {
    (duration.as_secs_f64() * 100_000.0).round() / 100.0
}
