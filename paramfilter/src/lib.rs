//! Parameter redaction for request logging.
//!
//! Request parameters arrive as a [`ParameterTree`]: nested mappings and
//! sequences of scalars, keyed by text, symbols, integers or opaque host
//! values. Before a request is logged, [`ParamFilter::filter_params`] turns the
//! tree into a sanitized [`Mapping`]:
//! - values under keys containing a sensitive pattern become `"[FILTERED]"`,
//! - string values containing a sensitive pattern become `"[FILTERED]"`,
//! - mappings nested deeper than `max_depth` collapse to a marker,
//! - mappings and sequences are capped at `max_keys` / `max_items`,
//! - routing keys (`controller`, `action`, `format`) are dropped at the top.
//!
//! A host filter can be installed as a [`DelegateFilter`]; the engine prefers
//! it and falls back to its own rules when it fails. Filtering never fails and
//! never panics out to the caller.
//!
//! [`RequestLogger`] builds one [`RequestLog`] per request and emits it through
//! `slog`.
//!
//! The `Params` derive macro lives in `paramfilter-derive` and is re-exported
//! when the `derive` feature is enabled.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::needless_ifs,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::future_not_send,
    clippy::option_if_let_else,
    clippy::from_over_into,
    clippy::manual_inspect
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[cfg(feature = "derive")]
pub use paramfilter_derive::Params;

#[allow(unused_extern_crates)]
extern crate self as paramfilter;

// Module declarations
mod classify;
mod config;
mod delegate;
mod error;
mod filter;
mod record;
pub mod slog;
mod tree;

// Re-exports
pub use classify::{
    filter_value, should_filter_key, SensitivePatterns, DEFAULT_SENSITIVE_PATTERNS,
    FILTERED_PLACEHOLDER, MAX_DEPTH_MARKER,
};
pub use config::{
    FilterConfig, RequestLogConfig, SequenceDepth, DEFAULT_EXCEPTION_KEYS, DEFAULT_MAX_DEPTH,
    DEFAULT_MAX_ITEMS, DEFAULT_MAX_KEYS,
};
pub use delegate::{DelegateFilter, KeyListFilter};
pub use error::{CoercionError, ConfigError, DelegateError};
pub use filter::ParamFilter;
pub use record::{
    ExceptionInfo, RequestEvent, RequestLog, DEFAULT_ERROR_STATUS, DEFAULT_SUCCESS_STATUS,
};
pub use crate::slog::{FilteredJson, IntoFilteredJson, RequestLogger};
pub use tree::{IntoParameterTree, Mapping, Opaque, OpaqueValue, ParamKey, ParameterTree};
