//! Tests for the delegate path of `ParamFilter::filter_params`.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use paramfilter::{
    DelegateError, DelegateFilter, FilterConfig, KeyListFilter, Mapping, ParamFilter,
    ParameterTree, FILTERED_PLACEHOLDER,
};
use serde_json::json;

fn tree(value: serde_json::Value) -> ParameterTree {
    ParameterTree::from(value)
}

fn delegate<F>(f: F) -> F
where
    F: Fn(&Mapping) -> Result<ParameterTree, DelegateError> + Send + Sync,
{
    f
}

#[test]
fn test_delegate_result_wins_over_manual_rules() {
    let filter = ParamFilter::default().with_delegate(delegate(|params| {
        let mut kept = Mapping::new();
        kept.insert("count", i64::try_from(params.len()).unwrap_or(i64::MAX));
        kept.insert("password", "visible because the host said so");
        Ok(ParameterTree::Mapping(kept))
    }));

    let result = filter.filter_params(&tree(json!({"a": 1, "b": 2})));
    assert_eq!(result["count"], 2_i64);
    assert_eq!(result["password"], "visible because the host said so");
}

#[test]
fn test_exception_keys_removed_from_delegate_result() {
    let filter = ParamFilter::new(FilterConfig::default().with_exception_keys(["a"]))
        .with_delegate(delegate(|_| Ok(tree(json!({"a": 1})))));

    let result = filter.filter_params(&tree(json!({"anything": true})));
    assert!(result.is_empty());
}

#[test]
fn test_failing_delegate_matches_manual_filtering() {
    let input = tree(json!({
        "controller": "sessions",
        "user": {"email": "bob@example.com", "password": "hunter2"},
        "tags": ["a", "my secret"]
    }));

    let manual = ParamFilter::default().filter_manually(&input);
    let filter =
        ParamFilter::default().with_delegate(delegate(|_| Err(DelegateError::failed("boom"))));
    let result = filter.filter_params(&input);

    assert_eq!(ParameterTree::Mapping(result), manual);
}

#[test]
fn test_panicking_delegate_falls_back() {
    let filter = ParamFilter::default().with_delegate(delegate(|_| panic!("filter exploded")));
    let result = filter.filter_params(&tree(json!({"token": "abc", "page": 3})));

    assert_eq!(result["token"], FILTERED_PLACEHOLDER);
    assert_eq!(result["page"], 3_i64);
}

#[test]
fn test_non_mapping_delegate_result_is_empty_not_fallback() {
    for declined in [
        ParameterTree::Null,
        ParameterTree::String("[FILTERED]".into()),
        tree(json!([1, 2, 3])),
    ] {
        let filter = ParamFilter::default().with_delegate(move |_: &Mapping| {
            Ok::<_, DelegateError>(declined.clone())
        });
        assert!(filter
            .filter_params(&tree(json!({"username": "bob"})))
            .is_empty());
    }
}

#[test]
fn test_delegate_not_called_for_non_mapping_input() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let filter = ParamFilter::default().with_delegate(delegate(move |params| {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(ParameterTree::Mapping(params.clone()))
    }));

    assert!(filter.filter_params(&ParameterTree::Integer(1)).is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    filter.filter_params(&tree(json!({"q": "rust"})));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_boxed_errors_are_delegate_failures() {
    let filter = ParamFilter::default().with_delegate(delegate(|_| {
        let parsed: i64 = "not a number".parse().map_err(|err: std::num::ParseIntError| {
            DelegateError::Other(Box::new(err))
        })?;
        Ok(ParameterTree::Integer(parsed))
    }));

    let result = filter.filter_params(&tree(json!({"secret_answer": 42})));
    assert_eq!(result["secret_answer"], FILTERED_PLACEHOLDER);
}

#[test]
fn test_key_list_delegate_has_no_caps() {
    let names = KeyListFilter::from_names(["card_number"]).unwrap();
    let filter = ParamFilter::default().with_delegate(names);

    let ids: Vec<i64> = (0..150).collect();
    let result = filter.filter_params(&tree(json!({
        "card_number": "4111111111111111",
        "password": "not on the host list",
        "ids": ids,
        "action": "pay"
    })));

    assert_eq!(result["card_number"], FILTERED_PLACEHOLDER);
    assert_eq!(result["password"], "not on the host list");
    assert_eq!(result["ids"].as_sequence().unwrap().len(), 150);
    assert!(!result.contains_key("action"));
}

#[test]
fn test_empty_host_list_keeps_manual_filtering() {
    let filter = KeyListFilter::from_names(Vec::<String>::new())
        .map_or_else(ParamFilter::default, |names| {
            ParamFilter::default().with_delegate(names)
        });
    assert!(!filter.has_delegate());

    let result = filter.filter_params(&tree(json!({"password": "x"})));
    assert_eq!(result["password"], FILTERED_PLACEHOLDER);
}

struct Allowlist(&'static [&'static str]);

impl DelegateFilter for Allowlist {
    fn filter(&self, params: &Mapping) -> Result<ParameterTree, DelegateError> {
        let mut kept = params.clone();
        kept.retain(|key, _| key.name().is_some_and(|name| self.0.contains(&name)));
        Ok(ParameterTree::Mapping(kept))
    }
}

#[test]
fn test_shared_delegate_across_filters() {
    let shared: Arc<dyn DelegateFilter> = Arc::new(Allowlist(&["id", "controller"]));
    let strict = ParamFilter::default().with_shared_delegate(shared.clone());
    let lenient = ParamFilter::new(FilterConfig::default().with_exception_keys(Vec::<String>::new()))
        .with_shared_delegate(shared);

    let input = tree(json!({"id": 1, "controller": "users", "email": "bob@example.com"}));
    assert_eq!(strict.filter_params(&input).to_json(), json!({"id": 1}));
    assert_eq!(
        lenient.filter_params(&input).to_json(),
        json!({"id": 1, "controller": "users"})
    );
}
