//! End-to-end tests for the manual filter.
//!
//! These tests exercise the public entrypoints (`filter_params`,
//! `filter_manually`, `filter_value`) against the documented boundaries:
//! masking, depth, size caps, exception keys and non-mapping input.

use std::collections::{BTreeMap, HashMap};

use paramfilter::{
    FilterConfig, Mapping, Opaque, OpaqueValue, ParamFilter, ParamKey, ParameterTree,
    SequenceDepth, FILTERED_PLACEHOLDER,
};
use serde_json::json;

fn tree(value: serde_json::Value) -> ParameterTree {
    ParameterTree::from(value)
}

fn nested(levels: usize) -> ParameterTree {
    let mut current = json!({"leaf": "value"});
    for i in (0..levels).rev() {
        current = json!({ format!("l{i}"): current });
    }
    tree(current)
}

fn contains_depth_marker(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Object(map) => {
            map.get("[FILTERED]") == Some(&json!("[max_depth_exceeded]"))
                || map.values().any(contains_depth_marker)
        }
        serde_json::Value::Array(items) => items.iter().any(contains_depth_marker),
        _ => false,
    }
}

#[test]
fn test_default_key_patterns_mask_whole_values() {
    let filter = ParamFilter::default();
    let result = filter.filter_params(&tree(json!({
        "password": "hunter2",
        "Password_Confirmation": "hunter2",
        "client_secret": {"nested": "object"},
        "access_token": ["a", "b"],
        "api_key": 12345,
        "Authorization": null,
        "username": "bob"
    })));

    for key in [
        "password",
        "Password_Confirmation",
        "client_secret",
        "access_token",
        "api_key",
        "Authorization",
    ] {
        assert_eq!(result[key], FILTERED_PLACEHOLDER, "{key} should be masked");
    }
    assert_eq!(result["username"], "bob");
}

#[test]
fn test_string_values_mentioning_patterns_are_masked() {
    let filter = ParamFilter::default();
    let result = filter.filter_params(&tree(json!({
        "note": "my PASSWORD is hunter2",
        "comment": "nothing to see",
        "count": 42,
        "flag": true,
        "empty": null
    })));

    assert_eq!(result["note"], FILTERED_PLACEHOLDER);
    assert_eq!(result["comment"], "nothing to see");
    assert_eq!(result["count"], 42_i64);
    assert_eq!(result["flag"], true);
    assert!(result["empty"].is_null());
}

#[test]
fn test_filter_value_passes_non_strings_through() {
    let filter = ParamFilter::default();
    assert_eq!(filter.filter_value(ParameterTree::Integer(42)), 42_i64);
    assert_eq!(filter.filter_value(ParameterTree::Bool(true)), true);
    assert_eq!(filter.filter_value(ParameterTree::Null), ParameterTree::Null);
    assert_eq!(
        filter.filter_value(ParameterTree::String("a secret".into())),
        FILTERED_PLACEHOLDER
    );
}

#[test]
fn test_shape_is_preserved() {
    let filter = ParamFilter::default();
    let input = json!({
        "user": {
            "name": "bob",
            "emails": ["a@example.com", "b@example.com"],
            "address": {"city": "Berlin", "zip": "10115"}
        },
        "page": 2
    });
    let result = filter.filter_params(&tree(input.clone()));
    assert_eq!(result.to_json(), input);
}

#[test]
fn test_depth_boundary() {
    let filter = ParamFilter::default();

    let at_limit = filter.filter_params(&nested(10)).to_json();
    assert!(!contains_depth_marker(&at_limit));

    let beyond = filter.filter_params(&nested(11)).to_json();
    assert!(contains_depth_marker(&beyond));

    let mut cursor = &beyond;
    for i in 0..=10 {
        cursor = &cursor[format!("l{i}")];
    }
    assert_eq!(cursor, &json!({"[FILTERED]": "[max_depth_exceeded]"}));
}

#[test]
fn test_custom_depth_limit() {
    let filter = ParamFilter::new(FilterConfig::default().with_max_depth(1));
    let result = filter
        .filter_params(&tree(json!({"a": {"b": {"c": 1}}})))
        .to_json();
    assert_eq!(
        result,
        json!({"a": {"b": {"[FILTERED]": "[max_depth_exceeded]"}}})
    );
}

#[test]
fn test_sequences_do_not_add_depth_by_default() {
    let filter = ParamFilter::new(FilterConfig::default().with_max_depth(2));
    let input = json!({"orders": [{"lines": [{"sku": "A1"}]}]});
    let result = filter.filter_params(&tree(input.clone())).to_json();
    assert_eq!(result, input);
}

#[test]
fn test_counted_sequences_add_depth() {
    let filter = ParamFilter::new(
        FilterConfig::default()
            .with_max_depth(2)
            .with_sequence_depth(SequenceDepth::Counted),
    );
    let result = filter
        .filter_params(&tree(json!({"orders": [{"lines": [{"sku": "A1"}]}]})))
        .to_json();
    assert_eq!(
        result,
        json!({"orders": [{"lines": {"[FILTERED]": "[max_depth_exceeded]"}}]})
    );
}

#[test]
fn test_key_cap() {
    let filter = ParamFilter::default();
    let mut mapping = Mapping::new();
    for i in 0..60 {
        mapping.insert(format!("field_{i:02}"), i);
    }
    let result = filter.filter_params(&ParameterTree::Mapping(mapping));
    assert_eq!(result.len(), 50);
    assert_eq!(result["field_00"], 0_i64);
    assert_eq!(result["field_49"], 49_i64);
    assert!(!result.contains_key("field_50"));
}

#[test]
fn test_exception_keys_count_toward_key_cap() {
    let filter = ParamFilter::default();
    let mut mapping = Mapping::new();
    mapping.insert("controller", "users");
    for i in 0..60 {
        mapping.insert(format!("field_{i:02}"), i);
    }
    let result = filter.filter_params(&ParameterTree::Mapping(mapping));
    assert_eq!(result.len(), 49);
    assert!(!result.contains_key("controller"));
}

#[test]
fn test_item_cap() {
    let filter = ParamFilter::default();
    let ids: Vec<i64> = (0..150).collect();
    let result = filter.filter_params(&tree(json!({ "ids": ids })));
    let kept = result["ids"].as_sequence().unwrap();
    assert_eq!(kept.len(), 100);
    assert_eq!(kept[99], 99_i64);
}

#[test]
fn test_custom_caps() {
    let filter = ParamFilter::new(FilterConfig::default().with_max_keys(2).with_max_items(3));
    let result = filter.filter_params(&tree(json!({
        "a": [1, 2, 3, 4, 5],
        "b": 2,
        "c": 3
    })));
    assert_eq!(result.len(), 2);
    assert_eq!(result["a"].as_sequence().unwrap().len(), 3);
}

#[test]
fn test_exception_keys_only_stripped_at_top_level() {
    let filter = ParamFilter::default();
    let result = filter.filter_params(&tree(json!({
        "controller": "users",
        "action": "create",
        "format": "json",
        "user": {"action": "promote", "format": "csv"}
    })));

    assert_eq!(result.len(), 1);
    assert_eq!(result["user"]["action"], "promote");
    assert_eq!(result["user"]["format"], "csv");
}

#[test]
fn test_custom_exception_keys() {
    let filter = ParamFilter::new(FilterConfig::default().with_exception_keys(["utf8"]));
    let result = filter.filter_params(&tree(json!({"utf8": "✓", "controller": "users"})));
    assert!(!result.contains_key("utf8"));
    assert_eq!(result["controller"], "users");
}

#[test]
fn test_non_mapping_input_yields_empty_mapping() {
    let filter = ParamFilter::default();
    for input in [
        ParameterTree::Null,
        ParameterTree::String("password=hunter2".into()),
        ParameterTree::Integer(7),
        tree(json!([{"a": 1}])),
    ] {
        assert!(filter.filter_params(&input).is_empty());
    }
}

#[test]
fn test_empty_containers() {
    let filter = ParamFilter::default();
    let result = filter.filter_params(&tree(json!({"list": [], "map": {}})));
    assert_eq!(result.to_json(), json!({"list": [], "map": {}}));
    assert!(filter.filter_params(&tree(json!({}))).is_empty());
}

#[test]
fn test_custom_patterns_replace_defaults() {
    let filter = ParamFilter::new(
        FilterConfig::default()
            .with_key_patterns(["ssn"])
            .with_value_patterns(["confidential"]),
    );
    let result = filter.filter_params(&tree(json!({
        "user_ssn": "123-45-6789",
        "password": "hunter2",
        "memo": "CONFIDENTIAL draft"
    })));
    assert_eq!(result["user_ssn"], FILTERED_PLACEHOLDER);
    assert_eq!(result["password"], "hunter2");
    assert_eq!(result["memo"], FILTERED_PLACEHOLDER);
}

#[test]
fn test_symbol_and_integer_keys() {
    let filter = ParamFilter::default();
    let mut mapping = Mapping::new();
    mapping.insert(ParamKey::symbol("auth_header"), "Bearer abc");
    mapping.insert(ParamKey::Integer(7), "seven");
    mapping.insert(ParamKey::symbol("controller"), "users");
    let result = filter.filter_params(&ParameterTree::Mapping(mapping));

    assert_eq!(result["auth_header"], FILTERED_PLACEHOLDER);
    assert_eq!(result.get_key(&ParamKey::Integer(7)).unwrap(), "seven");
    assert!(!result.contains_key("controller"));
}

struct Upload;

impl Opaque for Upload {
    fn type_name(&self) -> &'static str {
        "Upload"
    }

    fn try_to_string(&self) -> Result<String, paramfilter::CoercionError> {
        Err(paramfilter::CoercionError::new("Upload", "binary content"))
    }
}

#[test]
fn test_uncoercible_keys_and_values_pass_through() {
    let filter = ParamFilter::default();
    let file = OpaqueValue::new(Upload);
    let mut mapping = Mapping::new();
    mapping.insert(file.clone(), "plain");
    mapping.insert("avatar", file.clone());
    let result = filter.filter_params(&ParameterTree::Mapping(mapping));

    assert_eq!(result.len(), 2);
    assert_eq!(result.get_key(&ParamKey::Opaque(file.clone())).unwrap(), "plain");
    assert_eq!(result["avatar"], ParameterTree::Opaque(file));
}

#[test]
fn test_std_containers_convert() {
    let filter = ParamFilter::default();

    let mut hash = HashMap::new();
    hash.insert("session_token".to_string(), "abc".to_string());
    let result = filter.filter_params(&paramfilter::IntoParameterTree::into_parameter_tree(hash));
    assert_eq!(result["session_token"], FILTERED_PLACEHOLDER);

    let mut sorted = BTreeMap::new();
    sorted.insert("b", vec![1_u8, 2]);
    sorted.insert("a", vec![3_u8]);
    let result =
        filter.filter_params(&paramfilter::IntoParameterTree::into_parameter_tree(sorted));
    assert_eq!(result.to_json(), json!({"a": [3], "b": [1, 2]}));
}

#[test]
fn test_concurrent_use() {
    let filter = std::sync::Arc::new(ParamFilter::default());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let filter = filter.clone();
            std::thread::spawn(move || {
                let params = ParameterTree::from(json!({"id": i, "password": "x"}));
                filter.filter_params(&params)
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.join().unwrap();
        assert_eq!(result["id"], i64::try_from(i).unwrap());
        assert_eq!(result["password"], FILTERED_PLACEHOLDER);
    }
}
