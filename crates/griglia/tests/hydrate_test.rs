#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Request hydration tests.
//!
//! Exercises the public hydration API with realistic grid requests, plus the
//! round-trip property: flattening a nested descriptor and hydrating it
//! again reproduces the original.

use griglia::hydrate;
use serde_json::{Map, Value, json};

fn flat(pairs: &[(&str, &str)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), Value::String((*v).to_string())))
        .collect()
}

/// Re-encode a nested value as bracket-notated flat keys (scalar leaves only).
fn flatten(prefix: &str, value: &Value, out: &mut Map<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}[{key}]")
                };
                flatten(&path, child, out);
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                flatten(&format!("{prefix}[{idx}]"), child, out);
            }
        }
        scalar => {
            out.insert(prefix.to_string(), scalar.clone());
        }
    }
}

#[test]
fn full_grid_request_hydrates() {
    let result = hydrate(&flat(&[
        ("draw", "1"),
        ("start", "0"),
        ("length", "10"),
        ("search[value]", "abc"),
        ("search[regex]", "false"),
        ("order[0][column]", "0"),
        ("order[0][dir]", "asc"),
        ("columns[0][data]", "name"),
        ("columns[0][searchable]", "true"),
        ("columns[0][orderable]", "true"),
        ("columns[0][search][value]", ""),
        ("columns[0][search][regex]", "false"),
        ("columns[1][data]", "email"),
        ("columns[1][searchable]", "true"),
        ("columns[1][orderable]", "false"),
    ]));

    assert_eq!(result["draw"], json!("1"));
    assert_eq!(result["search"], json!({"value": "abc", "regex": "false"}));
    assert_eq!(result["order"], json!([{"column": "0", "dir": "asc"}]));
    assert_eq!(result["columns"][0]["data"], json!("name"));
    assert_eq!(result["columns"][0]["search"]["regex"], json!("false"));
    assert_eq!(result["columns"][1]["orderable"], json!("false"));
}

#[test]
fn hydrate_after_flatten_round_trips() {
    let descriptor = json!({
        "draw": "2",
        "start": "20",
        "length": "10",
        "search": {"value": "rust", "regex": "false"},
        "order": [{"column": "1", "dir": "desc"}],
        "columns": [
            {"data": "id", "searchable": "false", "orderable": "true",
             "search": {"value": "", "regex": "false"}},
            {"data": "name", "searchable": "true", "orderable": "true",
             "search": {"value": "ab", "regex": "false"}},
        ],
    });

    let mut flattened = Map::new();
    flatten("", &descriptor, &mut flattened);
    assert!(flattened.contains_key("columns[1][search][value]"));

    assert_eq!(hydrate(&flattened), descriptor);
}

#[test]
fn already_nested_request_passes_through() {
    let mut request = Map::new();
    request.insert("draw".to_string(), json!(1));
    request.insert(
        "columns".to_string(),
        json!([{"data": "name", "searchable": "true"}]),
    );

    let result = hydrate(&request);
    assert_eq!(result["draw"], json!(1));
    assert_eq!(result["columns"][0]["data"], json!("name"));
}
