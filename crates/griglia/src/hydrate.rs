//! Request hydration: bracket-notated flat mappings to nested values.
//!
//! Grid clients submit form-urlencoded requests whose keys flatten the
//! descriptor structure, e.g. `columns[0][data]=name`. Hydration rebuilds the
//! nested form: each bracket segment becomes a field, and a segment whose
//! *following* segment is a decimal numeral produces an array instead of an
//! object. Values pass through untouched, so an already-nested mapping
//! hydrates to itself.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Extracts key segments: `columns[0][data]` yields `columns`, `0`, `data`.
///
/// # Panics
///
/// Panics if the hard-coded regex literal is invalid (impossible in practice).
#[allow(clippy::expect_used)]
static KEY_SEGMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\[\]]+").expect("valid regex literal"));

/// Largest array index a key may address. A sparse write below this cap
/// null-fills the gap; anything larger is skipped so a hostile index cannot
/// force a huge allocation.
const MAX_ARRAY_INDEX: usize = 1024;

/// Convert a flat, bracket-notated mapping into a nested value.
///
/// Keys with no extractable segments are skipped silently; on key collision
/// the last write wins. No descriptor validation happens here — consumers
/// decide what the nested value must contain.
pub fn hydrate(flat: &Map<String, Value>) -> Value {
    let mut result = Value::Object(Map::new());

    for (raw_key, value) in flat {
        let segments: Vec<&str> = KEY_SEGMENTS
            .find_iter(raw_key)
            .map(|m| m.as_str())
            .collect();
        if segments.is_empty() {
            continue;
        }
        insert_path(&mut result, &segments, value.clone());
    }

    result
}

/// True when the segment is a decimal numeral (selects array semantics for
/// the container holding it).
fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

fn parse_index(segment: &str) -> Option<usize> {
    let idx = segment.parse::<usize>().ok()?;
    (idx <= MAX_ARRAY_INDEX).then_some(idx)
}

/// Walk `segments` from the root, creating containers as needed, and assign
/// `value` at the leaf.
///
/// The container type is fixed by whichever key creates it first: a numeric
/// segment written into an existing object becomes a plain string key, and a
/// non-numeric segment aimed at an existing array is skipped. Scalar slots in
/// the middle of a path are replaced by the container the path needs.
fn insert_path(root: &mut Value, segments: &[&str], value: Value) {
    let mut current = root;

    for i in 0..segments.len() {
        let segment = segments[i];
        let last = i == segments.len() - 1;

        match current {
            Value::Object(map) => {
                if last {
                    map.insert(segment.to_string(), value);
                    return;
                }
                let next_is_index = is_index(segments[i + 1]);
                let slot = map
                    .entry(segment.to_string())
                    .or_insert_with(|| empty_container(next_is_index));
                if !matches!(slot, Value::Object(_) | Value::Array(_)) {
                    *slot = empty_container(next_is_index);
                }
                current = slot;
            }
            Value::Array(items) => {
                let Some(idx) = parse_index(segment) else {
                    return;
                };
                if items.len() <= idx {
                    items.resize(idx + 1, Value::Null);
                }
                if last {
                    items[idx] = value;
                    return;
                }
                let next_is_index = is_index(segments[i + 1]);
                let slot = &mut items[idx];
                if !matches!(slot, Value::Object(_) | Value::Array(_)) {
                    *slot = empty_container(next_is_index);
                }
                current = slot;
            }
            // Unreachable in practice: scalar slots are replaced above.
            _ => return,
        }
    }
}

fn empty_container(array: bool) -> Value {
    if array {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flat(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), Value::String((*v).to_string())))
            .collect()
    }

    #[test]
    fn simple_keys_pass_through() {
        let result = hydrate(&flat(&[("draw", "1"), ("start", "0")]));
        assert_eq!(result, json!({"draw": "1", "start": "0"}));
    }

    #[test]
    fn bracket_keys_nest() {
        let result = hydrate(&flat(&[("search[value]", "abc"), ("search[regex]", "false")]));
        assert_eq!(result, json!({"search": {"value": "abc", "regex": "false"}}));
    }

    #[test]
    fn numeric_segment_builds_array() {
        let result = hydrate(&flat(&[
            ("columns[0][data]", "id"),
            ("columns[1][data]", "name"),
        ]));
        assert_eq!(
            result,
            json!({"columns": [{"data": "id"}, {"data": "name"}]})
        );
    }

    #[test]
    fn deep_nesting() {
        let result = hydrate(&flat(&[("columns[0][search][value]", "x")]));
        assert_eq!(result, json!({"columns": [{"search": {"value": "x"}}]}));
    }

    #[test]
    fn sparse_index_null_fills() {
        let result = hydrate(&flat(&[("order[2][column]", "1")]));
        assert_eq!(
            result,
            json!({"order": [null, null, {"column": "1"}]})
        );
    }

    #[test]
    fn oversized_index_skipped() {
        let result = hydrate(&flat(&[("columns[999999999][data]", "id")]));
        assert_eq!(result, json!({"columns": []}));
    }

    #[test]
    fn unparsable_key_skipped() {
        let mut input = flat(&[("draw", "1")]);
        input.insert("[]".to_string(), Value::String("ghost".to_string()));
        let result = hydrate(&input);
        assert_eq!(result, json!({"draw": "1"}));
    }

    #[test]
    fn last_write_wins() {
        // Map iteration preserves insertion order (serde_json default).
        let mut input = Map::new();
        input.insert("draw".to_string(), json!("1"));
        input.insert("draw ".to_string(), json!("ignored-different-key"));
        input.insert("search[value]".to_string(), json!("first"));
        input.insert("search[value]".to_string(), json!("second"));
        let result = hydrate(&input);
        assert_eq!(result["search"]["value"], json!("second"));
    }

    #[test]
    fn nested_values_pass_through_verbatim() {
        let mut input = Map::new();
        input.insert("search".to_string(), json!({"value": "abc", "regex": "true"}));
        input.insert("draw".to_string(), json!(3));
        let result = hydrate(&input);
        assert_eq!(
            result,
            json!({"search": {"value": "abc", "regex": "true"}, "draw": 3})
        );
    }

    #[test]
    fn mixed_siblings_keep_first_container_type() {
        // `columns` is created as an array by the first key; the later
        // non-numeric segment cannot address an array and is skipped.
        let mut input = Map::new();
        input.insert("columns[0][data]".to_string(), json!("id"));
        input.insert("columns[extra]".to_string(), json!("x"));
        let result = hydrate(&input);
        assert_eq!(result, json!({"columns": [{"data": "id"}]}));
    }

    #[test]
    fn numeric_key_into_object_becomes_string_key() {
        let mut input = Map::new();
        input.insert("meta[label]".to_string(), json!("a"));
        input.insert("meta[0]".to_string(), json!("b"));
        let result = hydrate(&input);
        assert_eq!(result, json!({"meta": {"label": "a", "0": "b"}}));
    }

    #[test]
    fn scalar_slot_replaced_by_container() {
        let mut input = Map::new();
        input.insert("search".to_string(), json!("oops"));
        input.insert("search[value]".to_string(), json!("abc"));
        let result = hydrate(&input);
        assert_eq!(result, json!({"search": {"value": "abc"}}));
    }
}
