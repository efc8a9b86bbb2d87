//! DataTable wire protocol types.
//!
//! The request descriptor mirrors what grid widgets send:
//! `draw`/`start`/`length`, a global search, per-column definitions with
//! their own searches, and an ordering list. Requests that arrive flattened
//! (form-urlencoded) carry every scalar as a string, so the numeric and
//! boolean fields here deserialize leniently: native JSON scalars and their
//! string renderings are both accepted.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One paginated/filtered/sorted grid request, immutable after hydration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TableQuery {
    /// Echo counter from the client.
    #[serde(deserialize_with = "de_count")]
    pub draw: i64,

    /// First row of the requested page.
    #[serde(deserialize_with = "de_count")]
    pub start: i64,

    /// Page size; -1 means "return all matching rows".
    #[serde(deserialize_with = "de_limit")]
    pub length: i64,

    /// Global search applied to every searchable column.
    pub search: SearchSpec,

    /// Requested ordering; only the first entry is honored.
    pub order: Vec<OrderSpec>,

    /// Column definitions, in client order.
    pub columns: Vec<ColumnSpec>,
}

impl Default for TableQuery {
    fn default() -> Self {
        Self {
            draw: 0,
            start: 0,
            length: -1,
            search: SearchSpec::default(),
            order: Vec::new(),
            columns: Vec::new(),
        }
    }
}

/// A search value plus the regex/substring mode flag.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchSpec {
    #[serde(deserialize_with = "de_text")]
    pub value: String,

    /// True selects `REGEXP` with the raw value; false selects `LIKE` with
    /// the value wrapped in `%...%`.
    #[serde(deserialize_with = "de_flag")]
    pub regex: bool,
}

/// One ordering request: a column index and a direction.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct OrderSpec {
    #[serde(deserialize_with = "de_count")]
    pub column: i64,

    /// `ASC` only when this is "asc" (case-insensitive), else `DESC`.
    #[serde(deserialize_with = "de_text")]
    pub dir: String,
}

/// One column definition from the client.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColumnSpec {
    /// Backing column name; empty means the column has no data source and
    /// never participates in search or ordering.
    #[serde(deserialize_with = "de_text")]
    pub data: String,

    #[serde(deserialize_with = "de_flag")]
    pub searchable: bool,

    #[serde(deserialize_with = "de_flag")]
    pub orderable: bool,

    /// This column's own search, independent of the global one.
    pub search: SearchSpec,
}

/// The grid response: counts, one page of rows, and the echoed draw.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridResponse {
    pub draw: i64,

    #[serde(rename = "recordsTotal")]
    pub records_total: i64,

    #[serde(rename = "recordsFiltered")]
    pub records_filtered: i64,

    pub data: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GridResponse {
    /// The degraded zero-count response returned when a request fails.
    pub(crate) fn degraded(draw: i64, message: String) -> Self {
        Self {
            draw,
            records_total: 0,
            records_filtered: 0,
            data: Vec::new(),
            error: Some(message),
        }
    }
}

/// Lenient integer: accepts numbers and numeric strings.
pub(crate) fn lenient_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn de_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_i64(&value).unwrap_or(0))
}

/// Like `de_count`, but an absent-ish value means "no limit" (-1).
fn de_limit<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_i64(&value).unwrap_or(-1))
}

fn de_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_i64().is_some_and(|i| i != 0),
        _ => false,
    })
}

fn de_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hydrated_string_scalars_parse() {
        let query: TableQuery = serde_json::from_value(json!({
            "draw": "1",
            "start": "0",
            "length": "10",
            "search": {"value": "", "regex": "false"},
            "columns": [
                {"data": "name", "searchable": "true", "orderable": "true"},
            ],
            "order": [{"column": "0", "dir": "asc"}],
        }))
        .unwrap();

        assert_eq!(query.draw, 1);
        assert_eq!(query.start, 0);
        assert_eq!(query.length, 10);
        assert!(!query.search.regex);
        assert!(query.columns[0].searchable);
        assert!(query.columns[0].orderable);
        assert_eq!(query.order[0].column, 0);
        assert_eq!(query.order[0].dir, "asc");
    }

    #[test]
    fn native_scalars_parse_too() {
        let query: TableQuery = serde_json::from_value(json!({
            "draw": 3,
            "start": 20,
            "length": 10,
            "search": {"value": "abc", "regex": true},
        }))
        .unwrap();

        assert_eq!(query.draw, 3);
        assert_eq!(query.start, 20);
        assert!(query.search.regex);
        assert_eq!(query.search.value, "abc");
    }

    #[test]
    fn missing_fields_take_defaults() {
        let query: TableQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!(query.draw, 0);
        assert_eq!(query.start, 0);
        assert_eq!(query.length, -1);
        assert!(query.search.value.is_empty());
        assert!(query.order.is_empty());
        assert!(query.columns.is_empty());
    }

    #[test]
    fn empty_length_means_unbounded() {
        let query: TableQuery = serde_json::from_value(json!({"length": ""})).unwrap();
        assert_eq!(query.length, -1);
    }

    #[test]
    fn null_column_data_becomes_empty() {
        let query: TableQuery = serde_json::from_value(json!({
            "columns": [{"data": null, "searchable": "true"}],
        }))
        .unwrap();
        assert!(query.columns[0].data.is_empty());
    }

    #[test]
    fn response_serializes_wire_field_names() {
        let response = GridResponse {
            draw: 2,
            records_total: 25,
            records_filtered: 3,
            data: vec![json!({"id": 1})],
            error: None,
        };
        let encoded = serde_json::to_value(&response).unwrap();
        assert_eq!(
            encoded,
            json!({
                "draw": 2,
                "recordsTotal": 25,
                "recordsFiltered": 3,
                "data": [{"id": 1}],
            })
        );
    }

    #[test]
    fn response_error_field_present_when_set() {
        let response = GridResponse::degraded(1, "boom".to_string());
        let encoded = serde_json::to_value(&response).unwrap();
        assert_eq!(encoded["error"], json!("boom"));
        assert_eq!(encoded["recordsTotal"], json!(0));
        assert_eq!(encoded["data"], json!([]));
    }
}
