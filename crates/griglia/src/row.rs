//! Row decoding and parameter binding for MySQL.
//!
//! Queries carry their bindings as `serde_json::Value`s so heterogeneous
//! parameter lists stay uniform across the builder layers; rows come back as
//! JSON objects keyed by column name, decoded per the driver's type metadata.

use serde_json::Value;
use sqlx::mysql::{MySql, MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, Row, TypeInfo};

/// Bind JSON parameter values to a sqlx query dynamically.
pub(crate) fn bind_values<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &[Value],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        match param {
            Value::String(s) => query = query.bind(s.clone()),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    query = query.bind(i);
                } else if let Some(u) = n.as_u64() {
                    query = query.bind(u);
                } else if let Some(f) = n.as_f64() {
                    query = query.bind(f);
                }
            }
            Value::Bool(b) => query = query.bind(*b),
            Value::Null => query = query.bind(Option::<String>::None),
            // Arrays/objects: bind as JSON text
            other => query = query.bind(other.to_string()),
        }
    }
    query
}

/// Serialize a sqlx row to a JSON object using column metadata.
pub(crate) fn row_to_json(row: &MySqlRow) -> Value {
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        let type_name = col.type_info().name();
        let value = match type_name {
            "BOOLEAN" => row
                .try_get::<bool, _>(name)
                .ok()
                .map(Value::Bool)
                .unwrap_or(Value::Null),
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => row
                .try_get::<i64, _>(name)
                .ok()
                .map(|v| Value::Number(v.into()))
                .unwrap_or(Value::Null),
            "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
            | "BIGINT UNSIGNED" => row
                .try_get::<u64, _>(name)
                .ok()
                .map(|v| Value::Number(v.into()))
                .unwrap_or(Value::Null),
            "FLOAT" => row
                .try_get::<f32, _>(name)
                .ok()
                .and_then(|v| serde_json::Number::from_f64(f64::from(v)))
                .map(Value::Number)
                .unwrap_or(Value::Null),
            "DOUBLE" => row
                .try_get::<f64, _>(name)
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            "DATE" => row
                .try_get::<chrono::NaiveDate, _>(name)
                .ok()
                .map(|v| Value::String(v.to_string()))
                .unwrap_or(Value::Null),
            "TIME" => row
                .try_get::<chrono::NaiveTime, _>(name)
                .ok()
                .map(|v| Value::String(v.to_string()))
                .unwrap_or(Value::Null),
            "DATETIME" => row
                .try_get::<chrono::NaiveDateTime, _>(name)
                .ok()
                .map(|v| Value::String(v.format("%Y-%m-%d %H:%M:%S").to_string()))
                .unwrap_or(Value::Null),
            "TIMESTAMP" => row
                .try_get::<chrono::DateTime<chrono::Utc>, _>(name)
                .ok()
                .map(|v| Value::String(v.format("%Y-%m-%d %H:%M:%S").to_string()))
                .unwrap_or(Value::Null),
            "JSON" => row
                .try_get::<Value, _>(name)
                .ok()
                .unwrap_or(Value::Null),
            // VARCHAR, CHAR, TEXT, DECIMAL, ENUM, and everything else → string
            _ => row
                .try_get::<String, _>(name)
                .ok()
                .map(Value::String)
                .unwrap_or(Value::Null),
        };
        map.insert(name.to_string(), value);
    }
    Value::Object(map)
}
