//! Query planning for one grid request.
//!
//! Builds the three statements a DataTable answer needs — total count,
//! filtered count, and the data page — as pure values, so the SQL shapes are
//! testable without a database. The caller-trusted base filter lands in all
//! three; client search terms land only in the filtered count and the data
//! query. Every client-derived value is a `?` binding; column names coming
//! from the descriptor are interpolated only after identifier validation,
//! and columns that fail it silently drop out of search and ordering.

use serde_json::Value;

use super::types::{ColumnSpec, SearchSpec, TableQuery};
use crate::condition::{ConditionFragment, is_valid_identifier};

/// One SQL statement plus its bindings, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub bindings: Vec<Value>,
}

/// The three statements answering one grid request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// `SELECT COUNT(*)` under the base filter only.
    pub count_total: Statement,
    /// `SELECT COUNT(*)` under base filter plus search terms.
    pub count_filtered: Statement,
    /// The data page, with ordering and pagination applied when valid.
    pub data: Statement,
}

/// Render the SELECT column list, appending the extra expression when set.
pub(crate) fn select_list(expression: Option<&str>) -> String {
    match expression {
        Some(e) if !e.is_empty() => format!("*, {e}"),
        _ => "*".to_string(),
    }
}

/// Operator and bound value for one search spec: `REGEXP` with the raw value
/// in regex mode, else `LIKE` with the value wrapped in wildcards.
fn search_term(search: &SearchSpec) -> (&'static str, String) {
    if search.regex {
        ("REGEXP", search.value.clone())
    } else {
        ("LIKE", format!("%{}%", search.value))
    }
}

/// A column participates in search only with a data source, the searchable
/// flag, and a valid identifier.
fn searchable(column: &ColumnSpec) -> bool {
    column.searchable && !column.data.is_empty() && is_valid_identifier(&column.data)
}

/// Build the three statements for one request against `table`.
pub fn build_plan(
    table: &str,
    expression: Option<&str>,
    query: &TableQuery,
    base: &ConditionFragment,
) -> QueryPlan {
    let mut search_parts: Vec<String> = Vec::new();
    let mut search_bindings: Vec<Value> = Vec::new();

    // Global search: one OR-joined group over every searchable column, with
    // the same bound value repeated per participating column.
    if !query.search.value.is_empty() {
        let (operator, bound) = search_term(&query.search);
        let terms: Vec<String> = query
            .columns
            .iter()
            .filter(|c| searchable(c))
            .map(|c| format!("`{}` {operator} ?", c.data))
            .collect();
        if !terms.is_empty() {
            for _ in 0..terms.len() {
                search_bindings.push(Value::String(bound.clone()));
            }
            search_parts.push(format!("({})", terms.join(" OR ")));
        }
    }

    // Per-column searches: independent AND-joined terms, each with its own
    // regex flag.
    for column in &query.columns {
        if searchable(column) && !column.search.value.is_empty() {
            let (operator, bound) = search_term(&column.search);
            search_parts.push(format!("`{}` {operator} ?", column.data));
            search_bindings.push(Value::String(bound));
        }
    }

    let base_where = if base.sql.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", base.sql)
    };

    let final_where = {
        let mut pieces: Vec<String> = Vec::new();
        if !base.sql.is_empty() {
            pieces.push(base.sql.clone());
        }
        pieces.extend(search_parts);
        if pieces.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", pieces.join(" AND "))
        }
    };

    let mut full_bindings = base.bindings.clone();
    full_bindings.extend(search_bindings);

    // Only the first order entry is honored, and only when it references an
    // orderable column with a usable data source.
    let order_sql = query
        .order
        .first()
        .and_then(|order| {
            let idx = usize::try_from(order.column).ok()?;
            let column = query.columns.get(idx)?;
            if !column.orderable || column.data.is_empty() || !is_valid_identifier(&column.data) {
                return None;
            }
            let dir = if order.dir.eq_ignore_ascii_case("asc") {
                "ASC"
            } else {
                "DESC"
            };
            Some(format!(" ORDER BY `{}` {dir}", column.data))
        })
        .unwrap_or_default();

    let limit_sql = if query.length == -1 {
        String::new()
    } else {
        format!(" LIMIT {}, {}", query.start, query.length)
    };

    QueryPlan {
        count_total: Statement {
            sql: format!("SELECT COUNT(*) AS total FROM {table}{base_where}"),
            bindings: base.bindings.clone(),
        },
        count_filtered: Statement {
            sql: format!("SELECT COUNT(*) AS total FROM {table}{final_where}"),
            bindings: full_bindings.clone(),
        },
        data: Statement {
            sql: format!(
                "SELECT {} FROM {table}{final_where}{order_sql}{limit_sql}",
                select_list(expression)
            ),
            bindings: full_bindings,
        },
    }
}
