//! The table handle: CRUD builders, the DataTable engine, and schema lookup.
//!
//! One `Table` targets one database table through an injected pool. All reads
//! funnel through [`Table::fetch`], where the optional result cache is
//! interposed; all writes go through [`Table::execute`] and never touch the
//! cache. Each call borrows one pooled connection for exactly one statement
//! and returns it on every exit path.

use std::sync::Arc;

use serde_json::{Map, Value};
use sqlx::mysql::MySqlPool;
use tracing::{error, warn};

use crate::cache::{CachedRows, QueryCache};
use crate::condition::{ConditionTerm, quote_identifier, render_condition, render_terms};
use crate::datatable::{GridResponse, TableQuery, build_plan, lenient_i64, select_list};
use crate::error::{GridError, GridResult};
use crate::hydrate::hydrate;
use crate::row::{bind_values, row_to_json};

/// Called with every error the DataTable engine swallows.
pub type ErrorHook = Arc<dyn Fn(&GridError) + Send + Sync>;

/// Caller-trusted trailing clauses for [`Table::select`], taken verbatim.
#[derive(Debug, Clone, Default)]
pub struct SelectClauses {
    pub group_by: Option<String>,
    pub having: Option<String>,
    pub order_by: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// SET and WHERE maps for [`Table::update`].
#[derive(Debug, Clone, Default)]
pub struct UpdateSpec {
    pub set: Map<String, Value>,
    pub where_clause: Map<String, Value>,
}

/// Options for [`Table::update`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// Compare WHERE values with `REGEXP` instead of `=`.
    pub use_regex: bool,
}

/// Outcome of a write statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    pub rows_affected: u64,
    pub last_insert_id: u64,
}

/// Handle for querying one table through a pooled connection.
pub struct Table {
    pool: MySqlPool,
    database: String,
    table: String,
    expression: Option<String>,
    cache: Option<QueryCache>,
    on_error: Option<ErrorHook>,
}

impl Table {
    /// Create a handle for `table` in `database`.
    ///
    /// The table name must come from code or configuration, never from
    /// client input; it is interpolated into every statement.
    pub fn new(pool: MySqlPool, database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            pool,
            database: database.into(),
            table: table.into(),
            expression: None,
            cache: None,
            on_error: None,
        }
    }

    /// Extra SELECT fragment appended after `*`, e.g. a computed column.
    ///
    /// A leading comma is stripped so both `", x AS y"` and `"x AS y"` work.
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        let normalized = expression
            .into()
            .trim()
            .trim_start_matches(',')
            .trim()
            .to_string();
        self.expression = (!normalized.is_empty()).then_some(normalized);
        self
    }

    /// Front reads with a TTL result cache.
    pub fn with_cache(mut self, cache: QueryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Register a hook invoked with every error the DataTable engine catches.
    pub fn with_error_hook(mut self, hook: impl Fn(&GridError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(hook));
        self
    }

    /// The result cache, when one was configured.
    pub fn cache(&self) -> Option<&QueryCache> {
        self.cache.as_ref()
    }

    /// Run one statement against a pooled connection and decode the rows.
    async fn fetch_rows(&self, sql: &str, bindings: &[Value]) -> GridResult<Vec<Value>> {
        if self.pool.is_closed() {
            return Err(GridError::PoolNotReady);
        }
        let mut conn = self.pool.acquire().await?;
        let query = bind_values(sqlx::query(sql), bindings);
        let rows = query.fetch_all(&mut *conn).await.map_err(|e| {
            warn!(error = %e, sql = sql, "query failed");
            GridError::from(e)
        })?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    /// Single read entry point: interposes the cache when one is configured.
    /// Only successful row sets are stored.
    async fn fetch(&self, sql: &str, bindings: &[Value]) -> GridResult<CachedRows> {
        let Some(cache) = &self.cache else {
            return Ok(Arc::new(self.fetch_rows(sql, bindings).await?));
        };

        let key = QueryCache::query_key(sql, bindings);
        if let Some(rows) = cache.get(&key) {
            return Ok(rows);
        }

        let rows = Arc::new(self.fetch_rows(sql, bindings).await?);
        cache.insert(key, Arc::clone(&rows));
        Ok(rows)
    }

    /// Single write entry point. Writes never touch the cache.
    async fn execute(&self, sql: &str, bindings: &[Value]) -> GridResult<WriteSummary> {
        if self.pool.is_closed() {
            return Err(GridError::PoolNotReady);
        }
        let mut conn = self.pool.acquire().await?;
        let query = bind_values(sqlx::query(sql), bindings);
        let result = query.execute(&mut *conn).await.map_err(|e| {
            warn!(error = %e, sql = sql, "write failed");
            GridError::from(e)
        })?;
        Ok(WriteSummary {
            rows_affected: result.rows_affected(),
            last_insert_id: result.last_insert_id(),
        })
    }

    /// Answer one paginated/filtered/sorted grid request.
    ///
    /// `request` is the raw client mapping, flat (bracket-notated keys) or
    /// already nested. `strict` is the caller-trusted base filter ANDed into
    /// every count and data query regardless of what the client sent — use
    /// it for scoping, e.g. tenant isolation.
    ///
    /// Never fails: any error is reported to the registered hook and folded
    /// into a zero-count response carrying `error`.
    pub async fn select_to_datatable(
        &self,
        request: &Map<String, Value>,
        strict: &[ConditionTerm],
    ) -> GridResponse {
        let hydrated = hydrate(request);
        // Pull draw out before full parsing so even a malformed descriptor
        // still echoes the client's counter.
        let draw = hydrated
            .get("draw")
            .and_then(lenient_i64)
            .unwrap_or(0);

        match self.run_datatable(hydrated, strict).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, table = %self.table, "datatable query failed");
                if let Some(hook) = &self.on_error {
                    hook(&e);
                }
                GridResponse::degraded(draw, e.to_string())
            }
        }
    }

    async fn run_datatable(
        &self,
        hydrated: Value,
        strict: &[ConditionTerm],
    ) -> GridResult<GridResponse> {
        let query: TableQuery = serde_json::from_value(hydrated)
            .map_err(|e| GridError::Validation(format!("malformed datatable request: {e}")))?;

        let base = render_condition(strict)?;
        let plan = build_plan(&self.table, self.expression.as_deref(), &query, &base);

        let records_total = self.fetch_count(&plan.count_total.sql, &plan.count_total.bindings).await?;
        let records_filtered = self
            .fetch_count(&plan.count_filtered.sql, &plan.count_filtered.bindings)
            .await?;
        let data = self.fetch(&plan.data.sql, &plan.data.bindings).await?;

        Ok(GridResponse {
            draw: query.draw,
            records_total,
            records_filtered,
            data: (*data).clone(),
            error: None,
        })
    }

    async fn fetch_count(&self, sql: &str, bindings: &[Value]) -> GridResult<i64> {
        let rows = self.fetch(sql, bindings).await?;
        Ok(rows
            .first()
            .and_then(|row| row.get("total"))
            .and_then(Value::as_i64)
            .unwrap_or(0))
    }

    /// Select rows matching an equality-AND map, or everything when `None`.
    pub async fn select_by(&self, params: Option<&Map<String, Value>>) -> GridResult<Vec<Value>> {
        let mut sql = format!(
            "SELECT {} FROM {}",
            select_list(self.expression.as_deref()),
            self.table
        );
        let mut bindings = Vec::new();

        if let Some(map) = params
            && !map.is_empty()
        {
            let mut parts = Vec::with_capacity(map.len());
            for (column, value) in map {
                parts.push(format!("{} = ?", quote_identifier(column)?));
                bindings.push(value.clone());
            }
            sql.push_str(" WHERE ");
            sql.push_str(&parts.join(" AND "));
        }

        let rows = self.fetch(&sql, &bindings).await?;
        Ok((*rows).clone())
    }

    /// Select with a typed condition sequence and optional trailing clauses.
    ///
    /// Keywords in `terms` supply the connectives between comparisons, as in
    /// strict conditions; `clauses` fragments are caller-trusted verbatim
    /// text and are not parameterized.
    pub async fn select(
        &self,
        terms: Option<&[ConditionTerm]>,
        clauses: &SelectClauses,
    ) -> GridResult<Vec<Value>> {
        let mut sql = format!(
            "SELECT {} FROM {}",
            select_list(self.expression.as_deref()),
            self.table
        );
        let mut bindings = Vec::new();

        if let Some(terms) = terms
            && !terms.is_empty()
        {
            let fragment = render_terms(terms)?;
            sql.push_str(" WHERE ");
            sql.push_str(&fragment.sql);
            bindings = fragment.bindings;
        }

        if let Some(group_by) = &clauses.group_by {
            sql.push_str(&format!(" GROUP BY {group_by}"));
        }
        if let Some(having) = &clauses.having {
            sql.push_str(&format!(" HAVING {having}"));
        }
        if let Some(order_by) = &clauses.order_by {
            sql.push_str(&format!(" ORDER BY {order_by}"));
        }
        if let Some(limit) = &clauses.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = &clauses.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        let rows = self.fetch(&sql, &bindings).await?;
        Ok((*rows).clone())
    }

    /// Insert one row from a column→value map.
    pub async fn insert(&self, values: &Map<String, Value>) -> GridResult<WriteSummary> {
        if values.is_empty() {
            return Err(GridError::Validation(
                "insert requires at least one column".to_string(),
            ));
        }

        let mut columns = Vec::with_capacity(values.len());
        let mut placeholders = Vec::with_capacity(values.len());
        let mut bindings = Vec::with_capacity(values.len());

        for (column, value) in values {
            columns.push(quote_identifier(column)?);
            placeholders.push("?");
            bindings.push(value.clone());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            placeholders.join(", ")
        );

        self.execute(&sql, &bindings).await
    }

    /// Update rows: SET pairs comma-joined, WHERE pairs AND-joined, values
    /// bound in SET-then-WHERE order.
    ///
    /// Both maps must be non-empty — an unscoped UPDATE is never emitted.
    pub async fn update(
        &self,
        spec: &UpdateSpec,
        options: UpdateOptions,
    ) -> GridResult<WriteSummary> {
        if spec.set.is_empty() {
            return Err(GridError::Validation(
                "update requires at least one SET column".to_string(),
            ));
        }
        if spec.where_clause.is_empty() {
            return Err(GridError::Validation(
                "update requires at least one WHERE condition".to_string(),
            ));
        }

        let operator = if options.use_regex { "REGEXP" } else { "=" };
        let mut bindings = Vec::with_capacity(spec.set.len() + spec.where_clause.len());

        let mut set_parts = Vec::with_capacity(spec.set.len());
        for (column, value) in &spec.set {
            set_parts.push(format!("{} = ?", quote_identifier(column)?));
            bindings.push(value.clone());
        }

        let mut where_parts = Vec::with_capacity(spec.where_clause.len());
        for (column, value) in &spec.where_clause {
            where_parts.push(format!("{} {operator} ?", quote_identifier(column)?));
            bindings.push(value.clone());
        }

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            self.table,
            set_parts.join(", "),
            where_parts.join(" AND ")
        );

        self.execute(&sql, &bindings).await
    }

    /// Delete rows matching an equality-AND map.
    ///
    /// Empty conditions are a silent no-op returning `Ok(None)` — never a
    /// "delete all rows".
    pub async fn delete(
        &self,
        conditions: &Map<String, Value>,
    ) -> GridResult<Option<WriteSummary>> {
        if conditions.is_empty() {
            return Ok(None);
        }

        let mut parts = Vec::with_capacity(conditions.len());
        let mut bindings = Vec::with_capacity(conditions.len());
        for (column, value) in conditions {
            parts.push(format!("{} = ?", quote_identifier(column)?));
            bindings.push(value.clone());
        }

        let sql = format!("DELETE FROM {} WHERE {}", self.table, parts.join(" AND "));
        Ok(Some(self.execute(&sql, &bindings).await?))
    }

    /// Column names of this table from `information_schema`, scoped by the
    /// configured database name and cached independently of query results.
    pub async fn get_schema(&self) -> GridResult<Vec<Value>> {
        // Aliased because MySQL 8 returns information_schema headers upper-cased.
        const SCHEMA_SQL: &str = "SELECT COLUMN_NAME AS column_name \
                                  FROM information_schema.columns \
                                  WHERE table_schema = ? AND table_name = ?";
        let bindings = [
            Value::String(self.database.clone()),
            Value::String(self.table.clone()),
        ];

        let Some(cache) = &self.cache else {
            return self.fetch_rows(SCHEMA_SQL, &bindings).await;
        };

        let key = QueryCache::schema_key(&self.table);
        if let Some(rows) = cache.get(&key) {
            return Ok((*rows).clone());
        }

        let rows = self.fetch_rows(SCHEMA_SQL, &bindings).await?;
        cache.insert(key, Arc::new(rows.clone()));
        Ok(rows)
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("database", &self.database)
            .field("table", &self.table)
            .field("expression", &self.expression)
            .field("cached", &self.cache.is_some())
            .finish()
    }
}
