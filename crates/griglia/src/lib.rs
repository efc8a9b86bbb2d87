//! Griglia — server-side DataTables query engine for MySQL.
//!
//! Turns grid requests (pagination/search/sort) into fully parameterized SQL,
//! executes them through a pooled `sqlx` connection, and optionally fronts
//! reads with an in-process TTL cache. Caller-trusted strict conditions are
//! merged with untrusted client search terms into one correctly
//! parenthesized WHERE clause; user input only ever travels as bindings.
//!
//! ```no_run
//! use griglia::{ConditionTerm, DatabaseConfig, QueryCache, Table};
//!
//! # async fn demo(request: serde_json::Map<String, serde_json::Value>) -> anyhow::Result<()> {
//! let config = DatabaseConfig::from_env()?;
//! let pool = griglia::db::create_pool(&config).await?;
//!
//! let users = Table::new(pool, &config.database, "users")
//!     .with_cache(QueryCache::with_default_ttl());
//!
//! // Tenant scoping the client cannot bypass:
//! let strict = [ConditionTerm::field("tenant_id", 7)];
//! let response = users.select_to_datatable(&request, &strict).await;
//! # let _ = response;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod condition;
pub mod config;
pub mod datatable;
pub mod db;
pub mod error;
pub mod hydrate;
mod row;
pub mod table;

pub use cache::QueryCache;
pub use condition::{ConditionFragment, ConditionTerm, render_condition, render_terms};
pub use config::DatabaseConfig;
pub use datatable::{ColumnSpec, GridResponse, OrderSpec, SearchSpec, TableQuery};
pub use error::{GridError, GridResult};
pub use hydrate::hydrate;
pub use table::{SelectClauses, Table, UpdateOptions, UpdateSpec, WriteSummary};
