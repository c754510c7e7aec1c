//! Database abstraction layer
//!
//! This module defines the capability contract every backend adapter must
//! satisfy, plus one adapter per supported engine. Adapters translate the
//! contract into engine-specific SQL and normalize driver result sets into
//! the shared [`Table`] representation.

pub mod mysql;
pub mod postgres;
pub mod sqlite;
pub mod table;

pub use mysql::MysqlSource;
pub use postgres::PostgresSource;
pub use sqlite::SqliteSource;
pub use table::Table;

use crate::error::DbResult;
use async_trait::async_trait;

/// Row cap applied by [`DataSource::preview_table`]
pub const PREVIEW_ROW_LIMIT: usize = 10;

/// Capability contract for one live data source.
///
/// Each implementation owns exactly one engine connection handle (pooled
/// internally by the driver where the driver pools; never re-pooled here).
/// All failures surface immediately: no retries, no timeouts beyond the
/// driver's own, no recovery.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Verify the underlying connection is reachable. Side-effect-free.
    async fn ping(&self) -> DbResult<()>;

    /// Available schema/database names.
    ///
    /// SQLite has no schema concept and returns the single synthetic
    /// schema `"main"`.
    async fn list_schemas(&self) -> DbResult<Vec<String>>;

    /// Base table names scoped to `schema`.
    ///
    /// Missing-schema behavior differs by engine and is deliberate:
    /// MySQL fails (the `USE` errors on an unknown database) while
    /// PostgreSQL returns an empty list (the catalog filter matches
    /// nothing). PostgreSQL orders results by table name; MySQL keeps
    /// the engine's default order.
    async fn list_tables(&self, schema: &str) -> DbResult<Vec<String>>;

    /// Up to [`PREVIEW_ROW_LIMIT`] rows of `SELECT * FROM table`.
    async fn preview_table(&self, schema: &str, table: &str) -> DbResult<Table>;

    /// Column metadata from the engine's information-schema equivalent.
    ///
    /// SQLite returns the table's creation SQL verbatim as a single
    /// degenerate row.
    async fn describe_table(&self, schema: &str, table: &str) -> DbResult<Table>;

    /// Execute caller-supplied SQL scoped to `schema`.
    ///
    /// The statement runs exactly as written, with no validation and no
    /// sandboxing. The operator and the caller are the same principal.
    async fn query(&self, schema: &str, sql: &str) -> DbResult<Table>;
}
