//! SQLite data source
//!
//! Concrete implementation using rusqlite. The connection is a single
//! file handle guarded by an async mutex; rusqlite calls are quick enough
//! on a local file that blocking inside the lock is acceptable.

use crate::db::{DataSource, PREVIEW_ROW_LIMIT, Table};
use crate::error::{DbError, DbResult};
use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags, types::ValueRef};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// SQLite data source backed by a database file
pub struct SqliteSource {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSource").finish_non_exhaustive()
    }
}

impl SqliteSource {
    /// Open an existing database file.
    ///
    /// The path is validated before any engine handle is opened: a missing
    /// file or a directory fails right here. SQLite would otherwise happily
    /// create an empty database and mask the typo.
    pub fn open(path: &str) -> DbResult<Self> {
        let meta = std::fs::metadata(Path::new(path))
            .map_err(|e| DbError::ConnectionFailed(format!("{}: {}", path, e)))?;
        if meta.is_dir() {
            return Err(DbError::ConnectionFailed(format!(
                "{} is a directory, not a database file",
                path
            )));
        }

        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a statement and collect the full result set
    async fn collect(&self, sql: &str) -> DbResult<Table> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| DbError::QueryFailed(e.to_string()))?;

        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();
        let mut table = Table::new(columns);

        let mut rows = stmt
            .query([])
            .map_err(|e| DbError::QueryFailed(e.to_string()))?;
        while let Some(row) = rows
            .next()
            .map_err(|e| DbError::QueryFailed(e.to_string()))?
        {
            let mut cells = Vec::with_capacity(width);
            for idx in 0..width {
                let value = row
                    .get_ref(idx)
                    .map_err(|e| DbError::QueryFailed(e.to_string()))?;
                cells.push(value_to_string(value));
            }
            table.push_row(cells)?;
        }

        Ok(table)
    }
}

#[async_trait]
impl DataSource for SqliteSource {
    async fn ping(&self) -> DbResult<()> {
        let conn = self.conn.lock().await;
        conn.query_row("SELECT 1", [], |_| Ok(()))
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))
    }

    async fn list_schemas(&self) -> DbResult<Vec<String>> {
        Ok(vec!["main".to_string()])
    }

    async fn list_tables(&self, _schema: &str) -> DbResult<Vec<String>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")
            .map_err(|e| DbError::QueryFailed(e.to_string()))?;
        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| DbError::QueryFailed(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DbError::QueryFailed(e.to_string()))?;
        Ok(tables)
    }

    async fn preview_table(&self, _schema: &str, table: &str) -> DbResult<Table> {
        self.collect(&format!(
            "SELECT * FROM {} LIMIT {}",
            quote_ident(table),
            PREVIEW_ROW_LIMIT
        ))
        .await
    }

    async fn describe_table(&self, _schema: &str, table: &str) -> DbResult<Table> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT sql FROM sqlite_master WHERE name = ?1")
            .map_err(|e| DbError::QueryFailed(e.to_string()))?;

        let mut table_out = Table::new(vec!["sql".to_string()]);
        let mut rows = stmt
            .query([table])
            .map_err(|e| DbError::QueryFailed(e.to_string()))?;
        while let Some(row) = rows
            .next()
            .map_err(|e| DbError::QueryFailed(e.to_string()))?
        {
            let value = row
                .get_ref(0)
                .map_err(|e| DbError::QueryFailed(e.to_string()))?;
            table_out.push_row(vec![value_to_string(value)])?;
        }
        Ok(table_out)
    }

    async fn query(&self, _schema: &str, sql: &str) -> DbResult<Table> {
        self.collect(sql).await
    }
}

/// Render one SQLite value as text, `None` for NULL
fn value_to_string(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Some(format!("<blob {} bytes>", b.len())),
    }
}

/// Double-quote an identifier, escaping embedded quotes
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
