//! PostgreSQL data source
//!
//! Concrete implementation using tokio-postgres. Schema scoping happens
//! through catalog filtering in the SQL text, so no session state is ever
//! mutated and concurrent callers cannot observe each other's schema
//! selection.

use crate::db::{DataSource, PREVIEW_ROW_LIMIT, Table};
use crate::error::{DbError, DbResult};
use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio_postgres::config::SslMode;
use tokio_postgres::types::Type;
use tokio_postgres::{Client, Config, NoTls};
use tracing::warn;

/// PostgreSQL data source
pub struct PostgresSource {
    /// The tokio-postgres client
    client: Client,
}

impl PostgresSource {
    /// Connect using a libpq-style DSN (`postgres://…` or key=value form).
    ///
    /// The DSN's own `sslmode` decides the transport: `disable` skips TLS
    /// entirely, anything else negotiates over rustls with OS trust roots.
    /// The background connection task is detached; if the connection drops,
    /// the next operation fails and reports it.
    pub async fn connect(dsn: &str) -> DbResult<Self> {
        let config: Config = dsn
            .parse()
            .map_err(|e: tokio_postgres::Error| DbError::ConnectionFailed(e.to_string()))?;

        let client = match config.get_ssl_mode() {
            SslMode::Disable => {
                let (client, connection) = config
                    .connect(NoTls)
                    .await
                    .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        warn!("postgres connection lost: {}", e);
                    }
                });
                client
            }
            _ => {
                let tls = tokio_postgres_rustls::MakeRustlsConnect::new(make_tls_config());
                let (client, connection) = config
                    .connect(tls)
                    .await
                    .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        warn!("postgres connection lost: {}", e);
                    }
                });
                client
            }
        };

        Ok(Self { client })
    }

    /// Run a statement and collect the full result set.
    ///
    /// Preparing first yields column metadata even for empty results, so
    /// the header row is always present.
    async fn collect(&self, sql: &str) -> DbResult<Table> {
        let stmt = self
            .client
            .prepare(sql)
            .await
            .map_err(|e| DbError::QueryFailed(e.to_string()))?;

        let columns: Vec<String> = stmt.columns().iter().map(|c| c.name().to_string()).collect();
        let width = columns.len();
        let mut table = Table::new(columns);

        let rows = self
            .client
            .query(&stmt, &[])
            .await
            .map_err(|e| DbError::QueryFailed(e.to_string()))?;

        for row in &rows {
            let mut cells = Vec::with_capacity(width);
            for idx in 0..width {
                cells.push(extract_cell(row, idx));
            }
            table.push_row(cells)?;
        }

        Ok(table)
    }
}

#[async_trait]
impl DataSource for PostgresSource {
    async fn ping(&self) -> DbResult<()> {
        self.client
            .batch_execute("SELECT 1")
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))
    }

    async fn list_schemas(&self) -> DbResult<Vec<String>> {
        let rows = self
            .client
            .query(
                "SELECT nspname FROM pg_namespace \
                 WHERE nspname NOT LIKE 'pg_%' \
                 AND nspname != 'information_schema' \
                 ORDER BY nspname",
                &[],
            )
            .await
            .map_err(|e| DbError::QueryFailed(e.to_string()))?;
        Ok(rows.iter().map(|r| r.get(0)).collect())
    }

    /// Unknown schemas produce an empty list, not an error: the catalog
    /// filter simply matches nothing. MySQL behaves differently here.
    async fn list_tables(&self, schema: &str) -> DbResult<Vec<String>> {
        let rows = self
            .client
            .query(
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = $1 AND table_type = 'BASE TABLE' \
                 ORDER BY table_name",
                &[&schema],
            )
            .await
            .map_err(|e| DbError::QueryFailed(e.to_string()))?;
        Ok(rows.iter().map(|r| r.get(0)).collect())
    }

    async fn preview_table(&self, schema: &str, table: &str) -> DbResult<Table> {
        self.collect(&format!(
            "SELECT * FROM {}.{} LIMIT {}",
            quote_ident(schema),
            quote_ident(table),
            PREVIEW_ROW_LIMIT
        ))
        .await
    }

    async fn describe_table(&self, schema: &str, table: &str) -> DbResult<Table> {
        let stmt = self
            .client
            .prepare(
                "SELECT column_name, data_type, is_nullable, column_default \
                 FROM information_schema.columns \
                 WHERE table_schema = $1 AND table_name = $2 \
                 ORDER BY ordinal_position",
            )
            .await
            .map_err(|e| DbError::QueryFailed(e.to_string()))?;

        let columns: Vec<String> = stmt.columns().iter().map(|c| c.name().to_string()).collect();
        let width = columns.len();
        let mut out = Table::new(columns);

        let rows = self
            .client
            .query(&stmt, &[&schema, &table])
            .await
            .map_err(|e| DbError::QueryFailed(e.to_string()))?;
        for row in &rows {
            let mut cells = Vec::with_capacity(width);
            for idx in 0..width {
                cells.push(extract_cell(row, idx));
            }
            out.push_row(cells)?;
        }
        Ok(out)
    }

    async fn query(&self, _schema: &str, sql: &str) -> DbResult<Table> {
        self.collect(sql).await
    }
}

/// Double-quote an identifier, escaping embedded quotes
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Build a rustls ClientConfig that trusts OS certificates (with Mozilla roots as fallback)
fn make_tls_config() -> rustls::ClientConfig {
    let mut root_store = rustls::RootCertStore::empty();

    let native_certs = rustls_native_certs::load_native_certs();
    let mut loaded = 0;
    for cert in native_certs.certs {
        if root_store.add(cert).is_ok() {
            loaded += 1;
        }
    }
    if loaded == 0 {
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }

    rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth()
}

/// Extract one cell as text, `None` for SQL NULL.
///
/// Typed extraction is attempted first based on the column's declared
/// type, then the string fallback; NULL is reported faithfully at every
/// step so "no value" never collapses into an empty string.
fn extract_cell(row: &tokio_postgres::Row, idx: usize) -> Option<String> {
    let ty = row.columns().get(idx).map(|c| c.type_().clone());
    let Some(ty) = ty else {
        return try_as_string(row, idx);
    };

    match ty {
        Type::INT2 => match row.try_get::<_, Option<i16>>(idx) {
            Ok(v) => v.map(|n| n.to_string()),
            Err(_) => try_as_string(row, idx),
        },
        Type::INT4 => match row.try_get::<_, Option<i32>>(idx) {
            Ok(v) => v.map(|n| n.to_string()),
            Err(_) => try_as_string(row, idx),
        },
        Type::INT8 => match row.try_get::<_, Option<i64>>(idx) {
            Ok(v) => v.map(|n| n.to_string()),
            Err(_) => try_as_string(row, idx),
        },
        Type::FLOAT4 => match row.try_get::<_, Option<f32>>(idx) {
            Ok(v) => v.map(|n| n.to_string()),
            Err(_) => try_as_string(row, idx),
        },
        Type::FLOAT8 => match row.try_get::<_, Option<f64>>(idx) {
            Ok(v) => v.map(|n| n.to_string()),
            Err(_) => try_as_string(row, idx),
        },
        Type::NUMERIC => match row.try_get::<_, Option<Decimal>>(idx) {
            Ok(v) => v.map(|d| d.to_string()),
            Err(_) => try_as_string(row, idx),
        },
        Type::BOOL => match row.try_get::<_, Option<bool>>(idx) {
            Ok(v) => v.map(|b| b.to_string()),
            Err(_) => try_as_string(row, idx),
        },
        Type::JSON | Type::JSONB => match row.try_get::<_, Option<serde_json::Value>>(idx) {
            Ok(v) => v.map(|j| j.to_string()),
            Err(_) => try_as_string(row, idx),
        },
        Type::UUID => match row.try_get::<_, Option<uuid::Uuid>>(idx) {
            Ok(v) => v.map(|u| u.to_string()),
            Err(_) => try_as_string(row, idx),
        },
        Type::BYTEA => match row.try_get::<_, Option<Vec<u8>>>(idx) {
            Ok(v) => v.map(|b| format!("<bytea {} bytes>", b.len())),
            Err(_) => try_as_string(row, idx),
        },
        Type::TIMESTAMP | Type::TIMESTAMPTZ | Type::DATE | Type::TIME => {
            match row.try_get::<_, Option<String>>(idx) {
                Ok(v) => v,
                Err(_) => {
                    // The wire format for temporal types is not textual;
                    // walk the chrono representations before giving up.
                    if let Ok(v) = row.try_get::<_, Option<chrono::NaiveDateTime>>(idx) {
                        return v.map(|t| t.to_string());
                    }
                    if let Ok(v) = row.try_get::<_, Option<chrono::DateTime<chrono::Utc>>>(idx) {
                        return v.map(|t| t.to_string());
                    }
                    if let Ok(v) = row.try_get::<_, Option<chrono::NaiveDate>>(idx) {
                        return v.map(|t| t.to_string());
                    }
                    if let Ok(v) = row.try_get::<_, Option<chrono::NaiveTime>>(idx) {
                        return v.map(|t| t.to_string());
                    }
                    try_as_string(row, idx)
                }
            }
        }
        Type::TEXT_ARRAY | Type::VARCHAR_ARRAY | Type::NAME_ARRAY => {
            match row.try_get::<_, Option<Vec<String>>>(idx) {
                Ok(v) => v.map(|items| format!("{{{}}}", items.join(","))),
                Err(_) => try_as_string(row, idx),
            }
        }
        Type::INT4_ARRAY => match row.try_get::<_, Option<Vec<i32>>>(idx) {
            Ok(v) => v.map(|items| {
                let parts: Vec<String> = items.iter().map(|n| n.to_string()).collect();
                format!("{{{}}}", parts.join(","))
            }),
            Err(_) => try_as_string(row, idx),
        },
        Type::INT8_ARRAY => match row.try_get::<_, Option<Vec<i64>>>(idx) {
            Ok(v) => v.map(|items| {
                let parts: Vec<String> = items.iter().map(|n| n.to_string()).collect();
                format!("{{{}}}", parts.join(","))
            }),
            Err(_) => try_as_string(row, idx),
        },
        _ => try_as_string(row, idx),
    }
}

/// Try to extract a value as a string (fallback for type mismatches).
///
/// When even the string fallback fails, includes the postgres type name
/// in the cell so the user knows what type couldn't be displayed.
fn try_as_string(row: &tokio_postgres::Row, idx: usize) -> Option<String> {
    match row.try_get::<_, Option<String>>(idx) {
        Ok(v) => v,
        Err(_) => {
            let type_name = row
                .columns()
                .get(idx)
                .map_or("unknown", |c| c.type_().name());
            Some(format!("<unable to display: {}>", type_name))
        }
    }
}
