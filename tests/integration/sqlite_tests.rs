//! Integration tests for the SQLite adapter
//!
//! Hermetic: every test builds its own temporary database file.

use crate::common;
use vizsql::db::{DataSource, PREVIEW_ROW_LIMIT, SqliteSource};
use vizsql::error::DbError;

fn fixture() -> (tempfile::TempDir, SqliteSource) {
    let dir = tempfile::tempdir().unwrap();
    let path = common::create_albums_db(dir.path());
    let source = SqliteSource::open(path.to_str().unwrap()).unwrap();
    (dir, source)
}

#[tokio::test]
async fn test_ping() {
    let (_dir, source) = fixture();
    source.ping().await.unwrap();
}

#[tokio::test]
async fn test_list_schemas_is_synthetic_main() {
    let (_dir, source) = fixture();
    assert_eq!(source.list_schemas().await.unwrap(), vec!["main"]);
}

#[tokio::test]
async fn test_list_tables() {
    let (_dir, source) = fixture();
    let tables = source.list_tables("main").await.unwrap();
    assert!(tables.contains(&"albums".to_string()));
    assert!(tables.contains(&"tracks".to_string()));
}

#[tokio::test]
async fn test_preview_caps_rows_and_keeps_width() {
    let (_dir, source) = fixture();
    let preview = source.preview_table("main", "albums").await.unwrap();

    assert_eq!(preview.columns(), ["id", "title", "artist", "year"]);
    assert_eq!(preview.row_count(), PREVIEW_ROW_LIMIT);
    for row in preview.rows() {
        assert_eq!(row.len(), preview.width());
    }
}

#[tokio::test]
async fn test_null_cells_stay_null() {
    let (_dir, source) = fixture();
    let result = source
        .query("main", "SELECT artist, year FROM albums WHERE artist IS NULL")
        .await
        .unwrap();

    assert_eq!(result.row_count(), 2);
    for row in result.rows() {
        assert_eq!(row[0], None);
    }
    // one bootleg still has a year; NULL and value coexist in a column
    assert!(result.rows().iter().any(|r| r[1].is_some()));
    assert!(result.rows().iter().any(|r| r[1].is_none()));
}

#[tokio::test]
async fn test_describe_returns_creation_sql() {
    let (_dir, source) = fixture();
    let description = source.describe_table("main", "albums").await.unwrap();

    assert_eq!(description.columns(), ["sql"]);
    assert_eq!(description.row_count(), 1);
    let sql = description.rows()[0][0].as_deref().unwrap();
    assert!(sql.contains("CREATE TABLE"));
    assert!(sql.contains("albums"));
}

#[tokio::test]
async fn test_query_row_counts() {
    let (_dir, source) = fixture();
    let result = source
        .query("main", "SELECT title FROM albums LIMIT 2")
        .await
        .unwrap();

    assert_eq!(result.columns(), ["title"]);
    assert_eq!(result.row_count(), 2);
}

#[tokio::test]
async fn test_query_failure_is_reported() {
    let (_dir, source) = fixture();
    let err = source
        .query("main", "SELECT nope FROM nothing")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::QueryFailed(_)));
}

#[tokio::test]
async fn test_open_rejects_missing_file_and_directory() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.db");
    let err = SqliteSource::open(missing.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, DbError::ConnectionFailed(_)));

    let err = SqliteSource::open(dir.path().to_str().unwrap()).unwrap_err();
    assert!(matches!(err, DbError::ConnectionFailed(_)));
}
