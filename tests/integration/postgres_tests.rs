//! Integration tests for the PostgreSQL adapter
//!
//! These need a live server. Set VIZSQL_TEST_POSTGRES_DSN to run them;
//! they skip themselves otherwise.

use vizsql::db::{DataSource, PREVIEW_ROW_LIMIT, PostgresSource};

async fn connect() -> Option<PostgresSource> {
    let dsn = match std::env::var("VIZSQL_TEST_POSTGRES_DSN") {
        Ok(dsn) => dsn,
        Err(_) => {
            eprintln!("Skipping test: VIZSQL_TEST_POSTGRES_DSN not set");
            return None;
        }
    };
    match PostgresSource::connect(&dsn).await {
        Ok(source) => Some(source),
        Err(e) => {
            eprintln!("Skipping test: PostgreSQL not available - {}", e);
            None
        }
    }
}

#[tokio::test]
async fn test_ping() {
    let Some(source) = connect().await else { return };
    source.ping().await.unwrap();
}

#[tokio::test]
async fn test_list_schemas_includes_public() {
    let Some(source) = connect().await else { return };
    let schemas = source.list_schemas().await.unwrap();
    assert!(schemas.contains(&"public".to_string()));
}

#[tokio::test]
async fn test_missing_schema_lists_no_tables() {
    let Some(source) = connect().await else { return };
    // empty result, not an error: the catalog filter matches nothing
    let tables = source.list_tables("no_such_schema_vizsql").await.unwrap();
    assert!(tables.is_empty());
}

#[tokio::test]
async fn test_query_renders_nulls_and_values() {
    let Some(source) = connect().await else { return };
    let result = source
        .query("public", "SELECT 1 AS num, NULL::text AS nothing, 'hello' AS msg")
        .await
        .unwrap();

    assert_eq!(result.columns(), ["num", "nothing", "msg"]);
    assert_eq!(result.row_count(), 1);
    let row = &result.rows()[0];
    assert_eq!(row[0].as_deref(), Some("1"));
    assert_eq!(row[1], None);
    assert_eq!(row[2].as_deref(), Some("hello"));
}

#[tokio::test]
async fn test_empty_result_still_has_header() {
    let Some(source) = connect().await else { return };
    let result = source
        .query("public", "SELECT 1 AS never WHERE false")
        .await
        .unwrap();
    assert_eq!(result.columns(), ["never"]);
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_preview_and_describe_roundtrip() {
    let Some(source) = connect().await else { return };

    source
        .query(
            "public",
            "CREATE TABLE IF NOT EXISTS vizsql_test_albums \
             (id serial PRIMARY KEY, title text NOT NULL, artist text)",
        )
        .await
        .unwrap();
    source
        .query(
            "public",
            "INSERT INTO vizsql_test_albums (title, artist) \
             SELECT 'album ' || n, CASE WHEN n % 3 = 0 THEN NULL ELSE 'artist' END \
             FROM generate_series(1, 12) AS n",
        )
        .await
        .unwrap();

    let preview = source
        .preview_table("public", "vizsql_test_albums")
        .await
        .unwrap();
    assert_eq!(preview.columns(), ["id", "title", "artist"]);
    assert_eq!(preview.row_count(), PREVIEW_ROW_LIMIT);
    for row in preview.rows() {
        assert_eq!(row.len(), preview.width());
    }

    let description = source
        .describe_table("public", "vizsql_test_albums")
        .await
        .unwrap();
    assert_eq!(
        description.columns(),
        ["column_name", "data_type", "is_nullable", "column_default"]
    );
    assert_eq!(description.row_count(), 3);

    let tables = source.list_tables("public").await.unwrap();
    assert!(tables.contains(&"vizsql_test_albums".to_string()));

    source
        .query("public", "DROP TABLE vizsql_test_albums")
        .await
        .unwrap();
}
