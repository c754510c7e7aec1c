//! Integration tests for the connection controller
//!
//! Backed by temporary SQLite databases so switching, caching, and
//! failure semantics run against a real engine.

use crate::common;
use std::sync::Arc;
use vizsql::ControllerError;
use vizsql::config::SourceKind;
use vizsql::controller::Controller;
use vizsql::db::DataSource;
use vizsql::error::DbError;

#[tokio::test]
async fn test_create_connects_named_default() {
    let dir = tempfile::tempdir().unwrap();
    let a = common::create_albums_db(dir.path());
    let b = dir.path().join("b.db");
    rusqlite::Connection::open(&b).unwrap();

    let config = common::config_with(
        vec![
            common::sqlite_source("a", &a),
            common::sqlite_source("b", &b),
        ],
        Some("b"),
    );
    let controller = Controller::create(config).await.unwrap();

    assert_eq!(controller.current_alias().await.as_deref(), Some("b"));
    controller.current().await.unwrap().ping().await.unwrap();
}

#[tokio::test]
async fn test_create_without_default_picks_first_configured() {
    let dir = tempfile::tempdir().unwrap();
    let a = common::create_albums_db(dir.path());
    let b = dir.path().join("b.db");
    rusqlite::Connection::open(&b).unwrap();

    let config = common::config_with(
        vec![
            common::sqlite_source("first", &a),
            common::sqlite_source("second", &b),
        ],
        None,
    );
    let controller = Controller::create(config).await.unwrap();
    assert_eq!(controller.current_alias().await.as_deref(), Some("first"));
}

#[tokio::test]
async fn test_create_fails_when_default_connection_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.db");

    let config = common::config_with(vec![common::sqlite_source("a", &missing)], None);
    let err = Controller::create(config).await.unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Db(DbError::ConnectionFailed(_))
    ));
}

#[tokio::test]
async fn test_list_keeps_configuration_order() {
    let dir = tempfile::tempdir().unwrap();
    let a = common::create_albums_db(dir.path());

    let config = common::config_with(
        vec![
            common::sqlite_source("zeta", &a),
            common::source("alpha", SourceKind::Mysql, "mysql://unused"),
            common::source("mid", SourceKind::Postgresql, "postgres://unused"),
        ],
        Some("zeta"),
    );
    let controller = Controller::create(config).await.unwrap();

    let listed = controller.list();
    assert_eq!(
        listed,
        vec![
            ("zeta".to_string(), SourceKind::Sqlite),
            ("alpha".to_string(), SourceKind::Mysql),
            ("mid".to_string(), SourceKind::Postgresql),
        ]
    );
}

#[tokio::test]
async fn test_switch_unknown_alias_keeps_current() {
    let dir = tempfile::tempdir().unwrap();
    let a = common::create_albums_db(dir.path());

    let config = common::config_with(vec![common::sqlite_source("a", &a)], None);
    let controller = Controller::create(config).await.unwrap();
    let before = controller.current().await.unwrap();

    let err = controller.switch("unknown-alias").await.unwrap_err();
    match err {
        ControllerError::AliasNotFound(alias) => assert_eq!(alias, "unknown-alias"),
        other => panic!("expected AliasNotFound, got {:?}", other),
    }

    let after = controller.current().await.unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(controller.current_alias().await.as_deref(), Some("a"));
}

#[tokio::test]
async fn test_switch_unsupported_kind_keeps_current() {
    let dir = tempfile::tempdir().unwrap();
    let a = common::create_albums_db(dir.path());

    let config = common::config_with(
        vec![
            common::sqlite_source("a", &a),
            common::source("exotic", SourceKind::Other("oracle".to_string()), "dsn"),
        ],
        Some("a"),
    );
    let controller = Controller::create(config).await.unwrap();
    let before = controller.current().await.unwrap();

    let err = controller.switch("exotic").await.unwrap_err();
    match err {
        ControllerError::UnsupportedBackend(kind) => assert_eq!(kind, "oracle"),
        other => panic!("expected UnsupportedBackend, got {:?}", other),
    }

    let after = controller.current().await.unwrap();
    assert!(Arc::ptr_eq(&before, &after));
}

#[tokio::test]
async fn test_failed_switch_keeps_previous_source_usable() {
    let dir = tempfile::tempdir().unwrap();
    let a = common::create_albums_db(dir.path());
    let missing = dir.path().join("missing.db");

    let config = common::config_with(
        vec![
            common::sqlite_source("a", &a),
            common::sqlite_source("broken", &missing),
        ],
        Some("a"),
    );
    let controller = Controller::create(config).await.unwrap();

    let err = controller.switch("broken").await.unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Db(DbError::ConnectionFailed(_))
    ));

    assert_eq!(controller.current_alias().await.as_deref(), Some("a"));
    controller.current().await.unwrap().ping().await.unwrap();
}

#[tokio::test]
async fn test_get_or_connect_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let a = common::create_albums_db(dir.path());

    let config = common::config_with(vec![common::sqlite_source("a", &a)], None);
    let controller = Controller::create(config).await.unwrap();

    controller.switch("a").await.unwrap();
    let first = controller.current().await.unwrap();
    controller.switch("a").await.unwrap();
    let second = controller.current().await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_switch_away_and_back_reuses_cached_adapter() {
    let dir = tempfile::tempdir().unwrap();
    let a = common::create_albums_db(dir.path());
    let b = dir.path().join("b.db");
    rusqlite::Connection::open(&b).unwrap();

    let config = common::config_with(
        vec![
            common::sqlite_source("a", &a),
            common::sqlite_source("b", &b),
        ],
        Some("a"),
    );
    let controller = Controller::create(config).await.unwrap();
    let original = controller.current().await.unwrap();

    controller.switch("b").await.unwrap();
    assert_eq!(controller.current_alias().await.as_deref(), Some("b"));

    controller.switch("a").await.unwrap();
    let back = controller.current().await.unwrap();
    assert!(Arc::ptr_eq(&original, &back));
}

#[tokio::test]
async fn test_concurrent_switch_and_query() {
    let dir = tempfile::tempdir().unwrap();
    let a = common::create_albums_db(dir.path());
    let b = dir.path().join("b.db");
    rusqlite::Connection::open(&b).unwrap();

    let config = common::config_with(
        vec![
            common::sqlite_source("a", &a),
            common::sqlite_source("b", &b),
        ],
        Some("a"),
    );
    let controller = Arc::new(Controller::create(config).await.unwrap());

    let mut handles = Vec::new();
    for i in 0..8 {
        let controller = controller.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                controller.switch(if i % 4 == 0 { "a" } else { "b" }).await?;
            }
            let source = controller.current().await?;
            source
                .query("main", "SELECT 1")
                .await
                .map_err(ControllerError::from)?;
            Ok::<_, ControllerError>(())
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
}
