//! vizsql - A fast, keyboard-driven multi-database client for the terminal
//!
//! vizsql lets an operator browse several relational data sources — MySQL,
//! PostgreSQL, and SQLite — through one uniform terminal interface: list
//! schemas, list tables, preview rows, inspect structure, and run ad-hoc
//! queries, switching between named connections at runtime.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`]: The YAML catalog of named data sources
//! - [`db`]: The data source capability contract and one adapter per engine
//! - [`controller`]: Named-connection management — lazy connect, reuse, switch
//! - [`ui`]: Terminal user interface components
//! - [`error`]: Error types and result aliases
//! - [`app`]: Application state and event handling
//!
//! # Example
//!
//! ```no_run
//! use vizsql::config::AppConfig;
//! use vizsql::controller::Controller;
//! use vizsql::db::DataSource;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // One ad-hoc SQLite source
//! let config = AppConfig::ad_hoc("sqlite", "./music.db");
//!
//! // Validates the catalog and connects the default source
//! let controller = Controller::create(config).await?;
//!
//! // Every operation goes through whatever source is current
//! let source = controller.current().await?;
//! for schema in source.list_schemas().await? {
//!     let tables = source.list_tables(&schema).await?;
//!     println!("{}: {} tables", schema, tables.len());
//! }
//!
//! let preview = source.preview_table("main", "albums").await?;
//! println!("{} columns, {} rows", preview.width(), preview.row_count());
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod controller;
pub mod db;
pub mod error;
pub mod ui;

pub use error::{ConfigError, ControllerError, DbError, Result, VizsqlError};
