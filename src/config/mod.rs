//! Configuration management
//!
//! Handles loading the data source catalog from the YAML config file.

pub mod sources;

pub use sources::{AppConfig, DataSourceConfig, SourceKind};
