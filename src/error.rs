//! Error types for vizsql
//!
//! This module defines the error hierarchy used throughout the application.
//! We use `thiserror` for library-style errors with clear error chains.

use std::io;

/// Main error type for the vizsql application
#[derive(Debug, thiserror::Error)]
pub enum VizsqlError {
    /// Data source errors
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Connection controller errors
    #[error("Controller error: {0}")]
    Controller(#[from] ControllerError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Terminal/UI errors
    #[error("Terminal error: {0}")]
    Terminal(String),
}

/// Data source operation errors
///
/// Every adapter maps its driver's failures onto these two kinds: the
/// backend could not be reached at all, or a statement ran and failed.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Failed to establish or verify a connection (unreachable host,
    /// auth failure, malformed DSN, missing SQLite file)
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Statement execution or result scanning failed
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

/// Connection controller errors
///
/// Raised while validating the configured source set or switching between
/// aliases. Adapter-level failures pass through as [`DbError`] untouched.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// The configuration names zero data sources
    #[error("No data sources configured")]
    NoDataSources,

    /// Two configured sources share an alias
    #[error("Duplicate data source alias '{0}'")]
    DuplicateAlias(String),

    /// The configured default alias matches no data source
    #[error("Default alias '{0}' does not match any configured data source")]
    DefaultAliasNotFound(String),

    /// A switch targeted an alias that is not configured
    #[error("Alias '{0}' does not exist")]
    AliasNotFound(String),

    /// The configured backend kind has no adapter
    #[error("Backend '{0}' is not supported")]
    UnsupportedBackend(String),

    /// No data source is active yet; unreachable through the public API
    /// since construction always connects a default
    #[error("No current data source")]
    NoCurrentDataSource,

    /// Adapter construction or operation failure, surfaced verbatim
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Configuration loading/parsing errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Home directory not found
    #[error("Could not determine home directory")]
    NoHomeDir,

    /// Config file not found
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    /// Failed to parse YAML
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Specialized Result type for vizsql operations
pub type Result<T> = std::result::Result<T, VizsqlError>;

/// Specialized Result type for data source operations
pub type DbResult<T> = std::result::Result<T, DbError>;

/// Specialized Result type for controller operations
pub type ControllerResult<T> = std::result::Result<T, ControllerError>;

/// Specialized Result type for config operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
