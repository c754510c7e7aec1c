//! Connection controller
//!
//! Owns the catalog of named data source configurations, lazily connects
//! and caches one adapter per alias, and tracks which source is "current".
//! The controller never looks at query results; it only decides which
//! adapter answers a request.
//!
//! Cached adapters are never evicted or health-checked. A backend that
//! died since its adapter was built is only discovered when the next
//! operation against it fails.

use crate::config::{AppConfig, DataSourceConfig, SourceKind};
use crate::db::{DataSource, MysqlSource, PostgresSource, SqliteSource};
use crate::error::{ControllerError, ControllerResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Connection controller over the configured data sources.
///
/// All mutation (pool insertion, adapter construction, `current`
/// reassignment) is serialized behind one async mutex, so concurrent
/// `switch` and `query` calls are safe by contract rather than by caller
/// discipline. Reads only hold the lock long enough to clone an `Arc`;
/// operations on an obtained adapter run lock-free.
pub struct Controller {
    /// Configured sources in configuration order
    sources: Vec<DataSourceConfig>,
    /// Alias → position in `sources`
    index: HashMap<String, usize>,
    /// Adapter cache and the active source
    state: Mutex<State>,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("sources", &self.sources)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct State {
    /// One live adapter per alias, added on demand, never evicted
    pool: HashMap<String, Arc<dyn DataSource>>,
    current: Option<Active>,
}

#[derive(Clone)]
struct Active {
    alias: String,
    source: Arc<dyn DataSource>,
}

impl Controller {
    /// Validate the configuration and connect the default source.
    ///
    /// Fails on an empty source list, a duplicated alias, or a named
    /// default that matches nothing. When no default is named the first
    /// source in configuration order is chosen, deterministically. The
    /// chosen default is connected eagerly; a connection failure here is
    /// a creation failure.
    pub async fn create(config: AppConfig) -> ControllerResult<Self> {
        if config.data_sources.is_empty() {
            return Err(ControllerError::NoDataSources);
        }

        let mut index = HashMap::with_capacity(config.data_sources.len());
        for (pos, source) in config.data_sources.iter().enumerate() {
            if index.insert(source.alias.clone(), pos).is_some() {
                return Err(ControllerError::DuplicateAlias(source.alias.clone()));
            }
        }

        let default_alias = match &config.default {
            Some(alias) => {
                if !index.contains_key(alias) {
                    return Err(ControllerError::DefaultAliasNotFound(alias.clone()));
                }
                alias.clone()
            }
            None => config.data_sources[0].alias.clone(),
        };

        let controller = Self {
            sources: config.data_sources,
            index,
            state: Mutex::new(State::default()),
        };

        {
            let mut state = controller.state.lock().await;
            let config = controller.config_for(&default_alias).clone();
            let source = Self::get_or_connect(&mut state, &config).await?;
            state.current = Some(Active {
                alias: default_alias.clone(),
                source,
            });
        }
        info!(alias = %default_alias, "connected default data source");

        Ok(controller)
    }

    /// All configured aliases with their backend kind, in configuration
    /// order.
    pub fn list(&self) -> Vec<(String, SourceKind)> {
        self.sources
            .iter()
            .map(|s| (s.alias.clone(), s.kind.clone()))
            .collect()
    }

    /// Make `alias` the current source, connecting it if this is its
    /// first use.
    ///
    /// On any failure (unknown alias, unsupported kind, connection
    /// error) `current` is left untouched and the previously active
    /// source stays usable.
    pub async fn switch(&self, alias: &str) -> ControllerResult<()> {
        if !self.index.contains_key(alias) {
            return Err(ControllerError::AliasNotFound(alias.to_string()));
        }

        let config = self.config_for(alias).clone();
        let mut state = self.state.lock().await;
        let source = Self::get_or_connect(&mut state, &config).await?;
        state.current = Some(Active {
            alias: alias.to_string(),
            source,
        });
        info!(alias, "switched data source");
        Ok(())
    }

    /// The presently active adapter
    pub async fn current(&self) -> ControllerResult<Arc<dyn DataSource>> {
        let state = self.state.lock().await;
        state
            .current
            .as_ref()
            .map(|active| active.source.clone())
            .ok_or(ControllerError::NoCurrentDataSource)
    }

    /// Alias of the presently active adapter
    pub async fn current_alias(&self) -> Option<String> {
        let state = self.state.lock().await;
        state.current.as_ref().map(|active| active.alias.clone())
    }

    fn config_for(&self, alias: &str) -> &DataSourceConfig {
        &self.sources[self.index[alias]]
    }

    /// Cache-or-create: at most one live adapter per alias.
    ///
    /// A cached adapter is returned without a liveness re-check. A miss
    /// dispatches on the configured kind; nothing is cached on failure.
    async fn get_or_connect(
        state: &mut State,
        config: &DataSourceConfig,
    ) -> ControllerResult<Arc<dyn DataSource>> {
        if let Some(existing) = state.pool.get(&config.alias) {
            debug!(alias = %config.alias, "reusing cached adapter");
            return Ok(existing.clone());
        }

        debug!(alias = %config.alias, kind = %config.kind, "connecting");
        let source: Arc<dyn DataSource> = match &config.kind {
            SourceKind::Mysql => Arc::new(MysqlSource::connect(&config.dsn).await?),
            SourceKind::Postgresql => Arc::new(PostgresSource::connect(&config.dsn).await?),
            SourceKind::Sqlite => Arc::new(SqliteSource::open(&config.dsn)?),
            SourceKind::Other(name) => {
                return Err(ControllerError::UnsupportedBackend(name.clone()));
            }
        };

        state.pool.insert(config.alias.clone(), source.clone());
        Ok(source)
    }
}
