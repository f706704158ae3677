use std::path::PathBuf;
use std::sync::Arc;

use crate::api::newsapi::NewsApiClient;
use crate::api::NewsApi;
use crate::app::error::{NewsdeskError, Result};
use crate::config::ApiConfig;
use crate::connectivity::{AlwaysOnline, NetworkMonitor, SystemNetworkMonitor};
use crate::repository::NewsRepository;
use crate::store::{FavoriteStore, SqliteStore};
use crate::viewmodel::NewsViewModel;

/// Wires the api client, favorites store, connectivity gate and view model.
pub struct AppContext {
    pub repository: Arc<NewsRepository>,
    pub viewmodel: Arc<NewsViewModel>,
    pub api_config: ApiConfig,
}

impl AppContext {
    pub fn new(db_path: Option<PathBuf>, api_config: ApiConfig) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };
        let store = Arc::new(SqliteStore::new(&db_path)?);
        Self::with_store(store, api_config)
    }

    pub fn in_memory(api_config: ApiConfig) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Self::with_store(store, api_config)
    }

    fn with_store(store: Arc<SqliteStore>, api_config: ApiConfig) -> Result<Self> {
        let api = Arc::new(NewsApiClient::new(&api_config)?);

        let monitor: Arc<dyn NetworkMonitor + Send + Sync> = if api_config.skip_connectivity_check
        {
            Arc::new(AlwaysOnline)
        } else {
            Arc::new(SystemNetworkMonitor::for_base_url(&api_config.base_url))
        };

        Ok(Self::from_parts(store, api, monitor, api_config))
    }

    /// Assemble a context from already-built parts.
    pub fn from_parts(
        favorites: Arc<dyn FavoriteStore + Send + Sync>,
        api: Arc<dyn NewsApi + Send + Sync>,
        monitor: Arc<dyn NetworkMonitor + Send + Sync>,
        api_config: ApiConfig,
    ) -> Self {
        let repository = Arc::new(NewsRepository::new(api, favorites));
        let viewmodel = Arc::new(NewsViewModel::new(
            repository.clone(),
            monitor,
            api_config.viewmodel_settings(),
        ));

        Self {
            repository,
            viewmodel,
            api_config,
        }
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| NewsdeskError::Config("Could not find data directory".into()))?;
        let newsdesk_dir = data_dir.join("newsdesk");
        std::fs::create_dir_all(&newsdesk_dir)?;
        Ok(newsdesk_dir.join("newsdesk.db"))
    }
}
