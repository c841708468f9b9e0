use color_eyre::eyre::eyre;
use color_eyre::Result;
use popcorn_config::{Config, CredentialStore, PathManager, API_KEY_ENV};
use popcorn_core::{JsonFileBackend, PersistedStore, StorageBackend};
use popcorn_models::WatchedEntry;
use popcorn_sources::{MovieSource, OmdbClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Paths and settings shared by every command
pub struct AppContext {
    pub paths: PathManager,
    pub config: Config,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        let paths = PathManager::default();
        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        config.validate().map_err(|e| eyre!("Invalid configuration: {}", e))?;
        debug!("Using config dir {}", paths.config_dir().display());
        Ok(Self { paths, config })
    }

    /// Build the OMDb client with the configured API key
    pub fn movie_source(&self) -> Result<Arc<dyn MovieSource>> {
        let mut credentials = CredentialStore::new(self.paths.credentials_file());
        credentials.load().map_err(|e| eyre!("Failed to load credentials: {}", e))?;

        let api_key = credentials.resolve_omdb_api_key().ok_or_else(|| {
            eyre!(
                "No OMDb API key configured. Run 'popcorn config api-key' or set {}",
                API_KEY_ENV
            )
        })?;

        let client = OmdbClient::new(
            self.config.omdb.base_url.clone(),
            api_key,
            Duration::from_secs(self.config.omdb.timeout_secs),
        )?;
        debug!("Using {} at {}", client.source_name(), client.base_url());
        Ok(Arc::new(client))
    }

    pub fn storage_backend(&self) -> Arc<dyn StorageBackend> {
        Arc::new(JsonFileBackend::new(self.paths.store_dir()))
    }

    /// Open the persisted watched list
    pub fn watched_store(&self) -> PersistedStore<Vec<WatchedEntry>> {
        PersistedStore::open(self.storage_backend(), self.config.storage.watched_key.clone(), Vec::new())
    }
}
