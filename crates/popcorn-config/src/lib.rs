pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{Config, OmdbConfig, StorageConfig, DEFAULT_OMDB_BASE_URL, DEFAULT_WATCHED_KEY};
pub use credentials::{CredentialStore, API_KEY_ENV};
pub use paths::{PathManager, base_path_override};
