pub mod detail;
pub mod search;
pub mod storage;
pub mod store;
pub mod summary;
pub mod watched;

#[cfg(test)]
mod testing;

pub use detail::{DetailFetcher, DetailState, DetailStatus};
pub use search::{SearchFailure, SearchFetcher, SearchState, SearchStatus, MIN_QUERY_LEN};
pub use storage::{JsonFileBackend, MemoryBackend, StorageBackend, StorageError};
pub use store::PersistedStore;
pub use summary::{WatchedSummary, format_mean};
pub use watched::{WatchedError, add_entry, find_entry, is_watched, remove_entry};
