use async_trait::async_trait;
use popcorn_models::{MovieDetail, SearchResult};
use tokio_util::sync::CancellationToken;
use crate::error::SourceError;

#[async_trait]
pub trait MovieSource: Send + Sync {
    // Source metadata
    fn source_name(&self) -> &str;

    /// Search titles matching `query`.
    ///
    /// Implementations must watch `cancel` and return `SourceError::Cancelled`
    /// once it fires, dropping any in-flight request.
    async fn search(&self, query: &str, cancel: &CancellationToken) -> Result<Vec<SearchResult>, SourceError>;

    /// Fetch the full record for one title
    async fn details(&self, external_id: &str) -> Result<MovieDetail, SourceError>;
}
