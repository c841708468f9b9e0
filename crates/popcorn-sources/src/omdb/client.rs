use async_trait::async_trait;
use popcorn_models::{MovieDetail, SearchResult};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use crate::error::SourceError;
use crate::omdb::api;
use crate::traits::MovieSource;

/// Create a reqwest Client with an explicit request timeout
pub fn create_omdb_client(timeout: Duration) -> Result<Client, SourceError> {
    let client = Client::builder()
        .user_agent(concat!("popcorn/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()?;
    Ok(client)
}

#[derive(Clone)]
pub struct OmdbClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            client: Arc::new(create_omdb_client(timeout)?),
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl MovieSource for OmdbClient {
    fn source_name(&self) -> &str {
        "omdb"
    }

    async fn search(&self, query: &str, cancel: &CancellationToken) -> Result<Vec<SearchResult>, SourceError> {
        // Losing the race drops the request future, which aborts the connection
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("OMDb search {:?} cancelled", query);
                Err(SourceError::Cancelled)
            }
            result = api::search(&self.client, &self.base_url, &self.api_key, query) => result,
        }
    }

    async fn details(&self, external_id: &str) -> Result<MovieDetail, SourceError> {
        let detail = api::get_details(&self.client, &self.base_url, &self.api_key, external_id).await?;
        info!("Fetched details for {} ({})", detail.external_id, detail.title);
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OmdbClient {
        OmdbClient::new(format!("{}/", server.uri()), "test-key", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_search_sends_key_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("apikey", "test-key"))
            .and(query_param("s", "matrix"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"Search":[{"Title":"The Matrix","Year":"1999","imdbID":"tt0133093","Poster":"N/A"}],"Response":"True"}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let results = client_for(&server).search("matrix", &CancellationToken::new()).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].external_id, "tt0133093");
    }

    #[tokio::test]
    async fn test_search_server_error_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server).search("matrix", &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, SourceError::Status(status) if status.as_u16() == 500));
        assert_eq!(err.to_string(), "Something went wrong");
    }

    #[tokio::test]
    async fn test_details_undecodable_ok_body_is_decode_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).details("tt0133093").await.unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
        assert!(!err.detail().contains("HTTP"));
    }

    #[tokio::test]
    async fn test_search_false_response_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"Response":"False","Error":"Movie not found!"}"#))
            .mount(&server)
            .await;

        let err = client_for(&server).search("zzzzzz", &CancellationToken::new()).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Movie not found");
    }

    #[tokio::test]
    async fn test_search_cancelled_before_send() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"Response":"True","Search":[]}"#))
            .expect(0)
            .mount(&server)
            .await;

        let token = CancellationToken::new();
        token.cancel();
        let err = client_for(&server).search("matrix", &token).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_search_cancelled_in_flight() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"Response":"True","Search":[]}"#)
                    .set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let err = client.search("matrix", &token).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_details_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("i", "tt0111161"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"Title":"The Shawshank Redemption","Year":"1994","Runtime":"142 min","imdbRating":"9.3","imdbID":"tt0111161","Response":"True"}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let detail = client_for(&server).details("tt0111161").await.unwrap();
        assert_eq!(detail.title, "The Shawshank Redemption");
        assert_eq!(detail.runtime_minutes, Some(142));
    }
}
