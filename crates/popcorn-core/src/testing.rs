//! Scripted movie source for exercising the fetch lifecycles.

use async_trait::async_trait;
use popcorn_models::{MovieDetail, SearchResult};
use popcorn_sources::{MovieSource, SourceError};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

type SearchReply = Result<Vec<SearchResult>, SourceError>;
type DetailReply = Result<MovieDetail, SourceError>;

/// Queries without a registered gate answer immediately with one canned result.
#[derive(Default)]
pub(crate) struct FakeSource {
    honor_cancel: bool,
    search_gates: Mutex<HashMap<String, oneshot::Receiver<SearchReply>>>,
    detail_gates: Mutex<HashMap<String, oneshot::Receiver<DetailReply>>>,
    search_calls: Mutex<Vec<String>>,
    detail_calls: Mutex<Vec<String>>,
}

impl FakeSource {
    /// Source that aborts as soon as the token fires, like the real client
    pub(crate) fn new() -> Self {
        Self {
            honor_cancel: true,
            ..Self::default()
        }
    }

    /// Source that finishes its request even after cancellation
    pub(crate) fn ignoring_cancel() -> Self {
        Self::default()
    }

    pub(crate) fn gate_search(&self, query: &str) -> oneshot::Sender<SearchReply> {
        let (tx, rx) = oneshot::channel();
        self.search_gates.lock().unwrap().insert(query.to_string(), rx);
        tx
    }

    pub(crate) fn gate_details(&self, external_id: &str) -> oneshot::Sender<DetailReply> {
        let (tx, rx) = oneshot::channel();
        self.detail_gates.lock().unwrap().insert(external_id.to_string(), rx);
        tx
    }

    pub(crate) fn search_calls(&self) -> Vec<String> {
        self.search_calls.lock().unwrap().clone()
    }

    pub(crate) fn detail_calls(&self) -> Vec<String> {
        self.detail_calls.lock().unwrap().clone()
    }
}

fn closed_gate() -> SourceError {
    SourceError::NotFound {
        reason: Some("gate dropped".to_string()),
    }
}

pub(crate) fn search_result(id: &str, title: &str) -> SearchResult {
    SearchResult {
        external_id: id.to_string(),
        title: title.to_string(),
        year: "1999".to_string(),
        poster_url: "N/A".to_string(),
    }
}

pub(crate) fn movie_detail(id: &str, title: &str) -> MovieDetail {
    MovieDetail {
        external_id: id.to_string(),
        title: title.to_string(),
        year: "1994".to_string(),
        poster_url: "N/A".to_string(),
        runtime: "142 min".to_string(),
        runtime_minutes: Some(142),
        imdb_rating: Some(9.3),
        plot: String::new(),
        release_date: "14 Oct 1994".to_string(),
        actors: String::new(),
        director: String::new(),
        genre: "Drama".to_string(),
    }
}

#[async_trait]
impl MovieSource for FakeSource {
    fn source_name(&self) -> &str {
        "fake"
    }

    async fn search(&self, query: &str, cancel: &CancellationToken) -> Result<Vec<SearchResult>, SourceError> {
        self.search_calls.lock().unwrap().push(query.to_string());
        let gate = self.search_gates.lock().unwrap().remove(query);
        let Some(gate) = gate else {
            return Ok(vec![search_result(&format!("id-{}", query), query)]);
        };

        if self.honor_cancel {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(SourceError::Cancelled),
                reply = gate => reply.unwrap_or_else(|_| Err(closed_gate())),
            }
        } else {
            gate.await.unwrap_or_else(|_| Err(closed_gate()))
        }
    }

    async fn details(&self, external_id: &str) -> Result<MovieDetail, SourceError> {
        self.detail_calls.lock().unwrap().push(external_id.to_string());
        let gate = self.detail_gates.lock().unwrap().remove(external_id);
        match gate {
            Some(gate) => gate.await.unwrap_or_else(|_| Err(closed_gate())),
            None => Ok(movie_detail(external_id, external_id)),
        }
    }
}
