//! Query-driven search lifecycle.
//!
//! Every call to [`SearchFetcher::set_query`] starts a new generation. A
//! qualifying query spawns one fetch task holding a fresh cancellation token;
//! the previous generation's token is cancelled first. A task only writes its
//! outcome if its generation is still current, and that check happens under the
//! state channel's lock, so a superseded fetch that completes anyway can never
//! overwrite a newer outcome.

use popcorn_models::SearchResult;
use popcorn_sources::{MovieSource, SourceError};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Queries shorter than this (in characters) never reach the network
pub const MIN_QUERY_LEN: usize = 3;

/// User-visible reason a search produced no results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFailure {
    NotFound,
    /// Transport or HTTP failure; the payload is detail for logs only
    Transport(String),
}

impl fmt::Display for SearchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchFailure::NotFound => write!(f, "Movie not found"),
            SearchFailure::Transport(_) => write!(f, "Something went wrong"),
        }
    }
}

impl From<&SourceError> for SearchFailure {
    fn from(err: &SourceError) -> Self {
        if err.is_not_found() {
            SearchFailure::NotFound
        } else {
            SearchFailure::Transport(err.detail())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchStatus {
    /// No qualifying query: results are empty and there is no error
    #[default]
    Idle,
    Loading,
    Loaded(Vec<SearchResult>),
    Failed(SearchFailure),
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
    pub status: SearchStatus,
    generation: u64,
}

impl SearchState {
    pub fn movies(&self) -> &[SearchResult] {
        match &self.status {
            SearchStatus::Loaded(movies) => movies,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, SearchStatus::Loading)
    }

    pub fn error(&self) -> Option<&SearchFailure> {
        match &self.status {
            SearchStatus::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

pub struct SearchFetcher {
    source: Arc<dyn MovieSource>,
    state: Arc<watch::Sender<SearchState>>,
    generation: u64,
    active: Option<CancellationToken>,
    tasks: Vec<JoinHandle<()>>,
}

impl SearchFetcher {
    pub fn new(source: Arc<dyn MovieSource>) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            source,
            state: Arc::new(state),
            generation: 0,
            active: None,
            tasks: Vec::new(),
        }
    }

    /// Observe state transitions
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Start a new search generation for `query`, cancelling the previous one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        self.cancel_active();
        self.tasks.retain(|task| !task.is_finished());
        self.generation += 1;
        let generation = self.generation;

        if query.chars().count() < MIN_QUERY_LEN {
            debug!("Query {:?} below {} characters, clearing results", query, MIN_QUERY_LEN);
            self.state.send_modify(|state| {
                state.query = query;
                state.status = SearchStatus::Idle;
                state.generation = generation;
            });
            return;
        }

        let token = CancellationToken::new();
        self.active = Some(token.clone());
        self.state.send_modify(|state| {
            state.query = query.clone();
            state.status = SearchStatus::Loading;
            state.generation = generation;
        });

        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let task = tokio::spawn(async move {
            let outcome = source.search(&query, &token).await;

            let status = match outcome {
                Ok(movies) => {
                    info!("Search {:?} found {} movies", query, movies.len());
                    SearchStatus::Loaded(movies)
                }
                Err(e) if e.is_cancelled() => {
                    debug!("Search {:?} cancelled (generation {})", query, generation);
                    return;
                }
                Err(e) => {
                    warn!("Search {:?} failed: {} ({})", query, e, e.detail());
                    SearchStatus::Failed(SearchFailure::from(&e))
                }
            };

            let applied = state.send_if_modified(|current| {
                if current.generation != generation {
                    return false;
                }
                current.status = status;
                true
            });
            if !applied {
                debug!("Discarding stale result for {:?} (generation {})", query, generation);
            }
        });
        self.tasks.push(task);
    }

    /// Wait for every spawned fetch, including superseded ones, to finish
    pub async fn settled(&mut self) {
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!("Search task ended abnormally: {}", e);
            }
        }
    }

    /// Cancel the active fetch and wait for all tasks to finish.
    ///
    /// A search still loading ends in `Idle`; nothing issued before shutdown
    /// can publish afterwards.
    pub async fn shutdown(&mut self) {
        self.cancel_active();
        self.generation += 1;
        let generation = self.generation;
        self.state.send_if_modified(|state| {
            state.generation = generation;
            if !state.is_loading() {
                return false;
            }
            state.status = SearchStatus::Idle;
            true
        });
        self.settled().await;
    }

    fn cancel_active(&mut self) {
        if let Some(token) = self.active.take() {
            token.cancel();
        }
    }
}

impl Drop for SearchFetcher {
    fn drop(&mut self) {
        self.cancel_active();
    }
}
