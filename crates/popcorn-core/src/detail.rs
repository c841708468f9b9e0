//! Selection-driven detail lifecycle.
//!
//! A fetch is issued only when the selected identifier changes. In-flight
//! requests are not cancelled on reselection, but a response for an older
//! selection is dropped instead of replacing the current one.

use popcorn_models::MovieDetail;
use popcorn_sources::MovieSource;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DetailStatus {
    #[default]
    Idle,
    Loading,
    Loaded(MovieDetail),
    /// Loading ended without a record; the message is for display only
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct DetailState {
    pub selected: Option<String>,
    pub status: DetailStatus,
    generation: u64,
}

impl DetailState {
    pub fn is_loading(&self) -> bool {
        matches!(self.status, DetailStatus::Loading)
    }

    pub fn detail(&self) -> Option<&MovieDetail> {
        match &self.status {
            DetailStatus::Loaded(detail) => Some(detail),
            _ => None,
        }
    }
}

pub struct DetailFetcher {
    source: Arc<dyn MovieSource>,
    state: Arc<watch::Sender<DetailState>>,
    generation: u64,
    selected: Option<String>,
    tasks: Vec<JoinHandle<()>>,
}

impl DetailFetcher {
    pub fn new(source: Arc<dyn MovieSource>) -> Self {
        let (state, _) = watch::channel(DetailState::default());
        Self {
            source,
            state: Arc::new(state),
            generation: 0,
            selected: None,
            tasks: Vec::new(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> DetailState {
        self.state.borrow().clone()
    }

    /// Select a movie (or clear the selection with `None`).
    ///
    /// Reselecting the current identifier does nothing. Must be called from
    /// within a tokio runtime.
    pub fn select(&mut self, external_id: Option<&str>) {
        if self.selected.as_deref() == external_id {
            return;
        }
        self.tasks.retain(|task| !task.is_finished());
        self.generation += 1;
        let generation = self.generation;
        self.selected = external_id.map(str::to_string);

        let Some(external_id) = external_id.map(str::to_string) else {
            self.state.send_modify(|state| {
                state.selected = None;
                state.status = DetailStatus::Idle;
                state.generation = generation;
            });
            return;
        };

        self.state.send_modify(|state| {
            state.selected = Some(external_id.clone());
            state.status = DetailStatus::Loading;
            state.generation = generation;
        });

        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let task = tokio::spawn(async move {
            let status = match source.details(&external_id).await {
                Ok(detail) => DetailStatus::Loaded(detail),
                Err(e) => {
                    warn!("Failed to fetch details for {}: {} ({})", external_id, e, e.detail());
                    DetailStatus::Failed(e.to_string())
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
                debug!("Discarding details for {} (selection changed)", external_id);
            }
        });
        self.tasks.push(task);
    }

    /// Close the movie if it is open, otherwise open it
    pub fn toggle(&mut self, external_id: &str) {
        if self.selected.as_deref() == Some(external_id) {
            self.select(None);
        } else {
            self.select(Some(external_id));
        }
    }

    /// Wait for every spawned fetch to finish
    pub async fn settled(&mut self) {
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!("Detail task ended abnormally: {}", e);
            }
        }
    }
}
