use color_eyre::eyre::eyre;
use color_eyre::Result;
use popcorn_core::{DetailFetcher, DetailStatus};
use popcorn_models::MovieDetail;
use popcorn_sources::MovieSource;
use std::sync::Arc;
use crate::commands::context::AppContext;
use crate::commands::spinner::Spinner;
use crate::output::Output;
use crate::render;

fn detail_outcome(status: DetailStatus) -> Result<MovieDetail> {
    match status {
        DetailStatus::Loaded(detail) => Ok(detail),
        DetailStatus::Failed(message) => Err(eyre!(message)),
        DetailStatus::Idle | DetailStatus::Loading => Err(eyre!("Loading details did not complete")),
    }
}

/// Fetch one movie through the detail lifecycle
pub async fn fetch_detail(source: Arc<dyn MovieSource>, external_id: &str, output: &Output) -> Result<MovieDetail> {
    let mut fetcher = DetailFetcher::new(source);
    let spinner = Spinner::start(format!("Loading {}...", external_id), output);
    fetcher.select(Some(external_id));
    fetcher.settled().await;
    spinner.finish();

    detail_outcome(fetcher.state().status)
}

pub async fn run_show(external_id: String, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let source = ctx.movie_source()?;
    let watched = ctx.watched_store();

    let detail = fetch_detail(source, &external_id, output).await?;
    render::movie_detail(&detail, watched.get(), output);
    Ok(())
}
