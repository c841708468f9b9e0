use color_eyre::eyre::eyre;
use color_eyre::Result;
use popcorn_core::{SearchFetcher, SearchStatus, MIN_QUERY_LEN};
use popcorn_models::SearchResult;
use crate::commands::context::AppContext;
use crate::commands::spinner::Spinner;
use crate::output::Output;
use crate::render;

/// Settled search status as a command result; `None` means the query was too short
fn search_outcome(status: SearchStatus) -> Result<Option<Vec<SearchResult>>> {
    match status {
        SearchStatus::Idle => Ok(None),
        SearchStatus::Loaded(movies) => Ok(Some(movies)),
        SearchStatus::Failed(failure) => Err(eyre!("{}", failure)),
        SearchStatus::Loading => Err(eyre!("Search did not complete")),
    }
}

pub async fn run_search(query: String, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let source = ctx.movie_source()?;
    let watched = ctx.watched_store();

    let mut fetcher = SearchFetcher::new(source);
    let spinner = Spinner::start(format!("Searching for \"{}\"...", query), output);
    fetcher.set_query(query);
    fetcher.settled().await;
    spinner.finish();

    match search_outcome(fetcher.state().status)? {
        Some(movies) => render::search_results(&movies, watched.get(), output),
        None => output.warn(format!("Type at least {} characters to search", MIN_QUERY_LEN)),
    }
    Ok(())
}
