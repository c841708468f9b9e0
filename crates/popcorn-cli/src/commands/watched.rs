use color_eyre::Result;
use popcorn_core::{PersistedStore, add_entry, find_entry, remove_entry};
use popcorn_models::{MovieDetail, UserRating, WatchedEntry};
use crate::commands::context::AppContext;
use crate::commands::show::fetch_detail;
use crate::output::Output;
use crate::render;

/// Add a fetched movie with the user's rating; reports the outcome on `output`
pub fn add_detail(store: &mut PersistedStore<Vec<WatchedEntry>>, detail: &MovieDetail, rating: UserRating, output: &Output) {
    let entry = WatchedEntry::from_detail(detail, rating);
    let next = match add_entry(store.get(), entry) {
        Ok(next) => next,
        Err(e) => {
            output.warn(e.to_string());
            return;
        }
    };

    if let Err(e) = store.set(next) {
        output.warn(format!("Added to this session, but {:?} could not be saved: {}", store.key(), e));
        return;
    }
    output.success(format!("Added \"{}\" with your rating {} ⭐", detail.title, rating));
}

/// Remove a movie by identifier; reports the outcome on `output`
pub fn remove_by_id(store: &mut PersistedStore<Vec<WatchedEntry>>, external_id: &str, output: &Output) {
    let Some(title) = find_entry(store.get(), external_id).map(|entry| entry.title.clone()) else {
        output.warn(format!("{} is not in your watched list", external_id));
        return;
    };

    if let Err(e) = store.update(|list| remove_entry(list, external_id)) {
        output.warn(format!("Removed from this session, but {:?} could not be saved: {}", store.key(), e));
        return;
    }
    output.success(format!("Removed \"{}\"", title));
}

pub async fn run_add(external_id: String, rating: u8, output: &Output) -> Result<()> {
    let rating = UserRating::new(rating)?;
    let ctx = AppContext::load()?;
    let mut store = ctx.watched_store();

    if let Some(entry) = find_entry(store.get(), &external_id) {
        output.warn(format!("You already rated \"{}\" {} ⭐", entry.title, entry.user_rating));
        return Ok(());
    }

    let source = ctx.movie_source()?;
    let detail = fetch_detail(source, &external_id, output).await?;
    add_detail(&mut store, &detail, rating, output);
    Ok(())
}

pub async fn run_remove(external_id: String, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let mut store = ctx.watched_store();
    remove_by_id(&mut store, &external_id, output);
    Ok(())
}

pub async fn run_list(output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let store = ctx.watched_store();
    render::watched_list(store.get(), output);
    Ok(())
}
