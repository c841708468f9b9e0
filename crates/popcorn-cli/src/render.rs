use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use popcorn_core::{
    DetailState, DetailStatus, SearchState, SearchStatus, WatchedSummary, find_entry, format_mean, is_watched,
    MIN_QUERY_LEN,
};
use popcorn_models::{MovieDetail, SearchResult, WatchedEntry};
use serde_json::json;
use crate::output::Output;

fn styled_table() -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn header(title: &str) -> Cell {
    Cell::new(title).fg(Color::Cyan).add_attribute(Attribute::Bold)
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() || value == popcorn_models::NOT_AVAILABLE {
        "—"
    } else {
        value
    }
}

pub fn search_results(movies: &[SearchResult], watched: &[WatchedEntry], output: &Output) {
    if !output.is_human() {
        output.json(&json!({
            "type": "search_results",
            "count": movies.len(),
            "results": movies,
        }));
        return;
    }

    output.println(format!("Found {} results", movies.len().to_string().bold()));
    if movies.is_empty() {
        return;
    }

    let mut table = styled_table();
    table.set_header(vec![header("#"), header("Title"), header("Year"), header("IMDb ID"), header("Watched")]);
    for (index, movie) in movies.iter().enumerate() {
        let watched_mark = if is_watched(watched, &movie.external_id) { "✓".green().to_string() } else { String::new() };
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&movie.title),
            Cell::new(&movie.year),
            Cell::new(&movie.external_id),
            Cell::new(watched_mark),
        ]);
    }
    output.println(table.to_string());
}

/// Render one search state transition (used by the interactive session)
pub fn search_state(state: &SearchState, watched: &[WatchedEntry], output: &Output) {
    match &state.status {
        SearchStatus::Idle if state.query.is_empty() => {}
        SearchStatus::Idle => output.info(format!("Type at least {} characters to search", MIN_QUERY_LEN)),
        SearchStatus::Loading => output.info(format!("Loading \"{}\"...", state.query)),
        SearchStatus::Loaded(movies) => search_results(movies, watched, output),
        SearchStatus::Failed(failure) => output.error(failure.to_string()),
    }
}

pub fn movie_detail(detail: &MovieDetail, watched: &[WatchedEntry], output: &Output) {
    let your_rating = find_entry(watched, &detail.external_id).map(|entry| entry.user_rating.value());

    if !output.is_human() {
        output.json(&json!({
            "type": "movie_detail",
            "movie": detail,
            "watched": your_rating.is_some(),
            "user_rating": your_rating,
        }));
        return;
    }

    let imdb = detail.imdb_rating.map(|r| format!("{:.1}", r)).unwrap_or_else(|| "—".to_string());
    let mut table = styled_table();
    table.set_header(vec![header(&detail.title), Cell::new(&detail.external_id)]);
    table.add_row(vec![Cell::new("Released"), Cell::new(format!("{} • {}", or_dash(&detail.release_date), or_dash(&detail.runtime)))]);
    table.add_row(vec![Cell::new("Genre"), Cell::new(or_dash(&detail.genre))]);
    table.add_row(vec![Cell::new("IMDb rating"), Cell::new(format!("⭐ {}", imdb))]);
    table.add_row(vec![Cell::new("Plot"), Cell::new(or_dash(&detail.plot))]);
    table.add_row(vec![Cell::new("Starring"), Cell::new(or_dash(&detail.actors))]);
    table.add_row(vec![Cell::new("Directed by"), Cell::new(or_dash(&detail.director))]);
    output.println(table.to_string());

    match your_rating {
        Some(rating) => output.info(format!("You rated this movie {} ⭐", rating.to_string().bold())),
        None => output.info("Not in your watched list yet"),
    }
}

/// Render one detail state transition (used by the interactive session)
pub fn detail_state(state: &DetailState, watched: &[WatchedEntry], output: &Output) {
    match &state.status {
        DetailStatus::Idle => {}
        DetailStatus::Loading => output.info("Loading details..."),
        DetailStatus::Loaded(detail) => movie_detail(detail, watched, output),
        DetailStatus::Failed(message) => output.error(message),
    }
}

pub fn summary(summary: &WatchedSummary, output: &Output) {
    if !output.is_human() {
        output.json(&json!({
            "type": "watched_summary",
            "summary": summary,
        }));
        return;
    }

    output.println(format!(
        "{}  #️⃣ {} movies  ⭐️ {}  🌟 {}  ⏳ {} min",
        "Movies you watched".bold(),
        summary.count,
        format_mean(summary.avg_imdb_rating, 1),
        format_mean(summary.avg_user_rating, 2),
        format_mean(summary.avg_runtime_minutes, 0),
    ));
}

pub fn watched_list(entries: &[WatchedEntry], output: &Output) {
    let stats = WatchedSummary::from_entries(entries);
    if !output.is_human() {
        output.json(&json!({
            "type": "watched",
            "summary": stats,
            "entries": entries,
        }));
        return;
    }

    summary(&stats, output);
    if entries.is_empty() {
        return;
    }

    let mut table = styled_table();
    table.set_header(vec![header("IMDb ID"), header("Title"), header("Year"), header("⭐️"), header("🌟"), header("⏳")]);
    for entry in entries {
        table.add_row(vec![
            Cell::new(&entry.external_id),
            Cell::new(&entry.title),
            Cell::new(&entry.year),
            Cell::new(entry.imdb_rating.map(|r| r.to_string()).unwrap_or_else(|| "—".to_string())),
            Cell::new(entry.user_rating),
            Cell::new(entry.runtime_minutes.map(|m| format!("{} min", m)).unwrap_or_else(|| "—".to_string())),
        ]);
    }
    output.println(table.to_string());
}
