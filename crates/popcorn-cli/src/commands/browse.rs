//! Interactive session: every plain line is a search query, `:` lines are commands.

use color_eyre::Result;
use popcorn_core::{DetailFetcher, PersistedStore, SearchFetcher, find_entry};
use popcorn_models::{UserRating, WatchedEntry};
use popcorn_sources::MovieSource;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::{debug, info, warn};
use crate::commands::context::AppContext;
use crate::commands::watched::{add_detail, remove_by_id};
use crate::output::Output;
use crate::render;

const HELP: &str = "\
Type a title to search (at least 3 characters). Commands:
  :open N    show details for result N
  :close     close the open movie
  :rate N    add the open movie to your watched list with rating N (1-10)
  :rm ID     remove a movie from your watched list
  :watched   show your watched list
  :help      show this help
  :quit      leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Query(String),
    Open(usize),
    Close,
    Rate(u8),
    Remove(String),
    Watched,
    Help,
    Quit,
    Invalid(String),
}

pub fn parse_command(line: &str) -> BrowseCommand {
    let Some(command) = line.trim().strip_prefix(':') else {
        return BrowseCommand::Query(line.trim_end_matches(['\r', '\n']).to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();
    if parts.next().is_some() {
        return BrowseCommand::Invalid(format!("Too many arguments for :{}", name));
    }

    match (name, arg) {
        ("open", Some(n)) => match n.parse::<usize>() {
            Ok(n) if n > 0 => BrowseCommand::Open(n),
            _ => BrowseCommand::Invalid(format!("Not a result number: {}", n)),
        },
        ("rate", Some(n)) => match n.parse::<u8>() {
            Ok(n) => BrowseCommand::Rate(n),
            Err(_) => BrowseCommand::Invalid(format!("Not a rating: {}", n)),
        },
        ("rm", Some(id)) => BrowseCommand::Remove(id.to_string()),
        ("close", None) => BrowseCommand::Close,
        ("watched", None) => BrowseCommand::Watched,
        ("help", None) => BrowseCommand::Help,
        ("quit" | "q", None) => BrowseCommand::Quit,
        ("open" | "rate" | "rm", None) => BrowseCommand::Invalid(format!(":{} needs an argument", name)),
        _ => BrowseCommand::Invalid(format!("Unknown command :{} (try :help)", name)),
    }
}

struct Session {
    search: SearchFetcher,
    detail: DetailFetcher,
    watched: PersistedStore<Vec<WatchedEntry>>,
}

impl Session {
    fn new(source: Arc<dyn MovieSource>, watched: PersistedStore<Vec<WatchedEntry>>) -> Self {
        Self {
            search: SearchFetcher::new(source.clone()),
            detail: DetailFetcher::new(source),
            watched,
        }
    }

    /// Returns false when the session should end
    fn handle(&mut self, command: BrowseCommand, output: &Output) -> bool {
        debug!(?command, "Browse command");
        match command {
            BrowseCommand::Query(query) => self.search.set_query(query),
            BrowseCommand::Open(n) => {
                let state = self.search.state();
                match state.movies().get(n - 1) {
                    Some(movie) => self.detail.select(Some(&movie.external_id)),
                    None => output.warn(format!("No result #{} (there are {})", n, state.movies().len())),
                }
            }
            BrowseCommand::Close => self.detail.select(None),
            BrowseCommand::Rate(value) => self.rate_open_movie(value, output),
            BrowseCommand::Remove(id) => remove_by_id(&mut self.watched, &id, output),
            BrowseCommand::Watched => render::watched_list(self.watched.get(), output),
            BrowseCommand::Help => output.println(HELP),
            BrowseCommand::Quit => return false,
            BrowseCommand::Invalid(message) => output.warn(message),
        }
        true
    }

    fn rate_open_movie(&mut self, value: u8, output: &Output) {
        let rating = match UserRating::new(value) {
            Ok(rating) => rating,
            Err(e) => {
                output.warn(e.to_string());
                return;
            }
        };

        let Some(detail) = self.detail.state().detail().cloned() else {
            output.warn("Open a movie first with :open N");
            return;
        };

        if let Some(entry) = find_entry(self.watched.get(), &detail.external_id) {
            output.warn(format!("You already rated this movie {} ⭐", entry.user_rating));
            return;
        }
        add_detail(&mut self.watched, &detail, rating, output);
    }
}

pub async fn run_browse(output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let source = ctx.movie_source()?;

    let session = Session::new(source, ctx.watched_store());
    let lines = BufReader::new(tokio::io::stdin()).lines();

    info!("Browse session started");
    output.println(HELP);
    run_session(session, lines, output).await;
    info!("Browse session ended");
    Ok(())
}

/// Drive a session from `lines` until `:quit` or end of input; returns the final session
async fn run_session<R>(mut session: Session, mut lines: Lines<R>, output: &Output) -> Session
where
    R: AsyncBufRead + Unpin,
{
    let mut search_rx = session.search.subscribe();
    let mut detail_rx = session.detail.subscribe();

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if !session.handle(parse_command(&line), output) {
                        break;
                    }
                }
                Ok(None) => {
                    // Piped input: let the last request finish before leaving
                    session.search.settled().await;
                    session.detail.settled().await;
                    if search_rx.has_changed().unwrap_or(false) {
                        let state = search_rx.borrow_and_update().clone();
                        render::search_state(&state, session.watched.get(), output);
                    }
                    if detail_rx.has_changed().unwrap_or(false) {
                        let state = detail_rx.borrow_and_update().clone();
                        render::detail_state(&state, session.watched.get(), output);
                    }
                    break;
                }
                Err(e) => {
                    warn!("Failed to read input: {}", e);
                    break;
                }
            },
            changed = search_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = search_rx.borrow_and_update().clone();
                render::search_state(&state, session.watched.get(), output);
            },
            changed = detail_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = detail_rx.borrow_and_update().clone();
                render::detail_state(&state, session.watched.get(), output);
            },
        }
    }

    session.search.shutdown().await;
    session.detail.settled().await;
    session
}
