use popcorn_models::{MovieDetail, SearchResult, parse_imdb_rating, parse_runtime_minutes};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use crate::error::SourceError;


/// `Response` field value OMDb uses for a successful lookup
const RESPONSE_TRUE: &str = "True";

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchItem>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchItem {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: String,
}

#[derive(Debug, Deserialize)]
struct OmdbDetailResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(rename = "imdbID", default)]
    imdb_id: String,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: String,
    #[serde(rename = "Runtime", default)]
    runtime: String,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: String,
    #[serde(rename = "Plot", default)]
    plot: String,
    #[serde(rename = "Released", default)]
    released: String,
    #[serde(rename = "Actors", default)]
    actors: String,
    #[serde(rename = "Director", default)]
    director: String,
    #[serde(rename = "Genre", default)]
    genre: String,
}

impl From<OmdbSearchItem> for SearchResult {
    fn from(item: OmdbSearchItem) -> Self {
        SearchResult {
            external_id: item.imdb_id,
            title: item.title,
            year: item.year,
            poster_url: item.poster,
        }
    }
}

impl OmdbDetailResponse {
    /// Convert into a `MovieDetail`; the id falls back to the requested one when the body omits it
    fn into_detail(self, requested_id: &str) -> MovieDetail {
        let external_id = if self.imdb_id.is_empty() {
            requested_id.to_string()
        } else {
            self.imdb_id
        };
        MovieDetail {
            external_id,
            runtime_minutes: parse_runtime_minutes(&self.runtime),
            imdb_rating: parse_imdb_rating(&self.imdb_rating),
            title: self.title,
            year: self.year,
            poster_url: self.poster,
            runtime: self.runtime,
            plot: self.plot,
            release_date: self.released,
            actors: self.actors,
            director: self.director,
            genre: self.genre,
        }
    }
}

fn parse_search_body(body: &str) -> Result<Vec<SearchResult>, SourceError> {
    let parsed: OmdbSearchResponse = serde_json::from_str(body).map_err(decode_error)?;
    if parsed.response != RESPONSE_TRUE {
        return Err(SourceError::NotFound { reason: parsed.error });
    }
    Ok(parsed.search.into_iter().map(SearchResult::from).collect())
}

fn parse_detail_body(body: &str, requested_id: &str) -> Result<MovieDetail, SourceError> {
    let parsed: OmdbDetailResponse = serde_json::from_str(body).map_err(decode_error)?;
    if parsed.response != RESPONSE_TRUE {
        return Err(SourceError::NotFound { reason: parsed.error });
    }
    Ok(parsed.into_detail(requested_id))
}

fn decode_error(e: serde_json::Error) -> SourceError {
    debug!("Failed to decode OMDb response: {}", e);
    SourceError::Decode(e)
}

async fn get_body(client: &Client, base_url: &str, params: &[(&str, &str)]) -> Result<String, SourceError> {
    let response = client
        .get(base_url)
        .query(params)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(SourceError::Status(response.status()));
    }

    Ok(response.text().await?)
}

/// Search OMDb by title: `GET {base_url}?apikey={key}&s={query}`
pub async fn search(client: &Client, base_url: &str, api_key: &str, query: &str) -> Result<Vec<SearchResult>, SourceError> {
    let body = get_body(client, base_url, &[("apikey", api_key), ("s", query)]).await?;
    let results = parse_search_body(&body)?;
    debug!("OMDb search {:?} returned {} results", query, results.len());
    Ok(results)
}

/// Fetch a single title: `GET {base_url}?apikey={key}&i={id}`
pub async fn get_details(client: &Client, base_url: &str, api_key: &str, external_id: &str) -> Result<MovieDetail, SourceError> {
    let body = get_body(client, base_url, &[("apikey", api_key), ("i", external_id)]).await?;
    parse_detail_body(&body, external_id)
}
