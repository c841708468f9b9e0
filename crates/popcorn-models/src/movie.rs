use serde::{Deserialize, Serialize};

/// Placeholder OMDb uses for unknown field values
pub const NOT_AVAILABLE: &str = "N/A";

/// One row of a search response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    pub external_id: String,
    pub title: String,
    pub year: String,
    pub poster_url: String,
}

/// Full record for a single movie, fetched when it is selected
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetail {
    pub external_id: String,
    pub title: String,
    pub year: String,
    pub poster_url: String,
    /// Raw runtime as reported, e.g. "142 min"
    pub runtime: String,
    pub runtime_minutes: Option<u32>,
    pub imdb_rating: Option<f64>,
    pub plot: String,
    pub release_date: String,
    pub actors: String,
    pub director: String,
    pub genre: String,
}

/// Extract the leading integer of a runtime string ("142 min" -> 142).
pub fn parse_runtime_minutes(raw: &str) -> Option<u32> {
    raw.split_whitespace().next()?.parse().ok()
}

/// Parse a rating such as "8.3"; "N/A" and garbage yield `None`.
pub fn parse_imdb_rating(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == NOT_AVAILABLE {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}
