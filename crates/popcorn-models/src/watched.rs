use serde::{Deserialize, Serialize};
use crate::movie::MovieDetail;
use crate::rating::UserRating;

/// A movie the user has watched and rated.
///
/// Field names on disk follow the browser app's `watched` local storage value,
/// so an exported list can be used as the store file directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchedEntry {
    #[serde(rename = "imdbId")]
    pub external_id: String,
    pub title: String,
    pub year: String,
    #[serde(rename = "poster")]
    pub poster_url: String,
    #[serde(default)]
    pub imdb_rating: Option<f64>,
    #[serde(rename = "runtime", default)]
    pub runtime_minutes: Option<u32>,
    pub user_rating: UserRating,
}

impl WatchedEntry {
    pub fn from_detail(detail: &MovieDetail, user_rating: UserRating) -> Self {
        Self {
            external_id: detail.external_id.clone(),
            title: detail.title.clone(),
            year: detail.year.clone(),
            poster_url: detail.poster_url.clone(),
            imdb_rating: detail.imdb_rating,
            runtime_minutes: detail.runtime_minutes,
            user_rating,
        }
    }
}
