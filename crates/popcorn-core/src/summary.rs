use popcorn_models::WatchedEntry;
use serde::Serialize;

/// Placeholder rendered for a mean over nothing
pub const NO_VALUE: &str = "—";

/// Aggregate view over the watched list, computed on read.
///
/// Means are taken over the entries that carry the value; a mean over no
/// entries is `None` rather than NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchedSummary {
    pub count: usize,
    /// Rounded to one decimal place
    pub avg_imdb_rating: Option<f64>,
    pub avg_user_rating: Option<f64>,
    pub avg_runtime_minutes: Option<f64>,
}

impl WatchedSummary {
    pub fn from_entries(entries: &[WatchedEntry]) -> Self {
        Self {
            count: entries.len(),
            avg_imdb_rating: mean(entries.iter().filter_map(|e| e.imdb_rating)).map(round_to_tenth),
            avg_user_rating: mean(entries.iter().map(|e| f64::from(e.user_rating.value()))),
            avg_runtime_minutes: mean(entries.iter().filter_map(|e| e.runtime_minutes.map(f64::from))),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Render a mean with at most `decimals` places, trailing zeros trimmed
pub fn format_mean(value: Option<f64>, decimals: usize) -> String {
    match value {
        None => NO_VALUE.to_string(),
        Some(v) => {
            let formatted = format!("{:.*}", decimals, v);
            if formatted.contains('.') {
                formatted.trim_end_matches('0').trim_end_matches('.').to_string()
            } else {
                formatted
            }
        }
    }
}
