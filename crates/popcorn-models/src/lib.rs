pub mod movie;
pub mod rating;
pub mod watched;

pub use movie::{MovieDetail, SearchResult, NOT_AVAILABLE, parse_imdb_rating, parse_runtime_minutes};
pub use rating::{RatingError, UserRating, MAX_USER_RATING, MIN_USER_RATING};
pub use watched::WatchedEntry;
