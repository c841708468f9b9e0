pub mod api;
pub mod client;

pub use client::{OmdbClient, create_omdb_client};
