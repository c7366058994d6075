//! Error types for the AnimeKai scraper
//!
//! Every scraper operation either returns a fully populated value or one of
//! these errors. Missing page regions are never errors; the parsers degrade
//! them to empty values instead.
//! AnimeKaiError implements Serialize so it can be embedded in JSON responses.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for AnimeKai scraper operations
#[derive(Error, Debug)]
pub enum AnimeKaiError {
    /// Upstream unreachable, connection reset or request timed out
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with a non-2xx status
    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// The requested server has no frame for the requested category
    #[error("Server {server} not found for category {category}")]
    ServerNotFound { server: String, category: String },

    /// Episode id is not of the form `<animeId>?ep=<number>`
    #[error("Malformed episode id: {0:?}")]
    MalformedEpisodeId(String),

    /// A configured or scraped URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Serialize AnimeKaiError as its display string
impl Serialize for AnimeKaiError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for AnimeKai scraper operations
pub type Result<T> = std::result::Result<T, AnimeKaiError>;
