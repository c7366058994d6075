//! AnimeKai Scraper Core Library
//!
//! This crate scrapes animekai.to pages into typed, JSON-serializable
//! records.
//!
//! # Features
//! - Home page sections (spotlight, trending, latest episodes, most popular)
//! - Search with pagination
//! - Anime details and episode lists
//! - Episode servers per category (sub/dub/raw)
//! - Streaming sources and subtitles of an episode server
//!
//! Parsing goes through the [`parser::MarkupParser`] and
//! [`parser::SourceExtractor`] traits so the site layout rules can be swapped
//! without touching the fetch pipeline.

pub mod client;
pub mod error;
pub mod parser;
pub mod scraper;
pub mod types;

// Re-export main types for convenience
pub use client::{AnimeKaiClient, ClientConfig, FetchResponse};
pub use error::{AnimeKaiError, Result};
pub use scraper::{AnimeKaiScraper, SiteConfig, ANIMEKAI_BASE_URL, DEFAULT_CATEGORY, DEFAULT_SERVER};
pub use types::{
    push_filter, AnimeDetail, AnimeSummary, Category, EpisodeId, EpisodeList, EpisodeServers,
    EpisodeSources, FilterValue, HomePage, SearchFilters, SearchResultPage, ServerKey,
};
