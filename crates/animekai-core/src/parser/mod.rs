//! Extraction functions for animekai.to pages
//!
//! This module contains pure parsers mapping fetched pages to typed records:
//! - `home`: home page sections
//! - `search`: search result grid and pagination
//! - `anime`: anime detail page and episode list
//! - `watch`: server listing and playback frame lookup
//! - `media`: stream/subtitle URL scan over frame bodies
//!
//! Markup rules follow the live site and change with it, so the scraper only
//! sees them through [`MarkupParser`] and [`SourceExtractor`].

pub mod anime;
pub mod card;
pub mod home;
pub mod media;
pub mod search;
pub mod watch;

// Re-export main parsing functions
pub use anime::{parse_anime_detail, parse_episode_list};
pub use card::{extract_anime_id, parse_anime_card, parse_count};
pub use home::parse_home_page;
pub use media::{ExtractedMedia, RegexSourceExtractor, SourceExtractor};
pub use search::{parse_search_results, SearchPageMarkup};
pub use watch::{find_server_frame, parse_servers, FrameRef};

use crate::types::{AnimeDetail, Category, EpisodeList, HomePage, ServerInfo};

/// Page-type parsing strategy used by the scraper.
///
/// Implementations must not fail: a missing region degrades to an empty or
/// default value.
pub trait MarkupParser: Send + Sync {
    fn home_page(&self, html: &str) -> HomePage;

    fn search_results(&self, html: &str) -> SearchPageMarkup;

    fn anime_detail(&self, html: &str, anime_id: &str) -> AnimeDetail;

    fn episode_list(&self, html: &str, anime_id: &str) -> EpisodeList;

    fn servers(&self, html: &str, category: Category) -> Vec<ServerInfo>;

    /// Playback frame of `server` for `category`, if the page offers one.
    fn server_frame(&self, html: &str, server: &str, category: &str) -> Option<FrameRef>;
}

/// Markup rules of the current animekai.to layout
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimeKaiMarkup;

impl MarkupParser for AnimeKaiMarkup {
    fn home_page(&self, html: &str) -> HomePage {
        parse_home_page(html)
    }

    fn search_results(&self, html: &str) -> SearchPageMarkup {
        parse_search_results(html)
    }

    fn anime_detail(&self, html: &str, anime_id: &str) -> AnimeDetail {
        parse_anime_detail(html, anime_id)
    }

    fn episode_list(&self, html: &str, anime_id: &str) -> EpisodeList {
        parse_episode_list(html, anime_id)
    }

    fn servers(&self, html: &str, category: Category) -> Vec<ServerInfo> {
        parse_servers(html, category)
    }

    fn server_frame(&self, html: &str, server: &str, category: &str) -> Option<FrameRef> {
        find_server_frame(html, server, category)
    }
}
