//! Main AnimeKai scraper API
//!
//! This module combines the HTTP client with the page parsers. Each operation
//! is a single fetch-then-parse pipeline (two fetches for episode sources)
//! with no retries and no shared mutable state, so one scraper can serve any
//! number of concurrent calls.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use tracing::{debug, error};
use url::Url;

use crate::client::AnimeKaiClient;
use crate::error::{AnimeKaiError, Result};
use crate::parser::{AnimeKaiMarkup, FrameRef, MarkupParser, RegexSourceExtractor, SourceExtractor};
use crate::types::{
    AnimeDetail, Category, EpisodeId, EpisodeList, EpisodeServers, EpisodeSources, HomePage,
    SearchFilters, SearchResultPage, ServerKey, SourceHeaders,
};

/// Base URL of animekai.to
pub const ANIMEKAI_BASE_URL: &str = "https://animekai.to";

/// Server used when the caller does not pick one
pub const DEFAULT_SERVER: ServerKey = ServerKey::VidStreaming;

/// Category used when the caller does not pick one
pub const DEFAULT_CATEGORY: Category = Category::Sub;

/// URLs of one target site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub base_url: String,
    pub ajax_url: String,
    pub home_url: String,
    pub search_url: String,
}

impl SiteConfig {
    /// Derive the site URLs from its origin, e.g. `https://animekai.to`.
    ///
    /// # Errors
    /// `AnimeKaiError::InvalidUrl` if `base_url` is not an absolute http(s) URL
    pub fn from_base_url(base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|e| AnimeKaiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AnimeKaiError::InvalidUrl(base_url.to_string()));
        }

        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self {
            ajax_url: format!("{base_url}/ajax"),
            home_url: format!("{base_url}/home"),
            search_url: format!("{base_url}/search"),
            base_url,
        })
    }

    pub fn anime_url(&self, anime_id: &str) -> String {
        format!("{}/anime/{}", self.base_url, urlencoding::encode(anime_id))
    }

    pub fn episodes_url(&self, anime_id: &str) -> String {
        format!("{}/episodes", self.anime_url(anime_id))
    }

    pub fn watch_url(&self, episode_id: &EpisodeId) -> String {
        format!("{}{}", self.base_url, episode_id.watch_path())
    }

    pub fn search_page_url(&self, query: &str, page: u32) -> String {
        format!("{}?q={}&page={}", self.search_url, urlencoding::encode(query), page)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: ANIMEKAI_BASE_URL.to_string(),
            ajax_url: format!("{ANIMEKAI_BASE_URL}/ajax"),
            home_url: format!("{ANIMEKAI_BASE_URL}/home"),
            search_url: format!("{ANIMEKAI_BASE_URL}/search"),
        }
    }
}

/// Main scraper API for animekai.to
///
/// # Example
/// ```no_run
/// use animekai_core::AnimeKaiScraper;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let scraper = AnimeKaiScraper::new()?;
///
///     let page = scraper.search("frieren", 1, Default::default()).await?;
///     println!("Found {} results", page.results.len());
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct AnimeKaiScraper {
    client: AnimeKaiClient,
    site: SiteConfig,
    markup: Arc<dyn MarkupParser>,
    media: Arc<dyn SourceExtractor>,
}

impl std::fmt::Debug for AnimeKaiScraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimeKaiScraper")
            .field("client", &self.client)
            .field("site", &self.site)
            .finish_non_exhaustive()
    }
}

impl AnimeKaiScraper {
    /// Create a scraper for animekai.to with default configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(AnimeKaiClient::new()?, SiteConfig::default()))
    }

    /// Create a scraper with a custom client and site.
    ///
    /// This is useful for testing or for mirrors hosted elsewhere.
    pub fn with_client(client: AnimeKaiClient, site: SiteConfig) -> Self {
        Self {
            client,
            site,
            markup: Arc::new(AnimeKaiMarkup),
            media: Arc::new(RegexSourceExtractor::new()),
        }
    }

    /// Replace the page markup strategy.
    pub fn with_markup(mut self, markup: Arc<dyn MarkupParser>) -> Self {
        self.markup = markup;
        self
    }

    /// Replace the frame body extraction strategy.
    pub fn with_source_extractor(mut self, media: Arc<dyn SourceExtractor>) -> Self {
        self.media = media;
        self
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    /// Get the home page sections.
    pub async fn get_home_page(&self) -> Result<HomePage> {
        let html = self
            .client
            .get_text(&self.site.home_url, None)
            .await
            .inspect_err(|e| error!("error fetching home page: {e}"))?;

        Ok(self.markup.home_page(&html))
    }

    /// Search for anime.
    ///
    /// `page` is 1-based; `0` is treated as `1`. `filters` are not
    /// interpreted, only echoed back in the result.
    ///
    /// # Example
    /// ```no_run
    /// use animekai_core::AnimeKaiScraper;
    ///
    /// # async fn example() -> Result<(), animekai_core::AnimeKaiError> {
    /// let scraper = AnimeKaiScraper::new()?;
    /// let page2 = scraper.search("one piece", 2, Default::default()).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn search(
        &self,
        query: &str,
        page: u32,
        filters: SearchFilters,
    ) -> Result<SearchResultPage> {
        let page = page.max(1);
        let url = self.site.search_page_url(query, page);
        debug!(%url, "searching");

        let html = self
            .client
            .get_text(&url, None)
            .await
            .inspect_err(|e| error!("error searching: {e}"))?;
        let markup = self.markup.search_results(&html);

        Ok(SearchResultPage {
            results: markup.results,
            search_query: query.to_string(),
            search_filters: filters,
            current_page: page,
            has_next_page: markup.has_next_page,
            total_pages: markup.total_pages.max(1),
        })
    }

    /// Get the detail page of an anime.
    pub async fn get_info(&self, anime_id: &str) -> Result<AnimeDetail> {
        let html = self
            .client
            .get_text(&self.site.anime_url(anime_id), None)
            .await
            .inspect_err(|e| error!("error getting anime info: {e}"))?;

        Ok(self.markup.anime_detail(&html, anime_id))
    }

    /// Get the episode list of an anime, in site order.
    pub async fn get_episodes(&self, anime_id: &str) -> Result<EpisodeList> {
        let html = self
            .client
            .get_text(&self.site.episodes_url(anime_id), None)
            .await
            .inspect_err(|e| error!("error getting episodes: {e}"))?;

        Ok(self.markup.episode_list(&html, anime_id))
    }

    /// Get the servers offered for an episode, per category.
    ///
    /// # Arguments
    /// * `episode_id` - Episode id of the form `<animeId>?ep=<number>`
    pub async fn get_episode_servers(&self, episode_id: &str) -> Result<EpisodeServers> {
        let episode_id = episode_id
            .parse::<EpisodeId>()
            .inspect_err(|e| error!("error getting episode servers: {e}"))?;

        let html = self
            .client
            .get_text(&self.site.watch_url(&episode_id), None)
            .await
            .inspect_err(|e| error!("error getting episode servers: {e}"))?;

        Ok(EpisodeServers {
            episode_no: episode_id.episode().to_string(),
            sub: self.markup.servers(&html, Category::Sub),
            dub: self.markup.servers(&html, Category::Dub),
            raw: self.markup.servers(&html, Category::Raw),
            episode_id,
        })
    }

    /// Get the streaming sources of an episode from one server.
    ///
    /// Fetches the watch page, locates the frame of `server` for `category`,
    /// then fetches that frame with the watch page as `Referer` and scans it.
    ///
    /// # Errors
    /// * `AnimeKaiError::MalformedEpisodeId` - bad `episode_id`
    /// * `AnimeKaiError::ServerNotFound` - the watch page has no such frame;
    ///   the frame is not requested
    /// * `AnimeKaiError::Fetch` / `AnimeKaiError::Status` - either fetch failed
    pub async fn get_episode_sources(
        &self,
        episode_id: &str,
        server: &str,
        category: &str,
    ) -> Result<EpisodeSources> {
        self.fetch_episode_sources(episode_id, server, category)
            .await
            .inspect_err(|e| error!("error getting episode sources: {e}"))
    }

    async fn fetch_episode_sources(
        &self,
        episode_id: &str,
        server: &str,
        category: &str,
    ) -> Result<EpisodeSources> {
        let episode_id: EpisodeId = episode_id.parse()?;
        let watch_url = self.site.watch_url(&episode_id);
        let html = self.client.get_text(&watch_url, None).await?;

        let frame = self
            .markup
            .server_frame(&html, server, category)
            .ok_or_else(|| AnimeKaiError::ServerNotFound {
                server: server.to_string(),
                category: category.to_string(),
            })?;
        let frame_url = self.resolve_frame(&watch_url, frame)?;
        debug!(%frame_url, %server, %category, "fetching player frame");

        let mut headers = HeaderMap::new();
        headers.insert(
            REFERER,
            HeaderValue::from_str(&watch_url).map_err(|_| AnimeKaiError::InvalidUrl(watch_url.clone()))?,
        );
        let body = self.client.get_text(&frame_url, Some(&headers)).await?;
        let media = self.media.extract(&body);

        Ok(EpisodeSources {
            headers: SourceHeaders { referer: frame_url },
            sources: media.sources,
            subtitles: media.subtitles,
        })
    }

    /// Turn a frame reference into an absolute URL.
    fn resolve_frame(&self, watch_url: &str, frame: FrameRef) -> Result<String> {
        match frame {
            FrameRef::Link(link) => {
                let base = Url::parse(watch_url).map_err(|e| AnimeKaiError::InvalidUrl(format!("{watch_url}: {e}")))?;
                base.join(&link)
                    .map(String::from)
                    .map_err(|e| AnimeKaiError::InvalidUrl(format!("{link}: {e}")))
            }
            FrameRef::ServerId(id) => Ok(format!(
                "{}/links/view?id={}",
                self.site.ajax_url,
                urlencoding::encode(&id)
            )),
        }
    }
}
