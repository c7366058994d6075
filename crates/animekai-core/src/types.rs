//! Data types for the AnimeKai scraper
//!
//! Every record here is request-scoped: a scraper call builds a fresh set and
//! hands it to the caller. All types serialize in camelCase so they can be
//! returned as JSON without a separate DTO layer.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnimeKaiError;

/// Audio/caption variant of an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Subtitled
    Sub,
    /// Dubbed
    Dub,
    /// Untranslated
    Raw,
}

impl Category {
    /// All categories, in the order the watch page lists them.
    pub const ALL: [Category; 3] = [Category::Sub, Category::Dub, Category::Raw];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sub => "sub",
            Category::Dub => "dub",
            Category::Raw => "raw",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sub" => Ok(Category::Sub),
            "dub" => Ok(Category::Dub),
            "raw" => Ok(Category::Raw),
            other => Err(format!("unknown category {other:?}")),
        }
    }
}

/// Playback backend a watch page can offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServerKey {
    #[serde(rename = "hd-1")]
    VidStreaming,
    #[serde(rename = "hd-2")]
    StreamSB,
    #[serde(rename = "hd-3")]
    StreamTape,
}

impl ServerKey {
    pub const ALL: [ServerKey; 3] = [
        ServerKey::VidStreaming,
        ServerKey::StreamSB,
        ServerKey::StreamTape,
    ];

    /// Short key used in URLs, e.g. `hd-1`
    pub fn key(&self) -> &'static str {
        match self {
            ServerKey::VidStreaming => "hd-1",
            ServerKey::StreamSB => "hd-2",
            ServerKey::StreamTape => "hd-3",
        }
    }

    /// Human readable provider name
    pub fn display_name(&self) -> &'static str {
        match self {
            ServerKey::VidStreaming => "VidStreaming",
            ServerKey::StreamSB => "StreamSB",
            ServerKey::StreamTape => "StreamTape",
        }
    }

    /// Resolve either a short key (`hd-2`) or a provider name (`streamsb`).
    pub fn lookup(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|server| {
            server.key().eq_ignore_ascii_case(value)
                || server.display_name().eq_ignore_ascii_case(value)
        })
    }
}

impl fmt::Display for ServerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Composite episode key, rendered as `<animeId>?ep=<number>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EpisodeId {
    anime_id: String,
    episode: String,
}

impl EpisodeId {
    const DELIMITER: char = '?';
    const EPISODE_PREFIX: &'static str = "ep=";

    /// Build an id from its parts.
    ///
    /// # Errors
    /// `MalformedEpisodeId` if `anime_id` is empty or contains `?`, or if
    /// `episode` is empty.
    pub fn new(anime_id: impl Into<String>, episode: impl Into<String>) -> Result<Self, AnimeKaiError> {
        let anime_id = anime_id.into();
        let episode = episode.into();
        if anime_id.is_empty() || anime_id.contains(Self::DELIMITER) || episode.is_empty() {
            return Err(AnimeKaiError::MalformedEpisodeId(format!(
                "{}{}{}{}",
                anime_id,
                Self::DELIMITER,
                Self::EPISODE_PREFIX,
                episode
            )));
        }
        Ok(Self { anime_id, episode })
    }

    pub fn anime_id(&self) -> &str {
        &self.anime_id
    }

    /// Episode number exactly as it appeared in the id
    pub fn episode(&self) -> &str {
        &self.episode
    }

    /// Path and query of the watch page, relative to the site root
    pub fn watch_path(&self) -> String {
        format!(
            "/watch/{}?ep={}",
            urlencoding::encode(&self.anime_id),
            urlencoding::encode(&self.episode)
        )
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            self.anime_id,
            Self::DELIMITER,
            Self::EPISODE_PREFIX,
            self.episode
        )
    }
}

impl FromStr for EpisodeId {
    type Err = AnimeKaiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || AnimeKaiError::MalformedEpisodeId(s.to_string());

        let (anime_id, param) = s.split_once(Self::DELIMITER).ok_or_else(malformed)?;
        let episode = param.strip_prefix(Self::EPISODE_PREFIX).ok_or_else(malformed)?;
        if anime_id.is_empty() || episode.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            anime_id: anime_id.to_string(),
            episode: episode.to_string(),
        })
    }
}

impl TryFrom<String> for EpisodeId {
    type Error = AnimeKaiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EpisodeId> for String {
    fn from(id: EpisodeId) -> Self {
        id.to_string()
    }
}

/// Episode badges shown on listing cards; `None` when the card omits one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeCounts {
    pub sub: Option<u32>,
    pub dub: Option<u32>,
    pub total: Option<u32>,
}

/// Anime card as it appears in home sections, search results and sidebars
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeSummary {
    pub id: String,
    pub name: String,
    /// Japanese/romaji title when the card carries one
    pub jname: Option<String>,
    pub poster: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub duration: Option<String>,
    pub rating: Option<String>,
    pub episodes: EpisodeCounts,
}

/// Slide of the spotlight carousel
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotlightAnime {
    /// 1-based position in the carousel
    pub rank: u32,
    #[serde(flatten)]
    pub anime: AnimeSummary,
    pub description: String,
}

/// Home page sections; each one is extracted independently
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomePage {
    pub genres: Vec<String>,
    pub latest_episode_animes: Vec<AnimeSummary>,
    pub spotlight_animes: Vec<SpotlightAnime>,
    pub trending_animes: Vec<AnimeSummary>,
    pub most_popular_animes: Vec<AnimeSummary>,
}

/// Value of one filter key: a string, or every value when the key repeats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    One(String),
    Many(Vec<String>),
}

impl FilterValue {
    /// Add another value for the same key, keeping arrival order.
    pub fn push(&mut self, value: String) {
        match self {
            FilterValue::One(first) => {
                *self = FilterValue::Many(vec![std::mem::take(first), value]);
            }
            FilterValue::Many(values) => values.push(value),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::One(value.to_string())
    }
}

/// Opaque search filters, echoed back untouched
pub type SearchFilters = BTreeMap<String, FilterValue>;

/// Add `value` under `key`, turning a repeated key into a list.
pub fn push_filter(filters: &mut SearchFilters, key: String, value: String) {
    match filters.entry(key) {
        std::collections::btree_map::Entry::Occupied(mut entry) => entry.get_mut().push(value),
        std::collections::btree_map::Entry::Vacant(entry) => {
            entry.insert(FilterValue::One(value));
        }
    }
}

/// One page of search results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultPage {
    pub results: Vec<AnimeSummary>,
    pub search_query: String,
    pub search_filters: SearchFilters,
    /// Current page number (1-based)
    pub current_page: u32,
    pub has_next_page: bool,
    /// Total number of pages, at least 1
    pub total_pages: u32,
}

/// Episode totals on the detail page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubDubCounts {
    pub sub: u32,
    pub dub: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimeStats {
    pub rating: String,
    pub quality: String,
    pub episodes: SubDubCounts,
    #[serde(rename = "type")]
    pub kind: String,
    pub duration: String,
}

/// Primary info block of the detail page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimeInfo {
    pub id: String,
    pub name: String,
    pub poster: String,
    pub description: String,
    pub stats: AnimeStats,
}

/// Secondary metadata block of the detail page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimeMoreInfo {
    pub aired: String,
    pub genres: Vec<String>,
    pub status: String,
    pub studios: String,
    pub duration: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeOverview {
    pub info: AnimeInfo,
    pub more_info: AnimeMoreInfo,
}

/// Everything the anime detail page offers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeDetail {
    pub anime: AnimeOverview,
    pub recommended_animes: Vec<AnimeSummary>,
    pub related_animes: Vec<AnimeSummary>,
}

/// Entry of an anime's episode list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeSummary {
    pub number: u32,
    pub title: Option<String>,
    pub episode_id: EpisodeId,
    pub is_filler: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeList {
    pub total_episodes: u32,
    pub episodes: Vec<EpisodeSummary>,
}

/// A playback backend offered for one category of an episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub server_name: String,
    pub server_id: ServerKey,
}

/// Servers offered by a watch page, per category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeServers {
    pub episode_id: EpisodeId,
    pub episode_no: String,
    pub sub: Vec<ServerInfo>,
    pub dub: Vec<ServerInfo>,
    pub raw: Vec<ServerInfo>,
}

/// Playable media URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSource {
    pub url: String,
    #[serde(rename = "isM3U8")]
    pub is_m3u8: bool,
    pub quality: String,
}

impl StreamSource {
    pub const DEFAULT_QUALITY: &'static str = "auto";

    /// HLS manifest with unknown quality
    pub fn hls(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_m3u8: true,
            quality: Self::DEFAULT_QUALITY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub lang: String,
    pub url: String,
}

impl SubtitleTrack {
    pub const DEFAULT_LANG: &'static str = "English";
}

/// Headers a player must send when requesting the returned sources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceHeaders {
    #[serde(rename = "Referer")]
    pub referer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeSources {
    pub headers: SourceHeaders,
    pub sources: Vec<StreamSource>,
    pub subtitles: Vec<SubtitleTrack>,
}
