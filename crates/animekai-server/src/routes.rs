//! AnimeKai API routes
//!
//! Each handler makes one scraper call and wraps its outcome in the JSON
//! envelope. Absent, empty or unparsable query values fall back to their
//! defaults; a query string that cannot be decoded at all is reported through
//! the envelope like any other failure.

use std::sync::Arc;

use animekai_core::{push_filter, AnimeKaiScraper, SearchFilters, DEFAULT_CATEGORY, DEFAULT_SERVER};
use axum::extract::rejection::QueryRejection;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::header;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::Json;
use axum::Router;

use crate::envelope::respond;
use crate::envelope::ApiError;

pub const ANIMEKAI_PREFIX: &str = "/api/v2/animekai";

pub const ANIKOTO_PREFIX: &str = "/api/v2/anikoto";

pub fn routes() -> Router<Arc<AnimeKaiScraper>> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route(ANIMEKAI_PREFIX, get(animekai_root))
        .route(&format!("{ANIMEKAI_PREFIX}/home"), get(home))
        .route(&format!("{ANIMEKAI_PREFIX}/search"), get(search))
        .route(&format!("{ANIMEKAI_PREFIX}/anime/:animeId"), get(anime_info))
        .route(
            &format!("{ANIMEKAI_PREFIX}/anime/:animeId/episodes"),
            get(anime_episodes),
        )
        .route(&format!("{ANIMEKAI_PREFIX}/episode/servers"), get(episode_servers))
        .route(&format!("{ANIMEKAI_PREFIX}/episode/sources"), get(episode_sources))
}

/// `301 Moved Permanently` to `location`.
pub(crate) fn moved_permanently(location: String) -> Response {
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
}

/// Endpoint templates of one site prefix.
fn endpoint_index(prefix: &str) -> serde_json::Value {
    serde_json::json!({
        "home": format!("{prefix}/home"),
        "search": format!("{prefix}/search?q={{query}}&page={{page}}"),
        "anime": format!("{prefix}/anime/{{animeId}}"),
        "episodes": format!("{prefix}/anime/{{animeId}}/episodes"),
        "servers": format!("{prefix}/episode/servers?animeEpisodeId={{id}}"),
        "sources": format!("{prefix}/episode/sources?animeEpisodeId={{id}}&server={{server}}&category={{category}}"),
    })
}

async fn index() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Anime API Adaptation for AnimeKai and AniKoto",
        "endpoints": {
            "animekai": endpoint_index(ANIMEKAI_PREFIX),
            "anikoto": endpoint_index(ANIKOTO_PREFIX),
        }
    }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn animekai_root() -> Response {
    moved_permanently("/".to_string())
}

async fn home(State(scraper): State<Arc<AnimeKaiScraper>>) -> Response {
    respond(scraper.get_home_page().await)
}

/// 1-based page number; absent, unparsable and `0` all mean the first page.
fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|page| page.trim().parse::<u32>().ok())
        .filter(|&page| page > 0)
        .unwrap_or(1)
}

async fn search(
    State(scraper): State<Arc<AnimeKaiScraper>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let mut query = String::new();
    let mut page = None;
    let mut filters = SearchFilters::new();

    for (key, value) in params {
        match key.as_str() {
            "q" => query = value,
            "page" => page = Some(value),
            _ => push_filter(&mut filters, key, value),
        }
    }

    respond(scraper.search(&query, parse_page(page.as_deref()), filters).await)
}

async fn anime_info(
    State(scraper): State<Arc<AnimeKaiScraper>>,
    Path(anime_id): Path<String>,
) -> Response {
    respond(scraper.get_info(&anime_id).await)
}

async fn anime_episodes(
    State(scraper): State<Arc<AnimeKaiScraper>>,
    Path(anime_id): Path<String>,
) -> Response {
    respond(scraper.get_episodes(&anime_id).await)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

#[derive(Debug, serde::Deserialize)]
struct ServersParams {
    #[serde(rename = "animeEpisodeId", default)]
    anime_episode_id: String,
}

async fn episode_servers(
    State(scraper): State<Arc<AnimeKaiScraper>>,
    params: Result<Query<ServersParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };

    respond(scraper.get_episode_servers(&params.anime_episode_id).await)
}

#[derive(Debug, serde::Deserialize)]
struct SourcesParams {
    #[serde(rename = "animeEpisodeId", default)]
    anime_episode_id: String,
    server: Option<String>,
    category: Option<String>,
}

async fn episode_sources(
    State(scraper): State<Arc<AnimeKaiScraper>>,
    params: Result<Query<SourcesParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };

    let server = non_empty(params.server.as_deref()).unwrap_or(DEFAULT_SERVER.key());
    let category = non_empty(params.category.as_deref()).unwrap_or(DEFAULT_CATEGORY.as_str());

    respond(
        scraper
            .get_episode_sources(&params.anime_episode_id, server, category)
            .await,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("")), 1);
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(Some("0")), 1);
        assert_eq!(parse_page(Some("-3")), 1);
        assert_eq!(parse_page(Some("2")), 2);
        assert_eq!(parse_page(Some(" 7 ")), 7);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(Some("  ")), None);
        assert_eq!(non_empty(Some("hd-2")), Some("hd-2"));
    }

    #[test]
    fn test_endpoint_index() {
        let index = endpoint_index(ANIKOTO_PREFIX);
        assert_eq!(index["home"], "/api/v2/anikoto/home");
        assert_eq!(index["anime"], "/api/v2/anikoto/anime/{animeId}");
        assert_eq!(
            index["search"],
            "/api/v2/anikoto/search?q={query}&page={page}"
        );
    }
}
