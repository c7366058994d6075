//! AnimeKai/AniKoto JSON API
//!
//! This crate exposes [`animekai_core::AnimeKaiScraper`] over HTTP with axum.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use animekai_core::AnimeKaiScraper;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let scraper = Arc::new(AnimeKaiScraper::new()?);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:4000").await?;
//! axum::serve(listener, animekai_server::app(scraper)).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Routes
//! - `GET /api/v2/animekai/home` - Home page sections
//! - `GET /api/v2/animekai/search?q=&page=` - Search, other keys echoed as filters
//! - `GET /api/v2/animekai/anime/:animeId` - Anime details
//! - `GET /api/v2/animekai/anime/:animeId/episodes` - Episode list
//! - `GET /api/v2/animekai/episode/servers?animeEpisodeId=` - Servers per category
//! - `GET /api/v2/animekai/episode/sources?animeEpisodeId=&server=&category=` - Stream sources
//! - `GET /api/v2/anikoto/...` - `301` to the AnimeKai route
//! - `GET /health`, `GET /`

pub mod alias;
pub mod config;
pub mod envelope;
pub mod logger;
pub mod routes;

use std::sync::Arc;

use animekai_core::AnimeKaiScraper;
use axum::Router;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::DefaultMakeSpan;
use tower_http::trace::DefaultOnFailure;
use tower_http::trace::DefaultOnRequest;
use tower_http::trace::DefaultOnResponse;
use tower_http::trace::TraceLayer;

pub use self::config::Config;

/// Build the full router around a shared scraper.
pub fn app(scraper: Arc<AnimeKaiScraper>) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
        .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
        .on_response(DefaultOnResponse::new().level(tracing::Level::INFO))
        .on_failure(DefaultOnFailure::new().level(tracing::Level::ERROR));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes::routes()
        .merge(alias::routes())
        .with_state(scraper)
        .layer(cors)
        .layer(trace_layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use animekai_core::{AnimeKaiClient, SiteConfig};
    use axum::body::{to_bytes, Body};
    use axum::http::header::LOCATION;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const WATCH_PAGE: &str = r#"
        <div class="server-items" data-id="sub">
          <span class="server" data-server="hd-1" data-link="/e/frame-1">VidStreaming</span>
        </div>
        <div class="server-items" data-id="dub">
          <span class="server" data-server="hd-2" data-lid="dub-2">StreamSB</span>
        </div>
    "#;

    fn app_for(server: &MockServer) -> Router {
        let site = SiteConfig::from_base_url(&server.uri()).unwrap();
        let scraper = AnimeKaiScraper::with_client(AnimeKaiClient::new().unwrap(), site);
        app(Arc::new(scraper))
    }

    async fn get(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        let response = get(app_for(&server), "/health").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_index_lists_both_sites() {
        let server = MockServer::start().await;
        let json = body_json(get(app_for(&server), "/").await).await;

        assert_eq!(json["message"], "Anime API Adaptation for AnimeKai and AniKoto");
        assert_eq!(json["endpoints"]["animekai"]["home"], "/api/v2/animekai/home");
        assert_eq!(json["endpoints"]["anikoto"]["home"], "/api/v2/anikoto/home");
    }

    #[tokio::test]
    async fn test_bare_prefixes_redirect() {
        let server = MockServer::start().await;

        let response = get(app_for(&server), "/api/v2/animekai").await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[LOCATION], "/");

        let response = get(app_for(&server), "/api/v2/anikoto").await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[LOCATION], "/api/v2/animekai");
    }

    #[tokio::test]
    async fn test_anikoto_does_not_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let response = get(app_for(&server), "/api/v2/anikoto/search?q=naruto&page=2").await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(
            response.headers()[LOCATION],
            "/api/v2/animekai/search?q=naruto&page=2"
        );
    }

    #[tokio::test]
    async fn test_search_envelope_and_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "naruto"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<div class="aitem"><a class="title" href="/watch/naruto-9r5k">Naruto</a></div>"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let response = get(
            app_for(&server),
            "/api/v2/animekai/search?q=naruto&page=abc&genre=action&sort=recently_updated",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        let data = &json["data"];
        assert_eq!(data["searchQuery"], "naruto");
        assert_eq!(data["currentPage"], 1);
        assert_eq!(data["hasNextPage"], false);
        assert_eq!(data["totalPages"], 1);
        assert_eq!(
            data["searchFilters"],
            serde_json::json!({ "genre": "action", "sort": "recently_updated" })
        );
        assert_eq!(data["results"][0]["id"], "naruto-9r5k");
        assert_eq!(data["results"][0]["name"], "Naruto");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_500_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/anime/missing-1"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let response = get(app_for(&server), "/api/v2/animekai/anime/missing-1").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().contains("404"));
    }

    #[tokio::test]
    async fn test_episodes_route() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/anime/frieren-4ekj/episodes"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<div class="eplist"><a num="1" title="The Journey's End">1</a><a num="2" class="filler">2</a></div>"#,
            ))
            .mount(&server)
            .await;

        let json = body_json(get(app_for(&server), "/api/v2/animekai/anime/frieren-4ekj/episodes").await).await;
        assert_eq!(json["data"]["totalEpisodes"], 2);
        assert_eq!(json["data"]["episodes"][0]["episodeId"], "frieren-4ekj?ep=1");
        assert_eq!(json["data"]["episodes"][0]["title"], "The Journey's End");
        assert_eq!(json["data"]["episodes"][1]["isFiller"], true);
    }

    #[tokio::test]
    async fn test_servers_route() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/watch/frieren-4ekj"))
            .and(query_param("ep", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_string(WATCH_PAGE))
            .mount(&server)
            .await;

        let json = body_json(
            get(
                app_for(&server),
                "/api/v2/animekai/episode/servers?animeEpisodeId=frieren-4ekj%3Fep%3D3",
            )
            .await,
        )
        .await;

        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["episodeId"], "frieren-4ekj?ep=3");
        assert_eq!(json["data"]["episodeNo"], "3");
        assert_eq!(
            json["data"]["sub"],
            serde_json::json!([{ "serverName": "VidStreaming", "serverId": "hd-1" }])
        );
        assert_eq!(json["data"]["raw"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_servers_route_without_id_is_500() {
        let server = MockServer::start().await;
        let response = get(app_for(&server), "/api/v2/animekai/episode/servers").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().starts_with("Malformed episode id"));
    }

    #[tokio::test]
    async fn test_sources_route_defaults_to_hd1_sub() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/watch/frieren-4ekj"))
            .respond_with(ResponseTemplate::new(200).set_body_string(WATCH_PAGE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/e/frame-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"file: "https://cdn.test/hls/master.m3u8", track: 'https://cdn.test/en.vtt'"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let response = get(
            app_for(&server),
            "/api/v2/animekai/episode/sources?animeEpisodeId=frieren-4ekj%3Fep%3D3",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let data = body_json(response).await["data"].clone();
        assert_eq!(data["headers"]["Referer"], format!("{}/e/frame-1", server.uri()));
        assert_eq!(
            data["sources"],
            serde_json::json!([{ "url": "https://cdn.test/hls/master.m3u8", "isM3U8": true, "quality": "auto" }])
        );
        assert_eq!(
            data["subtitles"],
            serde_json::json!([{ "lang": "English", "url": "https://cdn.test/en.vtt" }])
        );
    }

    #[tokio::test]
    async fn test_search_repeated_filter_keeps_all_values() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let json = body_json(
            get(
                app_for(&server),
                "/api/v2/animekai/search?q=x&genre=action&genre=drama&type=tv",
            )
            .await,
        )
        .await;

        assert_eq!(
            json["data"]["searchFilters"],
            serde_json::json!({ "genre": ["action", "drama"], "type": "tv" })
        );
    }

    #[tokio::test]
    async fn test_sources_route_empty_server_and_category_use_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/watch/frieren-4ekj"))
            .respond_with(ResponseTemplate::new(200).set_body_string(WATCH_PAGE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/e/frame-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"'https://cdn.test/a.m3u8'"#))
            .expect(1)
            .mount(&server)
            .await;

        let response = get(
            app_for(&server),
            "/api/v2/animekai/episode/sources?animeEpisodeId=frieren-4ekj%3Fep%3D3&server=&category=",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["sources"][0]["url"], "https://cdn.test/a.m3u8");
    }

    #[tokio::test]
    async fn test_repeated_episode_id_is_500_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        for uri in [
            "/api/v2/animekai/episode/servers?animeEpisodeId=a%3Fep%3D1&animeEpisodeId=b%3Fep%3D2",
            "/api/v2/animekai/episode/sources?animeEpisodeId=a%3Fep%3D1&animeEpisodeId=b%3Fep%3D2",
        ] {
            let response = get(app_for(&server), uri).await;
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                response.headers()[axum::http::header::CONTENT_TYPE],
                "application/json"
            );

            let json = body_json(response).await;
            assert_eq!(json["success"], false);
            assert!(json["error"].as_str().unwrap().contains("animeEpisodeId"));
        }
    }

    #[tokio::test]
    async fn test_sources_route_unknown_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/watch/frieren-4ekj"))
            .respond_with(ResponseTemplate::new(200).set_body_string(WATCH_PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let response = get(
            app_for(&server),
            "/api/v2/animekai/episode/sources?animeEpisodeId=frieren-4ekj%3Fep%3D3&server=hd-3&category=dub",
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Server hd-3 not found for category dub");
    }
}
