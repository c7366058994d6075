//! AniKoto mirror
//!
//! AniKoto routes are pure redirects onto their AnimeKai counterparts. Each
//! alias answers `301` with the canonical path, its `:param` segments filled
//! from the request and the query string forwarded as received.

use std::collections::HashMap;

use axum::extract::Path;
use axum::extract::RawQuery;
use axum::routing::get;
use axum::Router;

use crate::routes::moved_permanently;

/// `(alias pattern, canonical pattern)`
pub const ALIASES: &[(&str, &str)] = &[
    ("/api/v2/anikoto", "/api/v2/animekai"),
    ("/api/v2/anikoto/home", "/api/v2/animekai/home"),
    ("/api/v2/anikoto/search", "/api/v2/animekai/search"),
    ("/api/v2/anikoto/anime/:animeId", "/api/v2/animekai/anime/:animeId"),
    (
        "/api/v2/anikoto/anime/:animeId/episodes",
        "/api/v2/animekai/anime/:animeId/episodes",
    ),
    ("/api/v2/anikoto/episode/servers", "/api/v2/animekai/episode/servers"),
    ("/api/v2/anikoto/episode/sources", "/api/v2/animekai/episode/sources"),
];

pub fn routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    ALIASES
        .iter()
        .fold(Router::new(), |router, &(alias, canonical)| {
            router.route(
                alias,
                get(
                    move |params: Option<Path<HashMap<String, String>>>, RawQuery(query): RawQuery| async move {
                        let params = params.map(|Path(params)| params).unwrap_or_default();
                        moved_permanently(redirect_location(canonical, &params, query.as_deref()))
                    },
                ),
            )
        })
}

/// Fill `canonical` with `params` and append `query`.
///
/// Parameter values are percent-encoded so they stay a single path segment.
pub fn redirect_location(
    canonical: &str,
    params: &HashMap<String, String>,
    query: Option<&str>,
) -> String {
    let path = canonical
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => params
                .get(name)
                .map(|value| urlencoding::encode(value).into_owned())
                .unwrap_or_default(),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/");

    match query {
        Some(query) if !query.is_empty() => format!("{path}?{query}"),
        _ => path,
    }
}
