//! Home page parser
//!
//! Every section is located and parsed on its own; a section the page does not
//! render comes back empty without affecting the others.

use scraper::{ElementRef, Html, Selector};

use crate::types::{AnimeSummary, HomePage, SpotlightAnime};

use super::card::{clean_text, episode_counts, extract_anime_id, first_attr, first_text, parse_section, poster};

const GENRE_SELECTORS: [&str; 3] = ["#menu .genres a", "ul.genres a", ".genres-list a"];

const LATEST_EPISODE_CONTAINERS: [&str; 3] =
    ["#latest-updates", "section.latest-updates", ".latest-episodes"];

const SPOTLIGHT_SLIDES: [&str; 3] = [
    "#featured .swiper-slide",
    ".spotlight .swiper-slide",
    ".deslide-item",
];

const TRENDING_CONTAINERS: [&str; 3] = ["#trending-anime", "section.trending", ".trending-list"];

const MOST_POPULAR_CONTAINERS: [&str; 3] =
    ["#most-popular", "section.most-popular", ".most-popular"];

/// Parse the home page.
pub fn parse_home_page(html: &str) -> HomePage {
    let document = Html::parse_document(html);

    HomePage {
        genres: extract_genres(&document),
        latest_episode_animes: extract_latest_episodes(&document),
        spotlight_animes: extract_spotlight_animes(&document),
        trending_animes: extract_trending_animes(&document),
        most_popular_animes: extract_most_popular_animes(&document),
    }
}

/// Genre names from the navigation menu, deduplicated, in menu order.
fn extract_genres(document: &Html) -> Vec<String> {
    let mut genres = Vec::new();

    for selector_str in &GENRE_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            for el in document.select(&selector) {
                let text = clean_text(&el.text().collect::<String>());
                if !text.is_empty() && !genres.contains(&text) {
                    genres.push(text);
                }
            }
            if !genres.is_empty() {
                break;
            }
        }
    }

    genres
}

fn extract_latest_episodes(document: &Html) -> Vec<AnimeSummary> {
    parse_section(document, &LATEST_EPISODE_CONTAINERS)
}

fn extract_trending_animes(document: &Html) -> Vec<AnimeSummary> {
    parse_section(document, &TRENDING_CONTAINERS)
}

fn extract_most_popular_animes(document: &Html) -> Vec<AnimeSummary> {
    parse_section(document, &MOST_POPULAR_CONTAINERS)
}

fn extract_spotlight_animes(document: &Html) -> Vec<SpotlightAnime> {
    for selector_str in &SPOTLIGHT_SLIDES {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };

        let slides: Vec<SpotlightAnime> = document
            .select(&selector)
            .filter_map(|slide| parse_spotlight_slide(&slide))
            .enumerate()
            .map(|(i, mut slide)| {
                slide.rank = i as u32 + 1;
                slide
            })
            .collect();

        if !slides.is_empty() {
            return slides;
        }
    }

    Vec::new()
}

/// Spotlight slides carry the poster as a CSS background and a synopsis.
fn parse_spotlight_slide(slide: &ElementRef) -> Option<SpotlightAnime> {
    let link_selector = Selector::parse("a[href*='/watch/'], a[href*='/anime/']").ok()?;
    let id = slide
        .select(&link_selector)
        .find_map(|link| link.value().attr("href").and_then(extract_anime_id))?;

    let name = first_text(slide, &[".title", "h2", ".desi-head-title"])?;

    let poster = poster(slide)
        .or_else(|| first_attr(slide, &["data-src"]))
        .or_else(|| slide.value().attr("style").and_then(background_image_url))
        .unwrap_or_default();

    let jname = {
        let selector = Selector::parse("[data-jp]").ok()?;
        slide
            .select(&selector)
            .find_map(|el| first_attr(&el, &["data-jp"]))
    };

    Some(SpotlightAnime {
        rank: 0,
        anime: AnimeSummary {
            id,
            name,
            jname,
            poster,
            kind: first_text(slide, &[".type", ".info .type"]),
            duration: first_text(slide, &[".duration"]),
            rating: first_text(slide, &[".rating"]),
            episodes: episode_counts(slide),
        },
        description: first_text(slide, &[".desc", ".description", ".desi-description"])
            .unwrap_or_default(),
    })
}

/// Pull the URL out of an inline `background-image: url(...)` style.
fn background_image_url(style: &str) -> Option<String> {
    let re = regex_lite::Regex::new(r#"url\(\s*['"]?([^'")]+)['"]?\s*\)"#).ok()?;
    let caps = re.captures(style)?;
    Some(caps.get(1)?.as_str().trim().to_string())
}
