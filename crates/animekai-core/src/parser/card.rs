//! Anime card parser shared by every listing page
//!
//! AnimeKai renders the same card markup on the home page, in search results
//! and in the detail page sidebars:
//!
//! ```html
//! <div class="aitem">
//!   <a class="poster" href="/watch/frieren-4ekj"><img data-src="https://…/poster.jpg"></a>
//!   <a class="title" href="/watch/frieren-4ekj" data-jp="Sousou no Frieren">Frieren</a>
//!   <div class="info">
//!     <span class="sub">28</span><span class="dub">20</span><span class="total">28</span>
//!     <span class="type">TV</span><span class="duration">24m</span>
//!   </div>
//! </div>
//! ```

use scraper::{ElementRef, Html, Selector};

use crate::types::{AnimeSummary, EpisodeCounts};

/// Selector matching a single anime card
pub(crate) const CARD_SELECTOR: &str = ".aitem, .flw-item, .film-item";

/// Extract the anime id from a card link.
///
/// Accepts `/watch/{id}`, `/anime/{id}` and absolute URLs of either form.
/// Query strings, fragments and trailing slashes are dropped.
///
/// # Examples
/// ```
/// use animekai_core::parser::extract_anime_id;
///
/// assert_eq!(extract_anime_id("/watch/frieren-4ekj"), Some("frieren-4ekj".to_string()));
/// assert_eq!(extract_anime_id("https://animekai.to/anime/bleach-1x/?ref=home"), Some("bleach-1x".to_string()));
/// assert_eq!(extract_anime_id("/genres/action"), None);
/// ```
pub fn extract_anime_id(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next()?;
    let mut segments = path.split('/').filter(|s| !s.is_empty());

    segments.find(|s| *s == "watch" || *s == "anime")?;
    let id = segments.next()?;

    Some(id.to_string())
}

/// Parse an integer out of badge text such as `"12"`, `"EP 12"` or `"1,024"`.
pub fn parse_count(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(|c| c.is_ascii_digit())
        .collect();

    digits.parse().ok()
}

/// Collapse whitespace runs inside element text.
pub(crate) fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of the first non-empty match among `selectors`.
pub(crate) fn first_text(element: &ElementRef, selectors: &[&str]) -> Option<String> {
    for selector_str in selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            for el in element.select(&selector) {
                let text = clean_text(&el.text().collect::<String>());
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
    }

    None
}

/// Same as [`first_text`] but searching the whole document.
pub(crate) fn document_text(document: &Html, selectors: &[&str]) -> Option<String> {
    first_text(&document.root_element(), selectors)
}

/// First non-empty attribute among `names`.
pub(crate) fn first_attr(element: &ElementRef, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| element.value().attr(name))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Poster URL of the first image inside `element`.
pub(crate) fn poster(element: &ElementRef) -> Option<String> {
    let selector = Selector::parse("img").ok()?;
    element
        .select(&selector)
        .find_map(|img| first_attr(&img, &["data-src", "data-lazy-src", "src"]))
}

/// Badge counts of a card or info block.
pub(crate) fn episode_counts(element: &ElementRef) -> EpisodeCounts {
    let count = |selectors: &[&str]| first_text(element, selectors).and_then(|t| parse_count(&t));

    EpisodeCounts {
        sub: count(&[".sub", ".tick-sub"]),
        dub: count(&[".dub", ".tick-dub"]),
        total: count(&[".total", ".tick-eps", ".eps"]),
    }
}

/// Parse a single anime card. Cards without a usable link or title are skipped.
pub fn parse_anime_card(element: &ElementRef) -> Option<AnimeSummary> {
    let link_selector =
        Selector::parse("a.title, a.poster, a[href*='/watch/'], a[href*='/anime/']").ok()?;
    let links: Vec<ElementRef> = element.select(&link_selector).collect();

    // The card itself can be the link
    let id = element
        .value()
        .attr("href")
        .and_then(extract_anime_id)
        .or_else(|| {
            links
                .iter()
                .find_map(|link| link.value().attr("href").and_then(extract_anime_id))
        })?;

    let title_link = links
        .iter()
        .find(|link| link.value().classes().any(|c| c == "title"));

    let name = first_text(element, &[".title", ".film-name", ".name", "h3", "h6"])
        .or_else(|| title_link.and_then(|link| first_attr(link, &["title"])))
        .or_else(|| {
            let img_selector = Selector::parse("img").ok()?;
            element
                .select(&img_selector)
                .find_map(|img| first_attr(&img, &["alt"]))
        })?;

    let jname = title_link
        .and_then(|link| first_attr(link, &["data-jp", "data-jname"]))
        .or_else(|| {
            let selector = Selector::parse("[data-jp], [data-jname]").ok()?;
            element
                .select(&selector)
                .find_map(|el| first_attr(&el, &["data-jp", "data-jname"]))
        });

    Some(AnimeSummary {
        id,
        name,
        jname,
        poster: poster(element).unwrap_or_default(),
        kind: first_text(element, &[".type", ".fdi-item.type"]),
        duration: first_text(element, &[".duration", ".fdi-duration"]),
        rating: first_text(element, &[".rating", ".tick-rate"]),
        episodes: episode_counts(element),
    })
}

/// Parse every card inside `container`, in document order.
pub(crate) fn parse_cards_in(container: &ElementRef) -> Vec<AnimeSummary> {
    let Ok(selector) = Selector::parse(CARD_SELECTOR) else {
        return Vec::new();
    };

    container
        .select(&selector)
        .filter_map(|card| parse_anime_card(&card))
        .collect()
}

/// Parse the cards of the first container among `containers` that has any.
///
/// A page without any of the containers yields an empty list.
pub(crate) fn parse_section(document: &Html, containers: &[&str]) -> Vec<AnimeSummary> {
    for selector_str in containers {
        if let Ok(selector) = Selector::parse(selector_str) {
            for container in document.select(&selector) {
                let cards = parse_cards_in(&container);
                if !cards.is_empty() {
                    return cards;
                }
            }
        }
    }

    Vec::new()
}
