//! Search results parser
//!
//! Parses the result grid and the pagination block of a search page. The
//! query, filters and requested page are echoed by the scraper, not read from
//! the markup.

use scraper::{Html, Selector};

use super::card::{parse_cards_in, parse_count, parse_section};
use crate::types::AnimeSummary;

const RESULT_CONTAINERS: [&str; 3] = [".aitem-wrapper", ".film_list-wrap", "#search-results"];

const NEXT_PAGE_SELECTORS: [&str; 4] = [
    ".pagination a[rel='next']",
    ".pagination .page-item.active + .page-item a",
    ".pagination .next:not(.disabled)",
    "a[rel='next']",
];

/// What a search page tells about itself
#[derive(Debug, Clone, Default)]
pub struct SearchPageMarkup {
    pub results: Vec<AnimeSummary>,
    pub has_next_page: bool,
    /// Total number of pages, at least 1
    pub total_pages: u32,
}

/// Parse a search results page.
pub fn parse_search_results(html: &str) -> SearchPageMarkup {
    let document = Html::parse_document(html);

    let mut results = parse_section(&document, &RESULT_CONTAINERS);
    if results.is_empty() {
        results = parse_cards_in(&document.root_element());
    }

    SearchPageMarkup {
        results,
        has_next_page: detect_next_page(&document),
        total_pages: extract_total_pages(&document).unwrap_or(1).max(1),
    }
}

/// Whether the pagination block links to a following page.
fn detect_next_page(document: &Html) -> bool {
    NEXT_PAGE_SELECTORS.iter().any(|selector_str| {
        Selector::parse(selector_str)
            .map(|selector| document.select(&selector).next().is_some())
            .unwrap_or(false)
    })
}

/// Highest page number the pagination block refers to.
///
/// Prefers the `page=` parameter of the "last" link, then falls back to the
/// largest number among the page links.
fn extract_total_pages(document: &Html) -> Option<u32> {
    if let Ok(selector) = Selector::parse(".pagination a[rel='last'], .pagination .page-item:last-child a") {
        let from_last = document
            .select(&selector)
            .filter_map(|el| el.value().attr("href"))
            .find_map(page_param);
        if from_last.is_some() {
            return from_last;
        }
    }

    let selector = Selector::parse(".pagination a, .pagination .page-link, .pagination span").ok()?;
    document
        .select(&selector)
        .filter_map(|el| {
            let text = el.text().collect::<String>();
            let text = text.trim();
            if text.chars().all(|c| c.is_ascii_digit()) {
                parse_count(text)
            } else {
                el.value().attr("href").and_then(page_param)
            }
        })
        .max()
}

/// Value of the `page` query parameter in a link.
fn page_param(href: &str) -> Option<u32> {
    let query = href.split_once('?')?.1;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "page")
        .and_then(|(_, value)| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_param() {
        assert_eq!(page_param("/search?q=one&page=7"), Some(7));
        assert_eq!(page_param("?page=2"), Some(2));
        assert_eq!(page_param("/search?q=one"), None);
        assert_eq!(page_param("/search"), None);
        assert_eq!(page_param("/search?page=abc"), None);
    }

    #[test]
    fn test_parse_search_results_with_pagination() {
        let html = r#"
            <html><body>
              <div class="aitem-wrapper">
                <div class="aitem"><a class="title" href="/watch/one-piece-dk6r">One Piece</a><span class="type">TV</span></div>
                <div class="aitem"><a class="title" href="/watch/one-piece-film-red-1v4o">One Piece Film: Red</a><span class="type">Movie</span></div>
              </div>
              <ul class="pagination">
                <li class="page-item active"><a class="page-link" href="/search?q=one+piece&page=1">1</a></li>
                <li class="page-item"><a class="page-link" href="/search?q=one+piece&page=2">2</a></li>
                <li class="page-item"><a class="page-link" rel="next" href="/search?q=one+piece&page=2">›</a></li>
                <li class="page-item"><a class="page-link" rel="last" href="/search?q=one+piece&page=5">»</a></li>
              </ul>
            </body></html>
        "#;

        let page = parse_search_results(html);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].id, "one-piece-dk6r");
        assert_eq!(page.results[1].kind.as_deref(), Some("Movie"));
        assert!(page.has_next_page);
        assert_eq!(page.total_pages, 5);
    }

    #[test]
    fn test_total_pages_from_link_numbers() {
        let html = r#"
            <div class="aitem"><a class="title" href="/watch/a-1">A</a></div>
            <div class="pagination"><span>1</span><a href="?page=2">2</a><a href="?page=3">3</a></div>
        "#;
        let page = parse_search_results(html);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next_page);
    }

    #[test]
    fn test_parse_empty_html() {
        let page = parse_search_results("<html><body></body></html>");
        assert!(page.results.is_empty());
        assert!(!page.has_next_page);
        assert_eq!(page.total_pages, 1);
    }
}
