//! Watch page parser
//!
//! The watch page groups its servers by category:
//!
//! ```html
//! <div class="server-items" data-id="sub">
//!   <span class="server" data-server="hd-1" data-link="https://frame.test/e/abc">VidStreaming</span>
//!   <span class="server" data-lid="Kx9a">StreamSB</span>
//! </div>
//! ```
//!
//! A server either links to its playback frame directly or only carries an id
//! that the site's ajax endpoint resolves.

use scraper::{ElementRef, Html, Selector};

use crate::types::{Category, ServerInfo, ServerKey};

use super::card::{clean_text, first_attr};

const GROUP_SELECTOR: &str = ".server-items[data-type], .server-items[data-id]";

const SERVER_SELECTOR: &str = ".server, .server-item";

/// Where a server's playback frame lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameRef {
    /// Absolute or page-relative frame URL
    Link(String),
    /// Server id to be resolved through the ajax endpoint
    ServerId(String),
}

/// Category name a server group is tagged with.
fn group_category(group: &ElementRef) -> Option<String> {
    first_attr(group, &["data-type", "data-id"])
}

/// Server groups tagged with `category` (case-insensitive).
fn category_groups<'a>(document: &'a Html, category: &'a str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    let selector = Selector::parse(GROUP_SELECTOR).ok();
    selector
        .into_iter()
        .flat_map(move |selector| document.select(&selector).collect::<Vec<_>>())
        .filter(move |group| {
            group_category(group).is_some_and(|c| c.eq_ignore_ascii_case(category.trim()))
        })
}

fn server_elements<'a>(group: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    Selector::parse(SERVER_SELECTOR)
        .map(|selector| group.select(&selector).collect())
        .unwrap_or_default()
}

fn server_text(element: &ElementRef) -> String {
    clean_text(&element.text().collect::<String>())
}

/// Identify the backend of a server element by key attribute, then by name.
fn server_key(element: &ElementRef) -> Option<ServerKey> {
    first_attr(element, &["data-server", "data-server-id", "data-sv"])
        .and_then(|key| ServerKey::lookup(&key))
        .or_else(|| ServerKey::lookup(&server_text(element)))
}

/// List the servers offered for `category`; an absent category yields `[]`.
pub fn parse_servers(html: &str, category: Category) -> Vec<ServerInfo> {
    let document = Html::parse_document(html);
    let mut servers: Vec<ServerInfo> = Vec::new();

    for group in category_groups(&document, category.as_str()) {
        for element in server_elements(&group) {
            let Some(server_id) = server_key(&element) else {
                continue;
            };
            let text = server_text(&element);
            let server_name = if text.is_empty() {
                server_id.display_name().to_string()
            } else {
                text
            };

            let info = ServerInfo {
                server_name,
                server_id,
            };
            if !servers.contains(&info) {
                servers.push(info);
            }
        }
    }

    servers
}

/// Whether `element` is the server the caller asked for.
///
/// `requested` may be a short key (`hd-1`) or a display name.
fn matches_server(element: &ElementRef, requested: &str) -> bool {
    let requested = requested.trim();
    if requested.is_empty() {
        return false;
    }

    if let (Some(wanted), Some(actual)) = (ServerKey::lookup(requested), server_key(element)) {
        return wanted == actual;
    }

    server_text(element).eq_ignore_ascii_case(requested)
        || first_attr(element, &["data-server", "data-server-id", "data-sv"])
            .is_some_and(|key| key.eq_ignore_ascii_case(requested))
}

/// Locate the playback frame of `server` within `category`.
///
/// Returns `None` when the page has no such server for that category.
pub fn find_server_frame(html: &str, server: &str, category: &str) -> Option<FrameRef> {
    let document = Html::parse_document(html);

    for group in category_groups(&document, category) {
        for element in server_elements(&group) {
            if !matches_server(&element, server) {
                continue;
            }

            if let Some(link) = first_attr(&element, &["data-link", "data-src", "data-url", "href"]) {
                return Some(FrameRef::Link(link));
            }
            if let Some(id) = first_attr(&element, &["data-lid", "data-id"]) {
                return Some(FrameRef::ServerId(id));
            }
        }
    }

    None
}
