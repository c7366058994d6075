//! Anime detail and episode list parsers
//!
//! Any block missing from the page degrades to its default value; these
//! parsers never fail.

use scraper::{ElementRef, Html, Selector};

use crate::types::{
    AnimeDetail, AnimeInfo, AnimeMoreInfo, AnimeOverview, AnimeStats, EpisodeId, EpisodeList,
    EpisodeSummary, SubDubCounts,
};

use super::card::{clean_text, document_text, first_attr, first_text, parse_count, parse_section, poster};

const ENTITY_SELECTORS: [&str; 3] = ["#main-entity", ".anisc-detail", ".entity"];

const RECOMMENDED_CONTAINERS: [&str; 3] = ["#recommended", "section.recommended", ".sidebar-recommended"];

const RELATED_CONTAINERS: [&str; 3] = ["#related-anime", "section.related", ".sidebar-related"];

/// Parse an anime detail page.
///
/// # Arguments
/// * `html` - Raw HTML of `/anime/{id}`
/// * `anime_id` - Requested id, copied into `info.id`
pub fn parse_anime_detail(html: &str, anime_id: &str) -> AnimeDetail {
    let document = Html::parse_document(html);

    AnimeDetail {
        anime: AnimeOverview {
            info: extract_anime_info(&document, anime_id),
            more_info: extract_more_info(&document),
        },
        recommended_animes: parse_section(&document, &RECOMMENDED_CONTAINERS),
        related_animes: parse_section(&document, &RELATED_CONTAINERS),
    }
}

/// First element among [`ENTITY_SELECTORS`], or the document root.
fn entity_block(document: &Html) -> ElementRef<'_> {
    ENTITY_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .find_map(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element())
}

fn extract_anime_info(document: &Html, anime_id: &str) -> AnimeInfo {
    let entity = entity_block(document);

    let name = first_text(&entity, &["h1.title", ".film-name", "h1"])
        .or_else(|| document_text(document, &["h1"]))
        .unwrap_or_default();

    let poster = {
        let selector = Selector::parse(".poster, .film-poster").ok();
        selector
            .and_then(|s| entity.select(&s).find_map(|el| poster(&el)))
            .or_else(|| poster(&entity))
            .unwrap_or_default()
    };

    AnimeInfo {
        id: anime_id.to_string(),
        name,
        poster,
        description: first_text(&entity, &[".desc", ".film-description .text", ".description"])
            .unwrap_or_default(),
        stats: extract_stats(&entity),
    }
}

fn extract_stats(entity: &ElementRef) -> AnimeStats {
    let stats_block = Selector::parse(".info, .film-stats")
        .ok()
        .and_then(|s| entity.select(&s).next())
        .unwrap_or(*entity);

    let text = |selectors: &[&str]| first_text(&stats_block, selectors).unwrap_or_default();
    let count = |selectors: &[&str]| {
        first_text(&stats_block, selectors)
            .and_then(|t| parse_count(&t))
            .unwrap_or(0)
    };

    AnimeStats {
        rating: text(&[".rating", ".tick-pg"]),
        quality: text(&[".quality", ".tick-quality"]),
        episodes: SubDubCounts {
            sub: count(&[".sub", ".tick-sub"]),
            dub: count(&[".dub", ".tick-dub"]),
        },
        kind: text(&[".type", ".item-type"]),
        duration: text(&[".duration", ".item-duration"]),
    }
}

/// Secondary info comes as labelled rows such as `Aired: Sep 29, 2023`.
fn extract_more_info(document: &Html) -> AnimeMoreInfo {
    let mut more = AnimeMoreInfo::default();

    let Ok(selector) = Selector::parse(".detail > div, .anisc-info .item, .meta > div") else {
        return more;
    };

    for row in document.select(&selector) {
        let row_text = clean_text(&row.text().collect::<String>());
        let Some((label, value)) = row_text.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();

        match label.trim().to_ascii_lowercase().as_str() {
            "aired" | "date aired" => more.aired = value,
            "status" => more.status = value,
            "studios" | "studio" => more.studios = value,
            "duration" => more.duration = value,
            "genres" | "genre" => more.genres = row_genres(&row, &value),
            _ => {}
        }
    }

    more
}

/// Genre links of a row, or its comma separated text.
fn row_genres(row: &ElementRef, value: &str) -> Vec<String> {
    let links: Vec<String> = Selector::parse("a")
        .map(|selector| {
            row.select(&selector)
                .map(|a| clean_text(&a.text().collect::<String>()))
                .filter(|g| !g.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if !links.is_empty() {
        return links;
    }

    value
        .split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse the episode list page of `anime_id`, keeping site order.
pub fn parse_episode_list(html: &str, anime_id: &str) -> EpisodeList {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse(".eplist a, .ss-list a.ep-item, a.ep-item") else {
        return EpisodeList::default();
    };

    let episodes: Vec<EpisodeSummary> = document
        .select(&selector)
        .filter_map(|el| parse_episode_item(&el, anime_id))
        .collect();

    EpisodeList {
        total_episodes: episodes.len() as u32,
        episodes,
    }
}

fn parse_episode_item(element: &ElementRef, anime_id: &str) -> Option<EpisodeSummary> {
    let number = first_attr(element, &["num", "data-number", "data-num"])
        .and_then(|n| parse_count(&n))
        .or_else(|| parse_count(&element.text().collect::<String>()))?;

    let title = first_attr(element, &["title", "data-title"])
        .or_else(|| first_text(element, &["span", ".ep-name", ".ssli-detail .ep-name"]));

    let is_filler = element
        .value()
        .classes()
        .any(|c| c == "filler" || c == "ssl-item-filler");

    let episode_id = EpisodeId::new(anime_id, number.to_string()).ok()?;

    Some(EpisodeSummary {
        number,
        title,
        episode_id,
        is_filler,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL: &str = r#"
        <html><body>
          <div id="main-entity">
            <div class="poster"><img src="https://img.test/frieren.jpg"></div>
            <h1 class="title">Frieren: Beyond Journey's End</h1>
            <div class="info">
              <span class="rating">PG-13</span><span class="quality">HD</span>
              <span class="sub">28</span><span class="dub">20</span>
              <span class="type">TV</span><span class="duration">24 min</span>
            </div>
            <div class="desc">An elf mage outlives her party.</div>
            <div class="detail">
              <div>Aired: <span>Sep 29, 2023 to Mar 22, 2024</span></div>
              <div>Genres: <span><a href="/genres/adventure">Adventure</a>, <a href="/genres/drama">Drama</a></span></div>
              <div>Status: <span>Finished Airing</span></div>
              <div>Studios: <span><a>Madhouse</a></span></div>
              <div>Duration: <span>24 min</span></div>
            </div>
          </div>
          <section id="related-anime">
            <div class="aitem"><a class="title" href="/watch/frieren-mini-2b4k">Frieren Mini</a></div>
          </section>
          <section id="recommended">
            <div class="aitem"><a class="title" href="/watch/mushishi-1x8n">Mushishi</a></div>
            <div class="aitem"><a class="title" href="/watch/natsume-5o2p">Natsume</a></div>
          </section>
        </body></html>
    "#;

    #[test]
    fn test_parse_anime_detail() {
        let detail = parse_anime_detail(DETAIL, "frieren-4ekj");
        let info = &detail.anime.info;

        assert_eq!(info.id, "frieren-4ekj");
        assert_eq!(info.name, "Frieren: Beyond Journey's End");
        assert_eq!(info.poster, "https://img.test/frieren.jpg");
        assert_eq!(info.description, "An elf mage outlives her party.");
        assert_eq!(info.stats.rating, "PG-13");
        assert_eq!(info.stats.quality, "HD");
        assert_eq!(info.stats.episodes, SubDubCounts { sub: 28, dub: 20 });
        assert_eq!(info.stats.kind, "TV");
        assert_eq!(info.stats.duration, "24 min");

        let more = &detail.anime.more_info;
        assert_eq!(more.aired, "Sep 29, 2023 to Mar 22, 2024");
        assert_eq!(more.genres, vec!["Adventure".to_string(), "Drama".to_string()]);
        assert_eq!(more.status, "Finished Airing");
        assert_eq!(more.studios, "Madhouse");
        assert_eq!(more.duration, "24 min");

        assert_eq!(detail.related_animes.len(), 1);
        assert_eq!(detail.recommended_animes.len(), 2);
        assert_eq!(detail.recommended_animes[1].id, "natsume-5o2p");
    }

    #[test]
    fn test_parse_anime_detail_degrades_to_defaults() {
        let detail = parse_anime_detail("<html><body><p>maintenance</p></body></html>", "x-1");
        assert_eq!(detail.anime.info.id, "x-1");
        assert_eq!(detail.anime.info.name, "");
        assert_eq!(detail.anime.info.stats.episodes, SubDubCounts::default());
        assert!(detail.anime.more_info.genres.is_empty());
        assert!(detail.recommended_animes.is_empty());
        assert!(detail.related_animes.is_empty());
    }

    #[test]
    fn test_genres_from_plain_text() {
        let html = r#"<div class="detail"><div>Genres: Action, Comedy ,</div></div>"#;
        let more = parse_anime_detail(html, "x").anime.more_info;
        assert_eq!(more.genres, vec!["Action".to_string(), "Comedy".to_string()]);
    }

    #[test]
    fn test_parse_episode_list() {
        let html = r#"
            <div class="eplist">
              <ul class="range">
                <li><a num="1" title="The Journey's End"><span>The Journey's End</span></a></li>
                <li><a num="2" class="filler"><span>It Didn't Have to Be Magic</span></a></li>
                <li><a>3</a></li>
                <li><a title="no number"></a></li>
              </ul>
            </div>
        "#;

        let list = parse_episode_list(html, "frieren-4ekj");
        assert_eq!(list.total_episodes, 3);

        let episodes = &list.episodes;
        assert_eq!(episodes[0].number, 1);
        assert_eq!(episodes[0].title.as_deref(), Some("The Journey's End"));
        assert_eq!(episodes[0].episode_id.to_string(), "frieren-4ekj?ep=1");
        assert!(!episodes[0].is_filler);

        assert_eq!(episodes[1].title.as_deref(), Some("It Didn't Have to Be Magic"));
        assert!(episodes[1].is_filler);

        assert_eq!(episodes[2].number, 3);
        assert_eq!(episodes[2].title, None);
    }

    #[test]
    fn test_parse_episodes_empty() {
        let list = parse_episode_list("<html><body></body></html>", "x");
        assert!(list.episodes.is_empty());
        assert_eq!(list.total_episodes, 0);
    }
}
