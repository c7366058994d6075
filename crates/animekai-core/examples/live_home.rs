use animekai_core::{AnimeKaiScraper, DEFAULT_CATEGORY, DEFAULT_SERVER};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let scraper = AnimeKaiScraper::new()?;

    println!("🏠 Loading home page...\n");

    let home = scraper.get_home_page().await?;
    println!("Genres: {}", home.genres.len());
    println!("Spotlight: {}", home.spotlight_animes.len());
    for spot in home.spotlight_animes.iter().take(3) {
        println!("  #{} {} ({})", spot.rank, spot.anime.name, spot.anime.id);
    }
    println!("Trending: {}", home.trending_animes.len());
    println!("Latest episodes: {}", home.latest_episode_animes.len());

    let query = std::env::args().nth(1).unwrap_or_else(|| "frieren".to_string());
    println!("\n🔍 Searching '{query}'...\n");

    let page = scraper.search(&query, 1, Default::default()).await?;
    println!(
        "Found {} results (page {}/{}, next: {})",
        page.results.len(),
        page.current_page,
        page.total_pages,
        page.has_next_page
    );

    let Some(first) = page.results.first() else {
        return Ok(());
    };

    println!("\n📺 Loading {} ({})\n", first.name, first.id);
    let detail = scraper.get_info(&first.id).await?;
    println!("Name: {}", detail.anime.info.name);
    println!("Genres: {}", detail.anime.more_info.genres.join(", "));
    println!("Status: {}", detail.anime.more_info.status);

    let episodes = scraper.get_episodes(&first.id).await?;
    println!("\n🎬 {} episodes", episodes.total_episodes);

    if let Some(episode) = episodes.episodes.first() {
        let episode_id = episode.episode_id.to_string();
        let servers = scraper.get_episode_servers(&episode_id).await?;
        println!(
            "Servers for {}: sub {}, dub {}, raw {}",
            episode_id,
            servers.sub.len(),
            servers.dub.len(),
            servers.raw.len()
        );

        match scraper
            .get_episode_sources(&episode_id, DEFAULT_SERVER.key(), DEFAULT_CATEGORY.as_str())
            .await
        {
            Ok(sources) => {
                println!("Referer: {}", sources.headers.referer);
                for source in &sources.sources {
                    println!("  ▶ {} [{}]", source.url, source.quality);
                }
                for track in &sources.subtitles {
                    println!("  💬 {} {}", track.lang, track.url);
                }
            }
            Err(e) => println!("No sources: {e}"),
        }
    }

    Ok(())
}
