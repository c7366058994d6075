use std::sync::Arc;

use animekai_server::logger;
use animekai_server::Config;
use anyhow::Context;
use tracing::error;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load config")?;
    logger::init(&config.logging.directives).context("failed to init logger")?;

    let tokio_rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    tokio_rt.block_on(async_main(config))
}

async fn async_main(config: Config) -> anyhow::Result<()> {
    let scraper = config.scraper().context("failed to build scraper")?;
    let app = animekai_server::app(Arc::new(scraper));

    let listener = tokio::net::TcpListener::bind(config.bind_address)
        .await
        .context("failed to bind to address")?;

    info!(
        "AnimeKai/AniKoto API listening on {} (upstream {})",
        config.bind_address, config.upstream_base_url
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c()
                .await
                .context("failed to register ctrl+c handler")
            {
                Ok(()) => {
                    info!("shutting down");
                }
                Err(e) => {
                    error!("{e:?}");
                }
            }
        })
        .await
        .context("server error")
}
