use anyhow::Context;
use animekai_core::client::DEFAULT_TIMEOUT_SECS;
use animekai_core::{AnimeKaiClient, AnimeKaiScraper, ClientConfig, SiteConfig, ANIMEKAI_BASE_URL};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Env var naming the config file
pub const CONFIG_PATH_ENV: &str = "ANIMEKAI_CONFIG";

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, serde::Deserialize)]
pub struct Config {
    #[serde(rename = "bind-address", default = "default_bind_address")]
    pub bind_address: SocketAddr,

    #[serde(rename = "upstream-base-url", default = "default_upstream_base_url")]
    pub upstream_base_url: String,

    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub logging: ConfigLogging,
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 4000))
}

fn default_upstream_base_url() -> String {
    ANIMEKAI_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            upstream_base_url: default_upstream_base_url(),
            timeout_secs: default_timeout_secs(),
            logging: ConfigLogging::default(),
        }
    }
}

impl Config {
    /// Load the config named by `ANIMEKAI_CONFIG` (or `config.toml`), then
    /// apply the `PORT` override.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let path = Path::new(&path);

        let exists = path
            .try_exists()
            .with_context(|| format!("failed to check if \"{}\" exists", path.display()))?;
        let mut config = if exists {
            Self::load_path(path)?
        } else {
            Self::default()
        };

        config.apply_port_override(std::env::var("PORT").ok().as_deref())?;
        Ok(config)
    }

    /// Load and validate a config.
    pub fn load_path<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to load config file at \"{}\"", path.display()))?;
        let config: Self = toml::from_str(&data)
            .with_context(|| format!("failed to parse config file at \"{}\"", path.display()))?;

        SiteConfig::from_base_url(&config.upstream_base_url).with_context(|| {
            format!(
                "invalid upstream-base-url in config file at \"{}\"",
                path.display()
            )
        })?;

        Ok(config)
    }

    /// Replace the bound port with `port`, when given.
    pub fn apply_port_override(&mut self, port: Option<&str>) -> anyhow::Result<()> {
        if let Some(port) = port {
            let port: u16 = port
                .trim()
                .parse()
                .with_context(|| format!("invalid PORT \"{port}\""))?;
            self.bind_address.set_port(port);
        }

        Ok(())
    }

    /// Build the scraper this config describes.
    pub fn scraper(&self) -> anyhow::Result<AnimeKaiScraper> {
        let site = SiteConfig::from_base_url(&self.upstream_base_url)
            .context("invalid upstream base url")?;
        let client = AnimeKaiClient::with_config(ClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            ..ClientConfig::default()
        })
        .context("failed to build http client")?;

        Ok(AnimeKaiScraper::with_client(client, site))
    }
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct ConfigLogging {
    #[serde(default)]
    pub directives: Vec<String>,
}
