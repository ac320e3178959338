use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub finance: FinanceConfig,
    #[serde(default)]
    pub reddit: RedditConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FinanceConfig {
    #[serde(default = "default_finance_base_url")]
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedditConfig {
    #[serde(default = "default_reddit_base_url")]
    pub base_url: String,
    #[serde(default = "default_subreddit")]
    pub subreddit: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            base_url: default_finance_base_url(),
        }
    }
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            base_url: default_reddit_base_url(),
            subreddit: default_subreddit(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_finance_base_url() -> String {
    "https://query.yahooapis.com/v1/public/yql".to_string()
}

fn default_reddit_base_url() -> String {
    "https://www.reddit.com".to_string()
}

fn default_subreddit() -> String {
    "golang".to_string()
}

impl Config {
    /// Loads the TOML config file. A missing file is fine; every field has a
    /// default. The `PORT` environment variable overrides `[server] port`.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))
            }
        };

        if let Ok(port) = std::env::var("PORT") {
            config.server.port = port
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {port}"))?;
        }

        Ok(config)
    }
}
