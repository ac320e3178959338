use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::RedditConfig;

const DEFAULT_LIMIT: i64 = 3;
const MAX_LIMIT: i64 = 5;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(default)]
    data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Item,
}

#[derive(Debug, Deserialize)]
pub struct Item {
    pub score: i64,
    pub ups: i64,
    pub downs: i64,
    pub title: String,
    pub url: String,
}

impl Item {
    /// Formats one listing entry, e.g. `42 (u:50, d:8) Title : https://...`.
    pub fn format(&self) -> String {
        format!(
            "{} (u:{}, d:{}) {} : {}",
            self.score, self.ups, self.downs, self.title, self.url
        )
    }
}

/// Client for the subreddit hot listing API.
pub struct RedditClient {
    client: reqwest::Client,
    config: RedditConfig,
}

impl RedditClient {
    pub fn new(config: RedditConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Runs the `reddit` command. The optional first argument caps the number
    /// of fetched items: default 3, hard ceiling 5. A non-integer argument is
    /// reported back to the user without touching the API.
    pub async fn hot(&self, args: &[&str]) -> String {
        let limit = match args.first() {
            None => DEFAULT_LIMIT,
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) => n.min(MAX_LIMIT),
                Err(_) => return format!("invalid argument: {}", args.join(" ")),
            },
        };

        match self.fetch(limit).await {
            Ok(items) => items
                .iter()
                .map(Item::format)
                .collect::<Vec<_>>()
                .join("\n"),
            Err(err) => {
                warn!("Hot listing fetch failed: {:#}", err);
                String::new()
            }
        }
    }

    async fn fetch(&self, limit: i64) -> Result<Vec<Item>> {
        let url = format!(
            "{}/r/{}/hot.json",
            self.config.base_url, self.config.subreddit
        );

        debug!("Sending listing request to {} (limit {})", url, limit);

        let response = self
            .client
            .get(&url)
            .query(&[("limit", limit)])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("Failed to send hot listing request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Hot listing API error ({})", status);
        }

        let listing: Listing = response
            .json()
            .await
            .context("Failed to parse hot listing response")?;

        Ok(listing
            .data
            .children
            .into_iter()
            .map(|child| child.data)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn listing_body() -> serde_json::Value {
        serde_json::json!({
            "data": {"children": [
                {"data": {"score": 42, "ups": 50, "downs": 8,
                          "title": "Release notes", "url": "https://example.com/1"}},
                {"data": {"score": 17, "ups": 20, "downs": 3,
                          "title": "Show and tell", "url": "https://example.com/2"}}
            ]}
        })
    }

    fn client(server: &MockServer) -> RedditClient {
        RedditClient::new(RedditConfig {
            base_url: server.uri(),
            subreddit: "golang".to_string(),
        })
    }

    #[test]
    fn test_item_format() {
        let item = Item {
            score: 42,
            ups: 50,
            downs: 8,
            title: "Release notes".to_string(),
            url: "https://example.com/1".to_string(),
        };
        assert_eq!(
            item.format(),
            "42 (u:50, d:8) Release notes : https://example.com/1"
        );
    }

    #[tokio::test]
    async fn test_hot_defaults_to_limit_3() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/golang/hot.json"))
            .and(query_param("limit", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing_body()))
            .expect(1)
            .mount(&server)
            .await;

        let out = client(&server).hot(&[]).await;
        assert_eq!(
            out,
            "42 (u:50, d:8) Release notes : https://example.com/1\n\
             17 (u:20, d:3) Show and tell : https://example.com/2"
        );
    }

    #[tokio::test]
    async fn test_hot_clamps_limit_to_5() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/golang/hot.json"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing_body()))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).hot(&["10"]).await;
    }

    #[tokio::test]
    async fn test_hot_invalid_argument_skips_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing_body()))
            .expect(0)
            .mount(&server)
            .await;

        let out = client(&server).hot(&["abc", "xyz"]).await;
        assert_eq!(out, "invalid argument: abc xyz");
    }

    #[tokio::test]
    async fn test_hot_collapses_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert_eq!(client(&server).hot(&[]).await, "");
    }
}
