use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::FinanceConfig;

/// Currency pairs quoted against JPY.
const PAIRS: &str = r#""USDJPY","EURJPY","GBPJPY","CADJPY","CNYJPY""#;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct FinanceResponse {
    #[serde(default)]
    query: Option<ResultsEnvelope>,
    #[serde(default)]
    results: Option<RateList>,
}

#[derive(Debug, Deserialize)]
struct ResultsEnvelope {
    #[serde(default)]
    results: RateList,
}

#[derive(Debug, Default, Deserialize)]
struct RateList {
    #[serde(default)]
    rate: Vec<Rate>,
}

impl FinanceResponse {
    // The API has shipped the rate array both wrapped in a `query` object
    // and at the top level; accept either.
    fn into_rates(self) -> Vec<Rate> {
        match (self.query, self.results) {
            (Some(envelope), _) => envelope.results.rate,
            (None, Some(results)) => results.rate,
            (None, None) => Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Rate {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Rate", deserialize_with = "rate_value")]
    pub rate: f64,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Time")]
    pub time: String,
}

/// The API has served `Rate` both as a bare number and as a string.
fn rate_value<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom("rate out of range")),
        serde_json::Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("rate is not a number: {s}"))),
        other => Err(D::Error::custom(format!("unexpected rate value: {other}"))),
    }
}

impl Rate {
    /// Formats one quote, e.g. `1USD = 150JPY [1/1/2024 9:00am]`. Pairs whose
    /// name does not split into exactly two currency codes yield `None`.
    pub fn format(&self) -> Option<String> {
        let tokens: Vec<&str> = self.name.split_whitespace().collect();
        if tokens.len() != 2 {
            return None;
        }
        Some(format!(
            "1{} = {}JPY [{} {}]",
            tokens[0], self.rate, self.date, self.time
        ))
    }
}

/// Client for the currency exchange rate API.
pub struct FinanceClient {
    client: reqwest::Client,
    config: FinanceConfig,
}

impl FinanceClient {
    pub fn new(config: FinanceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Fetches current JPY rates and joins the formatted quotes with `" / "`.
    /// Transport and decode failures are logged and collapse to an empty
    /// result; the webhook reply must not fail because the rate API did.
    pub async fn exchange_rates(&self) -> String {
        match self.fetch().await {
            Ok(rates) => rates
                .iter()
                .filter_map(Rate::format)
                .collect::<Vec<_>>()
                .join(" / "),
            Err(err) => {
                warn!("Exchange rate fetch failed: {:#}", err);
                String::new()
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<Rate>> {
        let query = format!("select * from yahoo.finance.xchange where pair in ({PAIRS})");

        debug!("Sending rate request to {}", self.config.base_url);

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("q", query.as_str()),
                ("format", "json"),
                ("env", "store://datatables.org/alltableswithkeys"),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("Failed to send exchange rate request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Exchange rate API error ({})", status);
        }

        let payload: FinanceResponse = response
            .json()
            .await
            .context("Failed to parse exchange rate response")?;

        Ok(payload.into_rates())
    }
}
