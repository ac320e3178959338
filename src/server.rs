use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::{extract::State, http::StatusCode, routing::get, Router};
use tracing::{info, warn};

use crate::config::Config;
use crate::events::{self, EventBatch};
use crate::finance::FinanceClient;
use crate::reddit::RedditClient;

/// Longest reply the chat transport accepts.
const MAX_REPLY_CHARS: usize = 1000;

const GREETING: &str = "hookbot here";

/// Shared application state: the API clients, built once at startup and
/// read-only afterwards.
pub struct AppState {
    pub finance: FinanceClient,
    pub reddit: RedditClient,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            finance: FinanceClient::new(config.finance.clone()),
            reddit: RedditClient::new(config.reddit.clone()),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    // Unlisted methods on "/" get 405 from the method router.
    Router::new()
        .route("/", get(liveness).post(webhook))
        .with_state(state)
}

/// Binds the listen port and serves until the process is killed. A bind
/// failure is fatal.
pub async fn run(state: Arc<AppState>, port: u16) -> Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("Listening on {}", addr);

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}

/// GET probe. The chat service (and anyone curious) gets a fixed greeting;
/// whatever body they sent is only logged.
async fn liveness(body: Bytes) -> &'static str {
    info!("Get request: {}", String::from_utf8_lossy(&body));
    GREETING
}

/// POST webhook: decode the event batch, run every command it carries, and
/// reply with the concatenated results.
async fn webhook(State(state): State<Arc<AppState>>, body: Bytes) -> (StatusCode, String) {
    let batch: EventBatch = match serde_json::from_slice(&body) {
        Ok(batch) => batch,
        Err(err) => {
            warn!("Malformed webhook payload: {}", err);
            return (StatusCode::BAD_REQUEST, "Bad request".to_string());
        }
    };

    let results = events::dispatch_batch(&state, &batch.events).await;
    (StatusCode::OK, clip_reply(&results))
}

/// Trims trailing padding and caps the reply below the chat service's
/// message length limit.
fn clip_reply(results: &str) -> String {
    let trimmed = results.trim_end_matches(['\n', ' ']);
    if trimmed.chars().count() > MAX_REPLY_CHARS {
        trimmed.chars().take(MAX_REPLY_CHARS - 1).collect()
    } else {
        trimmed.to_string()
    }
}
