use serde::Deserialize;
use tracing::info;

use crate::commands::{Command, COMMAND_PREFIX};
use crate::server::AppState;

/// One webhook push from the chat service.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EventBatch {
    pub events: Vec<Event>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Event {
    pub event_id: i64,
    pub message: Option<Message>,
}

/// A chat message. Only `text` drives dispatch; the other fields ride along
/// from the wire format.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
#[allow(dead_code)]
pub struct Message {
    pub id: String,
    pub room: String,
    pub public_session_id: String,
    pub icon_url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub speaker_id: String,
    pub nickname: String,
    pub text: String,
}

/// Runs the command embedded in one event's message, if any. Events without
/// a message, empty texts, and texts without the command prefix all produce
/// an empty result.
pub async fn dispatch_event(state: &AppState, event: &Event) -> String {
    let Some(message) = &event.message else {
        return String::new();
    };

    let tokens: Vec<&str> = message.text.split_whitespace().collect();
    let Some(first) = tokens.first() else {
        return String::new();
    };

    let Some(name) = first.strip_prefix(COMMAND_PREFIX) else {
        return String::new();
    };

    info!(
        "event {}: command from {}: {}",
        event.event_id, message.nickname, message.text
    );

    match Command::parse(name) {
        Some(command) => command.run(state, &tokens[1..]).await,
        None => format!("unknown command: {first}\n"),
    }
}

/// Concatenates dispatch results over a whole batch, in event order.
pub async fn dispatch_batch(state: &AppState, events: &[Event]) -> String {
    let mut results = String::new();
    for event in events {
        results.push_str(&dispatch_event(state, event).await);
    }
    results
}
