// common/src/messages.rs
use actix::prelude::*;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event names the server emits on its own behalf
pub const WELCOME_EVENT: &str = "welcome";
pub const ERROR_EVENT: &str = "error";

/// Event sent by a client over an admitted connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientEvent {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

/// Event delivered to clients.
///
/// `from` is filled in by the server with the sender's username and is
/// `None` for server-originated events.
#[derive(Debug, Clone, Serialize, Deserialize, Message)]
#[rtype(result = "()")]
pub struct ServerEvent {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default)]
    pub data: Value,
    pub timestamp: i64,
}

impl ServerEvent {
    pub fn system(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            from: None,
            data,
            timestamp: Utc::now().timestamp(),
        }
    }

    pub fn relay(from: &str, event: ClientEvent) -> Self {
        Self {
            event: event.event,
            from: Some(from.to_string()),
            data: event.data,
            timestamp: Utc::now().timestamp(),
        }
    }
}
