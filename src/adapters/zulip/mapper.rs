//! Map Zulip REST payloads to domain entities.
//!
//! Every reply carries `"result": "success" | "error"`; it is decoded once into
//! [`ApiReply`] and the payload types below, never passed on as raw JSON.

use crate::domain::{ChannelId, ChatEvent, ChatUser};
use serde::Deserialize;

/// Error code returned when the server has dropped an event queue.
pub const BAD_EVENT_QUEUE_ID: &str = "BAD_EVENT_QUEUE_ID";

/// Top-level reply envelope.
#[derive(Debug, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum ApiReply<T> {
    Success(T),
    Error {
        #[serde(default)]
        msg: String,
        #[serde(default)]
        code: Option<String>,
    },
}

/// Payload of replies that carry nothing we use.
#[derive(Debug, Deserialize)]
pub struct Ack {}

#[derive(Debug, Deserialize)]
pub struct StreamsPayload {
    pub streams: Vec<RawStream>,
}

#[derive(Debug, Deserialize)]
pub struct RawStream {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct MembersPayload {
    pub members: Vec<RawMember>,
}

#[derive(Debug, Deserialize)]
pub struct RawMember {
    pub user_id: i64,
    pub full_name: String,
    /// Organization-visible address (may be a `user123@...` alias).
    pub email: String,
    /// Address used to register; only visible to admins and the bot's own realm policy.
    #[serde(default)]
    pub delivery_email: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct MessagesPayload {
    pub messages: Vec<RawMessage>,
}

#[derive(Debug, Deserialize)]
pub struct RawMessage {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub queue_id: String,
    pub last_event_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct EventsPayload {
    pub events: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawEvent {
    RealmUser {
        op: String,
        #[serde(default)]
        person: Option<RawMember>,
    },
    Heartbeat,
    #[serde(other)]
    Other,
}

pub fn channel_from_stream(stream: RawStream) -> ChannelId {
    ChannelId::new(stream.name)
}

/// Prefers the registration address over the visible alias.
pub fn member_to_user(member: RawMember) -> ChatUser {
    let email = member
        .delivery_email
        .filter(|e| !e.is_empty())
        .unwrap_or(member.email);
    ChatUser {
        id: member.user_id,
        name: member.full_name,
        email,
        is_bot: member.is_bot,
        is_active: member.is_active,
    }
}

/// Event id of a raw event, if present.
pub fn event_id(raw: &serde_json::Value) -> Option<i64> {
    raw.get("id").and_then(serde_json::Value::as_i64)
}

/// Decode one raw event. Unknown or malformed events become `ChatEvent::Other`.
pub fn event_to_domain(raw: serde_json::Value) -> ChatEvent {
    match serde_json::from_value::<RawEvent>(raw) {
        Ok(RawEvent::RealmUser {
            op,
            person: Some(person),
        }) if op == "add" => {
            let user = member_to_user(person);
            ChatEvent::UserRegistered {
                id: user.id,
                name: user.name,
                email: user.email,
                is_bot: user.is_bot,
            }
        }
        Ok(RawEvent::Heartbeat) => ChatEvent::Heartbeat,
        _ => ChatEvent::Other,
    }
}
