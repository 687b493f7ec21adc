//! Implements ChatGateway over the Zulip REST API.
//!
//! Every call authenticates with the bot's email/API key (HTTP basic auth) and
//! decodes the `result` envelope; a non-success result becomes
//! `DomainError::ChatService` carrying the server's message.

use crate::adapters::zulip::mapper::{
    self, Ack, ApiReply, BAD_EVENT_QUEUE_ID, EventsPayload, MembersPayload, MessagesPayload,
    RegisterPayload, StreamsPayload,
};
use crate::domain::{ChannelId, ChatEvent, ChatUser, DomainError, EventQueue};
use crate::ports::ChatGateway;
use crate::shared::config::{EVENT_POLL_TIMEOUT, HTTP_TIMEOUT, ZulipCredentials};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

/// How many direct messages to look back when checking whether a user was already greeted.
const DM_HISTORY_DEPTH: u32 = 100;

/// Zulip gateway adapter.
pub struct ZulipGateway {
    client: Client,
    credentials: ZulipCredentials,
}

impl ZulipGateway {
    pub fn new(credentials: ZulipCredentials) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| DomainError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            credentials,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/api/v1/{}", self.credentials.site, endpoint)
    }

    /// Send an authenticated request and decode the reply envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        action: &str,
    ) -> Result<T, DomainError> {
        let response = request
            .basic_auth(&self.credentials.email, Some(&self.credentials.key))
            .send()
            .await
            .map_err(|e| DomainError::Http(format!("cannot {action}: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DomainError::Http(format!("cannot {action}: {e}")))?;

        match serde_json::from_str::<ApiReply<T>>(&body) {
            Ok(ApiReply::Success(payload)) => Ok(payload),
            Ok(ApiReply::Error { msg, code }) if code.as_deref() == Some(BAD_EVENT_QUEUE_ID) => {
                Err(DomainError::QueueExpired(msg))
            }
            Ok(ApiReply::Error { msg, .. }) => {
                Err(DomainError::ChatService(format!("cannot {action}: {msg}")))
            }
            Err(e) => {
                warn!(status = %status, error = %e, "undecodable Zulip reply");
                Err(DomainError::Http(format!(
                    "cannot {action}: HTTP {status}: {}",
                    body.chars().take(200).collect::<String>()
                )))
            }
        }
    }
}

#[async_trait]
impl ChatGateway for ZulipGateway {
    async fn list_channels(&self) -> Result<Vec<ChannelId>, DomainError> {
        let payload: StreamsPayload = self
            .call(self.client.get(self.url("streams")), "get streams")
            .await?;
        Ok(payload
            .streams
            .into_iter()
            .map(mapper::channel_from_stream)
            .collect())
    }

    async fn list_users(&self) -> Result<Vec<ChatUser>, DomainError> {
        let payload: MembersPayload = self
            .call(self.client.get(self.url("users")), "get members")
            .await?;
        Ok(payload
            .members
            .into_iter()
            .map(mapper::member_to_user)
            .collect())
    }

    async fn direct_message_history(&self, user_id: i64) -> Result<Vec<String>, DomainError> {
        let narrow = json!([{"operator": "dm", "operand": [user_id]}]).to_string();
        let num_before = DM_HISTORY_DEPTH.to_string();
        let request = self.client.get(self.url("messages")).query(&[
            ("anchor", "newest"),
            ("num_before", num_before.as_str()),
            ("num_after", "0"),
            ("narrow", narrow.as_str()),
        ]);
        let payload: MessagesPayload = self.call(request, "get messages").await?;
        Ok(payload.messages.into_iter().map(|m| m.content).collect())
    }

    async fn subscribe(&self, user_id: i64, channels: &[ChannelId]) -> Result<(), DomainError> {
        let subscriptions: Vec<_> = channels
            .iter()
            .map(|c| json!({"name": c.as_str()}))
            .collect();
        let subscriptions = serde_json::Value::Array(subscriptions).to_string();
        let principals = json!([user_id]).to_string();
        let request = self.client.post(self.url("users/me/subscriptions")).form(&[
            ("subscriptions", subscriptions.as_str()),
            ("principals", principals.as_str()),
        ]);
        let _: Ack = self.call(request, "register user to streams").await?;
        debug!(user_id, count = channels.len(), "subscribed user");
        Ok(())
    }

    async fn send_direct_message(&self, user_id: i64, content: &str) -> Result<(), DomainError> {
        let to = json!([user_id]).to_string();
        let request = self.client.post(self.url("messages")).form(&[
            ("type", "direct"),
            ("to", to.as_str()),
            ("content", content),
        ]);
        let _: Ack = self.call(request, "send user message").await?;
        Ok(())
    }

    async fn send_channel_message(
        &self,
        channel: &ChannelId,
        topic: &str,
        content: &str,
    ) -> Result<(), DomainError> {
        let request = self.client.post(self.url("messages")).form(&[
            ("type", "stream"),
            ("to", channel.as_str()),
            ("topic", topic),
            ("content", content),
        ]);
        let _: Ack = self
            .call(request, &format!("send message to {channel}"))
            .await?;
        Ok(())
    }

    async fn register_events(&self, event_types: &[&str]) -> Result<EventQueue, DomainError> {
        let event_types = json!(event_types).to_string();
        let request = self
            .client
            .post(self.url("register"))
            .form(&[("event_types", event_types.as_str())]);
        let payload: RegisterPayload = self.call(request, "register event queue").await?;
        Ok(EventQueue {
            queue_id: payload.queue_id,
            last_event_id: payload.last_event_id,
        })
    }

    async fn poll_events(&self, queue: &mut EventQueue) -> Result<Vec<ChatEvent>, DomainError> {
        let last_event_id = queue.last_event_id.to_string();
        let request = self
            .client
            .get(self.url("events"))
            .timeout(EVENT_POLL_TIMEOUT)
            .query(&[
                ("queue_id", queue.queue_id.as_str()),
                ("last_event_id", last_event_id.as_str()),
            ]);
        let payload: EventsPayload = self.call(request, "get events").await?;

        let mut events = Vec::with_capacity(payload.events.len());
        for raw in payload.events {
            if let Some(id) = mapper::event_id(&raw) {
                queue.last_event_id = queue.last_event_id.max(id);
            }
            events.push(mapper::event_to_domain(raw));
        }
        Ok(events)
    }
}
