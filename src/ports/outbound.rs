//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{
    CampusEvent, ChannelId, ChatEvent, ChatUser, DomainError, EventQueue, StudentRecord,
    WorkingPaper,
};

/// Chat service gateway (Zulip). Listing, subscriptions, messages, events.
#[async_trait::async_trait]
pub trait ChatGateway: Send + Sync {
    /// Names of all channels visible to the bot.
    async fn list_channels(&self) -> Result<Vec<ChannelId>, DomainError>;

    /// All members of the organization, including bots and deactivated accounts.
    async fn list_users(&self) -> Result<Vec<ChatUser>, DomainError>;

    /// Most recent direct messages exchanged with `user_id` (newest 100).
    async fn direct_message_history(&self, user_id: i64) -> Result<Vec<String>, DomainError>;

    /// Subscribe `user_id` to `channels`. Already-joined channels are a no-op.
    async fn subscribe(&self, user_id: i64, channels: &[ChannelId]) -> Result<(), DomainError>;

    async fn send_direct_message(&self, user_id: i64, content: &str) -> Result<(), DomainError>;

    async fn send_channel_message(
        &self,
        channel: &ChannelId,
        topic: &str,
        content: &str,
    ) -> Result<(), DomainError>;

    /// Register an event queue for the given event types (e.g. `realm_user`).
    async fn register_events(&self, event_types: &[&str]) -> Result<EventQueue, DomainError>;

    /// Long-poll the queue. Advances `queue.last_event_id` past the returned events.
    ///
    /// Returns `DomainError::QueueExpired` when the server has garbage-collected the queue.
    async fn poll_events(&self, queue: &mut EventQueue) -> Result<Vec<ChatEvent>, DomainError>;
}

/// Department graduate-student directory.
#[async_trait::async_trait]
pub trait DirectorySource: Send + Sync {
    async fn fetch_students(&self) -> Result<Vec<StudentRecord>, DomainError>;
}

/// Campus event calendar feed.
#[async_trait::async_trait]
pub trait EventFeed: Send + Sync {
    /// All upcoming occurrences in the feed, in feed order.
    async fn fetch_events(&self) -> Result<Vec<CampusEvent>, DomainError>;
}

/// Working-paper search.
#[async_trait::async_trait]
pub trait PaperSearch: Send + Sync {
    /// Papers new this week matching `facet:term`.
    async fn new_papers(&self, facet: &str, term: &str) -> Result<Vec<WorkingPaper>, DomainError>;
}

/// Message templates. Context is any serializable view.
pub trait TemplatePort: Send + Sync {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String, DomainError>;
}
