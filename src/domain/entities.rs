//! Domain entities. Pure data structures for the core business.
//!
//! No Zulip or HTTP types here; adapters map into these.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of course channels (e.g. `course/ECON 410-1`).
pub const COURSE_PREFIX: &str = "course/";
/// Prefix of research-field channels (e.g. `field/macro`).
pub const FIELD_PREFIX: &str = "field/";

/// Email domain of Kellogg (business school) students.
const KELLOGG_DOMAIN: &str = "@kellogg.northwestern.edu";

/// A graduate student as listed in the department directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub name: String,
    /// Year in the program, starting at 1.
    pub year: u32,
    /// Lowercased email address.
    pub email: String,
    /// Free-text research fields, in directory order.
    pub fields: Vec<String>,
}

impl StudentRecord {
    pub fn is_kellogg(&self) -> bool {
        self.email.ends_with(KELLOGG_DOMAIN)
    }
}

/// Chat channel name (Zulip stream). Course and field channels are told apart by prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Build `field/<slug>`.
    pub fn field(slug: &str) -> Self {
        Self(format!("{FIELD_PREFIX}{slug}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_course(&self) -> bool {
        self.0.starts_with(COURSE_PREFIX)
    }

    pub fn is_field(&self) -> bool {
        self.0.starts_with(FIELD_PREFIX)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A member of the chat organization, as returned by the user listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUser {
    pub id: i64,
    pub name: String,
    /// Address the user registered with (not the organization-visible alias).
    pub email: String,
    pub is_bot: bool,
    pub is_active: bool,
}

/// Handle to a server-side event queue returned by registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQueue {
    pub queue_id: String,
    pub last_event_id: i64,
}

/// Chat-service events, decoded at the adapter boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A new account joined the organization.
    UserRegistered {
        id: i64,
        name: String,
        email: String,
        is_bot: bool,
    },
    Heartbeat,
    /// Anything this bot does not act on.
    Other,
}

/// A single occurrence of a campus calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampusEvent {
    pub occurrence_id: i64,
    pub calendar_id: i64,
    pub title: String,
    /// Description converted to Markdown.
    pub description: Option<String>,
    /// Campus-local start; each occurrence lies within one day.
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub is_all_day: bool,
    pub is_cancelled: bool,
    pub url: String,
}

impl CampusEvent {
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub name: String,
    pub url: Option<String>,
}

/// A working paper returned by the paper search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkingPaper {
    pub url: String,
    pub title: String,
    pub authors: Vec<Author>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
}

/// A message addressed to a channel topic. Produced by the digest bots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    pub channel: ChannelId,
    pub topic: String,
    pub content: String,
}

impl fmt::Display for ChannelMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "To: {}\nTopic: {}\n\n{}",
            self.channel, self.topic, self.content
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_prefixes() {
        assert!(ChannelId::from("course/ECON 410-1").is_course());
        assert!(!ChannelId::from("course/ECON 410-1").is_field());
        assert!(ChannelId::field("macro").is_field());
        assert_eq!(ChannelId::field("macro").as_str(), "field/macro");
        assert!(!ChannelId::from("general").is_course());
    }

    #[test]
    fn kellogg_email() {
        let student = StudentRecord {
            name: "Sam Kim".into(),
            year: 3,
            email: "skim@kellogg.northwestern.edu".into(),
            fields: vec![],
        };
        assert!(student.is_kellogg());
    }

    #[test]
    fn channel_message_display() {
        let msg = ChannelMessage {
            channel: ChannelId::field("io"),
            topic: "events".into(),
            content: "body".into(),
        };
        assert_eq!(msg.to_string(), "To: field/io\nTopic: events\n\nbody");
    }
}
