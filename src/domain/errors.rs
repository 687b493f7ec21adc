//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// The chat service answered with a non-success result.
    #[error("chat service error: {0}")]
    ChatService(String),

    /// The server dropped our event queue; the caller should register a new one.
    #[error("event queue expired: {0}")]
    QueueExpired(String),

    #[error("directory error: {0}")]
    Directory(String),

    #[error("event feed error: {0}")]
    EventFeed(String),

    #[error("paper search error: {0}")]
    PaperSearch(String),

    #[error("template error: {0}")]
    Template(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level failure (connect, timeout, undecodable body).
    #[error("HTTP error: {0}")]
    Http(String),
}
