//! Port traits. API boundaries for the hexagon.
//!
//! Outbound only: the bots are driven by `main` and the chat event stream,
//! and call into infrastructure through these traits.

pub mod outbound;

pub use outbound::{ChatGateway, DirectorySource, EventFeed, PaperSearch, TemplatePort};
