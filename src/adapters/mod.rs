//! Infrastructure adapters. Implement outbound ports.
//!
//! Zulip, department directory, event feed, paper search, templates. Map errors to DomainError.

pub mod directory;
pub mod nber;
pub mod planitpurple;
pub mod templates;
pub mod zulip;
