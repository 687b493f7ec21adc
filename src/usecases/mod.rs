//! Application use cases. Orchestrate domain logic via ports.

pub mod events_digest;
pub mod papers_digest;
pub mod publish;
pub mod welcome_service;

pub use events_digest::{EventsDigest, Period};
pub use papers_digest::PapersDigest;
pub use publish::publish;
pub use welcome_service::{BackfillStats, Newcomer, WelcomeService};
