//! Cross-cutting configuration shared by adapters and use cases.

pub mod config;
pub mod department;
