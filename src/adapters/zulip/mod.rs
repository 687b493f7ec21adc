//! Zulip adapter. Implements ChatGateway over the REST API.

pub mod client;
pub mod mapper;

pub use client::ZulipGateway;
