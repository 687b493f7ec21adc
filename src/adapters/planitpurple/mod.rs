//! PlanItPurple adapter. Implements EventFeed over the university's JSON calendar feed.

pub mod mapper;

use crate::domain::{CampusEvent, DomainError};
use crate::ports::EventFeed;
use crate::shared::config::HTTP_TIMEOUT;
use mapper::RawEvent;
use reqwest::Client;
use tracing::info;

pub struct PlanItPurpleFeed {
    client: Client,
    base_url: String,
    feed_id: u32,
}

impl PlanItPurpleFeed {
    pub fn new(base_url: String, feed_id: u32) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| DomainError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            feed_id,
        })
    }
}

#[async_trait::async_trait]
impl EventFeed for PlanItPurpleFeed {
    async fn fetch_events(&self) -> Result<Vec<CampusEvent>, DomainError> {
        let url = format!("{}/feed/json/{}", self.base_url, self.feed_id);
        let raw: Vec<RawEvent> = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DomainError::EventFeed(format!("cannot fetch {url}: {e}")))?
            .json()
            .await
            .map_err(|e| DomainError::EventFeed(format!("cannot decode {url}: {e}")))?;

        let events = raw
            .into_iter()
            .map(mapper::event_to_domain)
            .collect::<Result<Vec<_>, _>>()?;
        info!(count = events.len(), feed_id = self.feed_id, "fetched campus events");
        Ok(events)
    }
}
