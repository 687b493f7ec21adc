//! Working-papers digest: per-channel facet searches -> deduplicated weekly message.

use crate::domain::{ChannelId, ChannelMessage, DomainError, WorkingPaper};
use crate::ports::{PaperSearch, TemplatePort};
use crate::shared::department::SearchChannel;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const DIGEST_TEMPLATE: &str = "digest";

pub const PAPERS_TOPIC: &str = "working papers";

pub struct PapersDigest {
    search: Arc<dyn PaperSearch>,
    templates: Arc<dyn TemplatePort>,
    channels: Vec<SearchChannel>,
    /// Pause between consecutive search requests.
    request_delay: Duration,
}

impl PapersDigest {
    pub fn new(
        search: Arc<dyn PaperSearch>,
        templates: Arc<dyn TemplatePort>,
        channels: Vec<SearchChannel>,
        request_delay: Duration,
    ) -> Self {
        Self {
            search,
            templates,
            channels,
            request_delay,
        }
    }

    /// One message per channel with at least one new paper, in table order.
    /// Searches run one after another; any failed search aborts the digest.
    pub async fn build(&self) -> Result<Vec<ChannelMessage>, DomainError> {
        let mut messages = Vec::new();
        let mut first_request = true;

        for channel in &self.channels {
            let mut found = Vec::new();
            for term in &channel.terms {
                if !first_request {
                    tokio::time::sleep(self.request_delay).await;
                }
                first_request = false;
                found.extend(self.search.new_papers(&term.facet, &term.term).await?);
            }

            let papers = dedup_by_url(found);
            if papers.is_empty() {
                debug!(channel = %channel.channel, "no new papers");
                continue;
            }

            let context = serde_json::json!({ "papers": papers });
            let content = self.templates.render(DIGEST_TEMPLATE, &context)?;
            info!(channel = %channel.channel, papers = papers.len(), "paper digest ready");
            messages.push(ChannelMessage {
                channel: ChannelId::new(channel.channel.as_str()),
                topic: PAPERS_TOPIC.to_string(),
                content,
            });
        }
        Ok(messages)
    }
}

/// A paper found by several searches keeps its first position; the last copy's data wins.
fn dedup_by_url(papers: Vec<WorkingPaper>) -> Vec<WorkingPaper> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<WorkingPaper> = Vec::new();
    for paper in papers {
        match index.get(&paper.url) {
            Some(&i) => unique[i] = paper,
            None => {
                index.insert(paper.url.clone(), unique.len());
                unique.push(paper);
            }
        }
    }
    unique
}
