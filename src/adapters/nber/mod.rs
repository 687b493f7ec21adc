//! NBER adapter. Implements PaperSearch over the working-paper listing API.

pub mod mapper;

use crate::domain::{DomainError, WorkingPaper};
use crate::ports::PaperSearch;
use crate::shared::config::HTTP_TIMEOUT;
use mapper::SearchPayload;
use reqwest::Client;
use tracing::debug;
use url::Url;

const SEARCH_PATH: &str = "api/v1/working_page_listing/contentType/working_paper/_/_/search";
const PER_PAGE: &str = "50";

pub struct NberSearch {
    client: Client,
    origin: Url,
}

impl NberSearch {
    pub fn new(base_url: &str) -> Result<Self, DomainError> {
        let origin = Url::parse(base_url)
            .map_err(|e| DomainError::Config(format!("invalid NBER URL {base_url}: {e}")))?;
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| DomainError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, origin })
    }
}

#[async_trait::async_trait]
impl PaperSearch for NberSearch {
    async fn new_papers(&self, facet: &str, term: &str) -> Result<Vec<WorkingPaper>, DomainError> {
        let url = self
            .origin
            .join(SEARCH_PATH)
            .map_err(|e| DomainError::PaperSearch(e.to_string()))?;
        let facet_query = format!("{facet}:{term}");

        let payload: SearchPayload = self
            .client
            .get(url)
            .query(&[
                ("facet", facet_query.as_str()),
                ("page", "1"),
                ("perPage", PER_PAGE),
                ("sortBy", "public_date"),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DomainError::PaperSearch(format!("{facet_query}: {e}")))?
            .json()
            .await
            .map_err(|e| DomainError::PaperSearch(format!("{facet_query}: {e}")))?;

        let papers = mapper::new_papers(payload, &self.origin);
        debug!(facet = %facet_query, count = papers.len(), "new working papers");
        Ok(papers)
    }
}
