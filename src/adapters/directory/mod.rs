//! Department directory adapter. Implements DirectorySource by scraping the
//! graduate-student listing page.

pub mod parser;

pub use parser::{DirectoryRules, parse_directory};

use crate::domain::{DomainError, StudentRecord};
use crate::ports::DirectorySource;
use crate::shared::config::HTTP_TIMEOUT;
use reqwest::Client;
use tracing::info;

/// Fetches and parses the directory page.
pub struct HttpDirectory {
    client: Client,
    url: String,
    rules: DirectoryRules,
}

impl HttpDirectory {
    pub fn new(url: String, rules: DirectoryRules) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| DomainError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, url, rules })
    }
}

#[async_trait::async_trait]
impl DirectorySource for HttpDirectory {
    async fn fetch_students(&self) -> Result<Vec<StudentRecord>, DomainError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DomainError::Directory(format!("cannot fetch {}: {}", self.url, e)))?;
        let html = response
            .text()
            .await
            .map_err(|e| DomainError::Directory(format!("cannot read {}: {}", self.url, e)))?;

        let students = parse_directory(&html, &self.rules)?;
        info!(count = students.len(), url = %self.url, "scraped graduate directory");
        Ok(students)
    }
}
