//! Application configuration. Zulip credentials, template and table overrides, source URLs.

use crate::domain::{DomainError, FirstYearPolicy};
use serde::Deserialize;
use std::time::Duration;

/// Timeout for every outbound request except the event long-poll.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// The server holds an event poll open for up to a minute before sending a heartbeat.
pub const EVENT_POLL_TIMEOUT: Duration = Duration::from_secs(90);

/// Pause between consecutive paper-search requests.
pub const PAPER_REQUEST_DELAY: Duration = Duration::from_millis(100);

pub const DEFAULT_DIRECTORY_URL: &str =
    "https://economics.northwestern.edu/people/graduate/index.html";
pub const DEFAULT_PLANITPURPLE_URL: &str = "https://planitpurple.northwestern.edu";
pub const DEFAULT_PLANITPURPLE_FEED_ID: u32 = 2103;
pub const DEFAULT_NBER_URL: &str = "https://www.nber.org";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Path to the zuliprc file. Read from ECON_BOTS_ZULIPRC, falling back to ZULIPRC.
    #[serde(default)]
    pub zuliprc: Option<String>,

    /// Directory with `*.md.hbs` templates overriding the built-in ones.
    #[serde(default)]
    pub template_dir: Option<String>,

    /// `courses-only` (default) or `courses-and-fields`.
    #[serde(default)]
    pub first_year_policy: Option<FirstYearPolicy>,

    /// Replacement department tables (field channels, calendars, search terms).
    #[serde(default)]
    pub department_file: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Source endpoints
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub directory_url: Option<String>,

    #[serde(default)]
    pub planitpurple_url: Option<String>,

    #[serde(default)]
    pub planitpurple_feed_id: Option<u32>,

    #[serde(default)]
    pub nber_url: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("ECON_BOTS"));
        if let Ok(path) = std::env::var("ECON_BOTS_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// zuliprc path from config or the conventional ZULIPRC variable.
    pub fn zuliprc(&self) -> Option<String> {
        self.zuliprc
            .clone()
            .or_else(|| std::env::var("ZULIPRC").ok())
    }

    pub fn first_year_policy_or_default(&self) -> FirstYearPolicy {
        self.first_year_policy.unwrap_or_default()
    }

    pub fn directory_url_or_default(&self) -> String {
        self.directory_url
            .clone()
            .unwrap_or_else(|| DEFAULT_DIRECTORY_URL.to_string())
    }

    pub fn planitpurple_url_or_default(&self) -> String {
        self.planitpurple_url
            .clone()
            .unwrap_or_else(|| DEFAULT_PLANITPURPLE_URL.to_string())
    }

    pub fn planitpurple_feed_id_or_default(&self) -> u32 {
        self.planitpurple_feed_id
            .unwrap_or(DEFAULT_PLANITPURPLE_FEED_ID)
    }

    pub fn nber_url_or_default(&self) -> String {
        self.nber_url
            .clone()
            .unwrap_or_else(|| DEFAULT_NBER_URL.to_string())
    }
}

/// Bot credentials from a zuliprc file (`[api]` section with `email`, `key`, `site`).
#[derive(Debug, Clone, Deserialize)]
pub struct ZulipCredentials {
    pub email: String,
    pub key: String,
    pub site: String,
}

#[derive(Deserialize)]
struct ZulipRc {
    api: ZulipCredentials,
}

impl ZulipCredentials {
    pub fn load(path: &str) -> Result<Self, DomainError> {
        let rc: ZulipRc = config::Config::builder()
            .add_source(config::File::new(path, config::FileFormat::Ini))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| DomainError::Config(format!("zuliprc {path}: {e}")))?;
        let mut creds = rc.api;
        creds.site = normalize_site(&creds.site);
        Ok(creds)
    }
}

/// Add a scheme when missing and drop trailing slashes.
fn normalize_site(site: &str) -> String {
    let site = site.trim().trim_end_matches('/');
    if site.starts_with("http://") || site.starts_with("https://") {
        site.to_string()
    } else {
        format!("https://{site}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_normalization() {
        assert_eq!(normalize_site("econ.zulipchat.com"), "https://econ.zulipchat.com");
        assert_eq!(
            normalize_site("https://econ.zulipchat.com/"),
            "https://econ.zulipchat.com"
        );
        assert_eq!(normalize_site("http://localhost:9991"), "http://localhost:9991");
    }

    #[test]
    fn load_zuliprc() {
        let dir = std::env::temp_dir().join(format!("econ-bots-rc-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("zuliprc");
        std::fs::write(
            &path,
            "[api]\nemail=welcome-bot@econ.zulipchat.com\nkey=abc123\nsite=econ.zulipchat.com\n",
        )
        .unwrap();

        let creds = ZulipCredentials::load(path.to_str().unwrap()).unwrap();
        assert_eq!(creds.email, "welcome-bot@econ.zulipchat.com");
        assert_eq!(creds.key, "abc123");
        assert_eq!(creds.site, "https://econ.zulipchat.com");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_zuliprc_is_config_error() {
        let err = ZulipCredentials::load("/nonexistent/zuliprc").unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
    }

    #[test]
    fn defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.first_year_policy_or_default(), FirstYearPolicy::CoursesOnly);
        assert_eq!(cfg.planitpurple_feed_id_or_default(), 2103);
        assert_eq!(cfg.nber_url_or_default(), "https://www.nber.org");
    }
}
