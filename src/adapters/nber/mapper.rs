//! Map NBER search results to WorkingPapers.

use crate::domain::{Author, WorkingPaper};
use scraper::{Html, Selector};
use serde::Deserialize;
use std::sync::LazyLock;
use url::Url;

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("link selector"));

#[derive(Debug, Deserialize)]
pub struct SearchPayload {
    #[serde(default)]
    pub results: Vec<RawResult>,
}

#[derive(Debug, Deserialize)]
pub struct RawResult {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub newthisweek: bool,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    /// HTML snippets, usually `<a href="/people/...">Name</a>`.
    #[serde(default)]
    pub authors: Vec<String>,
}

/// Working papers flagged new this week; other result kinds are skipped.
pub fn new_papers(payload: SearchPayload, origin: &Url) -> Vec<WorkingPaper> {
    payload
        .results
        .into_iter()
        .filter(|r| r.kind == "working_paper" && r.newthisweek)
        .map(|r| WorkingPaper {
            url: fix_url(&r.url, origin),
            title: r.title,
            authors: r.authors.iter().map(|a| parse_author(a, origin)).collect(),
            abstract_text: r.abstract_text,
        })
        .collect()
}

fn parse_author(snippet: &str, origin: &Url) -> Author {
    let fragment = Html::parse_fragment(snippet);
    let name = fragment.root_element().text().collect::<String>();
    let url = fragment
        .select(&LINK_SELECTOR)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| fix_url(href, origin));
    Author {
        name: name.trim().to_string(),
        url,
    }
}

/// Drop the fragment and resolve site-relative paths against `origin`.
pub fn fix_url(raw: &str, origin: &Url) -> String {
    let defragged = raw.split('#').next().unwrap_or(raw);
    if defragged.starts_with('/') {
        origin
            .join(defragged)
            .map(String::from)
            .unwrap_or_else(|_| defragged.to_string())
    } else {
        defragged.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn origin() -> Url {
        Url::parse("https://www.nber.org/").unwrap()
    }

    #[test]
    fn fixes_urls() {
        assert_eq!(
            fix_url("/papers/w31000#fromrss", &origin()),
            "https://www.nber.org/papers/w31000"
        );
        assert_eq!(
            fix_url("https://example.org/paper", &origin()),
            "https://example.org/paper"
        );
    }

    #[test]
    fn keeps_only_new_working_papers() {
        let payload: SearchPayload = serde_json::from_value(json!({
            "results": [
                {
                    "type": "working_paper",
                    "newthisweek": true,
                    "title": "Minimum Wages and Teen Employment",
                    "url": "/papers/w32001",
                    "abstract": "We study...",
                    "authors": [
                        "<a href=\"/people/jane_doe\">Jane Doe</a>",
                        "John Roe"
                    ]
                },
                {
                    "type": "working_paper",
                    "newthisweek": false,
                    "title": "Old Paper",
                    "url": "/papers/w1",
                    "abstract": "",
                    "authors": []
                },
                {"type": "digest", "title": "The Digest", "url": "/digest/1"}
            ]
        }))
        .unwrap();

        let papers = new_papers(payload, &origin());
        assert_eq!(papers.len(), 1);
        let paper = &papers[0];
        assert_eq!(paper.url, "https://www.nber.org/papers/w32001");
        assert_eq!(paper.abstract_text, "We study...");
        assert_eq!(
            paper.authors,
            vec![
                Author {
                    name: "Jane Doe".into(),
                    url: Some("https://www.nber.org/people/jane_doe".into()),
                },
                Author {
                    name: "John Roe".into(),
                    url: None,
                },
            ]
        );
    }
}
