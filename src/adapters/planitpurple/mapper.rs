//! Map PlanItPurple JSON feed entries to CampusEvents.
//!
//! Numeric fields arrive as either JSON numbers or strings. Dates and times are
//! campus-local (Central Time) and kept as naive local timestamps.

use crate::domain::{CampusEvent, DomainError};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer};

/// Public page of a single occurrence.
const EVENT_URL_BASE: &str = "https://planitpurple.northwestern.edu/event";

#[derive(Debug, Deserialize)]
pub struct RawEvent {
    #[serde(deserialize_with = "flexible_int")]
    pub id: i64,
    #[serde(deserialize_with = "flexible_int")]
    pub cal_id: i64,
    pub title: String,
    #[serde(default)]
    pub description_html: Option<String>,
    /// `%Y-%m-%d`; each occurrence is limited to one day.
    pub eventdate: String,
    /// `%H:%M:%S`
    pub start_time: String,
    pub end_time: String,
    #[serde(deserialize_with = "flexible_int")]
    pub is_allday: i64,
    #[serde(deserialize_with = "flexible_int")]
    pub is_cancelled: i64,
}

/// Accept `12`, `"12"` or `true`.
fn flexible_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    use serde::de::Error;
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| D::Error::custom(format!("not an integer: {n}"))),
        serde_json::Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("not an integer: {s:?}"))),
        serde_json::Value::Bool(b) => Ok(i64::from(b)),
        other => Err(D::Error::custom(format!("not an integer: {other}"))),
    }
}

pub fn event_to_domain(raw: RawEvent) -> Result<CampusEvent, DomainError> {
    let date = NaiveDate::parse_from_str(&raw.eventdate, "%Y-%m-%d").map_err(|e| {
        DomainError::EventFeed(format!("event {}: bad date {:?}: {e}", raw.id, raw.eventdate))
    })?;
    let start = parse_time(raw.id, &raw.start_time)?;
    let end = parse_time(raw.id, &raw.end_time)?;

    let description = raw
        .description_html
        .as_deref()
        .filter(|h| !h.trim().is_empty())
        .map(html_to_markdown)
        .transpose()?;

    Ok(CampusEvent {
        occurrence_id: raw.id,
        calendar_id: raw.cal_id,
        title: unescape_html(raw.title.trim()),
        description,
        start: NaiveDateTime::new(date, start),
        end: NaiveDateTime::new(date, end),
        is_all_day: raw.is_allday != 0,
        is_cancelled: raw.is_cancelled != 0,
        url: format!("{EVENT_URL_BASE}/{}", raw.id),
    })
}

fn parse_time(id: i64, raw: &str) -> Result<NaiveTime, DomainError> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .map_err(|e| DomainError::EventFeed(format!("event {id}: bad time {raw:?}: {e}")))
}

/// Decode entities such as `&amp;` in feed titles.
fn unescape_html(text: &str) -> String {
    scraper::Html::parse_fragment(text)
        .root_element()
        .text()
        .collect()
}

fn html_to_markdown(html: &str) -> Result<String, DomainError> {
    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style"])
        .build();
    converter
        .convert(html)
        .map(|md| md.trim().to_string())
        .map_err(|e| DomainError::EventFeed(format!("description conversion failed: {e}")))
}
