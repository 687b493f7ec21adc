//! Events digest: campus calendar feed -> per-channel daily or weekly message.
//!
//! Events are routed to channels through the calendar table; one event may land
//! in several channels. Channels without events get no message.

use crate::domain::{CampusEvent, ChannelId, ChannelMessage, DomainError};
use crate::ports::{EventFeed, TemplatePort};
use crate::shared::department::CalendarChannel;
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

pub const DAILY_TEMPLATE: &str = "daily";
pub const WEEKLY_TEMPLATE: &str = "weekly";

/// Topic every digest is posted under.
pub const EVENTS_TOPIC: &str = "events";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Events starting today.
    Daily,
    /// Today through the coming Sunday.
    Weekly,
}

impl Period {
    /// Inclusive date range covered by a digest sent on `today`.
    pub fn range(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Period::Daily => (today, today),
            Period::Weekly => {
                let to_sunday = 6 - u64::from(today.weekday().num_days_from_monday());
                let sunday = today.checked_add_days(Days::new(to_sunday)).unwrap_or(today);
                (today, sunday)
            }
        }
    }

    fn template(self) -> &'static str {
        match self {
            Period::Daily => DAILY_TEMPLATE,
            Period::Weekly => WEEKLY_TEMPLATE,
        }
    }
}

/// Template view of one event, with times preformatted.
#[derive(Debug, Serialize)]
struct EventView<'a> {
    title: &'a str,
    url: &'a str,
    description: Option<&'a str>,
    start: String,
    end: String,
    is_all_day: bool,
    is_cancelled: bool,
}

impl<'a> From<&'a CampusEvent> for EventView<'a> {
    fn from(e: &'a CampusEvent) -> Self {
        Self {
            title: &e.title,
            url: &e.url,
            description: e.description.as_deref(),
            start: e.start.format("%-I:%M %p").to_string(),
            end: e.end.format("%-I:%M %p").to_string(),
            is_all_day: e.is_all_day,
            is_cancelled: e.is_cancelled,
        }
    }
}

#[derive(Debug, Serialize)]
struct DayView<'a> {
    date: String,
    events: Vec<EventView<'a>>,
}

pub struct EventsDigest {
    feed: Arc<dyn EventFeed>,
    templates: Arc<dyn TemplatePort>,
    channels: Vec<CalendarChannel>,
}

impl EventsDigest {
    pub fn new(
        feed: Arc<dyn EventFeed>,
        templates: Arc<dyn TemplatePort>,
        channels: Vec<CalendarChannel>,
    ) -> Self {
        Self {
            feed,
            templates,
            channels,
        }
    }

    /// Build the messages for `period` as seen on `today`, in calendar-table order.
    pub async fn build(
        &self,
        period: Period,
        today: NaiveDate,
    ) -> Result<Vec<ChannelMessage>, DomainError> {
        let (first, last) = period.range(today);
        let mut events: Vec<CampusEvent> = self
            .feed
            .fetch_events()
            .await?
            .into_iter()
            .filter(|e| (first..=last).contains(&e.date()))
            .collect();
        events.sort_by_key(|e| e.start);
        info!(count = events.len(), %first, %last, "events in range");

        let mut messages = Vec::new();
        for channel in &self.channels {
            let routed: Vec<&CampusEvent> = events
                .iter()
                .filter(|e| channel.calendar_ids.contains(&e.calendar_id))
                .collect();
            if routed.is_empty() {
                debug!(channel = %channel.channel, "no events");
                continue;
            }

            let context = match period {
                Period::Daily => {
                    let views: Vec<EventView> = routed.iter().map(|e| EventView::from(*e)).collect();
                    serde_json::json!({ "events": views })
                }
                Period::Weekly => serde_json::json!({ "days": group_by_day(&routed) }),
            };
            let content = self.templates.render(period.template(), &context)?;

            info!(channel = %channel.channel, events = routed.len(), "events digest ready");
            messages.push(ChannelMessage {
                channel: ChannelId::new(channel.channel.as_str()),
                topic: EVENTS_TOPIC.to_string(),
                content,
            });
        }
        Ok(messages)
    }
}

/// Consecutive runs of same-day events. Input must be sorted by start.
fn group_by_day<'a>(events: &[&'a CampusEvent]) -> Vec<DayView<'a>> {
    let mut days: Vec<(NaiveDate, DayView<'a>)> = Vec::new();
    for &event in events {
        let date = event.date();
        match days.last_mut() {
            Some((d, day)) if *d == date => day.events.push(EventView::from(event)),
            _ => days.push((
                date,
                DayView {
                    date: date.format("%A, %B %-d").to_string(),
                    events: vec![EventView::from(event)],
                },
            )),
        }
    }
    days.into_iter().map(|(_, day)| day).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    struct FixedFeed(Vec<CampusEvent>);

    #[async_trait::async_trait]
    impl EventFeed for FixedFeed {
        async fn fetch_events(&self) -> Result<Vec<CampusEvent>, DomainError> {
            Ok(self.0.clone())
        }
    }

    /// Echoes the context so tests can inspect what the template received.
    struct JsonTemplates;

    impl TemplatePort for JsonTemplates {
        fn render(&self, template: &str, context: &serde_json::Value) -> Result<String, DomainError> {
            Ok(format!("{template} {context}"))
        }
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn event(id: i64, calendar_id: i64, start: &str, end: &str) -> CampusEvent {
        CampusEvent {
            occurrence_id: id,
            calendar_id,
            title: format!("Event {id}"),
            description: None,
            start: at(start),
            end: at(end),
            is_all_day: false,
            is_cancelled: false,
            url: format!("https://planitpurple.northwestern.edu/event/{id}"),
        }
    }

    fn channels() -> Vec<CalendarChannel> {
        vec![
            CalendarChannel {
                channel: "general".into(),
                calendar_ids: vec![3178],
            },
            CalendarChannel {
                channel: "field/health".into(),
                calendar_ids: vec![4559],
            },
            CalendarChannel {
                channel: "field/public".into(),
                calendar_ids: vec![4559],
            },
            CalendarChannel {
                channel: "field/macro".into(),
                calendar_ids: vec![3558],
            },
        ]
    }

    fn digest(events: Vec<CampusEvent>) -> EventsDigest {
        EventsDigest::new(Arc::new(FixedFeed(events)), Arc::new(JsonTemplates), channels())
    }

    // 2026-10-21 is a Wednesday.
    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 21).unwrap()
    }

    #[test]
    fn weekly_range_ends_on_sunday() {
        let sunday = NaiveDate::from_ymd_opt(2026, 10, 25).unwrap();
        assert_eq!(Period::Weekly.range(wednesday()), (wednesday(), sunday));
        assert_eq!(Period::Weekly.range(sunday), (sunday, sunday));
        assert_eq!(Period::Daily.range(wednesday()), (wednesday(), wednesday()));
    }

    #[tokio::test]
    async fn daily_keeps_today_and_routes_by_calendar() {
        let messages = digest(vec![
            event(1, 4559, "2026-10-21 12:00", "2026-10-21 13:30"),
            event(2, 3178, "2026-10-22 09:00", "2026-10-22 10:00"),
            event(3, 9999, "2026-10-21 15:00", "2026-10-21 16:00"),
        ])
        .build(Period::Daily, wednesday())
        .await
        .unwrap();

        let targets: Vec<&str> = messages.iter().map(|m| m.channel.as_str()).collect();
        assert_eq!(targets, ["field/health", "field/public"]);
        assert!(messages.iter().all(|m| m.topic == "events"));
        let content = &messages[0].content;
        assert!(content.starts_with("daily "));
        assert!(content.contains("\"start\":\"12:00 PM\""));
        assert!(content.contains("\"end\":\"1:30 PM\""));
    }

    #[tokio::test]
    async fn weekly_groups_days_and_drops_past_and_next_week() {
        let messages = digest(vec![
            event(1, 3558, "2026-10-23 15:00", "2026-10-23 16:00"),
            event(2, 3558, "2026-10-21 12:00", "2026-10-21 13:00"),
            event(3, 3558, "2026-10-21 16:00", "2026-10-21 17:00"),
            event(4, 3558, "2026-10-20 12:00", "2026-10-20 13:00"),
            event(5, 3558, "2026-10-26 12:00", "2026-10-26 13:00"),
        ])
        .build(Period::Weekly, wednesday())
        .await
        .unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].channel.as_str(), "field/macro");
        let context: serde_json::Value =
            serde_json::from_str(messages[0].content.trim_start_matches("weekly ")).unwrap();
        let days = context["days"].as_array().unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0]["date"], "Wednesday, October 21");
        assert_eq!(days[0]["events"][0]["title"], "Event 2");
        assert_eq!(days[0]["events"][1]["title"], "Event 3");
        assert_eq!(days[1]["date"], "Friday, October 23");
    }

    #[tokio::test]
    async fn no_events_no_messages() {
        let messages = digest(vec![])
            .build(Period::Weekly, wednesday())
            .await
            .unwrap();
        assert!(messages.is_empty());
    }
}
