//! Welcome bot: match a new chat user to the directory -> subscribe -> send welcome DM.
//!
//! - Backfill: every active human user with no direct-message history is handled once at startup
//! - Live: `realm_user` registrations from the event queue are handled as they arrive
//! - A failure for one user is logged and never stops the batch or the loop

use crate::domain::{
    ChannelId, ChatEvent, DomainError, StudentRecord, SubscriptionPlanner, find_student,
};
use crate::ports::{ChatGateway, TemplatePort};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Template rendered for every welcomed user.
pub const WELCOME_TEMPLATE: &str = "welcome";

/// Event types the live loop registers for.
const USER_EVENTS: &[&str] = &["realm_user"];

/// Pause before polling the same queue again after a failed poll.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Someone to welcome: a listed user or a freshly registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Newcomer {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Context for the welcome template.
#[derive(Debug, Serialize)]
struct WelcomeView<'a> {
    name: &'a str,
    course_streams: Vec<&'a ChannelId>,
    field_streams: Vec<&'a ChannelId>,
    auto_streams: &'a [ChannelId],
    auto_course_streams: Vec<&'a ChannelId>,
    auto_field_streams: Vec<&'a ChannelId>,
    student: Option<StudentView<'a>>,
}

#[derive(Debug, Serialize)]
struct StudentView<'a> {
    #[serde(flatten)]
    record: &'a StudentRecord,
    is_kellogg: bool,
}

/// Outcome of one backfill pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BackfillStats {
    pub welcomed: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub struct WelcomeService {
    chat: Arc<dyn ChatGateway>,
    templates: Arc<dyn TemplatePort>,
    planner: SubscriptionPlanner,
    /// Directory snapshot, fetched once at startup.
    students: Vec<StudentRecord>,
    poll_retry_delay: Duration,
}

impl WelcomeService {
    pub fn new(
        chat: Arc<dyn ChatGateway>,
        templates: Arc<dyn TemplatePort>,
        planner: SubscriptionPlanner,
        students: Vec<StudentRecord>,
    ) -> Self {
        Self {
            chat,
            templates,
            planner,
            students,
            poll_retry_delay: POLL_RETRY_DELAY,
        }
    }

    /// Match, subscribe and greet one user. Any failure aborts this user only.
    pub async fn welcome(&self, user: &Newcomer) -> Result<(), DomainError> {
        let channels = self.chat.list_channels().await?;

        let student = find_student(&self.students, &user.name, &user.email);
        let plan = self.planner.plan(student);
        match student {
            Some(s) => info!(
                user_id = user.id,
                email = %user.email,
                matched = %s.email,
                year = s.year,
                "matched directory entry"
            ),
            None => info!(user_id = user.id, email = %user.email, "no directory entry"),
        }

        if !plan.is_empty() {
            self.chat.subscribe(user.id, &plan).await?;
            info!(user_id = user.id, channels = plan.len(), "subscribed");
        }

        let view = WelcomeView {
            name: &user.name,
            course_streams: channels.iter().filter(|c| c.is_course()).collect(),
            field_streams: channels.iter().filter(|c| c.is_field()).collect(),
            auto_streams: &plan,
            auto_course_streams: plan.iter().filter(|c| c.is_course()).collect(),
            auto_field_streams: plan.iter().filter(|c| c.is_field()).collect(),
            student: student.map(|record| StudentView {
                record,
                is_kellogg: record.is_kellogg(),
            }),
        };
        let context = serde_json::to_value(&view)
            .map_err(|e| DomainError::Template(format!("welcome context: {e}")))?;
        let content = self.templates.render(WELCOME_TEMPLATE, &context)?;

        self.chat.send_direct_message(user.id, &content).await?;
        info!(user_id = user.id, "sent welcome message");
        Ok(())
    }

    /// Welcome every active human user who has never exchanged a direct message with the bot.
    pub async fn backfill(&self) -> Result<BackfillStats, DomainError> {
        let users = self.chat.list_users().await?;
        let mut stats = BackfillStats::default();

        for user in users.into_iter().filter(|u| !u.is_bot && u.is_active) {
            let history = match self.chat.direct_message_history(user.id).await {
                Ok(history) => history,
                Err(e) => {
                    error!(user_id = user.id, error = %e, "cannot read message history");
                    stats.failed += 1;
                    continue;
                }
            };
            if !history.is_empty() {
                debug!(user_id = user.id, "already greeted");
                stats.skipped += 1;
                continue;
            }

            let newcomer = Newcomer {
                id: user.id,
                name: user.name,
                email: user.email,
            };
            match self.welcome(&newcomer).await {
                Ok(()) => stats.welcomed += 1,
                Err(e) => {
                    error!(user_id = newcomer.id, error = %e, "welcome failed");
                    stats.failed += 1;
                }
            }
        }

        info!(
            welcomed = stats.welcomed,
            skipped = stats.skipped,
            failed = stats.failed,
            "backfill complete"
        );
        Ok(stats)
    }

    /// Handle a batch of polled events. Returns how many users were welcomed.
    pub async fn handle_events(&self, events: Vec<ChatEvent>) -> usize {
        let mut welcomed = 0;
        for event in events {
            let ChatEvent::UserRegistered {
                id,
                name,
                email,
                is_bot,
            } = event
            else {
                continue;
            };
            if is_bot {
                debug!(user_id = id, "ignoring new bot account");
                continue;
            }

            let newcomer = Newcomer { id, name, email };
            match self.welcome(&newcomer).await {
                Ok(()) => welcomed += 1,
                Err(e) => error!(user_id = id, error = %e, "welcome failed"),
            }
        }
        welcomed
    }

    /// Listen for new registrations until registration itself fails.
    ///
    /// Only an expired queue is replaced. Other poll errors wait
    /// `POLL_RETRY_DELAY` and poll the same queue again, so registrations made
    /// during the outage are still delivered.
    pub async fn run_live(&self) -> Result<(), DomainError> {
        loop {
            let mut queue = self.chat.register_events(USER_EVENTS).await?;
            info!(queue_id = %queue.queue_id, "listening for new users");

            loop {
                match self.chat.poll_events(&mut queue).await {
                    Ok(events) => {
                        self.handle_events(events).await;
                    }
                    Err(DomainError::QueueExpired(msg)) => {
                        warn!(
                            queue_id = %queue.queue_id,
                            reason = %msg,
                            "event queue expired, re-registering"
                        );
                        break;
                    }
                    Err(e) => {
                        error!(queue_id = %queue.queue_id, error = %e, "event poll failed");
                        tokio::time::sleep(self.poll_retry_delay).await;
                    }
                }
            }
        }
    }
}
