//! Auto-subscription rules: which channels a new user joins.
//!
//! Unmatched users join nothing. First-year students get the first-year course
//! channels; everyone else gets the channels of their research fields.

use crate::domain::fields::FieldMapper;
use crate::domain::{ChannelId, StudentRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How first-year students are treated.
///
/// Defaults to `CoursesOnly`: first-years join the first-year course channels
/// and none of their field channels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FirstYearPolicy {
    /// Course channels replace field channels.
    #[default]
    CoursesOnly,
    /// Course channels, then field channels.
    CoursesAndFields,
}

/// Computes a user's subscription plan.
#[derive(Debug, Clone)]
pub struct SubscriptionPlanner {
    fields: FieldMapper,
    first_year_courses: Vec<ChannelId>,
    policy: FirstYearPolicy,
}

impl SubscriptionPlanner {
    pub fn new(
        fields: FieldMapper,
        first_year_courses: Vec<ChannelId>,
        policy: FirstYearPolicy,
    ) -> Self {
        Self {
            fields,
            first_year_courses,
            policy,
        }
    }

    /// Channels to join, in order, without duplicates.
    pub fn plan(&self, student: Option<&StudentRecord>) -> Vec<ChannelId> {
        let Some(student) = student else {
            return Vec::new();
        };

        let mut plan = Vec::new();
        if student.year == 1 {
            plan.extend(self.first_year_courses.iter().cloned());
            if self.policy == FirstYearPolicy::CoursesAndFields {
                plan.extend(self.fields.map_fields(&student.fields));
            }
        } else {
            plan.extend(self.fields.map_fields(&student.fields));
        }
        dedup_in_order(plan)
    }
}

/// Drop repeated channels, keeping the first occurrence.
fn dedup_in_order(channels: Vec<ChannelId>) -> Vec<ChannelId> {
    let mut seen = HashSet::new();
    channels
        .into_iter()
        .filter(|c| seen.insert(c.clone()))
        .collect()
}
