//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod fields;
pub mod matcher;
pub mod subscriptions;

pub use entities::{
    Author, COURSE_PREFIX, CampusEvent, ChannelId, ChannelMessage, ChatEvent, ChatUser,
    EventQueue, FIELD_PREFIX, StudentRecord, WorkingPaper,
};
pub use errors::DomainError;
pub use fields::FieldMapper;
pub use matcher::find_student;
pub use subscriptions::{FirstYearPolicy, SubscriptionPlanner};
