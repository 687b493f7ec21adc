//! Research field -> field channel mapping.
//!
//! Directory text is free-form ("Development and Growth Economics"), so an
//! exact table hit is tried first and then the first table key (in declaration
//! order) that the text starts with.

use crate::domain::ChannelId;
use crate::shared::department::FieldChannel;

/// Maps directory research fields to `field/<slug>` channels.
#[derive(Debug, Clone)]
pub struct FieldMapper {
    table: Vec<FieldChannel>,
}

impl FieldMapper {
    pub fn new(table: Vec<FieldChannel>) -> Self {
        Self { table }
    }

    /// Channel for a single field, or None when no table key applies.
    pub fn map_field(&self, field: &str) -> Option<ChannelId> {
        if let Some(exact) = self.table.iter().find(|f| f.field == field) {
            return Some(ChannelId::field(&exact.slug));
        }
        self.table
            .iter()
            .find(|f| field.starts_with(f.field.as_str()))
            .map(|f| ChannelId::field(&f.slug))
    }

    /// Channels for a list of fields, in input order. Unmapped fields are dropped; duplicates pass through.
    pub fn map_fields<S: AsRef<str>>(&self, fields: &[S]) -> Vec<ChannelId> {
        fields
            .iter()
            .filter_map(|f| self.map_field(f.as_ref()))
            .collect()
    }
}
