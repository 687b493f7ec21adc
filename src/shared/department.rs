//! Department lookup tables: field channels, first-year courses, emojis,
//! event calendars and paper search terms.
//!
//! Passed into components at construction. Table order is significant (prefix
//! matching and message order follow declaration order), so every table is a
//! list rather than a map.

use crate::domain::{ChannelId, DomainError};
use serde::{Deserialize, Serialize};

/// Directory research field -> channel slug (`field/<slug>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChannel {
    pub field: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEmoji {
    pub channel: String,
    pub emoji: String,
}

/// Channel fed by a set of campus calendars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarChannel {
    pub channel: String,
    pub calendar_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTerm {
    pub facet: String,
    pub term: String,
}

/// Channel fed by a list of paper-search facet/term queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchChannel {
    pub channel: String,
    #[serde(default)]
    pub terms: Vec<SearchTerm>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepartmentConfig {
    pub field_channels: Vec<FieldChannel>,
    pub first_year_courses: Vec<ChannelId>,
    pub channel_emojis: Vec<ChannelEmoji>,
    pub event_channels: Vec<CalendarChannel>,
    pub paper_channels: Vec<SearchChannel>,
    /// Email domains recognised on directory entries.
    pub student_email_domains: Vec<String>,
    /// Trailing qualifiers stripped from directory names.
    pub name_suffixes: Vec<String>,
}

impl Default for DepartmentConfig {
    fn default() -> Self {
        Self::northwestern()
    }
}

impl DepartmentConfig {
    /// Load tables from a file (any format the `config` crate reads). Missing tables keep the defaults.
    pub fn load(path: &str) -> Result<Self, DomainError> {
        config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| DomainError::Config(format!("department file {path}: {e}")))
    }

    /// Emoji shown next to a channel in messages, if any.
    pub fn emoji_for(&self, channel: &str) -> Option<&str> {
        self.channel_emojis
            .iter()
            .find(|e| e.channel == channel)
            .map(|e| e.emoji.as_str())
    }

    /// Northwestern Economics tables.
    pub fn northwestern() -> Self {
        let field_channels = [
            ("Applied Microeconomics", "appliedmicro"),
            ("Development", "development"),
            ("Econometrics", "metrics"),
            ("Economic History", "history"),
            ("Environmental", "environmental"),
            ("Finance", "finance"),
            ("Health", "health"),
            ("Industrial Organization", "io"),
            ("Labor", "labor"),
            ("Macroeconomics", "macro"),
            ("Microeconomic Theory", "microtheory"),
            ("Political Economy", "political"),
            ("Economics of Organizations", "organizational"),
            ("Public Economics", "public"),
        ]
        .into_iter()
        .map(|(field, slug)| FieldChannel {
            field: field.to_string(),
            slug: slug.to_string(),
        })
        .collect();

        let first_year_courses = ["course/ECON 410-1", "course/ECON 411-1", "course/ECON 480-1"]
            .into_iter()
            .map(ChannelId::from)
            .collect();

        let channel_emojis = [
            ("course/ECON 410-1", "eddie"),
            ("course/ECON 411-1", "larry"),
            ("course/ECON 480-1", "joel"),
        ]
        .into_iter()
        .map(|(channel, emoji)| ChannelEmoji {
            channel: channel.to_string(),
            emoji: emoji.to_string(),
        })
        .collect();

        let calendars: &[(&str, &[i64])] = &[
            ("general", &[3178, 3561, 3559]),
            ("field/appliedmicro", &[4355]),
            ("field/development", &[4247, 3557]),
            ("field/health", &[4559]),
            ("field/history", &[4389, 3556]),
            ("field/io", &[4483, 3555]),
            ("field/labor", &[4559]),
            ("field/macro", &[3558, 3554]),
            ("field/metrics", &[3553]),
            ("field/public", &[4559]),
        ];
        let event_channels = calendars
            .iter()
            .map(|(channel, ids)| CalendarChannel {
                channel: channel.to_string(),
                calendar_ids: ids.to_vec(),
            })
            .collect();

        Self {
            field_channels,
            first_year_courses,
            channel_emojis,
            event_channels,
            paper_channels: northwestern_paper_channels(),
            student_email_domains: vec![
                "@u.northwestern.edu".to_string(),
                "@kellogg.northwestern.edu".to_string(),
            ],
            name_suffixes: vec!["(Financial Economics Student)".to_string()],
        }
    }
}

fn northwestern_paper_channels() -> Vec<SearchChannel> {
    let table: &[(&str, &[(&str, &str)])] = &[
        ("field/appliedmicro", &[]),
        (
            "field/development",
            &[
                ("programs", "Development Economics"),
                ("topic", "Development and Growth"),
                ("topic", "Development"),
            ],
        ),
        (
            "field/finance",
            &[
                ("programs", "Asset Pricing"),
                ("programs", "Corporate Finance"),
                ("groups", "Behavioral Finance"),
                ("groups", "Household Finance"),
                ("topics", "Financial Markets"),
                ("topics", "Financial Institutions"),
                ("topics", "Corporate Finance"),
                ("topics", "Behavioral Finance"),
                ("topics", "Portfolio Selection and Asset Pricing"),
            ],
        ),
        (
            "field/health",
            &[("programs", "Economics of Health"), ("topics", "Health")],
        ),
        (
            "field/history",
            &[
                ("programs", "Development of the American Economy"),
                ("topics", "Macroeconomic History"),
                ("topics", "Financial History"),
                ("topics", "Labor and Health History"),
                ("topics", "Other History"),
            ],
        ),
        (
            "field/io",
            &[
                ("programs", "Industrial Organization"),
                ("topics", "Industrial Organization"),
                ("topics", "Market Structure and Firm Performance"),
                ("topics", "Firm Behavior"),
                ("topics", "Nonprofits"),
                ("topics", "Antitrust"),
                ("topics", "Regulatory Economics"),
                ("topics", "Industry Studies"),
            ],
        ),
        (
            "field/labor",
            &[
                ("programs", "Labor Studies"),
                ("groups", "Personnel Economics"),
                ("topics", "Labor Economics"),
                ("topics", "Demography and Aging"),
                ("topics", "Labor Supply and Demand"),
                ("topics", "Labor Compensation"),
                ("topics", "Labor Market Structures"),
                ("topics", "Labor Relations"),
                ("topics", "Unemployment and Immigration"),
                ("topics", "Labor Discrimination"),
            ],
        ),
        (
            "field/macro",
            &[
                ("programs", "International Finance and Macroeconomics"),
                ("programs", "Monetary Economics"),
                ("programs", "Economic Fluctuations and Growth"),
                ("topics", "Macroeconomics"),
                ("topics", "Macroeconomic Models"),
                ("topics", "Consumption and Investment"),
                ("topics", "Business Cycles"),
                ("topics", "Money and Interest Rates"),
                ("topics", "Monetary Policy"),
                ("topics", "Fiscal Policy"),
            ],
        ),
        (
            "field/metrics",
            &[("topics", "Econometrics"), ("topics", "Estimation Methods")],
        ),
        ("field/microtheory", &[("groups", "Market Design")]),
        (
            "field/organizational",
            &[("groups", "Organizational Economics")],
        ),
        (
            "field/political",
            &[
                ("programs", "Political Economy"),
                ("programs", "Law and Economics"),
                ("topics", "Law and Economics"),
            ],
        ),
        (
            "field/public",
            &[
                ("programs", "Public Economics"),
                ("groups", "Economics of Crime"),
                ("topics", "Public Economics"),
                ("topics", "Taxation"),
                ("topics", "Public Goods"),
                ("topics", "National Fiscal Issues"),
                ("topics", "Subnational Fiscal Issues"),
            ],
        ),
    ];

    table
        .iter()
        .map(|(channel, terms)| SearchChannel {
            channel: channel.to_string(),
            terms: terms
                .iter()
                .map(|(facet, term)| SearchTerm {
                    facet: facet.to_string(),
                    term: term.to_string(),
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_table_keeps_declaration_order() {
        let dept = DepartmentConfig::northwestern();
        assert_eq!(dept.field_channels.len(), 14);
        assert_eq!(dept.field_channels[0].field, "Applied Microeconomics");
        assert_eq!(dept.field_channels[13].slug, "public");
    }

    #[test]
    fn emoji_lookup() {
        let dept = DepartmentConfig::northwestern();
        assert_eq!(dept.emoji_for("course/ECON 411-1"), Some("larry"));
        assert_eq!(dept.emoji_for("field/macro"), None);
    }

    #[test]
    fn labor_calendar_shared_with_health_and_public() {
        let dept = DepartmentConfig::northwestern();
        let sharing: Vec<&str> = dept
            .event_channels
            .iter()
            .filter(|c| c.calendar_ids.contains(&4559))
            .map(|c| c.channel.as_str())
            .collect();
        assert_eq!(sharing, ["field/health", "field/labor", "field/public"]);
    }

    #[test]
    fn load_partial_file_keeps_defaults() {
        let dir = std::env::temp_dir().join(format!("econ-bots-dept-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dept.json");
        std::fs::write(
            &path,
            r#"{"first_year_courses": ["course/ECON 310-1"]}"#,
        )
        .unwrap();

        let dept = DepartmentConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(dept.first_year_courses, vec![ChannelId::from("course/ECON 310-1")]);
        assert_eq!(dept.field_channels.len(), 14);

        std::fs::remove_dir_all(&dir).ok();
    }
}
