//! Parse the department's graduate-student listing into StudentRecords.
//!
//! Each student is an `article.people` under `#main-content`; its
//! `.people-content` holds an anchor, an `<h3>` name, a `<p>Year N</p>` and a
//! `<p>` with the research fields and email address as loose text nodes.

use crate::domain::{DomainError, StudentRecord};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

const FIELDS_LABEL: &str = "Research Field:";
const YEAR_LABEL: &str = "Year";

/// Separators between listed fields: commas and the word "and".
static FIELD_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",|\band\b").expect("field separator regex"));

/// What to recognise on an entry. Comes from DepartmentConfig.
#[derive(Debug, Clone)]
pub struct DirectoryRules {
    pub email_domains: Vec<String>,
    pub name_suffixes: Vec<String>,
}

/// Parse every student on the page. A malformed entry fails the whole parse.
pub fn parse_directory(html: &str, rules: &DirectoryRules) -> Result<Vec<StudentRecord>, DomainError> {
    let doc = Html::parse_document(html);
    let people_sel = Selector::parse("#main-content article.people").expect("people selector");
    let content_sel = Selector::parse(".people-content").expect("content selector");

    doc.select(&people_sel)
        .map(|article| {
            let content = article
                .select(&content_sel)
                .next()
                .ok_or_else(|| DomainError::Directory("entry without .people-content".into()))?;
            parse_entry(content, rules)
        })
        .collect()
}

fn parse_entry(content: ElementRef<'_>, rules: &DirectoryRules) -> Result<StudentRecord, DomainError> {
    let children: Vec<ElementRef<'_>> = content.children().filter_map(ElementRef::wrap).collect();

    let heading = children
        .iter()
        .find(|el| el.value().name() == "h3")
        .ok_or_else(|| DomainError::Directory("entry without a name heading".into()))?;
    let name = strip_name_suffixes(&heading.text().collect::<String>(), &rules.name_suffixes);

    let mut paragraphs = children.iter().filter(|el| el.value().name() == "p");
    let year_p = paragraphs
        .next()
        .ok_or_else(|| DomainError::Directory(format!("{name}: missing year")))?;
    let year = parse_year(&year_p.text().collect::<String>())?;

    let info_p = paragraphs
        .next()
        .ok_or_else(|| DomainError::Directory(format!("{name}: missing details")))?;

    let mut fields = Vec::new();
    let mut email = None;
    for text in info_p.text().map(str::trim).filter(|t| !t.is_empty()) {
        if let Some(listed) = text.strip_prefix(FIELDS_LABEL) {
            fields = split_fields(listed);
        } else if rules.email_domains.iter().any(|d| text.ends_with(d.as_str())) {
            email = Some(text.to_lowercase());
        }
    }
    let email = email.ok_or_else(|| DomainError::Directory(format!("{name}: missing email")))?;

    Ok(StudentRecord {
        name,
        year,
        email,
        fields,
    })
}

fn strip_name_suffixes(raw: &str, suffixes: &[String]) -> String {
    let mut name = raw.trim();
    for suffix in suffixes {
        name = name.strip_suffix(suffix.as_str()).unwrap_or(name).trim();
    }
    name.to_string()
}

/// `"Year 3"` -> 3.
fn parse_year(text: &str) -> Result<u32, DomainError> {
    text.trim()
        .strip_prefix(YEAR_LABEL)
        .and_then(|rest| rest.trim().parse().ok())
        .ok_or_else(|| DomainError::Directory(format!("Invalid year {text}")))
}

fn split_fields(listed: &str) -> Vec<String> {
    FIELD_SEPARATOR_RE
        .split(listed)
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(String::from)
        .collect()
}
