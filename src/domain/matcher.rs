//! Resolve a chat user to a directory record.
//!
//! Rules, first hit wins:
//! 1. exact (lowercased) email;
//! 2. email with the 4-digit year suffix removed from the local part
//!    (`jsmith2024@u.northwestern.edu` -> `jsmith@u.northwestern.edu`);
//! 3. case-insensitive full name.

use crate::domain::StudentRecord;
use regex::Regex;
use std::sync::LazyLock;

/// Letters-only local part followed by a 4-digit year.
static YEAR_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z]+)\d{4}@([a-z.]+)$").expect("year suffix regex")
});

/// Find the directory record for a user. None is a normal outcome (staff, bots, students not listed).
pub fn find_student<'a>(
    students: &'a [StudentRecord],
    name: &str,
    email: &str,
) -> Option<&'a StudentRecord> {
    let email = email.to_lowercase();

    if let Some(student) = find_by_email(students, &email) {
        return Some(student);
    }

    if let Some(stripped) = strip_year_suffix(&email) {
        if let Some(student) = find_by_email(students, &stripped) {
            return Some(student);
        }
    }

    let name = name.to_lowercase();
    students.iter().find(|s| s.name.to_lowercase() == name)
}

fn find_by_email<'a>(students: &'a [StudentRecord], email: &str) -> Option<&'a StudentRecord> {
    students.iter().find(|s| s.email == email)
}

/// `alee2025@u.northwestern.edu` -> `alee@u.northwestern.edu`; None when the address does not have that shape.
pub fn strip_year_suffix(email: &str) -> Option<String> {
    let caps = YEAR_SUFFIX_RE.captures(email)?;
    Some(format!("{}@{}", &caps[1], &caps[2]))
}
