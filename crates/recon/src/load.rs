//! Turn raw roster / mailbox exports into typed snapshots.
//!
//! Structural problems (missing collection, wrong shape) are errors. Missing
//! fields inside a single email are not: they default to empty.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ReconError;
use crate::model::{ClassRoster, EmailRecord, RosterEntry};

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Class entries in document order. `None` = the class key maps to `null`.
struct RawRoster(Vec<(String, Option<Vec<RosterEntry>>)>);

impl<'de> Deserialize<'de> for RawRoster {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RawRosterVisitor;

        impl<'de> Visitor<'de> for RawRosterVisitor {
            type Value = RawRoster;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of class name to a list of roster entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawRoster, A::Error> {
                let mut classes = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    classes.push(entry);
                }
                Ok(RawRoster(classes))
            }
        }

        deserializer.deserialize_map(RawRosterVisitor)
    }
}

/// Parse `{"class": ["entry", ...], ...}`. Class order is document order.
pub fn parse_roster_json(input: &str) -> Result<ClassRoster, ReconError> {
    let raw: Option<RawRoster> =
        serde_json::from_str(input).map_err(|e| ReconError::invalid("roster", e.to_string()))?;
    let RawRoster(classes) = raw.ok_or_else(|| ReconError::invalid("roster", "roster is null"))?;

    let mut roster = ClassRoster::new();
    for (name, entries) in classes {
        let entries = entries.ok_or_else(|| {
            ReconError::invalid("roster", format!("class '{name}' has no entry list"))
        })?;
        roster.push_class(name, entries)?;
    }

    log::debug!(
        "parsed roster: {} classes, {} entries",
        roster.len(),
        roster.total_entries()
    );
    Ok(roster)
}

/// Parse a roster CSV with `class` and `entry` (or `student`) columns.
/// Classes appear in first-seen order; entries keep row order.
pub fn parse_roster_csv(input: &str) -> Result<ClassRoster, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ReconError::invalid("roster", e.to_string()))?
        .clone();

    let idx = |names: &[&str]| -> Result<usize, ReconError> {
        headers
            .iter()
            .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
            .ok_or_else(|| ReconError::invalid("roster", format!("missing column '{}'", names[0])))
    };

    let class_idx = idx(&["class"])?;
    let entry_idx = idx(&["entry", "student"])?;

    let mut classes: Vec<(String, Vec<RosterEntry>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for record in reader.records() {
        let record = record.map_err(|e| ReconError::invalid("roster", e.to_string()))?;
        let class = record.get(class_idx).unwrap_or("");
        let entry = record.get(entry_idx).unwrap_or("");
        if class.is_empty() && entry.is_empty() {
            continue;
        }

        let pos = *positions.entry(class.to_string()).or_insert_with(|| {
            classes.push((class.to_string(), Vec::new()));
            classes.len() - 1
        });
        // a row with a blank entry only declares the class
        if !entry.is_empty() {
            classes[pos].1.push(entry.to_string());
        }
    }

    ClassRoster::from_pairs(classes)
}

// ---------------------------------------------------------------------------
// Emails
// ---------------------------------------------------------------------------

/// Parse `[{"sender", "subject", "body", "attachments", "received"}, ...]`.
///
/// Only the list itself must be well formed. Inside a row, absent or `null`
/// fields default to empty and wrongly typed fields are dropped with a
/// warning, so one bad row never hides the rest of the mailbox. List order
/// is kept.
pub fn parse_emails_json(input: &str) -> Result<Vec<EmailRecord>, ReconError> {
    let raw: Option<Vec<Value>> =
        serde_json::from_str(input).map_err(|e| ReconError::invalid("email", e.to_string()))?;
    let raw = raw.ok_or_else(|| ReconError::invalid("email", "email list is null"))?;

    let emails: Vec<EmailRecord> = raw
        .into_iter()
        .enumerate()
        .map(|(i, row)| email_from_row(i, row))
        .collect();

    log::debug!("parsed {} emails", emails.len());
    Ok(emails)
}

fn email_from_row(index: usize, row: Value) -> EmailRecord {
    let mut fields = match row {
        Value::Object(fields) => fields,
        other => {
            log::warn!("email #{index}: expected an object, got {}; treating as empty", kind(&other));
            return EmailRecord::default();
        }
    };

    let mut text = |key: &str| match fields.remove(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => {
            log::warn!("email #{index}: ignoring {} in '{key}'", kind(&other));
            String::new()
        }
    };
    let sender = text("sender");
    let subject = text("subject");
    let body = text("body");
    let received = text("received");

    let attachments = match fields.remove("attachments") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(name),
                Value::Null => None,
                other => {
                    log::warn!("email #{index}: ignoring {} attachment name", kind(&other));
                    None
                }
            })
            .collect(),
        Some(other) => {
            log::warn!("email #{index}: ignoring {} in 'attachments'", kind(&other));
            Vec::new()
        }
    };

    let received = if received.is_empty() {
        None
    } else {
        let date = parse_received(&received);
        if date.is_none() {
            log::warn!("email #{index}: ignoring unparseable received date '{received}'");
        }
        date
    };

    EmailRecord {
        sender,
        subject,
        body,
        attachments,
        received,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_received(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
