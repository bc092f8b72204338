use std::fmt;

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Raw roster string as scraped from the attendance system. May carry
/// status markers or schedule labels around the student's name.
pub type RosterEntry = String;

/// The entries of one class, in scrape order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntries {
    pub name: String,
    pub entries: Vec<RosterEntry>,
}

/// Class name -> roster entries. Class order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassRoster {
    classes: Vec<ClassEntries>,
}

impl ClassRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a class. Class names are unique within a roster.
    pub fn push_class(
        &mut self,
        name: impl Into<String>,
        entries: Vec<RosterEntry>,
    ) -> Result<(), ReconError> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(ReconError::DuplicateClass(name));
        }
        self.classes.push(ClassEntries { name, entries });
        Ok(())
    }

    /// Build a roster from `(class, entries)` pairs, keeping their order.
    pub fn from_pairs<I, N>(pairs: I) -> Result<Self, ReconError>
    where
        I: IntoIterator<Item = (N, Vec<RosterEntry>)>,
        N: Into<String>,
    {
        let mut roster = Self::new();
        for (name, entries) in pairs {
            roster.push_class(name, entries)?;
        }
        Ok(roster)
    }

    pub fn get(&self, name: &str) -> Option<&[RosterEntry]> {
        self.classes
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.entries.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassEntries> {
        self.classes.iter()
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn total_entries(&self) -> usize {
        self.classes.iter().map(|c| c.entries.len()).sum()
    }
}

impl Serialize for ClassRoster {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.classes.len()))?;
        for class in &self.classes {
            map.serialize_entry(&class.name, &class.entries)?;
        }
        map.end()
    }
}

/// One inbound email. Read-only evidence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmailRecord {
    pub sender: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<String>,
    /// Date the mailbox received the message, when the source knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<NaiveDate>,
}

impl EmailRecord {
    /// Subject, body and attachment names joined by single spaces.
    pub fn searchable_text(&self) -> String {
        let mut text = String::with_capacity(
            self.subject.len()
                + self.body.len()
                + self.attachments.iter().map(|a| a.len() + 1).sum::<usize>()
                + 1,
        );
        text.push_str(&self.subject);
        text.push(' ');
        text.push_str(&self.body);
        for name in &self.attachments {
            text.push(' ');
            text.push_str(name);
        }
        text
    }
}

/// Fully materialized snapshot handed to [`crate::engine::run`].
#[derive(Debug, Clone, Default)]
pub struct ReconInput {
    pub roster: ClassRoster,
    pub emails: Vec<EmailRecord>,
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Matching key derived from a roster entry: a 2-3 character run of the
/// name script that is not a stop word.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalName(String);

impl CanonicalName {
    pub(crate) fn new(token: &str) -> Self {
        Self(token.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A roster entry and the email that evidences its submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedEntry {
    pub entry: RosterEntry,
    pub subject: String,
    /// Canonical name that was found in the email.
    pub name: CanonicalName,
    /// Position of the evidence email in the input list.
    pub email_index: usize,
    pub sender: String,
}

/// Per-class classification. Every roster entry lands in exactly one of
/// `matched` or `missing`, in roster order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub matched: Vec<MatchedEntry>,
    pub missing: Vec<RosterEntry>,
    /// Missing entries with no extractable name.
    pub unmatchable: usize,
    /// Entries with more than one name candidate (first one was used).
    pub ambiguous: usize,
}

impl MatchResult {
    pub fn total(&self) -> usize {
        self.matched.len() + self.missing.len()
    }
}

/// Class name -> [`MatchResult`], in roster class order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconResults {
    classes: Vec<(String, MatchResult)>,
}

impl ReconResults {
    pub(crate) fn push(&mut self, class: String, result: MatchResult) {
        self.classes.push((class, result));
    }

    pub fn get(&self, class: &str) -> Option<&MatchResult> {
        self.classes
            .iter()
            .find(|(name, _)| name == class)
            .map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MatchResult)> {
        self.classes.iter().map(|(name, r)| (name.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn total_matched(&self) -> usize {
        self.classes.iter().map(|(_, r)| r.matched.len()).sum()
    }

    pub fn total_missing(&self) -> usize {
        self.classes.iter().map(|(_, r)| r.missing.len()).sum()
    }
}

impl Serialize for ReconResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.classes.len()))?;
        for (name, result) in &self.classes {
            map.serialize_entry(name, result)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub classes: usize,
    pub total_entries: usize,
    pub matched: usize,
    pub missing: usize,
    pub unmatchable: usize,
    pub ambiguous: usize,
    pub emails: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub classes: ReconResults,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
