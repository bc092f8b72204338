//! Roster and mailbox sources.
//!
//! The attendance site and the mailbox are external collaborators; the
//! engine only ever sees the snapshots they produce. Each fetch is a
//! `Result` with an explicit failure kind. When either source fails the
//! engine is not run at all.

use std::fmt;
use std::path::{Path, PathBuf};

use homework_recon::load::{parse_emails_json, parse_roster_csv, parse_roster_json};
use homework_recon::{ClassRoster, EmailRecord, ReconError};

use crate::window::SessionWindow;

#[derive(Debug)]
pub enum SourceError {
    /// An expected page element or export section was not found.
    ElementNotFound { source: String, element: String },
    /// The source did not answer in time.
    Timeout { source: String, after_secs: u64 },
    /// Credentials were refused or the session expired.
    LoginRejected { source: String, reason: String },
    /// The source could not be reached or read at all.
    Unavailable { source: String, detail: String },
    /// The source answered but the snapshot is structurally invalid.
    Malformed { source: String, error: ReconError },
}

impl SourceError {
    pub fn source_id(&self) -> &str {
        match self {
            Self::ElementNotFound { source, .. }
            | Self::Timeout { source, .. }
            | Self::LoginRejected { source, .. }
            | Self::Unavailable { source, .. }
            | Self::Malformed { source, .. } => source,
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ElementNotFound { source, element } => {
                write!(f, "{source}: element not found: {element}")
            }
            Self::Timeout { source, after_secs } => {
                write!(f, "{source}: timed out after {after_secs}s")
            }
            Self::LoginRejected { source, reason } => write!(f, "{source}: login rejected: {reason}"),
            Self::Unavailable { source, detail } => write!(f, "{source}: unavailable: {detail}"),
            Self::Malformed { source, error } => write!(f, "{source}: {error}"),
        }
    }
}

impl std::error::Error for SourceError {}

/// Produces `{class -> [roster entries]}` for one session.
pub trait RosterSource {
    /// Stable identifier, used as the cache key.
    fn id(&self) -> String;
    fn fetch_roster(&self) -> Result<ClassRoster, SourceError>;
}

/// Produces the inbound emails for one session window, in mailbox order.
pub trait EmailSource {
    fn id(&self) -> String;
    fn fetch_emails(&self, window: &SessionWindow) -> Result<Vec<EmailRecord>, SourceError>;
}

// ---------------------------------------------------------------------------
// File-backed sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterFormat {
    Json,
    Csv,
}

impl RosterFormat {
    /// `.csv` files are CSV, everything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Json,
        }
    }
}

/// Roster exported to a JSON or CSV file.
#[derive(Debug, Clone)]
pub struct RosterFile {
    path: PathBuf,
    format: RosterFormat,
}

impl RosterFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = RosterFormat::from_path(&path);
        Self { path, format }
    }

    pub fn format(&self) -> RosterFormat {
        self.format
    }
}

impl RosterSource for RosterFile {
    fn id(&self) -> String {
        format!("roster:{}", self.path.display())
    }

    fn fetch_roster(&self) -> Result<ClassRoster, SourceError> {
        let text = read_source(&self.id(), &self.path)?;
        let parsed = match self.format {
            RosterFormat::Json => parse_roster_json(&text),
            RosterFormat::Csv => parse_roster_csv(&text),
        };
        parsed.map_err(|error| SourceError::Malformed {
            source: self.id(),
            error,
        })
    }
}

/// Mailbox exported to a JSON file.
#[derive(Debug, Clone)]
pub struct EmailFile {
    path: PathBuf,
}

impl EmailFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EmailSource for EmailFile {
    fn id(&self) -> String {
        format!("emails:{}", self.path.display())
    }

    fn fetch_emails(&self, window: &SessionWindow) -> Result<Vec<EmailRecord>, SourceError> {
        let text = read_source(&self.id(), &self.path)?;
        let emails = parse_emails_json(&text).map_err(|error| SourceError::Malformed {
            source: self.id(),
            error,
        })?;
        Ok(window.filter(emails))
    }
}

fn read_source(id: &str, path: &Path) -> Result<String, SourceError> {
    log::debug!("reading {id}");
    std::fs::read_to_string(path).map_err(|e| SourceError::Unavailable {
        source: id.to_string(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn format_from_extension() {
        assert_eq!(RosterFormat::from_path(Path::new("r.CSV")), RosterFormat::Csv);
        assert_eq!(RosterFormat::from_path(Path::new("r.json")), RosterFormat::Json);
        assert_eq!(RosterFormat::from_path(Path::new("roster")), RosterFormat::Json);
    }

    #[test]
    fn missing_file_is_unavailable() {
        let err = RosterFile::new("/nonexistent/roster.json").fetch_roster().unwrap_err();
        assert!(matches!(err, SourceError::Unavailable { .. }));
        assert_eq!(err.source_id(), "roster:/nonexistent/roster.json");
    }

    #[test]
    fn bad_shape_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.json");
        std::fs::write(&path, "null").unwrap();

        let err = RosterFile::new(&path).fetch_roster().unwrap_err();
        assert!(matches!(
            err,
            SourceError::Malformed { error: ReconError::InvalidInput { .. }, .. }
        ));
    }

    #[test]
    fn csv_roster_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        std::fs::write(&path, "class,entry\nA,김빛나\nA,이현수\n").unwrap();

        let roster = RosterFile::new(&path).fetch_roster().unwrap();
        assert_eq!(roster.get("A").unwrap(), ["김빛나", "이현수"]);
    }

    #[test]
    fn email_file_applies_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emails.json");
        std::fs::write(
            &path,
            r#"[{"subject": "old", "received": "2026-09-01"}, {"subject": "new", "received": "2026-10-15"}]"#,
        )
        .unwrap();

        let window = SessionWindow::between(NaiveDate::from_ymd_opt(2026, 10, 10), None).unwrap();
        let emails = EmailFile::new(&path).fetch_emails(&window).unwrap();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].subject, "new");
    }

    #[test]
    fn error_display_names_source() {
        let err = SourceError::LoginRejected {
            source: "mailbox".into(),
            reason: "second factor required".into(),
        };
        assert_eq!(err.to_string(), "mailbox: login rejected: second factor required");
    }
}
