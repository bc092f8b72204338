use std::fmt;

use chrono::{Days, NaiveDate};
use homework_recon::EmailRecord;
use serde::Serialize;

/// Inclusive date range of the homework session. Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SessionWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl SessionWindow {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn between(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, String> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(format!("window start {s} is after window end {e}"));
            }
        }
        Ok(Self { start, end })
    }

    /// `today` and the `days` days before it.
    pub fn last_days(today: NaiveDate, days: u32) -> Self {
        Self {
            start: today.checked_sub_days(Days::new(u64::from(days))),
            end: Some(today),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }

    /// Emails without a received date are always admitted.
    pub fn admits(&self, email: &EmailRecord) -> bool {
        email.received.map_or(true, |d| self.contains(d))
    }

    /// Keep admitted emails, preserving order.
    pub fn filter(&self, emails: Vec<EmailRecord>) -> Vec<EmailRecord> {
        if self.is_unbounded() {
            return emails;
        }
        let before = emails.len();
        let kept: Vec<EmailRecord> = emails.into_iter().filter(|e| self.admits(e)).collect();
        log::debug!("window {self}: kept {} of {before} emails", kept.len());
        kept
    }
}

impl fmt::Display for SessionWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end) {
            (None, None) => write!(f, "any date"),
            (Some(s), None) => write!(f, "{s}.."),
            (None, Some(e)) => write!(f, "..{e}"),
            (Some(s), Some(e)) => write!(f, "{s}..{e}"),
        }
    }
}
