//! Canonical name extraction from decorated roster entries.
//!
//! A roster entry such as `김빛나(대기)` or `월수금 이현수` mixes the student's
//! given name with status and schedule labels written in the same script.
//! The extractor scans for maximal runs of name-script characters, keeps the
//! runs whose length is a plausible given name, drops known labels, and
//! takes the first survivor. First-wins is a heuristic: an entry carrying a
//! name-length decoration that is not a stop word may yield the wrong token.

use std::collections::BTreeSet;

use regex::Regex;

use crate::error::ReconError;
use crate::model::CanonicalName;

/// Status and schedule labels that look like names (right script, right
/// length) but are metadata added by the attendance system.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    // status
    "대기", // pending
    "휴원", // on leave
    "휴강", // class cancelled
    "신규", // new enrollment
    "보강", // make-up class
    "결석", // absent
    "퇴원", // withdrawn
    "체험", // trial lesson
    "완료", // done
    // weekday combinations
    "월수", "월금", "화목", "수금", "월화", "목금", "토일", "월수금", "화목토", "월화수",
    "수목금", "주말", "평일",
    // weekdays
    "월요일", "화요일", "수요일", "목요일", "금요일", "토요일", "일요일",
];

pub const DEFAULT_MIN_LEN: usize = 2;
pub const DEFAULT_MAX_LEN: usize = 3;

/// Inclusive range of characters that make up names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptRange {
    pub start: char,
    pub end: char,
}

impl ScriptRange {
    /// Precomposed Hangul syllables, U+AC00..=U+D7A3.
    pub const HANGUL_SYLLABLES: ScriptRange = ScriptRange {
        start: '\u{AC00}',
        end: '\u{D7A3}',
    };

    /// Character class matching one maximal run of the range.
    pub fn pattern(&self) -> String {
        format!(
            "[{}-{}]+",
            regex::escape(&self.start.to_string()),
            regex::escape(&self.end.to_string())
        )
    }

    pub fn compile(&self) -> Result<Regex, ReconError> {
        if self.start > self.end {
            return Err(ReconError::ConfigValidation(format!(
                "script range is empty: {:?} > {:?}",
                self.start, self.end
            )));
        }
        Regex::new(&self.pattern()).map_err(|e| ReconError::ConfigValidation(e.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct NameExtractor {
    script: ScriptRange,
    runs: Regex,
    min_len: usize,
    max_len: usize,
    stop_words: BTreeSet<String>,
}

impl Default for NameExtractor {
    fn default() -> Self {
        Self {
            script: ScriptRange::HANGUL_SYLLABLES,
            // literal pattern for HANGUL_SYLLABLES
            runs: Regex::new(r"[\x{AC00}-\x{D7A3}]+").unwrap(),
            min_len: DEFAULT_MIN_LEN,
            max_len: DEFAULT_MAX_LEN,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl NameExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan for runs of `script` instead of Hangul syllables.
    pub fn with_script(mut self, script: ScriptRange) -> Result<Self, ReconError> {
        self.runs = script.compile()?;
        self.script = script;
        Ok(self)
    }

    pub fn script(&self) -> ScriptRange {
        self.script
    }

    pub fn with_length_range(mut self, min_len: usize, max_len: usize) -> Self {
        self.min_len = min_len;
        self.max_len = max_len;
        self
    }

    /// Replace the stop-word set.
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = words.into_iter().map(Into::into).collect();
        self
    }

    /// Add to the active stop-word set.
    pub fn extend_stop_words<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words.extend(words.into_iter().map(Into::into));
    }

    pub fn stop_words(&self) -> impl Iterator<Item = &str> {
        self.stop_words.iter().map(String::as_str)
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// First surviving name-script run of `entry`, or `None` when the entry
    /// holds no usable name. `None` is a normal outcome, not an error.
    pub fn extract(&self, entry: &str) -> Option<CanonicalName> {
        self.surviving_runs(entry).next().map(CanonicalName::new)
    }

    /// Every surviving run in scan order. `extract` returns the first.
    pub fn candidates(&self, entry: &str) -> Vec<CanonicalName> {
        self.surviving_runs(entry).map(CanonicalName::new).collect()
    }

    /// Maximal runs of the name script, left to right.
    fn script_runs<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.runs.find_iter(text).map(|m| m.as_str())
    }

    fn surviving_runs<'a>(&'a self, entry: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.script_runs(entry).filter(move |run| self.accepts(run))
    }

    fn accepts(&self, run: &str) -> bool {
        let len = run.chars().count();
        len >= self.min_len && len <= self.max_len && !self.stop_words.contains(run)
    }
}
