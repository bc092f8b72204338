use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::extract::NameExtractor;
use crate::model::{
    ClassRoster, EmailRecord, MatchResult, MatchedEntry, ReconInput, ReconMeta, ReconResult,
    ReconResults, RosterEntry,
};

/// Run reconciliation per config. Returns classified results + summary.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ReconResult, ReconError> {
    config.validate()?;
    let extractor = config.extractor()?;

    let classes = reconcile(&extractor, &input.roster, &input.emails);
    let summary = compute_summary(&classes, input.emails.len());

    log::info!(
        "reconciled {} entries in {} classes against {} emails: {} matched, {} missing",
        summary.total_entries,
        summary.classes,
        summary.emails,
        summary.matched,
        summary.missing,
    );

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        classes,
    })
}

/// Classify every roster entry as matched or missing.
///
/// An entry matches when its canonical name occurs verbatim in an email's
/// searchable text. Emails are scanned in input order and the first hit is
/// the evidence. Entries with no canonical name are missing without a scan.
/// Pure and deterministic: same snapshot, same result.
pub fn reconcile(
    extractor: &NameExtractor,
    roster: &ClassRoster,
    emails: &[EmailRecord],
) -> ReconResults {
    let corpus = EmailCorpus::new(emails);
    let mut results = ReconResults::default();

    for class in roster.iter() {
        let result = reconcile_class(extractor, &corpus, &class.entries);
        log::debug!(
            "class '{}': {} matched, {} missing ({} unmatchable)",
            class.name,
            result.matched.len(),
            result.missing.len(),
            result.unmatchable,
        );
        results.push(class.name.clone(), result);
    }

    results
}

fn reconcile_class(
    extractor: &NameExtractor,
    corpus: &EmailCorpus<'_>,
    entries: &[RosterEntry],
) -> MatchResult {
    let mut result = MatchResult::default();

    for entry in entries {
        let mut candidates = extractor.candidates(entry).into_iter();
        let Some(name) = candidates.next() else {
            result.unmatchable += 1;
            result.missing.push(entry.clone());
            continue;
        };
        if candidates.next().is_some() {
            result.ambiguous += 1;
        }

        match corpus.first_match(name.as_str()) {
            Some((email_index, email)) => result.matched.push(MatchedEntry {
                entry: entry.clone(),
                subject: email.subject.clone(),
                name,
                email_index,
                sender: email.sender.clone(),
            }),
            None => result.missing.push(entry.clone()),
        }
    }

    result
}

/// Emails with their searchable text built once, shared by every lookup.
pub struct EmailCorpus<'a> {
    emails: Vec<(String, &'a EmailRecord)>,
}

impl<'a> EmailCorpus<'a> {
    pub fn new(emails: &'a [EmailRecord]) -> Self {
        Self {
            emails: emails.iter().map(|e| (e.searchable_text(), e)).collect(),
        }
    }

    /// Earliest email whose searchable text contains `needle`.
    pub fn first_match(&self, needle: &str) -> Option<(usize, &'a EmailRecord)> {
        self.emails
            .iter()
            .position(|(text, _)| text.contains(needle))
            .map(|i| (i, self.emails[i].1))
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
