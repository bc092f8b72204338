use crate::model::{ReconResults, ReconSummary};

/// Compute summary statistics from classified results.
pub fn compute_summary(results: &ReconResults, emails: usize) -> ReconSummary {
    let mut summary = ReconSummary {
        classes: results.len(),
        emails,
        ..ReconSummary::default()
    };

    for (_, r) in results.iter() {
        summary.total_entries += r.total();
        summary.matched += r.matched.len();
        summary.missing += r.missing.len();
        summary.unmatchable += r.unmatchable;
        summary.ambiguous += r.ambiguous;
    }

    summary
}
