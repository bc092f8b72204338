//! Plain-text rendering of a reconciliation result.

use std::fmt::Write;

use homework_recon::model::{ReconResult, ReconSummary};

const RULE: &str = "==================================================";

/// Per-class breakdown followed by the list of students still missing.
///
/// ```text
/// [M5 월금]
///   OK 김빛나 -> FW: 첨부파일테스트 (2)
///   XX 박서준
/// ```
pub fn render_text(result: &ReconResult) -> String {
    let mut out = String::new();

    for (class, data) in result.classes.iter() {
        let _ = writeln!(out, "[{class}]");
        for m in &data.matched {
            let _ = writeln!(out, "  OK {} -> {}", m.entry, m.subject);
        }
        for entry in &data.missing {
            let _ = writeln!(out, "  XX {entry}");
        }
        out.push('\n');
    }

    let total_missing = result.summary.missing;
    let _ = writeln!(out, "{RULE}");
    if total_missing > 0 {
        let _ = writeln!(out, "MISSING HOMEWORK: {total_missing} students");
        let _ = writeln!(out, "{RULE}");
        for (class, data) in result.classes.iter() {
            if data.missing.is_empty() {
                continue;
            }
            let _ = writeln!(out, "\n[{class}]");
            for entry in &data.missing {
                let _ = writeln!(out, "  - {entry}");
            }
        }
    } else {
        let _ = writeln!(out, "All students submitted homework!");
    }

    out
}

/// One-line summary for stderr.
pub fn summary_line(summary: &ReconSummary) -> String {
    let mut line = format!(
        "{} students in {} classes against {} emails: {} submitted, {} missing",
        summary.total_entries, summary.classes, summary.emails, summary.matched, summary.missing,
    );
    if summary.unmatchable > 0 {
        let _ = write!(line, " ({} without a recognizable name)", summary.unmatchable);
    }
    if summary.ambiguous > 0 {
        let _ = write!(line, ", {} with several name candidates", summary.ambiguous);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use homework_recon::model::{ClassRoster, EmailRecord, ReconInput};
    use homework_recon::{run, ReconConfig};

    fn result(emails: Vec<EmailRecord>) -> ReconResult {
        let roster = ClassRoster::from_pairs([
            ("M5 월금", vec!["김빛나".to_string(), "박서준".to_string()]),
            ("A1", vec!["이현수".to_string()]),
        ])
        .unwrap();
        run(&ReconConfig::default(), &ReconInput { roster, emails }).unwrap()
    }

    fn email(subject: &str) -> EmailRecord {
        EmailRecord {
            subject: subject.into(),
            ..EmailRecord::default()
        }
    }

    #[test]
    fn text_report_lists_missing_section() {
        let text = render_text(&result(vec![email("김빛나 숙제")]));
        let expected = "\
[M5 월금]
  OK 김빛나 -> 김빛나 숙제
  XX 박서준

[A1]
  XX 이현수

==================================================
MISSING HOMEWORK: 2 students
==================================================

[M5 월금]
  - 박서준

[A1]
  - 이현수
";
        assert_eq!(text, expected);
    }

    #[test]
    fn text_report_all_submitted() {
        let text = render_text(&result(vec![email("김빛나 박서준"), email("이현수")]));
        assert!(text.ends_with("All students submitted homework!\n"));
        assert!(!text.contains("XX"));
    }

    #[test]
    fn summary_line_mentions_unmatchable() {
        let summary = ReconSummary {
            classes: 2,
            total_entries: 5,
            matched: 2,
            missing: 3,
            unmatchable: 1,
            ambiguous: 0,
            emails: 4,
        };
        assert_eq!(
            summary_line(&summary),
            "5 students in 2 classes against 4 emails: 2 submitted, 3 missing (1 without a recognizable name)"
        );
    }
}
