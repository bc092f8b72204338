use std::path::PathBuf;

use homework_recon::load::{parse_emails_json, parse_roster_csv, parse_roster_json};
use homework_recon::model::{ClassRoster, EmailRecord, ReconInput, ReconResult};
use homework_recon::{reconcile, run, NameExtractor, ReconConfig};
use proptest::prelude::*;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

fn load_and_run(roster_file: &str) -> ReconResult {
    let config = ReconConfig::from_toml(&read_fixture("weekly.recon.toml")).unwrap();
    let roster_text = read_fixture(roster_file);
    let roster = if roster_file.ends_with(".csv") {
        parse_roster_csv(&roster_text).unwrap()
    } else {
        parse_roster_json(&roster_text).unwrap()
    };
    let emails = parse_emails_json(&read_fixture("emails.json")).unwrap();

    run(&config, &ReconInput { roster, emails }).unwrap()
}

// -------------------------------------------------------------------------
// Fixture runs
// -------------------------------------------------------------------------

#[test]
fn weekly_fixture_classification() {
    let result = load_and_run("roster.json");

    assert_eq!(result.meta.config_name, "Weekly homework check");
    assert_eq!(result.summary.classes, 3);
    assert_eq!(result.summary.total_entries, 7);
    assert_eq!(result.summary.matched, 3);
    assert_eq!(result.summary.missing, 4);
    assert_eq!(result.summary.unmatchable, 1);
    assert_eq!(result.summary.emails, 4);

    let m5 = result.classes.get("M5 월금").unwrap();
    let matched: Vec<_> = m5
        .matched
        .iter()
        .map(|m| (m.entry.as_str(), m.subject.as_str()))
        .collect();
    assert_eq!(
        matched,
        vec![
            ("김빛나(대기)", "FW: 첨부파일테스트 (2)"),
            ("이현수", "과제 제출합니다"),
        ]
    );
    // "월금" appears in an email body but is a schedule label
    assert_eq!(m5.missing, vec!["박서준", "월금"]);

    let a1 = result.classes.get("A1 화목").unwrap();
    assert_eq!(a1.matched[0].entry, "(신규) 정하은");
    assert_eq!(a1.matched[0].sender, "haeun@example.com");
    assert_eq!(a1.missing, vec!["최유진 휴원", "한지민"]);

    let b2 = result.classes.get("B2 토").unwrap();
    assert!(b2.matched.is_empty() && b2.missing.is_empty());
}

#[test]
fn csv_roster_matches_json_roster() {
    let from_json = load_and_run("roster.json");
    let from_csv = load_and_run("roster.csv");

    // CSV rows interleave classes; first appearance fixes class order
    let names: Vec<_> = from_csv.classes.iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["M5 월금", "A1 화목", "B2 토"]);
    assert_eq!(from_csv.classes, from_json.classes);
    assert_eq!(from_csv.summary, from_json.summary);
}

#[test]
fn first_email_is_evidence_for_repeated_sender() {
    let result = load_and_run("roster.json");
    let hyunsu = &result.classes.get("M5 월금").unwrap().matched[1];
    // emails #1 and #3 both mention the student; #1 comes first
    assert_eq!(hyunsu.email_index, 1);
    assert_eq!(hyunsu.sender, "hyunsu@example.com");
}

#[test]
fn json_output_shape() {
    let result = load_and_run("roster.json");
    let json = serde_json::to_value(&result).unwrap();

    let classes = json["classes"].as_object().unwrap();
    assert_eq!(classes.len(), 3);
    let m5 = &json["classes"]["M5 월금"];
    assert_eq!(m5["matched"][0]["entry"], "김빛나(대기)");
    assert_eq!(m5["matched"][0]["subject"], "FW: 첨부파일테스트 (2)");
    assert_eq!(m5["matched"][0]["name"], "김빛나");
    assert_eq!(m5["missing"][1], "월금");
    assert_eq!(json["summary"]["matched"], 3);
}

#[test]
fn reconcile_is_idempotent() {
    let roster = parse_roster_json(&read_fixture("roster.json")).unwrap();
    let emails = parse_emails_json(&read_fixture("emails.json")).unwrap();
    let extractor = NameExtractor::new();

    let first = reconcile(&extractor, &roster, &emails);
    let second = reconcile(&extractor, &roster, &emails);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

// -------------------------------------------------------------------------
// Properties
// -------------------------------------------------------------------------

fn syllable() -> impl Strategy<Value = char> {
    // a small syllable pool so names collide with email text often
    prop::sample::select(vec!['김', '이', '박', '빛', '나', '현', '수', '월', '금', '대', '기'])
}

fn roster_entry() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            4 => syllable().prop_map(String::from),
            1 => Just(" ".to_string()),
            1 => Just("(".to_string()),
            1 => Just("x".to_string()),
        ],
        0..8,
    )
    .prop_map(|parts| parts.concat())
}

fn roster_strategy() -> impl Strategy<Value = ClassRoster> {
    prop::collection::vec(prop::collection::vec(roster_entry(), 0..6), 0..4).prop_map(|classes| {
        ClassRoster::from_pairs(
            classes
                .into_iter()
                .enumerate()
                .map(|(i, entries)| (format!("class-{i}"), entries)),
        )
        .unwrap()
    })
}

fn emails_strategy() -> impl Strategy<Value = Vec<EmailRecord>> {
    prop::collection::vec(
        (roster_entry(), roster_entry(), prop::collection::vec(roster_entry(), 0..2)).prop_map(
            |(subject, body, attachments)| EmailRecord {
                subject,
                body,
                attachments,
                ..EmailRecord::default()
            },
        ),
        0..5,
    )
}

proptest! {
    #[test]
    fn every_entry_lands_in_exactly_one_bucket(
        roster in roster_strategy(),
        emails in emails_strategy(),
    ) {
        let results = reconcile(&NameExtractor::new(), &roster, &emails);
        prop_assert_eq!(results.len(), roster.len());

        for class in roster.iter() {
            let r = results.get(&class.name).unwrap();
            prop_assert_eq!(r.matched.len() + r.missing.len(), class.entries.len());

            // merging the two buckets by roster position rebuilds the roster,
            // so each bucket is an order-preserving subsequence
            let mut matched = r.matched.iter().map(|m| &m.entry).peekable();
            let mut missing = r.missing.iter().peekable();
            for entry in &class.entries {
                if matched.peek() == Some(&entry) {
                    matched.next();
                } else {
                    prop_assert_eq!(missing.next(), Some(entry));
                }
            }
            prop_assert!(matched.next().is_none());
            prop_assert!(missing.next().is_none());
        }
    }

    #[test]
    fn repeated_runs_agree(roster in roster_strategy(), emails in emails_strategy()) {
        let extractor = NameExtractor::new();
        prop_assert_eq!(
            reconcile(&extractor, &roster, &emails),
            reconcile(&extractor, &roster, &emails)
        );
    }

    #[test]
    fn evidence_is_earliest_containing_email(
        roster in roster_strategy(),
        emails in emails_strategy(),
    ) {
        let results = reconcile(&NameExtractor::new(), &roster, &emails);
        for (_, r) in results.iter() {
            for m in &r.matched {
                let texts: Vec<String> = emails.iter().map(|e| e.searchable_text()).collect();
                prop_assert!(texts[m.email_index].contains(m.name.as_str()));
                prop_assert!(texts[..m.email_index].iter().all(|t| !t.contains(m.name.as_str())));
            }
        }
    }

    #[test]
    fn empty_mailbox_means_all_missing(roster in roster_strategy()) {
        let results = reconcile(&NameExtractor::new(), &roster, &[]);
        for class in roster.iter() {
            let r = results.get(&class.name).unwrap();
            prop_assert!(r.matched.is_empty());
            prop_assert_eq!(&r.missing, &class.entries);
        }
    }
}
