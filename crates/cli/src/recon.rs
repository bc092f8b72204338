//! `hwcheck` commands around the reconciliation engine.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use homework_cli::cache::SnapshotCache;
use homework_cli::notify::{notifier_for, Severity};
use homework_cli::report::{render_text, summary_line};
use homework_cli::source::{EmailFile, RosterFile};
use homework_cli::window::SessionWindow;
use homework_config::{NotifierKind, Settings};
use homework_recon::model::ReconInput;
use homework_recon::ReconConfig;

use crate::exit_codes::{EXIT_RECON_INVALID_CONFIG, EXIT_RECON_MISSING};
use crate::CliError;

pub struct RunArgs {
    pub roster: PathBuf,
    pub emails: PathBuf,
    pub config: Option<PathBuf>,
    pub stop_words: Vec<String>,
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub last_days: Option<u32>,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub strict: bool,
    pub notify: Option<NotifierKind>,
}

/// Engine config from `--config`, else settings, else defaults, with the
/// settings' and command line's extra stop words appended.
fn resolve_config(
    settings: &Settings,
    config_path: Option<PathBuf>,
    stop_words: Vec<String>,
) -> Result<ReconConfig, CliError> {
    let mut config = match config_path.or_else(|| settings.recon_config.clone()) {
        Some(path) => {
            let text = std::fs::read_to_string(&path).map_err(|e| {
                CliError::new(
                    EXIT_RECON_INVALID_CONFIG,
                    format!("cannot read config {}: {e}", path.display()),
                )
                .with_hint("check --config or `recon_config` in the settings file")
            })?;
            ReconConfig::from_toml(&text).map_err(CliError::recon)?
        }
        None => ReconConfig::default(),
    };

    let extra = &mut config.extractor.extra_stop_words;
    extra.extend(settings.extra_stop_words.iter().cloned());
    extra.extend(stop_words);
    config.validate().map_err(CliError::recon)?;
    Ok(config)
}

fn resolve_window(settings: &Settings, args: &RunArgs) -> Result<SessionWindow, CliError> {
    let today = chrono::Local::now().date_naive();
    if args.since.is_some() || args.until.is_some() {
        return SessionWindow::between(args.since, args.until).map_err(CliError::args);
    }
    match args.last_days.or(settings.window_days) {
        Some(days) => Ok(SessionWindow::last_days(today, days)),
        None => Ok(SessionWindow::unbounded()),
    }
}

pub fn cmd_run(settings: &Settings, args: RunArgs) -> Result<(), CliError> {
    let config = resolve_config(settings, args.config.clone(), args.stop_words.clone())?;
    let window = resolve_window(settings, &args)?;
    let notifier = notifier_for(args.notify.unwrap_or(settings.notifier));
    let strict = args.strict || settings.strict;

    // Both snapshots must be complete before the engine runs
    let mut cache = SnapshotCache::new();
    let roster = cache
        .roster(&RosterFile::new(&args.roster))
        .map_err(CliError::source)?;
    notifier.notify(
        &format!(
            "Found {} students in {} classes",
            roster.total_entries(),
            roster.len()
        ),
        Severity::Success,
    );

    let emails = cache
        .emails(&EmailFile::new(&args.emails), window)
        .map_err(CliError::source)?;
    let senders: BTreeSet<&str> = emails.iter().map(|e| e.sender.as_str()).collect();
    notifier.notify(
        &format!(
            "Found {} emails from {} senders ({})",
            emails.len(),
            senders.len(),
            window
        ),
        Severity::Success,
    );

    let input = ReconInput {
        roster: roster.as_ref().clone(),
        emails: emails.as_ref().clone(),
    };
    let result = homework_recon::run(&config, &input).map_err(CliError::recon)?;

    if args.json || args.output.is_some() {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = args.output {
            std::fs::write(path, &json_str)
                .map_err(|e| CliError::io(format!("cannot write output: {e}")))?;
            eprintln!("wrote {}", path.display());
        }

        if args.json {
            println!("{json_str}");
        }
    }

    if !args.json {
        print!("{}", render_text(&result));
    }

    let summary = &result.summary;
    let severity = if summary.missing > 0 { Severity::Warning } else { Severity::Success };
    notifier.notify(&summary_line(summary), severity);

    if strict && summary.missing > 0 {
        return Err(CliError::new(
            EXIT_RECON_MISSING,
            format!("{} students missing homework", summary.missing),
        ));
    }

    Ok(())
}

#[derive(serde::Serialize)]
struct Extraction<'a> {
    entry: &'a str,
    name: Option<String>,
    candidates: Vec<String>,
}

pub fn cmd_extract(
    settings: &Settings,
    entries: Vec<String>,
    config_path: Option<PathBuf>,
    stop_words: Vec<String>,
    all: bool,
    json: bool,
) -> Result<(), CliError> {
    let extractor = resolve_config(settings, config_path, stop_words)?
        .extractor()
        .map_err(CliError::recon)?;

    let rows: Vec<Extraction<'_>> = entries
        .iter()
        .map(|entry| {
            let candidates: Vec<String> =
                extractor.candidates(entry).into_iter().map(|n| n.to_string()).collect();
            Extraction {
                entry,
                name: candidates.first().cloned(),
                candidates,
            }
        })
        .collect();

    if json {
        let json_str = serde_json::to_string_pretty(&rows)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    for row in &rows {
        let shown = if all {
            row.candidates.join(", ")
        } else {
            row.name.clone().unwrap_or_default()
        };
        let shown = if shown.is_empty() { "-".to_string() } else { shown };
        println!("{}\t{}", row.entry, shown);
    }
    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let text = std::fs::read_to_string(&config_path).map_err(|e| {
        CliError::new(EXIT_RECON_INVALID_CONFIG, format!("cannot read config: {e}"))
    })?;
    let config = ReconConfig::from_toml(&text).map_err(CliError::recon)?;

    let stop_words = config.extractor().map_err(CliError::recon)?.stop_words().count();
    let ex = &config.extractor;
    eprintln!(
        "valid: config '{}' ({}-{} character names, {} stop words)",
        config.name,
        ex.min_len,
        ex.max_len,
        stop_words,
    );
    Ok(())
}

pub fn cmd_stop_words(
    settings: &Settings,
    config_path: Option<PathBuf>,
    stop_words: Vec<String>,
) -> Result<(), CliError> {
    let extractor = resolve_config(settings, config_path, stop_words)?
        .extractor()
        .map_err(CliError::recon)?;
    for word in extractor.stop_words() {
        println!("{word}");
    }
    Ok(())
}

pub fn cmd_settings(settings: &Settings, init: bool) -> Result<(), CliError> {
    let path = Settings::config_path();

    if init {
        let created = Settings::create_default_file(&path).map_err(CliError::io)?;
        if created {
            eprintln!("created {}", path.display());
        } else {
            eprintln!("{} already exists", path.display());
        }
    }

    println!("# {}", Settings::config_path_display());
    let text = settings.to_toml().map_err(CliError::io)?;
    print!("{text}");
    Ok(())
}
