// hwcheck - homework submission check
// Reconciles a class roster export against a mailbox export.

mod recon;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use homework_cli::source::SourceError;
use homework_config::{NotifierKind, Settings};
use homework_recon::ReconError;

use exit_codes::{recon_exit_code, source_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "hwcheck")]
#[command(about = "Check which students sent their homework by email")]
#[command(version)]
struct Cli {
    /// Log debug output (overrides settings; RUST_LOG wins over both)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a roster export against a mailbox export
    #[command(after_help = "\
Examples:
  hwcheck run --roster roster.json --emails inbox.json
  hwcheck run --roster roster.csv --emails inbox.json --last-days 7
  hwcheck run --roster roster.json --emails inbox.json --json
  hwcheck run --roster roster.json --emails inbox.json --config weekly.recon.toml --strict")]
    Run {
        /// Roster file: JSON {class: [entries]} or CSV with class,entry columns
        #[arg(long)]
        roster: PathBuf,

        /// Mailbox export: JSON list of {sender, subject, body, attachments, received}
        #[arg(long)]
        emails: PathBuf,

        #[command(flatten)]
        engine: EngineArgs,

        /// Only count emails received on or after this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date, conflicts_with = "last_days")]
        since: Option<NaiveDate>,

        /// Only count emails received on or before this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date, conflicts_with = "last_days")]
        until: Option<NaiveDate>,

        /// Only count emails received today or in the N days before
        #[arg(long, value_name = "N")]
        last_days: Option<u32>,

        /// Output JSON to stdout instead of the text report
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Exit with code 3 when any student is missing
        #[arg(long)]
        strict: bool,

        /// Where progress notifications go (default from settings)
        #[arg(long, value_enum)]
        notify: Option<NotifyArg>,
    },

    /// Show the canonical name extracted from roster entries
    #[command(after_help = "\
Examples:
  hwcheck extract '김빛나(대기)' '월수금 이현수'
  hwcheck extract --all '김빛나 이현수'")]
    Extract {
        /// Roster entries to inspect
        #[arg(required = true)]
        entries: Vec<String>,

        #[command(flatten)]
        engine: EngineArgs,

        /// Show every name candidate, not just the one used for matching
        #[arg(long)]
        all: bool,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Validate an engine config without running
    Validate {
        /// Path to the .recon.toml config file
        config: PathBuf,
    },

    /// List the stop words in effect
    StopWords {
        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Show the settings file location and contents
    Settings {
        /// Write a commented default settings file if none exists
        #[arg(long)]
        init: bool,
    },
}

/// Options shared by every command that builds a name extractor.
#[derive(clap::Args)]
struct EngineArgs {
    /// Engine config (.recon.toml); defaults to `recon_config` in settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra stop word to ignore when extracting names. Repeatable.
    #[arg(long = "stop-word", value_name = "WORD")]
    stop_words: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum NotifyArg {
    Console,
    Log,
    Quiet,
}

impl From<NotifyArg> for NotifierKind {
    fn from(arg: NotifyArg) -> Self {
        match arg {
            NotifyArg::Console => NotifierKind::Console,
            NotifyArg::Log => NotifierKind::Log,
            NotifyArg::Quiet => NotifierKind::Quiet,
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn init_logging(settings: &Settings, verbose: bool) {
    let default_level = if verbose { "debug" } else { settings.log_level.as_str() };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (settings, settings_err) = match Settings::load() {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };
    init_logging(&settings, cli.verbose);
    if let Some(e) = settings_err {
        log::warn!("{e}; using default settings");
    }

    let result = match cli.command {
        Commands::Run {
            roster,
            emails,
            engine,
            since,
            until,
            last_days,
            json,
            output,
            strict,
            notify,
        } => recon::cmd_run(
            &settings,
            recon::RunArgs {
                roster,
                emails,
                config: engine.config,
                stop_words: engine.stop_words,
                since,
                until,
                last_days,
                json,
                output,
                strict,
                notify: notify.map(Into::into),
            },
        ),
        Commands::Extract { entries, engine, all, json } => {
            recon::cmd_extract(&settings, entries, engine.config, engine.stop_words, all, json)
        }
        Commands::Validate { config } => recon::cmd_validate(config),
        Commands::StopWords { engine } => {
            recon::cmd_stop_words(&settings, engine.config, engine.stop_words)
        }
        Commands::Settings { init } => recon::cmd_settings(&settings, init),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Create error from an engine error with proper exit code.
    pub fn recon(err: ReconError) -> Self {
        let hint = recon_hint(&err).map(String::from);
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }

    /// Create error from a source error with proper exit code.
    pub fn source(err: SourceError) -> Self {
        let hint = match &err {
            SourceError::LoginRejected { .. } => Some("session expired; log in again and re-export"),
            SourceError::ElementNotFound { .. } => Some("the source layout may have changed"),
            SourceError::Malformed { error, .. } => recon_hint(error),
            _ => None,
        }
        .map(String::from);
        Self { code: source_exit_code(&err), message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn recon_hint(err: &ReconError) -> Option<&'static str> {
    match err {
        ReconError::DuplicateClass(_) => {
            Some("each class may appear only once in the roster export")
        }
        ReconError::InvalidInput { source, .. } if source == "roster" => {
            Some("the roster export must map each class to a list of entries, or be a class,entry CSV")
        }
        ReconError::InvalidInput { .. } => Some("the mailbox export must be a JSON list of emails"),
        _ => None,
    }
}
