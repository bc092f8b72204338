//! Run notifications. The engine never notifies; the CLI picks an adapter.

use homework_config::NotifierKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "ok",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

pub trait Notifier {
    fn notify(&self, message: &str, severity: Severity);
}

/// Writes `<label>: <message>` to stderr.
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn format_line(message: &str, severity: Severity) -> String {
        format!("{}: {message}", severity.label())
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        eprintln!("{}", Self::format_line(message, severity));
    }
}

/// Routes through the `log` facade.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info | Severity::Success => log::info!("{message}"),
            Severity::Warning => log::warn!("{message}"),
            Severity::Error => log::error!("{message}"),
        }
    }
}

pub struct QuietNotifier;

impl Notifier for QuietNotifier {
    fn notify(&self, _message: &str, _severity: Severity) {}
}

pub fn notifier_for(kind: NotifierKind) -> Box<dyn Notifier> {
    match kind {
        NotifierKind::Console => Box::new(ConsoleNotifier),
        NotifierKind::Log => Box::new(LogNotifier),
        NotifierKind::Quiet => Box::new(QuietNotifier),
    }
}
