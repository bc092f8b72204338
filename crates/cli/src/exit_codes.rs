//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `hwcheck` exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 1    | General error (unspecified)                        |
//! | 2    | CLI usage error (bad args, bad date)               |
//! | 3    | Students missing homework (`--strict` only)        |
//! | 4    | Invalid engine config or settings                  |
//! | 5    | Invalid roster / email input                       |
//! | 6    | Roster or mailbox source unavailable               |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// At least one roster entry has no matching email and `--strict` is set.
pub const EXIT_RECON_MISSING: u8 = 3;

/// Engine config failed to parse or validate.
pub const EXIT_RECON_INVALID_CONFIG: u8 = 4;

/// Roster or email collection is absent or has the wrong shape.
pub const EXIT_RECON_INVALID_INPUT: u8 = 5;

/// A source could not produce its snapshot (unreadable file, timeout, login rejected).
pub const EXIT_SOURCE_UNAVAILABLE: u8 = 6;

use homework_cli::source::SourceError;
use homework_recon::ReconError;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_RECON_INVALID_CONFIG,
        ReconError::InvalidInput { .. } | ReconError::DuplicateClass(_) => EXIT_RECON_INVALID_INPUT,
    }
}

/// Map a source error to its exit code.
pub fn source_exit_code(err: &SourceError) -> u8 {
    match err {
        SourceError::Malformed { .. } => EXIT_RECON_INVALID_INPUT,
        SourceError::ElementNotFound { .. }
        | SourceError::Timeout { .. }
        | SourceError::LoginRejected { .. }
        | SourceError::Unavailable { .. } => EXIT_SOURCE_UNAVAILABLE,
    }
}
