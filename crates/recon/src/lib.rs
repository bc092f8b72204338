//! `homework-recon`: homework submission reconciliation engine.
//!
//! Pure engine crate: receives a class roster and a mailbox snapshot, returns
//! each expected submitter classified as matched or missing.
//! No CLI or IO dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod extract;
pub mod load;
pub mod model;

pub use config::ReconConfig;
pub use engine::{reconcile, run};
pub use error::ReconError;
pub use extract::NameExtractor;
pub use model::{
    CanonicalName, ClassRoster, EmailRecord, MatchResult, MatchedEntry, ReconInput, ReconResult,
    ReconResults,
};
