//! Orchestration around the `homework-recon` engine: snapshot sources,
//! the snapshot cache, session windows, notifications and report rendering.

pub mod cache;
pub mod notify;
pub mod report;
pub mod source;
pub mod window;
