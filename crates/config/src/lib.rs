// Configuration loading

pub mod settings;

pub use settings::{NotifierKind, Settings};
