use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad length range, empty stop word, etc.).
    ConfigValidation(String),
    /// Roster or email collection is absent or has the wrong shape.
    InvalidInput { source: String, detail: String },
    /// The same class name appears twice in one roster.
    DuplicateClass(String),
}

impl ReconError {
    pub(crate) fn invalid(source: &str, detail: impl Into<String>) -> Self {
        Self::InvalidInput {
            source: source.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::InvalidInput { source, detail } => {
                write!(f, "invalid {source} input: {detail}")
            }
            Self::DuplicateClass(name) => write!(f, "duplicate class in roster: '{name}'"),
        }
    }
}

impl std::error::Error for ReconError {}
