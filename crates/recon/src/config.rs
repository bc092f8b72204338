use serde::Deserialize;

use crate::error::ReconError;
use crate::extract::{NameExtractor, ScriptRange, DEFAULT_MAX_LEN, DEFAULT_MIN_LEN};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            extractor: ExtractorConfig::default(),
        }
    }
}

fn default_name() -> String {
    "homework".into()
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_min_len")]
    pub min_len: usize,
    #[serde(default = "default_max_len")]
    pub max_len: usize,
    #[serde(default)]
    pub script: ScriptConfig,
    /// Replaces the built-in stop-word set when present.
    #[serde(default)]
    pub stop_words: Option<Vec<String>>,
    /// Added on top of the active set.
    #[serde(default)]
    pub extra_stop_words: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_len: DEFAULT_MIN_LEN,
            max_len: DEFAULT_MAX_LEN,
            script: ScriptConfig::default(),
            stop_words: None,
            extra_stop_words: Vec::new(),
        }
    }
}

fn default_min_len() -> usize {
    DEFAULT_MIN_LEN
}

fn default_max_len() -> usize {
    DEFAULT_MAX_LEN
}

/// `script = "hangul"` or `script = { start = "a", end = "z" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ScriptConfig {
    Named(NamedScript),
    Range { start: char, end: char },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedScript {
    Hangul,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self::Named(NamedScript::Hangul)
    }
}

impl ScriptConfig {
    pub fn range(&self) -> ScriptRange {
        match *self {
            Self::Named(NamedScript::Hangul) => ScriptRange::HANGUL_SYLLABLES,
            Self::Range { start, end } => ScriptRange { start, end },
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let ex = &self.extractor;

        if ex.min_len == 0 {
            return Err(ReconError::ConfigValidation(
                "extractor.min_len must be at least 1".into(),
            ));
        }

        if ex.min_len > ex.max_len {
            return Err(ReconError::ConfigValidation(format!(
                "extractor.min_len ({}) exceeds extractor.max_len ({})",
                ex.min_len, ex.max_len
            )));
        }

        if let ScriptConfig::Range { start, end } = ex.script {
            if start > end {
                return Err(ReconError::ConfigValidation(format!(
                    "extractor.script range is empty: {start:?} > {end:?}"
                )));
            }
        }

        let words = ex.stop_words.iter().flatten().chain(&ex.extra_stop_words);
        for word in words {
            if word.trim().is_empty() {
                return Err(ReconError::ConfigValidation(
                    "stop words must not be empty".into(),
                ));
            }
        }

        Ok(())
    }

    /// Build the extractor this config describes.
    pub fn extractor(&self) -> Result<NameExtractor, ReconError> {
        let ex = &self.extractor;
        let mut extractor = NameExtractor::new()
            .with_script(ex.script.range())?
            .with_length_range(ex.min_len, ex.max_len);
        if let Some(ref words) = ex.stop_words {
            extractor = extractor.with_stop_words(words.iter().cloned());
        }
        extractor.extend_stop_words(ex.extra_stop_words.iter().cloned());
        Ok(extractor)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
