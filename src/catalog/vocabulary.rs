//! Line-specific technical vocabulary, exempt from spelling checks.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::CatalogError;

/// Line used when the requested line has no vocabulary file.
const DEFAULT_LINE: &str = "roca";

/// Upper-cased tokens that the format auditor must never flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TechnicalVocabulary {
    tokens: HashSet<String>,
}

/// On-disk shape of a per-line configuration file.
#[derive(Debug, Deserialize)]
struct LineConfig {
    #[serde(alias = "palabras_tecnicas", default)]
    technical_words: Vec<String>,
}

impl TechnicalVocabulary {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(|t| t.as_ref().trim().to_uppercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(&token.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Read a single `config_<line>.json` file.
    pub fn from_json_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
        let config: LineConfig = serde_json::from_str(&raw).map_err(|e| CatalogError::Json {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self::new(config.technical_words))
    }

    /// Load the vocabulary for `line` from `dir`, falling back to the default
    /// line's file and finally to an empty vocabulary. Never fails.
    pub fn load_for_line(dir: &Path, line: &str) -> Self {
        let candidates = [config_path(dir, &line_key(line)), config_path(dir, DEFAULT_LINE)];

        for path in &candidates {
            if !path.exists() {
                continue;
            }
            match Self::from_json_path(path) {
                Ok(vocabulary) => {
                    debug!(
                        path = %path.display(),
                        tokens = vocabulary.len(),
                        "Loaded technical vocabulary"
                    );
                    return vocabulary;
                }
                Err(e) => {
                    warn!(error = %e, "Technical vocabulary unreadable, using empty set");
                    return Self::empty();
                }
            }
        }

        debug!(line, "No vocabulary file for line, using empty set");
        Self::empty()
    }
}

/// Normalize a line name into its config file key.
pub fn line_key(line: &str) -> String {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return DEFAULT_LINE.to_string();
    }
    let key = trimmed.to_lowercase().replace(' ', "_");
    if key.contains("san_martin") || key.contains("san_martín") {
        "san_martin".to_string()
    } else {
        key
    }
}

fn config_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("config_{key}.json"))
}
