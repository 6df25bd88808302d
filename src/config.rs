//! Configuration for the audit binary, read from environment variables.

use std::path::PathBuf;

use crate::error::ConfigError;

const DEFAULT_CONFIG_DIR: &str = "./configs";
const DEFAULT_LINE: &str = "ROCA";

/// Audit run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    /// JSON array of messages to validate.
    pub messages_path: PathBuf,
    /// Contingency matrix CSV. Missing means an empty matrix.
    pub matrix_path: Option<PathBuf>,
    /// Directory holding `config_<line>.json` vocabulary files.
    pub config_dir: PathBuf,
    /// Line whose vocabulary is loaded.
    pub line: String,
    /// Word list for the dictionary spell checker.
    pub dictionary_path: Option<PathBuf>,
    /// Where to write the reports; stdout when unset.
    pub output_path: Option<PathBuf>,
    /// Validate on the blocking pool instead of sequentially.
    pub parallel: bool,
}

impl AuditConfig {
    /// Build from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let messages_path = get("AUDIT_MESSAGES_PATH")
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("AUDIT_MESSAGES_PATH".to_string()))?;

        let config_dir = get("AUDIT_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR));

        let parallel = get("AUDIT_PARALLEL")
            .and_then(|v| parse_bool(&v))
            .unwrap_or(true);

        Ok(Self {
            messages_path,
            matrix_path: get("AUDIT_MATRIX_PATH").map(PathBuf::from),
            config_dir,
            line: get("AUDIT_LINE").unwrap_or_else(|| DEFAULT_LINE.to_string()),
            dictionary_path: get("AUDIT_DICTIONARY_PATH").map(PathBuf::from),
            output_path: get("AUDIT_OUTPUT_PATH").map(PathBuf::from),
            parallel,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
