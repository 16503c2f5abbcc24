//! Loading rewrite configuration from JSON.

use std::fs;
use std::path::Path;

use super::types::RewriteConfig;

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "bareimport.json";

/// Errors that can occur while loading or compiling configuration.
///
/// All of these are fatal for a run and are reported before any file is
/// processed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the file from disk.
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse JSON content.
    #[error("Failed to parse config JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A specifier pattern is not a valid glob.
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// A marker name is not a JavaScript identifier.
    #[error("Invalid marker name '{0}': expected a JavaScript identifier")]
    InvalidMarker(String),

    /// A scanner pattern failed to compile.
    #[error("Failed to compile scanner pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Parses a configuration file from a file path.
pub fn parse_file(path: &Path) -> ConfigResult<RewriteConfig> {
    let content = fs::read_to_string(path)?;
    parse_str(&content)
}

/// Parses a configuration from a JSON string.
///
/// # Example
///
/// ```
/// use bareimport::config::parse_str;
///
/// let config = parse_str(r#"{"patterns": ["**/*.css"]}"#).unwrap();
/// assert_eq!(config.patterns, vec!["**/*.css".to_string()]);
/// ```
pub fn parse_str(content: &str) -> ConfigResult<RewriteConfig> {
    let config: RewriteConfig = serde_json::from_str(content)?;
    Ok(config)
}

/// Loads `bareimport.json` from `dir` if present, defaults otherwise.
pub fn discover(dir: &Path) -> ConfigResult<RewriteConfig> {
    let candidate = dir.join(CONFIG_FILE_NAME);
    if candidate.is_file() {
        parse_file(&candidate)
    } else {
        Ok(RewriteConfig::default())
    }
}
