//! Configuration types.
//!
//! The JSON form mirrors the struct with `camelCase` keys. Every field has a
//! default, so `{}` is a valid configuration.

use serde::{Deserialize, Serialize};

/// Marker name assumed when none is configured.
pub const DEFAULT_MARKER: &str = "__markUsed";

/// Specifier patterns used when none are configured: stylesheets.
pub const DEFAULT_PATTERNS: &[&str] = &[
    "**/*.css",
    "**/*.scss",
    "**/*.sass",
    "**/*.less",
    "**/*.styl",
    "**/*.pcss",
];

/// File extensions the driver processes by default.
pub const DEFAULT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx", "ts", "mts", "cts", "tsx"];

/// Rewrite configuration as loaded from disk or assembled by the CLI.
///
/// # Example
///
/// ```
/// use bareimport::config::RewriteConfig;
///
/// let config: RewriteConfig = serde_json::from_str(r#"{"markers": ["mark"]}"#).unwrap();
/// assert_eq!(config.marker_names(), vec!["mark".to_string()]);
/// assert!(!config.patterns.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RewriteConfig {
    /// Marker function names. Empty means [`DEFAULT_MARKER`].
    pub markers: Vec<String>,

    /// Glob patterns selecting the specifiers to rewrite.
    pub patterns: Vec<String>,

    /// Report every rewritten specifier.
    pub verbose: bool,

    /// Extensions of files the driver should look at.
    pub extensions: Vec<String>,

    /// Also process files under `node_modules`.
    pub include_node_modules: bool,

    /// Parse input and output with tree-sitter and refuse regressions.
    pub check_syntax: bool,

    /// Write a `.map` file next to every rewritten file.
    pub source_maps: bool,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            markers: Vec::new(),
            patterns: DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect(),
            verbose: false,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            include_node_modules: false,
            check_syntax: false,
            source_maps: false,
        }
    }
}

impl RewriteConfig {
    /// Marker names with the implied default applied.
    pub fn marker_names(&self) -> Vec<String> {
        if self.markers.is_empty() {
            vec![DEFAULT_MARKER.to_string()]
        } else {
            self.markers.clone()
        }
    }
}

/// Returns true if `name` is a plain JavaScript identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RewriteConfig::default();
        assert!(config.markers.is_empty());
        assert_eq!(config.marker_names(), vec![DEFAULT_MARKER.to_string()]);
        assert!(config.patterns.contains(&"**/*.css".to_string()));
        assert!(config.extensions.contains(&"mjs".to_string()));
        assert!(!config.extensions.contains(&"css".to_string()));
        assert!(!config.include_node_modules);
    }

    #[test]
    fn test_empty_json_is_default() {
        let config: RewriteConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RewriteConfig::default());
    }

    #[test]
    fn test_camel_case_keys() {
        let json = r#"{
            "markers": ["use"],
            "patterns": ["**/*.module.css"],
            "includeNodeModules": true,
            "checkSyntax": true,
            "sourceMaps": true,
            "verbose": true
        }"#;
        let config: RewriteConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.marker_names(), vec!["use".to_string()]);
        assert_eq!(config.patterns, vec!["**/*.module.css".to_string()]);
        assert!(config.include_node_modules);
        assert!(config.check_syntax);
        assert!(config.source_maps);
        assert!(config.verbose);
        assert_eq!(config.extensions.len(), DEFAULT_EXTENSIONS.len());
    }

    #[test]
    fn test_explicit_empty_patterns_are_kept() {
        let config: RewriteConfig = serde_json::from_str(r#"{"patterns": []}"#).unwrap();
        assert!(config.patterns.is_empty());
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("__markUsed"));
        assert!(is_identifier("$use1"));
        assert!(!is_identifier("1use"));
        assert!(!is_identifier("a.b"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("not a name"));
    }
}
