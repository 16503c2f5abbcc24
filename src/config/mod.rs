//! Configuration for bareimport.
//!
//! A [`RewriteConfig`] is loaded from `bareimport.json` (or assembled from
//! CLI flags) and compiled into a [`Rewriter`](crate::rewrite::Rewriter)
//! with [`Rewriter::from_config`](crate::rewrite::Rewriter::from_config).
//! Compilation is where invalid globs and marker names are rejected.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use bareimport::config;
//! use bareimport::rewrite::Rewriter;
//!
//! let config = config::parse_file(Path::new("bareimport.json"))?;
//! let rewriter = Rewriter::from_config(&config)?;
//! ```

pub mod loader;
pub mod types;

// Re-export commonly used types for convenience
pub use loader::{discover, parse_file, parse_str, ConfigError, ConfigResult, CONFIG_FILE_NAME};
pub use types::{
    is_identifier, RewriteConfig, DEFAULT_EXTENSIONS, DEFAULT_MARKER, DEFAULT_PATTERNS,
};
