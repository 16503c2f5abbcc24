//! Source rewriting engine.
//!
//! Converts generated namespace imports that are only kept alive by a marker
//! call into side-effect-only imports:
//!
//! ```text
//! import * as ns from "./a.css";      import "./a.css";
//! __markUsed(ns);                 =>  void 0;
//! ```
//!
//! The pipeline runs strictly left to right for one file:
//! [`Matcher`] → [`SpecifierFilter`] → [`planner`] → [`splice`]. Nothing is
//! shared between files and nothing here touches the filesystem or logs.
//!
//! # Example
//!
//! ```
//! use bareimport::config::RewriteConfig;
//! use bareimport::rewrite::Rewriter;
//!
//! let config = RewriteConfig {
//!     markers: vec!["mark".to_string()],
//!     patterns: vec!["**/*.css".to_string()],
//!     ..RewriteConfig::default()
//! };
//! let rewriter = Rewriter::from_config(&config).unwrap();
//!
//! let result = rewriter
//!     .rewrite("app.js", r#"import * as ns from "a.css"; mark(ns);"#)
//!     .unwrap();
//! assert_eq!(result.code, "import \"a.css\";\n void 0;");
//! assert_eq!(result.rewritten, vec!["a.css".to_string()]);
//! ```

mod error;
pub mod filter;
pub mod mapping;
pub mod matcher;
pub mod planner;
pub mod splice;
pub mod types;

pub use error::RewriteError;
pub use filter::SpecifierFilter;
pub use mapping::{PositionMap, Segment, SegmentKind};
pub use matcher::Matcher;
pub use splice::{splice, EditConflict, EditSet};
pub use types::{Candidate, Edit, ImportBinding, Match, MarkerCall};

use crate::config::{ConfigError, ConfigResult, RewriteConfig};
use crate::syntax::{self, SourceLanguage};

/// Output of one rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteResult {
    /// The rewritten text. Equal to the input when nothing was rewritten.
    pub code: String,
    /// Maps positions in `code` back to the input.
    pub map: PositionMap,
    /// Specifiers turned into side-effect imports, in declaration order.
    pub rewritten: Vec<String>,
}

impl RewriteResult {
    fn unchanged(code: &str) -> Self {
        Self {
            code: code.to_string(),
            map: PositionMap::identity(code.len()),
            rewritten: Vec::new(),
        }
    }

    /// Returns true if at least one import was rewritten.
    pub fn changed(&self) -> bool {
        !self.rewritten.is_empty()
    }
}

/// A compiled rewrite configuration.
///
/// Holds no per-file state, so one `Rewriter` can serve many files, from
/// several threads at once.
#[derive(Debug, Clone)]
pub struct Rewriter {
    matcher: Matcher,
    filter: SpecifierFilter,
    check_syntax: bool,
}

impl Rewriter {
    /// Build a rewriter from already-compiled parts.
    pub fn new(matcher: Matcher, filter: SpecifierFilter) -> Self {
        Self {
            matcher,
            filter,
            check_syntax: false,
        }
    }

    /// Validate and compile a configuration.
    ///
    /// An empty marker list resolves to [`crate::config::DEFAULT_MARKER`].
    pub fn from_config(config: &RewriteConfig) -> ConfigResult<Self> {
        let markers = config.marker_names();
        for marker in &markers {
            if !crate::config::is_identifier(marker) {
                return Err(ConfigError::InvalidMarker(marker.clone()));
            }
        }

        let matcher = Matcher::new(&markers)?;
        let filter = SpecifierFilter::new(&config.patterns)
            .map_err(|(pattern, source)| ConfigError::InvalidGlob { pattern, source })?;

        Ok(Self::new(matcher, filter).with_syntax_check(config.check_syntax))
    }

    /// Enable or disable the tree-sitter safety net.
    pub fn with_syntax_check(mut self, enabled: bool) -> Self {
        self.check_syntax = enabled;
        self
    }

    pub fn filter(&self) -> &SpecifierFilter {
        &self.filter
    }

    /// Rewrite one file.
    ///
    /// `file` identifies the file in errors and picks the grammar for the
    /// optional syntax check. On error, no output is produced for the file.
    pub fn rewrite(&self, file: &str, code: &str) -> Result<RewriteResult, RewriteError> {
        let matches: Vec<Match> = self
            .matcher
            .scan(code)
            .into_iter()
            .filter(|c| self.filter.accepts(&c.binding.specifier))
            .filter_map(Match::accept)
            .collect();

        if matches.is_empty() {
            return Ok(RewriteResult::unchanged(code));
        }

        planner::check_disambiguation(&matches).map_err(|(marker, reason)| {
            RewriteError::AmbiguousMarker {
                file: file.to_string(),
                marker,
                reason,
            }
        })?;

        let anchor = self.anchor(code, &matches);
        let edits = EditSet::new(code, planner::plan(code, &matches, anchor)).map_err(|source| {
            RewriteError::Conflict {
                file: file.to_string(),
                source,
            }
        })?;
        let (output, map) = splice(code, &edits);

        if self.check_syntax {
            let language = SourceLanguage::from_file(file);
            let regressed = syntax::is_regression(code, &output, language).map_err(|source| {
                RewriteError::Syntax {
                    file: file.to_string(),
                    source,
                }
            })?;
            if regressed {
                return Err(RewriteError::SyntaxRegression {
                    file: file.to_string(),
                });
            }
        }

        Ok(RewriteResult {
            code: output,
            map,
            rewritten: matches
                .iter()
                .map(|m| m.binding().specifier.clone())
                .collect(),
        })
    }

    /// Where the side-effect imports go: before the first import statement
    /// that survives the rewrite, else at the top of the file (after a
    /// hashbang line, if any).
    fn anchor(&self, code: &str, matches: &[Match]) -> usize {
        let removed: Vec<_> = matches.iter().map(|m| m.binding().span.clone()).collect();
        if let Some(offset) = self.matcher.first_import_outside(code, &removed) {
            return offset;
        }
        if code.starts_with("#!") {
            return code.find('\n').map_or(code.len(), |i| i + 1);
        }
        0
    }
}
