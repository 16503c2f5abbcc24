//! Optional syntax safety net built on tree-sitter.
//!
//! The rewrite itself never parses. When enabled, this module parses the
//! input and the rewritten output and reports a regression if only the
//! output has syntax errors. It does not attempt to fix anything.

use std::path::Path;

use thiserror::Error;
use tree_sitter::{Language, Parser};

/// Errors that can occur while running the syntax check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("Tree-sitter language initialization failed")]
    LanguageInit,

    #[error("Tree-sitter gave up parsing the {0} source")]
    ParseFailed(&'static str),
}

/// Result type for syntax check operations.
pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// Language type for file analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    JavaScript,
    TypeScript,
    Tsx,
    Jsx,
}

impl SourceLanguage {
    /// Determine language from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "js" | "mjs" | "cjs" => Some(SourceLanguage::JavaScript),
            "jsx" => Some(SourceLanguage::Jsx),
            "ts" | "mts" | "cts" => Some(SourceLanguage::TypeScript),
            "tsx" => Some(SourceLanguage::Tsx),
            _ => None,
        }
    }

    /// Determine language from a file name, defaulting to JavaScript.
    pub fn from_file(file: &str) -> Self {
        Path::new(file)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .unwrap_or(SourceLanguage::JavaScript)
    }

    /// Get tree-sitter language for this source language.
    pub fn tree_sitter_language(&self) -> Language {
        match self {
            SourceLanguage::JavaScript | SourceLanguage::Jsx => {
                tree_sitter_javascript::LANGUAGE.into()
            }
            SourceLanguage::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            SourceLanguage::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Returns true if `source` parses without error nodes.
pub fn parses_cleanly(source: &str, language: SourceLanguage) -> SyntaxResult<bool> {
    let mut parser = Parser::new();
    parser
        .set_language(&language.tree_sitter_language())
        .map_err(|_| SyntaxError::LanguageInit)?;

    let tree = parser
        .parse(source, None)
        .ok_or(SyntaxError::ParseFailed("input"))?;
    Ok(!tree.root_node().has_error())
}

/// Returns true if `rewritten` introduced syntax errors that `original`
/// did not have.
///
/// Input that was already broken is never blamed on the rewrite.
pub fn is_regression(
    original: &str,
    rewritten: &str,
    language: SourceLanguage,
) -> SyntaxResult<bool> {
    if !parses_cleanly(original, language)? {
        return Ok(false);
    }
    parses_cleanly(rewritten, language)
        .map(|clean| !clean)
        .map_err(|e| match e {
            SyntaxError::ParseFailed(_) => SyntaxError::ParseFailed("rewritten"),
            other => other,
        })
}
