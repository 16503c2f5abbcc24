//! Data model shared by the rewrite pipeline.
//!
//! Every value here is created fresh for one file and dropped once the
//! [`RewriteResult`](super::RewriteResult) has been produced.

use std::ops::Range;

/// A generated namespace import: `import * as local from "specifier";`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    /// The local identifier the namespace is bound to.
    pub local: String,
    /// The module specifier, without quotes.
    pub specifier: String,
    /// The quote character the specifier was written with.
    pub quote: char,
    /// A trailing `with { ... }` or `assert { ... }` clause, verbatim.
    pub attributes: Option<String>,
    /// Byte range of the whole statement, trailing `;` included.
    pub span: Range<usize>,
}

impl ImportBinding {
    /// Renders the side-effect-only form of this import.
    ///
    /// Import attributes are kept verbatim.
    pub fn side_effect_import(&self) -> String {
        match &self.attributes {
            Some(attrs) => format!("import {q}{}{q} {};\n", self.specifier, attrs, q = self.quote),
            None => format!("import {q}{}{q};\n", self.specifier, q = self.quote),
        }
    }
}

/// One `marker(local[, "alias"])` call found in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerCall {
    /// Name of the marker function being called.
    pub marker: String,
    /// The identifier passed as first argument.
    pub argument: String,
    /// Optional second string argument.
    pub alias: Option<String>,
    /// Byte range of the call expression, from the marker name to `)`.
    pub span: Range<usize>,
}

impl MarkerCall {
    /// The member name a stub object needs for this call to stay resolvable.
    pub fn member_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.argument)
    }
}

/// A namespace binding together with every marker call targeting it.
///
/// Produced by the matcher before any filtering happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub binding: ImportBinding,
    pub calls: Vec<MarkerCall>,
}

impl Candidate {
    /// Returns true if at least one marker call targets the binding.
    pub fn is_marked(&self) -> bool {
        !self.calls.is_empty()
    }
}

/// A marked binding whose specifier was accepted for rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    binding: ImportBinding,
    calls: Vec<MarkerCall>,
}

impl Match {
    /// Accepts a candidate. Returns `None` when it carries no marker call.
    pub fn accept(candidate: Candidate) -> Option<Self> {
        if !candidate.is_marked() {
            return None;
        }
        Some(Self {
            binding: candidate.binding,
            calls: candidate.calls,
        })
    }

    pub fn binding(&self) -> &ImportBinding {
        &self.binding
    }

    pub fn calls(&self) -> &[MarkerCall] {
        &self.calls
    }

    /// Distinct stub member names, in call order.
    pub fn member_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for call in &self.calls {
            let name = call.member_name();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

/// A half-open byte range of the original text plus its replacement.
///
/// An empty range is a pure insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range<usize>,
    pub replacement: String,
}

impl Edit {
    /// Replace `range` with `replacement`.
    pub fn replace(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    /// Insert `text` at `offset` without removing anything.
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::replace(offset..offset, text)
    }

    /// Remove `range` entirely.
    pub fn delete(range: Range<usize>) -> Self {
        Self::replace(range, String::new())
    }

    pub fn is_insertion(&self) -> bool {
        self.range.is_empty()
    }
}
