//! Pattern matcher for generated namespace imports and their marker calls.
//!
//! This is a tagged-pattern scanner, not a parser. It only understands the
//! fixed shapes an upstream compiler emits:
//!
//! ```text
//! import * as ns from "./a.css";
//! __markUsed(ns);
//! __markUsed(ns, "alias");
//! ```
//!
//! Marker calls are found anywhere in the text, including inside string
//! literals and comments. Callers are expected to pick marker names that are
//! unique in the generated output. Hand-written or adversarial input can
//! produce false matches.
//!
//! The insertion anchor is stricter: an `import` only counts when it starts a
//! line or follows `;` or `}`, so prose like "import them" in a comment or
//! string is never mistaken for a statement.

use std::ops::Range;

use regex::{Captures, Regex};

use super::types::{Candidate, ImportBinding, MarkerCall};

const NAMESPACE_IMPORT: &str = r#"\bimport\s*\*\s*as\s+(?P<local>[A-Za-z_$][\w$]*)\s+from\s*(?:"(?P<dq>[^"\r\n]*)"|'(?P<sq>[^'\r\n]*)')(?:[ \t]*(?P<attrs>(?:with|assert)\s*\{[^}]*\}))?(?:[ \t]*;)?"#;

// Statement position only. `import(` and `import.meta` are not statements.
const STATEMENT_IMPORT: &str = r#"(?m)(?:^|[;}])[ \t]*(?P<kw>import)(?:\s*[*{"']|\s+[A-Za-z_$])"#;

/// Compiled scanner for one set of marker names.
#[derive(Debug, Clone)]
pub struct Matcher {
    namespace_import: Regex,
    statement_import: Regex,
    marker_call: Option<Regex>,
}

impl Matcher {
    /// Compile a matcher for the given marker names.
    ///
    /// An empty marker list is legal: the matcher then finds bindings but no
    /// marker calls, so nothing is ever eligible.
    pub fn new<S: AsRef<str>>(markers: &[S]) -> Result<Self, regex::Error> {
        let marker_call = if markers.is_empty() {
            None
        } else {
            let names: Vec<String> = markers
                .iter()
                .map(|m| regex::escape(m.as_ref()))
                .collect();
            let pattern = format!(
                r#"(?:^|[^\w$.])(?P<call>(?P<marker>{})\s*\(\s*(?P<arg>[A-Za-z_$][\w$]*)\s*(?:,\s*(?:"(?P<dq>[^"\r\n]*)"|'(?P<sq>[^'\r\n]*)')\s*)?\))"#,
                names.join("|")
            );
            Some(Regex::new(&pattern)?)
        };

        Ok(Self {
            namespace_import: Regex::new(NAMESPACE_IMPORT)?,
            statement_import: Regex::new(STATEMENT_IMPORT)?,
            marker_call,
        })
    }

    /// Find every namespace import in `text`.
    pub fn bindings(&self, text: &str) -> Vec<ImportBinding> {
        self.namespace_import
            .captures_iter(text)
            .filter_map(|caps| {
                let stmt = caps.get(0)?;
                let local = caps.name("local")?.as_str().to_string();
                let (specifier, quote) = quoted(&caps)?;
                Some(ImportBinding {
                    local,
                    specifier,
                    quote,
                    attributes: caps.name("attrs").map(|m| m.as_str().to_string()),
                    span: stmt.range(),
                })
            })
            .collect()
    }

    /// Find every marker call in `text`.
    pub fn marker_calls(&self, text: &str) -> Vec<MarkerCall> {
        let Some(marker_call) = &self.marker_call else {
            return Vec::new();
        };

        marker_call
            .captures_iter(text)
            .filter_map(|caps| {
                let call = caps.name("call")?;
                Some(MarkerCall {
                    marker: caps.name("marker")?.as_str().to_string(),
                    argument: caps.name("arg")?.as_str().to_string(),
                    alias: quoted(&caps).map(|(alias, _)| alias),
                    span: call.range(),
                })
            })
            .collect()
    }

    /// Pair each namespace import with the marker calls naming its local.
    ///
    /// Bindings are returned in declaration order. Calls whose argument names
    /// no binding are dropped.
    pub fn scan(&self, text: &str) -> Vec<Candidate> {
        let calls = self.marker_calls(text);

        self.bindings(text)
            .into_iter()
            .map(|binding| {
                let calls = calls
                    .iter()
                    .filter(|c| c.argument == binding.local)
                    .cloned()
                    .collect();
                Candidate { binding, calls }
            })
            .collect()
    }

    /// Offset of the first import statement that does not start inside one
    /// of the `removed` ranges.
    pub fn first_import_outside(&self, text: &str, removed: &[Range<usize>]) -> Option<usize> {
        self.statement_import
            .captures_iter(text)
            .filter_map(|caps| caps.name("kw").map(|m| m.start()))
            .find(|start| !removed.iter().any(|r| r.contains(start)))
    }
}

/// Extract a string argument captured as either `dq` or `sq`.
fn quoted(caps: &Captures<'_>) -> Option<(String, char)> {
    if let Some(m) = caps.name("dq") {
        return Some((m.as_str().to_string(), '"'));
    }
    caps.name("sq").map(|m| (m.as_str().to_string(), '\''))
}
