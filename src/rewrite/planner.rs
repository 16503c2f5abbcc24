//! Edit planner: turns accepted matches into text edits.
//!
//! For each match the planner
//!
//! - removes the namespace import, or replaces it with a stub object when
//!   the local identifier is still referenced elsewhere,
//! - replaces every marker call with [`NEUTRALIZED_CALL`],
//! - contributes one `import "<specifier>";` to a single insertion placed at
//!   the anchor, in declaration order.

use std::collections::HashMap;

use super::types::{Edit, Match};

/// Expression substituted for each marker call.
pub const NEUTRALIZED_CALL: &str = "void 0";

/// Plan the edits for one file.
///
/// `matches` must be in declaration order. The returned edits are not yet
/// validated; see [`EditSet::new`](super::splice::EditSet::new).
pub fn plan(text: &str, matches: &[Match], anchor: usize) -> Vec<Edit> {
    let mut edits = Vec::new();
    if matches.is_empty() {
        return edits;
    }

    let imports: String = matches
        .iter()
        .map(|m| m.binding().side_effect_import())
        .collect();
    edits.push(Edit::insert(anchor, imports));

    for m in matches {
        let replacement = if has_residual_reference(text, m) {
            stub_declaration(m)
        } else {
            String::new()
        };
        edits.push(Edit::replace(m.binding().span.clone(), replacement));

        for call in m.calls() {
            edits.push(Edit::replace(call.span.clone(), NEUTRALIZED_CALL));
        }
    }

    edits
}

/// Check that marker calls can be told apart.
///
/// Returns the offending marker name and a reason when two bindings share an
/// alias under one marker, or when one marker is used both with and without
/// an alias across several bindings.
pub fn check_disambiguation(matches: &[Match]) -> Result<(), (String, String)> {
    // marker -> (binding local, alias)
    let mut by_marker: HashMap<&str, Vec<(&str, Option<&str>)>> = HashMap::new();
    for m in matches {
        for call in m.calls() {
            by_marker
                .entry(call.marker.as_str())
                .or_default()
                .push((m.binding().local.as_str(), call.alias.as_deref()));
        }
    }

    for (marker, uses) in by_marker {
        let mut owner_of_alias: HashMap<&str, &str> = HashMap::new();
        for &(local, alias) in &uses {
            let Some(alias) = alias else { continue };
            if let Some(owner) = owner_of_alias.insert(alias, local) {
                if owner != local {
                    return Err((
                        marker.to_string(),
                        format!("alias \"{alias}\" is used for both `{owner}` and `{local}`"),
                    ));
                }
            }
        }

        let mut locals: Vec<&str> = uses.iter().map(|(l, _)| *l).collect();
        locals.sort_unstable();
        locals.dedup();
        let aliased = uses.iter().any(|(_, a)| a.is_some());
        let bare = uses.iter().any(|(_, a)| a.is_none());
        if locals.len() > 1 && aliased && bare {
            return Err((
                marker.to_string(),
                "mixes aliased and unaliased calls across several bindings".to_string(),
            ));
        }
    }

    Ok(())
}

/// Returns true if the binding's local identifier occurs outside its own
/// import statement and marker calls.
///
/// Like the matcher this is lexical: occurrences in strings and comments
/// count, and member accesses such as `obj.ns` do not.
fn has_residual_reference(text: &str, m: &Match) -> bool {
    let local = m.binding().local.as_str();
    let excluded: Vec<_> = std::iter::once(m.binding().span.clone())
        .chain(m.calls().iter().map(|c| c.span.clone()))
        .collect();

    text.match_indices(local).any(|(start, _)| {
        let end = start + local.len();
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        let bounded = !before.is_some_and(|c| is_ident_char(c) || c == '.')
            && !after.is_some_and(is_ident_char);
        bounded && !excluded.iter().any(|r| r.contains(&start))
    })
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// `const ns = { "x": () => {} };`
fn stub_declaration(m: &Match) -> String {
    let members: Vec<String> = m
        .member_names()
        .into_iter()
        .map(|name| format!("{}: () => {{}}", quote_member(name)))
        .collect();
    format!("const {} = {{ {} }};", m.binding().local, members.join(", "))
}

fn quote_member(name: &str) -> String {
    serde_json::to_string(name).unwrap_or_else(|_| format!("\"{name}\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::matcher::Matcher;
    use pretty_assertions::assert_eq;

    fn matches(text: &str) -> Vec<Match> {
        Matcher::new(&["mark"])
            .unwrap()
            .scan(text)
            .into_iter()
            .filter_map(Match::accept)
            .collect()
    }

    // ===== Plan Tests =====

    #[test]
    fn test_plan_removes_import_and_neutralizes_call() {
        let text = r#"import * as ns from "a.css"; mark(ns);"#;
        let edits = plan(text, &matches(text), 0);

        assert_eq!(
            edits,
            vec![
                Edit::insert(0, "import \"a.css\";\n"),
                Edit::delete(0..28),
                Edit::replace(29..37, NEUTRALIZED_CALL),
            ]
        );
    }

    #[test]
    fn test_plan_nothing_for_no_matches() {
        assert!(plan("x", &[], 0).is_empty());
    }

    #[test]
    fn test_plan_inserts_in_declaration_order() {
        let text = "import * as b from './b.css';\nimport * as a from './a.css';\nmark(a);\nmark(b);\n";
        let edits = plan(text, &matches(text), 0);

        assert_eq!(edits[0].replacement, "import './b.css';\nimport './a.css';\n");
        assert_eq!(edits.iter().filter(|e| e.is_insertion()).count(), 1);
    }

    #[test]
    fn test_plan_stubs_residual_reference() {
        let text = r#"import * as ns from "a.css"; mark(ns, "x"); console.log(ns.x);"#;
        let edits = plan(text, &matches(text), 0);

        assert_eq!(edits[1].replacement, r#"const ns = { "x": () => {} };"#);
    }

    #[test]
    fn test_plan_stub_without_alias_uses_local() {
        let text = "import * as ns from 'a.css'; mark(ns); ns;";
        let edits = plan(text, &matches(text), 0);

        assert_eq!(edits[1].replacement, r#"const ns = { "ns": () => {} };"#);
    }

    #[test]
    fn test_member_access_and_longer_names_are_not_references() {
        let text = "import * as ns from 'a.css'; mark(ns); obj.ns; nsx; $ns;";
        let edits = plan(text, &matches(text), 0);

        assert_eq!(edits[1].replacement, "");
    }

    #[test]
    fn test_stub_member_is_escaped() {
        let text = r#"import * as ns from 'a.css'; mark(ns, 'say "hi"'); ns;"#;
        let edits = plan(text, &matches(text), 0);

        assert_eq!(edits[1].replacement, r#"const ns = { "say \"hi\"": () => {} };"#);
    }

    // ===== Disambiguation Tests =====

    #[test]
    fn test_distinct_aliases_are_accepted() {
        let text = r#"
import * as a from "a.css";
import * as b from "b.css";
mark(a, "x");
mark(b, "y");
"#;
        assert!(check_disambiguation(&matches(text)).is_ok());
    }

    #[test]
    fn test_unaliased_calls_on_distinct_bindings_are_accepted() {
        let text = "import * as a from 'a.css'; import * as b from 'b.css'; mark(a); mark(b);";
        assert!(check_disambiguation(&matches(text)).is_ok());
    }

    #[test]
    fn test_shared_alias_is_rejected() {
        let text = r#"
import * as a from "a.css";
import * as b from "b.css";
mark(a, "x");
mark(b, "x");
"#;
        let (marker, reason) = check_disambiguation(&matches(text)).unwrap_err();
        assert_eq!(marker, "mark");
        assert!(reason.contains("\"x\""));
    }

    #[test]
    fn test_mixed_alias_usage_is_rejected() {
        let text = r#"
import * as a from "a.css";
import * as b from "b.css";
mark(a, "x");
mark(b);
"#;
        assert!(check_disambiguation(&matches(text)).is_err());
    }

    #[test]
    fn test_same_binding_may_repeat_alias() {
        let text = r#"import * as a from "a.css"; mark(a, "x"); mark(a, "x");"#;
        assert!(check_disambiguation(&matches(text)).is_ok());
    }
}
