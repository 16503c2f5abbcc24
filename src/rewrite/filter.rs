//! Specifier filter: glob membership test for module specifiers.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

/// A compiled union of glob patterns.
///
/// Specifiers are compared as literal strings. Relative, absolute and bare
/// specifiers are never resolved, so `./a.css` has to be matched by a
/// pattern that allows a leading `./` (such as `**/*.css`).
#[derive(Debug, Clone)]
pub struct SpecifierFilter {
    set: GlobSet,
    patterns: Vec<String>,
}

impl SpecifierFilter {
    /// Compile the given patterns. `*` does not cross `/`, `**` does.
    ///
    /// # Errors
    ///
    /// Returns the first pattern that fails to compile together with the
    /// underlying globset error.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, (String, globset::Error)> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| (pattern.to_string(), e))?;
            builder.add(glob);
        }

        let set = builder.build().map_err(|e| (String::new(), e))?;
        Ok(Self {
            set,
            patterns: patterns.iter().map(|p| p.as_ref().to_string()).collect(),
        })
    }

    /// Returns true if `specifier` matches at least one pattern.
    pub fn accepts(&self, specifier: &str) -> bool {
        self.set.is_match(specifier)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(patterns: &[&str]) -> SpecifierFilter {
        SpecifierFilter::new(patterns).unwrap()
    }

    #[test]
    fn test_double_star_accepts_all_specifier_shapes() {
        let f = filter(&["**/*.css"]);
        assert!(f.accepts("a.css"));
        assert!(f.accepts("./a.css"));
        assert!(f.accepts("../styles/a.css"));
        assert!(f.accepts("/abs/path/a.css"));
        assert!(f.accepts("some-pkg/dist/index.css"));
        assert!(!f.accepts("a.png"));
        assert!(!f.accepts("a.css.js"));
    }

    #[test]
    fn test_single_star_stays_in_one_segment() {
        let f = filter(&["*.css"]);
        assert!(f.accepts("a.css"));
        assert!(!f.accepts("./a.css"));
        assert!(!f.accepts("dir/a.css"));
    }

    #[test]
    fn test_character_class() {
        let f = filter(&["**/theme-[ab].css"]);
        assert!(f.accepts("./theme-a.css"));
        assert!(!f.accepts("./theme-c.css"));
    }

    #[test]
    fn test_pattern_order_does_not_matter() {
        let a = filter(&["**/*.css", "**/*.png"]);
        let b = filter(&["**/*.png", "**/*.css"]);
        for specifier in ["x.css", "x.png", "x.js"] {
            assert_eq!(a.accepts(specifier), b.accepts(specifier));
        }
    }

    #[test]
    fn test_empty_pattern_list_rejects_everything() {
        let f = filter(&[]);
        assert!(!f.accepts("a.css"));
        assert!(f.patterns().is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = SpecifierFilter::new(&["**/*.css", "[unclosed"]).unwrap_err();
        assert_eq!(err.0, "[unclosed");
    }
}
