//! Filename pattern matching
//!
//! A [`NamePattern`] is evaluated against a file NAME, never against the full path.
//!
//! # Pattern Syntax
//!
//! - [`PatternSyntax::Regex`] (default): a regular expression searched anywhere in the name.
//!   The expression is not implicitly anchored, use `^`/`$` to match the whole name.
//! - [`PatternSyntax::Glob`]: a shell glob (`*.txt`, `report_??.csv`) matched against the
//!   whole name.
//!
//! An optional extension filter is a separate, case-sensitive suffix check. Both the pattern
//! and the extension must pass for a name to qualify.
//!
//! # Examples
//!
//! ```
//! use common::pattern::{NamePattern, PatternSyntax};
//!
//! let pattern = NamePattern::compile(r"\.txt$", PatternSyntax::Regex, None).unwrap();
//! assert!(pattern.matches("a.txt"));
//! assert!(!pattern.matches("c.jpg"));
//!
//! let pattern = NamePattern::compile("report", PatternSyntax::Regex, Some(".xlsx")).unwrap();
//! assert!(pattern.matches("weekly_report.xlsx"));
//! assert!(!pattern.matches("weekly_report.XLSX"));
//! ```

use crate::error::Error;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PatternSyntax {
    #[default]
    Regex,
    Glob,
}

#[derive(Debug, Clone)]
enum Matcher {
    Regex(regex::Regex),
    Glob(globset::GlobMatcher),
}

/// A compiled filename pattern with an optional extension filter
#[derive(Debug, Clone)]
pub struct NamePattern {
    /// original pattern string, used in log output
    pub original: String,
    matcher: Matcher,
    /// required filename suffix (e.g. ".xlsx"), compared case-sensitively
    pub extension: Option<String>,
}

impl NamePattern {
    /// Compile `pattern`. Fails with [`Error::Pattern`] on invalid syntax.
    pub fn compile(
        pattern: &str,
        syntax: PatternSyntax,
        extension: Option<&str>,
    ) -> Result<Self, Error> {
        let matcher = match syntax {
            PatternSyntax::Regex => {
                Matcher::Regex(regex::Regex::new(pattern).map_err(|err| Error::Pattern {
                    pattern: pattern.to_string(),
                    source: Box::new(err),
                })?)
            }
            PatternSyntax::Glob => {
                // a filename never contains '/', so literal_separator only matters for '**'
                let glob = globset::GlobBuilder::new(pattern)
                    .literal_separator(true)
                    .build()
                    .map_err(|err| Error::Pattern {
                        pattern: pattern.to_string(),
                        source: Box::new(err),
                    })?;
                Matcher::Glob(glob.compile_matcher())
            }
        };
        Ok(Self {
            original: pattern.to_string(),
            matcher,
            extension: extension
                .filter(|ext| !ext.is_empty())
                .map(str::to_string),
        })
    }

    /// Check the pattern alone, ignoring the extension filter
    pub fn matches_pattern(&self, name: &str) -> bool {
        match &self.matcher {
            Matcher::Regex(regex) => regex.is_match(name),
            Matcher::Glob(glob) => glob.is_match(name),
        }
    }

    /// Check the extension filter alone; always true when no filter is set
    pub fn matches_extension(&self, name: &str) -> bool {
        self.extension
            .as_deref()
            .is_none_or(|ext| name.ends_with(ext))
    }

    pub fn matches(&self, name: &str) -> bool {
        self.matches_pattern(name) && self.matches_extension(name)
    }
}

impl std::fmt::Display for NamePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.extension {
            Some(ext) => write!(f, "'{}' (extension '{}')", self.original, ext),
            None => write!(f, "'{}'", self.original),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regex(pattern: &str) -> NamePattern {
        NamePattern::compile(pattern, PatternSyntax::Regex, None).unwrap()
    }

    fn glob(pattern: &str) -> NamePattern {
        NamePattern::compile(pattern, PatternSyntax::Glob, None).unwrap()
    }

    #[test]
    fn test_regex_is_not_implicitly_anchored() {
        let pattern = regex("txt");
        assert!(pattern.matches("a.txt"));
        assert!(pattern.matches("txt_notes.md"));
        let anchored = regex(r"^a\.txt$");
        assert!(anchored.matches("a.txt"));
        assert!(!anchored.matches("ba.txt"));
        assert!(!anchored.matches("a.txt.bak"));
    }

    #[test]
    fn test_regex_suffix_pattern() {
        let pattern = regex(r".*\.txt$");
        assert!(pattern.matches("a.txt"));
        assert!(pattern.matches("b.txt"));
        assert!(!pattern.matches("c.jpg"));
    }

    #[test]
    fn test_invalid_regex_is_pattern_error() {
        let error = NamePattern::compile("([unclosed", PatternSyntax::Regex, None).unwrap_err();
        match error {
            Error::Pattern { pattern, .. } => assert_eq!(pattern, "([unclosed"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_glob_is_pattern_error() {
        let error = NamePattern::compile("[a-", PatternSyntax::Glob, None).unwrap_err();
        assert!(matches!(error, Error::Pattern { .. }));
    }

    #[test]
    fn test_glob_matches_whole_name() {
        let pattern = glob("*.txt");
        assert!(pattern.matches("a.txt"));
        assert!(!pattern.matches("a.txt.bak"));
        assert!(!pattern.matches("c.md"));
        let pattern = glob("report_??.csv");
        assert!(pattern.matches("report_q1.csv"));
        assert!(!pattern.matches("report_q10.csv"));
    }

    #[test]
    fn test_extension_is_case_sensitive_suffix() {
        let pattern = NamePattern::compile("report", PatternSyntax::Regex, Some(".xlsx")).unwrap();
        assert!(pattern.matches("report_q1.xlsx"));
        assert!(!pattern.matches("report_q1.XLSX"));
        assert!(!pattern.matches("report_q1.xlsx.bak"));
        // both checks must pass
        assert!(!pattern.matches("summary.xlsx"));
    }

    #[test]
    fn test_empty_extension_means_no_filter() {
        let pattern = NamePattern::compile("a", PatternSyntax::Regex, Some("")).unwrap();
        assert!(pattern.extension.is_none());
        assert!(pattern.matches("a.anything"));
    }

    #[test]
    fn test_display() {
        let pattern = NamePattern::compile("x", PatternSyntax::Regex, Some(".md")).unwrap();
        assert_eq!(pattern.to_string(), "'x' (extension '.md')");
        assert_eq!(regex("x").to_string(), "'x'");
    }
}
