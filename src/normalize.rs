//! Cross-reference token extraction from free text.
//!
//! Commit messages and pull-request descriptions reference business items by
//! human-facing key (`PROJ-123`) and pull requests by number (`#42`). The
//! extraction rules are shared by adapters and the resolver so both sides
//! agree on what counts as a reference.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

/// Default business-key shape: a project-key-like token, a separator and
/// digits. Matching is case-sensitive; `proj-123` is not a reference.
pub const DEFAULT_REFERENCE_PATTERN: &str = r"[A-Z][A-Z0-9]*-[0-9]+";

/// Compiled pattern for extracting business-item keys from text.
#[derive(Debug, Clone)]
pub struct ReferencePattern {
    regex: Regex,
}

impl ReferencePattern {
    /// Compile a custom reference pattern.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`regex::Error`] when the pattern is invalid.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// All non-overlapping matches in first-seen order, deduplicated by
    /// exact string equality.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        for found in self.regex.find_iter(text) {
            let key = found.as_str();
            if seen.insert(key.to_string()) {
                keys.push(key.to_string());
            }
        }
        keys
    }
}

impl Default for ReferencePattern {
    fn default() -> Self {
        Self {
            regex: Regex::new(DEFAULT_REFERENCE_PATTERN).expect("default pattern compiles"),
        }
    }
}

/// Pull-request numbers referenced as `#123` tokens, first-seen order,
/// deduplicated.
pub fn extract_pr_refs(text: &str) -> Vec<u64> {
    static PR_REF: OnceLock<Regex> = OnceLock::new();
    let regex = PR_REF.get_or_init(|| Regex::new(r"#([0-9]+)").expect("pr-ref pattern compiles"));

    let mut seen = HashSet::new();
    let mut numbers = Vec::new();
    for captures in regex.captures_iter(text) {
        if let Some(number) = captures.get(1).and_then(|m| m.as_str().parse::<u64>().ok()) {
            if seen.insert(number) {
                numbers.push(number);
            }
        }
    }
    numbers
}
