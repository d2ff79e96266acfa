//! Regex-based removal of discovered domains.

use regex::{Regex, RegexSet};

use crate::error::{MonitorError, MonitorResult};

/// Compiled set of exclusion patterns.
///
/// Patterns are unanchored: `example` excludes `www.example.org`. A domain is
/// excluded when any pattern matches.
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    set: RegexSet,
}

impl ExclusionFilter {
    /// Compile every pattern, failing on the first invalid one
    pub fn new<I, S>(patterns: I) -> MonitorResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(|p| p.as_ref().to_string()).collect();

        // Compile individually first so the error names the offending pattern
        for pattern in &patterns {
            Regex::new(pattern).map_err(|e| MonitorError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
        }

        let set = RegexSet::new(&patterns).map_err(|e| MonitorError::InvalidPattern {
            pattern: patterns.join(" | "),
            reason: e.to_string(),
        })?;
        Ok(Self { set })
    }

    /// A filter that excludes nothing
    #[must_use]
    pub fn empty() -> Self {
        Self {
            set: RegexSet::empty(),
        }
    }

    /// Returns true if any pattern matches the domain
    pub fn is_excluded(&self, fqdn: &str) -> bool {
        self.set.is_match(fqdn)
    }

    /// Keep only the domains no pattern matches, preserving order
    pub fn apply(&self, domains: Vec<String>) -> Vec<String> {
        if self.set.is_empty() {
            return domains;
        }
        domains.into_iter().filter(|d| !self.is_excluded(d)).collect()
    }

    /// Number of patterns in the set
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Returns true if there are no patterns
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domains(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_sample_patterns() {
        let filter = ExclusionFilter::new([r"^foo\.com$", r"^ba(r|z)\.(org|ru)"]).unwrap();
        assert_eq!(filter.len(), 2);
        let kept = filter.apply(domains(&["foo.com", "bar.org", "baz.ru", "qux.io"]));
        assert_eq!(kept, vec!["qux.io"]);
    }

    #[test]
    fn test_unanchored_match() {
        let filter = ExclusionFilter::new(["internal"]).unwrap();
        assert!(filter.is_excluded("api.internal.example"));
        assert!(!filter.is_excluded("api.example"));
    }

    #[test]
    fn test_match_everything() {
        let filter = ExclusionFilter::new([".*"]).unwrap();
        assert!(filter.apply(domains(&["a.example", "b.example"])).is_empty());
    }

    #[test]
    fn test_empty_filter_keeps_duplicates_in_order() {
        let filter = ExclusionFilter::new(Vec::<String>::new()).unwrap();
        assert!(filter.is_empty());
        let kept = filter.apply(domains(&["b.example", "a.example", "b.example"]));
        assert_eq!(kept, vec!["b.example", "a.example", "b.example"]);
    }

    #[test]
    fn test_invalid_pattern_named() {
        let err = ExclusionFilter::new([r"^ok\.example$", "ba(r"]).unwrap_err();
        match err {
            MonitorError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "ba(r"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
