//! Name filter for the boot delegation override.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ResolveError, ResolveResult};

/// Names under this prefix always go to the boot override.
pub const RESERVED_PREFIX: &str = "sys.";

/// Static configuration of the boot delegation override.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelegationConfig {
    /// Consult the override at all.
    pub enabled: bool,
    /// Fail with `DelegationMiss` instead of falling through when the
    /// override matches a name but has no answer.
    pub strict: bool,
    /// Wildcard patterns (`*`, `?`) of names to delegate.
    pub patterns: Vec<String>,
}

/// Split a comma-separated pattern list, dropping blank entries.
pub fn parse_patterns(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Translate a wildcard pattern into an anchored, case-insensitive regex.
///
/// `*` matches any run of characters and `?` exactly one; every other
/// character is literal.
pub fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push_str("(?i)^");
    for ch in pattern.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    out.push('$');
    out
}

/// Decides which names the boot override answers.
#[derive(Clone, Debug)]
pub struct DelegationFilter {
    strict: bool,
    patterns: Vec<String>,
    compiled: Vec<Regex>,
}

impl DelegationFilter {
    pub fn new(config: &DelegationConfig) -> ResolveResult<Self> {
        let compiled = config
            .patterns
            .iter()
            .map(|pattern| {
                Regex::new(&wildcard_to_regex(pattern)).map_err(|source| ResolveError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<ResolveResult<Vec<_>>>()?;

        Ok(Self {
            strict: config.strict,
            patterns: config.patterns.clone(),
            compiled,
        })
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn matches(&self, name: &str) -> bool {
        name.starts_with(RESERVED_PREFIX) || self.compiled.iter().any(|re| re.is_match(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn filter(patterns: &[&str]) -> DelegationFilter {
        DelegationFilter::new(&DelegationConfig {
            enabled: true,
            strict: false,
            patterns: patterns.iter().map(|s| s.to_string()).collect(),
        })
        .unwrap()
    }

    #[test]
    fn star_matches_subpackages() {
        let f = filter(&["com.acme.*"]);
        assert!(f.matches("com.acme.widget.Foo"));
        assert!(!f.matches("com.other.Foo"));
    }

    #[test]
    fn question_mark_is_one_char() {
        let f = filter(&["lib?.Core"]);
        assert!(f.matches("lib1.Core"));
        assert!(!f.matches("lib12.Core"));
    }

    #[test]
    fn dots_are_literal() {
        let f = filter(&["a.b"]);
        assert!(f.matches("a.b"));
        assert!(!f.matches("axb"));
    }

    #[test]
    fn case_insensitive() {
        let f = filter(&["COM.ACME.*"]);
        assert!(f.matches("com.acme.Widget"));
    }

    #[test]
    fn reserved_prefix_always_matches() {
        let f = filter(&[]);
        assert!(f.matches("sys.Object"));
        assert!(!f.matches("system.Object"));
    }

    #[test]
    fn parse_patterns_trims_and_drops_blanks() {
        assert_eq!(
            parse_patterns(" com.acme.* ,, org.* ,"),
            vec!["com.acme.*".to_string(), "org.*".to_string()]
        );
        assert!(parse_patterns("").is_empty());
    }

    #[test]
    fn translation() {
        assert_eq!(wildcard_to_regex("a.*"), "(?i)^a\\..*$");
        assert_eq!(wildcard_to_regex("x?"), "(?i)^x.$");
    }

    proptest! {
        #[test]
        fn literal_patterns_match_only_themselves(s in "[a-zA-Z0-9.$+()\\[\\]{}|^]{1,16}") {
            prop_assume!(!s.starts_with(RESERVED_PREFIX));
            let f = filter(&[s.as_str()]);
            prop_assert!(f.matches(&s));
            let longer = format!("{s}x");
            prop_assert!(!f.matches(&longer));
        }

        #[test]
        fn star_suffix_matches_any_extension(prefix in "[a-z.]{1,10}", rest in "[a-zA-Z.]{0,10}") {
            let pattern = format!("{prefix}*");
            let f = filter(&[pattern.as_str()]);
            let name = format!("{prefix}{rest}");
            prop_assert!(f.matches(&name));
        }
    }
}
