//! LIKE-style pattern translation and matching
//!
//! Attribute templates may carry SQL LIKE wildcards: `%` for any run of
//! characters, `_` for exactly one character, and `[...]` character
//! classes. A dialect translates such a template into regex source; the
//! matcher compiles it once and memoizes the compiled regex in a bounded
//! LRU cache keyed by the raw template.

use regex::Regex;
use tracing::warn;

use super::cache::BoundedCache;
use super::Matcher;

/// Capacity of the compiled-pattern cache when none is given
pub const DEFAULT_PATTERN_CACHE_CAPACITY: usize = 512;

/// A vendor wildcard syntax that can be translated to a regex
///
/// Implementations decide which templates count as patterns at all and how
/// a pattern maps to regex source; the matching algorithm stays the same
/// across dialects.
pub trait PatternDialect: Send + Sync {
    /// Whether the template contains wildcard syntax at all
    fn is_pattern(&self, template: &str) -> bool;

    /// Translate the template into regex source
    fn to_regex(&self, template: &str) -> String;
}

/// SQL LIKE dialect: `%`, `_`, and bracketed character classes
#[derive(Debug, Default, Clone, Copy)]
pub struct LikeDialect;

const LIKE_TRIGGER_CHARS: [char; 4] = ['%', '_', '[', ']'];

impl PatternDialect for LikeDialect {
    fn is_pattern(&self, template: &str) -> bool {
        LIKE_TRIGGER_CHARS.iter().any(|&ch| template.contains(ch))
    }

    /// Tokenizes left to right: wildcards, a bracketed class passed through
    /// verbatim (already valid regex), or a maximal literal run that gets
    /// regex-escaped. The output is anchored so a pattern covers the whole
    /// value, matching the LIKE operator it mirrors.
    fn to_regex(&self, template: &str) -> String {
        let mut source = String::with_capacity(template.len() + 8);
        source.push('^');
        let mut rest = template;
        while let Some(ch) = rest.chars().next() {
            match ch {
                '%' => {
                    source.push_str(".*");
                    rest = &rest[1..];
                }
                '_' => {
                    source.push('.');
                    rest = &rest[1..];
                }
                '[' => {
                    if let Some(end) = rest.find(']') {
                        source.push_str(&rest[..=end]);
                        rest = &rest[end + 1..];
                    } else {
                        // Unclosed class: carried through verbatim. The
                        // source will not compile and the template matches
                        // nothing.
                        source.push_str(rest);
                        rest = "";
                    }
                }
                _ => {
                    let run = rest
                        .find(|c| c == '%' || c == '_' || c == '[')
                        .unwrap_or(rest.len());
                    source.push_str(&regex::escape(&rest[..run]));
                    rest = &rest[run..];
                }
            }
        }
        source.push('$');
        source
    }
}

/// Pattern-capable attribute matcher backed by a compiled-pattern cache
///
/// Templates without wildcard syntax are compared by string equality;
/// pattern templates are compiled through the dialect and tested against
/// the needle. The cache is owned by the matcher instance, never global,
/// and only affects recompute cost: results are identical whether it is
/// cold, warm, or undersized.
pub struct PatternMatcher<D: PatternDialect = LikeDialect> {
    dialect: D,
    cache: BoundedCache<String, Regex>,
}

impl PatternMatcher<LikeDialect> {
    /// LIKE-dialect matcher with the default cache capacity
    pub fn new() -> Self {
        Self::with_dialect(LikeDialect, DEFAULT_PATTERN_CACHE_CAPACITY)
    }

    /// LIKE-dialect matcher with a custom cache capacity
    pub fn with_capacity(cache_capacity: usize) -> Self {
        Self::with_dialect(LikeDialect, cache_capacity)
    }
}

impl Default for PatternMatcher<LikeDialect> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: PatternDialect> PatternMatcher<D> {
    /// Matcher for a custom dialect
    pub fn with_dialect(dialect: D, cache_capacity: usize) -> Self {
        PatternMatcher {
            dialect,
            cache: BoundedCache::new(cache_capacity),
        }
    }

    /// The matcher's dialect
    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    /// Number of compiled patterns currently cached
    pub fn cached_patterns(&self) -> usize {
        self.cache.len()
    }

    fn compiled(&self, template: &str) -> Option<Regex> {
        if let Some(regex) = self.cache.get(template) {
            return Some(regex);
        }
        let source = self.dialect.to_regex(template);
        match Regex::new(&source) {
            Ok(regex) => {
                self.cache.put(template.to_string(), regex.clone());
                Some(regex)
            }
            Err(err) => {
                warn!(template, %err, "attribute template does not compile, treating as non-matching");
                None
            }
        }
    }
}

impl<D: PatternDialect> Matcher for PatternMatcher<D> {
    fn matches(&self, haystack: &[String], needle: &str) -> bool {
        haystack.iter().any(|template| {
            if self.dialect.is_pattern(template) {
                self.compiled(template)
                    .map_or(false, |regex| regex.is_match(needle))
            } else {
                template == needle
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn haystack(templates: &[&str]) -> Vec<String> {
        templates.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_like_to_regex() {
        let dialect = LikeDialect;
        assert_eq!(dialect.to_regex("user:%"), "^user:.*$");
        assert_eq!(dialect.to_regex("a_c"), "^a.c$");
        assert_eq!(dialect.to_regex("role:[0-5]"), "^role:[0-5]$");
        assert_eq!(dialect.to_regex("a.b"), "^a\\.b$");
        assert_eq!(dialect.to_regex("%"), "^.*$");
    }

    #[test]
    fn test_is_pattern_triggers() {
        let dialect = LikeDialect;
        assert!(dialect.is_pattern("user:%"));
        assert!(dialect.is_pattern("a_c"));
        assert!(dialect.is_pattern("role:[0-5]"));
        assert!(dialect.is_pattern("odd]"));
        assert!(!dialect.is_pattern("user:1"));
    }

    #[test]
    fn test_exact_entries_need_full_equality() {
        let matcher = PatternMatcher::new();
        assert!(matcher.matches(&haystack(&["user:1", "user:2"]), "user:2"));
        assert!(!matcher.matches(&haystack(&["user:1"]), "user:12"));
    }

    #[test]
    fn test_percent_matches_any_run() {
        let matcher = PatternMatcher::new();
        let templates = haystack(&["user:%"]);
        assert!(matcher.matches(&templates, "user:1"));
        assert!(matcher.matches(&templates, "user:"));
        assert!(matcher.matches(&templates, "user:anything/else"));
        assert!(!matcher.matches(&templates, "role:1"));
    }

    #[test]
    fn test_pattern_is_anchored() {
        let matcher = PatternMatcher::new();
        // An embedded occurrence is not enough; the pattern covers the
        // whole value like the LIKE operator it mirrors.
        assert!(!matcher.matches(&haystack(&["user:%"]), "prefix-user:1"));
        assert!(!matcher.matches(&haystack(&["_"]), "ab"));
    }

    #[test]
    fn test_character_class() {
        let matcher = PatternMatcher::new();
        let templates = haystack(&["role:[0-5]"]);
        assert!(matcher.matches(&templates, "role:4"));
        assert!(!matcher.matches(&templates, "role:6"));
        assert!(!matcher.matches(&templates, "role:44"));
    }

    #[test]
    fn test_underscore_matches_one_char() {
        let matcher = PatternMatcher::new();
        let templates = haystack(&["file-_"]);
        assert!(matcher.matches(&templates, "file-a"));
        assert!(!matcher.matches(&templates, "file-"));
        assert!(!matcher.matches(&templates, "file-ab"));
    }

    #[test]
    fn test_unclosed_class_matches_nothing() {
        let matcher = PatternMatcher::new();
        let templates = haystack(&["role:[0-5"]);
        assert!(!matcher.matches(&templates, "role:4"));
        assert!(!matcher.matches(&templates, "role:[0-5"));
    }

    #[test]
    fn test_results_identical_cold_and_warm() {
        let matcher = PatternMatcher::new();
        let templates = haystack(&["user:%", "role:[0-5]"]);

        let cold: Vec<bool> = ["user:1", "role:4", "guest"]
            .iter()
            .map(|needle| matcher.matches(&templates, needle))
            .collect();
        let warm: Vec<bool> = ["user:1", "role:4", "guest"]
            .iter()
            .map(|needle| matcher.matches(&templates, needle))
            .collect();

        assert_eq!(cold, warm);
        assert_eq!(matcher.cached_patterns(), 2);
    }

    #[test]
    fn test_undersized_cache_still_correct() {
        // Capacity 1 forces constant eviction across three patterns.
        let matcher = PatternMatcher::with_capacity(1);
        let templates = haystack(&["user:%", "role:[0-5]", "svc-_"]);

        for _ in 0..2 {
            assert!(matcher.matches(&templates, "user:7"));
            assert!(matcher.matches(&templates, "role:3"));
            assert!(matcher.matches(&templates, "svc-a"));
            assert!(!matcher.matches(&templates, "nobody"));
        }
        assert_eq!(matcher.cached_patterns(), 1);
    }

    #[test]
    fn test_duplicate_templates_are_harmless() {
        let matcher = PatternMatcher::new();
        let templates = haystack(&["user:%", "user:%", "user:1", "user:1"]);
        assert!(matcher.matches(&templates, "user:1"));
        assert!(!matcher.matches(&templates, "role:1"));
    }
}
