//! Keyword tables used to admit and reject candidate blocks.
//!
//! Terms match as whole words, case-insensitively. A multi-word term such as
//! "sign in" matches across any run of whitespace.

use regex::Regex;

use crate::common::error::Result;
use crate::config::VocabularyConfig;

/// A compiled set of whole-word terms.
#[derive(Debug, Clone)]
pub struct TermSet {
    terms: Vec<String>,
    matcher: Option<Regex>,
}

impl TermSet {
    pub fn new<I, S>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cleaned: Vec<String> = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        cleaned.sort();
        cleaned.dedup();

        // Longest first so "privacy policy" wins over "privacy" in first_match
        let mut ordered = cleaned.clone();
        ordered.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let matcher = if ordered.is_empty() {
            None
        } else {
            let alternatives: Vec<String> = ordered
                .iter()
                .map(|term| {
                    term.split_whitespace()
                        .map(regex::escape)
                        .collect::<Vec<_>>()
                        .join(r"\s+")
                })
                .collect();
            let pattern = format!(
                r"(?i)(?:^|[^\p{{L}}\p{{N}}_])({})(?:$|[^\p{{L}}\p{{N}}_])",
                alternatives.join("|")
            );
            Some(Regex::new(&pattern)?)
        };

        Ok(Self {
            terms: cleaned,
            matcher,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.as_ref().map_or(false, |m| m.is_match(text))
    }

    /// The first term found in `text`, lower-cased
    pub fn first_match(&self, text: &str) -> Option<String> {
        let caps = self.matcher.as_ref()?.captures(text)?;
        caps.get(1).map(|m| m.as_str().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Plain substring fragments, matched case-insensitively against link targets.
#[derive(Debug, Clone, Default)]
pub struct FragmentSet {
    fragments: Vec<String>,
}

impl FragmentSet {
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fragments = fragments
            .into_iter()
            .map(|f| f.as_ref().trim().to_lowercase())
            .filter(|f| !f.is_empty())
            .collect();
        Self { fragments }
    }

    pub fn first_match(&self, target: &str) -> Option<&str> {
        let target = target.to_lowercase();
        self.fragments
            .iter()
            .find(|f| target.contains(f.as_str()))
            .map(|f| f.as_str())
    }
}

/// Profile, navigation and link tables compiled from configuration.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub profile: TermSet,
    pub navigation: TermSet,
    pub blocked_links: FragmentSet,
}

impl Vocabulary {
    pub fn from_config(config: &VocabularyConfig) -> Result<Self> {
        Ok(Self {
            profile: TermSet::new(&config.profile_terms)?,
            navigation: TermSet::new(&config.navigation_terms)?,
            blocked_links: FragmentSet::new(&config.blocked_link_fragments),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_word_match_only() {
        let set = TermSet::new(["bio", "dr"]).unwrap();
        assert!(set.is_match("Short Bio: works on compilers"));
        assert!(set.is_match("Dr. Rahman"));
        assert!(!set.is_match("Biology department"));
        assert!(!set.is_match("Drive safely"));
    }

    #[test]
    fn test_multi_word_terms_span_whitespace() {
        let set = TermSet::new(["sign in", "privacy"]).unwrap();
        assert!(set.is_match("Please Sign\n  In"));
        assert_eq!(set.first_match("SIGN IN here"), Some("sign in".to_string()));
        assert!(!set.is_match("signing"));
    }

    #[test]
    fn test_punctuated_terms() {
        let set = TermSet::new(["e-mail"]).unwrap();
        assert!(set.is_match("E-mail: x@y.org"));
        assert!(!set.is_match("email"));
    }

    #[test]
    fn test_empty_set_never_matches() {
        let set = TermSet::new(Vec::<String>::new()).unwrap();
        assert!(set.is_empty());
        assert!(!set.is_match("anything at all"));
        assert_eq!(set.first_match("anything"), None);
    }

    #[test]
    fn test_fragment_set_matches_substrings() {
        let set = FragmentSet::new(["facebook", "/rss"]);
        assert_eq!(set.first_match("https://www.Facebook.com/dept"), Some("facebook"));
        assert_eq!(set.first_match("/news/rss"), Some("/rss"));
        assert!(set.first_match("/people/jane-doe").is_none());
    }
}
