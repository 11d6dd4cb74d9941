//! Field inference from loosely delimited block text.
//!
//! Three stages, each usable on its own:
//! `DelimiterSplitter` -> `KeyValueMatcher` -> `PositionalFallback`.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::common::constants::{
    FIELD_DESIGNATION, FIELD_NAME, FIELD_ORGANIZATION, KEY_BLOCK_TEXT, KEY_MAIN_TEXT,
    KEY_PROFILE_LINK,
};
use crate::pipeline::candidate::CandidateBlock;

static STRICT_DELIMITERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[;；\n]+").expect("valid strict delimiter pattern"));

static LOOSE_DELIMITERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[;；\n,，|]+|\s+[-–—]\s+").expect("valid loose delimiter pattern")
});

// Short key in any script, ASCII or full-width colon, non-empty remainder
static KEY_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\p{L}[\p{L} .'\-]{0,40}?)\s*[:：]\s*(.+?)\s*$")
        .expect("valid key/value pattern")
});

/// Lower-case a key and join its words with underscores.
pub fn normalize_key(key: &str) -> String {
    key.trim()
        .trim_end_matches('.')
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Splits block text into trimmed, non-empty segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimiterSplitter {
    loose: bool,
}

impl DelimiterSplitter {
    /// Semicolons and newlines
    pub fn strict() -> Self {
        Self { loose: false }
    }

    /// Also commas, pipes and spaced dashes
    pub fn loose() -> Self {
        Self { loose: true }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        let pattern: &Regex = if self.loose {
            &LOOSE_DELIMITERS
        } else {
            &STRICT_DELIMITERS
        };
        pattern
            .split(text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Recognizes `key: value` segments.
#[derive(Debug, Clone, Copy)]
pub struct KeyValueMatcher {
    max_key_words: usize,
}

impl KeyValueMatcher {
    pub fn new(max_key_words: usize) -> Self {
        Self { max_key_words }
    }

    /// Returns the normalized key and the value
    pub fn match_segment(&self, segment: &str) -> Option<(String, String)> {
        let caps = KEY_VALUE.captures(segment)?;
        let raw_key = caps.get(1)?.as_str();
        let value = caps.get(2)?.as_str().trim();

        if raw_key.split_whitespace().count() > self.max_key_words {
            return None;
        }
        // "http://..." is a link, not a key
        if value.starts_with("//") {
            return None;
        }

        let key = normalize_key(raw_key);
        if key.is_empty() || value.is_empty() {
            return None;
        }
        Some((key, value.to_string()))
    }
}

/// Assigns unmatched segments by their position in the block.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalFallback;

impl PositionalFallback {
    const SLOTS: [&'static str; 3] = [FIELD_NAME, FIELD_DESIGNATION, FIELD_ORGANIZATION];

    /// Key for an unmatched segment at `index`, if it earns one
    pub fn key_for(&self, index: usize, segment: &str) -> Option<String> {
        match Self::SLOTS.get(index) {
            Some(slot) => Some(slot.to_string()),
            None if segment.split_whitespace().count() > 1 => Some(format!("field_{}", index)),
            None => None,
        }
    }
}

/// Inferred fields in discovery order, with explicit presence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawProfile {
    fields: Vec<(String, String)>,
    pub main_text: String,
    pub block_text: String,
    pub profile_link: Option<String>,
}

impl RawProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field unless the key is already present. Returns whether it was stored.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.contains(&key) {
            return false;
        }
        self.fields.push((key, value.into()));
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of distinct inferred fields, provenance excluded
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Provenance fields in the order the normalizer consults them
    pub fn provenance(&self) -> Vec<(&'static str, &str)> {
        let mut out = vec![
            (KEY_MAIN_TEXT, self.main_text.as_str()),
            (KEY_BLOCK_TEXT, self.block_text.as_str()),
        ];
        if let Some(link) = &self.profile_link {
            out.push((KEY_PROFILE_LINK, link.as_str()));
        }
        out
    }
}

/// Runs splitter, matcher and positional fallback over candidate blocks.
#[derive(Debug, Clone)]
pub struct FieldInferencer {
    matcher: KeyValueMatcher,
    positional: PositionalFallback,
}

impl FieldInferencer {
    pub fn new(max_key_words: usize) -> Self {
        Self {
            matcher: KeyValueMatcher::new(max_key_words),
            positional: PositionalFallback,
        }
    }

    /// Infer fields from free text.
    ///
    /// Explicit `key: value` pairs are recorded first so a positional guess
    /// never shadows a labelled value for the same key.
    pub fn infer(&self, text: &str, splitter: DelimiterSplitter, positional: bool) -> RawProfile {
        let segments = splitter.split(text);
        let mut profile = RawProfile::new();
        let mut unmatched = Vec::new();

        for (index, segment) in segments.iter().enumerate() {
            match self.matcher.match_segment(segment) {
                Some((key, value)) => {
                    if !profile.insert(key.clone(), value) {
                        trace!(key = %key, "duplicate key ignored");
                    }
                }
                None => unmatched.push(index),
            }
        }

        if positional {
            for index in unmatched {
                let segment = &segments[index];
                if let Some(key) = self.positional.key_for(index, segment) {
                    profile.insert(key, segment.clone());
                }
            }
        }

        profile
    }

    /// Infer fields for a located candidate, choosing the split mode by tier.
    pub fn infer_block(&self, block: &CandidateBlock) -> RawProfile {
        let mut profile = if !block.cells.is_empty() {
            let mut profile = RawProfile::new();
            for (key, value) in &block.cells {
                profile.insert(key.clone(), value.clone());
            }
            profile
        } else if block.tier.uses_positional_fallback() {
            self.infer(&block.block_text, DelimiterSplitter::loose(), true)
        } else {
            self.infer(&block.block_text, DelimiterSplitter::strict(), false)
        };

        profile.main_text = block.main_text.clone();
        profile.block_text = block.block_text.clone();
        profile.profile_link = block.profile_link.clone();
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::candidate::Tier;

    #[test]
    fn test_strict_and_loose_splitting() {
        let text = "Jane Doe; Lecturer, Physics\nRoom 4 - North Wing";
        assert_eq!(
            DelimiterSplitter::strict().split(text),
            vec!["Jane Doe", "Lecturer, Physics", "Room 4 - North Wing"]
        );
        assert_eq!(
            DelimiterSplitter::loose().split(text),
            vec!["Jane Doe", "Lecturer", "Physics", "Room 4", "North Wing"]
        );
    }

    #[test]
    fn test_loose_split_keeps_hyphenated_words() {
        let parts = DelimiterSplitter::loose().split("Jean-Luc Picard | Captain");
        assert_eq!(parts, vec!["Jean-Luc Picard", "Captain"]);
    }

    #[test]
    fn test_key_value_matching() {
        let matcher = KeyValueMatcher::new(4);
        assert_eq!(
            matcher.match_segment("Designation: Lecturer"),
            Some(("designation".to_string(), "Lecturer".to_string()))
        );
        assert_eq!(
            matcher.match_segment("Phone Number ： +880 1711 000000"),
            Some(("phone_number".to_string(), "+880 1711 000000".to_string()))
        );
        assert_eq!(
            matcher.match_segment("E-mail: a@b.org"),
            Some(("e-mail".to_string(), "a@b.org".to_string()))
        );
        assert_eq!(matcher.match_segment("Prof. Jane Doe"), None);
        assert_eq!(matcher.match_segment("Email:"), None);
        assert_eq!(matcher.match_segment("https://example.org/people"), None);
    }

    #[test]
    fn test_non_latin_keys() {
        let matcher = KeyValueMatcher::new(4);
        assert_eq!(
            matcher.match_segment("電話：0123 456 789"),
            Some(("電話".to_string(), "0123 456 789".to_string()))
        );
        assert_eq!(
            matcher.match_segment("Téléphone: +33 1 23 45 67 89"),
            Some(("téléphone".to_string(), "+33 1 23 45 67 89".to_string()))
        );
    }

    #[test]
    fn test_long_keys_are_not_keys() {
        let matcher = KeyValueMatcher::new(2);
        assert_eq!(matcher.match_segment("Note that the office is closed: today"), None);
        assert!(matcher.match_segment("Office Hours: 9-5").is_some());
    }

    #[test]
    fn test_positional_fallback_slots() {
        let fallback = PositionalFallback;
        assert_eq!(fallback.key_for(0, "Jane"), Some("name".to_string()));
        assert_eq!(fallback.key_for(2, "Physics"), Some("organization".to_string()));
        assert_eq!(fallback.key_for(4, "Room 12"), Some("field_4".to_string()));
        assert_eq!(fallback.key_for(5, "Dhaka"), None);
    }

    #[test]
    fn test_explicit_keys_beat_positional_guesses() {
        let inferencer = FieldInferencer::new(4);
        let profile = inferencer.infer(
            "Dr. Karim Hossain\nName: Karim Hossain\nAssociate Professor",
            DelimiterSplitter::loose(),
            true,
        );
        assert_eq!(profile.get("name"), Some("Karim Hossain"));
        // Position is absolute: the third segment lands in the organization slot
        assert_eq!(profile.get("designation"), None);
        assert_eq!(profile.get("organization"), Some("Associate Professor"));
        assert_eq!(profile.len(), 2);
    }

    #[test]
    fn test_anchor_block_inference_without_positional() {
        let inferencer = FieldInferencer::new(4);
        let block = CandidateBlock::new(
            Tier::Anchor,
            "Prof. Jane Doe; Designation: Lecturer; Department: Physics".to_string(),
        )
        .with_link("/people/jane");
        let profile = inferencer.infer_block(&block);

        assert_eq!(profile.len(), 2);
        assert_eq!(profile.get("designation"), Some("Lecturer"));
        assert_eq!(profile.get("department"), Some("Physics"));
        assert_eq!(profile.main_text, "Prof. Jane Doe");
        assert_eq!(profile.profile_link.as_deref(), Some("/people/jane"));
    }

    #[test]
    fn test_table_cells_keep_empty_values() {
        let inferencer = FieldInferencer::new(4);
        let block = CandidateBlock::new(Tier::TableRow, "A. Rahman".to_string()).with_cells(vec![
            ("name".to_string(), "A. Rahman".to_string()),
            ("email".to_string(), String::new()),
        ]);
        let profile = inferencer.infer_block(&block);
        assert!(profile.contains("email"));
        assert_eq!(profile.get("email"), Some(""));
    }

    #[test]
    fn test_first_value_wins() {
        let mut profile = RawProfile::new();
        assert!(profile.insert("email", "a@x.org"));
        assert!(!profile.insert("email", "b@x.org"));
        assert_eq!(profile.get("email"), Some("a@x.org"));
    }
}
