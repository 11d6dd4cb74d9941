use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::common::constants::*;
use crate::common::error::Result;
use crate::config::{PatternConfig, SynonymConfig};
use crate::pipeline::inference::{normalize_key, RawProfile};

/// The only externally visible record shape
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalProfile {
    pub name: String,
    pub designation: String,
    pub organization: String,
    pub email: String,
    pub phone: String,
}

impl CanonicalProfile {
    /// Values in sheet order, matching [`CANONICAL_FIELDS`]
    pub fn values(&self) -> [&str; 5] {
        [
            &self.name,
            &self.designation,
            &self.organization,
            &self.email,
            &self.phone,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Name,
    Designation,
    Organization,
    Email,
    Phone,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 5] = [
        CanonicalField::Name,
        CanonicalField::Designation,
        CanonicalField::Organization,
        CanonicalField::Email,
        CanonicalField::Phone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Name => FIELD_NAME,
            CanonicalField::Designation => FIELD_DESIGNATION,
            CanonicalField::Organization => FIELD_ORGANIZATION,
            CanonicalField::Email => FIELD_EMAIL,
            CanonicalField::Phone => FIELD_PHONE,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps observed key variants onto canonical fields.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    map: HashMap<String, CanonicalField>,
}

impl SynonymTable {
    pub fn from_config(config: &SynonymConfig) -> Self {
        let mut map = HashMap::new();
        for (field_name, variants) in config.entries() {
            let Some(field) = CanonicalField::from_name(field_name) else {
                continue;
            };
            for variant in variants {
                map.entry(normalize_key(variant)).or_insert(field);
            }
        }
        Self { map }
    }

    /// Keys are looked up as-is, then with dashes folded to underscores
    pub fn lookup(&self, key: &str) -> Option<CanonicalField> {
        let key = normalize_key(key);
        self.map
            .get(&key)
            .or_else(|| self.map.get(&key.replace('-', "_")))
            .copied()
    }
}

// Two four-digit years and nothing else, e.g. "2010 - 2015"
static YEAR_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:19|20)\d{2}\s*[-–—/]?\s*(?:19|20)\d{2}$").expect("valid year range pattern")
});

/// Content patterns for values that arrive without a usable key.
#[derive(Debug, Clone)]
pub struct ContentPatterns {
    name: Option<Regex>,
    designation: Option<Regex>,
    organization: Option<Regex>,
    email: Regex,
    phone: Regex,
}

fn word_alternation(words: &[String]) -> Option<String> {
    let words: Vec<String> = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(regex::escape)
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join("|"))
    }
}

impl ContentPatterns {
    pub fn from_config(config: &PatternConfig) -> Result<Self> {
        // Honorifics only count at the start of a value and must precede a word
        let name = word_alternation(&config.name_markers)
            .map(|alt| Regex::new(&format!(r"(?i)^\s*(?:{})\b\.?\s+\S", alt)))
            .transpose()?;
        let designation = word_alternation(&config.designation_markers)
            .map(|alt| Regex::new(&format!(r"(?i)\b(?:{})\b", alt)))
            .transpose()?;
        let organization = word_alternation(&config.organization_markers)
            .map(|alt| Regex::new(&format!(r"(?i)\b(?:{})\b", alt)))
            .transpose()?;

        Ok(Self {
            name,
            designation,
            organization,
            email: Regex::new(&config.email_pattern)?,
            phone: Regex::new(&config.phone_pattern)?,
        })
    }

    pub fn looks_like_name(&self, value: &str) -> bool {
        self.name.as_ref().map_or(false, |r| r.is_match(value))
    }

    pub fn looks_like_designation(&self, value: &str) -> bool {
        self.designation.as_ref().map_or(false, |r| r.is_match(value))
    }

    pub fn looks_like_organization(&self, value: &str) -> bool {
        self.organization.as_ref().map_or(false, |r| r.is_match(value))
    }

    pub fn find_email<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.email.find(text).map(|m| m.as_str())
    }

    pub fn emails<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.email.find_iter(text).map(|m| m.as_str())
    }

    /// First phone-like run carrying at least seven digits. Lines are
    /// scanned separately and year ranges never count.
    pub fn find_phone<'t>(&self, text: &'t str) -> Option<&'t str> {
        text.lines()
            .flat_map(|line| self.phone.find_iter(line))
            .map(|m| m.as_str().trim())
            .find(|candidate| {
                candidate.chars().filter(char::is_ascii_digit).count() >= 7
                    && !YEAR_RANGE.is_match(candidate)
            })
    }
}

/// Canonical slots with an explicit filled state; the first writer wins.
#[derive(Debug, Default)]
struct ProfileDraft {
    slots: [Option<String>; 5],
}

impl ProfileDraft {
    fn is_filled(&self, field: CanonicalField) -> bool {
        self.slots[field.index()].is_some()
    }

    fn fill(&mut self, field: CanonicalField, value: String) -> bool {
        let slot = &mut self.slots[field.index()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(value);
        true
    }

    fn finish(self) -> CanonicalProfile {
        let [name, designation, organization, email, phone] = self.slots;
        CanonicalProfile {
            name: name.unwrap_or_default(),
            designation: designation.unwrap_or_default(),
            organization: organization.unwrap_or_default(),
            email: email.unwrap_or_default(),
            phone: phone.unwrap_or_default(),
        }
    }
}

fn clean_value(value: &str) -> String {
    crate::document::collapse_whitespace(value)
        .trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '|' | '-' | '–' | '—') || c.is_whitespace())
        .to_string()
}

/// Maps raw inferred fields onto [`CanonicalProfile`].
#[derive(Debug, Clone)]
pub struct FieldNormalizer {
    synonyms: SynonymTable,
    patterns: ContentPatterns,
}

impl FieldNormalizer {
    pub fn new(synonyms: SynonymTable, patterns: ContentPatterns) -> Self {
        Self { synonyms, patterns }
    }

    pub fn from_config(synonyms: &SynonymConfig, patterns: &PatternConfig) -> Result<Self> {
        Ok(Self::new(
            SynonymTable::from_config(synonyms),
            ContentPatterns::from_config(patterns)?,
        ))
    }

    pub fn patterns(&self) -> &ContentPatterns {
        &self.patterns
    }

    pub fn normalize(&self, raw: &RawProfile) -> CanonicalProfile {
        let mut draft = ProfileDraft::default();

        for (key, value) in raw.fields() {
            match self.synonyms.lookup(key) {
                Some(field) => {
                    draft.fill(field, self.clean_for(field, value));
                }
                None => self.apply_content_patterns(&mut draft, value),
            }
        }

        // Provenance fields only fill what the explicit fields left open
        for (key, value) in raw.provenance() {
            if value.trim().is_empty() {
                continue;
            }
            if let Some(field) = self.synonyms.lookup(key) {
                draft.fill(field, self.clean_for(field, value));
            }
        }

        if !draft.is_filled(CanonicalField::Email) {
            if let Some(email) = self.patterns.find_email(&raw.block_text) {
                draft.fill(CanonicalField::Email, email.to_string());
            }
        }
        if !draft.is_filled(CanonicalField::Phone) {
            if let Some(phone) = self.patterns.find_phone(&raw.block_text) {
                draft.fill(CanonicalField::Phone, phone.to_string());
            }
        }

        draft.finish()
    }

    fn apply_content_patterns(&self, draft: &mut ProfileDraft, value: &str) {
        let cleaned = clean_value(value);
        if cleaned.is_empty() {
            return;
        }
        if !draft.is_filled(CanonicalField::Name) && self.patterns.looks_like_name(&cleaned) {
            draft.fill(CanonicalField::Name, cleaned.clone());
        }
        if !draft.is_filled(CanonicalField::Designation)
            && self.patterns.looks_like_designation(&cleaned)
        {
            draft.fill(CanonicalField::Designation, cleaned.clone());
        }
        if !draft.is_filled(CanonicalField::Organization)
            && self.patterns.looks_like_organization(&cleaned)
        {
            draft.fill(CanonicalField::Organization, cleaned.clone());
        }
        if !draft.is_filled(CanonicalField::Email) {
            if let Some(email) = self.patterns.find_email(&cleaned) {
                draft.fill(CanonicalField::Email, email.to_string());
            }
        }
        if !draft.is_filled(CanonicalField::Phone) {
            if let Some(phone) = self.patterns.find_phone(&cleaned) {
                draft.fill(CanonicalField::Phone, phone.to_string());
            }
        }
    }

    /// Email values keep only the address when one is present
    fn clean_for(&self, field: CanonicalField, value: &str) -> String {
        let cleaned = clean_value(value);
        match field {
            CanonicalField::Email => {
                let stripped = cleaned.trim_start_matches("mailto:");
                self.patterns
                    .find_email(stripped)
                    .unwrap_or(stripped)
                    .to_string()
            }
            _ => cleaned,
        }
    }
}
