use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::common::constants::*;
use crate::common::error::{ExtractError, Result};

/// Everything the extractor treats as tunable data rather than code.
///
/// Every section falls back to the built-in tables, so a TOML override only
/// needs to name the parts it changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub vocabulary: VocabularyConfig,
    pub synonyms: SynonymConfig,
    pub patterns: PatternConfig,
    pub thresholds: ThresholdConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// Words that indicate a block describes a person
    pub profile_terms: Vec<String>,
    /// Site-chrome words that disqualify a block's main text
    pub navigation_terms: Vec<String>,
    /// Link target fragments that never lead to a profile
    pub blocked_link_fragments: Vec<String>,
}

/// Key variants for each canonical field. Keys are compared after the same
/// lower-case/underscore normalization the inferencer applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SynonymConfig {
    pub name: Vec<String>,
    pub designation: Vec<String>,
    pub organization: Vec<String>,
    pub email: Vec<String>,
    pub phone: Vec<String>,
}

/// Content patterns used when a value arrives without a recognizable key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Honorifics that open a personal name ("Dr", "Prof", ...)
    pub name_markers: Vec<String>,
    /// Rank or status words ("professor", "emeritus", ...)
    pub designation_markers: Vec<String>,
    /// Organizational unit words ("department", "institute", ...)
    pub organization_markers: Vec<String>,
    pub email_pattern: String,
    pub phone_pattern: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub min_link_text_chars: usize,
    pub min_main_text_chars: usize,
    pub min_anchor_fields: usize,
    pub min_generic_words: usize,
    pub min_fallback_words: usize,
    /// Tier A acceptances below this count escalate to tables and containers
    pub anchor_escalation_threshold: usize,
    pub max_key_words: usize,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            profile_terms: strings(&[
                "professor", "prof", "lecturer", "faculty", "designation", "department",
                "email", "e-mail", "phone", "mobile", "contact", "bio", "biography",
                "profile", "doctor", "dr", "consultant", "specialist", "surgeon",
                "physician", "researcher", "research", "scientist", "director", "dean",
                "chairman", "chair", "head", "coordinator", "staff", "officer", "engineer",
                "manager", "instructor", "teacher", "fellow", "emeritus", "qualification",
                "education", "phd", "expertise", "specialization", "hospital", "institute",
            ]),
            navigation_terms: strings(&[
                "home", "login", "log in", "logout", "log out", "sign in", "sign up",
                "signup", "register", "footer", "header", "sidebar", "menu", "navigation",
                "nav", "breadcrumb", "alumni", "news", "events", "notice", "notices",
                "gallery", "contact us", "about us", "about", "sitemap", "privacy",
                "privacy policy", "terms", "cookie", "cookies", "copyright", "search",
                "subscribe", "newsletter", "careers", "admission", "admissions",
                "apply now", "download", "downloads", "tender", "tenders", "library",
                "facebook", "twitter", "instagram", "linkedin", "youtube", "share",
                "print", "back to top", "read more", "next", "previous", "skip to content",
                "faq", "help", "blog", "press", "announcement", "calendar", "portal",
                "dashboard",
            ]),
            blocked_link_fragments: strings(&[
                "facebook", "twitter", "instagram", "linkedin", "youtube", "dashboard",
                "tender", "library", "login", "logout", "signin", "signup", "register",
                "notice", "gallery", "download", "admission", "career", "privacy",
                "sitemap", "javascript:", "/rss", "/feed", "/cart", "/search",
            ]),
        }
    }
}

impl Default for SynonymConfig {
    fn default() -> Self {
        Self {
            name: strings(&[
                "name", "full_name", "doctor_name", "faculty_name", "professor_name",
                "staff_name", "teacher_name", "member_name", "main_text",
            ]),
            designation: strings(&[
                "designation", "title", "position", "role", "rank", "job_title", "post",
            ]),
            organization: strings(&[
                "organization", "organisation", "hospital", "institute", "institution",
                "department", "dept", "division", "unit", "section", "org", "affiliation",
                "school", "faculty", "company", "office", "chamber",
            ]),
            email: strings(&["email", "e-mail", "e_mail", "mail", "email_address", "email_id"]),
            phone: strings(&[
                "phone", "mobile", "contact", "tel", "telephone", "cell", "phone_number",
                "mobile_no", "phone_no", "contact_no",
            ]),
        }
    }
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            name_markers: strings(&["dr", "prof", "mr", "mrs", "ms", "miss", "engr", "sir", "dame"]),
            designation_markers: strings(&[
                "professor", "lecturer", "retired", "emeritus", "consultant", "registrar",
                "instructor", "researcher", "assistant", "associate", "adjunct", "visiting",
                "head", "dean", "director", "chairman", "fellow",
            ]),
            organization_markers: strings(&[
                "department", "institute", "faculty", "center", "centre", "hospital",
                "university", "college", "school", "division", "laboratory", "clinic",
            ]),
            email_pattern: r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}".to_string(),
            phone_pattern: r"\+?\(?\d[\d \t().\-]{6,}\d".to_string(),
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min_link_text_chars: DEFAULT_MIN_LINK_TEXT_CHARS,
            min_main_text_chars: DEFAULT_MIN_MAIN_TEXT_CHARS,
            min_anchor_fields: DEFAULT_MIN_ANCHOR_FIELDS,
            min_generic_words: DEFAULT_MIN_GENERIC_WORDS,
            min_fallback_words: DEFAULT_MIN_FALLBACK_WORDS,
            anchor_escalation_threshold: DEFAULT_ANCHOR_ESCALATION_THRESHOLD,
            max_key_words: DEFAULT_MAX_KEY_WORDS,
        }
    }
}

impl SynonymConfig {
    /// Canonical field name paired with its variants, in sheet order
    pub fn entries(&self) -> [(&'static str, &[String]); 5] {
        [
            (FIELD_NAME, &self.name),
            (FIELD_DESIGNATION, &self.designation),
            (FIELD_ORGANIZATION, &self.organization),
            (FIELD_EMAIL, &self.email),
            (FIELD_PHONE, &self.phone),
        ]
    }
}

impl ExtractorConfig {
    /// Load a TOML override file. Missing sections keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ExtractError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "Loaded extractor configuration");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ExtractorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject configurations the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.vocabulary.profile_terms.iter().all(|t| t.trim().is_empty()) {
            return Err(ExtractError::Config(
                "vocabulary.profile_terms must contain at least one term".to_string(),
            ));
        }

        let mut owners: HashMap<String, &str> = HashMap::new();
        for (field, variants) in self.synonyms.entries() {
            for variant in variants {
                let key = variant.trim().to_lowercase();
                if key.is_empty() {
                    return Err(ExtractError::Config(format!(
                        "synonyms.{} contains an empty key",
                        field
                    )));
                }
                if let Some(previous) = owners.insert(key.clone(), field) {
                    if previous != field {
                        return Err(ExtractError::Config(format!(
                            "synonym '{}' maps to both '{}' and '{}'",
                            key, previous, field
                        )));
                    }
                }
            }
        }

        if self.thresholds.min_anchor_fields == 0 {
            debug!("thresholds.min_anchor_fields is 0; every anchor block passes the field check");
        }
        if self.thresholds.max_key_words == 0 {
            return Err(ExtractError::Config(
                "thresholds.max_key_words must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
