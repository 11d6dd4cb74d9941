/// Names shared across the extractor, the CLI and the exporters.
/// Tier names appear in logs, metrics labels and the run report.
// Tier names
pub const TIER_ANCHOR: &str = "anchor";
pub const TIER_TABLE_ROW: &str = "table-row";
pub const TIER_GENERIC: &str = "generic-container";
pub const TIER_UNFILTERED: &str = "unfiltered";

// Canonical output fields, in sheet order
pub const FIELD_NAME: &str = "name";
pub const FIELD_DESIGNATION: &str = "designation";
pub const FIELD_ORGANIZATION: &str = "organization";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_PHONE: &str = "phone";

pub const CANONICAL_FIELDS: [&str; 5] = [
    FIELD_NAME,
    FIELD_DESIGNATION,
    FIELD_ORGANIZATION,
    FIELD_EMAIL,
    FIELD_PHONE,
];

// Provenance keys carried on raw profiles
pub const KEY_MAIN_TEXT: &str = "main_text";
pub const KEY_BLOCK_TEXT: &str = "block_text";
pub const KEY_PROFILE_LINK: &str = "profile_link";

// Default thresholds
pub const DEFAULT_MIN_LINK_TEXT_CHARS: usize = 5;
pub const DEFAULT_MIN_MAIN_TEXT_CHARS: usize = 5;
pub const DEFAULT_MIN_ANCHOR_FIELDS: usize = 2;
pub const DEFAULT_MIN_GENERIC_WORDS: usize = 8;
pub const DEFAULT_MIN_FALLBACK_WORDS: usize = 5;
pub const DEFAULT_ANCHOR_ESCALATION_THRESHOLD: usize = 5;
pub const DEFAULT_MAX_KEY_WORDS: usize = 4;

// Export formats (used in CLI)
pub const FORMAT_JSON: &str = "json";
pub const FORMAT_CSV: &str = "csv";
pub const FORMAT_TSV: &str = "tsv";

/// Get all supported export format names
pub fn get_supported_formats() -> Vec<&'static str> {
    vec![FORMAT_JSON, FORMAT_CSV, FORMAT_TSV]
}
