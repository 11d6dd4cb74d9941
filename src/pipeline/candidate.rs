use serde::{Deserialize, Serialize};
use std::fmt;

use crate::common::constants::{TIER_ANCHOR, TIER_GENERIC, TIER_TABLE_ROW, TIER_UNFILTERED};
use crate::pipeline::inference::DelimiterSplitter;

/// The locator strategy that produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    Anchor,
    TableRow,
    GenericContainer,
    Unfiltered,
}

impl Tier {
    pub const ALL: [Tier; 4] = [
        Tier::Anchor,
        Tier::TableRow,
        Tier::GenericContainer,
        Tier::Unfiltered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Anchor => TIER_ANCHOR,
            Tier::TableRow => TIER_TABLE_ROW,
            Tier::GenericContainer => TIER_GENERIC,
            Tier::Unfiltered => TIER_UNFILTERED,
        }
    }

    /// Confidence attached to an accepted candidate from this tier
    pub fn confidence(&self) -> f64 {
        match self {
            Tier::TableRow => 0.9,
            Tier::Anchor => 0.8,
            Tier::GenericContainer => 0.6,
            Tier::Unfiltered => 0.3,
        }
    }

    /// Whether unmatched segments are assigned by position
    pub fn uses_positional_fallback(&self) -> bool {
        matches!(self, Tier::GenericContainer | Tier::Unfiltered)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DOM subtree considered for promotion to a profile record.
#[derive(Debug, Clone)]
pub struct CandidateBlock {
    pub tier: Tier,
    /// Flattened visible text, one line per block element
    pub block_text: String,
    /// First line/segment of `block_text`
    pub main_text: String,
    /// Target of the anchor that surfaced this block
    pub profile_link: Option<String>,
    /// Header-keyed cells, only for table rows
    pub cells: Vec<(String, String)>,
    /// Text that counts toward relevance without being part of the record
    /// (table header labels)
    pub context: Option<String>,
}

impl CandidateBlock {
    pub fn new(tier: Tier, block_text: String) -> Self {
        let main_text = DelimiterSplitter::strict()
            .split(&block_text)
            .into_iter()
            .next()
            .unwrap_or_default();
        Self {
            tier,
            block_text,
            main_text,
            profile_link: None,
            cells: Vec::new(),
            context: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.profile_link = Some(link.into());
        self
    }

    pub fn with_cells(mut self, cells: Vec<(String, String)>) -> Self {
        self.cells = cells;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn word_count(&self) -> usize {
        crate::document::word_count(&self.block_text)
    }

    /// Text searched for profile vocabulary
    pub fn relevance_text(&self) -> String {
        match &self.context {
            Some(context) => format!("{}\n{}", context, self.block_text),
            None => self.block_text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_text_is_first_segment() {
        let block = CandidateBlock::new(
            Tier::Anchor,
            "Prof. Jane Doe; Designation: Lecturer\nDepartment: Physics".to_string(),
        );
        assert_eq!(block.main_text, "Prof. Jane Doe");
        assert_eq!(block.word_count(), 7);
    }

    #[test]
    fn test_empty_block_has_empty_main_text() {
        let block = CandidateBlock::new(Tier::GenericContainer, String::new());
        assert!(block.main_text.is_empty());
        assert_eq!(block.relevance_text(), "");
    }

    #[test]
    fn test_tier_names_and_confidence_order() {
        assert_eq!(Tier::TableRow.to_string(), "table-row");
        assert!(Tier::TableRow.confidence() > Tier::Anchor.confidence());
        assert!(Tier::Anchor.confidence() > Tier::GenericContainer.confidence());
        assert!(Tier::GenericContainer.confidence() > Tier::Unfiltered.confidence());
        assert!(!Tier::Anchor.uses_positional_fallback());
        assert!(Tier::Unfiltered.uses_positional_fallback());
    }
}
