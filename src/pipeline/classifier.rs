use serde::Serialize;
use tracing::debug;

use crate::config::ThresholdConfig;
use crate::pipeline::candidate::{CandidateBlock, Tier};
use crate::vocabulary::Vocabulary;

/// Why a candidate was turned away
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "detail")]
pub enum Rejection {
    EmptyMainText,
    MainTextTooShort(usize),
    NavigationTerm(String),
    BlockedLink(String),
    NoProfileTerm,
    TooFewFields(usize),
    TooFewWords(usize),
}

/// Classifier decision for one candidate block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub accepted: bool,
    /// Tier-derived confidence, 0.0 for rejected blocks
    pub confidence: f64,
    pub rejection: Option<Rejection>,
}

impl Verdict {
    fn accept(tier: Tier) -> Self {
        Self {
            accepted: true,
            confidence: tier.confidence(),
            rejection: None,
        }
    }

    fn reject(rejection: Rejection) -> Self {
        Self {
            accepted: false,
            confidence: 0.0,
            rejection: Some(rejection),
        }
    }
}

/// Gates candidate blocks on vocabulary and structure.
#[derive(Debug, Clone)]
pub struct RelevanceClassifier {
    vocabulary: Vocabulary,
    thresholds: ThresholdConfig,
}

impl RelevanceClassifier {
    pub fn new(vocabulary: Vocabulary, thresholds: ThresholdConfig) -> Self {
        Self {
            vocabulary,
            thresholds,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Convenience wrapper around [`classify`](Self::classify)
    pub fn is_relevant(&self, block: &CandidateBlock, inferred_fields: usize) -> bool {
        self.classify(block, inferred_fields).accepted
    }

    /// `inferred_fields` is the number of distinct fields the inferencer found
    /// in the block; only anchor candidates are held to a minimum.
    ///
    /// The unfiltered tier skips the profile vocabulary and the structural
    /// minimums, but navigation and blocked-link checks still apply.
    pub fn classify(&self, block: &CandidateBlock, inferred_fields: usize) -> Verdict {
        let verdict = self.check(block, inferred_fields);
        match &verdict.rejection {
            Some(rejection) => debug!(
                tier = %block.tier,
                main_text = %block.main_text,
                ?rejection,
                "candidate rejected"
            ),
            None => debug!(tier = %block.tier, main_text = %block.main_text, "candidate accepted"),
        }
        verdict
    }

    fn check(&self, block: &CandidateBlock, inferred_fields: usize) -> Verdict {
        let main_text = block.main_text.trim();
        if main_text.is_empty() {
            return Verdict::reject(Rejection::EmptyMainText);
        }
        let main_len = main_text.chars().count();
        if main_len < self.thresholds.min_main_text_chars {
            return Verdict::reject(Rejection::MainTextTooShort(main_len));
        }
        if let Some(term) = self.vocabulary.navigation.first_match(main_text) {
            return Verdict::reject(Rejection::NavigationTerm(term));
        }
        if let Some(link) = &block.profile_link {
            if let Some(fragment) = self.vocabulary.blocked_links.first_match(link) {
                return Verdict::reject(Rejection::BlockedLink(fragment.to_string()));
            }
        }
        if block.tier == Tier::Unfiltered {
            return Verdict::accept(block.tier);
        }
        if !self.vocabulary.profile.is_match(&block.relevance_text()) {
            return Verdict::reject(Rejection::NoProfileTerm);
        }

        match block.tier {
            Tier::Anchor if inferred_fields < self.thresholds.min_anchor_fields => {
                Verdict::reject(Rejection::TooFewFields(inferred_fields))
            }
            Tier::GenericContainer => {
                let words = block.word_count();
                if words <= self.thresholds.min_generic_words {
                    Verdict::reject(Rejection::TooFewWords(words))
                } else {
                    Verdict::accept(block.tier)
                }
            }
            tier => Verdict::accept(tier),
        }
    }
}
