//! The profile extraction engine.
//!
//! A run walks an ordered escalation plan of locator tiers. Every located
//! candidate goes through field inference and the relevance classifier;
//! accepted ones are normalized onto the canonical record shape and pushed
//! through the deduplicator in discovery order.

pub mod candidate;
pub mod classifier;
pub mod dedup;
pub mod inference;
pub mod locator;
pub mod normalize;
pub mod strategy;

pub use candidate::{CandidateBlock, Tier};
pub use classifier::{Rejection, RelevanceClassifier, Verdict};
pub use dedup::{finalize, identity_key, Deduplicator, IdentityKey};
pub use inference::{DelimiterSplitter, FieldInferencer, KeyValueMatcher, PositionalFallback, RawProfile};
pub use locator::CandidateLocator;
pub use normalize::{CanonicalField, CanonicalProfile, ContentPatterns, FieldNormalizer, SynonymTable};
pub use strategy::{default_plan, Precondition, TierStrategy};

use scraper::Html;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::common::error::Result;
use crate::config::ExtractorConfig;
use crate::document;
use crate::metrics::ExtractorMetrics;
use crate::vocabulary::Vocabulary;

/// Per-tier counts for one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierStats {
    pub tier: Tier,
    pub located: usize,
    pub accepted: usize,
    /// Records this tier added to the output after deduplication
    pub emitted: usize,
    pub confidence: f64,
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub profiles: Vec<CanonicalProfile>,
    pub tiers: Vec<TierStats>,
    pub fallback_used: bool,
    pub duplicates_dropped: usize,
    pub unnamed_dropped: usize,
    /// Set when even the unfiltered pass yielded no named record
    pub no_profiles_found: bool,
}

impl ExtractionReport {
    pub fn accepted(&self) -> usize {
        self.tiers.iter().map(|t| t.accepted).sum()
    }

    pub fn tier(&self, tier: Tier) -> Option<&TierStats> {
        self.tiers.iter().find(|t| t.tier == tier)
    }
}

/// Configured engine. Holds no per-run state, so one instance can serve
/// any number of documents, from any thread.
#[derive(Debug, Clone)]
pub struct ProfileExtractor {
    config: ExtractorConfig,
    plan: Vec<TierStrategy>,
    locator: CandidateLocator,
    classifier: RelevanceClassifier,
    inferencer: FieldInferencer,
    normalizer: FieldNormalizer,
}

impl ProfileExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config.validate()?;

        let vocabulary = Vocabulary::from_config(&config.vocabulary)?;
        let thresholds = config.thresholds.clone();
        let normalizer = FieldNormalizer::from_config(&config.synonyms, &config.patterns)?;

        info!(
            profile_terms = vocabulary.profile.len(),
            navigation_terms = vocabulary.navigation.len(),
            "Profile extractor ready"
        );

        Ok(Self {
            plan: default_plan(&thresholds),
            locator: CandidateLocator::new(thresholds.clone()),
            classifier: RelevanceClassifier::new(vocabulary, thresholds.clone()),
            inferencer: FieldInferencer::new(thresholds.max_key_words),
            normalizer,
            config,
        })
    }

    /// Engine with the built-in tables
    pub fn with_defaults() -> Result<Self> {
        Self::new(ExtractorConfig::default())
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn patterns(&self) -> &ContentPatterns {
        self.normalizer.patterns()
    }

    pub fn extract(&self, html: &str) -> ExtractionReport {
        let document = document::parse(html);
        self.extract_document(&document)
    }

    pub fn extract_document(&self, document: &Html) -> ExtractionReport {
        let started = Instant::now();
        let mut dedup = Deduplicator::new();
        let mut tiers = Vec::new();
        let mut accepted_total = 0;
        let mut fallback_used = false;

        for strategy in &self.plan {
            if !strategy.precondition.allows(accepted_total) {
                debug!(strategy = strategy.name, accepted_total, "strategy skipped");
                continue;
            }
            for &tier in &strategy.tiers {
                if tier == Tier::Unfiltered {
                    fallback_used = true;
                    ExtractorMetrics::record_fallback();
                    warn!("no candidate passed the classifier, running unfiltered pass");
                }
                let stats = self.run_tier(document, tier, &mut dedup);
                accepted_total += stats.accepted;
                tiers.push(stats);
            }
        }

        let duplicates_dropped = dedup.dropped_duplicates();
        let unnamed_dropped = dedup.dropped_unnamed();
        let profiles = dedup.into_profiles();
        let no_profiles_found = profiles.is_empty();

        ExtractorMetrics::record_run(
            profiles.len(),
            duplicates_dropped,
            started.elapsed().as_secs_f64(),
        );
        if no_profiles_found {
            warn!("no profiles found");
        } else {
            info!(
                profiles = profiles.len(),
                duplicates_dropped, fallback_used, "extraction complete"
            );
        }

        ExtractionReport {
            profiles,
            tiers,
            fallback_used,
            duplicates_dropped,
            unnamed_dropped,
            no_profiles_found,
        }
    }

    fn run_tier(&self, document: &Html, tier: Tier, dedup: &mut Deduplicator) -> TierStats {
        let blocks = self.locator.locate(document, tier);
        let located = blocks.len();
        let mut accepted = 0;
        let mut emitted = 0;

        for block in &blocks {
            let raw = self.inferencer.infer_block(block);
            if !self.classifier.is_relevant(block, raw.len()) {
                continue;
            }
            accepted += 1;
            if dedup.push(self.normalizer.normalize(&raw)) {
                emitted += 1;
            }
        }

        ExtractorMetrics::record_tier(tier.as_str(), located, accepted);
        info!(tier = %tier, located, accepted, emitted, "tier complete");

        TierStats {
            tier,
            located,
            accepted,
            emitted,
            confidence: tier.confidence(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VocabularyConfig;

    fn extractor() -> ProfileExtractor {
        ProfileExtractor::with_defaults().unwrap()
    }

    fn anchor_cards(count: usize) -> String {
        (0..count)
            .map(|i| {
                format!(
                    r#"<div class="card"><a href="/people/{i}">Dr. Person Number{i}</a>; Designation: Professor; Department: Unit{i}</div>"#
                )
            })
            .collect()
    }

    #[test]
    fn test_extractor_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProfileExtractor>();
    }

    #[test]
    fn test_enough_anchors_skip_escalation() {
        let html = format!("<html><body>{}</body></html>", anchor_cards(5));
        let report = extractor().extract(&html);
        assert_eq!(report.profiles.len(), 5);
        assert_eq!(report.tiers.len(), 1);
        assert_eq!(report.tiers[0].tier, Tier::Anchor);
        assert!(!report.fallback_used);
    }

    #[test]
    fn test_few_anchors_escalate_to_tables_and_containers() {
        let html = format!("<html><body>{}</body></html>", anchor_cards(2));
        let report = extractor().extract(&html);
        let run: Vec<Tier> = report.tiers.iter().map(|t| t.tier).collect();
        assert_eq!(run, vec![Tier::Anchor, Tier::TableRow, Tier::GenericContainer]);
        assert_eq!(report.tier(Tier::Anchor).unwrap().accepted, 2);
    }

    #[test]
    fn test_fallback_accepts_without_vocabulary() {
        let html = r#"<html><body>
            <div>Maria Lopez, Ocean Studies Group, north campus building</div>
        </body></html>"#;
        let report = extractor().extract(html);
        assert!(report.fallback_used);
        assert_eq!(report.tiers.last().unwrap().tier, Tier::Unfiltered);
        assert_eq!(report.profiles.len(), 1);
        assert_eq!(report.profiles[0].name, "Maria Lopez");
        assert!(!report.no_profiles_found);
    }

    #[test]
    fn test_empty_document_flags_no_profiles() {
        let report = extractor().extract("");
        assert!(report.profiles.is_empty());
        assert!(report.no_profiles_found);
        assert!(report.fallback_used);
        assert_eq!(report.accepted(), 0);
    }

    #[test]
    fn test_injected_vocabulary_changes_acceptance() {
        let html = r#"<div><a href="/crew/1">Captain Ahab Smith</a>; Vessel: Pequod; Rank: Captain</div>"#;
        let default_report = extractor().extract(html);
        assert_eq!(default_report.tier(Tier::Anchor).unwrap().accepted, 0);

        let config = ExtractorConfig {
            vocabulary: VocabularyConfig {
                profile_terms: vec!["vessel".to_string()],
                ..VocabularyConfig::default()
            },
            ..ExtractorConfig::default()
        };
        let report = ProfileExtractor::new(config).unwrap().extract(html);
        assert_eq!(report.tier(Tier::Anchor).unwrap().accepted, 1);
        assert_eq!(report.profiles[0].name, "Captain Ahab Smith");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ExtractorConfig::default();
        config.vocabulary.profile_terms.clear();
        assert!(ProfileExtractor::new(config).is_err());
    }
}
