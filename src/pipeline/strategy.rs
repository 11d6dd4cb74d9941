use serde::Serialize;

use crate::config::ThresholdConfig;
use crate::pipeline::candidate::Tier;

/// When a strategy is allowed to run, given acceptances so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "when", content = "count")]
pub enum Precondition {
    Always,
    /// Runs while fewer than `n` candidates have been accepted
    AcceptedFewerThan(usize),
    NoneAccepted,
}

impl Precondition {
    pub fn allows(&self, accepted_so_far: usize) -> bool {
        match *self {
            Precondition::Always => true,
            Precondition::AcceptedFewerThan(n) => accepted_so_far < n,
            Precondition::NoneAccepted => accepted_so_far == 0,
        }
    }
}

/// One step of the escalation plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierStrategy {
    pub name: &'static str,
    pub tiers: Vec<Tier>,
    pub precondition: Precondition,
}

impl TierStrategy {
    pub fn new(name: &'static str, tiers: Vec<Tier>, precondition: Precondition) -> Self {
        Self {
            name,
            tiers,
            precondition,
        }
    }
}

/// Anchors first, tables and containers when anchors come up short,
/// the unfiltered pass only when nothing at all was accepted.
///
/// The plan ends after its last step; each step sees the acceptance count
/// accumulated by every step before it.
pub fn default_plan(thresholds: &ThresholdConfig) -> Vec<TierStrategy> {
    vec![
        TierStrategy::new("anchors", vec![Tier::Anchor], Precondition::Always),
        TierStrategy::new(
            "structure",
            vec![Tier::TableRow, Tier::GenericContainer],
            Precondition::AcceptedFewerThan(thresholds.anchor_escalation_threshold),
        ),
        TierStrategy::new("fallback", vec![Tier::Unfiltered], Precondition::NoneAccepted),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan_order() {
        let plan = default_plan(&ThresholdConfig::default());
        let tiers: Vec<Tier> = plan.iter().flat_map(|s| s.tiers.clone()).collect();
        assert_eq!(tiers, Tier::ALL.to_vec());
        assert_eq!(plan[1].precondition, Precondition::AcceptedFewerThan(5));
    }

    #[test]
    fn test_preconditions() {
        assert!(Precondition::Always.allows(100));
        assert!(Precondition::AcceptedFewerThan(5).allows(4));
        assert!(!Precondition::AcceptedFewerThan(5).allows(5));
        assert!(Precondition::NoneAccepted.allows(0));
        assert!(!Precondition::NoneAccepted.allows(1));
    }

    #[test]
    fn test_escalation_threshold_is_configurable() {
        let thresholds = ThresholdConfig {
            anchor_escalation_threshold: 1,
            ..ThresholdConfig::default()
        };
        let plan = default_plan(&thresholds);
        assert!(!plan[1].precondition.allows(1));
    }
}
