use std::collections::HashSet;
use tracing::trace;

use crate::document::collapse_whitespace;
use crate::pipeline::normalize::CanonicalProfile;

/// `(name, organization)`, lower-cased with whitespace collapsed
pub type IdentityKey = (String, String);

pub fn identity_key(profile: &CanonicalProfile) -> IdentityKey {
    (
        collapse_whitespace(&profile.name).to_lowercase(),
        collapse_whitespace(&profile.organization).to_lowercase(),
    )
}

/// Collapses records onto their identity key, first seen wins.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<IdentityKey>,
    emitted: Vec<CanonicalProfile>,
    dropped_unnamed: usize,
    dropped_duplicates: usize,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the profile was kept
    pub fn push(&mut self, profile: CanonicalProfile) -> bool {
        if profile.name.trim().is_empty() {
            self.dropped_unnamed += 1;
            return false;
        }
        let key = identity_key(&profile);
        if !self.seen.insert(key) {
            trace!(name = %profile.name, "duplicate profile dropped");
            self.dropped_duplicates += 1;
            return false;
        }
        self.emitted.push(profile);
        true
    }

    pub fn len(&self) -> usize {
        self.emitted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitted.is_empty()
    }

    pub fn dropped_unnamed(&self) -> usize {
        self.dropped_unnamed
    }

    pub fn dropped_duplicates(&self) -> usize {
        self.dropped_duplicates
    }

    pub fn into_profiles(self) -> Vec<CanonicalProfile> {
        self.emitted
    }
}

/// Drop unnamed records and keep the first occurrence of each identity key.
pub fn finalize<I>(profiles: I) -> Vec<CanonicalProfile>
where
    I: IntoIterator<Item = CanonicalProfile>,
{
    let mut dedup = Deduplicator::new();
    for profile in profiles {
        dedup.push(profile);
    }
    dedup.into_profiles()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, organization: &str, email: &str) -> CanonicalProfile {
        CanonicalProfile {
            name: name.to_string(),
            organization: organization.to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_seen_wins_case_insensitive() {
        let out = finalize(vec![
            profile("Jane Doe", "Physics", "first@x.edu"),
            profile("  jane   DOE ", "physics", "second@x.edu"),
            profile("Jane Doe", "Chemistry", "third@x.edu"),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].email, "first@x.edu");
        assert_eq!(out[1].organization, "Chemistry");
    }

    #[test]
    fn test_unnamed_records_dropped() {
        let mut dedup = Deduplicator::new();
        assert!(!dedup.push(profile("   ", "Physics", "x@y.org")));
        assert!(dedup.push(profile("A. Rahman", "", "")));
        assert!(!dedup.push(profile("a. rahman", "", "")));
        assert_eq!(dedup.len(), 1);
        assert_eq!(dedup.dropped_unnamed(), 1);
        assert_eq!(dedup.dropped_duplicates(), 1);
    }

    #[test]
    fn test_order_preserved() {
        let names = ["C", "A", "B"];
        let out = finalize(names.iter().map(|n| profile(n, "", "")));
        let got: Vec<_> = out.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(got, names);
    }
}
