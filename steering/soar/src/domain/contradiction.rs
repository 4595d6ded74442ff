// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Contradiction scan — flags mutually inconsistent claims across attempts.
//!
//! The scan is independent of reward: it never alters scoring, only surfaces
//! a separate result field the caller can act on downstream.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::pipeline::{Claim, Polarity};

/// One pair of opposing claims about the same subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContradictionFlag {
    pub subject: String,
    pub affirming: String,
    pub denying: String,
}

/// Result of one contradiction pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContradictionScan {
    /// Claims actually examined (bounded by the configured cap).
    pub claims_examined: usize,
    pub flags: Vec<ContradictionFlag>,
}

impl ContradictionScan {
    pub fn has_contradictions(&self) -> bool {
        !self.flags.is_empty()
    }
}

/// Scan up to `max_claims` claims for same-subject opposite-polarity pairs.
pub fn scan_claims(claims: &[Claim], max_claims: usize) -> ContradictionScan {
    let bounded: Vec<&Claim> = claims.iter().take(max_claims).collect();

    let mut by_subject: HashMap<String, (Vec<&Claim>, Vec<&Claim>)> = HashMap::new();
    for claim in &bounded {
        let entry = by_subject.entry(claim.subject_key()).or_default();
        match claim.polarity {
            Polarity::Affirms => entry.0.push(claim),
            Polarity::Denies => entry.1.push(claim),
        }
    }

    let mut subjects: Vec<_> = by_subject.into_iter().collect();
    subjects.sort_by(|a, b| a.0.cmp(&b.0));

    let mut flags = Vec::new();
    for (subject, (affirming, denying)) in subjects {
        // One flag per subject is enough to surface the conflict.
        if let (Some(a), Some(d)) = (affirming.first(), denying.first()) {
            flags.push(ContradictionFlag {
                subject,
                affirming: a.statement.clone(),
                denying: d.statement.clone(),
            });
        }
    }

    ContradictionScan {
        claims_examined: bounded.len(),
        flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposing_claims_are_flagged() {
        let claims = vec![
            Claim::new("caffeine", "caffeine improves reaction time", Polarity::Affirms),
            Claim::new("Caffeine", "caffeine has no measurable effect", Polarity::Denies),
        ];
        let scan = scan_claims(&claims, 32);
        assert!(scan.has_contradictions());
        assert_eq!(scan.flags[0].subject, "caffeine");
    }

    #[test]
    fn test_agreeing_claims_pass() {
        let claims = vec![
            Claim::new("sleep", "sleep consolidates memory", Polarity::Affirms),
            Claim::new("sleep", "sleep supports recall", Polarity::Affirms),
        ];
        let scan = scan_claims(&claims, 32);
        assert!(!scan.has_contradictions());
        assert_eq!(scan.claims_examined, 2);
    }

    #[test]
    fn test_cap_bounds_the_examined_claims() {
        let mut claims = vec![Claim::new("a", "yes", Polarity::Affirms); 10];
        claims.push(Claim::new("a", "no", Polarity::Denies));

        // The denying claim sits past the cap, so no contradiction is seen.
        let scan = scan_claims(&claims, 5);
        assert_eq!(scan.claims_examined, 5);
        assert!(!scan.has_contradictions());
    }

    #[test]
    fn test_different_subjects_do_not_conflict() {
        let claims = vec![
            Claim::new("alpha", "holds", Polarity::Affirms),
            Claim::new("beta", "does not hold", Polarity::Denies),
        ];
        assert!(!scan_claims(&claims, 32).has_contradictions());
    }

    #[test]
    fn test_empty_input_is_clean() {
        let scan = scan_claims(&[], 32);
        assert_eq!(scan.claims_examined, 0);
        assert!(!scan.has_contradictions());
    }
}
