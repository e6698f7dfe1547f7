//! Correction suggestions for invalid target field names.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use ivr_model::{CorrectionReason, CorrectionSuggestion};

use crate::score::similarity;
use crate::semantic::{NoSemanticMatcher, SemanticMatcher};

/// Confidence assigned to common-correction table hits.
const COMMON_CORRECTION_CONFIDENCE: f64 = 0.95;
/// Confidence assigned to pattern-table hits.
const PATTERN_MATCH_CONFIDENCE: f64 = 0.8;
/// Minimum composite similarity for a fuzzy candidate.
const FUZZY_MATCH_THRESHOLD: f64 = 0.7;
/// Cap on valid fields forwarded to the semantic matcher.
const SEMANTIC_CANDIDATE_LIMIT: usize = 50;

/// Proposes ranked corrections for field names that failed validation.
///
/// Tiers: a static common-correction table (short-circuits), fuzzy
/// matching over the valid-field set, the semantic matcher
/// ([`NoSemanticMatcher`] unless one is attached), and a generic-term
/// pattern table. Fuzzy, semantic and pattern candidates are pooled and
/// ranked by confidence; every candidate a tier produces is
/// membership-checked against the valid-field set, so a returned
/// suggestion can always be substituted into a mapping directly.
pub struct CorrectionSuggester {
    common_corrections: Vec<(String, String)>,
    patterns: Vec<(String, Vec<String>)>,
    semantic: Box<dyn SemanticMatcher>,
}

impl CorrectionSuggester {
    /// Suggester with the built-in correction and pattern tables and the
    /// no-op semantic matcher.
    pub fn new() -> Self {
        Self {
            common_corrections: default_common_corrections(),
            patterns: default_patterns(),
            semantic: Box::new(NoSemanticMatcher),
        }
    }

    /// Replaces the semantic matcher.
    #[must_use]
    pub fn with_semantic_matcher(mut self, matcher: Box<dyn SemanticMatcher>) -> Self {
        self.semantic = matcher;
        self
    }

    /// Replaces the common-correction table.
    #[must_use]
    pub fn with_common_corrections(mut self, table: Vec<(String, String)>) -> Self {
        self.common_corrections = table;
        self
    }

    /// The best correction for an invalid field, if any tier found one.
    pub fn suggest(
        &self,
        invalid_field: &str,
        valid_fields: &BTreeSet<String>,
    ) -> Option<CorrectionSuggestion> {
        self.suggest_all(invalid_field, valid_fields)
            .into_iter()
            .next()
    }

    /// Every qualifying correction candidate, ranked by confidence
    /// descending. The full pool is retained for audit trails; callers
    /// that just need the winner use [`Self::suggest`].
    pub fn suggest_all(
        &self,
        invalid_field: &str,
        valid_fields: &BTreeSet<String>,
    ) -> Vec<CorrectionSuggestion> {
        if let Some(correction) = self.common_correction(invalid_field, valid_fields) {
            return vec![correction];
        }

        let mut pool = Vec::new();
        self.fuzzy_candidates(invalid_field, valid_fields, &mut pool);
        self.semantic_candidates(invalid_field, valid_fields, &mut pool);
        self.pattern_candidates(invalid_field, valid_fields, &mut pool);

        pool.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.field.cmp(&b.field))
        });
        pool
    }

    fn common_correction(
        &self,
        invalid_field: &str,
        valid_fields: &BTreeSet<String>,
    ) -> Option<CorrectionSuggestion> {
        let target = self
            .common_corrections
            .iter()
            .find(|(from, _)| from == invalid_field)
            .map(|(_, to)| to)?;
        let field = schema_spelling(target, valid_fields)?;
        Some(CorrectionSuggestion {
            field,
            confidence: COMMON_CORRECTION_CONFIDENCE,
            reason: CorrectionReason::CommonCorrection,
        })
    }

    fn fuzzy_candidates(
        &self,
        invalid_field: &str,
        valid_fields: &BTreeSet<String>,
        pool: &mut Vec<CorrectionSuggestion>,
    ) {
        for field in valid_fields {
            let score = similarity(invalid_field, field);
            if score > FUZZY_MATCH_THRESHOLD {
                pool.push(CorrectionSuggestion {
                    field: field.clone(),
                    confidence: score,
                    reason: CorrectionReason::FuzzyMatch,
                });
            }
        }
    }

    fn semantic_candidates(
        &self,
        invalid_field: &str,
        valid_fields: &BTreeSet<String>,
        pool: &mut Vec<CorrectionSuggestion>,
    ) {
        let candidates: Vec<String> = valid_fields
            .iter()
            .take(SEMANTIC_CANDIDATE_LIMIT)
            .cloned()
            .collect();
        match self.semantic.suggest(invalid_field, &candidates) {
            Ok(suggestions) => {
                for mut suggestion in suggestions {
                    let Some(field) = schema_spelling(&suggestion.field, valid_fields) else {
                        continue;
                    };
                    suggestion.field = field;
                    suggestion.confidence = suggestion.confidence.clamp(0.0, 1.0);
                    suggestion.reason = CorrectionReason::SemanticMatch;
                    pool.push(suggestion);
                }
            }
            Err(error) => {
                // Best-effort collaborator: degraded suggestions, never a
                // failed correction pass.
                tracing::debug!(invalid_field, %error, "semantic suggestion failed");
            }
        }
    }

    fn pattern_candidates(
        &self,
        invalid_field: &str,
        valid_fields: &BTreeSet<String>,
        pool: &mut Vec<CorrectionSuggestion>,
    ) {
        let invalid_lower = invalid_field.to_lowercase();
        for (pattern, alternatives) in &self.patterns {
            if !invalid_lower.contains(&pattern.to_lowercase()) {
                continue;
            }
            for alternative in alternatives {
                if valid_fields.contains(alternative) {
                    pool.push(CorrectionSuggestion {
                        field: alternative.clone(),
                        confidence: PATTERN_MATCH_CONFIDENCE,
                        reason: CorrectionReason::PatternMatch,
                    });
                }
            }
        }
    }
}

impl Default for CorrectionSuggester {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves a proposed field to its schema spelling, accepting
/// case-insensitive hits.
fn schema_spelling(candidate: &str, valid_fields: &BTreeSet<String>) -> Option<String> {
    if valid_fields.contains(candidate) {
        return Some(candidate.to_string());
    }
    valid_fields
        .iter()
        .find(|field| field.eq_ignore_ascii_case(candidate))
        .cloned()
}

fn default_common_corrections() -> Vec<(String, String)> {
    [
        ("Name", "Patient Name"),
        ("Email", "Patient Email"),
        ("Phone", "Patient Phone"),
        ("Date", "Date of Birth"),
        ("Address", "Patient Address"),
        ("DOB", "Date of Birth"),
        ("NPI", "Provider NPI"),
        ("Insurance", "Insurance Name"),
        ("Policy", "Policy Number"),
        ("Member", "Member ID"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
}

fn default_patterns() -> Vec<(String, Vec<String>)> {
    let alternatives = |names: &[&str]| names.iter().map(|s| (*s).to_string()).collect();
    vec![
        (
            "Name".to_string(),
            alternatives(&[
                "Patient Name",
                "Provider Name",
                "Facility Name",
                "Patient Full Name",
            ]),
        ),
        (
            "Email".to_string(),
            alternatives(&["Patient Email", "Provider Email", "Contact Email"]),
        ),
        (
            "Phone".to_string(),
            alternatives(&[
                "Patient Phone",
                "Provider Phone",
                "Contact Phone",
                "Phone Number",
            ]),
        ),
        (
            "Date".to_string(),
            alternatives(&["Date of Birth", "Service Date", "Signature Date"]),
        ),
        (
            "Address".to_string(),
            alternatives(&["Patient Address", "Provider Address", "Facility Address"]),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_fields(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn common_correction_short_circuits() {
        let suggester = CorrectionSuggester::new();
        let fields = valid_fields(&["Date of Birth", "Patient Name"]);
        let suggestion = suggester.suggest("DOB", &fields).expect("suggestion");
        assert_eq!(suggestion.field, "Date of Birth");
        assert_eq!(suggestion.confidence, 0.95);
        assert_eq!(suggestion.reason, CorrectionReason::CommonCorrection);
    }

    #[test]
    fn common_correction_requires_membership() {
        let suggester = CorrectionSuggester::new();
        // "Date of Birth" absent: the table hit cannot be used and the
        // cascade continues to fuzzy/pattern tiers.
        let fields = valid_fields(&["Wound Location"]);
        let suggestion = suggester.suggest("DOB", &fields);
        assert!(suggestion.is_none());
    }

    #[test]
    fn default_matcher_contributes_no_semantic_candidates() {
        let suggester = CorrectionSuggester::new();
        let fields = valid_fields(&["Patient Name", "Wound Location"]);
        let pool = suggester.suggest_all("Patient Nmae", &fields);
        assert!(!pool.is_empty());
        assert!(pool.iter().all(|s| s.reason != CorrectionReason::SemanticMatch));
    }

    #[test]
    fn fuzzy_tier_finds_close_names() {
        let suggester = CorrectionSuggester::new();
        let fields = valid_fields(&["Patient Name", "Wound Location"]);
        let suggestion = suggester
            .suggest("Patient Nmae", &fields)
            .expect("suggestion");
        assert_eq!(suggestion.field, "Patient Name");
        assert_eq!(suggestion.reason, CorrectionReason::FuzzyMatch);
        assert!(suggestion.confidence > FUZZY_MATCH_THRESHOLD);
    }

    #[test]
    fn pattern_tier_expands_generic_terms() {
        let suggester = CorrectionSuggester::new();
        let fields = valid_fields(&["Provider Email", "Wound Location"]);
        let pool = suggester.suggest_all("Email Field", &fields);
        assert!(pool.iter().any(|s| {
            s.field == "Provider Email" && s.reason == CorrectionReason::PatternMatch
        }));
    }

    #[test]
    fn pool_is_ranked_by_confidence() {
        let suggester = CorrectionSuggester::new();
        let fields = valid_fields(&["Patient Phone", "Provider Phone", "Phone Number"]);
        let pool = suggester.suggest_all("Phone Num", &fields);
        assert!(!pool.is_empty());
        for pair in pool.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn semantic_failures_are_swallowed() {
        struct Failing;
        impl SemanticMatcher for Failing {
            fn suggest(
                &self,
                _invalid_field: &str,
                _valid_fields: &[String],
            ) -> anyhow::Result<Vec<CorrectionSuggestion>> {
                anyhow::bail!("service unavailable")
            }
        }
        let suggester =
            CorrectionSuggester::new().with_semantic_matcher(Box::new(Failing));
        let fields = valid_fields(&["Patient Name"]);
        let suggestion = suggester.suggest("Patient Nme", &fields).expect("fuzzy still works");
        assert_eq!(suggestion.reason, CorrectionReason::FuzzyMatch);
    }

    #[test]
    fn semantic_candidates_are_membership_checked() {
        struct Inventive;
        impl SemanticMatcher for Inventive {
            fn suggest(
                &self,
                _invalid_field: &str,
                _valid_fields: &[String],
            ) -> anyhow::Result<Vec<CorrectionSuggestion>> {
                Ok(vec![
                    CorrectionSuggestion {
                        field: "Invented Field".to_string(),
                        confidence: 0.99,
                        reason: CorrectionReason::SemanticMatch,
                    },
                    CorrectionSuggestion {
                        field: "patient name".to_string(),
                        confidence: 0.9,
                        reason: CorrectionReason::SemanticMatch,
                    },
                ])
            }
        }
        let suggester =
            CorrectionSuggester::new().with_semantic_matcher(Box::new(Inventive));
        let fields = valid_fields(&["Patient Name"]);
        let pool = suggester.suggest_all("Subscriber", &fields);
        assert!(pool.iter().all(|s| s.field != "Invented Field"));
        assert!(pool.iter().any(|s| {
            s.field == "Patient Name" && s.reason == CorrectionReason::SemanticMatch
        }));
    }
}
