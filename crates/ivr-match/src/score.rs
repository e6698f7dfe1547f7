//! Composite string-similarity scoring for field names.
//!
//! Combines three signals the way the portal's field matcher always has:
//! normalized Levenshtein similarity, Jaro-Winkler similarity, and
//! Metaphone phonetic equality, weighted 0.4 / 0.4 / 0.2.

use rapidfuzz::distance::jaro_winkler;
use rapidfuzz::distance::levenshtein;

use crate::metaphone::metaphone;

const EDIT_WEIGHT: f64 = 0.4;
const JARO_WINKLER_WEIGHT: f64 = 0.4;
const PHONETIC_WEIGHT: f64 = 0.2;

/// Breakdown of the composite score, kept for explainability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityBreakdown {
    /// `1 - levenshtein / max(len)`.
    pub edit: f64,
    /// Jaro-Winkler similarity (standard 0.1 prefix boost, max prefix 4).
    pub jaro_winkler: f64,
    /// 1.0 when both Metaphone keys match, else 0.0.
    pub phonetic: f64,
    /// Weighted composite in `[0, 1]`.
    pub score: f64,
}

/// Case-insensitive composite similarity between two field names.
///
/// Deterministic; symmetric for the edit and phonetic terms. Returns a
/// value in `[0, 1]`. Two empty strings score 1.0, one empty string 0.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    similarity_breakdown(a, b).score
}

/// Like [`similarity`] but exposing the individual terms.
pub fn similarity_breakdown(a: &str, b: &str) -> SimilarityBreakdown {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    if a.is_empty() || b.is_empty() {
        let score = if a.is_empty() && b.is_empty() { 1.0 } else { 0.0 };
        return SimilarityBreakdown {
            edit: score,
            jaro_winkler: score,
            phonetic: score,
            score,
        };
    }

    let a_len = a.chars().count();
    let b_len = b.chars().count();
    let distance = levenshtein::distance(a.chars(), b.chars());
    let edit = 1.0 - distance as f64 / a_len.max(b_len) as f64;

    let jw = jaro_winkler::similarity(a.chars(), b.chars());

    let phonetic = if metaphone(&a) == metaphone(&b) {
        1.0
    } else {
        0.0
    };

    let score = (EDIT_WEIGHT * edit + JARO_WINKLER_WEIGHT * jw + PHONETIC_WEIGHT * phonetic)
        .clamp(0.0, 1.0);
    SimilarityBreakdown {
        edit,
        jaro_winkler: jw,
        phonetic,
        score,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::{ProptestConfig, proptest};

    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert_eq!(similarity("Patient Name", "Patient Name"), 1.0);
        assert_eq!(similarity("DOB", "dob"), 1.0);
    }

    #[test]
    fn empty_edge_cases() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("", "Patient Name"), 0.0);
        assert_eq!(similarity("Patient Name", ""), 0.0);
    }

    #[test]
    fn near_misses_score_high() {
        let score = similarity("Patient Nmae", "Patient Name");
        assert!(score > 0.7, "transposed letters should stay above 0.7, got {score}");
    }

    #[test]
    fn unrelated_names_score_low() {
        let score = similarity("Provider NPI", "Wound Location");
        assert!(score < 0.6, "unrelated names should score low, got {score}");
    }

    #[test]
    fn phonetic_term_lifts_homophones() {
        let with = similarity_breakdown("phone", "fone");
        assert_eq!(with.phonetic, 1.0);
        assert!(with.score > with.edit * EDIT_WEIGHT + with.jaro_winkler * JARO_WINKLER_WEIGHT);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn score_is_bounded(a in ".{0,24}", b in ".{0,24}") {
            let score = similarity(&a, &b);
            assert!((0.0..=1.0).contains(&score), "score {score} out of range");
        }

        #[test]
        fn self_similarity_is_one(a in ".{1,24}") {
            assert_eq!(similarity(&a, &a), 1.0);
        }

        #[test]
        fn edit_and_phonetic_terms_are_symmetric(a in ".{0,16}", b in ".{0,16}") {
            let ab = similarity_breakdown(&a, &b);
            let ba = similarity_breakdown(&b, &a);
            assert_eq!(ab.edit, ba.edit);
            assert_eq!(ab.phonetic, ba.phonetic);
        }
    }
}
