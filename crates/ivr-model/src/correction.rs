//! Correction suggestion types produced when a target field name fails
//! validation against a template's valid-field set.

use serde::{Deserialize, Serialize};

/// How a correction candidate was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionReason {
    /// Static alias table hit (e.g. "DOB" -> "Date of Birth").
    CommonCorrection,
    /// String-similarity match above the fuzzy threshold.
    FuzzyMatch,
    /// Proposed by the external semantic-matching collaborator.
    SemanticMatch,
    /// Generic-term pattern expanded to a concrete template field.
    PatternMatch,
}

/// A ranked correction candidate for an invalid target field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionSuggestion {
    /// The valid template field being proposed.
    pub field: String,
    /// Confidence score (0.0 to 1.0).
    pub confidence: f64,
    /// How this candidate was found.
    pub reason: CorrectionReason,
}

/// A correction that was applied while cleaning a mapping set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedCorrection {
    /// Internal field whose target was corrected.
    pub internal_field: String,
    /// The invalid target name that was replaced.
    pub original: String,
    /// The valid target name substituted in.
    pub corrected: String,
    /// Confidence of the winning suggestion.
    pub confidence: f64,
    /// How the winning suggestion was found.
    pub reason: CorrectionReason,
}
