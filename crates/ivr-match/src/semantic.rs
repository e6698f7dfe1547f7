//! Optional semantic-matching collaborator.

use ivr_model::CorrectionSuggestion;

/// External semantic field matcher consulted by the correction suggester.
///
/// Implementations own their transport and timeout (the reference service
/// answers within 5 seconds or not at all). Errors degrade suggestion
/// quality only; the suggester logs and continues.
pub trait SemanticMatcher: Send + Sync {
    /// Ranked suggestions for an invalid field name, given the candidate
    /// valid fields (capped by the caller).
    fn suggest(
        &self,
        invalid_field: &str,
        valid_fields: &[String],
    ) -> anyhow::Result<Vec<CorrectionSuggestion>>;
}

/// Matcher that never suggests anything; the default when no semantic
/// service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSemanticMatcher;

impl SemanticMatcher for NoSemanticMatcher {
    fn suggest(
        &self,
        _invalid_field: &str,
        _valid_fields: &[String],
    ) -> anyhow::Result<Vec<CorrectionSuggestion>> {
        Ok(Vec::new())
    }
}
