//! Automatic correction of field mappings before resolution.

use std::collections::{BTreeMap, BTreeSet};

use ivr_model::AppliedCorrection;

use crate::suggest::CorrectionSuggester;
use crate::validate::{FieldValidator, ValidationReason};

/// Result of a correction pass over a proposed mapping table.
#[derive(Debug, Clone, Default)]
pub struct CorrectionOutcome {
    /// Cleaned mapping table. Every value is a member of the valid-field
    /// set that was passed in.
    pub mappings: BTreeMap<String, String>,
    /// Corrections that were applied, for audit trails.
    pub corrections: Vec<AppliedCorrection>,
    /// Entries dropped because no tier produced a usable correction,
    /// keyed by internal field with the rejected target name as value.
    pub removed_invalid: BTreeMap<String, String>,
}

/// Cleans a mapping table of internal field names to template field
/// names: valid targets pass through (case-insensitive hits are rewritten
/// to the schema spelling), invalid targets are corrected via the
/// suggestion cascade or dropped.
pub struct MappingCorrector {
    validator: FieldValidator,
    suggester: CorrectionSuggester,
}

impl MappingCorrector {
    pub fn new(validator: FieldValidator, suggester: CorrectionSuggester) -> Self {
        Self {
            validator,
            suggester,
        }
    }

    /// Validates and corrects every entry of `mappings` against
    /// `valid_fields`.
    ///
    /// Never fails: unmappable entries land in
    /// [`CorrectionOutcome::removed_invalid`] instead of erroring.
    pub fn correct(
        &self,
        mappings: &BTreeMap<String, String>,
        valid_fields: &BTreeSet<String>,
    ) -> CorrectionOutcome {
        let mut outcome = CorrectionOutcome::default();

        for (internal_field, target) in mappings {
            let verdict = self.validator.validate(target, valid_fields);
            if verdict.is_valid {
                let spelling = verdict.canonical_spelling.unwrap_or_else(|| target.clone());
                if verdict.reason == ValidationReason::CaseInsensitiveMatch {
                    tracing::debug!(
                        internal_field,
                        from = %target,
                        to = %spelling,
                        "normalized field casing"
                    );
                }
                outcome.mappings.insert(internal_field.clone(), spelling);
                continue;
            }

            match self.suggester.suggest(target, valid_fields) {
                Some(suggestion) => {
                    tracing::info!(
                        internal_field,
                        from = %target,
                        to = %suggestion.field,
                        confidence = suggestion.confidence,
                        reason = ?suggestion.reason,
                        "corrected invalid field mapping"
                    );
                    outcome
                        .mappings
                        .insert(internal_field.clone(), suggestion.field.clone());
                    outcome.corrections.push(AppliedCorrection {
                        internal_field: internal_field.clone(),
                        original: target.clone(),
                        corrected: suggestion.field,
                        confidence: suggestion.confidence,
                        reason: suggestion.reason,
                    });
                }
                None => {
                    tracing::warn!(
                        internal_field,
                        field = %target,
                        reason = ?verdict.reason,
                        "dropped unmappable field"
                    );
                    outcome
                        .removed_invalid
                        .insert(internal_field.clone(), target.clone());
                }
            }
        }

        outcome
    }
}
