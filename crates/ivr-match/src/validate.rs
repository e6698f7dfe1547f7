//! Field-name validation against a template's valid-field set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Generic single-word names rejected outright: they are too ambiguous to
/// be safely auto-mapped even when a template happens to use them.
pub const GENERIC_FIELD_BLACKLIST: [&str; 5] = ["Name", "Email", "Phone", "Date", "Address"];

/// Why a candidate field name was accepted or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationReason {
    /// Exact member of the valid-field set.
    ExactMatch,
    /// Member of the valid-field set up to casing.
    CaseInsensitiveMatch,
    /// Generic blacklisted name or previously recorded unmappable field.
    KnownInvalidPattern,
    /// Not present in the valid-field set.
    NotFound,
}

/// Verdict for a single candidate target field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValidation {
    /// Whether the candidate may be used as a target field.
    pub is_valid: bool,
    /// Why.
    pub reason: ValidationReason,
    /// Schema spelling of the field for case-insensitive hits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_spelling: Option<String>,
}

/// Classifies candidate target field names as valid or invalid.
///
/// The known-invalid set is seeded from the resolution engine's
/// invalid-field history so fields that repeatedly failed to map are
/// rejected without re-running the correction cascade.
#[derive(Debug, Clone, Default)]
pub struct FieldValidator {
    known_invalid: BTreeSet<String>,
}

impl FieldValidator {
    /// Validator with only the built-in generic blacklist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the validator with previously recorded unmappable names.
    #[must_use]
    pub fn with_known_invalid(mut self, history: BTreeSet<String>) -> Self {
        self.known_invalid = history;
        self
    }

    /// Validates a candidate against the template's valid-field set.
    ///
    /// Check order, first match wins: exact membership, case-insensitive
    /// membership, generic blacklist, recorded invalid history.
    pub fn validate(&self, candidate: &str, valid_fields: &BTreeSet<String>) -> FieldValidation {
        if valid_fields.contains(candidate) {
            return FieldValidation {
                is_valid: true,
                reason: ValidationReason::ExactMatch,
                canonical_spelling: None,
            };
        }

        if let Some(spelling) = valid_fields
            .iter()
            .find(|field| field.eq_ignore_ascii_case(candidate))
        {
            return FieldValidation {
                is_valid: true,
                reason: ValidationReason::CaseInsensitiveMatch,
                canonical_spelling: Some(spelling.clone()),
            };
        }

        if GENERIC_FIELD_BLACKLIST.contains(&candidate) || self.known_invalid.contains(candidate) {
            return FieldValidation {
                is_valid: false,
                reason: ValidationReason::KnownInvalidPattern,
                canonical_spelling: None,
            };
        }

        FieldValidation {
            is_valid: false,
            reason: ValidationReason::NotFound,
            canonical_spelling: None,
        }
    }
}
