//! Adaptive validation and completeness metrics.
//!
//! Classifies missing required fields as critical (blocks submission) or
//! optional (tolerated in small numbers) and measures how much of the
//! template the resolved data actually fills.

use std::collections::{BTreeMap, BTreeSet};

use ivr_model::{CompletenessMetrics, TemplateSchema, ValidationResult, ValidationStrategy};
use serde_json::Value;

/// Fields whose absence always blocks downstream processing, regardless
/// of manufacturer: patient identity, DOB, physician NPI, and primary
/// insurance identity.
pub const ALWAYS_CRITICAL_FIELDS: [&str; 5] = [
    "patient_name",
    "patient_dob",
    "physician_npi",
    "primary_insurance_name",
    "primary_member_id",
];

/// How many missing optional fields a submission may carry.
pub const OPTIONAL_GAP_LIMIT: usize = 3;

/// Whether a resolved value counts as filled.
///
/// `"0"` and `0` are legitimate values; empty strings, nulls, `false`
/// and empty collections are not. Absent fields are never filled.
pub fn is_field_filled(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(_)) => true,
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(entries)) => !entries.is_empty(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Validator with per-manufacturer critical-field overrides.
#[derive(Debug, Clone, Default)]
pub struct AdaptiveValidator {
    critical_overrides: BTreeSet<String>,
}

impl AdaptiveValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds manufacturer-specific critical fields on top of the built-in
    /// always-critical list.
    #[must_use]
    pub fn with_critical_overrides(mut self, overrides: BTreeSet<String>) -> Self {
        self.critical_overrides = overrides;
        self
    }

    fn is_critical(&self, field: &str) -> bool {
        ALWAYS_CRITICAL_FIELDS.contains(&field) || self.critical_overrides.contains(field)
    }

    /// Validates resolved data against the template schema.
    ///
    /// A missing required field is critical when it appears in the
    /// always-critical list or the manufacturer overrides; otherwise it
    /// is optional and a handful of optional gaps do not block the
    /// submission.
    pub fn validate(
        &self,
        data: &BTreeMap<String, Value>,
        schema: &TemplateSchema,
    ) -> ValidationResult {
        let mut critical_missing = Vec::new();
        let mut optional_missing = Vec::new();
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for (field, spec) in schema {
            if !spec.required || is_field_filled(data.get(field)) {
                continue;
            }
            if self.is_critical(field) {
                errors.push(format!("Critical field '{field}' is missing"));
                critical_missing.push(field.clone());
            } else {
                warnings.push(format!("Optional field '{field}' is missing"));
                optional_missing.push(field.clone());
            }
        }

        let valid = critical_missing.is_empty();
        let can_proceed =
            valid || (critical_missing.is_empty() && optional_missing.len() <= OPTIONAL_GAP_LIMIT);

        ValidationResult {
            valid,
            errors,
            warnings,
            critical_missing,
            optional_missing,
            can_proceed,
            strategy: ValidationStrategy::Adaptive,
        }
    }

    /// Fill metrics for resolved data against the template schema.
    pub fn completeness(
        &self,
        data: &BTreeMap<String, Value>,
        schema: &TemplateSchema,
    ) -> CompletenessMetrics {
        let total_fields = schema.len();
        let total_required = schema.values().filter(|spec| spec.required).count();
        let filled_fields = schema
            .keys()
            .filter(|field| is_field_filled(data.get(*field)))
            .count();
        let filled_required = schema
            .iter()
            .filter(|(field, spec)| spec.required && is_field_filled(data.get(*field)))
            .count();

        let percentage = if total_fields == 0 {
            100.0
        } else {
            round2(filled_fields as f64 / total_fields as f64 * 100.0)
        };
        let required_percentage = if total_required == 0 {
            100.0
        } else {
            round2(filled_required as f64 / total_required as f64 * 100.0)
        };

        CompletenessMetrics {
            percentage,
            required_percentage,
            filled_fields,
            total_fields,
            filled_required,
            total_required,
        }
    }
}
