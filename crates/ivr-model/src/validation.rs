//! Validation and completeness types for resolved mappings.

use serde::{Deserialize, Serialize};

/// Which validation strategy produced a [`ValidationResult`].
///
/// Callers must inspect this (together with completeness) before trusting
/// a result: the fallback strategies deliberately weaken guarantees to
/// keep the pipeline moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStrategy {
    /// Deterministic resolution passed on its own.
    Standard,
    /// Adaptive validation with critical/optional classification.
    Adaptive,
    /// Lenient fallback: errors demoted to warnings, `valid` forced true.
    FallbackLenient,
    /// Minimal fallback: raw input passed through with placeholder metrics.
    MinimalFallback,
}

/// Outcome of validating a resolved mapping against a template schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True when no critical required field is missing.
    pub valid: bool,
    /// Blocking problems (critical required fields missing).
    pub errors: Vec<String>,
    /// Non-blocking problems (optional required fields missing).
    pub warnings: Vec<String>,
    /// Required fields whose absence blocks downstream processing.
    pub critical_missing: Vec<String>,
    /// Required fields missing but acceptable in small numbers.
    pub optional_missing: Vec<String>,
    /// Whether the caller may proceed to document generation.
    pub can_proceed: bool,
    /// Strategy that produced this result.
    pub strategy: ValidationStrategy,
}

impl ValidationResult {
    /// A passing result with no findings.
    pub fn passing(strategy: ValidationStrategy) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            critical_missing: Vec::new(),
            optional_missing: Vec::new(),
            can_proceed: true,
            strategy,
        }
    }

    /// Demotes all errors to warnings and forces the result valid.
    ///
    /// This is the lenient-fallback policy carried over from the original
    /// system: downstream consumers get a usable result and must judge
    /// trustworthiness from `strategy` and completeness instead.
    #[must_use]
    pub fn into_lenient(mut self) -> Self {
        self.warnings.append(&mut self.errors);
        self.valid = true;
        self.can_proceed = true;
        self.strategy = ValidationStrategy::FallbackLenient;
        self
    }
}

/// Fill metrics for a resolved mapping against its template schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletenessMetrics {
    /// Filled fields over all template fields, as a percentage.
    pub percentage: f64,
    /// Filled required fields over required fields, as a percentage.
    /// 100 when the template has no required fields.
    pub required_percentage: f64,
    /// Number of template fields with a usable value.
    pub filled_fields: usize,
    /// Total number of template fields.
    pub total_fields: usize,
    /// Number of required fields with a usable value.
    pub filled_required: usize,
    /// Total number of required fields.
    pub total_required: usize,
}

impl CompletenessMetrics {
    /// Metrics for an empty schema.
    pub fn empty() -> Self {
        Self {
            percentage: 0.0,
            required_percentage: 100.0,
            filled_fields: 0,
            total_fields: 0,
            filled_required: 0,
            total_required: 0,
        }
    }

    /// Placeholder metrics used by the minimal fallback path. Only the
    /// overall percentage carries the legacy 50 marker; nothing was
    /// measured, so every other figure is zero.
    pub fn minimal_placeholder() -> Self {
        Self {
            percentage: 50.0,
            required_percentage: 0.0,
            filled_fields: 0,
            total_fields: 0,
            filled_required: 0,
            total_required: 0,
        }
    }
}
