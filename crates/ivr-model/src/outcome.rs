//! Caller-facing resolution outcome.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mapping::FieldMappingSet;
use crate::validation::{CompletenessMetrics, ValidationResult, ValidationStrategy};

/// The `{mapping, validation, completeness}` triple returned by the
/// resolution orchestrator, plus provenance flags.
///
/// Resolution never fails outright: callers must check
/// `validation.can_proceed` (not an error path) before treating the
/// mapping as actionable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionOutcome {
    /// Manufacturer the mapping targets.
    pub manufacturer: String,
    /// Resolved values keyed by target field name.
    pub data: BTreeMap<String, Value>,
    /// Per-field mapping provenance keyed by target field name.
    pub mappings: FieldMappingSet,
    /// Validation findings.
    pub validation: ValidationResult,
    /// Fill metrics against the template schema.
    pub completeness: CompletenessMetrics,
    /// True when AI suggestions were merged into the result.
    pub ai_enhanced: bool,
}

impl ResolutionOutcome {
    /// Strategy that produced this outcome.
    pub fn strategy(&self) -> ValidationStrategy {
        self.validation.strategy
    }
}
