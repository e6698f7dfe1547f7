//! Field mapping types for source-to-template field resolution.
//!
//! A resolution run translates the raw fields collected during an intake
//! episode into the field names expected by a manufacturer's document
//! template. Each resolved field carries provenance: where the value came
//! from, how confident the resolver is, and whether a transformation was
//! applied.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a source value was transformed on its way to the target field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transformation {
    /// Value copied through unchanged.
    #[default]
    None,
    /// Value reformatted (dates, codes) before assignment.
    Format,
    /// Target resolved through an alias or canonical-name table.
    Alias,
}

/// A single resolved mapping from a source field to a template target field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Source field name from the intake episode data.
    pub source_field: String,
    /// Target field name expected by the document template.
    pub target_field: String,
    /// The value carried over to the target field.
    pub value: Value,
    /// Confidence score (0.0 to 1.0) for this mapping.
    pub confidence: f64,
    /// Transformation applied to reach the target field.
    #[serde(default)]
    pub transformation: Transformation,
}

/// A set of resolved mappings keyed by target field name.
///
/// Target names are unique within one resolution result; keying by target
/// enforces that directly.
pub type FieldMappingSet = BTreeMap<String, FieldMapping>;

impl FieldMapping {
    /// Creates a direct mapping with full confidence and no transformation.
    pub fn direct(source: impl Into<String>, target: impl Into<String>, value: Value) -> Self {
        Self {
            source_field: source.into(),
            target_field: target.into(),
            value,
            confidence: 1.0,
            transformation: Transformation::None,
        }
    }

    /// Sets the confidence score, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Sets the transformation marker.
    #[must_use]
    pub fn with_transformation(mut self, transformation: Transformation) -> Self {
        self.transformation = transformation;
        self
    }
}
