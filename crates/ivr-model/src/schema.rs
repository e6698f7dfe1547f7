//! Template schema and canonical field definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Value type expected by a template field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Free-form text.
    #[default]
    String,
    /// Calendar date.
    Date,
    /// Integer quantity.
    Number,
    /// Decimal quantity (graft sizes, measurements).
    Decimal,
    /// Yes/no attestation checkbox.
    Boolean,
    /// National Provider Identifier.
    Npi,
    /// ICD-10 diagnosis code.
    Icd10,
    /// CPT procedure code.
    Cpt,
}

/// Requirements for a single template field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Whether the template marks this field as required.
    #[serde(default)]
    pub required: bool,
    /// Expected value type.
    #[serde(default, rename = "type")]
    pub field_type: FieldType,
}

impl FieldSpec {
    /// A required field of the given type.
    pub fn required(field_type: FieldType) -> Self {
        Self {
            required: true,
            field_type,
        }
    }

    /// An optional field of the given type.
    pub fn optional(field_type: FieldType) -> Self {
        Self {
            required: false,
            field_type,
        }
    }
}

/// Schema of a document template: target field name to its requirements.
///
/// Immutable per template version; owned by the schema provider.
pub type TemplateSchema = BTreeMap<String, FieldSpec>;

/// A manufacturer-independent semantic field identity.
///
/// Canonical fields sit between arbitrary source field names and
/// manufacturer-specific target field names: a source field is first
/// resolved to its canonical identity, then the manufacturer table gives
/// the template's own name for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalFieldEntry {
    /// Canonical (manufacturer-independent) name, e.g. `patient_name`.
    pub canonical_name: String,
    /// Human-readable description of the field's meaning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the field is nominally required across templates.
    #[serde(default)]
    pub required: bool,
    /// Manufacturer id to that manufacturer's target field name.
    #[serde(default)]
    pub targets: BTreeMap<String, String>,
}

impl CanonicalFieldEntry {
    /// Returns the target field name for a manufacturer, if one is defined.
    pub fn target_for(&self, manufacturer: &str) -> Option<&str> {
        self.targets.get(manufacturer).map(String::as_str)
    }
}
