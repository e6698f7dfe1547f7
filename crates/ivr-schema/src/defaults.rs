//! Built-in fallback schema.
//!
//! When a manufacturer has no profile on disk (or the profile cannot be
//! read) the registry serves this minimal schema instead of failing the
//! resolution outright. It covers the identity, provider and insurance
//! fields every intake form carries, plus the common wound-care extras.

use ivr_model::{FieldSpec, FieldType, TemplateSchema};

/// Minimal template schema used when no manufacturer profile is available.
pub fn default_schema() -> TemplateSchema {
    let mut schema = TemplateSchema::new();
    schema.insert(
        "patient_name".to_string(),
        FieldSpec::required(FieldType::String),
    );
    schema.insert(
        "patient_dob".to_string(),
        FieldSpec::required(FieldType::Date),
    );
    schema.insert(
        "physician_npi".to_string(),
        FieldSpec::required(FieldType::Npi),
    );
    schema.insert(
        "primary_insurance_name".to_string(),
        FieldSpec::required(FieldType::String),
    );
    schema.insert(
        "primary_member_id".to_string(),
        FieldSpec::required(FieldType::String),
    );
    schema.insert(
        "graft_size_requested".to_string(),
        FieldSpec::optional(FieldType::Decimal),
    );
    schema.insert(
        "icd10_code_1".to_string(),
        FieldSpec::optional(FieldType::Icd10),
    );
    schema.insert(
        "cpt_code_1".to_string(),
        FieldSpec::optional(FieldType::Cpt),
    );
    schema.insert(
        "wound_type".to_string(),
        FieldSpec::optional(FieldType::String),
    );
    schema.insert(
        "wound_location".to_string(),
        FieldSpec::optional(FieldType::String),
    );
    schema.insert(
        "failed_conservative_treatment".to_string(),
        FieldSpec::optional(FieldType::Boolean),
    );
    schema.insert(
        "information_accurate".to_string(),
        FieldSpec::optional(FieldType::Boolean),
    );
    schema.insert(
        "medical_necessity_established".to_string(),
        FieldSpec::optional(FieldType::Boolean),
    );
    schema.insert(
        "maintain_documentation".to_string(),
        FieldSpec::optional(FieldType::Boolean),
    );
    schema
}
