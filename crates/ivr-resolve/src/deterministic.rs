//! Deterministic source-to-target field resolution.
//!
//! Runs before any AI call: exact and case-insensitive schema hits, then
//! the manufacturer's alias transformation table, then the canonical-name
//! catalog. Both lookup tables are cleaned through the mapping corrector
//! first, so every target this resolver emits belongs to the schema.

use std::collections::{BTreeMap, BTreeSet};

use ivr_match::{MappingCorrector, normalize_name};
use ivr_model::{AppliedCorrection, FieldMapping, FieldMappingSet, TemplateSchema, Transformation};
use serde_json::Value;

/// Confidence for an exact or case-insensitive schema hit.
const DIRECT_CONFIDENCE: f64 = 1.0;
/// Confidence for a hit through the manufacturer alias table.
const ALIAS_CONFIDENCE: f64 = 0.9;
/// Confidence for a hit through the canonical-name catalog.
const CANONICAL_CONFIDENCE: f64 = 0.85;

/// Result of the deterministic pass.
#[derive(Debug, Clone, Default)]
pub struct DeterministicResolution {
    /// Resolved values keyed by target field name.
    pub data: BTreeMap<String, Value>,
    /// Provenance per resolved target field.
    pub mappings: FieldMappingSet,
    /// Source fields no lookup tier could place.
    pub unmapped_source: Vec<String>,
    /// Lookup-table targets the corrector rewrote, in audit form.
    pub corrections: Vec<AppliedCorrection>,
    /// Lookup-table targets the corrector had to drop, keyed by the
    /// table entry with the rejected target name as value.
    pub removed_invalid: BTreeMap<String, String>,
}

/// Table-driven resolver for the pre-AI tier.
pub struct DeterministicResolver {
    corrector: MappingCorrector,
}

impl DeterministicResolver {
    pub fn new(corrector: MappingCorrector) -> Self {
        Self { corrector }
    }

    /// Resolves `source` against the template schema using the
    /// manufacturer's alias table and the canonical catalog mapping.
    ///
    /// First writer wins per target field: a direct hit is never
    /// overwritten by a later alias or canonical hit.
    pub fn resolve(
        &self,
        source: &BTreeMap<String, Value>,
        schema: &TemplateSchema,
        aliases: &BTreeMap<String, String>,
        canonical: &BTreeMap<String, String>,
    ) -> DeterministicResolution {
        let valid_fields: BTreeSet<String> = schema.keys().cloned().collect();

        let alias_table = self.corrector.correct(aliases, &valid_fields);
        let canonical_table = self.corrector.correct(canonical, &valid_fields);

        let alias_by_norm: BTreeMap<String, &String> = alias_table
            .mappings
            .iter()
            .map(|(spelling, target)| (normalize_name(spelling), target))
            .collect();
        let canonical_by_norm: BTreeMap<String, &String> = canonical_table
            .mappings
            .iter()
            .map(|(name, target)| (normalize_name(name), target))
            .collect();
        let schema_by_lower: BTreeMap<String, &String> = valid_fields
            .iter()
            .map(|field| (field.to_lowercase(), field))
            .collect();

        let mut resolution = DeterministicResolution::default();
        for (source_field, value) in source {
            let normalized = normalize_name(source_field);
            let hit = if valid_fields.contains(source_field) {
                Some((source_field.clone(), DIRECT_CONFIDENCE, Transformation::None))
            } else if let Some(field) = schema_by_lower.get(&source_field.to_lowercase()) {
                Some(((*field).clone(), DIRECT_CONFIDENCE, Transformation::None))
            } else if let Some(target) = alias_by_norm.get(&normalized) {
                Some(((*target).clone(), ALIAS_CONFIDENCE, Transformation::Alias))
            } else if let Some(target) = canonical_by_norm.get(&normalized) {
                Some(((*target).clone(), CANONICAL_CONFIDENCE, Transformation::Alias))
            } else {
                None
            };

            match hit {
                Some((target, confidence, transformation)) => {
                    if resolution.mappings.contains_key(&target) {
                        tracing::debug!(
                            source_field,
                            target,
                            "target already resolved, skipping duplicate"
                        );
                        resolution.unmapped_source.push(source_field.clone());
                        continue;
                    }
                    resolution.data.insert(target.clone(), value.clone());
                    resolution.mappings.insert(
                        target.clone(),
                        FieldMapping::direct(source_field.clone(), target, value.clone())
                            .with_confidence(confidence)
                            .with_transformation(transformation),
                    );
                }
                None => resolution.unmapped_source.push(source_field.clone()),
            }
        }

        resolution.corrections.extend(alias_table.corrections);
        resolution.corrections.extend(canonical_table.corrections);
        resolution
            .removed_invalid
            .extend(alias_table.removed_invalid);
        resolution
            .removed_invalid
            .extend(canonical_table.removed_invalid);
        resolution
    }
}

#[cfg(test)]
mod tests {
    use ivr_match::{CorrectionSuggester, FieldValidator};
    use ivr_model::FieldSpec;
    use serde_json::json;

    use super::*;

    fn resolver() -> DeterministicResolver {
        DeterministicResolver::new(MappingCorrector::new(
            FieldValidator::new(),
            CorrectionSuggester::new(),
        ))
    }

    fn schema(fields: &[&str]) -> TemplateSchema {
        fields
            .iter()
            .map(|f| ((*f).to_string(), FieldSpec::optional(Default::default())))
            .collect()
    }

    fn table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn direct_hits_have_full_confidence() {
        let schema = schema(&["Patient Name"]);
        let source = [("Patient Name".to_string(), json!("Jane Doe"))]
            .into_iter()
            .collect();
        let result = resolver().resolve(&source, &schema, &BTreeMap::new(), &BTreeMap::new());
        let mapping = &result.mappings["Patient Name"];
        assert_eq!(mapping.confidence, 1.0);
        assert_eq!(mapping.transformation, Transformation::None);
    }

    #[test]
    fn case_insensitive_hits_use_schema_spelling() {
        let schema = schema(&["Patient Name"]);
        let source = [("patient name".to_string(), json!("Jane Doe"))]
            .into_iter()
            .collect();
        let result = resolver().resolve(&source, &schema, &BTreeMap::new(), &BTreeMap::new());
        assert!(result.mappings.contains_key("Patient Name"));
        assert_eq!(result.mappings["Patient Name"].source_field, "patient name");
    }

    #[test]
    fn alias_table_beats_canonical_catalog() {
        let schema = schema(&["Date of Birth"]);
        let aliases = table(&[("birth_date", "Date of Birth")]);
        let canonical = table(&[("birth_date", "Date of Birth")]);
        let source = [("Birth Date".to_string(), json!("1990-01-01"))]
            .into_iter()
            .collect();
        let result = resolver().resolve(&source, &schema, &aliases, &canonical);
        let mapping = &result.mappings["Date of Birth"];
        assert_eq!(mapping.confidence, 0.9);
        assert_eq!(mapping.transformation, Transformation::Alias);
    }

    #[test]
    fn canonical_catalog_resolves_normalized_names() {
        let schema = schema(&["Provider NPI"]);
        let canonical = table(&[("physician_npi", "Provider NPI")]);
        let source = [("Physician NPI".to_string(), json!("1234567890"))]
            .into_iter()
            .collect();
        let result = resolver().resolve(&source, &schema, &BTreeMap::new(), &canonical);
        assert_eq!(result.mappings["Provider NPI"].confidence, 0.85);
    }

    #[test]
    fn unmatched_sources_are_reported() {
        let schema = schema(&["Patient Name"]);
        let source = [("favorite_color".to_string(), json!("teal"))]
            .into_iter()
            .collect();
        let result = resolver().resolve(&source, &schema, &BTreeMap::new(), &BTreeMap::new());
        assert!(result.mappings.is_empty());
        assert_eq!(result.unmapped_source, vec!["favorite_color"]);
    }

    #[test]
    fn broken_table_targets_are_corrected_or_dropped() {
        let schema = schema(&["Date of Birth", "Patient Name"]);
        // Misspelled target corrects via fuzzy match; unrelated target drops.
        let aliases = table(&[
            ("birth_date", "Date of Brith"),
            ("shoe_size", "Shoe Size"),
        ]);
        let source = [
            ("birth_date".to_string(), json!("1990-01-01")),
            ("shoe_size".to_string(), json!("42")),
        ]
        .into_iter()
        .collect();
        let result = resolver().resolve(&source, &schema, &aliases, &BTreeMap::new());
        assert!(result.mappings.contains_key("Date of Birth"));
        assert_eq!(result.corrections.len(), 1);
        assert_eq!(result.corrections[0].corrected, "Date of Birth");
        assert_eq!(result.removed_invalid["shoe_size"], "Shoe Size");
        assert!(result.unmapped_source.contains(&"shoe_size".to_string()));
    }

    #[test]
    fn first_writer_wins_per_target() {
        let schema = schema(&["Patient Name"]);
        let aliases = table(&[("full_name", "Patient Name")]);
        let source = [
            ("Patient Name".to_string(), json!("Jane Doe")),
            ("full_name".to_string(), json!("J. Doe")),
        ]
        .into_iter()
        .collect();
        let result = resolver().resolve(&source, &schema, &aliases, &BTreeMap::new());
        assert_eq!(result.data["Patient Name"], json!("Jane Doe"));
        assert_eq!(result.unmapped_source, vec!["full_name"]);
    }
}
