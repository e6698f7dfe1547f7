//! Canonical field catalog.
//!
//! Canonical fields are the manufacturer-independent indirection layer:
//! a source field is resolved to a canonical identity first, then the
//! per-manufacturer table supplies the template's own name for it. When a
//! catalog entry has no explicit target for a manufacturer, the canonical
//! name itself is used (templates that adopt the canonical vocabulary
//! need no per-manufacturer rows).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use ivr_model::CanonicalFieldEntry;

use crate::error::SchemaError;

/// The full set of canonical field identities known to the portal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalCatalog {
    /// Entries keyed by canonical name in the serialized form.
    pub entries: Vec<CanonicalFieldEntry>,
}

impl CanonicalCatalog {
    /// Loads a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let contents =
            fs::read_to_string(path).map_err(|source| SchemaError::io(path, source))?;
        serde_json::from_str(&contents).map_err(|source| SchemaError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Looks up an entry by canonical name.
    pub fn entry(&self, canonical_name: &str) -> Option<&CanonicalFieldEntry> {
        self.entries
            .iter()
            .find(|entry| entry.canonical_name == canonical_name)
    }

    /// Canonical name to target field name for one manufacturer.
    ///
    /// Falls back to the canonical name when the entry carries no explicit
    /// target for the manufacturer.
    pub fn mapping_for(&self, manufacturer: &str) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|entry| {
                let target = entry
                    .target_for(manufacturer)
                    .unwrap_or(entry.canonical_name.as_str());
                (entry.canonical_name.clone(), target.to_string())
            })
            .collect()
    }
}

/// Compiled-in catalog covering the intake fields shared by every
/// manufacturer form. Profiles and catalog files extend this; its presence
/// guarantees canonical resolution works with no configuration at all.
pub fn default_catalog() -> CanonicalCatalog {
    let entry = |name: &str, description: &str, required: bool| CanonicalFieldEntry {
        canonical_name: name.to_string(),
        description: Some(description.to_string()),
        required,
        targets: BTreeMap::new(),
    };
    CanonicalCatalog {
        entries: vec![
            entry("patient_name", "Patient's full legal name", true),
            entry("patient_dob", "Patient date of birth", true),
            entry("patient_phone", "Patient contact phone", false),
            entry("patient_email", "Patient contact email", false),
            entry("patient_address", "Patient street address", false),
            entry("physician_name", "Treating physician name", false),
            entry("physician_npi", "Treating physician NPI", true),
            entry("facility_name", "Treating facility name", false),
            entry("primary_insurance_name", "Primary insurer name", true),
            entry("primary_member_id", "Primary insurance member id", true),
            entry("primary_policy_number", "Primary insurance policy number", false),
            entry("graft_size_requested", "Requested graft size", false),
            entry("icd10_code_1", "Primary ICD-10 diagnosis code", false),
            entry("cpt_code_1", "Primary CPT procedure code", false),
            entry("wound_type", "Wound classification", false),
            entry("wound_location", "Anatomical wound location", false),
            entry("service_date", "Anticipated date of service", false),
            entry("signature_date", "Provider signature date", false),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_maps_canonical_names_through() {
        let catalog = default_catalog();
        let mapping = catalog.mapping_for("anyone");
        assert_eq!(
            mapping.get("patient_name").map(String::as_str),
            Some("patient_name")
        );
    }

    #[test]
    fn explicit_target_wins_over_canonical_name() {
        let mut catalog = default_catalog();
        catalog
            .entries
            .iter_mut()
            .find(|e| e.canonical_name == "patient_name")
            .expect("patient_name entry")
            .targets
            .insert("MEDLIFE SOLUTIONS".to_string(), "Patient Name".to_string());
        let mapping = catalog.mapping_for("MEDLIFE SOLUTIONS");
        assert_eq!(
            mapping.get("patient_name").map(String::as_str),
            Some("Patient Name")
        );
    }
}
