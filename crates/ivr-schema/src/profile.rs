//! Manufacturer profile definitions and filesystem loading.
//!
//! Each manufacturer's document template is described by a JSON profile:
//!
//! ```json
//! {
//!   "name": "MEDLIFE SOLUTIONS",
//!   "form_id": "IVR",
//!   "fields": { "patient_name": { "required": true, "type": "string" } },
//!   "aliases": { "DOB": "patient_dob" },
//!   "critical_fields": ["graft_size_requested"]
//! }
//! ```
//!
//! Profiles are stored one file per manufacturer under a config directory,
//! named by a lowercase slug of the manufacturer name.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use ivr_model::TemplateSchema;

use crate::error::SchemaError;

/// Template description for one manufacturer/form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManufacturerProfile {
    /// Manufacturer display name as used throughout the portal.
    pub name: String,
    /// Form identifier within the manufacturer's template set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_id: Option<String>,
    /// External document-template identifier, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// Target field name to its requirements.
    #[serde(default)]
    pub fields: TemplateSchema,
    /// Transformation table: known source-field spellings to target fields.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    /// Required fields whose absence must block submission for this
    /// manufacturer, on top of the always-critical set.
    #[serde(default)]
    pub critical_fields: BTreeSet<String>,
}

impl ManufacturerProfile {
    /// Loads a profile from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let contents =
            fs::read_to_string(path).map_err(|source| SchemaError::io(path, source))?;
        let profile: Self =
            serde_json::from_str(&contents).map_err(|source| SchemaError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        if profile.fields.is_empty() {
            return Err(SchemaError::EmptyProfile {
                path: path.to_path_buf(),
            });
        }
        Ok(profile)
    }

    /// The set of valid target field names for this template.
    pub fn valid_fields(&self) -> BTreeSet<String> {
        self.fields.keys().cloned().collect()
    }

    /// Required flag per target field.
    pub fn required_flags(&self) -> BTreeMap<String, bool> {
        self.fields
            .iter()
            .map(|(name, spec)| (name.clone(), spec.required))
            .collect()
    }
}

/// Filename slug for a manufacturer: lowercase, non-alphanumerics collapsed
/// to single dashes.
pub fn manufacturer_slug(name: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Path of a manufacturer's profile file inside a config directory.
pub fn profile_path(config_dir: &Path, manufacturer: &str) -> PathBuf {
    config_dir.join(format!("{}.json", manufacturer_slug(manufacturer)))
}

/// Lists the manufacturer names of every profile in a config directory.
///
/// Unparseable files are skipped with a warning; discovery should not fail
/// because one profile is broken.
pub fn list_profiles(config_dir: &Path) -> Result<Vec<String>, SchemaError> {
    let mut names = Vec::new();
    let entries =
        fs::read_dir(config_dir).map_err(|source| SchemaError::io(config_dir, source))?;
    for entry in entries {
        let entry = entry.map_err(|source| SchemaError::io(config_dir, source))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        match ManufacturerProfile::load(&path) {
            Ok(profile) => names.push(profile.name),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "skipping unreadable profile");
            }
        }
    }
    names.sort();
    Ok(names)
}
