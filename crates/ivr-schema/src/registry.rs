//! Cached, read-heavy access to manufacturer template schemas.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use ivr_model::TemplateSchema;

use crate::catalog::{CanonicalCatalog, default_catalog};
use crate::defaults::default_schema;
use crate::error::SchemaError;
use crate::profile::{ManufacturerProfile, manufacturer_slug, profile_path};

/// Provider of template schemas, alias tables and canonical mappings.
///
/// Lookups are cached per manufacturer; the cache is dropped through
/// [`SchemaRegistry::invalidate`], which external template-metadata change
/// events are expected to trigger. A manufacturer with no profile file is
/// served the built-in default schema so resolution can always proceed; a
/// profile file that exists but cannot be loaded is an error through
/// [`SchemaRegistry::try_profile`].
pub struct SchemaRegistry {
    config_dir: Option<PathBuf>,
    catalog: CanonicalCatalog,
    cache: Mutex<BTreeMap<String, Arc<ManufacturerProfile>>>,
}

impl SchemaRegistry {
    /// Registry backed only by compiled-in defaults.
    pub fn new() -> Self {
        Self {
            config_dir: None,
            catalog: default_catalog(),
            cache: Mutex::new(BTreeMap::new()),
        }
    }

    /// Loads manufacturer profiles from JSON files in `config_dir`.
    #[must_use]
    pub fn with_config_dir(mut self, config_dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(config_dir.into());
        self
    }

    /// Replaces the canonical field catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: CanonicalCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// The canonical field catalog in use.
    pub fn catalog(&self) -> &CanonicalCatalog {
        &self.catalog
    }

    /// The profile for a manufacturer, loading and caching it on first use.
    /// Load failures are absorbed: the built-in default schema is served.
    pub fn profile(&self, manufacturer: &str) -> Arc<ManufacturerProfile> {
        match self.try_profile(manufacturer) {
            Ok(profile) => profile,
            Err(error) => {
                tracing::warn!(
                    manufacturer,
                    %error,
                    "profile unreadable, serving built-in default schema"
                );
                Arc::new(Self::default_profile(manufacturer))
            }
        }
    }

    /// Like [`Self::profile`], but a profile file that exists and cannot
    /// be read or parsed is reported instead of papered over. A
    /// manufacturer without a profile file still gets the built-in
    /// default schema.
    pub fn try_profile(
        &self,
        manufacturer: &str,
    ) -> Result<Arc<ManufacturerProfile>, SchemaError> {
        let key = manufacturer_slug(manufacturer);
        if let Some(profile) = self.cache.lock().expect("schema cache poisoned").get(&key) {
            return Ok(Arc::clone(profile));
        }

        let profile = Arc::new(self.load_profile(manufacturer)?);
        self.cache
            .lock()
            .expect("schema cache poisoned")
            .insert(key, Arc::clone(&profile));
        Ok(profile)
    }

    fn load_profile(&self, manufacturer: &str) -> Result<ManufacturerProfile, SchemaError> {
        if let Some(dir) = &self.config_dir {
            let path = profile_path(dir, manufacturer);
            if path.is_file() {
                let profile = ManufacturerProfile::load(&path)?;
                tracing::debug!(manufacturer, path = %path.display(), "loaded profile");
                return Ok(profile);
            }
            tracing::debug!(
                manufacturer,
                path = %path.display(),
                "no profile file, using built-in default schema"
            );
        }
        Ok(Self::default_profile(manufacturer))
    }

    fn default_profile(manufacturer: &str) -> ManufacturerProfile {
        ManufacturerProfile {
            name: manufacturer.to_string(),
            fields: default_schema(),
            ..ManufacturerProfile::default()
        }
    }

    /// Template schema for a manufacturer's form.
    pub fn template_schema(&self, manufacturer: &str) -> TemplateSchema {
        self.profile(manufacturer).fields.clone()
    }

    /// The set of valid target field names for a manufacturer's template.
    pub fn valid_fields(&self, manufacturer: &str) -> BTreeSet<String> {
        self.profile(manufacturer).valid_fields()
    }

    /// Transformation table: source-field spellings to target fields.
    pub fn alias_mapping(&self, manufacturer: &str) -> BTreeMap<String, String> {
        self.profile(manufacturer).aliases.clone()
    }

    /// Canonical name to manufacturer target field.
    pub fn canonical_mapping(&self, manufacturer: &str) -> BTreeMap<String, String> {
        self.catalog.mapping_for(manufacturer)
    }

    /// Required flag per target field.
    pub fn required_flags(&self, manufacturer: &str) -> BTreeMap<String, bool> {
        self.profile(manufacturer).required_flags()
    }

    /// Manufacturer-specific critical-field overrides.
    pub fn critical_fields(&self, manufacturer: &str) -> BTreeSet<String> {
        self.profile(manufacturer).critical_fields.clone()
    }

    /// Drops every cached profile. Called when template metadata changes
    /// upstream.
    pub fn invalidate(&self) {
        self.cache.lock().expect("schema cache poisoned").clear();
    }

    /// Drops one manufacturer's cached profile.
    pub fn invalidate_manufacturer(&self, manufacturer: &str) {
        self.cache
            .lock()
            .expect("schema cache poisoned")
            .remove(&manufacturer_slug(manufacturer));
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_manufacturer_gets_default_schema() {
        let registry = SchemaRegistry::new();
        let schema = registry.template_schema("NOBODY INC");
        assert!(schema.contains_key("patient_name"));
        assert!(schema["physician_npi"].required);
    }

    #[test]
    fn profiles_are_cached_until_invalidated() {
        let registry = SchemaRegistry::new();
        let first = registry.profile("NOBODY INC");
        let second = registry.profile("nobody inc");
        assert!(Arc::ptr_eq(&first, &second));

        registry.invalidate();
        let third = registry.profile("NOBODY INC");
        assert!(!Arc::ptr_eq(&first, &third));
    }
}
