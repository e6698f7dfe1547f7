#![deny(unsafe_code)]

//! Canonical schema provider for the IVR field-mapping engine.
//!
//! Supplies, per manufacturer: the template schema (valid target fields
//! with required/type flags), the alias transformation table, the
//! canonical-name mapping, and critical-field overrides. Backed by JSON
//! profile files with compiled-in defaults as the ultimate fallback.

pub mod catalog;
pub mod defaults;
pub mod error;
pub mod profile;
pub mod registry;

pub use catalog::{CanonicalCatalog, default_catalog};
pub use defaults::default_schema;
pub use error::SchemaError;
pub use profile::{ManufacturerProfile, list_profiles, manufacturer_slug, profile_path};
pub use registry::SchemaRegistry;
