pub mod correction;
pub mod mapping;
pub mod outcome;
pub mod schema;
pub mod validation;

pub use correction::{AppliedCorrection, CorrectionReason, CorrectionSuggestion};
pub use mapping::{FieldMapping, FieldMappingSet, Transformation};
pub use outcome::ResolutionOutcome;
pub use schema::{CanonicalFieldEntry, FieldSpec, FieldType, TemplateSchema};
pub use validation::{CompletenessMetrics, ValidationResult, ValidationStrategy};
