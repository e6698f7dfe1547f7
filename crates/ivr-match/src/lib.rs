//! Field-name matching for intake form mappings: similarity scoring,
//! validation against template schemas, and automatic correction of
//! near-miss field names.

#![deny(unsafe_code)]

pub mod correct;
pub mod metaphone;
pub mod score;
pub mod semantic;
pub mod suggest;
pub mod utils;
pub mod validate;

pub use correct::{CorrectionOutcome, MappingCorrector};
pub use metaphone::metaphone;
pub use score::{SimilarityBreakdown, similarity, similarity_breakdown};
pub use semantic::{NoSemanticMatcher, SemanticMatcher};
pub use suggest::CorrectionSuggester;
pub use utils::normalize_name;
pub use validate::{FieldValidation, FieldValidator, GENERIC_FIELD_BLACKLIST, ValidationReason};
