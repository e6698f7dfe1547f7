#![deny(unsafe_code)]

//! Field-mapping resolution engine for the intake portal.
//!
//! Translates the arbitrary source fields of an intake episode into the
//! target fields of a manufacturer's document template, through a
//! fallback chain of deterministic lookup, AI enhancement, lenient
//! demotion and raw passthrough. The engine never errors: every call
//! yields a `{mapping, validation, completeness}` outcome whose
//! trustworthiness the caller judges from its strategy flag.

pub mod adaptive;
pub mod ai;
pub mod cache;
pub mod deterministic;
pub mod engine;
pub mod feedback;
pub mod hash;
pub mod history;
pub mod metrics;

pub use adaptive::{
    ALWAYS_CRITICAL_FIELDS, AdaptiveValidator, OPTIONAL_GAP_LIMIT, is_field_filled,
};
pub use ai::{
    AI_RETRY_LIMIT, AiFieldSuggestion, AiMapper, AiMapperError, AiMappingRequest,
    AiMappingResponse, RetryingMapper, TargetFieldSpec,
};
pub use cache::{
    DEFAULT_ENHANCEMENT_TTL_HOURS, EnhancementCache, MemoryEnhancementCache,
    enhancement_cache_key,
};
pub use deterministic::{DeterministicResolution, DeterministicResolver};
pub use engine::ResolutionEngine;
pub use feedback::{FeedbackEvent, FeedbackSink, MemoryFeedback, NoopFeedback};
pub use hash::source_data_hash;
pub use history::{INVALID_FIELD_RETENTION_DAYS, InvalidFieldStore, MemoryInvalidFieldStore};
pub use metrics::{MetricsSnapshot, ResolutionMetrics, SAMPLE_WINDOW};
