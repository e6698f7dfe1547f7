//! Resolution orchestrator.
//!
//! Runs the fallback chain: deterministic table lookup, AI enhancement,
//! lenient demotion, minimal raw-input passthrough. The chain never
//! surfaces an error to the caller; the worst case is a low-confidence,
//! low-completeness outcome the caller must gate on via
//! `validation.can_proceed`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use ivr_match::{CorrectionSuggester, FieldValidator, MappingCorrector, SemanticMatcher};
use ivr_model::{
    CompletenessMetrics, CorrectionSuggestion, FieldMapping, FieldMappingSet, ResolutionOutcome,
    ValidationResult, ValidationStrategy,
};
use ivr_schema::{ManufacturerProfile, SchemaRegistry};
use serde_json::Value;

use crate::adaptive::AdaptiveValidator;
use crate::ai::{AiMapper, AiMappingRequest, TargetFieldSpec};
use crate::cache::{EnhancementCache, MemoryEnhancementCache, enhancement_cache_key};
use crate::deterministic::DeterministicResolver;
use crate::feedback::{FeedbackSink, NoopFeedback};
use crate::hash::source_data_hash;
use crate::history::{InvalidFieldStore, MemoryInvalidFieldStore};
use crate::metrics::{MetricsSnapshot, ResolutionMetrics};

/// Minimum overall completeness for the deterministic result to be
/// returned without consulting the mapping service.
const STANDARD_COMPLETENESS_THRESHOLD: f64 = 90.0;

/// Minimum confidence for an AI suggestion to be merged.
const AI_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Longest rendered sample value forwarded to the mapping service.
const SAMPLE_VALUE_LIMIT: usize = 120;

/// Top-level entry point for field-mapping resolution.
///
/// All collaborators are injected: the schema registry, the optional AI
/// mapper and semantic matcher, and the cache, invalid-field history and
/// feedback stores. Construction with just a registry yields a fully
/// working engine backed by in-memory stores and no AI.
pub struct ResolutionEngine {
    registry: Arc<SchemaRegistry>,
    ai: Option<Box<dyn AiMapper>>,
    semantic: Option<Arc<dyn SemanticMatcher>>,
    cache: Box<dyn EnhancementCache>,
    history: Box<dyn InvalidFieldStore>,
    feedback: Box<dyn FeedbackSink>,
    metrics: ResolutionMetrics,
}

impl ResolutionEngine {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            ai: None,
            semantic: None,
            cache: Box::new(MemoryEnhancementCache::new()),
            history: Box::new(MemoryInvalidFieldStore::new()),
            feedback: Box::new(NoopFeedback),
            metrics: ResolutionMetrics::new(),
        }
    }

    #[must_use]
    pub fn with_ai_mapper(mut self, mapper: Box<dyn AiMapper>) -> Self {
        self.ai = Some(mapper);
        self
    }

    #[must_use]
    pub fn with_semantic_matcher(mut self, matcher: Arc<dyn SemanticMatcher>) -> Self {
        self.semantic = Some(matcher);
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Box<dyn EnhancementCache>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_history(mut self, history: Box<dyn InvalidFieldStore>) -> Self {
        self.history = history;
        self
    }

    #[must_use]
    pub fn with_feedback(mut self, feedback: Box<dyn FeedbackSink>) -> Self {
        self.feedback = feedback;
        self
    }

    /// Resolves an intake episode's source fields onto a manufacturer's
    /// template. Never fails; callers judge the result by
    /// `validation.can_proceed`, `completeness` and the strategy flag.
    pub fn resolve(
        &self,
        manufacturer: &str,
        source: &BTreeMap<String, Value>,
    ) -> ResolutionOutcome {
        let started = Instant::now();
        let outcome = match self.resolve_guarded(manufacturer, source) {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::error!(
                    manufacturer,
                    %error,
                    "deterministic resolution failed, returning raw input"
                );
                minimal_fallback(manufacturer, source)
            }
        };

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.metrics.record_resolution(
            outcome.strategy(),
            outcome.ai_enhanced,
            elapsed_ms,
            mean_confidence(&outcome.mappings),
        );
        tracing::info!(
            manufacturer,
            strategy = ?outcome.strategy(),
            ai_enhanced = outcome.ai_enhanced,
            completeness = outcome.completeness.percentage,
            mapped_fields = outcome.mappings.len(),
            "resolution complete"
        );
        outcome
    }

    /// Forwards a submission outcome to the feedback sink.
    pub fn record_outcome(&self, outcome: &ResolutionOutcome, submission_succeeded: bool) {
        self.feedback
            .record_outcome(&outcome.manufacturer, &outcome.mappings, submission_succeeded);
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Proposes corrections for a single invalid target field, using the
    /// same validator and cascade the resolver uses internally.
    pub fn suggest_corrections(
        &self,
        manufacturer: &str,
        invalid_field: &str,
    ) -> Vec<CorrectionSuggestion> {
        let valid_fields = self.registry.valid_fields(manufacturer);
        self.suggester().suggest_all(invalid_field, &valid_fields)
    }

    fn resolve_guarded(
        &self,
        manufacturer: &str,
        source: &BTreeMap<String, Value>,
    ) -> anyhow::Result<ResolutionOutcome> {
        let deterministic = self.resolve_deterministic(manufacturer, source)?;

        if deterministic.validation.valid
            && deterministic.completeness.percentage >= STANDARD_COMPLETENESS_THRESHOLD
        {
            let mut outcome = deterministic;
            outcome.validation.strategy = ValidationStrategy::Standard;
            return Ok(outcome);
        }

        match self.enhance(manufacturer, source, &deterministic) {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                tracing::warn!(
                    manufacturer,
                    %error,
                    "enhancement stage failed, demoting validation to lenient"
                );
                let mut outcome = deterministic;
                outcome.validation = outcome.validation.into_lenient();
                Ok(outcome)
            }
        }
    }

    fn resolve_deterministic(
        &self,
        manufacturer: &str,
        source: &BTreeMap<String, Value>,
    ) -> anyhow::Result<ResolutionOutcome> {
        let profile = self.registry.try_profile(manufacturer)?;
        if profile.fields.is_empty() {
            anyhow::bail!("no template schema available for manufacturer '{manufacturer}'");
        }
        let aliases = self.registry.alias_mapping(manufacturer);
        let canonical = self.registry.canonical_mapping(manufacturer);

        let resolver = DeterministicResolver::new(self.corrector());
        let resolution = resolver.resolve(source, &profile.fields, &aliases, &canonical);

        for target in resolution.removed_invalid.values() {
            self.history.record(target);
        }

        let validator = self.validator_for(&profile);
        let mut validation = validator.validate(&resolution.data, &profile.fields);
        let completeness = validator.completeness(&resolution.data, &profile.fields);

        // Surface table problems and leftovers on the report so the
        // caller sees them without digging through logs.
        for correction in &resolution.corrections {
            validation.warnings.push(format!(
                "Lookup entry '{}' corrected from '{}' to '{}'",
                correction.internal_field, correction.original, correction.corrected
            ));
        }
        for (entry, target) in &resolution.removed_invalid {
            validation.warnings.push(format!(
                "Lookup entry '{entry}' points at unknown field '{target}' and was ignored"
            ));
        }
        if !resolution.unmapped_source.is_empty() {
            validation.warnings.push(format!(
                "{} source field(s) left unmapped: {}",
                resolution.unmapped_source.len(),
                resolution.unmapped_source.join(", ")
            ));
        }

        Ok(ResolutionOutcome {
            manufacturer: manufacturer.to_string(),
            data: resolution.data,
            mappings: resolution.mappings,
            validation,
            completeness,
            ai_enhanced: false,
        })
    }

    fn enhance(
        &self,
        manufacturer: &str,
        source: &BTreeMap<String, Value>,
        deterministic: &ResolutionOutcome,
    ) -> anyhow::Result<ResolutionOutcome> {
        let key = enhancement_cache_key(manufacturer, &source_data_hash(source));
        if let Some(hit) = self.cache.get(&key)? {
            tracing::debug!(manufacturer, "enhancement cache hit");
            return Ok(hit);
        }

        let Some(ai) = &self.ai else {
            tracing::debug!(
                manufacturer,
                "no mapping service configured, keeping deterministic result"
            );
            return Ok(deterministic.clone());
        };

        let profile = self.registry.profile(manufacturer);
        let request = build_request(&profile, source);
        let response = match ai.map_fields(&request) {
            Ok(response) => response,
            Err(error) => {
                self.metrics.record_ai_failure();
                tracing::warn!(
                    manufacturer,
                    %error,
                    "mapping service failed, keeping deterministic result"
                );
                return Ok(deterministic.clone());
            }
        };
        tracing::info!(
            manufacturer,
            suggestions = response.mappings.len(),
            overall_confidence = response.overall_confidence,
            tokens_used = response.tokens_used,
            "mapping service responded"
        );

        // AI-proposed names go through the same correction pass as any
        // other candidate target field.
        let valid_fields: std::collections::BTreeSet<String> =
            profile.fields.keys().cloned().collect();
        let proposed: BTreeMap<String, String> = response
            .mappings
            .keys()
            .map(|target| (target.clone(), target.clone()))
            .collect();
        let cleaned = self.corrector().correct(&proposed, &valid_fields);
        for rejected in cleaned.removed_invalid.values() {
            self.history.record(rejected);
            tracing::warn!(
                target = %rejected,
                "mapping service suggested a field the template does not define"
            );
        }

        let mut outcome = deterministic.clone();
        for (proposed_target, suggestion) in response.mappings {
            if suggestion.confidence < AI_CONFIDENCE_THRESHOLD {
                tracing::debug!(
                    target = %proposed_target,
                    confidence = suggestion.confidence,
                    "suggestion below threshold"
                );
                continue;
            }
            let Some(target) = cleaned.mappings.get(&proposed_target).cloned() else {
                continue;
            };
            if outcome.mappings.contains_key(&target) {
                continue;
            }
            outcome.data.insert(target.clone(), suggestion.value.clone());
            outcome.mappings.insert(
                target.clone(),
                FieldMapping {
                    source_field: suggestion.source_field.unwrap_or_default(),
                    target_field: target,
                    value: suggestion.value,
                    confidence: suggestion.confidence.clamp(0.0, 1.0),
                    transformation: suggestion.transformation.unwrap_or_default(),
                },
            );
            outcome.ai_enhanced = true;
        }

        let validator = self.validator_for(&profile);
        outcome.validation = validator.validate(&outcome.data, &profile.fields);
        outcome.completeness = validator.completeness(&outcome.data, &profile.fields);
        outcome.validation.warnings.extend(response.warnings);
        for rejected in cleaned.removed_invalid.values() {
            outcome.validation.warnings.push(format!(
                "Mapping service proposed unknown field '{rejected}'; ignored"
            ));
        }

        if let Err(error) = self.cache.put(&key, outcome.clone()) {
            tracing::warn!(manufacturer, %error, "failed to store enhancement result");
        }
        Ok(outcome)
    }

    fn validator_for(&self, profile: &ManufacturerProfile) -> AdaptiveValidator {
        AdaptiveValidator::new().with_critical_overrides(profile.critical_fields.clone())
    }

    fn corrector(&self) -> MappingCorrector {
        let validator = FieldValidator::new().with_known_invalid(self.history.snapshot());
        MappingCorrector::new(validator, self.suggester())
    }

    fn suggester(&self) -> CorrectionSuggester {
        let mut suggester = CorrectionSuggester::new();
        if let Some(matcher) = &self.semantic {
            suggester = suggester
                .with_semantic_matcher(Box::new(SharedSemanticMatcher(Arc::clone(matcher))));
        }
        suggester
    }
}

/// Adapter so one shared semantic matcher can back the per-resolution
/// suggesters.
struct SharedSemanticMatcher(Arc<dyn SemanticMatcher>);

impl SemanticMatcher for SharedSemanticMatcher {
    fn suggest(
        &self,
        invalid_field: &str,
        valid_fields: &[String],
    ) -> anyhow::Result<Vec<CorrectionSuggestion>> {
        self.0.suggest(invalid_field, valid_fields)
    }
}

fn minimal_fallback(manufacturer: &str, source: &BTreeMap<String, Value>) -> ResolutionOutcome {
    let mut validation = ValidationResult::passing(ValidationStrategy::MinimalFallback);
    validation
        .warnings
        .push("resolution fell back to raw input data".to_string());
    ResolutionOutcome {
        manufacturer: manufacturer.to_string(),
        data: source.clone(),
        mappings: FieldMappingSet::new(),
        validation,
        completeness: CompletenessMetrics::minimal_placeholder(),
        ai_enhanced: false,
    }
}

fn build_request(profile: &ManufacturerProfile, source: &BTreeMap<String, Value>) -> AiMappingRequest {
    let source_fields = source
        .iter()
        .map(|(name, value)| (name.clone(), value_kind(value).to_string()))
        .collect();
    let sample_data = source
        .iter()
        .map(|(name, value)| (name.clone(), render_sample(value)))
        .collect();
    let target_fields = profile
        .fields
        .iter()
        .map(|(name, spec)| TargetFieldSpec {
            name: name.clone(),
            field_type: spec.field_type,
            required: spec.required,
        })
        .collect();
    let context = match &profile.form_id {
        Some(form_id) => format!(
            "Intake field mapping for manufacturer '{}', form '{form_id}'",
            profile.name
        ),
        None => format!("Intake field mapping for manufacturer '{}'", profile.name),
    };
    AiMappingRequest {
        source_fields,
        target_fields,
        sample_data,
        context,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn render_sample(value: &Value) -> String {
    let rendered = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    rendered.chars().take(SAMPLE_VALUE_LIMIT).collect()
}

fn mean_confidence(mappings: &FieldMappingSet) -> Option<f64> {
    if mappings.is_empty() {
        return None;
    }
    let sum: f64 = mappings.values().map(|m| m.confidence).sum();
    Some(sum / mappings.len() as f64)
}
