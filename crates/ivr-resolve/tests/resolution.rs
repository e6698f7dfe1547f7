//! End-to-end resolution through the fallback chain, using the built-in
//! default schema and canonical catalog.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ivr_resolve::{
    AiFieldSuggestion, AiMapper, AiMapperError, AiMappingRequest, AiMappingResponse,
    EnhancementCache, InvalidFieldStore, MemoryFeedback, MemoryInvalidFieldStore, ResolutionEngine,
};
use ivr_model::{ResolutionOutcome, ValidationStrategy};
use ivr_schema::{SchemaRegistry, profile_path};
use serde_json::{Value, json};

fn engine() -> ResolutionEngine {
    ResolutionEngine::new(Arc::new(SchemaRegistry::new()))
}

fn data(entries: &[(&str, Value)]) -> BTreeMap<String, Value> {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

/// Every field of the built-in default schema, filled.
fn complete_source() -> BTreeMap<String, Value> {
    data(&[
        ("patient_name", json!("Jane Doe")),
        ("patient_dob", json!("1990-01-01")),
        ("physician_npi", json!("1234567890")),
        ("primary_insurance_name", json!("Acme Health")),
        ("primary_member_id", json!("M-100-200")),
        ("graft_size_requested", json!("4.5")),
        ("icd10_code_1", json!("L97.419")),
        ("cpt_code_1", json!("15275")),
        ("wound_type", json!("diabetic ulcer")),
        ("wound_location", json!("left heel")),
        ("failed_conservative_treatment", json!(true)),
        ("information_accurate", json!(true)),
        ("medical_necessity_established", json!(true)),
        ("maintain_documentation", json!(true)),
    ])
}

struct ScriptedMapper {
    calls: Arc<Mutex<usize>>,
    result: Result<AiMappingResponse, ()>,
}

impl ScriptedMapper {
    fn failing(calls: Arc<Mutex<usize>>) -> Self {
        Self {
            calls,
            result: Err(()),
        }
    }

    fn responding(calls: Arc<Mutex<usize>>, response: AiMappingResponse) -> Self {
        Self {
            calls,
            result: Ok(response),
        }
    }
}

impl AiMapper for ScriptedMapper {
    fn map_fields(&self, _request: &AiMappingRequest) -> Result<AiMappingResponse, AiMapperError> {
        *self.calls.lock().unwrap() += 1;
        match &self.result {
            Ok(response) => Ok(response.clone()),
            Err(()) => Err(AiMapperError::Timeout(Duration::from_secs(30))),
        }
    }
}

/// Cache double whose backend is always down.
struct FailingCache;

impl EnhancementCache for FailingCache {
    fn get(&self, _key: &str) -> anyhow::Result<Option<ResolutionOutcome>> {
        anyhow::bail!("cache backend unavailable")
    }

    fn put(&self, _key: &str, _outcome: ResolutionOutcome) -> anyhow::Result<()> {
        anyhow::bail!("cache backend unavailable")
    }

    fn purge_expired(&self) {}
}

fn temp_config_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("ivr_resolve_cfg_{stamp}"));
    fs::create_dir_all(&dir).expect("create config dir");
    dir
}

fn response(mappings: &[(&str, Value, f64, Option<&str>)]) -> AiMappingResponse {
    AiMappingResponse {
        mappings: mappings
            .iter()
            .map(|(target, value, confidence, source)| {
                (
                    (*target).to_string(),
                    AiFieldSuggestion {
                        value: value.clone(),
                        confidence: *confidence,
                        source_field: source.map(str::to_string),
                        transformation: None,
                    },
                )
            })
            .collect(),
        unmapped_source_fields: Vec::new(),
        unmapped_target_fields: Vec::new(),
        overall_confidence: 0.85,
        warnings: Vec::new(),
        tokens_used: 250,
    }
}

#[test]
fn complete_input_resolves_deterministically() {
    let calls = Arc::new(Mutex::new(0));
    let engine = engine().with_ai_mapper(Box::new(ScriptedMapper::failing(Arc::clone(&calls))));

    let outcome = engine.resolve("MEDLIFE SOLUTIONS", &complete_source());

    assert_eq!(outcome.strategy(), ValidationStrategy::Standard);
    assert!(outcome.validation.valid);
    assert_eq!(outcome.completeness.percentage, 100.0);
    assert!(!outcome.ai_enhanced);
    assert_eq!(*calls.lock().unwrap(), 0, "mapping service must not be consulted");
}

#[test]
fn mapper_timeout_falls_back_to_deterministic_result() {
    let calls = Arc::new(Mutex::new(0));
    let engine = engine().with_ai_mapper(Box::new(ScriptedMapper::failing(Arc::clone(&calls))));

    let source = data(&[
        ("patient_name", json!("Jane Doe")),
        ("patient_dob", json!("1990-01-01")),
        ("physician_npi", json!("1234567890")),
        ("primary_insurance_name", json!("Acme Health")),
        ("primary_member_id", json!("M-100-200")),
    ]);
    let outcome = engine.resolve("MEDLIFE SOLUTIONS", &source);

    assert_eq!(*calls.lock().unwrap(), 1);
    assert!(!outcome.ai_enhanced);
    assert_eq!(outcome.strategy(), ValidationStrategy::Adaptive);
    assert!(outcome.validation.valid);
    assert_eq!(outcome.mappings.len(), 5);
    assert_eq!(engine.metrics().ai_failures, 1);
}

#[test]
fn confident_suggestions_are_merged_and_unknown_targets_rejected() {
    let calls = Arc::new(Mutex::new(0));
    let history = Arc::new(MemoryInvalidFieldStore::new());
    let engine = ResolutionEngine::new(Arc::new(SchemaRegistry::new()))
        .with_history(Box::new(Arc::clone(&history)))
        .with_ai_mapper(Box::new(ScriptedMapper::responding(
            Arc::clone(&calls),
            response(&[
                ("wound_type", json!("venous ulcer"), 0.9, Some("ulcer_kind")),
                ("wound_location", json!("left calf"), 0.5, None),
                ("Quarterly Revenue", json!("n/a"), 0.95, None),
            ]),
        )));

    let source = data(&[
        ("patient_name", json!("Jane Doe")),
        ("patient_dob", json!("1990-01-01")),
        ("physician_npi", json!("1234567890")),
        ("primary_insurance_name", json!("Acme Health")),
        ("primary_member_id", json!("M-100-200")),
    ]);
    let outcome = engine.resolve("MEDLIFE SOLUTIONS", &source);

    assert!(outcome.ai_enhanced);
    assert_eq!(outcome.data["wound_type"], json!("venous ulcer"));
    assert_eq!(outcome.mappings["wound_type"].source_field, "ulcer_kind");
    assert_eq!(outcome.mappings["wound_type"].confidence, 0.9);

    // Below-threshold and unknown-target suggestions never land.
    assert!(!outcome.data.contains_key("wound_location"));
    assert!(!outcome.data.contains_key("Quarterly Revenue"));
    assert!(history.contains("Quarterly Revenue"));

    let valid_fields = ivr_schema::SchemaRegistry::new().valid_fields("MEDLIFE SOLUTIONS");
    for target in outcome.mappings.keys() {
        assert!(valid_fields.contains(target), "{target} not in schema");
    }
}

#[test]
fn identical_inputs_hit_the_cache_with_identical_results() {
    let calls = Arc::new(Mutex::new(0));
    let engine = engine().with_ai_mapper(Box::new(ScriptedMapper::responding(
        Arc::clone(&calls),
        response(&[("wound_type", json!("venous ulcer"), 0.9, None)]),
    )));

    let source = data(&[
        ("patient_name", json!("Jane Doe")),
        ("patient_dob", json!("1990-01-01")),
        ("physician_npi", json!("1234567890")),
        ("primary_insurance_name", json!("Acme Health")),
        ("primary_member_id", json!("M-100-200")),
    ]);

    let cold = engine.resolve("MEDLIFE SOLUTIONS", &source);
    let warm = engine.resolve("MEDLIFE SOLUTIONS", &source);

    assert_eq!(*calls.lock().unwrap(), 1, "second resolution must reuse the cache");
    assert_eq!(cold.mappings, warm.mappings);
    assert_eq!(cold.validation, warm.validation);
    assert_eq!(cold.completeness, warm.completeness);
}

#[test]
fn cache_backend_failure_demotes_to_lenient() {
    let engine = engine().with_cache(Box::new(FailingCache));
    let source = data(&[("patient_name", json!("Jane Doe"))]);

    let outcome = engine.resolve("MEDLIFE SOLUTIONS", &source);

    assert_eq!(outcome.strategy(), ValidationStrategy::FallbackLenient);
    assert!(outcome.validation.valid);
    assert!(outcome.validation.can_proceed);
    assert!(outcome.validation.errors.is_empty());
    assert!(!outcome.validation.warnings.is_empty(), "demoted errors become warnings");
    assert!(!outcome.validation.critical_missing.is_empty());
    assert_eq!(engine.metrics().fallback_lenient, 1);
}

#[test]
fn corrupt_profile_falls_back_to_raw_input() {
    let dir = temp_config_dir();
    fs::write(profile_path(&dir, "BROKEN"), "{not json").expect("write junk");

    let engine = ResolutionEngine::new(Arc::new(
        SchemaRegistry::new().with_config_dir(&dir),
    ));
    let source = data(&[("patient_name", json!("Jane Doe"))]);
    let outcome = engine.resolve("BROKEN", &source);

    assert_eq!(outcome.strategy(), ValidationStrategy::MinimalFallback);
    assert_eq!(outcome.data, source);
    assert!(outcome.mappings.is_empty());
    assert_eq!(outcome.completeness.percentage, 50.0);
    assert_eq!(engine.metrics().minimal_fallback, 1);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn canonical_names_resolve_source_spelling_variants() {
    let engine = engine();
    let source = data(&[
        ("Patient Name", json!("Jane Doe")),
        ("Patient DOB", json!("1990-01-01")),
    ]);
    let outcome = engine.resolve("MEDLIFE SOLUTIONS", &source);

    assert_eq!(outcome.data["patient_name"], json!("Jane Doe"));
    assert_eq!(outcome.data["patient_dob"], json!("1990-01-01"));
    assert_eq!(outcome.mappings["patient_name"].confidence, 0.85);
}

#[test]
fn submission_outcomes_reach_the_feedback_sink() {
    let sink = Arc::new(MemoryFeedback::new());
    let engine = engine().with_feedback(Box::new(Arc::clone(&sink)));

    let outcome = engine.resolve("MEDLIFE SOLUTIONS", &complete_source());
    engine.record_outcome(&outcome, true);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert!(events[0].submission_succeeded);
    assert_eq!(events[0].manufacturer, "MEDLIFE SOLUTIONS");
}

#[test]
fn metrics_count_each_resolution() {
    let engine = engine();
    engine.resolve("MEDLIFE SOLUTIONS", &complete_source());
    engine.resolve("MEDLIFE SOLUTIONS", &data(&[("patient_name", json!("Jane Doe"))]));

    let snapshot = engine.metrics();
    assert_eq!(snapshot.resolutions, 2);
    assert_eq!(snapshot.standard, 1);
    assert!(snapshot.avg_confidence > 0.0);
}
