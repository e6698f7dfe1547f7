//! Command implementations: load inputs, drive the engine, return data
//! for the summary printers.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use ivr_model::{CompletenessMetrics, CorrectionSuggestion, ResolutionOutcome, ValidationResult};
use ivr_resolve::{AdaptiveValidator, ResolutionEngine};
use ivr_schema::{SchemaRegistry, list_profiles};
use serde_json::Value;
use tracing::info;

use crate::cli::{ResolveArgs, SuggestArgs, ValidateArgs};

fn build_registry(config_dir: Option<&Path>) -> SchemaRegistry {
    match config_dir {
        Some(dir) => SchemaRegistry::new().with_config_dir(dir),
        None => SchemaRegistry::new(),
    }
}

fn load_source_data(path: &Path) -> Result<BTreeMap<String, Value>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read input file {}", path.display()))?;
    let data: BTreeMap<String, Value> = serde_json::from_str(&contents)
        .with_context(|| format!("parse input file {} as a JSON object", path.display()))?;
    Ok(data)
}

pub fn run_resolve(args: &ResolveArgs, config_dir: Option<&Path>) -> Result<ResolutionOutcome> {
    let source = load_source_data(&args.input)?;
    info!(
        manufacturer = %args.manufacturer,
        source_fields = source.len(),
        "resolving intake episode"
    );
    let registry = Arc::new(build_registry(config_dir));
    let engine = ResolutionEngine::new(registry);
    Ok(engine.resolve(&args.manufacturer, &source))
}

pub fn run_validate(
    args: &ValidateArgs,
    config_dir: Option<&Path>,
) -> Result<(ValidationResult, CompletenessMetrics)> {
    let data = load_source_data(&args.input)?;
    let registry = build_registry(config_dir);
    let schema = registry.template_schema(&args.manufacturer);
    let validator = AdaptiveValidator::new()
        .with_critical_overrides(registry.critical_fields(&args.manufacturer));
    let validation = validator.validate(&data, &schema);
    let completeness = validator.completeness(&data, &schema);
    Ok((validation, completeness))
}

pub fn run_suggest(
    args: &SuggestArgs,
    config_dir: Option<&Path>,
) -> Result<Vec<CorrectionSuggestion>> {
    let registry = Arc::new(build_registry(config_dir));
    let engine = ResolutionEngine::new(registry);
    Ok(engine.suggest_corrections(&args.manufacturer, &args.field))
}

pub fn run_manufacturers(config_dir: Option<&Path>) -> Result<Vec<String>> {
    let dir = config_dir.context("--config-dir is required to list manufacturer profiles")?;
    let names = list_profiles(dir)
        .with_context(|| format!("list profiles in {}", dir.display()))?;
    Ok(names)
}
