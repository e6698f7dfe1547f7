//! Table rendering for resolution results.
//!
//! Resolved values are PHI: they only appear when `--log-data` is given,
//! otherwise a redaction token is printed in their place.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use ivr_model::{
    CompletenessMetrics, CorrectionSuggestion, ResolutionOutcome, Transformation,
    ValidationResult,
};

use ivr_cli::logging::redact_value;

fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn transformation_label(transformation: Transformation) -> &'static str {
    match transformation {
        Transformation::None => "-",
        Transformation::Format => "format",
        Transformation::Alias => "alias",
    }
}

fn render_value(value: &serde_json::Value) -> String {
    let rendered = match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    redact_value(&rendered).to_string()
}

pub fn print_outcome(outcome: &ResolutionOutcome) {
    println!("Manufacturer: {}", outcome.manufacturer);
    println!("Strategy: {:?}", outcome.strategy());
    println!("AI enhanced: {}", if outcome.ai_enhanced { "yes" } else { "no" });

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Target field"),
        header_cell("Source field"),
        header_cell("Value"),
        header_cell("Confidence"),
        header_cell("Via"),
    ]);
    apply_table_style(&mut table);
    for (target, mapping) in &outcome.mappings {
        table.add_row(vec![
            Cell::new(target),
            Cell::new(&mapping.source_field),
            Cell::new(render_value(&mapping.value)),
            Cell::new(format!("{:.2}", mapping.confidence))
                .set_alignment(CellAlignment::Right),
            Cell::new(transformation_label(mapping.transformation)),
        ]);
    }
    println!("{table}");

    print_validation(&outcome.validation, &outcome.completeness);
}

pub fn print_validation(validation: &ValidationResult, completeness: &CompletenessMetrics) {
    println!(
        "Completeness: {:.2}% overall ({}/{} fields), {:.2}% required ({}/{})",
        completeness.percentage,
        completeness.filled_fields,
        completeness.total_fields,
        completeness.required_percentage,
        completeness.filled_required,
        completeness.total_required,
    );
    for error in &validation.errors {
        println!("error: {error}");
    }
    for warning in &validation.warnings {
        println!("warning: {warning}");
    }
    println!(
        "Valid: {}  Can proceed: {}",
        validation.valid, validation.can_proceed
    );
}

pub fn print_suggestions(field: &str, suggestions: &[CorrectionSuggestion]) {
    if suggestions.is_empty() {
        println!("No correction found for '{field}'.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Suggested field"),
        header_cell("Confidence"),
        header_cell("Reason"),
    ]);
    apply_table_style(&mut table);
    for suggestion in suggestions {
        table.add_row(vec![
            Cell::new(&suggestion.field),
            Cell::new(format!("{:.2}", suggestion.confidence))
                .set_alignment(CellAlignment::Right),
            Cell::new(format!("{:?}", suggestion.reason)),
        ]);
    }
    println!("{table}");
}

pub fn print_manufacturers(names: &[String]) {
    if names.is_empty() {
        println!("No manufacturer profiles found.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Manufacturer")]);
    apply_table_style(&mut table);
    for name in names {
        table.add_row(vec![Cell::new(name)]);
    }
    println!("{table}");
}
