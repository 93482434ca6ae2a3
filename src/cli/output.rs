//! Output formatting for CLI

use schema_explorer::explore::{ExplorationReport, PropertySuggestion, SuggestionKind};

use crate::OutputFormat;
use crate::error::CliError;

/// Render a report in the requested format
pub fn render_report(report: &ExplorationReport, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(report)?),
        OutputFormat::Summary => Ok(format_summary(report)),
    }
}

fn format_suggestion(output: &mut String, suggestion: &PropertySuggestion) {
    output.push_str(&format!(
        "  - {} [{}] {}% -> {}",
        suggestion.property_name,
        suggestion.confidence,
        suggestion.usage_percentage,
        suggestion.recommended_type
    ));
    if let Some(current) = &suggestion.current_type {
        output.push_str(&format!(" (declared {})", current));
    }
    if let Some(format) = suggestion.detected_format {
        output.push_str(&format!(", format {}", format));
    }
    output.push('\n');

    if let Some(values) = &suggestion.enum_values {
        let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        output.push_str(&format!("      enum: {}\n", values.join(", ")));
    }
    for issue in &suggestion.issues {
        output.push_str(&format!("      ! {}\n", issue));
    }
}

/// Format a report as a human-readable summary
pub fn format_summary(report: &ExplorationReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Schema: {} ({})\n",
        report.schema_title, report.schema_id
    ));
    output.push_str(&format!("Records analyzed: {}\n", report.total_records));
    if report.summary.records_skipped > 0 {
        output.push_str(&format!(
            "Records skipped: {}\n",
            report.summary.records_skipped
        ));
    }
    output.push_str(&format!(
        "Properties discovered: {}\n",
        report.discovered_properties.len()
    ));

    let new: Vec<_> = report
        .suggestions
        .iter()
        .filter(|s| s.kind == SuggestionKind::New)
        .collect();
    if !new.is_empty() {
        output.push_str(&format!("\nNew properties ({}):\n", new.len()));
        for suggestion in new {
            format_suggestion(&mut output, suggestion);
        }
    }

    let drift: Vec<_> = report
        .suggestions
        .iter()
        .filter(|s| s.kind == SuggestionKind::Existing)
        .collect();
    if !drift.is_empty() {
        output.push_str(&format!("\nDrift on declared properties ({}):\n", drift.len()));
        for suggestion in drift {
            format_suggestion(&mut output, suggestion);
        }
    }

    if report.summary.total == 0 {
        output.push_str("\nNo suggestions: the schema matches the data.\n");
    }

    output
}
