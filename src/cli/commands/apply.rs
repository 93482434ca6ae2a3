//! CLI command for applying approved suggestions

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use schema_explorer::explore::{PropertySuggestion, SchemaExplorer};
use schema_explorer::models::PropertyDefinition;
use schema_explorer::storage::FileSystemBackend;
use serde_json::Value;

use crate::error::{CliError, read_file};

/// Arguments for the `apply` command
pub struct ApplyArgs {
    /// Store directory
    pub store: PathBuf,
    /// Schema id
    pub schema: String,
    /// JSON file mapping property names to definitions
    pub updates: Option<PathBuf>,
    /// Saved JSON report
    pub report: Option<PathBuf>,
    /// Property names approved from the report
    pub approve: Vec<String>,
}

/// Read definitions from an updates file
fn updates_from_file(path: &Path) -> Result<BTreeMap<String, PropertyDefinition>, CliError> {
    let content = read_file(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Pick the proposed definitions of approved properties out of a saved report
fn updates_from_report(
    path: &Path,
    approve: &[String],
) -> Result<BTreeMap<String, PropertyDefinition>, CliError> {
    let content = read_file(path)?;
    let mut report: Value = serde_json::from_str(&content)?;
    let suggestions = report
        .get_mut("suggestions")
        .map(Value::take)
        .ok_or_else(|| CliError::InvalidInput(format!("{} is not a report", path.display())))?;
    let suggestions: Vec<PropertySuggestion> = serde_json::from_value(suggestions)?;

    let mut updates = BTreeMap::new();
    for name in approve {
        let suggestion = suggestions
            .iter()
            .find(|s| &s.property_name == name)
            .ok_or_else(|| {
                CliError::InvalidInput(format!("no suggestion for '{}' in the report", name))
            })?;
        updates.insert(name.clone(), suggestion.definition.clone());
    }
    Ok(updates)
}

/// Handle the `apply` command
pub fn handle_apply(args: &ApplyArgs) -> Result<(), CliError> {
    let updates = match (&args.updates, &args.report) {
        (Some(path), _) => updates_from_file(path)?,
        (None, Some(path)) => updates_from_report(path, &args.approve)?,
        (None, None) => {
            return Err(CliError::InvalidInput(
                "either --updates or --report with --approve is required".to_string(),
            ));
        }
    };

    if updates.is_empty() {
        return Err(CliError::InvalidInput("no property definitions to apply".to_string()));
    }

    let names: Vec<String> = updates.keys().cloned().collect();
    let explorer = SchemaExplorer::new(FileSystemBackend::new(&args.store));
    let schema = explorer.apply_approved_suggestions(&args.schema, updates)?;

    eprintln!("Applied to schema '{}':", schema.id);
    for name in names {
        eprintln!("  - {}", name);
    }
    eprintln!("Schema now declares {} properties", schema.properties.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OutputFormat;
    use crate::output::render_report;
    use schema_explorer::storage::SchemaBackend;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn people_store() -> TempDir {
        let temp = TempDir::new().unwrap();
        let schemas = temp.path().join("schemas");
        fs::create_dir_all(&schemas).unwrap();
        fs::write(
            schemas.join("people.json"),
            json!({"id": "people", "properties": {"name": {"type": "string"}}}).to_string(),
        )
        .unwrap();

        let records = temp.path().join("records");
        fs::create_dir_all(&records).unwrap();
        let lines: Vec<String> = ["active", "inactive", "active", "active", "inactive", "active"]
            .iter()
            .enumerate()
            .map(|(i, status)| json!({"name": format!("P{}", i), "status": status}).to_string())
            .collect();
        fs::write(records.join("people.jsonl"), lines.join("\n")).unwrap();
        temp
    }

    fn saved_report(temp: &TempDir) -> PathBuf {
        let explorer = SchemaExplorer::new(FileSystemBackend::new(temp.path()));
        let report = explorer.explore("people").unwrap();
        let path = temp.path().join("report.json");
        fs::write(&path, render_report(&report, OutputFormat::Json).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_updates_from_saved_report() {
        let temp = people_store();
        let report_path = saved_report(&temp);

        let updates = updates_from_report(&report_path, &["status".to_string()]).unwrap();
        assert_eq!(updates.len(), 1);
        let status = &updates["status"];
        assert_eq!(status.declared_type(), Some("string"));
        assert_eq!(
            status.enum_values,
            Some(vec![json!("active"), json!("inactive")])
        );
    }

    #[test]
    fn test_apply_from_saved_report() {
        let temp = people_store();
        let args = ApplyArgs {
            store: temp.path().to_path_buf(),
            schema: "people".to_string(),
            updates: None,
            report: Some(saved_report(&temp)),
            approve: vec!["status".to_string()],
        };
        handle_apply(&args).unwrap();

        let schema = FileSystemBackend::new(temp.path())
            .resolve_schema("people")
            .unwrap();
        assert!(schema.properties.contains_key("name"));
        assert_eq!(
            schema.properties["status"].enum_values,
            Some(vec![json!("active"), json!("inactive")])
        );
    }

    #[test]
    fn test_unknown_approved_name() {
        let temp = people_store();
        let report_path = saved_report(&temp);
        let result = updates_from_report(&report_path, &["ghost".to_string()]);
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_file_without_suggestions_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("other.json");
        fs::write(&path, json!({"schema_id": "people"}).to_string()).unwrap();
        let result = updates_from_report(&path, &["status".to_string()]);
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }
}
