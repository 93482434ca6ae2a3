//! Storage backend tests

use std::fs;

use schema_explorer::explore::{ExploreError, SchemaExplorer};
use schema_explorer::models::{PropertyDefinition, SchemaDefinition};
use schema_explorer::storage::{FileSystemBackend, SchemaBackend, StorageError};
use serde_json::{Value, json};
use tempfile::TempDir;

fn write_schema(dir: &TempDir, id: &str, schema: Value) {
    let schemas = dir.path().join("schemas");
    fs::create_dir_all(&schemas).unwrap();
    fs::write(schemas.join(format!("{}.json", id)), schema.to_string()).unwrap();
}

mod filesystem_tests {
    use super::*;

    #[test]
    fn test_resolve_schema() {
        let temp = TempDir::new().unwrap();
        write_schema(
            &temp,
            "person",
            json!({
                "id": "person",
                "title": "Person",
                "properties": {"name": {"type": "string", "maxLength": 100}},
                "required": ["name"],
                "archive": {"enabled": true}
            }),
        );

        let backend = FileSystemBackend::new(temp.path());
        let schema = backend.resolve_schema("person").unwrap();
        assert_eq!(schema.display_title(), "Person");
        assert_eq!(schema.properties["name"].max_length, Some(100));
        assert!(schema.is_required("name"));
        assert!(schema.extra.contains_key("archive"));
    }

    #[test]
    fn test_schema_id_defaults_to_file_name() {
        let temp = TempDir::new().unwrap();
        write_schema(&temp, "orders", json!({"properties": {}}));

        let backend = FileSystemBackend::new(temp.path());
        assert_eq!(backend.resolve_schema("orders").unwrap().id, "orders");
    }

    #[test]
    fn test_missing_schema_is_not_found() {
        let temp = TempDir::new().unwrap();
        let backend = FileSystemBackend::new(temp.path());
        assert!(matches!(
            backend.resolve_schema("ghost"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_traversal_in_schema_id_rejected() {
        let temp = TempDir::new().unwrap();
        let backend = FileSystemBackend::new(temp.path());
        assert!(matches!(
            backend.resolve_schema("../secrets"),
            Err(StorageError::PermissionDenied(_))
        ));
        assert!(matches!(
            backend.fetch_records("a/b"),
            Err(StorageError::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_fetch_records_from_jsonl_and_directory() {
        let temp = TempDir::new().unwrap();
        let records = temp.path().join("records");
        fs::create_dir_all(records.join("person")).unwrap();
        fs::write(
            records.join("person.jsonl"),
            "{\"name\": \"Ann\"}\n\nnot json\n{\"name\": \"Bo\", \"@self\": {\"id\": \"p2\"}}\n",
        )
        .unwrap();
        fs::write(records.join("person").join("b.json"), r#"{"name": "Cy"}"#).unwrap();
        fs::write(records.join("person").join("a.json"), r#"{"name": "Di"}"#).unwrap();
        fs::write(records.join("person").join("notes.txt"), "ignored").unwrap();

        let backend = FileSystemBackend::new(temp.path());
        let fetched = backend.fetch_records("person").unwrap();
        let names: Vec<_> = fetched
            .iter()
            .map(|r| r.object["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Ann", "Bo", "Di", "Cy"]);
        assert_eq!(fetched[1].id.as_deref(), Some("p2"));
    }

    #[test]
    fn test_no_records_is_empty() {
        let temp = TempDir::new().unwrap();
        let backend = FileSystemBackend::new(temp.path());
        assert!(backend.fetch_records("person").unwrap().is_empty());
    }

    #[test]
    fn test_save_and_regenerate_facets() {
        let temp = TempDir::new().unwrap();
        let backend = FileSystemBackend::new(temp.path());
        let schema = SchemaDefinition::new("person")
            .with_property("active", PropertyDefinition::of_type("boolean"));

        backend.save_schema(&schema).unwrap();
        backend.regenerate_facets(&schema).unwrap();

        assert_eq!(backend.resolve_schema("person").unwrap(), schema);
        let facets: Value = serde_json::from_str(
            &fs::read_to_string(temp.path().join("facets").join("person.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(facets["facets"]["active"]["type"], "terms");
    }
}

mod end_to_end_tests {
    use super::*;

    #[test]
    fn test_explore_and_apply_on_disk() {
        let temp = TempDir::new().unwrap();
        write_schema(
            &temp,
            "person",
            json!({"id": "person", "properties": {"name": {"type": "string"}}}),
        );
        let records = temp.path().join("records");
        fs::create_dir_all(&records).unwrap();
        fs::write(
            records.join("person.jsonl"),
            "{\"name\": \"Ann\", \"email\": \"ann@example.com\"}\n{\"name\": \"Bo\", \"email\": \"bo@example.com\"}\n",
        )
        .unwrap();

        let explorer = SchemaExplorer::new(FileSystemBackend::new(temp.path()));
        let report = explorer.explore("person").unwrap();
        assert_eq!(report.total_records, 2);

        let email = report.suggestion("email").unwrap();
        let updates = vec![("email".to_string(), email.definition.clone())];
        let updated = explorer.apply_approved_suggestions("person", updates).unwrap();
        assert_eq!(updated.properties["email"].format.as_deref(), Some("email"));

        let reloaded = explorer.backend().resolve_schema("person").unwrap();
        assert!(reloaded.properties.contains_key("email"));
        assert!(temp.path().join("facets").join("person.json").exists());
    }

    #[test]
    fn test_explore_missing_schema_on_disk() {
        let temp = TempDir::new().unwrap();
        let explorer = SchemaExplorer::new(FileSystemBackend::new(temp.path()));
        assert!(matches!(
            explorer.explore("ghost"),
            Err(ExploreError::SchemaNotFound { .. })
        ));
    }
}
