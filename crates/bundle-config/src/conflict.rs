/*
 * conflict.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Resource names must be unique across all sections and files.
 */

use crate::ConflictError;
use bundle_dyn::{Location, Value};
use std::collections::HashMap;

/// A parsed bundle file.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedFile {
    /// Path as displayed in locations
    pub path: String,
    pub value: Value,
}

impl LoadedFile {
    pub fn new(path: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }
}

/// Singular resource kind for a `resources` section name.
fn resource_kind(section: &str) -> String {
    match section {
        "jobs" => "job".to_string(),
        "pipelines" => "pipeline".to_string(),
        "models" => "model".to_string(),
        "experiments" => "experiment".to_string(),
        "model_serving_endpoints" => "model_serving_endpoint".to_string(),
        "registered_models" => "registered_model".to_string(),
        "quality_monitors" => "quality_monitor".to_string(),
        "schemas" => "schema".to_string(),
        other => other.strip_suffix('s').unwrap_or(other).to_string(),
    }
}

/// Fail if any name is declared by more than one resource.
///
/// Every `resources.<section>.<name>` entry in `files` counts, whatever its
/// section, so a job and a pipeline may not share a name. Files are scanned
/// in the given order. The error reports the first name, in order of first
/// declaration, that has more than one declaration, and lists all of them.
pub fn detect_conflicts(files: &[LoadedFile]) -> Result<(), ConflictError> {
    let mut order: Vec<&str> = Vec::new();
    let mut seen: HashMap<&str, Vec<(String, Location)>> = HashMap::new();

    for file in files {
        let Some(resources) = file.value.get("resources").and_then(|r| r.as_mapping().ok()) else {
            continue;
        };
        for (section, entries) in resources {
            let Ok(entries) = entries.as_mapping() else {
                continue;
            };
            let kind = resource_kind(section);
            for (name, value) in entries {
                let occurrences = seen.entry(name.as_str()).or_insert_with(|| {
                    order.push(name.as_str());
                    Vec::new()
                });
                occurrences.push((kind.clone(), value.location().clone()));
            }
        }
    }

    for name in order {
        if let Some(occurrences) = seen.remove(name)
            && occurrences.len() > 1
        {
            return Err(ConflictError {
                name: name.to_string(),
                occurrences,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, yaml: &str) -> LoadedFile {
        LoadedFile::new(path, bundle_yaml::load(path, yaml).unwrap())
    }

    #[test]
    fn test_resource_kind() {
        assert_eq!(resource_kind("jobs"), "job");
        assert_eq!(resource_kind("model_serving_endpoints"), "model_serving_endpoint");
        assert_eq!(resource_kind("volumes"), "volume");
        assert_eq!(resource_kind("dashboard"), "dashboard");
    }

    #[test]
    fn test_distinct_names_pass() {
        let files = [
            file("a.yml", "resources:\n  jobs:\n    a: {name: a}\n"),
            file("b.yml", "resources:\n  pipelines:\n    b: {name: b}\n"),
        ];
        assert!(detect_conflicts(&files).is_ok());
    }

    #[test]
    fn test_same_name_different_kind_in_one_file() {
        let files = [file(
            "bundle.yml",
            "resources:\n  jobs:\n    foo:\n      name: job foo\n  pipelines:\n    foo:\n      name: pipeline foo\n",
        )];
        let err = detect_conflicts(&files).unwrap_err();
        assert_eq!(
            err.to_string(),
            "multiple resources named foo (job at bundle.yml:4:7, pipeline at bundle.yml:7:7)"
        );
    }

    #[test]
    fn test_identical_redeclaration_conflicts() {
        let yaml = "resources:\n  jobs:\n    foo:\n      name: x\n";
        let files = [file("a.yml", yaml), file("b.yml", yaml)];
        let err = detect_conflicts(&files).unwrap_err();
        assert_eq!(err.occurrences.len(), 2);
        assert_eq!(err.occurrences[1].1.file, "b.yml");
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let files = [
            file("a.yml", "resources:\n  jobs:\n    Foo: {name: x}\n"),
            file("b.yml", "resources:\n  jobs:\n    foo: {name: x}\n"),
        ];
        assert!(detect_conflicts(&files).is_ok());
    }

    #[test]
    fn test_first_declared_conflict_reported_with_all_occurrences() {
        let files = [
            file("a.yml", "resources:\n  jobs:\n    x: {}\n    y: {}\n"),
            file("b.yml", "resources:\n  pipelines:\n    y: {}\n    x: {}\n"),
            file("c.yml", "resources:\n  experiments:\n    x: {}\n"),
        ];
        let err = detect_conflicts(&files).unwrap_err();
        assert_eq!(err.name, "x");
        let kinds: Vec<&str> = err.occurrences.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(kinds, ["job", "pipeline", "experiment"]);
    }

    #[test]
    fn test_files_without_resources() {
        let files = [file("a.yml", "bundle:\n  name: x\n"), file("b.yml", "")];
        assert!(detect_conflicts(&files).is_ok());
    }
}
