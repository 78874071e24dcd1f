/*
 * input.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Strict validation of template input parameters.
 */

use crate::{SchemaError, Validators};
use bundle_dyn::{Mapping, Value, ValueKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Declared type of an input parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Integer,
    Number,
    Boolean,
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyType::String => "string",
            PropertyType::Integer => "integer",
            PropertyType::Number => "number",
            PropertyType::Boolean => "boolean",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename = "type")]
    pub property_type: PropertyType,

    #[serde(default)]
    pub description: String,
}

/// Schema of template input parameters, in the JSON form
/// `{"properties": {"name": {"type": "string", "description": "..."}}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(default)]
    pub properties: IndexMap<String, Property>,
}

impl InputSchema {
    /// Read a schema from a JSON file.
    pub fn read(path: &Path) -> Result<Self, SchemaError> {
        let file = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|source| SchemaError::Io {
            file: file.clone(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| SchemaError::Json { file, source })
    }

    /// Read a JSON or YAML config file and validate it with the builtin
    /// type checks. Returns the config with integer coercions applied.
    pub fn read_config(&self, path: &Path) -> Result<Value, SchemaError> {
        let config = bundle_yaml::load_file(path)?;
        self.validate(&config)
    }

    pub fn validate(&self, config: &Value) -> Result<Value, SchemaError> {
        self.validate_with(config, &Validators::builtin())
    }

    /// Validate `config` against this schema.
    ///
    /// In order: every key must be declared, integer-typed floats are
    /// converted when they are exactly integral, every value must pass
    /// `validators` for its declared type, and every declared key must be
    /// present. The first violation is returned.
    pub fn validate_with(
        &self,
        config: &Value,
        validators: &Validators,
    ) -> Result<Value, SchemaError> {
        let entries = config
            .as_mapping()
            .map_err(|_| SchemaError::NotAMapping {
                location: config.location().clone(),
                found: config.kind(),
            })?;

        let coerced = self.coerce_integers(entries)?;

        for (key, value) in &coerced {
            let Some(property) = self.properties.get(key) else {
                return Err(SchemaError::UndeclaredKey { key: key.clone() });
            };
            validators
                .validate(property.property_type, value)
                .map_err(|message| SchemaError::TypeMismatch {
                    key: key.clone(),
                    message,
                })?;
        }

        for key in self.properties.keys() {
            if !coerced.contains_key(key) {
                return Err(SchemaError::MissingKey { key: key.clone() });
            }
        }

        Ok(Value::mapping(coerced, config.location().clone()))
    }

    /// Convert floats to integers for integer-typed keys, rejecting any
    /// float with a fractional part.
    fn coerce_integers(&self, entries: &Mapping) -> Result<Mapping, SchemaError> {
        let mut coerced = Mapping::with_capacity(entries.len());
        for (key, value) in entries {
            let Some(property) = self.properties.get(key) else {
                return Err(SchemaError::UndeclaredKey { key: key.clone() });
            };

            let value = match value.inner() {
                ValueKind::Float(f) if property.property_type == PropertyType::Integer => {
                    let Some(i) = exact_integer(*f) else {
                        return Err(SchemaError::NotAnInteger {
                            key: key.clone(),
                            value: *f,
                        });
                    };
                    Value::int(i, value.location().clone())
                }
                _ => value.clone(),
            };
            coerced.insert(key.clone(), value);
        }
        Ok(coerced)
    }
}

/// `Some(i)` iff `f` is exactly the integer `i`.
pub(crate) fn exact_integer(f: f64) -> Option<i64> {
    // 2^63 is exactly representable; anything at or above it overflows i64.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_finite() && f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundle_dyn::Location;

    fn schema() -> InputSchema {
        serde_json::from_str(
            r#"{
                "properties": {
                    "project_name": {"type": "string", "description": "name"},
                    "workers": {"type": "integer"},
                    "ratio": {"type": "number"},
                    "enabled": {"type": "boolean"}
                }
            }"#,
        )
        .unwrap()
    }

    fn config(yaml: &str) -> Value {
        bundle_yaml::load("config.yml", yaml).unwrap()
    }

    const VALID: &str = "project_name: demo\nworkers: 4\nratio: 0.5\nenabled: true\n";

    #[test]
    fn test_valid_config() {
        let result = schema().validate(&config(VALID)).unwrap();
        assert_eq!(result.get("workers").unwrap().as_int().unwrap(), 4);
    }

    #[test]
    fn test_integral_float_is_coerced() {
        let result = schema()
            .validate(&config("project_name: demo\nworkers: 4.0\nratio: 1\nenabled: false\n"))
            .unwrap();
        let workers = result.get("workers").unwrap();
        assert_eq!(workers.as_int().unwrap(), 4);
        assert_eq!(workers.location(), &Location::new("config.yml", 2, 10));
        // number accepts ints unchanged
        assert_eq!(result.get("ratio").unwrap().as_int().unwrap(), 1);
    }

    #[test]
    fn test_fractional_float_is_rejected() {
        let err = schema()
            .validate(&config("project_name: demo\nworkers: 4.5\nratio: 1\nenabled: false\n"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected workers to have integer value but it is 4.5"
        );
    }

    #[test]
    fn test_undeclared_key() {
        let err = schema()
            .validate(&config(&format!("{VALID}extra: 1\n")))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "extra is not defined as an input parameter for the template"
        );
    }

    #[test]
    fn test_missing_key() {
        let err = schema()
            .validate(&config("project_name: demo\nworkers: 4\nratio: 0.5\n"))
            .unwrap_err();
        assert_eq!(err.to_string(), "input parameter enabled is not defined in config");
    }

    #[test]
    fn test_type_mismatch() {
        let err = schema()
            .validate(&config("project_name: 12\nworkers: 4\nratio: 0.5\nenabled: true\n"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "incorrect type for project_name. expected type string, but value is 12"
        );
    }

    #[test]
    fn test_injected_validators() {
        let lenient = Validators::empty();
        let result = schema()
            .validate_with(
                &config("project_name: 12\nworkers: 4\nratio: x\nenabled: 1\n"),
                &lenient,
            )
            .unwrap();
        assert_eq!(result.get("ratio").unwrap().as_str().unwrap(), "x");
    }

    #[test]
    fn test_config_must_be_mapping() {
        let err = schema().validate(&config("- a\n- b\n")).unwrap_err();
        assert!(matches!(err, SchemaError::NotAMapping { .. }));
    }

    #[test]
    fn test_unknown_property_type_is_rejected() {
        let result: Result<InputSchema, _> =
            serde_json::from_str(r#"{"properties": {"a": {"type": "date"}}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_exact_integer() {
        assert_eq!(exact_integer(3.0), Some(3));
        assert_eq!(exact_integer(-0.0), Some(0));
        assert_eq!(exact_integer(3.25), None);
        assert_eq!(exact_integer(f64::NAN), None);
        assert_eq!(exact_integer(1e19), None);
    }
}
