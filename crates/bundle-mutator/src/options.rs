/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Plugin settings read from the document and from the process environment.
 */

use crate::MutatorError;
use bundle_dyn::{Path, Value};
use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable naming a stable root for plugin scratch files.
pub const TEMP_ROOT_ENV: &str = "BUNDLE_TMP";

/// Module run with `python3 -m` when the document does not name one.
pub const DEFAULT_ENTRY_MODULE: &str = "bundles.build";

/// The `experimental.plugin` section of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginConfig {
    pub enabled: bool,
    pub venv_path: Option<String>,
    pub module: Option<String>,
}

impl PluginConfig {
    /// Read the section from a document. A missing or null section is the
    /// default (disabled) configuration.
    pub fn from_document(document: &Value) -> Result<PluginConfig, MutatorError> {
        let Some(section) = document
            .get("experimental")
            .and_then(|experimental| experimental.get("plugin"))
            .filter(|section| !section.is_null())
        else {
            return Ok(PluginConfig::default());
        };

        let enabled = match section.get("enabled") {
            None => false,
            Some(v) if v.is_null() => false,
            Some(v) => v
                .as_bool()
                .map_err(|e| MutatorError::config(format!("invalid \"experimental.plugin.enabled\": {e}")))?,
        };

        Ok(PluginConfig {
            enabled,
            venv_path: optional_string(section, "venv_path")?,
            module: optional_string(section, "module")?,
        })
    }

    /// The virtual environment path, required once the plugin is enabled.
    pub fn require_venv(&self) -> Result<&str, MutatorError> {
        match self.venv_path.as_deref() {
            Some(path) if !path.is_empty() => Ok(path),
            _ => Err(MutatorError::config(
                "\"experimental.plugin.enabled\" can only be used when \"experimental.plugin.venv_path\" is set",
            )),
        }
    }
}

fn optional_string(section: &Value, key: &str) -> Result<Option<String>, MutatorError> {
    match section.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.to_string()))
            .map_err(|e| MutatorError::config(format!("invalid \"experimental.plugin.{key}\": {e}"))),
    }
}

/// Process-level settings shared by every phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutatorOptions {
    /// Stable scratch root. `None` means a fresh temporary directory per
    /// call.
    pub temp_root: Option<PathBuf>,

    /// Collection the phase policies are relative to.
    pub collection_root: Path,

    /// Module run when `experimental.plugin.module` is not set.
    pub entry_module: String,
}

impl Default for MutatorOptions {
    fn default() -> Self {
        Self {
            temp_root: None,
            collection_root: Path::from_keys(&["resources", "jobs"]),
            entry_module: DEFAULT_ENTRY_MODULE.to_string(),
        }
    }
}

impl MutatorOptions {
    /// Defaults, with the temp root taken from [`TEMP_ROOT_ENV`].
    pub fn from_env() -> Self {
        Self {
            temp_root: resolve_temp_root(std::env::var_os(TEMP_ROOT_ENV)),
            ..Self::default()
        }
    }

    pub fn with_temp_root(mut self, temp_root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(temp_root.into());
        self
    }
}

/// Interpret a raw value of [`TEMP_ROOT_ENV`]. Unset and empty are the same.
pub fn resolve_temp_root(raw: Option<OsString>) -> Option<PathBuf> {
    raw.filter(|value| !value.is_empty()).map(PathBuf::from)
}

/// Python interpreter inside a virtual environment.
#[cfg(windows)]
pub fn interpreter_path(venv: &std::path::Path) -> PathBuf {
    venv.join("Scripts").join("python3.exe")
}

/// Python interpreter inside a virtual environment.
#[cfg(not(windows))]
pub fn interpreter_path(venv: &std::path::Path) -> PathBuf {
    venv.join("bin").join("python3")
}
