/*
 * loader.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Loading a bundle directory: root file plus includes.
 */

use crate::{BundleError, Document, LoadedFile, detect_conflicts, merge};
use bundle_dyn::Value;
use bundle_error_reporting::Diagnostics;
use bundle_schema::{normalize, root::root_schema};
use std::path::{Path, PathBuf};

/// File names accepted for the root configuration file, in lookup order.
pub const ROOT_FILE_NAMES: [&str; 2] = ["bundle.yml", "bundle.yaml"];

/// A loaded bundle.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Directory containing the root file
    pub root_path: PathBuf,

    /// Every file that contributed, root file first
    pub files: Vec<LoadedFile>,

    /// The merged document, normalized against the root schema
    pub config: Document,

    /// Problems found while normalizing. None of them stop loading.
    pub diagnostics: Diagnostics,
}

impl Bundle {
    /// Load the bundle rooted at `root_dir`.
    ///
    /// The root file's `include` patterns are expanded relative to
    /// `root_dir`; each pattern's matches are taken in sorted order and
    /// patterns in the order listed. Files are checked for conflicting
    /// resource names before being merged into one document, which is
    /// then normalized against the root schema. Normalization problems are
    /// kept in [`Bundle::diagnostics`] and do not fail the load.
    pub fn load(root_dir: &Path) -> Result<Bundle, BundleError> {
        let root_file = find_root_file(root_dir)?;
        tracing::debug!(path = %root_file.display(), "loading bundle root");

        let root_value = bundle_yaml::load_file(&root_file)?;
        let mut files = vec![LoadedFile::new(root_file.display().to_string(), root_value)];

        for path in expand_includes(root_dir, &root_file, &files[0].value)? {
            tracing::debug!(path = %path.display(), "loading included file");
            let value = bundle_yaml::load_file(&path)?;
            files.push(LoadedFile::new(path.display().to_string(), value));
        }

        detect_conflicts(&files)?;

        let mut merged = files[0].value.clone();
        for file in &files[1..] {
            merged = merge(&merged, &file.value);
        }

        tracing::info!(
            root = %root_dir.display(),
            files = files.len(),
            "loaded bundle"
        );

        let (normalized, diagnostics) = normalize(root_schema(), &merged);
        for diagnostic in diagnostics.iter() {
            tracing::warn!(%diagnostic, "bundle configuration");
        }

        Ok(Bundle {
            root_path: root_dir.to_path_buf(),
            files,
            config: Document::new(normalized),
            diagnostics,
        })
    }
}

fn find_root_file(root_dir: &Path) -> Result<PathBuf, BundleError> {
    ROOT_FILE_NAMES
        .iter()
        .map(|name| root_dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| BundleError::RootNotFound {
            dir: root_dir.display().to_string(),
        })
}

/// Paths matched by the root file's `include` list, deduplicated, root
/// file excluded.
fn expand_includes(
    root_dir: &Path,
    root_file: &Path,
    root: &Value,
) -> Result<Vec<PathBuf>, BundleError> {
    let Some(include) = root.get("include") else {
        return Ok(Vec::new());
    };
    if include.is_null() {
        return Ok(Vec::new());
    }
    let patterns = include
        .as_sequence()
        .map_err(|_| BundleError::InvalidInclude {
            location: include.location().clone(),
            reason: format!("expected sequence, found {}", include.kind()),
        })?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in patterns {
        let pattern = entry.as_str().map_err(|_| BundleError::InvalidInclude {
            location: entry.location().clone(),
            reason: format!("expected string, found {}", entry.kind()),
        })?;
        let full = root_dir.join(pattern).display().to_string();
        let matches = glob::glob(&full).map_err(|source| BundleError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;

        let mut matched = Vec::new();
        for path in matches {
            let path = path.map_err(|source| BundleError::Glob {
                pattern: pattern.to_string(),
                source,
            })?;
            matched.push(path);
        }
        if matched.is_empty() {
            tracing::warn!(pattern, "include pattern matched no files");
        }
        matched.sort();

        for path in matched {
            if path != root_file && !paths.contains(&path) {
                paths.push(path);
            }
        }
    }
    Ok(paths)
}
