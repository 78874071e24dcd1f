/*
 * mutator.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * One plugin phase applied to a document.
 */

use crate::{
    CacheDir, Exchange, FileExchange, Invocation, MutatorError, MutatorOptions, Phase,
    PluginConfig, ProcessRunner, interpreter_path,
};
use bundle_config::{Document, override_value};
use bundle_dyn::Value;
use bundle_schema::{normalize, root::root_schema};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// File name, under the project root, that plugin output is attributed to.
pub const VIRTUAL_FILE_NAME: &str = "__generated__.yml";

/// Runs the plugin for one [`Phase`].
pub struct PluginMutator {
    phase: Phase,
    options: MutatorOptions,
    runner: Arc<dyn ProcessRunner>,
    cancel: CancellationToken,
}

/// What an enabled plugin needs to run.
struct Plugin {
    interpreter: PathBuf,
    module: String,
}

impl PluginMutator {
    pub fn new(phase: Phase, options: MutatorOptions, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            phase,
            options,
            runner,
            cancel: CancellationToken::new(),
        }
    }

    /// Use `cancel` to stop a running plugin.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn name(&self) -> String {
        format!("PluginMutator({})", self.phase)
    }

    /// Apply the phase to `document`, exchanging data through files in the
    /// cache directory. `root` is the project root: the plugin runs there
    /// and a relative `venv_path` is resolved against it.
    ///
    /// Does nothing when the plugin is not enabled. On error the document is
    /// left unchanged.
    pub async fn apply(&self, document: &mut Document, root: &Path) -> Result<(), MutatorError> {
        let Some(plugin) = self.prepare(document.value(), root)? else {
            return Ok(());
        };

        let cache = CacheDir::create(self.options.temp_root.as_deref())
            .map_err(|source| MutatorError::CacheDir { source })?;
        let exchange = FileExchange::in_dir(cache.path());

        self.execute(document, root, &plugin, &exchange).await
    }

    /// [`apply`](PluginMutator::apply) over a caller-provided exchange.
    pub async fn apply_with_exchange(
        &self,
        document: &mut Document,
        root: &Path,
        exchange: &dyn Exchange,
    ) -> Result<(), MutatorError> {
        let Some(plugin) = self.prepare(document.value(), root)? else {
            return Ok(());
        };
        self.execute(document, root, &plugin, exchange).await
    }

    fn prepare(&self, document: &Value, root: &Path) -> Result<Option<Plugin>, MutatorError> {
        let config = PluginConfig::from_document(document)?;
        if !config.enabled {
            tracing::debug!(mutator = %self.name(), "plugin disabled, skipping");
            return Ok(None);
        }

        let interpreter = interpreter_path(&root.join(config.require_venv()?));
        if !interpreter.exists() {
            return Err(MutatorError::InterpreterNotFound { path: interpreter });
        }

        Ok(Some(Plugin {
            interpreter,
            module: config
                .module
                .unwrap_or_else(|| self.options.entry_module.clone()),
        }))
    }

    async fn execute(
        &self,
        document: &mut Document,
        root: &Path,
        plugin: &Plugin,
        exchange: &dyn Exchange,
    ) -> Result<(), MutatorError> {
        let policy = self.phase.policy(&self.options.collection_root);

        document
            .mutate_async(|current| async move {
                // Override against the same shape the plugin output is held to.
                let (current, diagnostics) = normalize(root_schema(), &current);
                if !diagnostics.is_empty() {
                    tracing::debug!(
                        mutator = %self.name(),
                        count = diagnostics.len(),
                        "document did not normalize cleanly"
                    );
                }
                let proposed = self.run_plugin(&current, root, plugin, exchange).await?;
                Ok::<_, MutatorError>(override_value(&current, &proposed, &policy)?)
            })
            .await
    }

    async fn run_plugin(
        &self,
        current: &Value,
        root: &Path,
        plugin: &Plugin,
        exchange: &dyn Exchange,
    ) -> Result<Value, MutatorError> {
        let input = serde_json::to_vec(&current.to_plain())?;
        exchange.write_input(&input)?;

        let invocation = Invocation {
            program: plugin.interpreter.clone(),
            args: vec![
                "-m".to_string(),
                plugin.module.clone(),
                "--phase".to_string(),
                self.phase.to_string(),
                "--input".to_string(),
                exchange.input_name(),
                "--output".to_string(),
                exchange.output_name(),
            ],
            cwd: root.to_path_buf(),
        };
        self.runner.run(&invocation, &self.cancel).await?;

        let output = exchange.read_output()?;
        let virtual_path = virtual_path(root)?;
        let generated = bundle_yaml::load_with_virtual_path(&virtual_path, &output)
            .map_err(MutatorError::OutputParse)?;

        // The plugin is expected to emit normalized output, so warnings are
        // as fatal as errors here.
        let (normalized, diagnostics) = normalize(root_schema(), &generated);
        if let Some(first) = diagnostics.first() {
            return Err(MutatorError::PluginOutput {
                summary: first.summary.clone(),
            });
        }
        Ok(normalized)
    }
}

impl std::fmt::Debug for PluginMutator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginMutator")
            .field("phase", &self.phase)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Absolute `<root>/__generated__.yml`.
fn virtual_path(root: &Path) -> Result<String, MutatorError> {
    let joined = root.join(VIRTUAL_FILE_NAME);
    std::path::absolute(&joined)
        .map(|path| path.display().to_string())
        .map_err(|source| MutatorError::Exchange {
            name: joined.display().to_string(),
            source,
        })
}
