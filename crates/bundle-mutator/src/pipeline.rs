/*
 * pipeline.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::{MutatorError, MutatorOptions, Phase, PluginMutator, ProcessRunner};
use bundle_config::Document;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Every plugin phase, in order.
#[derive(Debug)]
pub struct Pipeline {
    mutators: Vec<PluginMutator>,
}

impl Pipeline {
    pub fn new(options: MutatorOptions, runner: Arc<dyn ProcessRunner>) -> Self {
        Self::with_cancellation(options, runner, CancellationToken::new())
    }

    /// A pipeline whose plugin processes stop when `cancel` fires.
    pub fn with_cancellation(
        options: MutatorOptions,
        runner: Arc<dyn ProcessRunner>,
        cancel: CancellationToken,
    ) -> Self {
        let mutators = Phase::ALL
            .into_iter()
            .map(|phase| {
                PluginMutator::new(phase, options.clone(), Arc::clone(&runner))
                    .with_cancellation(cancel.clone())
            })
            .collect();
        Self { mutators }
    }

    pub fn mutators(&self) -> &[PluginMutator] {
        &self.mutators
    }

    /// Apply each phase in turn. The first failure stops the pipeline; the
    /// document keeps the changes of the phases that succeeded.
    pub async fn run(&self, document: &mut Document, root: &Path) -> Result<(), MutatorError> {
        for mutator in &self.mutators {
            tracing::info!(mutator = %mutator.name(), "applying");
            if let Err(e) = mutator.apply(document, root).await {
                tracing::info!(mutator = %mutator.name(), error = %e, "failed");
                return Err(e);
            }
            tracing::info!(mutator = %mutator.name(), "applied");
        }
        Ok(())
    }
}
