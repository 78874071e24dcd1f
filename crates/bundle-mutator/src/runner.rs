/*
 * runner.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Running the plugin process.
 */

use crate::MutatorError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// One plugin invocation: program, arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl Invocation {
    /// Value following `flag` in the arguments, e.g. the `--output` name.
    pub fn arg_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

/// Runs a plugin to completion.
///
/// Implementations return `Ok(())` only for a successful exit, and
/// [`MutatorError::Cancelled`] once `cancel` fires.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(
        &self,
        invocation: &Invocation,
        cancel: &CancellationToken,
    ) -> Result<(), MutatorError>;
}

/// Runs the plugin as a child process with tokio. Output lines are logged
/// at debug level as they arrive.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        invocation: &Invocation,
        cancel: &CancellationToken,
    ) -> Result<(), MutatorError> {
        let failed = |reason: String| MutatorError::Process {
            program: invocation.program.clone(),
            reason,
        };

        tracing::debug!(
            program = %invocation.program.display(),
            args = ?invocation.args,
            cwd = %invocation.cwd.display(),
            "starting plugin process"
        );

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| failed(format!("failed to start {}: {}", invocation.program.display(), e)))?;

        let readers = [
            child.stdout.take().map(|out| tokio::spawn(drain(out, "stdout: "))),
            child.stderr.take().map(|err| tokio::spawn(drain(err, "stderr: "))),
        ];

        let status = tokio::select! {
            status = child.wait() => status,
            _ = cancel.cancelled() => {
                if let Err(e) = child.kill().await {
                    tracing::warn!(error = %e, "failed to kill plugin process");
                }
                join_readers(readers).await;
                return Err(MutatorError::Cancelled);
            }
        };

        join_readers(readers).await;

        let status = status.map_err(|e| failed(format!("failed to wait for process: {}", e)))?;
        if !status.success() {
            return Err(failed(status.to_string()));
        }
        Ok(())
    }
}

async fn drain<R: AsyncRead + Unpin>(reader: R, prefix: &'static str) {
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => tracing::debug!("{}{}", prefix, line),
            Ok(None) => break,
            Err(e) => {
                tracing::debug!("{}<unreadable output: {}>", prefix, e);
                break;
            }
        }
    }
}

async fn join_readers(readers: [Option<tokio::task::JoinHandle<()>>; 2]) {
    for reader in readers.into_iter().flatten() {
        if let Err(e) = reader.await {
            tracing::warn!(error = %e, "plugin output reader failed");
        }
    }
}
