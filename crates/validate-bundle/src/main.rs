/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Command line harness for loading and checking a bundle.
 */

mod report;

use anyhow::{Context, Result};
use bundle_config::Bundle;
use bundle_error_reporting::SourceCache;
use bundle_mutator::{MutatorOptions, Pipeline, TokioProcessRunner};
use bundle_schema::InputSchema;
use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Load a bundle, check it against the bundle schema and report problems
#[derive(Parser, Debug)]
#[command(name = "validate-bundle")]
#[command(version, about = "Validate bundle configuration", long_about = None)]
struct Args {
    /// Directory containing bundle.yml
    #[arg(long, value_name = "DIR", default_value = ".")]
    root: PathBuf,

    /// Also run the plugin load and init phases
    #[arg(long)]
    plugins: bool,

    /// Template input schema (JSON) to validate --config against
    #[arg(long, value_name = "FILE", requires = "config")]
    schema: Option<PathBuf>,

    /// Template input configuration (YAML or JSON)
    #[arg(long, value_name = "FILE", requires = "schema")]
    config: Option<PathBuf>,

    /// Print diagnostics as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Args::parse()).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Returns whether the bundle passed every check.
async fn run(args: Args) -> Result<bool> {
    if let (Some(schema), Some(config)) = (&args.schema, &args.config) {
        let schema = InputSchema::read(schema)
            .with_context(|| format!("Failed to read schema file: {}", schema.display()))?;
        schema.read_config(config)?;
        println!("✓ Input configuration matches schema");
        println!("  Config: {}", config.display());
    }

    let mut bundle = Bundle::load(&args.root)
        .with_context(|| format!("Failed to load bundle in {}", args.root.display()))?;

    if args.plugins {
        let pipeline = Pipeline::new(MutatorOptions::from_env(), Arc::new(TokioProcessRunner));
        pipeline.run(&mut bundle.config, &bundle.root_path).await?;
        tracing::info!(root = %bundle.root_path.display(), "plugin phases applied");
    }

    let diagnostics = &bundle.diagnostics;
    if !diagnostics.is_empty() {
        let mut sources = SourceCache::new();
        eprintln!("{}", report::render(diagnostics, args.json, &mut sources));
    }
    if diagnostics.has_errors() {
        return Ok(false);
    }

    println!("✓ Bundle is valid");
    println!("  Root: {}", bundle.root_path.display());
    println!("  Files: {}", bundle.files.len());
    if diagnostics.has_warnings() {
        println!("  Warnings: {}", diagnostics.warnings().count());
    }
    Ok(true)
}
