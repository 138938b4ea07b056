//! FieldGuard
//!
//! Applies masking, tokenization, and encryption pipelines to JSON-lines
//! records, with optional multi-channel auditing of field changes.

use anyhow::{Context, Result};
use clap::Parser;
use fieldguard_audit::{build_composite_sink, AuditConfig, CompositeSink, ConsoleTarget};
use fieldguard_cli::cli::{Cli, Commands};
use fieldguard_cli::{apply_stream, PipelineFile};
use fieldguard_core::AuditSink;
use fieldguard_policy::{Action, ActionRegistry};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match cli.command {
        Commands::Apply {
            pipeline,
            input,
            output,
            audit,
            audit_channels,
        } => {
            let file = PipelineFile::from_file(&pipeline)
                .with_context(|| format!("failed to load pipeline {}", pipeline.display()))?;

            let sink: Arc<dyn AuditSink> = if file.needs_audit() {
                let config = load_audit_config(audit.as_deref(), audit_channels.as_deref(), output.is_none())?;
                Arc::new(build_composite_sink(&config))
            } else {
                Arc::new(CompositeSink::default())
            };

            let pipeline = file
                .build(ActionRegistry::global(), sink)
                .context("failed to build pipeline")?;
            info!(steps = pipeline.len(), "Pipeline ready");

            let reader: Box<dyn io::BufRead> = match &input {
                Some(path) => Box::new(BufReader::new(
                    File::open(path).with_context(|| format!("cannot open {}", path.display()))?,
                )),
                None => Box::new(io::stdin().lock()),
            };
            let writer: Box<dyn io::Write> = match &output {
                Some(path) => Box::new(BufWriter::new(
                    File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
                )),
                None => Box::new(BufWriter::new(io::stdout().lock())),
            };

            let count = apply_stream(&pipeline, reader, writer)?;
            info!(records = count, "Done");
        }

        Commands::Actions => {
            for (name, description) in ActionRegistry::global().provider_info() {
                println!("{:<12} {}", name, description);
            }
        }

        Commands::Describe { pipeline } => {
            let file = PipelineFile::from_file(&pipeline)
                .with_context(|| format!("failed to load pipeline {}", pipeline.display()))?;
            let pipeline = file
                .build(ActionRegistry::global(), Arc::new(CompositeSink::default()))
                .context("failed to build pipeline")?;

            println!("{}", serde_json::to_string_pretty(&pipeline.descriptor())?);
        }
    }

    Ok(())
}

/// Load audit settings: file, then environment, then command line
fn load_audit_config(path: Option<&Path>, channels: Option<&str>, stdout_is_output: bool) -> Result<AuditConfig> {
    let mut config = match path {
        Some(path) => AuditConfig::from_file(path)
            .with_context(|| format!("failed to load audit config {}", path.display()))?,
        None => AuditConfig::default(),
    };

    config.apply_env();
    if let Some(channels) = channels {
        config.configure_from_str(channels);
    }

    // Keep stdout clean for records
    if stdout_is_output {
        config.console = ConsoleTarget::Stderr;
    }

    info!(channels = ?config.channels, "Audit configuration loaded");
    Ok(config)
}

/// Initialize tracing subscriber on stderr
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("fieldguard=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fieldguard=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
