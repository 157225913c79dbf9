//! CLI module for Grounded RAG
//!
//! Provides subcommands that run the pipeline in the configured mode:
//! - `query`: answer and verify a question against candidate rows from a file
//! - `hydrate`: re-read a stored answer record, healing its summary

pub mod hydrate;
pub mod query;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::observability::{
    init_metrics, init_tracing, shutdown_tracing, PrometheusMetrics,
};

/// Grounded RAG - verified question answering over uploaded documents
#[derive(Parser)]
#[command(name = "grounded-rag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Answer a question against candidate chunk rows
    Query(query::QueryArgs),

    /// Re-hydrate a stored answer record
    Hydrate(hydrate::HydrateArgs),
}

/// Configuration and observability shared by every command
pub(crate) struct Session {
    pub config: AppConfig,
    metrics: Option<PrometheusMetrics>,
}

impl Session {
    pub fn start() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = AppConfig::load()?;
        init_tracing(&config.logging, &config.observability.tracing);
        let metrics = init_metrics(&config.observability.metrics);

        Ok(Self { config, metrics })
    }

    /// Write the metrics exposition when an export path is configured
    pub fn finish(self) -> anyhow::Result<()> {
        if let (Some(metrics), Some(path)) = (
            &self.metrics,
            &self.config.observability.metrics.export_path,
        ) {
            std::fs::write(path, metrics.render())?;
            info!(path = %path, "Metrics exported");
        }
        shutdown_tracing();
        Ok(())
    }
}

/// Pretty JSON on stdout
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
