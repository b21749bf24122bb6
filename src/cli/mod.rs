//! CLI module for Hybrid RAG
//!
//! Provides subcommands:
//! - `chat`: interactive question loop (default)
//! - `ask`: answer a single question and exit

pub mod chat;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::observability::init_metrics;

/// Hybrid RAG - travel questions answered from vector and graph context
#[derive(Parser)]
#[command(name = "hybrid-rag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Ask questions interactively until `exit` or `quit`
    Chat,

    /// Answer one question and exit
    Ask {
        /// The question to answer
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

/// Loads configuration and installs logging and metrics
pub fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging);
    init_metrics(&config.metrics)?;

    info!(store = %config.store.backend, "Configuration loaded");
    Ok(config)
}
