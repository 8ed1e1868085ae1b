//! Command line interface
//!
//! - `serve`: HTTP server
//! - `ask`: answer one question on stdout
//! - `clear-cache`: empty the answer cache

pub mod ask;
pub mod clear_cache;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Handbook RAG - question answering over administrative documents
#[derive(Parser)]
#[command(name = "handbook-rag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Answer a single question and print the result
    Ask(ask::AskArgs),

    /// Remove every cached answer
    ClearCache,
}

/// Loads `.env`, the layered configuration and the log subscriber
pub(crate) fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Invalid configuration, using defaults: {}", e);
        AppConfig::default()
    });
    logging::init_logging(&config.logging);
    config
}
