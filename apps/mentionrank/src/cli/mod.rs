//! # mentionrank CLI Module
//!
//! This module implements the CLI interface for mentionrank.
//!
//! ## Available Commands
//!
//! - `serve` - Run the engine with the HTTP API until Ctrl+C
//! - `status` - Show store counters
//! - `ingest` - Ingest events from a file, recompute and persist
//! - `order` - Print the leaderboard
//! - `export` - Write the leaderboard to a JSON file
//! - `init` - Create an empty persisted store

mod commands;

use crate::config::{Backend, ServiceConfig};
use clap::{Parser, Subcommand};
use mentionrank_core::RankError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// mentionrank - rank events by how often other events mention them
#[derive(Parser, Debug)]
#[command(name = "mentionrank")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding persisted state (overrides the config file)
    #[arg(short = 'D', long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Storage backend: "file" or "redb" (overrides the config file)
    #[arg(short = 'B', long, global = true)]
    pub backend: Option<String>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the engine and the HTTP API
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Seconds between recomputation passes (0 disables)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Show store counters
    Status,

    /// Ingest events from a file, then recompute and persist
    Ingest {
        /// Path to the input file
        #[arg(short, long)]
        file: PathBuf,

        /// Input format (auto, json, ndjson)
        #[arg(short = 't', long, default_value = "auto")]
        format: String,
    },

    /// Print the leaderboard
    Order {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Write the leaderboard to a JSON file
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Number of entries to export (all when omitted)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Create an empty persisted store
    Init {
        /// Overwrite an existing store
        #[arg(short, long)]
        force: bool,
    },
}

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: ServiceConfig,
    pub json_mode: bool,
}

impl Context {
    /// Resolve the configuration file and the global flags.
    pub fn from_cli(cli: &Cli) -> Result<Self, RankError> {
        let mut config = match &cli.config {
            Some(path) => ServiceConfig::from_file(path)?,
            None => ServiceConfig::default(),
        };
        if let Some(dir) = &cli.data_dir {
            config.data_dir.clone_from(dir);
        }
        if let Some(name) = &cli.backend {
            config.backend = Backend::parse(name)?;
        }

        Ok(Self {
            config,
            json_mode: cli.json_mode,
        })
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), RankError> {
    let ctx = Context::from_cli(&cli)?;

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            interval,
        }) => {
            let mut config = ctx.config.clone();
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(secs) = interval {
                config.recompute_interval_secs = secs;
            }
            cmd_serve(&config).await
        }
        Some(Commands::Status) => cmd_status(&ctx),
        Some(Commands::Ingest { file, format }) => cmd_ingest(&ctx, &file, &format),
        Some(Commands::Order { limit }) => cmd_order(&ctx, limit),
        Some(Commands::Export { output, limit }) => cmd_export(&ctx, &output, limit),
        Some(Commands::Init { force }) => cmd_init(&ctx, force),
        None => cmd_status(&ctx),
    }
}
