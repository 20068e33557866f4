//! # mentionrank
//!
//! Ranks events by how often other events mention them.
//!
//! ## Usage
//!
//! ```bash
//! # Run the engine with the HTTP API
//! mentionrank serve --host 0.0.0.0 --port 8080 --interval 30
//!
//! # Offline operations
//! mentionrank ingest -f events.ndjson
//! mentionrank order --limit 10
//! mentionrank export -o leaderboard.json
//! ```

use clap::Parser;
use mentionrank::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // MENTIONRANK_LOG_FORMAT=json enables machine-parseable output.
    let log_format =
        std::env::var("MENTIONRANK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mentionrank=info,mentionrank_core=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  mentionrank v{}
  events ranked by the company they keep
"#,
        env!("CARGO_PKG_VERSION")
    );
}
