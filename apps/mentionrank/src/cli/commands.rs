//! # CLI Command Implementations
//!
//! Offline commands open the configured gateway, start a [`Lifecycle`]
//! against it and, when they change the store, shut it down again so the
//! result is persisted.

use super::Context;
use crate::api::{self, EventRequest, OrderResponse, RankEntry};
use crate::config::ServiceConfig;
use crate::service::RankingService;
use crate::storage::open_gateway;
use mentionrank_core::{
    Event, IngestOutcome, Lifecycle, LoadOutcome, PersistOutcome, RankError, RankingEngine,
    primitives::MAX_BATCH_LENGTH,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for ingestion (100 MB).
const MAX_INGEST_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), RankError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| RankError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(RankError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Canonicalize an input path and make sure it is a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, RankError> {
    let canonical = path.canonicalize().map_err(|e| {
        RankError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(RankError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Canonicalize the parent of an output path.
fn validate_output_path(path: &Path) -> Result<PathBuf, RankError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        RankError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(RankError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| RankError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Run the engine and the HTTP API until Ctrl+C.
pub async fn cmd_serve(config: &ServiceConfig) -> Result<(), RankError> {
    let lifecycle = Arc::new(open_lifecycle(config)?);
    let shutdown = CancellationToken::new();
    let tracker = TaskTracker::new();

    let service = RankingService::start(
        lifecycle,
        shutdown.clone(),
        &tracker,
        config.recompute_interval(),
    )
    .await?;

    println!("mentionrank starting...");
    println!();
    println!("Configuration:");
    println!("  Host:      {}", config.host);
    println!("  Port:      {}", config.port);
    println!("  Backend:   {}", config.backend.name());
    println!("  Data dir:  {:?}", config.data_dir);
    println!("  Slot:      {}/{}", config.namespace, config.key);
    match config.recompute_interval() {
        Some(every) => println!("  Recompute: every {}s", every.as_secs()),
        None => println!("  Recompute: on request only"),
    }
    println!("  Restored:  {}", describe_load(service.load_outcome()));
    println!();
    println!("Endpoints:");
    println!("  POST /event     - Ingest an event");
    println!("  POST /recompute - Run a recomputation pass");
    println!("  GET  /order     - Leaderboard");
    println!("  GET  /records/{{id}} - One record");
    println!("  GET  /status    - Store counters");
    println!("  GET  /kinds     - Events per kind");
    println!("  POST /export    - Persisted blob (base64)");
    println!("  GET  /health    - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("shutdown requested");
                signal_token.cancel();
            }
            Err(e) => tracing::error!(error = %e, "cannot listen for Ctrl+C"),
        }
    });

    let served = api::run_server(&config.bind_addr(), service.engine(), shutdown.clone()).await;

    shutdown.cancel();
    tracker.close();
    tracker.wait().await;

    served
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show store counters.
pub fn cmd_status(ctx: &Context) -> Result<(), RankError> {
    let lifecycle = open_lifecycle(&ctx.config)?;
    let load = lifecycle.start()?;
    let engine = lifecycle.engine();
    let metrics = engine.metrics();

    if ctx.json_mode {
        let output = serde_json::json!({
            "data_dir": ctx.config.data_dir.to_string_lossy(),
            "backend": ctx.config.backend.name(),
            "load": load,
            "records": metrics.records,
            "events": metrics.events,
            "placeholders": metrics.placeholders,
            "total_mentions": metrics.total_mentions,
            "mentioned": metrics.mentioned,
            "mean_mentions_millis": metrics.mean_mentions_millis,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("mentionrank Status");
    println!("==================");
    println!("Data dir: {:?}", ctx.config.data_dir);
    println!("Backend:  {}", ctx.config.backend.name());
    println!("Restored: {}", describe_load(&load));
    println!();
    println!("Records:        {}", metrics.records);
    println!("Events:         {}", metrics.events);
    println!("Placeholders:   {}", metrics.placeholders);
    println!("Total mentions: {}", metrics.total_mentions);
    println!("Mentioned:      {}", metrics.mentioned);
    println!(
        "Mean mentions:  {}.{:03}",
        metrics.mean_mentions_millis / 1000,
        metrics.mean_mentions_millis % 1000
    );

    let kinds = engine.count_by_kind();
    if !kinds.is_empty() {
        println!();
        println!("Kinds:");
        for (kind, count) in &kinds {
            println!("  {:>6}: {}", kind.value(), count);
        }
    }

    Ok(())
}

// =============================================================================
// INGEST COMMAND
// =============================================================================

/// Ingest events from a file, recompute and persist.
pub fn cmd_ingest(ctx: &Context, file: &Path, format: &str) -> Result<(), RankError> {
    tracing::info!("Ingesting from {:?} (format: {})", file, format);

    let validated_path = validate_file_path(file)?;
    validate_file_size(&validated_path, MAX_INGEST_FILE_SIZE)?;

    let contents = std::fs::read(&validated_path)
        .map_err(|e| RankError::IoError(format!("Read file: {}", e)))?;
    let events = parse_events(&contents, format)?;

    let lifecycle = open_lifecycle(&ctx.config)?;
    lifecycle.start()?;
    let engine = lifecycle.engine();

    let receipts = engine.ingest_batch(events);
    let replaced_placeholders = receipts
        .iter()
        .filter(|r| r.outcome == IngestOutcome::ReplacedPlaceholder)
        .count();
    let stats = engine.recompute();
    let persisted = lifecycle.shutdown()?;

    if let PersistOutcome::Failed { reason } = &persisted {
        return Err(RankError::IoError(format!("Persist failed: {}", reason)));
    }

    if ctx.json_mode {
        let output = serde_json::json!({
            "ingested": receipts.len(),
            "replaced_placeholders": replaced_placeholders,
            "recompute": stats,
            "persist": persisted,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Ingested {} events", receipts.len());
    if replaced_placeholders > 0 {
        println!("Replaced {} placeholders", replaced_placeholders);
    }
    println!(
        "Store now has {} records ({} placeholders created, {} mentions)",
        stats.records, stats.placeholders_created, stats.mentions
    );

    Ok(())
}

/// Parse a JSON array or newline-delimited JSON events.
///
/// `auto` picks the array form when the first non-whitespace byte is `[`.
pub fn parse_events(contents: &[u8], format: &str) -> Result<Vec<Event>, RankError> {
    let format = match format {
        "auto" => {
            let first = contents.iter().find(|b| !b.is_ascii_whitespace());
            if first == Some(&b'[') { "json" } else { "ndjson" }
        }
        other => other,
    };

    let requests: Vec<EventRequest> = match format {
        "json" => serde_json::from_slice(contents)
            .map_err(|e| RankError::DeserializationError(format!("Invalid JSON: {}", e)))?,
        "ndjson" => {
            let text = std::str::from_utf8(contents)
                .map_err(|e| RankError::DeserializationError(format!("Invalid UTF-8: {}", e)))?;
            text.lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(i, line)| {
                    serde_json::from_str(line).map_err(|e| {
                        RankError::DeserializationError(format!("Line {}: {}", i + 1, e))
                    })
                })
                .collect::<Result<_, _>>()?
        }
        other => {
            return Err(RankError::DeserializationError(format!(
                "Unknown format: {}. Use: auto, json, ndjson",
                other
            )));
        }
    };

    if requests.len() > MAX_BATCH_LENGTH {
        return Err(RankError::InvalidEvent(format!(
            "Event count {} exceeds maximum {}",
            requests.len(),
            MAX_BATCH_LENGTH
        )));
    }

    requests.iter().map(EventRequest::to_event).collect()
}

// =============================================================================
// ORDER COMMAND
// =============================================================================

/// Print the leaderboard.
pub fn cmd_order(ctx: &Context, limit: usize) -> Result<(), RankError> {
    let order = load_ordering(&ctx.config, Some(limit))?;

    if ctx.json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&order).unwrap_or_default()
        );
        return Ok(());
    }

    if order.entries.is_empty() {
        println!("No records");
        return Ok(());
    }

    println!("{:>5}  {:>6}  {:>8}  {:>5}  event", "rank", "score", "mentions", "kind");
    for entry in &order.entries {
        let kind = entry
            .kind
            .map(|k| k.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>5}  {:>6}  {:>8}  {:>5}  {}",
            entry.rank, entry.score, entry.mentions, kind, entry.event_id
        );
    }
    if order.total > order.entries.len() {
        println!("... and {} more", order.total - order.entries.len());
    }

    Ok(())
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Write the leaderboard to a JSON file.
pub fn cmd_export(ctx: &Context, output: &Path, limit: Option<usize>) -> Result<(), RankError> {
    let validated_output = validate_output_path(output)?;
    let order = load_ordering(&ctx.config, limit)?;

    let data = serde_json::to_vec_pretty(&order)
        .map_err(|e| RankError::SerializationError(e.to_string()))?;
    std::fs::write(&validated_output, &data)
        .map_err(|e| RankError::IoError(format!("Write file: {}", e)))?;

    println!(
        "Exported {} entries ({} bytes) to {:?}",
        order.entries.len(),
        data.len(),
        validated_output
    );

    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Create an empty persisted store.
pub fn cmd_init(ctx: &Context, force: bool) -> Result<(), RankError> {
    let config = &ctx.config;
    let gateway = open_gateway(config.backend, &config.data_dir)?;

    let existing = gateway.read(&config.namespace, &config.key)?;
    if existing.is_some_and(|bytes| !bytes.is_empty()) && !force {
        return Err(RankError::IoError(
            "Store already exists. Use --force to overwrite.".to_string(),
        ));
    }

    let empty = RankingEngine::new().snapshot_bytes()?;
    gateway.write(&config.namespace, &config.key, &empty)?;

    println!(
        "Initialized empty {} store at {:?} ({}/{})",
        config.backend.name(),
        config.data_dir,
        config.namespace,
        config.key
    );

    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Build a stopped lifecycle over the configured gateway and slot.
pub fn open_lifecycle(config: &ServiceConfig) -> Result<Lifecycle, RankError> {
    let gateway = open_gateway(config.backend, &config.data_dir)?;
    Ok(Lifecycle::new(
        Arc::new(RankingEngine::new()),
        gateway,
        config.slot(),
    ))
}

/// Load the store, run a pass and return the first `limit` entries.
fn load_ordering(config: &ServiceConfig, limit: Option<usize>) -> Result<OrderResponse, RankError> {
    let lifecycle = open_lifecycle(config)?;
    lifecycle.start()?;
    let engine = lifecycle.engine();
    engine.recompute();

    let snapshot = engine.current_order();
    let shown = snapshot.top(limit.unwrap_or(snapshot.len()));
    Ok(OrderResponse {
        total: snapshot.len(),
        entries: RankEntry::from_ordering(shown),
    })
}

fn describe_load(load: &LoadOutcome) -> String {
    match load {
        LoadOutcome::Restored { records } => format!("{} records", records),
        LoadOutcome::NoData => "nothing (fresh store)".to_string(),
        LoadOutcome::Discarded { reason } => format!("nothing, blob discarded: {}", reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Backend;
    use tempfile::tempdir;

    fn context(dir: &Path) -> Context {
        Context {
            config: ServiceConfig {
                backend: Backend::File,
                data_dir: dir.to_path_buf(),
                ..ServiceConfig::default()
            },
            json_mode: true,
        }
    }

    #[test]
    fn parse_events_accepts_array_and_ndjson() {
        let array = br#"[{"id":"a","kind":1},{"id":"b","kind":1,"tags":[["e","a"]]}]"#;
        let ndjson = b"{\"id\":\"a\",\"kind\":1}\n\n{\"id\":\"b\",\"kind\":1,\"tags\":[[\"e\",\"a\"]]}\n";

        let from_array = parse_events(array, "auto").expect("array");
        let from_lines = parse_events(ndjson, "auto").expect("ndjson");

        assert_eq!(from_array, from_lines);
        assert_eq!(from_array.len(), 2);
        assert_eq!(from_array[1].references().len(), 1);
    }

    #[test]
    fn parse_events_rejects_bad_input() {
        assert!(parse_events(b"[{\"kind\":1}]", "json").is_err());
        assert!(parse_events(b"[{\"id\":\"\",\"kind\":1}]", "json").is_err());
        assert!(parse_events(b"{}", "xml").is_err());
    }

    #[test]
    fn ingest_then_order_reads_persisted_state() {
        let temp = tempdir().expect("temp dir");
        let ctx = context(temp.path());
        let input = temp.path().join("events.json");
        std::fs::write(
            &input,
            r#"[
                {"id":"e1","kind":1},
                {"id":"e2","kind":1,"tags":[["e","e1"]]},
                {"id":"e3","kind":1,"tags":[["e","e1"],["e","ghost"]]}
            ]"#,
        )
        .expect("write input");

        cmd_ingest(&ctx, &input, "auto").expect("ingest");
        let order = load_ordering(&ctx.config, Some(1)).expect("order");

        assert_eq!(order.total, 4);
        assert_eq!(order.entries.len(), 1);
        assert_eq!(order.entries[0].event_id, "e1");
        assert_eq!(order.entries[0].mentions, 2);
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let temp = tempdir().expect("temp dir");
        let ctx = context(temp.path());
        let input = temp.path().join("events.ndjson");
        std::fs::write(&input, "{\"id\":\"a\",\"kind\":1}\n").expect("write input");

        cmd_init(&ctx, false).expect("first init");
        cmd_ingest(&ctx, &input, "ndjson").expect("ingest");

        assert!(cmd_init(&ctx, false).is_err());
        cmd_init(&ctx, true).expect("forced init");
        assert_eq!(load_ordering(&ctx.config, None).expect("order").total, 0);
    }

    #[test]
    fn export_writes_leaderboard_json() {
        let temp = tempdir().expect("temp dir");
        let ctx = context(temp.path());
        let input = temp.path().join("events.json");
        std::fs::write(&input, r#"[{"id":"a","kind":1,"tags":[["e","b"]]}]"#)
            .expect("write input");
        cmd_ingest(&ctx, &input, "json").expect("ingest");

        let output = temp.path().join("order.json");
        cmd_export(&ctx, &output, None).expect("export");

        let written: OrderResponse =
            serde_json::from_slice(&std::fs::read(&output).expect("read export")).expect("json");
        assert_eq!(written.total, 2);
        assert_eq!(written.entries[0].event_id, "b");
        assert!(written.entries[0].placeholder);
    }
}
