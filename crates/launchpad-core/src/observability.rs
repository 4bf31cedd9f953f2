//! Observability: tracing init and the JSONL stage audit log.
//!
//! Uses config::ObservabilityConfig for LAUNCHPAD_QUIET, LOG_LEVEL, LOG_JSON, AUDIT_LOG.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use serde_json::{json, Value};
use tracing_subscriber::{prelude::*, EnvFilter};

static AUDIT_PATH: Mutex<Option<String>> = Mutex::new(None);

/// Initialize tracing. Call once at process startup.
///
/// Logs go to stderr so the launched application owns stdout. When
/// LAUNCHPAD_QUIET=1 only WARN and above are logged. `RUST_LOG` wins over
/// LAUNCHPAD_LOG_LEVEL.
pub fn init_tracing() {
    let cfg = crate::config::ObservabilityConfig::from_env();
    let level: String = if cfg.quiet {
        "launchpad=warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}

fn get_audit_path() -> Option<String> {
    {
        let guard = AUDIT_PATH.lock().ok()?;
        if let Some(ref p) = *guard {
            return Some(p.clone());
        }
    }
    let path = crate::config::ObservabilityConfig::from_env().audit_log.clone()?;
    if let Some(parent) = Path::new(&path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    {
        let mut guard = AUDIT_PATH.lock().ok()?;
        *guard = Some(path.clone());
    }
    Some(path)
}

fn now_ts() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Append one JSON record as a line. Audit failures never abort the run.
pub fn append_jsonl(path: &Path, record: &Value) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

/// Record for a stage that is about to run.
pub fn stage_started_record(stage: &str, details: Value) -> Value {
    json!({
        "ts": now_ts(),
        "event": "stage_started",
        "stage": stage,
        "details": details,
    })
}

/// Record for a stage that finished (successfully or not).
pub fn stage_completed_record(stage: &str, success: bool, duration_ms: u64, details: Value) -> Value {
    json!({
        "ts": now_ts(),
        "event": "stage_completed",
        "stage": stage,
        "success": success,
        "duration_ms": duration_ms,
        "details": details,
    })
}

/// Audit: stage_started
pub fn audit_stage_started(stage: &str, details: Value) {
    if let Some(path) = get_audit_path() {
        append_jsonl(Path::new(&path), &stage_started_record(stage, details));
    }
}

/// Audit: stage_completed
pub fn audit_stage_completed(stage: &str, success: bool, duration_ms: u64, details: Value) {
    if let Some(path) = get_audit_path() {
        append_jsonl(
            Path::new(&path),
            &stage_completed_record(stage, success, duration_ms, details),
        );
    }
}
