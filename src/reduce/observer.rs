use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;
use serde_json::json;

use crate::types::{DType, Numeric};

/// Events emitted by the [`crate::reduce::Reducer`] during a run.
#[derive(Debug, Clone)]
pub enum ReduceEvent {
    RunStarted {
        columns: usize,
        rows: usize,
    },
    ColumnConverted {
        column: String,
        from: DType,
        to: DType,
    },
    ColumnUnchanged {
        column: String,
        dtype: DType,
    },
    /// No catalog candidate covered the column's observed bounds.
    ColumnNoFit {
        column: String,
        min: Option<Numeric>,
        max: Option<Numeric>,
    },
    /// A column-scoped fault; the column was kept unchanged.
    ColumnFailed {
        column: String,
        error: String,
    },
    RunFinished {
        bytes_before: usize,
        bytes_after: usize,
        elapsed: Duration,
        metrics: ReduceMetricsSnapshot,
    },
}

impl ReduceEvent {
    /// JSON rendering used by [`JsonFileObserver`].
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ReduceEvent::RunStarted { columns, rows } => json!({
                "event": "run_started",
                "columns": columns,
                "rows": rows,
            }),
            ReduceEvent::ColumnConverted { column, from, to } => json!({
                "event": "column_converted",
                "column": column,
                "from": from.to_string(),
                "to": to.to_string(),
            }),
            ReduceEvent::ColumnUnchanged { column, dtype } => json!({
                "event": "column_unchanged",
                "column": column,
                "dtype": dtype.to_string(),
            }),
            ReduceEvent::ColumnNoFit { column, min, max } => json!({
                "event": "column_no_fit",
                "column": column,
                "min": min.map(|v| v.to_string()),
                "max": max.map(|v| v.to_string()),
            }),
            ReduceEvent::ColumnFailed { column, error } => json!({
                "event": "column_failed",
                "column": column,
                "error": error,
            }),
            ReduceEvent::RunFinished {
                bytes_before,
                bytes_after,
                elapsed,
                metrics,
            } => json!({
                "event": "run_finished",
                "bytes_before": bytes_before,
                "bytes_after": bytes_after,
                "elapsed_ms": elapsed.as_millis() as u64,
                "metrics": metrics,
            }),
        }
    }
}

/// Observer hook for reduction events (metrics/logging/alerting).
pub trait ReduceObserver: Send + Sync {
    fn on_event(&self, event: &ReduceEvent);
}

/// A simple stderr logger for reduction events.
#[derive(Debug, Default)]
pub struct StdErrReduceObserver;

impl ReduceObserver for StdErrReduceObserver {
    fn on_event(&self, event: &ReduceEvent) {
        eprintln!("[reduce] {event:?}");
    }
}

/// Appends reduction events to a local file as JSON lines.
///
/// Writes are best-effort; failures to open/write the log file are ignored.
#[derive(Debug)]
pub struct JsonFileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileObserver {
    /// Create an observer that appends one JSON object per event to `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }
}

impl ReduceObserver for JsonFileObserver {
    fn on_event(&self, event: &ReduceEvent) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{}", event.to_json());
        }
    }
}

/// Real-time counters for a reduction run.
///
/// The orchestrator updates these during execution; callers can snapshot them at any
/// time via [`crate::reduce::Reducer::metrics`].
pub struct ReduceMetrics {
    columns_processed: AtomicU64,
    columns_converted: AtomicU64,
    columns_unchanged: AtomicU64,
    columns_no_fit: AtomicU64,
    columns_failed: AtomicU64,
    bytes_before: AtomicU64,
    bytes_after: AtomicU64,
    elapsed_ns: AtomicU64,
}

impl ReduceMetrics {
    pub fn new() -> Self {
        Self {
            columns_processed: AtomicU64::new(0),
            columns_converted: AtomicU64::new(0),
            columns_unchanged: AtomicU64::new(0),
            columns_no_fit: AtomicU64::new(0),
            columns_failed: AtomicU64::new(0),
            bytes_before: AtomicU64::new(0),
            bytes_after: AtomicU64::new(0),
            elapsed_ns: AtomicU64::new(0),
        }
    }

    pub(crate) fn begin_run(&self) {
        self.columns_processed.store(0, Ordering::SeqCst);
        self.columns_converted.store(0, Ordering::SeqCst);
        self.columns_unchanged.store(0, Ordering::SeqCst);
        self.columns_no_fit.store(0, Ordering::SeqCst);
        self.columns_failed.store(0, Ordering::SeqCst);
        self.bytes_before.store(0, Ordering::SeqCst);
        self.bytes_after.store(0, Ordering::SeqCst);
        self.elapsed_ns.store(0, Ordering::SeqCst);
    }

    pub(crate) fn end_run(&self, bytes_before: usize, bytes_after: usize, elapsed: Duration) {
        self.bytes_before.store(bytes_before as u64, Ordering::SeqCst);
        self.bytes_after.store(bytes_after as u64, Ordering::SeqCst);
        self.elapsed_ns
            .store(elapsed.as_nanos().min(u64::MAX as u128) as u64, Ordering::SeqCst);
    }

    pub(crate) fn on_converted(&self) {
        let _ = self.columns_processed.fetch_add(1, Ordering::SeqCst);
        let _ = self.columns_converted.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn on_unchanged(&self) {
        let _ = self.columns_processed.fetch_add(1, Ordering::SeqCst);
        let _ = self.columns_unchanged.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn on_no_fit(&self) {
        let _ = self.columns_processed.fetch_add(1, Ordering::SeqCst);
        let _ = self.columns_no_fit.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn on_failed(&self) {
        let _ = self.columns_processed.fetch_add(1, Ordering::SeqCst);
        let _ = self.columns_failed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ReduceMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        ReduceMetricsSnapshot {
            columns_processed: self.columns_processed.load(Ordering::SeqCst),
            columns_converted: self.columns_converted.load(Ordering::SeqCst),
            columns_unchanged: self.columns_unchanged.load(Ordering::SeqCst),
            columns_no_fit: self.columns_no_fit.load(Ordering::SeqCst),
            columns_failed: self.columns_failed.load(Ordering::SeqCst),
            bytes_before: self.bytes_before.load(Ordering::SeqCst),
            bytes_after: self.bytes_after.load(Ordering::SeqCst),
            elapsed: (elapsed_ns > 0).then(|| Duration::from_nanos(elapsed_ns)),
        }
    }
}

impl Default for ReduceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot of [`ReduceMetrics`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReduceMetricsSnapshot {
    pub columns_processed: u64,
    pub columns_converted: u64,
    pub columns_unchanged: u64,
    pub columns_no_fit: u64,
    pub columns_failed: u64,
    pub bytes_before: u64,
    pub bytes_after: u64,
    pub elapsed: Option<Duration>,
}

impl fmt::Display for ReduceMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "columns={} converted={} unchanged={} no_fit={} failed={} bytes={}->{} elapsed={:?}",
            self.columns_processed,
            self.columns_converted,
            self.columns_unchanged,
            self.columns_no_fit,
            self.columns_failed,
            self.bytes_before,
            self.bytes_after,
            self.elapsed
        )
    }
}
