//! Reduction orchestrator: fans a dataset's columns out to the classifier, reassembles
//! the results in original column order, and reports aggregate size change.
//!
//! Columns are mutually independent, so the fan-out runs on a rayon pool with no shared
//! mutable state; workers read the immutable options and write only their own result
//! slot. Per-column faults are collected as values and never abort the run: the worst
//! case for any column is "unchanged from input".

mod observer;

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::catalog::ConversionTable;
use crate::classify::{classify_column, ColumnAction, ColumnOutcome};
use crate::error::ReduceResult;
use crate::types::DataSet;

pub use observer::{
    JsonFileObserver, ReduceEvent, ReduceMetrics, ReduceMetricsSnapshot, ReduceObserver,
    StdErrReduceObserver,
};

const BYTES_PER_MIB: f64 = (1024 * 1024) as f64;

/// Configuration for a [`Reducer`].
///
/// Constructed once, validated at [`Reducer::new`], and immutable for the reducer's
/// lifetime; every parallel worker reads the same instance.
#[derive(Debug, Clone)]
pub struct ReduceOptions {
    /// Candidate catalog driving the downcast search.
    pub conversion_table: ConversionTable,
    /// Convert low-cardinality all-text object columns to the categorical
    /// representation.
    pub use_categoricals: bool,
    /// Use nullable integer storage for integer columns with missing values, instead of
    /// forcing a float promotion.
    pub use_nullable_ints: bool,
    /// Number of worker threads. `None` uses the platform's available parallelism;
    /// `Some(1)` runs fully sequential.
    pub num_threads: Option<usize>,
    /// Print per-column diagnostics and the run summary to stderr. Affects diagnostics
    /// only, never classification behavior.
    pub verbose: bool,
}

impl Default for ReduceOptions {
    fn default() -> Self {
        Self {
            conversion_table: ConversionTable::default(),
            use_categoricals: true,
            use_nullable_ints: true,
            num_threads: None,
            verbose: false,
        }
    }
}

/// Shrinks datasets column by column.
pub struct Reducer {
    pool: ThreadPool,
    opts: ReduceOptions,
    observer: Option<Arc<dyn ReduceObserver>>,
    metrics: Arc<ReduceMetrics>,
}

impl Reducer {
    /// Create a reducer, validating the conversion table up front.
    ///
    /// A broken table (empty category, misfiled candidate, wrong ordering) fails here
    /// with a descriptive error instead of manifesting confusingly per column.
    pub fn new(opts: ReduceOptions) -> ReduceResult<Self> {
        opts.conversion_table.validate()?;

        let n_threads = opts
            .num_threads
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
            .max(1);

        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build()
            .expect("failed to build rayon thread pool");

        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ReduceMetrics::new()),
        })
    }

    /// Attach an observer for reduction events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ReduceObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time reduction metrics.
    pub fn metrics(&self) -> Arc<ReduceMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Reduce every column of `dataset` to its narrowest sufficient representation.
    ///
    /// The output has the same column names, order, and row count as the input; only
    /// per-column representations change. Size-before/size-after and elapsed time are
    /// reported through metrics and observer events, not the return value.
    pub fn reduce(&self, dataset: &DataSet) -> DataSet {
        self.pool
            .install(|| self.measured(dataset, |ds| self.reduce_columns(ds)))
    }

    /// Measurement wrapper around a whole-dataset operation: records size before/after
    /// and wall time, and emits the run lifecycle events.
    fn measured<F>(&self, dataset: &DataSet, op: F) -> DataSet
    where
        F: FnOnce(&DataSet) -> DataSet,
    {
        let start = Instant::now();
        self.metrics.begin_run();
        let bytes_before = dataset.estimated_size();
        self.emit(ReduceEvent::RunStarted {
            columns: dataset.columns.len(),
            rows: dataset.row_count(),
        });

        let out = op(dataset);

        let elapsed = start.elapsed();
        let bytes_after = out.estimated_size();
        self.metrics.end_run(bytes_before, bytes_after, elapsed);
        self.emit(ReduceEvent::RunFinished {
            bytes_before,
            bytes_after,
            elapsed,
            metrics: self.metrics.snapshot(),
        });
        if self.opts.verbose {
            eprintln!(
                "reduced dataset from {:.4} MiB to {:.4} MiB in {:.2} seconds",
                bytes_before as f64 / BYTES_PER_MIB,
                bytes_after as f64 / BYTES_PER_MIB,
                elapsed.as_secs_f64()
            );
        }

        out
    }

    fn reduce_columns(&self, dataset: &DataSet) -> DataSet {
        // par_iter is indexed, so collect reassembles results by input position, never
        // by completion order.
        let outcomes: Vec<ReduceResult<ColumnOutcome>> = dataset
            .columns
            .par_iter()
            .map(|column| classify_column(column, &self.opts))
            .collect();

        let mut columns = Vec::with_capacity(dataset.columns.len());
        for (input, outcome) in dataset.columns.iter().zip(outcomes) {
            match outcome {
                Ok(out) => {
                    self.record(&out);
                    columns.push(out.column);
                }
                Err(err) => {
                    self.metrics.on_failed();
                    eprintln!("column '{}' failed, keeping it unchanged: {err}", input.name);
                    self.emit(ReduceEvent::ColumnFailed {
                        column: input.name.clone(),
                        error: err.to_string(),
                    });
                    columns.push(input.clone());
                }
            }
        }

        // Column lengths are untouched by classification, so the shape invariant holds
        // by construction.
        DataSet { columns }
    }

    fn record(&self, outcome: &ColumnOutcome) {
        let name = outcome.column.name.as_str();
        match &outcome.action {
            ColumnAction::Converted { from, to } => {
                self.metrics.on_converted();
                if self.opts.verbose {
                    eprintln!("convert {name} from {from} to {to}");
                }
                self.emit(ReduceEvent::ColumnConverted {
                    column: name.to_string(),
                    from: *from,
                    to: *to,
                });
            }
            ColumnAction::Unchanged => {
                self.metrics.on_unchanged();
                if self.opts.verbose {
                    eprintln!("{name} is {} - skip", outcome.column.dtype());
                }
                self.emit(ReduceEvent::ColumnUnchanged {
                    column: name.to_string(),
                    dtype: outcome.column.dtype(),
                });
            }
            ColumnAction::NoFit { min, max } => {
                self.metrics.on_no_fit();
                eprintln!(
                    "warning: {name} does not fit the conversion grid (min: {}, max: {})",
                    min.map(|v| v.to_string()).unwrap_or_else(|| "none".into()),
                    max.map(|v| v.to_string()).unwrap_or_else(|| "none".into()),
                );
                self.emit(ReduceEvent::ColumnNoFit {
                    column: name.to_string(),
                    min: *min,
                    max: *max,
                });
            }
        }
    }

    fn emit(&self, event: ReduceEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ReduceEvent, ReduceObserver, ReduceOptions, Reducer};
    use std::sync::{Arc, Mutex};

    use crate::catalog::ConversionTable;
    use crate::types::{Column, ColumnData, DType, DataSet};

    fn mixed_dataset() -> DataSet {
        let strings: Vec<Option<String>> =
            (0..100).map(|i| Some(format!("tag{}", i % 4))).collect();
        DataSet::new(vec![
            Column::new("counts", ColumnData::Int64((0..100).collect())),
            Column::new(
                "scores",
                ColumnData::Float64((0..100).map(|i| i as f64 + 0.5).collect()),
            ),
            Column::new("tags", ColumnData::Utf8(strings)),
        ])
        .unwrap()
    }

    fn reducer(opts: ReduceOptions) -> Reducer {
        Reducer::new(opts).unwrap()
    }

    #[test]
    fn output_preserves_column_names_order_and_row_count() {
        let ds = mixed_dataset();
        let out = reducer(ReduceOptions::default()).reduce(&ds);
        assert_eq!(
            out.column_names().collect::<Vec<_>>(),
            ds.column_names().collect::<Vec<_>>()
        );
        assert_eq!(out.row_count(), ds.row_count());
    }

    #[test]
    fn reduction_shrinks_the_dataset() {
        let ds = mixed_dataset();
        let r = reducer(ReduceOptions::default());
        let out = r.reduce(&ds);
        assert!(out.estimated_size() <= ds.estimated_size());

        let snap = r.metrics().snapshot();
        assert_eq!(snap.columns_processed, 3);
        assert_eq!(snap.bytes_before, ds.estimated_size() as u64);
        assert_eq!(snap.bytes_after, out.estimated_size() as u64);
        assert!(snap.elapsed.is_some());
    }

    #[test]
    fn sequential_and_parallel_runs_agree() {
        let ds = mixed_dataset();
        let seq = reducer(ReduceOptions {
            num_threads: Some(1),
            ..ReduceOptions::default()
        })
        .reduce(&ds);
        let par = reducer(ReduceOptions {
            num_threads: Some(4),
            ..ReduceOptions::default()
        })
        .reduce(&ds);
        assert_eq!(seq, par);
    }

    #[test]
    fn reducing_twice_is_a_no_op_on_the_second_pass() {
        let ds = mixed_dataset();
        let r = reducer(ReduceOptions::default());
        let once = r.reduce(&ds);
        let twice = r.reduce(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn per_column_fault_keeps_other_columns_converting() {
        let ds = DataSet::new(vec![
            Column::new("good", ColumnData::Int64(vec![1, 2, 3])),
            Column::new(
                "corrupt",
                ColumnData::Categorical {
                    dict: vec!["a".into()],
                    codes: vec![Some(0), Some(9), Some(0)],
                },
            ),
            Column::new("also_good", ColumnData::Int64(vec![-1, 0, 1])),
        ])
        .unwrap();

        let r = reducer(ReduceOptions::default());
        let out = r.reduce(&ds);

        assert_eq!(out.columns.len(), 3);
        assert_eq!(out.columns[0].dtype(), DType::UInt8);
        assert_eq!(out.columns[1], ds.columns[1]);
        assert_eq!(out.columns[2].dtype(), DType::Int8);
        assert_eq!(r.metrics().snapshot().columns_failed, 1);
    }

    #[test]
    fn invalid_conversion_table_fails_at_construction() {
        let opts = ReduceOptions {
            conversion_table: ConversionTable {
                int: vec![],
                ..ConversionTable::default()
            },
            ..ReduceOptions::default()
        };
        assert!(Reducer::new(opts).is_err());
    }

    struct EventNameObserver {
        names: Mutex<Vec<&'static str>>,
    }

    impl ReduceObserver for EventNameObserver {
        fn on_event(&self, event: &ReduceEvent) {
            let name = match event {
                ReduceEvent::RunStarted { .. } => "run_started",
                ReduceEvent::ColumnConverted { .. } => "column_converted",
                ReduceEvent::ColumnUnchanged { .. } => "column_unchanged",
                ReduceEvent::ColumnNoFit { .. } => "column_no_fit",
                ReduceEvent::ColumnFailed { .. } => "column_failed",
                ReduceEvent::RunFinished { .. } => "run_finished",
            };
            self.names.lock().unwrap().push(name);
        }
    }

    #[test]
    fn observer_sees_run_lifecycle_and_column_events() {
        let observer = Arc::new(EventNameObserver {
            names: Mutex::new(Vec::new()),
        });
        let r = reducer(ReduceOptions::default())
            .with_observer(Arc::clone(&observer) as Arc<dyn ReduceObserver>);

        r.reduce(&mixed_dataset());

        let names = observer.names.lock().unwrap();
        assert_eq!(names.first(), Some(&"run_started"));
        assert_eq!(names.last(), Some(&"run_finished"));
        assert_eq!(
            names.iter().filter(|n| **n == "column_converted").count(),
            3
        );
    }

    #[test]
    fn missing_value_positions_survive_reduction() {
        let ds = DataSet::new(vec![Column::new(
            "n",
            ColumnData::NullableInt64(vec![Some(1), None, Some(3), None]),
        )])
        .unwrap();

        let out = reducer(ReduceOptions::default()).reduce(&ds);
        assert_eq!(out.columns[0].dtype(), DType::NullableUInt8);
        assert_eq!(out.columns[0].null_mask(), ds.columns[0].null_mask());
    }
}
