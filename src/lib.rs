//! `dataset-diet` shrinks in-memory tabular datasets by rewriting every column with the
//! narrowest representation that still holds its values exactly.
//!
//! The crate works column by column:
//!
//! - integer columns are downcast to the narrowest 8/16/32/64-bit signed or unsigned
//!   type that covers their observed `[min, max]` (unsigned when the minimum is ≥ 0)
//! - float columns that are actually integer-valued (within a whole-column tolerance)
//!   are routed through the integer grid; genuinely fractional ones are downcast to
//!   `float32` when their range allows
//! - integer columns with missing values use nullable integer storage instead of being
//!   promoted to float
//! - low-cardinality text columns become dictionary-encoded categoricals
//!
//! Columns that fit nothing are left untouched and reported; a fault in one column never
//! aborts the others.
//!
//! ## Quick example
//!
//! ```rust
//! use dataset_diet::reduce::{ReduceOptions, Reducer};
//! use dataset_diet::types::{Column, ColumnData, DType, DataSet};
//!
//! let ds = DataSet::new(vec![
//!     Column::new("counts", ColumnData::Int64(vec![0, 42, 130])),
//!     Column::new("ratios", ColumnData::Float64(vec![0.25, 0.5, 0.75])),
//! ])
//! .unwrap();
//!
//! let reducer = Reducer::new(ReduceOptions::default()).unwrap();
//! let out = reducer.reduce(&ds);
//!
//! assert_eq!(out.column("counts").unwrap().dtype(), DType::UInt8);
//! assert_eq!(out.column("ratios").unwrap().dtype(), DType::Float32);
//! assert!(out.estimated_size() <= ds.estimated_size());
//! ```
//!
//! ## Loading data
//!
//! A schema-inferring CSV loader is included for the common "load, then shrink" path:
//!
//! ```no_run
//! use dataset_diet::ingestion::{read_csv_from_path, CsvOptions};
//! use dataset_diet::reduce::{ReduceOptions, Reducer};
//!
//! # fn main() -> Result<(), dataset_diet::ReduceError> {
//! let ds = read_csv_from_path("data.csv", &CsvOptions::default())?;
//! let out = Reducer::new(ReduceOptions::default())?.reduce(&ds);
//! println!("rows={}, bytes={}", out.row_count(), out.estimated_size());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: columnar dataset model (columns, dtypes, missing values)
//! - [`catalog`]: the ordered table of downcast candidates per category
//! - [`classify`]: the per-column classification and downcast procedure
//! - [`reduce`]: the orchestrator (parallel fan-out, metrics, observers)
//! - [`ingestion`]: CSV loading with type inference
//! - [`error`]: error types used across the crate

pub mod catalog;
pub mod classify;
pub mod error;
pub mod ingestion;
pub mod reduce;
pub mod types;

pub use error::{ReduceError, ReduceResult};
