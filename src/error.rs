use thiserror::Error;

/// Convenience result type for reducer operations.
pub type ReduceResult<T> = Result<T, ReduceError>;

/// Error type returned across dataset construction, ingestion, and reduction.
///
/// Configuration errors surface when a [`crate::reduce::Reducer`] is built; per-column
/// faults are isolated by the orchestrator and never abort a whole reduction.
#[derive(Debug, Error)]
pub enum ReduceError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV ingestion error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The conversion table has no candidates for a category.
    #[error("conversion table has no candidates for category '{category}'")]
    EmptyCategory { category: &'static str },

    /// A conversion-table entry does not belong to its category.
    #[error("conversion table entry {dtype} is not a valid '{category}' candidate")]
    CandidateCategoryMismatch {
        category: &'static str,
        dtype: String,
    },

    /// A conversion-table category is not ordered narrowest-first.
    ///
    /// Candidate order is load-bearing: the first fitting candidate must be the minimal
    /// sufficient representation.
    #[error("conversion table for category '{category}' is not ordered narrowest-first ({previous} precedes {dtype})")]
    CandidatesNotNarrowestFirst {
        category: &'static str,
        previous: String,
        dtype: String,
    },

    /// A column could not be classified or converted. Isolated per column.
    #[error("column '{column}': {message}")]
    ColumnFault { column: String, message: String },

    /// Dataset columns do not share a single length.
    #[error("column '{column}' has {length} rows, expected {expected}")]
    ShapeMismatch {
        column: String,
        length: usize,
        expected: usize,
    },
}
