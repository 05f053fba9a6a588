//! CSV ingestion with per-column type inference.
//!
//! The reducer's usual entry path is "load a file, then shrink it", so this module reads
//! a CSV into reducer-ready columns without requiring a caller-provided schema:
//!
//! - every cell parses as an integer and none are blank → `int64`
//! - every cell parses as a number (blank = missing) → `float64` with `NaN` for blanks,
//!   the same promotion upstream tools apply to integer columns with holes — exactly
//!   what the classifier's integral check later undoes
//! - anything else → `utf8` with blank = missing
//!
//! Blank cells are missing values, not empty strings. Fully blank lines carry no record
//! at all and are skipped, the same way the usual dataframe loaders treat them.

use std::path::Path;

use crate::error::ReduceResult;
use crate::types::{Column, ColumnData, DataSet};

/// Options for CSV ingestion.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the first row holds column names. Headerless files get `column_0..n`.
    pub has_headers: bool,
    /// Field delimiter.
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_headers: true,
            delimiter: b',',
        }
    }
}

/// Read a CSV file into an in-memory [`DataSet`] with inferred column types.
pub fn read_csv_from_path(path: impl AsRef<Path>, options: &CsvOptions) -> ReduceResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(options.has_headers)
        .delimiter(options.delimiter)
        .from_path(path)?;
    read_csv_from_reader(&mut rdr, options)
}

/// Read CSV data from an existing CSV reader.
pub fn read_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    options: &CsvOptions,
) -> ReduceResult<DataSet> {
    let names: Vec<String> = if options.has_headers {
        rdr.headers()?.iter().map(str::to_owned).collect()
    } else {
        Vec::new()
    };

    let mut cells: Vec<Vec<Option<String>>> = names.iter().map(|_| Vec::new()).collect();
    for result in rdr.records() {
        let record = result?;
        // Headerless files size the column list off the first record.
        if cells.is_empty() {
            cells = (0..record.len()).map(|_| Vec::new()).collect();
        }
        for (i, slot) in cells.iter_mut().enumerate() {
            let raw = record.get(i).unwrap_or("").trim();
            slot.push((!raw.is_empty()).then(|| raw.to_owned()));
        }
    }

    let columns = cells
        .into_iter()
        .enumerate()
        .map(|(i, column_cells)| {
            let name = names
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("column_{i}"));
            infer_column(name, column_cells)
        })
        .collect();

    DataSet::new(columns)
}

fn infer_column(name: String, cells: Vec<Option<String>>) -> Column {
    let has_missing = cells.iter().any(|c| c.is_none());

    let all_ints = cells
        .iter()
        .flatten()
        .all(|s| s.parse::<i64>().is_ok());
    if all_ints && !has_missing && !cells.is_empty() {
        let values = cells
            .iter()
            .flatten()
            .filter_map(|s| s.parse::<i64>().ok())
            .collect();
        return Column::new(name, ColumnData::Int64(values));
    }

    let all_numeric = cells
        .iter()
        .flatten()
        .all(|s| s.parse::<f64>().is_ok());
    if all_numeric {
        // Integer columns with holes land here too, promoted to float just like the
        // upstream loaders whose output this crate exists to shrink.
        let values = cells
            .iter()
            .map(|c| {
                c.as_deref()
                    .and_then(|s| s.parse::<f64>().ok())
                    .unwrap_or(f64::NAN)
            })
            .collect();
        return Column::new(name, ColumnData::Float64(values));
    }

    Column::new(name, ColumnData::Utf8(cells))
}
