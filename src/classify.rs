//! Per-column classification and downcasting.
//!
//! [`classify_column`] is the decision procedure at the heart of the crate. For one
//! column it determines the effective numeric category (signed integer, unsigned
//! integer, float) or categorical candidacy, searches the conversion table for the
//! narrowest representation that covers the observed value range, and produces the
//! replacement column. Columns are never mutated in place and the procedure never
//! inspects any state beyond the column itself plus the read-only options, which is what
//! makes the orchestrator's parallel fan-out safe.

use crate::catalog::NumericCategory;
use crate::error::{ReduceError, ReduceResult};
use crate::reduce::ReduceOptions;
use crate::types::{Column, ColumnData, DType, Numeric};

/// Whole-column tolerance for treating a float column as integer-valued.
///
/// The sum of per-value deviations from their truncations must stay below this bound, so
/// many tiny deviations can still disqualify a column. This is a column-level fidelity
/// check, not a per-value one.
const INTEGRAL_TOLERANCE: f64 = 0.01;

/// Ratio of distinct present values to rows below which an object column is converted to
/// the categorical representation.
const CATEGORICAL_MAX_RATIO: f64 = 0.5;

/// What the classifier did with one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnAction {
    /// Column was rewritten with a different representation.
    Converted { from: DType, to: DType },
    /// Column was left as-is (non-numeric, high cardinality, already minimal object...).
    Unchanged,
    /// No catalog candidate covered the observed bounds; column returned unchanged.
    ///
    /// Bounds are `None` for columns with no present values to measure.
    NoFit {
        min: Option<Numeric>,
        max: Option<Numeric>,
    },
}

/// Per-column result: the output column plus what happened to it.
///
/// This is the unit the orchestrator collects from parallel workers; faults travel
/// alongside as `Err` values rather than crossing task boundaries as panics.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnOutcome {
    /// The replacement column (identical to the input when nothing was converted).
    pub column: Column,
    /// What the classifier decided.
    pub action: ColumnAction,
}

impl ColumnOutcome {
    fn converted(column: Column, from: DType, to: DType) -> Self {
        Self {
            column,
            action: ColumnAction::Converted { from, to },
        }
    }

    fn unchanged(column: &Column) -> Self {
        Self {
            column: column.clone(),
            action: ColumnAction::Unchanged,
        }
    }

    fn no_fit(column: &Column, min: Option<Numeric>, max: Option<Numeric>) -> Self {
        Self {
            column: column.clone(),
            action: ColumnAction::NoFit { min, max },
        }
    }
}

/// Classify one column and produce its replacement.
///
/// The procedure:
///
/// 1. detect missing values up front (never altering the column),
/// 2. detect the effective category — integer columns split into signed/unsigned by the
///    sign of their minimum; float columns are reclassified as integer when the
///    whole-column deviation from truncated values stays below [`INTEGRAL_TOLERANCE`];
///    all-text object columns become categorical below [`CATEGORICAL_MAX_RATIO`],
/// 3. walk the table's candidates narrowest-first and convert with the first fit,
/// 4. fall back to the unchanged column (with observed bounds attached) when nothing
///    fits.
///
/// Errors are column-scoped; the orchestrator logs them and keeps the input column.
pub fn classify_column(column: &Column, options: &ReduceOptions) -> ReduceResult<ColumnOutcome> {
    let from = column.dtype();

    if from.is_object() {
        return Ok(classify_object(column, from, options));
    }
    if from == DType::Categorical {
        validate_categorical(column)?;
        return Ok(ColumnOutcome::unchanged(column));
    }
    if from == DType::Bool {
        return Ok(ColumnOutcome::unchanged(column));
    }

    let has_missing = column.has_nulls();

    if from.is_integer() {
        let Some(ints) = column.integer_values() else {
            return Ok(ColumnOutcome::unchanged(column));
        };
        let Some((lo, hi)) = int_bounds(&ints) else {
            return Ok(ColumnOutcome::no_fit(column, None, None));
        };
        let category = sign_category(lo);
        return convert_integers(column, from, category, has_missing, &ints, None, options, lo, hi);
    }

    if let Some(floats) = column.float_values() {
        // Integer-valued float columns (counts promoted to float by upstream
        // missing-value handling) get routed through the integer grid instead.
        if let Some(ints) = integral_view(&floats) {
            let Some((lo, hi)) = int_bounds(&ints) else {
                return Ok(ColumnOutcome::no_fit(column, None, None));
            };
            let category = sign_category(lo);
            return convert_integers(
                column,
                from,
                category,
                has_missing,
                &ints,
                Some(&floats),
                options,
                lo,
                hi,
            );
        }

        let Some((lo, hi)) = column.min_max() else {
            return Ok(ColumnOutcome::no_fit(column, None, None));
        };
        if has_missing {
            return Ok(best_effort_float(column, from, &floats, options));
        }
        for (target, range) in options.conversion_table.candidates(NumericCategory::Float) {
            if !range.contains(lo, hi) {
                continue;
            }
            if target == from {
                return Ok(ColumnOutcome::unchanged(column));
            }
            let data = ColumnData::from_float_values(target, &floats)
                .ok_or_else(|| fault(column, format!("cannot build {target} storage")))?;
            return Ok(ColumnOutcome::converted(
                Column::new(column.name.clone(), data),
                from,
                target,
            ));
        }
        return Ok(ColumnOutcome::no_fit(column, Some(lo), Some(hi)));
    }

    Ok(ColumnOutcome::unchanged(column))
}

fn classify_object(column: &Column, from: DType, options: &ReduceOptions) -> ColumnOutcome {
    if options.use_categoricals && !column.is_empty() && column.all_present_text() {
        let ratio = column.distinct_text_count() as f64 / column.len() as f64;
        if ratio < CATEGORICAL_MAX_RATIO {
            if let Some(cat) = column.to_categorical() {
                return ColumnOutcome::converted(cat, from, DType::Categorical);
            }
        }
    }
    ColumnOutcome::unchanged(column)
}

/// A categorical input column with codes outside its dictionary is corrupt; surfacing it
/// as a column-scoped fault keeps the rest of the reduction alive.
fn validate_categorical(column: &Column) -> ReduceResult<()> {
    if let ColumnData::Categorical { dict, codes } = &column.data {
        if let Some(bad) = codes.iter().flatten().find(|&&c| (c as usize) >= dict.len()) {
            return Err(fault(
                column,
                format!(
                    "categorical code {bad} exceeds dictionary of {} entries",
                    dict.len()
                ),
            ));
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn convert_integers(
    column: &Column,
    from: DType,
    category: NumericCategory,
    has_missing: bool,
    ints: &[Option<i128>],
    source_floats: Option<&[f64]>,
    options: &ReduceOptions,
    lo: i128,
    hi: i128,
) -> ReduceResult<ColumnOutcome> {
    if has_missing && !options.use_nullable_ints {
        // Missing values without nullable-int support force a float representation;
        // reuse the source floats when we have them so no fractional part is invented
        // or lost.
        let floats: Vec<f64> = match source_floats {
            Some(f) => f.to_vec(),
            None => ints
                .iter()
                .map(|v| v.map(|i| i as f64).unwrap_or(f64::NAN))
                .collect(),
        };
        return Ok(best_effort_float(column, from, &floats, options));
    }

    for (target, range) in options.conversion_table.candidates(category) {
        if !range.contains(Numeric::Int(lo), Numeric::Int(hi)) {
            continue;
        }

        let out = if has_missing {
            let nullable = target
                .nullable_counterpart()
                .ok_or_else(|| fault(column, format!("no nullable twin for {target}")))?;
            if nullable == from {
                ColumnOutcome::unchanged(column)
            } else {
                let data = ColumnData::from_int_values(nullable, ints)
                    .ok_or_else(|| fault(column, format!("cannot build {nullable} storage")))?;
                ColumnOutcome::converted(Column::new(column.name.clone(), data), from, nullable)
            }
        } else if target == from {
            ColumnOutcome::unchanged(column)
        } else {
            let data = ColumnData::from_int_values(target, ints)
                .ok_or_else(|| fault(column, format!("cannot build {target} storage")))?;
            ColumnOutcome::converted(Column::new(column.name.clone(), data), from, target)
        };
        return Ok(out);
    }

    Ok(ColumnOutcome::no_fit(
        column,
        Some(Numeric::Int(lo)),
        Some(Numeric::Int(hi)),
    ))
}

/// Float conversion for columns that must keep missing-value support, walking the
/// table's float candidates narrowest-first. `float32` is taken only when every present
/// value round-trips exactly; a candidate matching the input dtype leaves the column
/// unchanged. Missing entries stay `NaN` either way.
fn best_effort_float(
    column: &Column,
    from: DType,
    floats: &[f64],
    options: &ReduceOptions,
) -> ColumnOutcome {
    let mut bounds: Option<(f64, f64)> = None;
    for v in floats.iter().filter(|v| !v.is_nan()) {
        bounds = Some(match bounds {
            Some((lo, hi)) => (lo.min(*v), hi.max(*v)),
            None => (*v, *v),
        });
    }
    let Some((lo, hi)) = bounds else {
        return ColumnOutcome::no_fit(column, None, None);
    };
    let (lo, hi) = (Numeric::Float(lo), Numeric::Float(hi));

    for (target, range) in options.conversion_table.candidates(NumericCategory::Float) {
        if !range.contains(lo, hi) {
            continue;
        }
        if target == DType::Float32
            && !floats
                .iter()
                .filter(|v| !v.is_nan())
                .all(|&v| (v as f32) as f64 == v)
        {
            continue;
        }
        if target == from {
            return ColumnOutcome::unchanged(column);
        }
        let Some(data) = ColumnData::from_float_values(target, floats) else {
            continue;
        };
        return ColumnOutcome::converted(Column::new(column.name.clone(), data), from, target);
    }

    // A float input already represents its own values; only non-float sources (integer
    // columns with holes) genuinely have nowhere to go.
    if from.is_float() {
        ColumnOutcome::unchanged(column)
    } else {
        ColumnOutcome::no_fit(column, Some(lo), Some(hi))
    }
}

/// Truncated integer view of a float column, or `None` when the column is not
/// integer-valued within [`INTEGRAL_TOLERANCE`] or holds values outside the 64-bit
/// window. Missing (`NaN`) entries become `None` and contribute nothing to the
/// deviation sum.
fn integral_view(floats: &[f64]) -> Option<Vec<Option<i128>>> {
    let mut out = Vec::with_capacity(floats.len());
    let mut deviation = 0.0f64;
    for &v in floats {
        if v.is_nan() {
            out.push(None);
            continue;
        }
        // i64::MAX as f64 rounds up to 2^63, hence the exclusive upper bound.
        if !v.is_finite() || v < i64::MIN as f64 || v >= i64::MAX as f64 {
            return None;
        }
        let t = v.trunc();
        deviation += (v - t).abs();
        out.push(Some(t as i128));
    }
    (deviation < INTEGRAL_TOLERANCE).then_some(out)
}

fn int_bounds(ints: &[Option<i128>]) -> Option<(i128, i128)> {
    let mut bounds: Option<(i128, i128)> = None;
    for v in ints.iter().flatten() {
        bounds = Some(match bounds {
            Some((lo, hi)) => (lo.min(*v), hi.max(*v)),
            None => (*v, *v),
        });
    }
    bounds
}

fn sign_category(min: i128) -> NumericCategory {
    if min < 0 {
        NumericCategory::Int
    } else {
        NumericCategory::UInt
    }
}

fn fault(column: &Column, message: String) -> ReduceError {
    ReduceError::ColumnFault {
        column: column.name.clone(),
        message,
    }
}
