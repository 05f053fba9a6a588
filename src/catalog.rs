//! Candidate catalog: the ordered table of admissible downcast targets per category.
//!
//! Each category (signed integer, unsigned integer, float) maps to a narrowest-first list
//! of target dtypes. The classifier walks a category's candidates in order and takes the
//! first one whose representable range covers the column's observed `[min, max]`, so the
//! chosen candidate is always the minimal sufficient representation.

use crate::error::{ReduceError, ReduceResult};
use crate::types::{DType, Numeric};

/// Classification category driving candidate selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericCategory {
    /// Signed integer.
    Int,
    /// Unsigned integer.
    UInt,
    /// Floating point.
    Float,
}

impl NumericCategory {
    /// Short name used in diagnostics and errors.
    pub fn name(self) -> &'static str {
        match self {
            NumericCategory::Int => "int",
            NumericCategory::UInt => "uint",
            NumericCategory::Float => "float",
        }
    }
}

/// Exact representable closed interval of a candidate dtype.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericRange {
    /// Integer interval, exact at 64-bit boundaries.
    Int { min: i128, max: i128 },
    /// Finite float interval.
    Float { min: f64, max: f64 },
}

impl NumericRange {
    /// True if the interval covers `[lo, hi]`, inclusive on both ends.
    ///
    /// Integer bounds are compared in `i128` and never pass through floating point;
    /// non-finite float bounds fit nothing.
    pub fn contains(&self, lo: Numeric, hi: Numeric) -> bool {
        self.contains_one(lo) && self.contains_one(hi)
    }

    fn contains_one(&self, v: Numeric) -> bool {
        match (self, v) {
            (NumericRange::Int { min, max }, Numeric::Int(x)) => *min <= x && x <= *max,
            (NumericRange::Float { min, max }, Numeric::Float(x)) => {
                x.is_finite() && *min <= x && x <= *max
            }
            // Integer bounds against a float interval: every i128 is far inside the
            // float64 interval and i64/u64 magnitudes are far inside float32's.
            (NumericRange::Float { min, max }, Numeric::Int(x)) => {
                let x = x as f64;
                *min <= x && x <= *max
            }
            // A float bound only reaches an integer candidate list after the integral
            // check has replaced it with exact integers; seeing one here means no fit.
            (NumericRange::Int { .. }, Numeric::Float(_)) => false,
        }
    }
}

/// Ordered table of downcast candidates per [`NumericCategory`].
///
/// The default mirrors the usual shrink-to-fit grid: 8/16/32/64-bit signed and unsigned
/// integers, and single-precision float. Callers may supply their own lists, e.g. to
/// exclude 64-bit targets or to force floats through `float64`. The table is validated
/// once at [`crate::reduce::Reducer`] construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTable {
    /// Signed integer candidates, narrowest first.
    pub int: Vec<DType>,
    /// Unsigned integer candidates, narrowest first.
    pub uint: Vec<DType>,
    /// Float candidates, narrowest first.
    pub float: Vec<DType>,
}

impl Default for ConversionTable {
    fn default() -> Self {
        Self {
            int: vec![DType::Int8, DType::Int16, DType::Int32, DType::Int64],
            uint: vec![DType::UInt8, DType::UInt16, DType::UInt32, DType::UInt64],
            float: vec![DType::Float32],
        }
    }
}

impl ConversionTable {
    /// Iterate `(dtype, representable range)` candidates for `category`, in table order.
    pub fn candidates(
        &self,
        category: NumericCategory,
    ) -> impl Iterator<Item = (DType, NumericRange)> + '_ {
        self.list(category).iter().filter_map(|&dtype| {
            let range = match dtype.integer_range() {
                Some((min, max)) => NumericRange::Int { min, max },
                None => {
                    let (min, max) = dtype.float_range()?;
                    NumericRange::Float { min, max }
                }
            };
            Some((dtype, range))
        })
    }

    /// Fail fast on a table that would misbehave mid-reduction: empty categories,
    /// candidates in the wrong category, or lists not ordered narrowest-first.
    pub fn validate(&self) -> ReduceResult<()> {
        for category in [
            NumericCategory::Int,
            NumericCategory::UInt,
            NumericCategory::Float,
        ] {
            let list = self.list(category);
            if list.is_empty() {
                return Err(ReduceError::EmptyCategory {
                    category: category.name(),
                });
            }

            let mut previous: Option<DType> = None;
            for &dtype in list {
                let fits_category = match category {
                    NumericCategory::Int => dtype.is_signed_integer() && dtype.integer_range().is_some(),
                    NumericCategory::UInt => {
                        dtype.is_unsigned_integer() && dtype.integer_range().is_some()
                    }
                    NumericCategory::Float => dtype.is_float(),
                };
                if !fits_category {
                    return Err(ReduceError::CandidateCategoryMismatch {
                        category: category.name(),
                        dtype: dtype.to_string(),
                    });
                }

                if let Some(prev) = previous {
                    // bit_width is Some for every dtype accepted above.
                    if prev.bit_width() >= dtype.bit_width() {
                        return Err(ReduceError::CandidatesNotNarrowestFirst {
                            category: category.name(),
                            previous: prev.to_string(),
                            dtype: dtype.to_string(),
                        });
                    }
                }
                previous = Some(dtype);
            }
        }
        Ok(())
    }

    fn list(&self, category: NumericCategory) -> &[DType] {
        match category {
            NumericCategory::Int => &self.int,
            NumericCategory::UInt => &self.uint,
            NumericCategory::Float => &self.float,
        }
    }
}
