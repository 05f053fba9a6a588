//! Columnar data model used by the reducer.
//!
//! A [`DataSet`] is an ordered list of named [`Column`]s. Each column owns typed storage
//! ([`ColumnData`]) with one variant per logical [`DType`]. Missing values are represented
//! per storage kind: `NaN` for float columns, `None` for nullable integers, strings, and
//! booleans, [`Value::Null`] inside heterogeneous [`ColumnData::Mixed`] columns.
//!
//! The reducer only interacts with columns through the operations defined here: length,
//! missing-value predicates, exact min/max over present values, distinct-text counts, and
//! coercion into a target representation.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::mem::size_of;

use crate::error::{ReduceError, ReduceResult};

/// Logical data type of a [`Column`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// 8-bit signed integer.
    Int8,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 8-bit unsigned integer.
    UInt8,
    /// 16-bit unsigned integer.
    UInt16,
    /// 32-bit unsigned integer.
    UInt32,
    /// 64-bit unsigned integer.
    UInt64,
    /// 32-bit float. `NaN` is the missing-value marker.
    Float32,
    /// 64-bit float. `NaN` is the missing-value marker.
    Float64,
    /// 8-bit signed integer with per-entry missing-value support.
    NullableInt8,
    /// 16-bit signed integer with per-entry missing-value support.
    NullableInt16,
    /// 32-bit signed integer with per-entry missing-value support.
    NullableInt32,
    /// 64-bit signed integer with per-entry missing-value support.
    NullableInt64,
    /// 8-bit unsigned integer with per-entry missing-value support.
    NullableUInt8,
    /// 16-bit unsigned integer with per-entry missing-value support.
    NullableUInt16,
    /// 32-bit unsigned integer with per-entry missing-value support.
    NullableUInt32,
    /// 64-bit unsigned integer with per-entry missing-value support.
    NullableUInt64,
    /// Boolean with per-entry missing-value support.
    Bool,
    /// UTF-8 string with per-entry missing-value support.
    Utf8,
    /// Dictionary-encoded strings: a dictionary of distinct values plus per-row codes.
    Categorical,
    /// Heterogeneous cells stored as [`Value`]s.
    Mixed,
}

impl DType {
    /// True for signed/unsigned integer dtypes, plain or nullable.
    pub fn is_integer(self) -> bool {
        self.is_signed_integer() || self.is_unsigned_integer()
    }

    /// True for signed integer dtypes, plain or nullable.
    pub fn is_signed_integer(self) -> bool {
        matches!(
            self,
            DType::Int8
                | DType::Int16
                | DType::Int32
                | DType::Int64
                | DType::NullableInt8
                | DType::NullableInt16
                | DType::NullableInt32
                | DType::NullableInt64
        )
    }

    /// True for unsigned integer dtypes, plain or nullable.
    pub fn is_unsigned_integer(self) -> bool {
        matches!(
            self,
            DType::UInt8
                | DType::UInt16
                | DType::UInt32
                | DType::UInt64
                | DType::NullableUInt8
                | DType::NullableUInt16
                | DType::NullableUInt32
                | DType::NullableUInt64
        )
    }

    /// True for float dtypes.
    pub fn is_float(self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }

    /// True for generic/object dtypes eligible for categorical conversion checks.
    pub fn is_object(self) -> bool {
        matches!(self, DType::Utf8 | DType::Mixed)
    }

    /// Exact representable closed interval for plain integer dtypes.
    ///
    /// `i128` holds every `i64` and `u64` bound exactly; `f64` does not (`i64::MAX`
    /// rounds), so range checks never go through floating point.
    pub fn integer_range(self) -> Option<(i128, i128)> {
        match self {
            DType::Int8 => Some((i8::MIN as i128, i8::MAX as i128)),
            DType::Int16 => Some((i16::MIN as i128, i16::MAX as i128)),
            DType::Int32 => Some((i32::MIN as i128, i32::MAX as i128)),
            DType::Int64 => Some((i64::MIN as i128, i64::MAX as i128)),
            DType::UInt8 => Some((0, u8::MAX as i128)),
            DType::UInt16 => Some((0, u16::MAX as i128)),
            DType::UInt32 => Some((0, u32::MAX as i128)),
            DType::UInt64 => Some((0, u64::MAX as i128)),
            _ => None,
        }
    }

    /// Finite representable interval for float dtypes.
    pub fn float_range(self) -> Option<(f64, f64)> {
        match self {
            DType::Float32 => Some((f32::MIN as f64, f32::MAX as f64)),
            DType::Float64 => Some((f64::MIN, f64::MAX)),
            _ => None,
        }
    }

    /// The missing-value-capable twin of a plain integer dtype.
    pub fn nullable_counterpart(self) -> Option<DType> {
        match self {
            DType::Int8 => Some(DType::NullableInt8),
            DType::Int16 => Some(DType::NullableInt16),
            DType::Int32 => Some(DType::NullableInt32),
            DType::Int64 => Some(DType::NullableInt64),
            DType::UInt8 => Some(DType::NullableUInt8),
            DType::UInt16 => Some(DType::NullableUInt16),
            DType::UInt32 => Some(DType::NullableUInt32),
            DType::UInt64 => Some(DType::NullableUInt64),
            _ => None,
        }
    }

    /// Bit width of the numeric payload, for narrowest-first ordering checks.
    pub fn bit_width(self) -> Option<u32> {
        match self {
            DType::Int8 | DType::UInt8 | DType::NullableInt8 | DType::NullableUInt8 => Some(8),
            DType::Int16 | DType::UInt16 | DType::NullableInt16 | DType::NullableUInt16 => Some(16),
            DType::Int32
            | DType::UInt32
            | DType::NullableInt32
            | DType::NullableUInt32
            | DType::Float32 => Some(32),
            DType::Int64
            | DType::UInt64
            | DType::NullableInt64
            | DType::NullableUInt64
            | DType::Float64 => Some(64),
            _ => None,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::UInt8 => "uint8",
            DType::UInt16 => "uint16",
            DType::UInt32 => "uint32",
            DType::UInt64 => "uint64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::NullableInt8 => "nullable-int8",
            DType::NullableInt16 => "nullable-int16",
            DType::NullableInt32 => "nullable-int32",
            DType::NullableInt64 => "nullable-int64",
            DType::NullableUInt8 => "nullable-uint8",
            DType::NullableUInt16 => "nullable-uint16",
            DType::NullableUInt32 => "nullable-uint32",
            DType::NullableUInt64 => "nullable-uint64",
            DType::Bool => "bool",
            DType::Utf8 => "utf8",
            DType::Categorical => "categorical",
            DType::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

/// Exact numeric scalar used for observed column bounds.
///
/// `Int` covers every `i64` and `u64` value exactly; `Float` is used for float columns
/// (including non-finite bounds, which can never fit a catalog candidate).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Int(i128),
    Float(f64),
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Int(v) => write!(f, "{v}"),
            Numeric::Float(v) => write!(f, "{v}"),
        }
    }
}

/// A single heterogeneous cell inside a [`ColumnData::Mixed`] column.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

/// Typed storage for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    NullableInt8(Vec<Option<i8>>),
    NullableInt16(Vec<Option<i16>>),
    NullableInt32(Vec<Option<i32>>),
    NullableInt64(Vec<Option<i64>>),
    NullableUInt8(Vec<Option<u8>>),
    NullableUInt16(Vec<Option<u16>>),
    NullableUInt32(Vec<Option<u32>>),
    NullableUInt64(Vec<Option<u64>>),
    Bool(Vec<Option<bool>>),
    Utf8(Vec<Option<String>>),
    /// Dictionary-encoded strings: `codes[i]` indexes into `dict`, `None` is missing.
    Categorical {
        dict: Vec<String>,
        codes: Vec<Option<u32>>,
    },
    Mixed(Vec<Value>),
}

impl ColumnData {
    /// Logical dtype of this storage.
    pub fn dtype(&self) -> DType {
        match self {
            ColumnData::Int8(_) => DType::Int8,
            ColumnData::Int16(_) => DType::Int16,
            ColumnData::Int32(_) => DType::Int32,
            ColumnData::Int64(_) => DType::Int64,
            ColumnData::UInt8(_) => DType::UInt8,
            ColumnData::UInt16(_) => DType::UInt16,
            ColumnData::UInt32(_) => DType::UInt32,
            ColumnData::UInt64(_) => DType::UInt64,
            ColumnData::Float32(_) => DType::Float32,
            ColumnData::Float64(_) => DType::Float64,
            ColumnData::NullableInt8(_) => DType::NullableInt8,
            ColumnData::NullableInt16(_) => DType::NullableInt16,
            ColumnData::NullableInt32(_) => DType::NullableInt32,
            ColumnData::NullableInt64(_) => DType::NullableInt64,
            ColumnData::NullableUInt8(_) => DType::NullableUInt8,
            ColumnData::NullableUInt16(_) => DType::NullableUInt16,
            ColumnData::NullableUInt32(_) => DType::NullableUInt32,
            ColumnData::NullableUInt64(_) => DType::NullableUInt64,
            ColumnData::Bool(_) => DType::Bool,
            ColumnData::Utf8(_) => DType::Utf8,
            ColumnData::Categorical { .. } => DType::Categorical,
            ColumnData::Mixed(_) => DType::Mixed,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int8(v) => v.len(),
            ColumnData::Int16(v) => v.len(),
            ColumnData::Int32(v) => v.len(),
            ColumnData::Int64(v) => v.len(),
            ColumnData::UInt8(v) => v.len(),
            ColumnData::UInt16(v) => v.len(),
            ColumnData::UInt32(v) => v.len(),
            ColumnData::UInt64(v) => v.len(),
            ColumnData::Float32(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::NullableInt8(v) => v.len(),
            ColumnData::NullableInt16(v) => v.len(),
            ColumnData::NullableInt32(v) => v.len(),
            ColumnData::NullableInt64(v) => v.len(),
            ColumnData::NullableUInt8(v) => v.len(),
            ColumnData::NullableUInt16(v) => v.len(),
            ColumnData::NullableUInt32(v) => v.len(),
            ColumnData::NullableUInt64(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::Utf8(v) => v.len(),
            ColumnData::Categorical { codes, .. } => codes.len(),
            ColumnData::Mixed(v) => v.len(),
        }
    }

    /// True if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build integer storage of the given plain or nullable integer dtype.
    ///
    /// Returns `None` when `target` is not an integer dtype, or when a plain target is
    /// asked to hold missing values. Callers must have verified that every present value
    /// fits `target`'s range; the narrowing casts below rely on that.
    pub(crate) fn from_int_values(target: DType, values: &[Option<i128>]) -> Option<ColumnData> {
        fn plain<T>(values: &[Option<i128>], cast: impl Fn(i128) -> T) -> Option<Vec<T>> {
            values.iter().map(|v| v.map(&cast)).collect()
        }
        fn nullable<T>(values: &[Option<i128>], cast: impl Fn(i128) -> T) -> Vec<Option<T>> {
            values.iter().map(|v| v.map(&cast)).collect()
        }

        Some(match target {
            DType::Int8 => ColumnData::Int8(plain(values, |v| v as i8)?),
            DType::Int16 => ColumnData::Int16(plain(values, |v| v as i16)?),
            DType::Int32 => ColumnData::Int32(plain(values, |v| v as i32)?),
            DType::Int64 => ColumnData::Int64(plain(values, |v| v as i64)?),
            DType::UInt8 => ColumnData::UInt8(plain(values, |v| v as u8)?),
            DType::UInt16 => ColumnData::UInt16(plain(values, |v| v as u16)?),
            DType::UInt32 => ColumnData::UInt32(plain(values, |v| v as u32)?),
            DType::UInt64 => ColumnData::UInt64(plain(values, |v| v as u64)?),
            DType::NullableInt8 => ColumnData::NullableInt8(nullable(values, |v| v as i8)),
            DType::NullableInt16 => ColumnData::NullableInt16(nullable(values, |v| v as i16)),
            DType::NullableInt32 => ColumnData::NullableInt32(nullable(values, |v| v as i32)),
            DType::NullableInt64 => ColumnData::NullableInt64(nullable(values, |v| v as i64)),
            DType::NullableUInt8 => ColumnData::NullableUInt8(nullable(values, |v| v as u8)),
            DType::NullableUInt16 => ColumnData::NullableUInt16(nullable(values, |v| v as u16)),
            DType::NullableUInt32 => ColumnData::NullableUInt32(nullable(values, |v| v as u32)),
            DType::NullableUInt64 => ColumnData::NullableUInt64(nullable(values, |v| v as u64)),
            _ => return None,
        })
    }

    /// Build float storage of the given float dtype. `NaN` entries stay `NaN`.
    pub(crate) fn from_float_values(target: DType, values: &[f64]) -> Option<ColumnData> {
        match target {
            DType::Float32 => Some(ColumnData::Float32(
                values.iter().map(|&v| v as f32).collect(),
            )),
            DType::Float64 => Some(ColumnData::Float64(values.to_vec())),
            _ => None,
        }
    }
}

/// A named column: the unit of work for the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Typed storage.
    pub data: ColumnData,
}

impl Column {
    /// Create a new column.
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Logical dtype.
    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True if any entry is missing.
    pub fn has_nulls(&self) -> bool {
        self.null_count() > 0
    }

    /// Number of missing entries.
    pub fn null_count(&self) -> usize {
        self.null_mask().into_iter().filter(|&m| m).count()
    }

    /// Per-row missing-value mask (`true` = missing).
    pub fn null_mask(&self) -> Vec<bool> {
        fn none_mask<T>(v: &[Option<T>]) -> Vec<bool> {
            v.iter().map(|x| x.is_none()).collect()
        }

        match &self.data {
            ColumnData::Int8(v) => vec![false; v.len()],
            ColumnData::Int16(v) => vec![false; v.len()],
            ColumnData::Int32(v) => vec![false; v.len()],
            ColumnData::Int64(v) => vec![false; v.len()],
            ColumnData::UInt8(v) => vec![false; v.len()],
            ColumnData::UInt16(v) => vec![false; v.len()],
            ColumnData::UInt32(v) => vec![false; v.len()],
            ColumnData::UInt64(v) => vec![false; v.len()],
            ColumnData::Float32(v) => v.iter().map(|x| x.is_nan()).collect(),
            ColumnData::Float64(v) => v.iter().map(|x| x.is_nan()).collect(),
            ColumnData::NullableInt8(v) => none_mask(v),
            ColumnData::NullableInt16(v) => none_mask(v),
            ColumnData::NullableInt32(v) => none_mask(v),
            ColumnData::NullableInt64(v) => none_mask(v),
            ColumnData::NullableUInt8(v) => none_mask(v),
            ColumnData::NullableUInt16(v) => none_mask(v),
            ColumnData::NullableUInt32(v) => none_mask(v),
            ColumnData::NullableUInt64(v) => none_mask(v),
            ColumnData::Bool(v) => none_mask(v),
            ColumnData::Utf8(v) => none_mask(v),
            ColumnData::Categorical { codes, .. } => none_mask(codes),
            ColumnData::Mixed(v) => v.iter().map(|x| matches!(x, Value::Null)).collect(),
        }
    }

    /// Exact `(min, max)` over present values, or `None` for empty/all-missing or
    /// non-numeric columns.
    ///
    /// Float columns skip `NaN` (missing) but keep infinities, so a column holding
    /// `inf` reports an infinite bound and can never fit a finite candidate range.
    pub fn min_max(&self) -> Option<(Numeric, Numeric)> {
        if let Some(ints) = self.integer_values() {
            let mut bounds: Option<(i128, i128)> = None;
            for v in ints.iter().flatten() {
                bounds = Some(match bounds {
                    Some((lo, hi)) => (lo.min(*v), hi.max(*v)),
                    None => (*v, *v),
                });
            }
            return bounds.map(|(lo, hi)| (Numeric::Int(lo), Numeric::Int(hi)));
        }
        if let Some(floats) = self.float_values() {
            let mut bounds: Option<(f64, f64)> = None;
            for v in floats.iter().filter(|v| !v.is_nan()) {
                bounds = Some(match bounds {
                    Some((lo, hi)) => (lo.min(*v), hi.max(*v)),
                    None => (*v, *v),
                });
            }
            return bounds.map(|(lo, hi)| (Numeric::Float(lo), Numeric::Float(hi)));
        }
        None
    }

    /// All entries widened to `i128`, for integer-kind columns only.
    pub(crate) fn integer_values(&self) -> Option<Vec<Option<i128>>> {
        fn plain<T: Copy + Into<i128>>(v: &[T]) -> Vec<Option<i128>> {
            v.iter().map(|&x| Some(x.into())).collect()
        }
        fn nullable<T: Copy + Into<i128>>(v: &[Option<T>]) -> Vec<Option<i128>> {
            v.iter().map(|x| x.map(Into::into)).collect()
        }

        match &self.data {
            ColumnData::Int8(v) => Some(plain(v)),
            ColumnData::Int16(v) => Some(plain(v)),
            ColumnData::Int32(v) => Some(plain(v)),
            ColumnData::Int64(v) => Some(plain(v)),
            ColumnData::UInt8(v) => Some(plain(v)),
            ColumnData::UInt16(v) => Some(plain(v)),
            ColumnData::UInt32(v) => Some(plain(v)),
            ColumnData::UInt64(v) => Some(plain(v)),
            ColumnData::NullableInt8(v) => Some(nullable(v)),
            ColumnData::NullableInt16(v) => Some(nullable(v)),
            ColumnData::NullableInt32(v) => Some(nullable(v)),
            ColumnData::NullableInt64(v) => Some(nullable(v)),
            ColumnData::NullableUInt8(v) => Some(nullable(v)),
            ColumnData::NullableUInt16(v) => Some(nullable(v)),
            ColumnData::NullableUInt32(v) => Some(nullable(v)),
            ColumnData::NullableUInt64(v) => Some(nullable(v)),
            _ => None,
        }
    }

    /// All entries widened to `f64` (`NaN` = missing), for float-kind columns only.
    pub(crate) fn float_values(&self) -> Option<Vec<f64>> {
        match &self.data {
            ColumnData::Float32(v) => Some(v.iter().map(|&x| x as f64).collect()),
            ColumnData::Float64(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// True if every present value in an object column is text.
    ///
    /// Mixed columns holding any non-text present value are not eligible for categorical
    /// conversion; converting them would change cell types, not just their encoding.
    pub fn all_present_text(&self) -> bool {
        match &self.data {
            ColumnData::Utf8(_) => true,
            ColumnData::Mixed(v) => v.iter().all(|x| matches!(x, Value::Null | Value::Utf8(_))),
            _ => false,
        }
    }

    /// Number of distinct present text values in an object column.
    pub fn distinct_text_count(&self) -> usize {
        let mut seen: HashSet<&str> = HashSet::new();
        match &self.data {
            ColumnData::Utf8(v) => {
                for s in v.iter().flatten() {
                    seen.insert(s.as_str());
                }
            }
            ColumnData::Mixed(v) => {
                for x in v {
                    if let Value::Utf8(s) = x {
                        seen.insert(s.as_str());
                    }
                }
            }
            _ => {}
        }
        seen.len()
    }

    /// Dictionary-encode an all-text object column.
    ///
    /// Dictionary order is first appearance. Returns `None` when the column is not an
    /// object column or holds a present non-text value.
    pub fn to_categorical(&self) -> Option<Column> {
        if !self.all_present_text() {
            return None;
        }

        let mut dict: Vec<String> = Vec::new();
        let mut index: HashMap<String, u32> = HashMap::new();
        let mut codes: Vec<Option<u32>> = Vec::with_capacity(self.len());

        let mut encode = |s: &str| -> u32 {
            if let Some(&code) = index.get(s) {
                return code;
            }
            let code = dict.len() as u32;
            dict.push(s.to_owned());
            index.insert(s.to_owned(), code);
            code
        };

        match &self.data {
            ColumnData::Utf8(v) => {
                for s in v {
                    codes.push(s.as_deref().map(&mut encode));
                }
            }
            ColumnData::Mixed(v) => {
                for x in v {
                    codes.push(match x {
                        Value::Utf8(s) => Some(encode(s)),
                        _ => None,
                    });
                }
            }
            _ => return None,
        }

        Some(Column::new(
            self.name.clone(),
            ColumnData::Categorical { dict, codes },
        ))
    }

    /// Estimated resident size in bytes, including string heap storage.
    pub fn estimated_size(&self) -> usize {
        fn flat<T>(v: &[T]) -> usize {
            v.len() * size_of::<T>()
        }

        match &self.data {
            ColumnData::Int8(v) => flat(v),
            ColumnData::Int16(v) => flat(v),
            ColumnData::Int32(v) => flat(v),
            ColumnData::Int64(v) => flat(v),
            ColumnData::UInt8(v) => flat(v),
            ColumnData::UInt16(v) => flat(v),
            ColumnData::UInt32(v) => flat(v),
            ColumnData::UInt64(v) => flat(v),
            ColumnData::Float32(v) => flat(v),
            ColumnData::Float64(v) => flat(v),
            ColumnData::NullableInt8(v) => flat(v),
            ColumnData::NullableInt16(v) => flat(v),
            ColumnData::NullableInt32(v) => flat(v),
            ColumnData::NullableInt64(v) => flat(v),
            ColumnData::NullableUInt8(v) => flat(v),
            ColumnData::NullableUInt16(v) => flat(v),
            ColumnData::NullableUInt32(v) => flat(v),
            ColumnData::NullableUInt64(v) => flat(v),
            ColumnData::Bool(v) => flat(v),
            ColumnData::Utf8(v) => flat(v) + v.iter().flatten().map(|s| s.len()).sum::<usize>(),
            ColumnData::Categorical { dict, codes } => {
                flat(codes)
                    + dict.len() * size_of::<String>()
                    + dict.iter().map(|s| s.len()).sum::<usize>()
            }
            ColumnData::Mixed(v) => {
                flat(v)
                    + v.iter()
                        .map(|x| match x {
                            Value::Utf8(s) => s.len(),
                            _ => 0,
                        })
                        .sum::<usize>()
            }
        }
    }
}

/// In-memory tabular dataset: an ordered sequence of equal-length named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Columns in stable order.
    pub columns: Vec<Column>,
}

impl DataSet {
    /// Create a dataset, validating that all columns share one length.
    pub fn new(columns: Vec<Column>) -> ReduceResult<Self> {
        if let Some(first) = columns.first() {
            let rows = first.len();
            if let Some(odd) = columns.iter().find(|c| c.len() != rows) {
                return Err(ReduceError::ShapeMismatch {
                    column: odd.name.clone(),
                    length: odd.len(),
                    expected: rows,
                });
            }
        }
        Ok(Self { columns })
    }

    /// Number of rows (0 for a dataset with no columns).
    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    /// Iterate column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Estimated resident size in bytes, summed over all columns.
    pub fn estimated_size(&self) -> usize {
        self.columns.iter().map(|c| c.estimated_size()).sum()
    }
}
