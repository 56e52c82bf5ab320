//! Typed column storage

use std::ops::Range;

use crate::dtype::DType;
use crate::error::{FrameError, Result};
use crate::value::Scalar;

/// Sentinel used for a missing timestamp (NaT).
pub const NAT: i64 = i64::MIN;

/// The values of one column, stored in their native representation.
///
/// This is the unit a [`Buffer`](crate::Buffer) is made of. Buffers hold one
/// or more `ArrayValues` of the same [`DType`].
#[derive(Clone)]
pub enum ArrayValues {
    /// Booleans
    Bool(Vec<bool>),

    /// Integers
    Int64(Vec<i64>),

    /// Floats, NaN marks missing
    Float64(Vec<f64>),

    /// Timestamps in nanoseconds, [`NAT`] marks missing
    Datetime(Vec<i64>),

    /// Nullable integers
    MaskedInt64 {
        /// Raw values (unspecified where invalid)
        values: Vec<i64>,
        /// `false` marks missing
        valid: Vec<bool>,
    },

    /// Nullable floats
    MaskedFloat64 {
        /// Raw values (unspecified where invalid)
        values: Vec<f64>,
        /// `false` marks missing
        valid: Vec<bool>,
    },

    /// Heterogeneous scalars
    Object(Vec<Scalar>),
}

impl ArrayValues {
    // ═══════════════════════════════════════════════════════════════════
    // Constructors
    // ═══════════════════════════════════════════════════════════════════

    /// Boolean column
    pub fn bool(values: Vec<bool>) -> Self {
        ArrayValues::Bool(values)
    }

    /// Integer column
    pub fn int64(values: Vec<i64>) -> Self {
        ArrayValues::Int64(values)
    }

    /// Float column (use `f64::NAN` for missing)
    pub fn float64(values: Vec<f64>) -> Self {
        ArrayValues::Float64(values)
    }

    /// Timestamp column
    pub fn datetime(values: Vec<Option<i64>>) -> Self {
        ArrayValues::Datetime(values.into_iter().map(|v| v.unwrap_or(NAT)).collect())
    }

    /// Nullable integer column
    pub fn masked_int64(values: Vec<Option<i64>>) -> Self {
        let valid = values.iter().map(Option::is_some).collect();
        let values = values.into_iter().map(|v| v.unwrap_or_default()).collect();
        ArrayValues::MaskedInt64 { values, valid }
    }

    /// Nullable float column
    pub fn masked_float64(values: Vec<Option<f64>>) -> Self {
        let valid = values.iter().map(Option::is_some).collect();
        let values = values.into_iter().map(|v| v.unwrap_or_default()).collect();
        ArrayValues::MaskedFloat64 { values, valid }
    }

    /// Object column
    pub fn object(values: Vec<Scalar>) -> Self {
        ArrayValues::Object(values)
    }

    /// Build a column of kind `dtype` from scalars.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` for the first scalar the kind cannot store.
    pub fn from_scalars(dtype: DType, scalars: &[Scalar]) -> Result<Self> {
        let mismatch = |value: &Scalar| FrameError::TypeMismatch {
            dtype,
            value: value.clone(),
        };

        Ok(match dtype {
            DType::Bool => ArrayValues::Bool(
                scalars
                    .iter()
                    .map(|s| s.as_bool().ok_or_else(|| mismatch(s)))
                    .collect::<Result<_>>()?,
            ),
            DType::Int64 => ArrayValues::Int64(
                scalars
                    .iter()
                    .map(|s| s.as_i64().ok_or_else(|| mismatch(s)))
                    .collect::<Result<_>>()?,
            ),
            DType::Float64 => ArrayValues::Float64(
                scalars
                    .iter()
                    .map(|s| match s {
                        Scalar::Null => Ok(f64::NAN),
                        _ => s.as_f64().ok_or_else(|| mismatch(s)),
                    })
                    .collect::<Result<_>>()?,
            ),
            DType::Datetime => ArrayValues::Datetime(
                scalars
                    .iter()
                    .map(|s| match s {
                        _ if s.is_missing() => Ok(NAT),
                        _ => s.as_datetime().ok_or_else(|| mismatch(s)),
                    })
                    .collect::<Result<_>>()?,
            ),
            DType::MaskedInt64 => {
                let values = scalars
                    .iter()
                    .map(|s| match s {
                        _ if s.is_missing() => Ok(None),
                        _ => s.as_i64().map(Some).ok_or_else(|| mismatch(s)),
                    })
                    .collect::<Result<Vec<_>>>()?;
                ArrayValues::masked_int64(values)
            }
            DType::MaskedFloat64 => {
                let values = scalars
                    .iter()
                    .map(|s| match s {
                        _ if s.is_missing() => Ok(None),
                        _ => s.as_f64().map(Some).ok_or_else(|| mismatch(s)),
                    })
                    .collect::<Result<Vec<_>>>()?;
                ArrayValues::masked_float64(values)
            }
            DType::Object => ArrayValues::Object(scalars.to_vec()),
        })
    }

    // ═══════════════════════════════════════════════════════════════════
    // Inspection
    // ═══════════════════════════════════════════════════════════════════

    /// Element kind of this column
    pub fn dtype(&self) -> DType {
        match self {
            ArrayValues::Bool(_) => DType::Bool,
            ArrayValues::Int64(_) => DType::Int64,
            ArrayValues::Float64(_) => DType::Float64,
            ArrayValues::Datetime(_) => DType::Datetime,
            ArrayValues::MaskedInt64 { .. } => DType::MaskedInt64,
            ArrayValues::MaskedFloat64 { .. } => DType::MaskedFloat64,
            ArrayValues::Object(_) => DType::Object,
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        match self {
            ArrayValues::Bool(v) => v.len(),
            ArrayValues::Int64(v) => v.len(),
            ArrayValues::Float64(v) => v.len(),
            ArrayValues::Datetime(v) => v.len(),
            ArrayValues::MaskedInt64 { values, .. } => values.len(),
            ArrayValues::MaskedFloat64 { values, .. } => values.len(),
            ArrayValues::Object(v) => v.len(),
        }
    }

    /// Check if the column has no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if row `i` is missing
    pub fn is_missing(&self, i: usize) -> bool {
        match self {
            ArrayValues::Bool(_) | ArrayValues::Int64(_) => false,
            ArrayValues::Float64(v) => v[i].is_nan(),
            ArrayValues::Datetime(v) => v[i] == NAT,
            ArrayValues::MaskedInt64 { valid, .. } => !valid[i],
            ArrayValues::MaskedFloat64 { valid, .. } => !valid[i],
            ArrayValues::Object(v) => v[i].is_missing(),
        }
    }

    /// Check if any row is missing
    pub fn has_missing(&self) -> bool {
        self.dtype().supports_missing() && (0..self.len()).any(|i| self.is_missing(i))
    }

    /// Per-row missing flags
    pub fn missing_mask(&self) -> Vec<bool> {
        (0..self.len()).map(|i| self.is_missing(i)).collect()
    }

    /// Read row `i` as a scalar. Missing entries read as `Scalar::Null`.
    pub fn get(&self, i: usize) -> Scalar {
        if self.is_missing(i) {
            return Scalar::Null;
        }
        match self {
            ArrayValues::Bool(v) => Scalar::Bool(v[i]),
            ArrayValues::Int64(v) => Scalar::Int(v[i]),
            ArrayValues::Float64(v) => Scalar::Float(v[i]),
            ArrayValues::Datetime(v) => Scalar::Datetime(v[i]),
            ArrayValues::MaskedInt64 { values, .. } => Scalar::Int(values[i]),
            ArrayValues::MaskedFloat64 { values, .. } => Scalar::Float(values[i]),
            ArrayValues::Object(v) => v[i].clone(),
        }
    }

    /// All rows as scalars, missing normalised to `Scalar::Null`
    pub fn to_scalars(&self) -> Vec<Scalar> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }

    /// Numeric view for interpolation: `None` marks missing.
    ///
    /// Returns `None` for kinds without a numeric interpretation.
    pub(crate) fn to_f64_points(&self) -> Option<Vec<Option<f64>>> {
        let points = match self {
            ArrayValues::Float64(v) => v.iter().map(|x| (!x.is_nan()).then_some(*x)).collect(),
            ArrayValues::Datetime(v) => v
                .iter()
                .map(|x| (*x != NAT).then_some(*x as f64))
                .collect(),
            ArrayValues::MaskedInt64 { values, valid } => values
                .iter()
                .zip(valid)
                .map(|(x, ok)| ok.then_some(*x as f64))
                .collect(),
            ArrayValues::MaskedFloat64 { values, valid } => values
                .iter()
                .zip(valid)
                .map(|(x, ok)| ok.then_some(*x))
                .collect(),
            _ => return None,
        };
        Some(points)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Derivation
    // ═══════════════════════════════════════════════════════════════════

    /// Copy of the rows in `rows`
    pub fn slice(&self, rows: Range<usize>) -> Self {
        match self {
            ArrayValues::Bool(v) => ArrayValues::Bool(v[rows].to_vec()),
            ArrayValues::Int64(v) => ArrayValues::Int64(v[rows].to_vec()),
            ArrayValues::Float64(v) => ArrayValues::Float64(v[rows].to_vec()),
            ArrayValues::Datetime(v) => ArrayValues::Datetime(v[rows].to_vec()),
            ArrayValues::MaskedInt64 { values, valid } => ArrayValues::MaskedInt64 {
                values: values[rows.clone()].to_vec(),
                valid: valid[rows].to_vec(),
            },
            ArrayValues::MaskedFloat64 { values, valid } => ArrayValues::MaskedFloat64 {
                values: values[rows.clone()].to_vec(),
                valid: valid[rows].to_vec(),
            },
            ArrayValues::Object(v) => ArrayValues::Object(v[rows].to_vec()),
        }
    }

    /// Gather rows by position; `None` produces a missing entry.
    ///
    /// Only called for kinds that support missing values when a `None` is
    /// present.
    pub(crate) fn take(&self, plan: &[Option<usize>]) -> Self {
        debug_assert!(
            self.dtype().supports_missing() || plan.iter().all(Option::is_some),
            "missing entries requested for a {} column",
            self.dtype()
        );
        match self {
            ArrayValues::Bool(v) => {
                ArrayValues::Bool(plan.iter().map(|p| p.map_or(false, |i| v[i])).collect())
            }
            ArrayValues::Int64(v) => {
                ArrayValues::Int64(plan.iter().map(|p| p.map_or(0, |i| v[i])).collect())
            }
            ArrayValues::Float64(v) => {
                ArrayValues::Float64(plan.iter().map(|p| p.map_or(f64::NAN, |i| v[i])).collect())
            }
            ArrayValues::Datetime(v) => {
                ArrayValues::Datetime(plan.iter().map(|p| p.map_or(NAT, |i| v[i])).collect())
            }
            ArrayValues::MaskedInt64 { values, valid } => ArrayValues::MaskedInt64 {
                values: plan.iter().map(|p| p.map_or(0, |i| values[i])).collect(),
                valid: plan.iter().map(|p| p.map_or(false, |i| valid[i])).collect(),
            },
            ArrayValues::MaskedFloat64 { values, valid } => ArrayValues::MaskedFloat64 {
                values: plan.iter().map(|p| p.map_or(0.0, |i| values[i])).collect(),
                valid: plan.iter().map(|p| p.map_or(false, |i| valid[i])).collect(),
            },
            ArrayValues::Object(v) => ArrayValues::Object(
                plan.iter()
                    .map(|p| p.map_or(Scalar::Null, |i| v[i].clone()))
                    .collect(),
            ),
        }
    }

    /// Convert to another kind.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if a value cannot be represented in `dtype`.
    pub fn cast(&self, dtype: DType) -> Result<Self> {
        if dtype == self.dtype() {
            return Ok(self.clone());
        }
        Self::from_scalars(dtype, &self.to_scalars())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Writes
    // ═══════════════════════════════════════════════════════════════════

    /// Store `value` at row `i`.
    ///
    /// Returns `false` (and leaves the column untouched) if this kind cannot
    /// hold the value.
    pub fn set(&mut self, i: usize, value: &Scalar) -> bool {
        if !self.dtype().can_hold(value) {
            return false;
        }
        let missing = value.is_missing();
        match self {
            ArrayValues::Bool(v) => v[i] = value.as_bool().unwrap_or_default(),
            ArrayValues::Int64(v) => v[i] = value.as_i64().unwrap_or_default(),
            ArrayValues::Float64(v) => v[i] = value.as_f64().unwrap_or(f64::NAN),
            ArrayValues::Datetime(v) => v[i] = value.as_datetime().unwrap_or(NAT),
            ArrayValues::MaskedInt64 { values, valid } => {
                values[i] = value.as_i64().unwrap_or_default();
                valid[i] = !missing;
            }
            ArrayValues::MaskedFloat64 { values, valid } => {
                values[i] = value.as_f64().unwrap_or_default();
                valid[i] = !missing;
            }
            ArrayValues::Object(v) => v[i] = value.clone(),
        }
        true
    }

    /// Overwrite rows `offset..offset + src.len()` with `src`.
    ///
    /// Returns `false` if `src` is of a different kind.
    pub(crate) fn write_at(&mut self, offset: usize, src: &ArrayValues) -> bool {
        let end = offset + src.len();
        match (self, src) {
            (ArrayValues::Bool(dst), ArrayValues::Bool(src)) => {
                dst[offset..end].copy_from_slice(src)
            }
            (ArrayValues::Int64(dst), ArrayValues::Int64(src)) => {
                dst[offset..end].copy_from_slice(src)
            }
            (ArrayValues::Float64(dst), ArrayValues::Float64(src)) => {
                dst[offset..end].copy_from_slice(src)
            }
            (ArrayValues::Datetime(dst), ArrayValues::Datetime(src)) => {
                dst[offset..end].copy_from_slice(src)
            }
            (
                ArrayValues::MaskedInt64 { values, valid },
                ArrayValues::MaskedInt64 {
                    values: src_values,
                    valid: src_valid,
                },
            ) => {
                values[offset..end].copy_from_slice(src_values);
                valid[offset..end].copy_from_slice(src_valid);
            }
            (
                ArrayValues::MaskedFloat64 { values, valid },
                ArrayValues::MaskedFloat64 {
                    values: src_values,
                    valid: src_valid,
                },
            ) => {
                values[offset..end].copy_from_slice(src_values);
                valid[offset..end].copy_from_slice(src_valid);
            }
            (ArrayValues::Object(dst), ArrayValues::Object(src)) => {
                dst[offset..end].clone_from_slice(src)
            }
            _ => return false,
        }
        true
    }
}

impl PartialEq for ArrayValues {
    /// Same kind and same values, with missing equal to missing.
    fn eq(&self, other: &Self) -> bool {
        self.dtype() == other.dtype() && self.to_scalars() == other.to_scalars()
    }
}

impl std::fmt::Debug for ArrayValues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ", self.dtype())?;
        f.debug_list().entries(self.to_scalars()).finish()
    }
}
