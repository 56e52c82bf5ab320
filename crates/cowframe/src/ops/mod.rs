//! Missing-value operations: fillna, ffill/bfill and interpolate
//!
//! Every operation is expressed as a [`ColumnPlan`](crate::manager::ColumnPlan):
//! a per-column function returning the new content of a column, or `None`
//! when nothing would change. The manager turns "nothing would change" into
//! shared storage and routes real changes through the copy-on-write
//! protocol, so the no-op and partial-copy rules live in one place for all
//! operations.

mod fill;
mod interpolate;

pub(crate) use fill::{FillPlan, PadPlan};
pub(crate) use interpolate::InterpolatePlan;

use indexmap::IndexMap;

use crate::array::ArrayValues;
use crate::dtype::DType;
use crate::error::Result;
use crate::options::{Downcast, FillOptions, InterpolateOptions};
use crate::value::Scalar;

/// What `fillna` writes into missing entries.
#[derive(Debug, Clone, PartialEq)]
pub enum FillValue {
    /// One value for every missing entry
    Scalar(Scalar),

    /// Per-column values (tables only). Columns not named are left alone.
    Columns(IndexMap<String, Scalar>),

    /// Per-row values (series only). Rows not named are left alone.
    Rows(IndexMap<usize, Scalar>),
}

impl FillValue {
    /// Build a per-column fill.
    pub fn columns<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Scalar>,
    {
        FillValue::Columns(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a per-row fill.
    pub fn rows<V: Into<Scalar>>(entries: impl IntoIterator<Item = (usize, V)>) -> Self {
        FillValue::Rows(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl From<Scalar> for FillValue {
    fn from(value: Scalar) -> Self {
        FillValue::Scalar(value)
    }
}

impl From<f64> for FillValue {
    fn from(value: f64) -> Self {
        FillValue::Scalar(Scalar::Float(value))
    }
}

impl From<i64> for FillValue {
    fn from(value: i64) -> Self {
        FillValue::Scalar(Scalar::Int(value))
    }
}

impl From<i32> for FillValue {
    fn from(value: i32) -> Self {
        FillValue::Scalar(Scalar::Int(value.into()))
    }
}

impl From<&str> for FillValue {
    fn from(value: &str) -> Self {
        FillValue::Scalar(Scalar::string(value))
    }
}

impl From<IndexMap<String, Scalar>> for FillValue {
    fn from(map: IndexMap<String, Scalar>) -> Self {
        FillValue::Columns(map)
    }
}

impl From<IndexMap<usize, Scalar>> for FillValue {
    fn from(map: IndexMap<usize, Scalar>) -> Self {
        FillValue::Rows(map)
    }
}

/// Missing-value operations shared by [`DataFrame`](crate::DataFrame) and
/// [`Series`](crate::Series).
///
/// Each operation comes as a pair: `op` returns a new object and leaves the
/// receiver alone, `op_inplace` updates the receiver. Columns the operation
/// does not change keep sharing storage with the source in both forms.
///
/// ```
/// use cowframe::{ArrayValues, DataFrame, Fillable};
///
/// let df = DataFrame::from_columns([
///     ("a", ArrayValues::float64(vec![1.5, f64::NAN])),
///     ("b", ArrayValues::int64(vec![1, 1])),
/// ])?;
/// let filled = df.fillna(5.5)?;
///
/// assert!(filled.storage("b")?.shares_storage(&df.storage("b")?));
/// assert!(!filled.storage("a")?.shares_storage(&df.storage("a")?));
/// # Ok::<(), cowframe::FrameError>(())
/// ```
pub trait Fillable: Sized {
    /// Fill missing entries with `value`.
    fn fillna_with(&self, value: FillValue, options: &FillOptions) -> Result<Self>;

    /// Fill missing entries with `value`, in place.
    fn fillna_inplace_with(&mut self, value: FillValue, options: &FillOptions) -> Result<()>;

    /// Propagate the last valid entry forward.
    fn ffill_with(&self, options: &FillOptions) -> Result<Self>;

    /// Propagate the last valid entry forward, in place.
    fn ffill_inplace_with(&mut self, options: &FillOptions) -> Result<()>;

    /// Propagate the next valid entry backward.
    fn bfill_with(&self, options: &FillOptions) -> Result<Self>;

    /// Propagate the next valid entry backward, in place.
    fn bfill_inplace_with(&mut self, options: &FillOptions) -> Result<()>;

    /// Fill gaps by interpolation.
    fn interpolate_with(&self, options: &InterpolateOptions) -> Result<Self>;

    /// Fill gaps by interpolation, in place.
    fn interpolate_inplace_with(&mut self, options: &InterpolateOptions) -> Result<()>;

    /// [`fillna_with`](Fillable::fillna_with) using default options.
    fn fillna(&self, value: impl Into<FillValue>) -> Result<Self> {
        self.fillna_with(value.into(), &FillOptions::default())
    }

    /// [`fillna_inplace_with`](Fillable::fillna_inplace_with) using default options.
    fn fillna_inplace(&mut self, value: impl Into<FillValue>) -> Result<()> {
        self.fillna_inplace_with(value.into(), &FillOptions::default())
    }

    /// [`ffill_with`](Fillable::ffill_with) using default options.
    fn ffill(&self) -> Result<Self> {
        self.ffill_with(&FillOptions::default())
    }

    /// [`ffill_inplace_with`](Fillable::ffill_inplace_with) using default options.
    fn ffill_inplace(&mut self) -> Result<()> {
        self.ffill_inplace_with(&FillOptions::default())
    }

    /// [`bfill_with`](Fillable::bfill_with) using default options.
    fn bfill(&self) -> Result<Self> {
        self.bfill_with(&FillOptions::default())
    }

    /// [`bfill_inplace_with`](Fillable::bfill_inplace_with) using default options.
    fn bfill_inplace(&mut self) -> Result<()> {
        self.bfill_inplace_with(&FillOptions::default())
    }

    /// Linear [`interpolate_with`](Fillable::interpolate_with).
    fn interpolate(&self) -> Result<Self> {
        self.interpolate_with(&InterpolateOptions::default())
    }

    /// Linear [`interpolate_inplace_with`](Fillable::interpolate_inplace_with).
    fn interpolate_inplace(&mut self) -> Result<()> {
        self.interpolate_inplace_with(&InterpolateOptions::default())
    }
}

/// Apply `downcast` to a column that an operation changed.
pub(crate) fn downcast(values: ArrayValues, downcast: Downcast) -> Result<ArrayValues> {
    if downcast == Downcast::None {
        return Ok(values);
    }
    let narrowed = match &values {
        ArrayValues::Float64(v) if v.iter().all(|x| Scalar::Float(*x).is_integral()) => {
            Some(values.cast(DType::Int64)?)
        }
        ArrayValues::Object(_) => infer_objects(&values),
        _ => None,
    };
    Ok(narrowed.unwrap_or(values))
}

/// Convert an object column to the kind its values fit, if there is one.
pub(crate) fn infer_objects(values: &ArrayValues) -> Option<ArrayValues> {
    let ArrayValues::Object(scalars) = values else {
        return None;
    };
    let dtype = DType::infer(scalars)?;
    ArrayValues::from_scalars(dtype, scalars).ok()
}
