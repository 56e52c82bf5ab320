//! Chained-lookup results that refuse in-place mutation
//!
//! `df.get("a")` and `df.get_columns(&["a"])` hand out an [`Ephemeral`]
//! wrapper instead of a plain [`Series`]/[`DataFrame`]. Reads go through
//! `Deref`; there is no `DerefMut`, and the in-place operations on the
//! wrapper fail with [`EphemeralMutationError`] without touching anything.
//! Binding the result with [`Ephemeral::retain`] turns it into an ordinary,
//! mutable object whose writes follow the copy-on-write rules (and so never
//! reach the parent table).
//!
//! ```
//! use cowframe::{ArrayValues, DataFrame, Fillable, FrameError};
//!
//! let df = DataFrame::from_columns([("a", ArrayValues::float64(vec![1.0, f64::NAN]))])?;
//!
//! let err = df.get("a")?.fillna_inplace(100.0).unwrap_err();
//! assert!(matches!(err, FrameError::EphemeralMutation(_)));
//!
//! let mut a = df.get("a")?.retain();
//! a.fillna_inplace(100.0)?;
//! assert!(df.values("a")?.has_missing());
//! # Ok::<(), FrameError>(())
//! ```

use std::fmt;
use std::ops::{Deref, Range};

use tracing::debug;

use crate::error::{EphemeralMutationError, Result};
use crate::frame::DataFrame;
use crate::ops::{FillValue, Fillable};
use crate::options::{FillOptions, InterpolateOptions};
use crate::series::Series;
use crate::value::Scalar;

/// A lookup result that is not retained by the caller.
pub struct Ephemeral<T> {
    value: T,
    target: &'static str,
}

impl<T> Ephemeral<T> {
    pub(crate) fn new(value: T, target: &'static str) -> Self {
        Self { value, target }
    }

    /// Keep the lookup result as an ordinary object.
    pub fn retain(self) -> T {
        self.value
    }

    fn reject(&self, operation: &'static str) -> Result<()> {
        debug!(
            operation,
            target = self.target,
            "rejected in-place mutation of a chained lookup"
        );
        Err(EphemeralMutationError::new(operation, self.target).into())
    }
}

impl<T> Deref for Ephemeral<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for Ephemeral<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ephemeral").field(&self.value).finish()
    }
}

// ═══════════════════════════════════════════════════════════════════
// Rejected In-Place Operations
// ═══════════════════════════════════════════════════════════════════

impl<T: Fillable> Ephemeral<T> {
    /// Always fails: the result would be discarded.
    pub fn fillna_inplace(&self, _value: impl Into<FillValue>) -> Result<()> {
        self.reject("fillna")
    }

    /// Always fails: the result would be discarded.
    pub fn fillna_inplace_with(&self, _value: FillValue, _options: &FillOptions) -> Result<()> {
        self.reject("fillna")
    }

    /// Always fails: the result would be discarded.
    pub fn ffill_inplace(&self) -> Result<()> {
        self.reject("ffill")
    }

    /// Always fails: the result would be discarded.
    pub fn ffill_inplace_with(&self, _options: &FillOptions) -> Result<()> {
        self.reject("ffill")
    }

    /// Always fails: the result would be discarded.
    pub fn bfill_inplace(&self) -> Result<()> {
        self.reject("bfill")
    }

    /// Always fails: the result would be discarded.
    pub fn bfill_inplace_with(&self, _options: &FillOptions) -> Result<()> {
        self.reject("bfill")
    }

    /// Always fails: the result would be discarded.
    pub fn interpolate_inplace(&self) -> Result<()> {
        self.reject("interpolate")
    }

    /// Always fails: the result would be discarded.
    pub fn interpolate_inplace_with(&self, _options: &InterpolateOptions) -> Result<()> {
        self.reject("interpolate")
    }
}

impl Ephemeral<Series> {
    /// Always fails: the result would be discarded.
    pub fn set_value(&self, _row: usize, _value: impl Into<Scalar>) -> Result<()> {
        self.reject("set_value")
    }

    /// A view of the lookup, still ephemeral.
    pub fn view(&self) -> Ephemeral<Series> {
        Ephemeral::new(self.value.view(), self.target)
    }

    /// A row slice of the lookup, still ephemeral.
    pub fn slice_rows(&self, rows: Range<usize>) -> Result<Ephemeral<Series>> {
        Ok(Ephemeral::new(self.value.slice_rows(rows)?, self.target))
    }
}

impl Ephemeral<DataFrame> {
    /// Always fails: the result would be discarded.
    pub fn set_value(&self, _row: usize, _column: &str, _value: impl Into<Scalar>) -> Result<()> {
        self.reject("set_value")
    }

    /// A view of the lookup, still ephemeral.
    pub fn view(&self) -> Ephemeral<DataFrame> {
        Ephemeral::new(self.value.view(), self.target)
    }

    /// A row slice of the lookup, still ephemeral.
    pub fn slice_rows(&self, rows: Range<usize>) -> Result<Ephemeral<DataFrame>> {
        Ok(Ephemeral::new(self.value.slice_rows(rows)?, self.target))
    }
}
