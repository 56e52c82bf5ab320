//! Two-dimensional table of named columns

use std::fmt;
use std::ops::Range;

use crate::array::ArrayValues;
use crate::block::Block;
use crate::buffer::StorageRef;
use crate::dtype::DType;
use crate::error::{FrameError, Result};
use crate::guard::Ephemeral;
use crate::manager::BlockManager;
use crate::ops::{FillPlan, FillValue, Fillable, InterpolatePlan, PadPlan};
use crate::options::{FillOptions, InterpolateOptions};
use crate::series::Series;
use crate::value::Scalar;

/// A table of equally long, uniquely named columns.
///
/// Columns of the same kind are consolidated into shared blocks. Views
/// (`view`, `slice_rows`, `select`, `column`) alias those blocks instead of
/// copying them, and every write first makes the written block exclusive,
/// so a write never shows through another table.
///
/// ```
/// use cowframe::{ArrayValues, DataFrame, Fillable, Scalar};
///
/// let mut df = DataFrame::from_columns([
///     ("a", ArrayValues::float64(vec![1.5, f64::NAN])),
///     ("b", ArrayValues::int64(vec![1, 1])),
/// ])?;
/// let view = df.view();
///
/// df.fillna_inplace(5.5)?;
///
/// assert_eq!(df.column_values("a")?, vec![Scalar::Float(1.5), Scalar::Float(5.5)]);
/// assert_eq!(view.column_values("a")?, vec![Scalar::Float(1.5), Scalar::Null]);
/// assert!(df.has_no_reference("a")? && view.has_no_reference("a")?);
/// # Ok::<(), cowframe::FrameError>(())
/// ```
pub struct DataFrame {
    mgr: BlockManager,
}

impl DataFrame {
    /// Build a table from `(name, values)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateColumn` or `LengthMismatch` for malformed input.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, ArrayValues)>,
        S: Into<String>,
    {
        let columns = columns
            .into_iter()
            .map(|(name, values)| (name.into(), values))
            .collect();
        Ok(Self {
            mgr: BlockManager::from_arrays(columns)?,
        })
    }

    fn loc(&self, column: &str) -> Result<usize> {
        self.mgr.column_index(column)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Reads
    // ═══════════════════════════════════════════════════════════════════

    /// Column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.mgr.names().iter().map(String::as_str).collect()
    }

    /// Number of columns
    pub fn ncols(&self) -> usize {
        self.mgr.ncols()
    }

    /// Number of rows
    pub fn nrows(&self) -> usize {
        self.mgr.nrows()
    }

    /// Number of blocks backing the table
    pub fn nblocks(&self) -> usize {
        self.mgr.nblocks()
    }

    /// Element kind of `column`
    pub fn dtype(&self, column: &str) -> Result<DType> {
        Ok(self.mgr.dtype(self.loc(column)?))
    }

    /// Copy of the values of `column`
    pub fn values(&self, column: &str) -> Result<ArrayValues> {
        Ok(self.mgr.values(self.loc(column)?))
    }

    /// Values of `column` as scalars, missing entries as `Scalar::Null`
    pub fn column_values(&self, column: &str) -> Result<Vec<Scalar>> {
        Ok(self.values(column)?.to_scalars())
    }

    /// Read one value.
    pub fn get_value(&self, row: usize, column: &str) -> Result<Scalar> {
        self.mgr.get_value(row, self.loc(column)?)
    }

    /// Identity handle of the storage behind `column`
    pub fn storage(&self, column: &str) -> Result<StorageRef> {
        Ok(self.mgr.storage(self.loc(column)?))
    }

    /// True iff no other object aliases the block holding `column`.
    pub fn has_no_reference(&self, column: &str) -> Result<bool> {
        Ok(self.mgr.has_no_reference(self.loc(column)?))
    }

    /// The block holding `column`
    pub fn block(&self, column: &str) -> Result<&Block> {
        Ok(self.mgr.locate(self.loc(column)?).0)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Views and Copies
    // ═══════════════════════════════════════════════════════════════════

    /// A view of the whole table (`df[:]`).
    pub fn view(&self) -> DataFrame {
        Self {
            mgr: self.mgr.view(),
        }
    }

    /// A view of the rows in `rows`.
    pub fn slice_rows(&self, rows: Range<usize>) -> Result<DataFrame> {
        Ok(Self {
            mgr: self.mgr.slice_rows(rows)?,
        })
    }

    /// A view of `columns`, in that order.
    ///
    /// Public callers reach this through [`DataFrame::get_columns`].
    fn select<S: AsRef<str>>(&self, columns: &[S]) -> Result<DataFrame> {
        let locs = columns
            .iter()
            .map(|name| self.loc(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            mgr: self.mgr.select(&locs)?,
        })
    }

    /// A series viewing `column`.
    fn column(&self, column: &str) -> Result<Series> {
        let loc = self.loc(column)?;
        Ok(Series::from_manager(self.mgr.select(&[loc])?))
    }

    /// A deep copy with its own storage.
    pub fn copy(&self) -> DataFrame {
        Self {
            mgr: self.mgr.deep_copy(),
        }
    }

    /// Chained column lookup (`df["a"]`).
    ///
    /// The result cannot be mutated in place; see [`Ephemeral`].
    pub fn get(&self, column: &str) -> Result<Ephemeral<Series>> {
        Ok(Ephemeral::new(self.column(column)?, "Series"))
    }

    /// Chained column-subset lookup (`df[["a", "b"]]`).
    ///
    /// The result cannot be mutated in place; see [`Ephemeral`].
    pub fn get_columns<S: AsRef<str>>(&self, columns: &[S]) -> Result<Ephemeral<DataFrame>> {
        Ok(Ephemeral::new(self.select(columns)?, "DataFrame"))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Writes
    // ═══════════════════════════════════════════════════════════════════

    /// Store `value` at (`row`, `column`), widening the column if its kind
    /// cannot hold the value.
    pub fn set_value(&mut self, row: usize, column: &str, value: impl Into<Scalar>) -> Result<()> {
        let loc = self.loc(column)?;
        self.mgr.set_value(row, loc, &value.into())
    }

    /// Numeric interpolation of a table made only of object columns has no
    /// column it could apply to.
    fn check_interpolate(&self, plan: &InterpolatePlan<'_>) -> Result<()> {
        let all_object = self.ncols() > 0
            && (0..self.ncols()).all(|loc| self.mgr.dtype(loc) == DType::Object);
        if plan.is_numeric() && all_object {
            return Err(FrameError::Unsupported {
                operation: "interpolate",
                dtype: DType::Object,
            });
        }
        Ok(())
    }
}

impl Fillable for DataFrame {
    fn fillna_with(&self, value: FillValue, options: &FillOptions) -> Result<Self> {
        let plan = FillPlan::for_frame(&value, options)?;
        Ok(Self {
            mgr: self.mgr.apply(&plan)?,
        })
    }

    fn fillna_inplace_with(&mut self, value: FillValue, options: &FillOptions) -> Result<()> {
        let plan = FillPlan::for_frame(&value, options)?;
        self.mgr.apply_inplace(&plan)
    }

    fn ffill_with(&self, options: &FillOptions) -> Result<Self> {
        Ok(Self {
            mgr: self.mgr.apply(&PadPlan::forward(options))?,
        })
    }

    fn ffill_inplace_with(&mut self, options: &FillOptions) -> Result<()> {
        self.mgr.apply_inplace(&PadPlan::forward(options))
    }

    fn bfill_with(&self, options: &FillOptions) -> Result<Self> {
        Ok(Self {
            mgr: self.mgr.apply(&PadPlan::backward(options))?,
        })
    }

    fn bfill_inplace_with(&mut self, options: &FillOptions) -> Result<()> {
        self.mgr.apply_inplace(&PadPlan::backward(options))
    }

    fn interpolate_with(&self, options: &InterpolateOptions) -> Result<Self> {
        let plan = InterpolatePlan::new(options, "DataFrame");
        self.check_interpolate(&plan)?;
        Ok(Self {
            mgr: self.mgr.apply(&plan)?,
        })
    }

    fn interpolate_inplace_with(&mut self, options: &InterpolateOptions) -> Result<()> {
        let plan = InterpolatePlan::new(options, "DataFrame");
        self.check_interpolate(&plan)?;
        self.mgr.apply_inplace(&plan)
    }
}

impl PartialEq for DataFrame {
    fn eq(&self, other: &Self) -> bool {
        self.mgr.equals(&other.mgr)
    }
}

impl fmt::Debug for DataFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (loc, name) in self.mgr.names().iter().enumerate() {
            map.entry(name, &self.mgr.values(loc));
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::shares_storage;

    fn frame() -> DataFrame {
        DataFrame::from_columns([
            ("a", ArrayValues::float64(vec![1.5, f64::NAN])),
            ("b", ArrayValues::int64(vec![1, 1])),
        ])
        .unwrap()
    }

    #[test]
    fn test_reads() {
        let df = frame();
        assert_eq!(df.column_names(), vec!["a", "b"]);
        assert_eq!(df.nrows(), 2);
        assert_eq!(df.dtype("b").unwrap(), DType::Int64);
        assert_eq!(df.get_value(1, "a").unwrap(), Scalar::Null);
        assert!(matches!(
            df.values("zz"),
            Err(FrameError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_column_is_a_view() {
        let df = frame();
        let a = df.column("a").unwrap();
        assert!(shares_storage(&a.storage(), &df.storage("a").unwrap()));
        assert!(!df.has_no_reference("a").unwrap());
        assert!(df.has_no_reference("b").unwrap());
    }

    #[test]
    fn test_select_unknown_column() {
        let df = frame();
        assert!(df.select(&["a", "nope"]).is_err());
        assert!(df.select(&["a", "a"]).is_err());
    }

    #[test]
    fn test_copy_equals_but_does_not_share() {
        let df = frame();
        let copy = df.copy();
        assert_eq!(df, copy);
        assert!(!shares_storage(
            &df.storage("a").unwrap(),
            &copy.storage("a").unwrap()
        ));
    }

    #[test]
    fn test_all_object_table_rejects_linear_interpolate() {
        let df = DataFrame::from_columns([(
            "a",
            ArrayValues::object(vec![Scalar::string("x"), Scalar::Null]),
        )])
        .unwrap();
        assert_eq!(
            df.interpolate().unwrap_err(),
            FrameError::Unsupported {
                operation: "interpolate",
                dtype: DType::Object
            }
        );
    }

    #[test]
    fn test_debug_lists_columns() {
        let rendered = format!("{:?}", frame());
        assert!(rendered.contains("\"a\""));
        assert!(rendered.contains("int64"));
    }
}
