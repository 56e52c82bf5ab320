//! Single named column

use std::fmt;
use std::ops::Range;

use crate::array::ArrayValues;
use crate::block::Block;
use crate::buffer::StorageRef;
use crate::dtype::DType;
use crate::error::Result;
use crate::manager::BlockManager;
use crate::ops::{FillPlan, FillValue, Fillable, InterpolatePlan, PadPlan};
use crate::options::{FillOptions, InterpolateOptions};
use crate::value::Scalar;

/// A named column.
///
/// A series owns one block (possibly a view of a table's block). Taking a
/// view shares storage; writing follows the copy-on-write rules.
pub struct Series {
    mgr: BlockManager,
}

impl Series {
    /// Create a series owning `values`.
    pub fn new(name: impl Into<String>, values: ArrayValues) -> Self {
        Self {
            mgr: BlockManager::single(name.into(), values),
        }
    }

    pub(crate) fn from_manager(mgr: BlockManager) -> Self {
        debug_assert_eq!(mgr.ncols(), 1, "a series holds exactly one column");
        Self { mgr }
    }

    /// The series name
    pub fn name(&self) -> &str {
        self.mgr.names()[0].as_str()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.mgr.nrows()
    }

    /// Check if the series has no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element kind
    pub fn dtype(&self) -> DType {
        self.mgr.dtype(0)
    }

    /// Copy of the values
    pub fn values(&self) -> ArrayValues {
        self.mgr.values(0)
    }

    /// Values as scalars, missing entries as `Scalar::Null`
    pub fn to_vec(&self) -> Vec<Scalar> {
        self.values().to_scalars()
    }

    /// Read one value.
    pub fn get_value(&self, row: usize) -> Result<Scalar> {
        self.mgr.get_value(row, 0)
    }

    /// Identity handle of the backing storage
    pub fn storage(&self) -> StorageRef {
        self.mgr.storage(0)
    }

    /// True iff no other object aliases this series' storage.
    pub fn has_no_reference(&self) -> bool {
        self.mgr.has_no_reference(0)
    }

    /// The block backing this series
    pub fn block(&self) -> &Block {
        self.mgr.locate(0).0
    }

    // ═══════════════════════════════════════════════════════════════════
    // Views and Copies
    // ═══════════════════════════════════════════════════════════════════

    /// A view sharing storage with `self` (`ser[:]`).
    pub fn view(&self) -> Series {
        Series::from_manager(self.mgr.view())
    }

    /// A view of the rows in `rows`.
    pub fn slice_rows(&self, rows: Range<usize>) -> Result<Series> {
        Ok(Series::from_manager(self.mgr.slice_rows(rows)?))
    }

    /// A deep copy with its own storage.
    pub fn copy(&self) -> Series {
        Series::from_manager(self.mgr.deep_copy())
    }

    /// Store `value` at `row`, widening the series if its kind cannot hold it.
    pub fn set_value(&mut self, row: usize, value: impl Into<Scalar>) -> Result<()> {
        self.mgr.set_value(row, 0, &value.into())
    }
}

impl Fillable for Series {
    fn fillna_with(&self, value: FillValue, options: &FillOptions) -> Result<Self> {
        let plan = FillPlan::for_series(&value, options)?;
        Ok(Series::from_manager(self.mgr.apply(&plan)?))
    }

    fn fillna_inplace_with(&mut self, value: FillValue, options: &FillOptions) -> Result<()> {
        let plan = FillPlan::for_series(&value, options)?;
        self.mgr.apply_inplace(&plan)
    }

    fn ffill_with(&self, options: &FillOptions) -> Result<Self> {
        Ok(Series::from_manager(self.mgr.apply(&PadPlan::forward(options))?))
    }

    fn ffill_inplace_with(&mut self, options: &FillOptions) -> Result<()> {
        self.mgr.apply_inplace(&PadPlan::forward(options))
    }

    fn bfill_with(&self, options: &FillOptions) -> Result<Self> {
        Ok(Series::from_manager(self.mgr.apply(&PadPlan::backward(options))?))
    }

    fn bfill_inplace_with(&mut self, options: &FillOptions) -> Result<()> {
        self.mgr.apply_inplace(&PadPlan::backward(options))
    }

    fn interpolate_with(&self, options: &InterpolateOptions) -> Result<Self> {
        let plan = InterpolatePlan::new(options, "Series");
        Ok(Series::from_manager(self.mgr.apply(&plan)?))
    }

    fn interpolate_inplace_with(&mut self, options: &InterpolateOptions) -> Result<()> {
        let plan = InterpolatePlan::new(options, "Series");
        self.mgr.apply_inplace(&plan)
    }
}

impl PartialEq for Series {
    fn eq(&self, other: &Self) -> bool {
        self.mgr.equals(&other.mgr)
    }
}

impl fmt::Debug for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Series {:?}: {:?}", self.name(), self.values())
    }
}
