//! Shared storage blocks and their identity handles

use std::ops::Range;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use crate::array::ArrayValues;
use crate::dtype::DType;

/// A block of typed storage backing one or more adjacent columns.
///
/// A buffer has no identity beyond its allocation: two buffers holding equal
/// values are still different storage. Buffers are shared between blocks
/// through `Arc`, and only the block that currently holds exclusivity (see
/// [`Block::make_writable`](crate::Block::make_writable)) may write to it.
#[derive(Debug)]
pub struct Buffer {
    /// Element kind of every column
    dtype: DType,

    /// Row count of every column
    nrows: usize,

    /// The columns (interior mutability for the authorized write path)
    columns: RwLock<Vec<ArrayValues>>,
}

impl Buffer {
    /// Wrap homogeneous columns into a new shared buffer.
    ///
    /// # Panics
    ///
    /// Panics if `columns` is empty or mixes kinds or lengths; callers
    /// validate this before allocating.
    pub(crate) fn new(columns: Vec<ArrayValues>) -> Arc<Self> {
        assert!(!columns.is_empty(), "buffer needs at least one column");
        let dtype = columns[0].dtype();
        let nrows = columns[0].len();
        assert!(
            columns.iter().all(|c| c.dtype() == dtype && c.len() == nrows),
            "buffer columns must share kind and length"
        );
        Arc::new(Self {
            dtype,
            nrows,
            columns: RwLock::new(columns),
        })
    }

    /// Element kind of the stored columns
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Number of rows in each stored column
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of stored columns
    pub fn ncols(&self) -> usize {
        self.read().len()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Vec<ArrayValues>> {
        // Columns hold plain data, so a panicked writer cannot leave them
        // in a state worse than a partial write of valid values.
        self.columns.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Vec<ArrayValues>> {
        self.columns.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An opaque identity handle for the storage behind one column.
///
/// Holds a non-owning pointer to the [`Buffer`], so keeping a `StorageRef`
/// around never keeps a table's data alive and never counts as an alias.
/// Compare handles with [`shares_storage`].
#[derive(Debug, Clone)]
pub struct StorageRef {
    buffer: Weak<Buffer>,
    column: usize,
    rows: Range<usize>,
}

impl StorageRef {
    pub(crate) fn new(buffer: &Arc<Buffer>, column: usize, rows: Range<usize>) -> Self {
        Self {
            buffer: Arc::downgrade(buffer),
            column,
            rows,
        }
    }

    /// Check whether both handles address overlapping storage.
    pub fn shares_storage(&self, other: &StorageRef) -> bool {
        shares_storage(self, other)
    }

    /// Whether the addressed buffer is still owned by any block.
    pub fn is_live(&self) -> bool {
        self.buffer.strong_count() > 0
    }
}

/// Check whether two columns are backed by the same storage.
///
/// This is an identity check on the underlying [`Buffer`] allocation (plus
/// the physical column and row window inside it), never a value comparison.
pub fn shares_storage(a: &StorageRef, b: &StorageRef) -> bool {
    let overlap = a.rows.start < b.rows.end && b.rows.start < a.rows.end;
    Weak::ptr_eq(&a.buffer, &b.buffer) && a.column == b.column && (overlap || a.rows == b.rows)
}
