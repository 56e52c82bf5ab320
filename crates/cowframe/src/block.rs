//! Column groups and the copy-on-write protocol

use std::fmt;
use std::ops::Range;
use std::sync::{Arc, OnceLock};

use tracing::{debug, trace};

use crate::array::ArrayValues;
use crate::buffer::{Buffer, StorageRef};
use crate::dtype::DType;
use crate::refs::{BlockId, BlockToken, ReferenceTracker};
use crate::value::Scalar;

/// Outcome of [`Block::make_writable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyDecision {
    /// The block was the only alias; the existing buffer will be written.
    Reused,

    /// Another alias existed; the block now owns a private copy.
    Copied,
}

/// A group of adjacent same-kind columns backed by exactly one [`Buffer`].
///
/// Blocks address a window of their buffer: a subset of its physical
/// columns (`cols`) and a contiguous row range (`rows`). Taking a view
/// creates a new block over the same buffer and registers both in the
/// buffer's [`ReferenceTracker`], which is created the first time the
/// buffer is shared.
pub struct Block {
    token: Arc<BlockToken>,
    buffer: Arc<Buffer>,
    cols: Vec<usize>,
    rows: Range<usize>,
    refs: OnceLock<Arc<ReferenceTracker>>,
}

impl Block {
    /// Allocate a fresh, unaliased block holding `columns`.
    pub(crate) fn new(columns: Vec<ArrayValues>) -> Self {
        let nrows = columns.first().map_or(0, ArrayValues::len);
        let ncols = columns.len();
        Self {
            token: BlockToken::new(),
            buffer: Buffer::new(columns),
            cols: (0..ncols).collect(),
            rows: 0..nrows,
            refs: OnceLock::new(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Inspection
    // ═══════════════════════════════════════════════════════════════════

    /// This block's identity
    pub fn id(&self) -> BlockId {
        self.token.id
    }

    /// Element kind of every column in the block
    pub fn dtype(&self) -> DType {
        self.buffer.dtype()
    }

    /// Number of visible columns
    pub fn ncols(&self) -> usize {
        self.cols.len()
    }

    /// Number of visible rows
    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    /// Copy of the values of column `pos`
    pub fn values(&self, pos: usize) -> ArrayValues {
        self.buffer.read()[self.cols[pos]].slice(self.rows.clone())
    }

    /// Identity handle for the storage of column `pos`
    pub fn storage(&self, pos: usize) -> StorageRef {
        StorageRef::new(&self.buffer, self.cols[pos], self.rows.clone())
    }

    /// True iff no other live block aliases this block's buffer.
    pub fn has_no_reference(&self) -> bool {
        self.refs
            .get()
            .map_or(true, |tracker| tracker.has_no_reference(self.id()))
    }

    /// The tracker this block is registered in, if its buffer was ever shared.
    pub fn tracker(&self) -> Option<&Arc<ReferenceTracker>> {
        self.refs.get()
    }

    fn shared_tracker(&self) -> &Arc<ReferenceTracker> {
        self.refs.get_or_init(|| {
            let tracker = ReferenceTracker::new();
            tracker.register(&self.token);
            Arc::new(tracker)
        })
    }

    fn materialize(&self) -> Vec<ArrayValues> {
        let columns = self.buffer.read();
        self.cols
            .iter()
            .map(|&c| columns[c].slice(self.rows.clone()))
            .collect()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Views and Copies
    // ═══════════════════════════════════════════════════════════════════

    fn alias(&self, cols: Vec<usize>, rows: Range<usize>) -> Block {
        let tracker = self.shared_tracker();
        let block = Block {
            token: BlockToken::new(),
            buffer: Arc::clone(&self.buffer),
            cols,
            rows,
            refs: OnceLock::from(Arc::clone(tracker)),
        };
        tracker.register(&block.token);
        trace!(source = %self.id(), view = %block.id(), "registered view");
        block
    }

    /// A view of every column over the same buffer.
    pub(crate) fn view(&self) -> Block {
        self.alias(self.cols.clone(), self.rows.clone())
    }

    /// A view of the columns at `positions` (in that order).
    pub(crate) fn take_columns(&self, positions: &[usize]) -> Block {
        let cols = positions.iter().map(|&p| self.cols[p]).collect();
        self.alias(cols, self.rows.clone())
    }

    /// A view of the rows in `range`, relative to this block.
    pub(crate) fn view_rows(&self, range: Range<usize>) -> Block {
        assert!(range.end <= self.nrows(), "row window past end of block");
        let start = self.rows.start + range.start;
        self.alias(self.cols.clone(), start..start + range.len())
    }

    /// A private deep copy.
    pub(crate) fn deep_copy(&self) -> Block {
        Block::new(self.materialize())
    }

    fn narrow(&mut self, positions: &[usize]) {
        self.cols = positions.iter().map(|&p| self.cols[p]).collect();
    }

    // ═══════════════════════════════════════════════════════════════════
    // Copy-on-Write Protocol
    // ═══════════════════════════════════════════════════════════════════

    /// Ensure this block may write its buffer.
    ///
    /// If another live block aliases the buffer, the visible window is
    /// copied into a new buffer, this block is deregistered from the old
    /// tracker and rebound to the copy. The remaining aliases keep the old
    /// buffer untouched.
    pub fn make_writable(&mut self) -> CopyDecision {
        if self.has_no_reference() {
            trace!(block = %self.id(), "buffer exclusive, writing in place");
            return CopyDecision::Reused;
        }

        let columns = self.materialize();
        if let Some(tracker) = self.refs.take() {
            tracker.deregister(self.id());
        }
        self.cols = (0..columns.len()).collect();
        self.rows = 0..self.rows.len();
        self.buffer = Buffer::new(columns);

        debug!(
            block = %self.id(),
            ncols = self.ncols(),
            nrows = self.nrows(),
            "copied shared buffer before write"
        );
        CopyDecision::Copied
    }

    /// Overwrite column `pos` with `values`.
    ///
    /// # Panics
    ///
    /// Panics if the block is not exclusive or `values` is of another kind
    /// or length; both mean the write protocol was bypassed.
    pub(crate) fn store(&mut self, pos: usize, values: &ArrayValues) {
        assert!(self.has_no_reference(), "write to a shared buffer");
        assert_eq!(values.len(), self.nrows(), "write-back length mismatch");
        let stored = self.buffer.write()[self.cols[pos]].write_at(self.rows.start, values);
        assert!(
            stored,
            "write-back of a {} column into a {} buffer",
            values.dtype(),
            self.dtype()
        );
    }

    /// Store a single value at (`row`, column `pos`).
    ///
    /// Returns `false` if the block's kind cannot hold `value`.
    ///
    /// # Panics
    ///
    /// Panics if the block is not exclusive.
    pub(crate) fn set_value(&mut self, pos: usize, row: usize, value: &Scalar) -> bool {
        assert!(self.has_no_reference(), "write to a shared buffer");
        self.buffer.write()[self.cols[pos]].set(self.rows.start + row, value)
    }

    /// Build the result blocks of a non-inplace operation.
    ///
    /// `changes[pos]` is the new content of column `pos`, or `None` when
    /// the operation leaves it untouched. Untouched columns become views
    /// sharing this block's buffer; changed columns get fresh buffers.
    pub(crate) fn derive(&self, changes: Vec<Option<ArrayValues>>) -> Vec<Piece> {
        let mut unchanged = Vec::new();
        let mut changed = Vec::new();
        for (pos, change) in changes.into_iter().enumerate() {
            match change {
                None => unchanged.push(pos),
                Some(values) => changed.push((pos, values)),
            }
        }

        let mut pieces = Vec::new();
        if !unchanged.is_empty() {
            pieces.push(Piece {
                block: self.take_columns(&unchanged),
                origin: unchanged,
            });
        }
        pieces.extend(Piece::fresh(changed));
        pieces
    }

    /// Apply `changes` to this block in place, following the copy-on-write
    /// protocol, and return the blocks that replace it.
    ///
    /// - Nothing changed: the block is returned as is.
    /// - Exclusive buffer: same-kind columns are written into the existing
    ///   buffer; columns whose kind changed move to fresh buffers.
    /// - Shared buffer: untouched columns stay as views on the old buffer
    ///   (so they keep sharing with the other aliases), same-kind columns
    ///   are copied before being written, and columns whose kind changed
    ///   move to fresh buffers.
    pub(crate) fn apply_in_place(mut self, changes: Vec<Option<ArrayValues>>) -> Vec<Piece> {
        let ncols = self.ncols();
        let mut unchanged = Vec::new();
        let mut same_kind = Vec::new();
        let mut retyped = Vec::new();
        for (pos, change) in changes.into_iter().enumerate() {
            match change {
                None => unchanged.push(pos),
                Some(values) if values.dtype() == self.dtype() => same_kind.push((pos, values)),
                Some(values) => retyped.push((pos, values)),
            }
        }

        if same_kind.is_empty() && retyped.is_empty() {
            return vec![Piece::whole(self)];
        }

        let mut pieces = Vec::new();
        if self.has_no_reference() {
            trace!(block = %self.id(), "buffer exclusive, writing in place");
            for (pos, values) in &same_kind {
                self.store(*pos, values);
            }
            let mut kept: Vec<usize> = unchanged;
            kept.extend(same_kind.iter().map(|(pos, _)| *pos));
            kept.sort_unstable();

            if kept.len() == ncols {
                pieces.push(Piece::whole(self));
            } else if !kept.is_empty() {
                self.narrow(&kept);
                pieces.push(Piece {
                    block: self,
                    origin: kept,
                });
            }
        } else if unchanged.is_empty() && retyped.is_empty() {
            self.make_writable();
            for (pos, values) in &same_kind {
                self.store(*pos, values);
            }
            pieces.push(Piece::whole(self));
        } else {
            debug!(
                block = %self.id(),
                unchanged = unchanged.len(),
                written = same_kind.len(),
                retyped = retyped.len(),
                "splitting shared block"
            );
            if !unchanged.is_empty() {
                pieces.push(Piece {
                    block: self.take_columns(&unchanged),
                    origin: unchanged,
                });
            }
            if !same_kind.is_empty() {
                let positions: Vec<usize> = same_kind.iter().map(|(pos, _)| *pos).collect();
                let mut touched = self.take_columns(&positions);
                touched.make_writable();
                for (i, (_, values)) in same_kind.iter().enumerate() {
                    touched.store(i, values);
                }
                pieces.push(Piece {
                    block: touched,
                    origin: positions,
                });
            }
            // `self` is dropped here and leaves the old tracker
        }

        pieces.extend(Piece::fresh(retyped));
        pieces
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        if let Some(tracker) = self.refs.get() {
            tracker.deregister(self.id());
        }
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("id", &self.id())
            .field("dtype", &self.dtype())
            .field("cols", &self.cols)
            .field("rows", &self.rows)
            .field("shared", &!self.has_no_reference())
            .finish()
    }
}

/// One block produced by splitting or deriving another.
///
/// `origin[i]` is the position, in the source block, of the column this
/// block holds at position `i`.
#[derive(Debug)]
pub(crate) struct Piece {
    pub(crate) block: Block,
    pub(crate) origin: Vec<usize>,
}

impl Piece {
    fn whole(block: Block) -> Self {
        let origin = (0..block.ncols()).collect();
        Self { block, origin }
    }

    /// Fresh unaliased blocks for new column contents, grouped by kind.
    fn fresh(columns: Vec<(usize, ArrayValues)>) -> Vec<Piece> {
        let mut groups: Vec<(DType, Vec<usize>, Vec<ArrayValues>)> = Vec::new();
        for (pos, values) in columns {
            let dtype = values.dtype();
            match groups.iter_mut().find(|(kind, _, _)| *kind == dtype) {
                Some((_, origin, group)) => {
                    origin.push(pos);
                    group.push(values);
                }
                None => groups.push((dtype, vec![pos], vec![values])),
            }
        }
        groups
            .into_iter()
            .map(|(_, origin, values)| Piece {
                block: Block::new(values),
                origin,
            })
            .collect()
    }
}
