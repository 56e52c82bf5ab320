//! Column placement across blocks
//!
//! A [`BlockManager`] maps every column of a table to a position inside one
//! [`Block`], creates views by aliasing blocks, and routes column-wise
//! mutations to the blocks that hold the affected columns.

use std::ops::Range;

use indexmap::IndexSet;
use tracing::trace;

use crate::array::ArrayValues;
use crate::block::{Block, Piece};
use crate::buffer::StorageRef;
use crate::dtype::DType;
use crate::error::{FrameError, Result};
use crate::value::Scalar;

/// A column-wise transformation applied by [`BlockManager::apply`] and
/// [`BlockManager::apply_inplace`].
pub(crate) trait ColumnPlan {
    /// Whether the column named `name` is evaluated at all.
    ///
    /// Columns that are not targeted are passed through untouched.
    fn targets(&self, _name: &str) -> bool {
        true
    }

    /// The new content of a column, or `None` if it would not change.
    fn apply(&self, name: &str, values: &ArrayValues) -> Result<Option<ArrayValues>>;
}

/// A block together with the table position of each of its columns.
#[derive(Debug)]
struct Slot {
    block: Block,
    locs: Vec<usize>,
}

impl Slot {
    fn from_piece(piece: Piece, locs: &[usize]) -> Self {
        Slot {
            locs: piece.origin.iter().map(|&p| locs[p]).collect(),
            block: piece.block,
        }
    }
}

/// Ordered columns of a table, stored in blocks.
#[derive(Debug)]
pub(crate) struct BlockManager {
    names: IndexSet<String>,
    slots: Vec<Slot>,
    /// Column position -> (slot index, position in the slot's block)
    placement: Vec<(usize, usize)>,
    nrows: usize,
}

impl BlockManager {
    // ═══════════════════════════════════════════════════════════════════
    // Construction
    // ═══════════════════════════════════════════════════════════════════

    /// Build a manager from named columns, consolidating columns of the
    /// same kind into one block.
    pub(crate) fn from_arrays(columns: Vec<(String, ArrayValues)>) -> Result<Self> {
        let nrows = columns.first().map_or(0, |(_, values)| values.len());
        let mut names = IndexSet::with_capacity(columns.len());
        let mut groups: Vec<(DType, Vec<usize>, Vec<ArrayValues>)> = Vec::new();

        for (loc, (name, values)) in columns.into_iter().enumerate() {
            if values.len() != nrows {
                return Err(FrameError::LengthMismatch {
                    expected: nrows,
                    got: values.len(),
                });
            }
            if names.contains(&name) {
                return Err(FrameError::DuplicateColumn { name });
            }
            names.insert(name);

            let dtype = values.dtype();
            match groups.iter_mut().find(|(kind, _, _)| *kind == dtype) {
                Some((_, locs, group)) => {
                    locs.push(loc);
                    group.push(values);
                }
                None => groups.push((dtype, vec![loc], vec![values])),
            }
        }

        let slots = groups
            .into_iter()
            .map(|(_, locs, values)| Slot {
                block: Block::new(values),
                locs,
            })
            .collect();
        Ok(Self::assemble(names, slots, nrows))
    }

    /// A manager holding one column.
    pub(crate) fn single(name: String, values: ArrayValues) -> Self {
        let nrows = values.len();
        let slot = Slot {
            block: Block::new(vec![values]),
            locs: vec![0],
        };
        Self::assemble(IndexSet::from([name]), vec![slot], nrows)
    }

    fn assemble(names: IndexSet<String>, slots: Vec<Slot>, nrows: usize) -> Self {
        let mut mgr = Self {
            names,
            slots,
            placement: Vec::new(),
            nrows,
        };
        mgr.rebuild_placement();
        mgr
    }

    fn rebuild_placement(&mut self) {
        let mut placement = vec![(usize::MAX, 0); self.names.len()];
        for (s, slot) in self.slots.iter().enumerate() {
            for (pos, &loc) in slot.locs.iter().enumerate() {
                placement[loc] = (s, pos);
            }
        }
        assert!(
            placement.iter().all(|(s, _)| *s != usize::MAX),
            "every column must be placed in exactly one block"
        );
        self.placement = placement;
    }

    // ═══════════════════════════════════════════════════════════════════
    // Inspection
    // ═══════════════════════════════════════════════════════════════════

    pub(crate) fn names(&self) -> &IndexSet<String> {
        &self.names
    }

    pub(crate) fn ncols(&self) -> usize {
        self.names.len()
    }

    pub(crate) fn nrows(&self) -> usize {
        self.nrows
    }

    pub(crate) fn nblocks(&self) -> usize {
        self.slots.len()
    }

    /// Position of the column called `name`.
    pub(crate) fn column_index(&self, name: &str) -> Result<usize> {
        self.names
            .get_index_of(name)
            .ok_or_else(|| FrameError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    /// The block holding column `loc` and the column's position in it.
    pub(crate) fn locate(&self, loc: usize) -> (&Block, usize) {
        let (s, pos) = self.placement[loc];
        (&self.slots[s].block, pos)
    }

    pub(crate) fn dtype(&self, loc: usize) -> DType {
        self.locate(loc).0.dtype()
    }

    pub(crate) fn values(&self, loc: usize) -> ArrayValues {
        let (block, pos) = self.locate(loc);
        block.values(pos)
    }

    pub(crate) fn storage(&self, loc: usize) -> StorageRef {
        let (block, pos) = self.locate(loc);
        block.storage(pos)
    }

    pub(crate) fn has_no_reference(&self, loc: usize) -> bool {
        self.locate(loc).0.has_no_reference()
    }

    pub(crate) fn get_value(&self, row: usize, loc: usize) -> Result<Scalar> {
        self.check_row(row)?;
        Ok(self.values(loc).get(row))
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.nrows {
            return Err(FrameError::RowOutOfBounds {
                row,
                len: self.nrows,
            });
        }
        Ok(())
    }

    /// Same names in the same order, same kinds and same values.
    pub(crate) fn equals(&self, other: &BlockManager) -> bool {
        self.nrows == other.nrows
            && self.names.iter().eq(other.names.iter())
            && (0..self.ncols()).all(|loc| self.values(loc) == other.values(loc))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Views and Copies
    // ═══════════════════════════════════════════════════════════════════

    /// A view of every column, aliasing every block.
    pub(crate) fn view(&self) -> Self {
        let slots = self
            .slots
            .iter()
            .map(|slot| Slot {
                block: slot.block.view(),
                locs: slot.locs.clone(),
            })
            .collect();
        Self::assemble(self.names.clone(), slots, self.nrows)
    }

    /// A view of the rows in `rows`.
    pub(crate) fn slice_rows(&self, rows: Range<usize>) -> Result<Self> {
        if rows.start > rows.end || rows.end > self.nrows {
            return Err(FrameError::RowOutOfBounds {
                row: rows.end.max(rows.start),
                len: self.nrows,
            });
        }
        let slots = self
            .slots
            .iter()
            .map(|slot| Slot {
                block: slot.block.view_rows(rows.clone()),
                locs: slot.locs.clone(),
            })
            .collect();
        Ok(Self::assemble(self.names.clone(), slots, rows.len()))
    }

    /// A view of the columns at `locs`, in that order.
    pub(crate) fn select(&self, locs: &[usize]) -> Result<Self> {
        let mut names = IndexSet::with_capacity(locs.len());
        let mut picks: Vec<(Vec<usize>, Vec<usize>)> =
            vec![(Vec::new(), Vec::new()); self.slots.len()];

        for (new_loc, &loc) in locs.iter().enumerate() {
            let name = &self.names[loc];
            if !names.insert(name.clone()) {
                return Err(FrameError::DuplicateColumn { name: name.clone() });
            }
            let (s, pos) = self.placement[loc];
            picks[s].0.push(pos);
            picks[s].1.push(new_loc);
        }

        let slots = picks
            .into_iter()
            .enumerate()
            .filter(|(_, (positions, _))| !positions.is_empty())
            .map(|(s, (positions, new_locs))| Slot {
                block: self.slots[s].block.take_columns(&positions),
                locs: new_locs,
            })
            .collect();
        Ok(Self::assemble(names, slots, self.nrows))
    }

    /// A deep copy with fresh, unaliased buffers.
    pub(crate) fn deep_copy(&self) -> Self {
        let slots = self
            .slots
            .iter()
            .map(|slot| Slot {
                block: slot.block.deep_copy(),
                locs: slot.locs.clone(),
            })
            .collect();
        Self::assemble(self.names.clone(), slots, self.nrows)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Mutations
    // ═══════════════════════════════════════════════════════════════════

    /// Evaluate `plan` on every targeted column without writing anything.
    fn plan_changes(&self, plan: &dyn ColumnPlan) -> Result<Vec<Vec<Option<ArrayValues>>>> {
        self.slots
            .iter()
            .map(|slot| {
                slot.locs
                    .iter()
                    .enumerate()
                    .map(|(pos, &loc)| {
                        let name = &self.names[loc];
                        if !plan.targets(name) {
                            return Ok(None);
                        }
                        plan.apply(name, &slot.block.values(pos))
                    })
                    .collect()
            })
            .collect()
    }

    /// Apply `plan` into a new manager. Unchanged columns share storage
    /// with `self`.
    pub(crate) fn apply(&self, plan: &dyn ColumnPlan) -> Result<Self> {
        let changes = self.plan_changes(plan)?;
        let mut slots = Vec::with_capacity(self.slots.len());
        for (slot, changes) in self.slots.iter().zip(changes) {
            slots.extend(
                slot.block
                    .derive(changes)
                    .into_iter()
                    .map(|piece| Slot::from_piece(piece, &slot.locs)),
            );
        }
        Ok(Self::assemble(self.names.clone(), slots, self.nrows))
    }

    /// Apply `plan` to `self`, following the copy-on-write protocol per
    /// block. Nothing is written if evaluating any column fails.
    pub(crate) fn apply_inplace(&mut self, plan: &dyn ColumnPlan) -> Result<()> {
        let changes = self.plan_changes(plan)?;
        if changes.iter().flatten().all(Option::is_none) {
            trace!("no column changed, nothing to write");
            return Ok(());
        }

        let slots = std::mem::take(&mut self.slots);
        for (slot, changes) in slots.into_iter().zip(changes) {
            if changes.iter().all(Option::is_none) {
                self.slots.push(slot);
                continue;
            }
            let Slot { block, locs } = slot;
            self.slots.extend(
                block
                    .apply_in_place(changes)
                    .into_iter()
                    .map(|piece| Slot::from_piece(piece, &locs)),
            );
        }
        self.rebuild_placement();
        Ok(())
    }

    /// Store `value` at (`row`, column `loc`).
    ///
    /// Writes through the column's block when its kind can hold the value,
    /// otherwise moves the column to a widened kind.
    pub(crate) fn set_value(&mut self, row: usize, loc: usize, value: &Scalar) -> Result<()> {
        self.check_row(row)?;
        let (s, pos) = self.placement[loc];
        let block = &mut self.slots[s].block;

        if block.dtype().can_hold(value) {
            block.make_writable();
            let stored = block.set_value(pos, row, value);
            debug_assert!(stored, "kind accepted the value but the write failed");
            return Ok(());
        }

        let from = block.dtype();
        let dtype = from.common_type(value);
        let mut widened = block.values(pos).cast(dtype)?;
        if !widened.set(row, value) {
            return Err(FrameError::TypeMismatch {
                dtype,
                value: value.clone(),
            });
        }
        trace!(column = %self.names[loc], %from, to = %dtype, "widening column for scalar write");
        self.replace_column(loc, widened);
        Ok(())
    }

    fn replace_column(&mut self, loc: usize, values: ArrayValues) {
        let (s, pos) = self.placement[loc];
        let Slot { block, locs } = self.slots.remove(s);
        let mut changes = vec![None; block.ncols()];
        changes[pos] = Some(values);
        self.slots.extend(
            block
                .apply_in_place(changes)
                .into_iter()
                .map(|piece| Slot::from_piece(piece, &locs)),
        );
        self.rebuild_placement();
    }
}
