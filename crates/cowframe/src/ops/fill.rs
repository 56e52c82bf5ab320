//! fillna and forward/backward fill

use tracing::trace;

use super::{downcast, FillValue};
use crate::array::ArrayValues;
use crate::error::{FrameError, Result};
use crate::manager::ColumnPlan;
use crate::options::FillOptions;
use crate::value::Scalar;

/// `fillna` as a column plan.
pub(crate) struct FillPlan<'a> {
    value: &'a FillValue,
    options: &'a FillOptions,
}

impl<'a> FillPlan<'a> {
    /// Plan for a table: scalar or per-column values.
    pub(crate) fn for_frame(value: &'a FillValue, options: &'a FillOptions) -> Result<Self> {
        if let FillValue::Rows(_) = value {
            return Err(FrameError::InvalidFillValue(
                "a row mapping cannot fill a DataFrame; use a column mapping".to_string(),
            ));
        }
        Ok(Self { value, options })
    }

    /// Plan for a series: scalar or per-row values.
    pub(crate) fn for_series(value: &'a FillValue, options: &'a FillOptions) -> Result<Self> {
        if let FillValue::Columns(_) = value {
            return Err(FrameError::InvalidFillValue(
                "a column mapping cannot fill a Series; use a row mapping".to_string(),
            ));
        }
        Ok(Self { value, options })
    }
}

impl ColumnPlan for FillPlan<'_> {
    fn targets(&self, name: &str) -> bool {
        match self.value {
            FillValue::Columns(map) => map.contains_key(name),
            FillValue::Scalar(_) | FillValue::Rows(_) => true,
        }
    }

    fn apply(&self, name: &str, values: &ArrayValues) -> Result<Option<ArrayValues>> {
        if !values.has_missing() {
            return Ok(None);
        }
        let limit = self.options.limit.unwrap_or(usize::MAX);
        let missing = (0..values.len()).filter(|&i| values.is_missing(i));

        let entries: Vec<(usize, &Scalar)> = match self.value {
            FillValue::Scalar(value) => missing.map(|i| (i, value)).take(limit).collect(),
            FillValue::Columns(map) => match map.get(name) {
                Some(value) => missing.map(|i| (i, value)).take(limit).collect(),
                None => return Ok(None),
            },
            FillValue::Rows(map) => missing
                .filter_map(|i| map.get(&i).map(|value| (i, value)))
                .take(limit)
                .collect(),
        };

        let Some(filled) = fill_entries(values, &entries)? else {
            return Ok(None);
        };
        trace!(column = name, filled = entries.len(), "fillna changed column");
        downcast(filled, self.options.downcast).map(Some)
    }
}

/// Write `entries` into a copy of `values`, widening the kind if needed.
///
/// Missing fill values are skipped; returns `None` if nothing is left to
/// write.
pub(crate) fn fill_entries(
    values: &ArrayValues,
    entries: &[(usize, &Scalar)],
) -> Result<Option<ArrayValues>> {
    let entries: Vec<_> = entries.iter().filter(|(_, v)| !v.is_missing()).collect();
    if entries.is_empty() {
        return Ok(None);
    }

    let dtype = entries
        .iter()
        .fold(values.dtype(), |dtype, (_, value)| dtype.common_type(value));
    let mut filled = values.cast(dtype)?;
    for (i, value) in entries {
        if !filled.set(*i, value) {
            return Err(FrameError::TypeMismatch {
                dtype,
                value: (*value).clone(),
            });
        }
    }
    Ok(Some(filled))
}

/// Direction of a pad fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Forward,
    Backward,
}

/// `ffill`/`bfill` as a column plan.
pub(crate) struct PadPlan<'a> {
    direction: Direction,
    options: &'a FillOptions,
}

impl<'a> PadPlan<'a> {
    pub(crate) fn forward(options: &'a FillOptions) -> Self {
        Self {
            direction: Direction::Forward,
            options,
        }
    }

    pub(crate) fn backward(options: &'a FillOptions) -> Self {
        Self {
            direction: Direction::Backward,
            options,
        }
    }
}

impl ColumnPlan for PadPlan<'_> {
    fn apply(&self, name: &str, values: &ArrayValues) -> Result<Option<ArrayValues>> {
        let Some(padded) = pad(values, self.direction, self.options.limit) else {
            return Ok(None);
        };
        trace!(column = name, direction = ?self.direction, "pad changed column");
        downcast(padded, self.options.downcast).map(Some)
    }
}

/// Propagate valid entries over gaps in `direction`.
///
/// Returns `None` if no missing entry has a valid neighbour to copy from.
pub(crate) fn pad(
    values: &ArrayValues,
    direction: Direction,
    limit: Option<usize>,
) -> Option<ArrayValues> {
    if !values.has_missing() {
        return None;
    }
    let missing = values.missing_mask();
    let plan = pad_sources(&missing, direction, limit);
    let changed = missing
        .iter()
        .zip(&plan)
        .any(|(is_missing, source)| *is_missing && source.is_some());
    changed.then(|| values.take(&plan))
}

/// For each row, the row its value is taken from (`None` stays missing).
fn pad_sources(missing: &[bool], direction: Direction, limit: Option<usize>) -> Vec<Option<usize>> {
    let n = missing.len();
    let order: Box<dyn Iterator<Item = usize>> = match direction {
        Direction::Forward => Box::new(0..n),
        Direction::Backward => Box::new((0..n).rev()),
    };

    let mut plan = vec![None; n];
    let mut last = None;
    let mut run = 0;
    for i in order {
        if !missing[i] {
            last = Some(i);
            run = 0;
            plan[i] = Some(i);
        } else {
            run += 1;
            if limit.map_or(true, |limit| run <= limit) {
                plan[i] = last;
            }
        }
    }
    plan
}
