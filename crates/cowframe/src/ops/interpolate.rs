//! Gap interpolation

use tracing::{trace, warn};

use super::fill::{pad, Direction};
use super::{downcast, infer_objects};
use crate::array::{ArrayValues, NAT};
use crate::dtype::DType;
use crate::error::Result;
use crate::manager::ColumnPlan;
use crate::options::{InterpolateOptions, InterpolationMethod};

/// `interpolate` as a column plan.
pub(crate) struct InterpolatePlan<'a> {
    options: &'a InterpolateOptions,
}

impl<'a> InterpolatePlan<'a> {
    pub(crate) fn new(options: &'a InterpolateOptions, receiver: &str) -> Self {
        if matches!(
            options.method,
            InterpolationMethod::Pad | InterpolationMethod::Backfill
        ) {
            warn!(
                method = %options.method,
                "{receiver}.interpolate with method={} is deprecated, use ffill or bfill instead",
                options.method
            );
        }
        Self { options }
    }

    /// Whether the method needs numeric values.
    pub(crate) fn is_numeric(&self) -> bool {
        matches!(
            self.options.method,
            InterpolationMethod::Linear | InterpolationMethod::Nearest
        )
    }
}

impl ColumnPlan for InterpolatePlan<'_> {
    fn apply(&self, name: &str, values: &ArrayValues) -> Result<Option<ArrayValues>> {
        let limit = self.options.limit;
        let changed = match self.options.method {
            InterpolationMethod::Pad => pad_then_infer(values, Direction::Forward, limit),
            InterpolationMethod::Backfill => pad_then_infer(values, Direction::Backward, limit),
            method => match values.dtype() {
                DType::Object => {
                    if values.has_missing() {
                        warn!(
                            column = name,
                            "interpolate with object dtype leaves the column unchanged"
                        );
                    }
                    None
                }
                _ => interpolate_numeric(values, method == InterpolationMethod::Nearest, limit),
            },
        };

        let Some(changed) = changed else {
            return Ok(None);
        };
        trace!(column = name, method = %self.options.method, "interpolate changed column");
        downcast(changed, self.options.downcast).map(Some)
    }
}

/// Pad, then convert object columns to their inferred kind.
///
/// The conversion applies even when nothing was missing, so an object
/// column of integers always comes back as a new integer column.
fn pad_then_infer(
    values: &ArrayValues,
    direction: Direction,
    limit: Option<usize>,
) -> Option<ArrayValues> {
    let padded = pad(values, direction, limit);
    if values.dtype() != DType::Object {
        return padded;
    }
    infer_objects(padded.as_ref().unwrap_or(values)).or(padded)
}

/// Interpolate a column with a numeric interpretation.
///
/// Kinds without one (booleans) and kinds that cannot hold missing entries
/// (integers) are returned as `None`.
fn interpolate_numeric(
    values: &ArrayValues,
    nearest: bool,
    limit: Option<usize>,
) -> Option<ArrayValues> {
    if !values.has_missing() {
        return None;
    }

    // Timestamps are interpolated relative to the first valid one so the
    // offsets stay within f64 precision. Offsets between the two ends of the
    // range do not fit an i64.
    let (base, points): (i64, Vec<Option<f64>>) = match values {
        ArrayValues::Datetime(v) => {
            let base = v.iter().copied().find(|x| *x != NAT)?;
            let points = v
                .iter()
                .map(|x| (*x != NAT).then(|| (i128::from(*x) - i128::from(base)) as f64))
                .collect();
            (base, points)
        }
        _ => (0, values.to_f64_points()?),
    };

    let filled = if nearest {
        fill_nearest(&points, limit)
    } else {
        fill_linear(&points, limit)
    };
    if filled == points {
        return None;
    }
    Some(rebuild(values.dtype(), base, filled))
}

fn exceeds(step: usize, limit: Option<usize>) -> bool {
    limit.is_some_and(|limit| step > limit)
}

fn known_points(points: &[Option<f64>]) -> Vec<(usize, f64)> {
    points
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.map(|y| (i, y)))
        .collect()
}

/// Interior gaps on the straight line between their neighbours, trailing
/// gaps at the last valid value, leading gaps untouched.
fn fill_linear(points: &[Option<f64>], limit: Option<usize>) -> Vec<Option<f64>> {
    let known = known_points(points);
    let mut out = points.to_vec();

    for pair in known.windows(2) {
        let ((a, ya), (b, yb)) = (pair[0], pair[1]);
        for i in a + 1..b {
            if exceeds(i - a, limit) {
                break;
            }
            out[i] = Some(ya + (yb - ya) * (i - a) as f64 / (b - a) as f64);
        }
    }
    if let Some(&(last, y)) = known.last() {
        for i in last + 1..points.len() {
            if exceeds(i - last, limit) {
                break;
            }
            out[i] = Some(y);
        }
    }
    out
}

/// Interior gaps take the closer neighbour; ties go to the earlier one.
fn fill_nearest(points: &[Option<f64>], limit: Option<usize>) -> Vec<Option<f64>> {
    let known = known_points(points);
    let mut out = points.to_vec();

    for pair in known.windows(2) {
        let ((a, ya), (b, yb)) = (pair[0], pair[1]);
        for i in a + 1..b {
            if exceeds(i - a, limit) {
                break;
            }
            out[i] = Some(if i - a <= b - i { ya } else { yb });
        }
    }
    out
}

/// A timestamp `offset` away from `base`, or `None` when the result is not
/// a representable timestamp.
fn shift_timestamp(base: i64, offset: f64) -> Option<i64> {
    let stamp = i128::from(base) + offset.round() as i128;
    i64::try_from(stamp).ok().filter(|x| *x != NAT)
}

fn rebuild(dtype: DType, base: i64, filled: Vec<Option<f64>>) -> ArrayValues {
    match dtype {
        DType::Datetime => ArrayValues::datetime(
            filled
                .into_iter()
                .map(|p| p.and_then(|x| shift_timestamp(base, x)))
                .collect(),
        ),
        DType::MaskedInt64 if filled.iter().flatten().all(|x| x.fract() == 0.0) => {
            ArrayValues::masked_int64(filled.into_iter().map(|p| p.map(|x| x as i64)).collect())
        }
        DType::MaskedInt64 | DType::MaskedFloat64 => ArrayValues::masked_float64(filled),
        _ => ArrayValues::float64(filled.into_iter().map(|p| p.unwrap_or(f64::NAN)).collect()),
    }
}
