//! Scalar cell values

mod display;
mod impls;

use std::sync::Arc;

/// A single cell value, as read from or written into a column.
///
/// Scalars are the currency between callers and columns: fill values,
/// positional writes and materialised reads all use this type. Storage
/// itself is typed (see [`ArrayValues`](crate::ArrayValues)); a scalar only
/// exists at the boundary.
#[derive(Clone)]
pub enum Scalar {
    /// A missing value (NaN, NaT or NA depending on the column kind)
    Null,

    /// Boolean
    Bool(bool),

    /// 64-bit signed integer
    Int(i64),

    /// 64-bit float. `NaN` counts as missing.
    Float(f64),

    /// Heap-allocated string
    Str(Arc<String>),

    /// Timestamp as nanoseconds since the Unix epoch
    Datetime(i64),
}
