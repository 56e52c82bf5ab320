//! Element kinds and the widening rules between them

use std::fmt;

use crate::value::Scalar;

/// The element kind stored by a column.
///
/// Every [`Buffer`](crate::Buffer) holds columns of exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// `bool`, cannot represent missing values
    Bool,

    /// `i64`, cannot represent missing values
    Int64,

    /// `f64`, missing is NaN
    Float64,

    /// Nanosecond timestamps, missing is NaT
    Datetime,

    /// Nullable `i64` (values + validity mask)
    MaskedInt64,

    /// Nullable `f64` (values + validity mask)
    MaskedFloat64,

    /// Heterogeneous scalars, missing is `Null` or a NaN float
    Object,
}

impl DType {
    /// Whether a column of this kind can contain missing entries at all.
    ///
    /// Fills and interpolations on kinds that cannot are always no-ops.
    pub fn supports_missing(self) -> bool {
        !matches!(self, DType::Bool | DType::Int64)
    }

    /// Whether values of this kind have a numeric interpretation for
    /// interpolation.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            DType::Int64 | DType::Float64 | DType::MaskedInt64 | DType::MaskedFloat64
        )
    }

    /// Whether `value` can be stored in a column of this kind without
    /// changing the kind.
    pub fn can_hold(self, value: &Scalar) -> bool {
        match self {
            DType::Object => true,
            DType::Bool => value.is_bool(),
            DType::Int64 => value.is_integral(),
            DType::Float64 => value.is_numeric() || value.is_null(),
            DType::Datetime => value.is_datetime() || value.is_missing(),
            DType::MaskedInt64 => value.is_integral() || value.is_missing(),
            DType::MaskedFloat64 => value.is_numeric() || value.is_null(),
        }
    }

    /// The narrowest kind able to hold both the existing values of this
    /// kind and `value`.
    pub fn common_type(self, value: &Scalar) -> DType {
        if self.can_hold(value) {
            return self;
        }
        match self {
            DType::Int64 if value.is_numeric() || value.is_missing() => DType::Float64,
            DType::MaskedInt64 if value.is_numeric() => DType::MaskedFloat64,
            _ => DType::Object,
        }
    }

    /// The concrete kind that fits every value of an object column.
    ///
    /// Returns `None` when the values are all missing or mix categories
    /// (strings, or booleans alongside missing entries), in which case the
    /// column stays `Object`.
    pub fn infer(values: &[Scalar]) -> Option<DType> {
        let present: Vec<&Scalar> = values.iter().filter(|v| !v.is_missing()).collect();
        if present.is_empty() {
            return None;
        }
        let has_missing = present.len() < values.len();

        if present.iter().all(|v| v.is_bool()) {
            (!has_missing).then_some(DType::Bool)
        } else if present.iter().all(|v| v.is_integer()) {
            Some(if has_missing { DType::Float64 } else { DType::Int64 })
        } else if present.iter().all(|v| v.is_numeric()) {
            Some(DType::Float64)
        } else if present.iter().all(|v| v.is_datetime()) {
            Some(DType::Datetime)
        } else {
            None
        }
    }

    /// Short lowercase name, as shown in messages.
    pub fn name(self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::Int64 => "int64",
            DType::Float64 => "float64",
            DType::Datetime => "datetime64[ns]",
            DType::MaskedInt64 => "Int64",
            DType::MaskedFloat64 => "Float64",
            DType::Object => "object",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
