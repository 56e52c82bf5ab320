//! Per-call configuration for fill and interpolate operations

use std::fmt;

/// Post-fill representation narrowing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Downcast {
    /// Keep the column's kind
    #[default]
    None,

    /// Narrow changed columns when their values allow it: floats holding
    /// only whole numbers become integers, object columns take their
    /// inferred kind.
    Infer,
}

/// How [`interpolate`](crate::Fillable::interpolate) fills gaps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InterpolationMethod {
    /// Straight line between the neighbours of each gap
    #[default]
    Linear,

    /// Value of the closest neighbour
    Nearest,

    /// Deprecated spelling of forward fill
    Pad,

    /// Deprecated spelling of backward fill
    Backfill,
}

impl InterpolationMethod {
    /// Name used in log messages
    pub fn name(self) -> &'static str {
        match self {
            InterpolationMethod::Linear => "linear",
            InterpolationMethod::Nearest => "nearest",
            InterpolationMethod::Pad => "pad",
            InterpolationMethod::Backfill => "backfill",
        }
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options for `fillna`, `ffill` and `bfill`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillOptions {
    /// Maximum number of entries to fill: per column for `fillna`, per
    /// consecutive gap for `ffill`/`bfill`
    pub limit: Option<usize>,

    /// Narrowing applied to changed columns
    pub downcast: Downcast,
}

impl FillOptions {
    /// Default options: no limit, no downcast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill at most `limit` entries.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Narrow changed columns after filling.
    pub fn with_downcast(mut self, downcast: Downcast) -> Self {
        self.downcast = downcast;
        self
    }
}

/// Options for `interpolate`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterpolateOptions {
    /// Gap filling method
    pub method: InterpolationMethod,

    /// Maximum number of consecutive missing entries to fill per gap
    pub limit: Option<usize>,

    /// Narrowing applied to changed columns
    pub downcast: Downcast,
}

impl InterpolateOptions {
    /// Linear interpolation without limit or downcast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `method` to fill gaps.
    pub fn with_method(mut self, method: InterpolationMethod) -> Self {
        self.method = method;
        self
    }

    /// Fill at most `limit` consecutive entries per gap.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Narrow changed columns after interpolating.
    pub fn with_downcast(mut self, downcast: Downcast) -> Self {
        self.downcast = downcast;
        self
    }
}
