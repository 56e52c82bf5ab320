//! # cowframe
//!
//! Copy-on-write buffer sharing for an in-memory columnar table.
//!
//! Tables and columns created as views (`view`, `slice_rows`, `select`,
//! `column`) alias the storage of their source instead of copying it. The
//! first write through any alias makes that alias's storage private, so a
//! write is never visible through an object that did not request it.
//!
//! ## Architecture
//!
//! - **Buffer**: typed storage for one or more same-kind columns
//! - **ReferenceTracker**: weak links to every block aliasing a buffer
//! - **Block**: a window on a buffer plus the mutate-or-copy protocol
//! - **BlockManager**: column placement, views and mutation routing
//! - **Operations**: `fillna`, `ffill`/`bfill`, `interpolate`, `set_value`
//! - **Ephemeral**: chained-lookup results that refuse in-place writes
//!
//! ## Example
//!
//! ```
//! use cowframe::{shares_storage, ArrayValues, DataFrame, Fillable};
//!
//! let df = DataFrame::from_columns([("a", ArrayValues::float64(vec![1.0, 2.0]))])?;
//! let result = df.ffill()?;
//!
//! // nothing to fill: the result shares storage with its source
//! assert!(shares_storage(&df.storage("a")?, &result.storage("a")?));
//! # Ok::<(), cowframe::FrameError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod array;
pub mod block;
pub mod buffer;
pub mod dtype;
pub mod error;
pub mod frame;
pub mod guard;
mod manager;
pub mod ops;
pub mod options;
pub mod refs;
pub mod series;
pub mod value;

// Re-export main types
pub use array::{ArrayValues, NAT};
pub use block::{Block, CopyDecision};
pub use buffer::{shares_storage, Buffer, StorageRef};
pub use dtype::DType;
pub use error::{EphemeralMutationError, FrameError, Result};
pub use frame::DataFrame;
pub use guard::Ephemeral;
pub use ops::{FillValue, Fillable};
pub use options::{Downcast, FillOptions, InterpolateOptions, InterpolationMethod};
pub use refs::{BlockId, ReferenceTracker};
pub use series::Series;
pub use value::Scalar;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
