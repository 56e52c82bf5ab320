//! Reference tracking between blocks that alias one buffer

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;

/// Process-unique identity of a [`Block`](crate::Block).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u64);

impl BlockId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        BlockId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Liveness token owned by exactly one block.
///
/// Trackers only ever hold `Weak` pointers to tokens, so a block that is
/// dropped disappears from every tracker without any bookkeeping.
#[derive(Debug)]
pub(crate) struct BlockToken {
    pub(crate) id: BlockId,
}

impl BlockToken {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self { id: BlockId::next() })
    }
}

/// Registry of the blocks that currently alias one buffer.
///
/// Members are held through weak links: the tracker never keeps a block
/// alive, and links whose block is gone count as absent (they are pruned
/// lazily on the next query).
///
/// # Example
///
/// ```
/// use cowframe::{ArrayValues, DataFrame};
///
/// let df = DataFrame::from_columns([("a", ArrayValues::float64(vec![1.0, f64::NAN]))]).unwrap();
/// assert!(df.has_no_reference("a").unwrap());
///
/// let view = df.view();
/// assert!(!df.has_no_reference("a").unwrap());
///
/// drop(view);
/// assert!(df.has_no_reference("a").unwrap());
/// ```
#[derive(Default)]
pub struct ReferenceTracker {
    members: DashMap<BlockId, Weak<BlockToken>>,
}

impl ReferenceTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a weak link to `token`'s block. No-op if already present.
    pub(crate) fn register(&self, token: &Arc<BlockToken>) {
        self.members
            .entry(token.id)
            .or_insert_with(|| Arc::downgrade(token));
    }

    /// Remove the link for block `id`.
    pub(crate) fn deregister(&self, id: BlockId) {
        self.members.remove(&id);
    }

    /// True iff no live member other than `excluding` remains.
    ///
    /// This is the single query every write path consults before mutating
    /// a buffer in place.
    pub fn has_no_reference(&self, excluding: BlockId) -> bool {
        self.prune();
        !self
            .members
            .iter()
            .any(|entry| *entry.key() != excluding && entry.value().strong_count() > 0)
    }

    /// Whether block `id` is currently a member.
    pub fn contains(&self, id: BlockId) -> bool {
        self.members
            .get(&id)
            .is_some_and(|link| link.strong_count() > 0)
    }

    /// Number of live members.
    pub fn live_count(&self) -> usize {
        self.members
            .iter()
            .filter(|entry| entry.value().strong_count() > 0)
            .count()
    }

    fn prune(&self) {
        self.members.retain(|_, link| link.strong_count() > 0);
    }
}

impl fmt::Debug for ReferenceTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceTracker")
            .field("live", &self.live_count())
            .finish()
    }
}
