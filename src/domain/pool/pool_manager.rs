//! Holds the current snapshot set

use std::sync::Arc;

use super::{PoolSnapshot, SnapshotSet};
use crate::shared::errors::PoolError;

/// Owns the latest snapshot set. A refresh swaps the whole set; readers that
/// still hold the previous `Arc` keep a consistent view.
#[derive(Debug, Default)]
pub struct PoolManager {
    current: Option<Arc<SnapshotSet>>,
    generation: u64,
}

impl PoolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current set, returning the previous one
    pub fn replace(&mut self, set: SnapshotSet) -> Option<Arc<SnapshotSet>> {
        self.generation += 1;
        self.current.replace(Arc::new(set))
    }

    pub fn current(&self) -> Result<Arc<SnapshotSet>, PoolError> {
        self.current.clone().ok_or(PoolError::NoSnapshot)
    }

    pub fn get_pool(&self, pool_id: u64) -> Result<PoolSnapshot, PoolError> {
        let set = self.current()?;
        set.pool(pool_id).cloned().ok_or(PoolError::UnknownPool(pool_id))
    }

    /// Number of completed refreshes
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
