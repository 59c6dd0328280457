use std::sync::{Arc, PoisonError, RwLock};

use crate::inverted_index::InvertedIndex;

/// Shared, swappable reference to the current index.
///
/// Readers take a [`snapshot`](IndexHandle::snapshot) and query it for as
/// long as they like. A rebuild happens on a fresh `InvertedIndex` that is
/// only handed to [`publish`](IndexHandle::publish) once complete, so no
/// reader ever sees a half-built index.
#[derive(Debug, Clone, Default)]
pub struct IndexHandle {
    current: Arc<RwLock<Arc<InvertedIndex>>>,
}

impl IndexHandle {
    pub fn new(index: InvertedIndex) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(index))),
        }
    }

    pub fn snapshot(&self) -> Arc<InvertedIndex> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Replace the current index. Snapshots taken earlier keep pointing at
    /// the old one.
    pub fn publish(&self, index: InvertedIndex) {
        let fresh = Arc::new(index);
        let mut guard =
            self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = fresh;
    }
}
