//! The collection a run works against.

use bench_store::DocumentStore;
use std::sync::Arc;

/// Store handle plus target collection, passed explicitly to every phase.
#[derive(Clone)]
pub struct BenchContext {
    pub store: Arc<dyn DocumentStore>,
    pub collection: String,
}

impl BenchContext {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }
}

impl std::fmt::Debug for BenchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchContext")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}
